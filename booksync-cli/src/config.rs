use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;

static DEFAULT_BASE_URL: &str = "https://api.dayschedule.com/v1";
static DEFAULT_OUTPUT_FILE: &str = "~/day_schedule_bookings.json";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

/// Global configuration at ~/.config/booksync/config.toml
///
/// The API key is the only required field; everything else has a sensible
/// default and can be overridden per invocation with CLI flags.
#[derive(Deserialize, Clone)]
pub struct GlobalConfig {
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

impl GlobalConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("booksync");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            anyhow::bail!(
                "No configuration found.\n\n\
                A template was written to:\n  {}\n\n\
                Fill in your DaySchedule API key and run again.",
                config_path.display()
            );
        }

        // The file is known to exist past the check above, so its absence
        // here (e.g. deleted mid-run) is an error, not an empty config.
        let config: GlobalConfig = Config::builder()
            .add_source(File::from(config_path.clone()).required(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        if config.api_key.is_empty() {
            anyhow::bail!("api_key is empty in {}", config_path.display());
        }

        Ok(config)
    }

    /// Create a template config with the optional settings commented out.
    fn create_default_config(path: &Path) -> Result<()> {
        let contents = format!(
            "\
# booksync configuration

# Your DaySchedule API key (required):
api_key = \"\"

# API endpoint:
# base_url = \"{DEFAULT_BASE_URL}\"

# Where the booking snapshot is written:
# output_file = \"{DEFAULT_OUTPUT_FILE}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Could not write {}", path.display()))?;

        Ok(())
    }

    /// Output path with `~` expanded.
    pub fn output_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.output_file.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: GlobalConfig = Config::builder()
            .add_source(File::from_str("api_key = \"secret\"", FileFormat::Toml))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.output_file, PathBuf::from(DEFAULT_OUTPUT_FILE));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");

        let result = Config::builder()
            .add_source(File::from(dir.path().join("config.toml")).required(true))
            .build();

        assert!(result.is_err(), "a vanished config file must fail loudly");
    }
}
