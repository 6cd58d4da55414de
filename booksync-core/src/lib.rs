//! Core types and sync engine for the booksync ecosystem.
//!
//! This crate provides everything the CLI needs short of the terminal and the
//! HTTP transport:
//! - raw DaySchedule API records (`booking`)
//! - normalization into the persisted snapshot shape (`normalize`)
//! - snapshot persistence and the per-run booking index (`snapshot`)
//! - the incremental reconciliation engine (`reconcile`)
//! - the detail-fetch seam the engine calls through (`fetch`)

pub mod booking;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod reconcile;
pub mod snapshot;
