//! Personal work log kept in a local key-value store. Daily reports are stored as generic
//! records, aggregated per month against a monthly goal, and the whole store can be exported to
//! and restored from a single JSON backup.
//!

pub mod analysis;
pub mod backup;
pub mod cli;
pub mod context;
pub mod storage;
pub mod utils;
