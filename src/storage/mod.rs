//!  Storage is organized through [key_value::KeyValueStore].
//!  The basic idea is:
//!   - Every namespace lives under one fixed key as a single JSON value.
//!   - List namespaces (reports) are arrays of [entities::Record] managed by
//!     [record_store::RecordStore].
//!   - Single-value namespaces (goals, personal info, work days) go through
//!     [settings::SettingsStore].
//!   - Reads recover to empty or default values, writes report their failures.

pub mod entities;
pub mod error;
pub mod key_value;
pub mod namespace;
pub mod record_store;
pub mod settings;
