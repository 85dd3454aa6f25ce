//! Core contracts for Dolly.
//!
//! This crate defines the record field bag, scalar values, the storage
//! capability the factory persists through, and the error type shared by
//! the factory and the CLI.

pub mod error;
pub mod field;
pub mod record;
pub mod sql;
pub mod storage;
pub mod value;

pub use error::{Error, Result, StorageError};
pub use field::{Field, Fields};
pub use record::Record;
pub use sql::InsertStatement;
pub use storage::{Blackhole, RecordingStorage, Storage};
pub use value::Value;

/// Column name used as primary key when a blueprint does not declare one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";
