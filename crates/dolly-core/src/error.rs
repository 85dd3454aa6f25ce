use thiserror::Error;

/// Failure reported by a storage adapter while executing a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StorageError {
    message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Core error type shared across Dolly crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A record was asked for a field it does not carry.
    #[error("unknown field '{field}' on '{table}'")]
    UnknownField { table: String, field: String },
    /// A field holds an attached record where a scalar was required.
    #[error("field '{field}' on '{table}' is not a scalar value")]
    NotScalar { table: String, field: String },
    /// A field was read as an attached record but holds another shape.
    #[error("field '{field}' on '{table}' is not an attached record")]
    NotRecord { table: String, field: String },
    /// A field was read as an attached record list but holds another shape.
    #[error("field '{field}' on '{table}' is not an attached record list")]
    NotRecordList { table: String, field: String },
    /// A blueprint name was registered twice.
    #[error("blueprint '{0}' already defined")]
    DuplicateDefinition(String),
    /// A blueprint was requested by a name nobody registered.
    #[error("blueprint '{0}' not registered")]
    UnregisteredBlueprint(String),
    /// `extend` referenced a base blueprint that does not exist.
    #[error("cannot extend unknown blueprint '{0}'")]
    MissingBaseBlueprint(String),
    /// The factory was asked to create records before `setup`.
    #[error("storage is not configured")]
    StorageNotConfigured,
    /// The storage adapter rejected a statement.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Convenience alias for results returned by Dolly crates.
pub type Result<T> = std::result::Result<T, Error>;
