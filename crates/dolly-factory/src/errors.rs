use thiserror::Error;

/// Errors raised while loading declarative blueprint definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported value for '{blueprint}.{field}': {message}")]
    UnsupportedValue {
        blueprint: String,
        field: String,
        message: String,
    },
    #[error(transparent)]
    Core(#[from] dolly_core::Error),
}
