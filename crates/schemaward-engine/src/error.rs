//! Errors raised while generating whitelists

use schemaward_catalog::{PersistError, ReadError};
use schemaward_core::WhitelistError;

/// Generation error types
///
/// Element-level anomalies are never errors; they become skip notes.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Installation state makes generation meaningless
    #[error("{0}")]
    ConfigurationMismatch(String),

    /// Named module has no registered path
    #[error("Module '{0}' is not registered")]
    UnknownModule(String),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Whitelist(#[from] WhitelistError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl GenerateError {
    /// Table prefix set on the installation
    pub fn table_prefix_configured() -> Self {
        Self::ConfigurationMismatch(
            "Installation was configured with a table prefix. Please re-install without prefix."
                .to_string(),
        )
    }
}
