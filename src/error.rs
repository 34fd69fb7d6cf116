use std::env::VarError;

use thiserror::Error;

use crate::InvalidSpecification;

/// Unified error type covering compilation, configuration sources, and I/O.
///
/// Returned by loaders like [`FilterChain::from_env()`](crate::FilterChain::from_env)
/// and [`FilterChain::from_file()`](crate::FilterChain::from_file).
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Spec(#[from] InvalidSpecification),

    #[error("environment variable '{var}' is not usable: {source}")]
    Env {
        var: String,
        #[source]
        source: VarError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
