//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Type of media not supported: {0}")]
    UnsupportedMediaType(String),

    #[error("Comparison method '{method}' is not compatible with media type '{media_type}'")]
    IncompatibleMethod { media_type: String, method: String },

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Read error: {0}")]
    Read(String),

    #[error("Write error: {0}")]
    Write(String),
}

impl DomainError {
    /// True for errors raised while validating the request, before any input is read.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::UnsupportedMediaType(_)
                | DomainError::IncompatibleMethod { .. }
                | DomainError::InvalidDate(_)
                | DomainError::InvalidParameter(_)
        )
    }
}
