//! # Error Types

/// Errors from wordpipe operations.
#[derive(Debug, thiserror::Error)]
pub enum WordpipeError {
    /// The input has the wrong shape for the requested operation.
    ///
    /// Examples: a truncation strategy which needs a pair was given a
    /// single sequence; a sequence too short to absorb a truncation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A token has no vocabulary mapping, and no unknown-token fallback is configured.
    #[error("unknown token: {token:?}")]
    UnknownToken {
        /// The token text which could not be mapped.
        token: String,
    },

    /// Padding, truncation, model, or processor options are invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A serialized tokenizer is corrupt or version-incompatible.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error from an external component.
    #[error("{0}")]
    External(String),
}

impl From<serde_json::Error> for WordpipeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return WordpipeError::Io(err.into());
        }
        WordpipeError::Serialization(err.to_string())
    }
}

impl From<strum::ParseError> for WordpipeError {
    fn from(err: strum::ParseError) -> Self {
        WordpipeError::Configuration(format!("unknown option name: {err}"))
    }
}

/// Result type for wordpipe operations.
pub type WPResult<T> = core::result::Result<T, WordpipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_become_serialization_errors() {
        let err: WordpipeError = serde_json::from_str::<u32>("{nope").unwrap_err().into();
        assert!(matches!(err, WordpipeError::Serialization(_)));
    }

    #[test]
    fn test_strum_errors_become_configuration_errors() {
        let err: WordpipeError = strum::ParseError::VariantNotFound.into();
        assert!(matches!(err, WordpipeError::Configuration(_)));
    }

    #[test]
    fn test_display() {
        let err = WordpipeError::UnknownToken {
            token: "xyz".to_string(),
        };
        assert_eq!(err.to_string(), "unknown token: \"xyz\"");
    }
}
