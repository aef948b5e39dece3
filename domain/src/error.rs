use std::fmt;

use thiserror::Error;

/// Failure of one retrieval-augmented answer.
///
/// Each variant is a kind of failure; the message carries the underlying cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RagError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Configuration,
    Retrieval,
    Generation,
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::Retrieval => "retrieval_failure",
            ErrorKind::Generation => "generation_failure",
            ErrorKind::Unexpected => "unexpected_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RagError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RagError::InvalidInput(_) => ErrorKind::InvalidInput,
            RagError::Configuration(_) => ErrorKind::Configuration,
            RagError::Retrieval(_) => ErrorKind::Retrieval,
            RagError::Generation(_) => ErrorKind::Generation,
            RagError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn retrieval<E: fmt::Display>(err: E) -> Self {
        RagError::Retrieval(err.to_string())
    }

    pub fn generation<E: fmt::Display>(err: E) -> Self {
        RagError::Generation(err.to_string())
    }

    pub fn unexpected<E: fmt::Display>(err: E) -> Self {
        RagError::Unexpected(err.to_string())
    }

    /// Names the missing setting in a configuration error.
    pub fn missing_setting(name: &str) -> Self {
        RagError::Configuration(format!("{name} is not set"))
    }
}
