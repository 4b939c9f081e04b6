use thiserror::Error;

/// Errors produced by the grid codec.
///
/// All core operations are fail-fast: there is no partial recovery once one
/// of these is returned. See `range_query`, which downgrades most of these
/// to a per-candidate rejection rather than propagating them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("invalid code {code:?}: {message}")]
    InvalidCode { code: String, message: String },

    #[error("unsupported polar region: {message}")]
    UnsupportedPolar { message: String },
}

impl GridError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        GridError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn invalid_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        GridError::InvalidCode {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_polar(message: impl Into<String>) -> Self {
        GridError::UnsupportedPolar {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
