use thiserror::Error;

pub const INVALID_ARGS: &str = "INVALID_ARGS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A required argument is missing or has the wrong type.
    #[error("{message}")]
    InvalidArgs { message: &'static str },

    /// Not an error on the wire; callers treat it as an absent feature.
    #[error("method `{0}` is not implemented")]
    NotImplemented(String),
}

impl BridgeError {
    pub fn invalid_args(message: &'static str) -> Self {
        Self::InvalidArgs { message }
    }
}
