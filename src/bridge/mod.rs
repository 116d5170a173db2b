//! Method-channel surface exposed to the UI layer. Calls arrive as a method
//! name plus an argument map, are decoded into [`BridgeRequest`] and answered
//! with a [`BridgeReply`].

pub mod error;
pub mod handler;
pub mod request;

use serde::Serialize;
use serde_json::Value;

pub use error::{BridgeError, INVALID_ARGS};
pub use handler::{BridgeHandler, HostIdentity};
pub use request::{BridgeRequest, MethodCall};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BridgeReply {
    Success { result: Value },
    Error { code: &'static str, message: String },
    NotImplemented,
}

impl From<BridgeError> for BridgeReply {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::InvalidArgs { message } => Self::Error {
                code: INVALID_ARGS,
                message: message.to_string(),
            },
            BridgeError::NotImplemented(_) => Self::NotImplemented,
        }
    }
}
