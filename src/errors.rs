//! Error kinds that change how a failure is presented.
//!
//! Most of the code propagates plain [anyhow::Error]s with context attached. The types here
//! carry failures that have no underlying cause to add context to.

use thiserror::Error;

pub const ERROR_ICON: &str = "❌";

/// An expected failure whose message is shown to the user verbatim.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UserFacingError(pub String);

impl UserFacingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A call to an external service returned something other than success.
#[derive(Debug, Error)]
#[error("{service} API error ({status}): {body}")]
pub struct ExternalServiceError {
    pub service: &'static str,
    pub status: u16,
    pub body: String,
}

/// Converts a failed action into the chat reply. Only the outermost message is shown, the
/// chain of causes goes to the logs.
pub fn user_reply(error: &anyhow::Error) -> String {
    format!("{ERROR_ICON} {error}")
}
