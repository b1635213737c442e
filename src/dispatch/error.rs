use thiserror::Error;

use crate::platform::AuthenticationError;

/// An entry point failed while running. Captured into the result string,
/// never turned into a failed HTTP response.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("{0}")]
    Failed(String),

    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
}

impl ExecutionError {
    pub fn msg(message: impl Into<String>) -> Self {
        ExecutionError::Failed(message.into())
    }
}

/// Anything that breaks before an entry point runs: bad request payload or
/// injected logic that cannot be evaluated.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid JSON body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    BodyNotObject,

    #[error("injected logic '{logic}' failed to evaluate: {reason}")]
    Evaluation { logic: String, reason: String },
}

impl DispatchError {
    pub fn evaluation(logic: impl Into<String>, reason: impl Into<String>) -> Self {
        DispatchError::Evaluation {
            logic: logic.into(),
            reason: reason.into(),
        }
    }
}
