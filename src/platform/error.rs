use thiserror::Error;

/// Failure to obtain a bearer token from the platform
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("no credential path available")]
    NoCredentialPath,

    #[error("user {email} is not verified; verify the account on the platform first")]
    NotVerified { email: String },

    #[error("user {email} does not exist on the platform")]
    NotFound { email: String },

    #[error("invalid credentials for {email}")]
    InvalidCredentials { email: String },

    #[error("authentication failed: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("login response did not contain an accessToken")]
    MissingAccessToken,

    #[error("connecting to platform failed: {0}")]
    Connection(String),
}

/// Failure of a data call once a token was in hand
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("platform rejected {operation}: {status}")]
    Rejected { operation: &'static str, status: u16 },

    #[error("unexpected {operation} response: {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },
}

/// Outcome of one authorized call: token trouble propagates, platform trouble degrades
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Auth(#[from] AuthenticationError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}
