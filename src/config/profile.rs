// config/profile.rs - Connection profile for the Roble platform
//
// Resolved once at process start from the environment. Mode decides which
// family of keys is read (ROBLE_* for the current project, ROBLE_SERVICE_*
// for a service bound to a different project).

use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use url::Url;

pub const BASE_HOST_KEY: &str = "ROBLE_BASE_HOST";
pub const TABLE_NAME_KEY: &str = "TABLE_NAME";
pub const MODE_KEY: &str = "ROBLE_MODE";

/// Which credential family the service authenticates with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Same project as the generator: email + password are mandatory
    Current,
    /// Service bound to another project: static token or email + password
    Different,
}

impl AuthMode {
    pub fn parse(raw: Option<&str>) -> Result<Self, ConfigurationError> {
        match raw.map(|v| v.trim().to_ascii_lowercase()) {
            None => Ok(AuthMode::Current),
            Some(v) if v.is_empty() || v == "current" => Ok(AuthMode::Current),
            Some(v) if v == "different" => Ok(AuthMode::Different),
            Some(v) => Err(ConfigurationError::InvalidMode(v)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Current => "current",
            AuthMode::Different => "different",
        }
    }

    fn contract_key(&self) -> &'static str {
        match self {
            AuthMode::Current => "ROBLE_CONTRACT",
            AuthMode::Different => "ROBLE_SERVICE_CONTRACT",
        }
    }

    fn email_key(&self) -> &'static str {
        match self {
            AuthMode::Current => "ROBLE_USER_EMAIL",
            AuthMode::Different => "ROBLE_SERVICE_EMAIL",
        }
    }

    fn password_key(&self) -> &'static str {
        match self {
            AuthMode::Current => "ROBLE_USER_PASSWORD",
            AuthMode::Different => "ROBLE_SERVICE_PASSWORD",
        }
    }

    fn token_key(&self) -> &'static str {
        match self {
            AuthMode::Current => "ROBLE_TOKEN",
            AuthMode::Different => "ROBLE_SERVICE_TOKEN",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("{token_key} or {email_key} + {password_key} are required in 'different' mode")]
    NoCredentialPath {
        token_key: String,
        email_key: String,
        password_key: String,
    },

    #[error("invalid ROBLE_MODE '{0}' (expected 'current' or 'different')")]
    InvalidMode(String),

    #[error("invalid ROBLE_BASE_HOST '{value}': {reason}")]
    InvalidBaseHost { value: String, reason: String },

    #[error("unknown SERVICE_LOGIC '{0}'")]
    UnknownLogic(String),
}

/// Immutable connection parameters for one service instance
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub base_host: String,
    pub contract: String,
    pub table_name: String,
    pub mode: AuthMode,
    pub email: Option<String>,
    pub password: Option<String>,
    pub static_token: Option<String>,
}

impl ConnectionProfile {
    /// Resolve from the process environment
    pub fn resolve() -> Result<Self, ConfigurationError> {
        Self::resolve_from(|key| std::env::var(key).ok())
    }

    /// Resolve from any key lookup. Empty or whitespace-only values count as absent.
    pub fn resolve_from<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mode = AuthMode::parse(lookup(MODE_KEY).as_deref())?;

        let base_host = get(BASE_HOST_KEY);
        let contract = get(mode.contract_key());
        let table_name = get(TABLE_NAME_KEY);
        let email = get(mode.email_key());
        let password = get(mode.password_key());
        let static_token = get(mode.token_key());

        let mut missing = Vec::new();
        if base_host.is_none() {
            missing.push(BASE_HOST_KEY.to_string());
        }
        if contract.is_none() {
            missing.push(mode.contract_key().to_string());
        }
        if table_name.is_none() {
            missing.push(TABLE_NAME_KEY.to_string());
        }
        if mode == AuthMode::Current {
            if email.is_none() {
                missing.push(mode.email_key().to_string());
            }
            if password.is_none() {
                missing.push(mode.password_key().to_string());
            }
        }

        let (Some(base_host), Some(contract), Some(table_name)) = (base_host, contract, table_name)
        else {
            return Err(ConfigurationError::Missing(missing));
        };
        if !missing.is_empty() {
            return Err(ConfigurationError::Missing(missing));
        }

        if mode == AuthMode::Different
            && static_token.is_none()
            && !(email.is_some() && password.is_some())
        {
            return Err(ConfigurationError::NoCredentialPath {
                token_key: mode.token_key().to_string(),
                email_key: mode.email_key().to_string(),
                password_key: mode.password_key().to_string(),
            });
        }

        let base_host = normalize_base_host(&base_host)?;

        Ok(Self {
            base_host,
            contract,
            table_name,
            mode,
            email,
            password,
            static_token,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }

    /// Non-secret view for logs and diagnostics
    pub fn summary(&self) -> Value {
        json!({
            "baseHost": self.base_host,
            "contract": self.contract,
            "tableName": self.table_name,
            "mode": self.mode.as_str(),
            "hasCredentials": self.has_credentials(),
            "hasToken": self.static_token.is_some(),
        })
    }
}

fn normalize_base_host(raw: &str) -> Result<String, ConfigurationError> {
    Url::parse(raw).map_err(|e| ConfigurationError::InvalidBaseHost {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(raw.trim_end_matches('/').to_string())
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("base_host", &self.base_host)
            .field("contract", &self.contract)
            .field("table_name", &self.table_name)
            .field("mode", &self.mode)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("static_token", &self.static_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
