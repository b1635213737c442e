use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub mod profile;

pub use profile::{AuthMode, ConfigurationError, ConnectionProfile};

/// Process-level settings that are not part of the platform connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub port: u16,
    pub service_id: String,
    pub public_url: String,
    pub logic: String,
    pub platform_timeout_ms: u64,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::defaults().with_env_overrides()
    }

    fn defaults() -> Self {
        Self {
            port: 3000,
            service_id: uuid::Uuid::new_v4().to_string(),
            public_url: "http://localhost:3000".to_string(),
            logic: crate::logic::DEFAULT_LOGIC.to_string(),
            platform_timeout_ms: 10_000,
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.port = v.parse().unwrap_or(self.port);
        }
        if let Ok(v) = env::var("SERVICE_ID") {
            if !v.trim().is_empty() {
                self.service_id = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("SERVICE_PUBLIC_URL") {
            if !v.trim().is_empty() {
                self.public_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = env::var("SERVICE_LOGIC") {
            if !v.trim().is_empty() {
                self.logic = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("ROBLE_TIMEOUT_MS") {
            self.platform_timeout_ms = v.parse().unwrap_or(self.platform_timeout_ms);
        }

        self
    }

    pub fn platform_timeout(&self) -> Duration {
        Duration::from_millis(self.platform_timeout_ms)
    }

    /// Public address of this service instance, as advertised on `/`
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.public_url, self.service_id)
    }
}

/// Load `.env.local` then `.env`; anything already set wins.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ServiceConfig> = Lazy::new(ServiceConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static ServiceConfig {
    &CONFIG
}
