use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::config::{AuthMode, ConnectionProfile};

use super::error::{AuthenticationError, CallError, PlatformError};
use super::token::SessionToken;
use super::{DataAccess, Record};

/// Authenticated REST client for the platform's auth and database routes
pub struct PlatformClient {
    profile: ConnectionProfile,
    http: reqwest::Client,
    token: SessionToken,
}

impl PlatformClient {
    pub fn new(profile: ConnectionProfile, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            profile,
            http,
            token: SessionToken::new(),
        })
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    pub async fn has_token(&self) -> bool {
        self.token.is_present().await
    }

    /// Return the cached token, adopting the static token or logging in when absent.
    /// Validity is never inspected here; a 401 from a data call is what evicts it.
    pub async fn get_token(&self) -> Result<String, AuthenticationError> {
        if let Some(token) = self.token.get().await {
            return Ok(token);
        }

        if self.profile.mode == AuthMode::Different {
            if let Some(token) = &self.profile.static_token {
                tracing::debug!("adopting configured service token");
                self.token.set(token.clone()).await;
                return Ok(token.clone());
            }
        }

        if self.profile.has_credentials() {
            return self.authenticate().await;
        }

        Err(AuthenticationError::NoCredentialPath)
    }

    /// POST credentials to the login route and cache the returned access token
    pub async fn authenticate(&self) -> Result<String, AuthenticationError> {
        let (Some(email), Some(password)) = (&self.profile.email, &self.profile.password) else {
            return Err(AuthenticationError::NoCredentialPath);
        };

        let url = format!(
            "{}/auth/{}/login",
            self.profile.base_host, self.profile.contract
        );
        tracing::info!("authenticating {} against {}", email, url);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthenticationError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: Value = response
                .json()
                .await
                .map_err(|_| AuthenticationError::MissingAccessToken)?;
            let token = body
                .get("accessToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .ok_or(AuthenticationError::MissingAccessToken)?
                .to_string();

            self.token.set(token.clone()).await;
            tracing::info!("authenticated {} on contract {}", email, self.profile.contract);
            return Ok(token);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("login for {} failed with {}", email, status);
        Err(login_failure(status, body, email))
    }

    fn database_url(&self, operation: &str) -> String {
        format!(
            "{}/database/{}/{}",
            self.profile.base_host, self.profile.contract, operation
        )
    }

    /// Issue a bearer-authorized request; on 401 drop the token, fetch a new one
    /// and send exactly once more.
    async fn send_authorized<F>(&self, operation: &'static str, build: F) -> Result<Response, CallError>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.get_token().await?;
        let response = build(&token).send().await.map_err(PlatformError::from)?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!("{} returned 401, re-authenticating", operation);
        self.token.clear().await;
        let token = self.get_token().await?;
        Ok(build(&token).send().await.map_err(PlatformError::from)?)
    }

    async fn call_json<T, F>(&self, operation: &'static str, build: F) -> Result<T, CallError>
    where
        T: DeserializeOwned,
        F: Fn(&str) -> RequestBuilder,
    {
        let response = self.send_authorized(operation, build).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Rejected {
                operation,
                status: status.as_u16(),
            }
            .into());
        }

        response.json::<T>().await.map_err(|e| {
            PlatformError::Decode {
                operation,
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn write_outcome(&self, operation: &'static str, result: Result<Value, CallError>) -> Result<Value, AuthenticationError> {
        match result {
            Ok(body) => Ok(body),
            Err(CallError::Auth(e)) => Err(e),
            Err(CallError::Platform(e)) => {
                tracing::warn!("{} on {} degraded: {}", operation, self.profile.table_name, e);
                Ok(json!({ "success": false }))
            }
        }
    }
}

#[async_trait]
impl DataAccess for PlatformClient {
    async fn read(
        &self,
        table_name: &str,
        filters: Option<&Map<String, Value>>,
    ) -> Result<Vec<Record>, AuthenticationError> {
        let url = self.database_url("read");
        let mut query = vec![("tableName".to_string(), table_name.to_string())];
        if let Some(filters) = filters {
            query.extend(filters.iter().map(|(k, v)| (k.clone(), query_value(v))));
        }

        let result = self
            .call_json::<Vec<Record>, _>("read", |token| {
                self.http.get(&url).bearer_auth(token).query(&query)
            })
            .await;

        match result {
            Ok(records) => Ok(records),
            Err(CallError::Auth(e)) => Err(e),
            Err(CallError::Platform(e)) => {
                tracing::warn!("read on {} degraded to no data: {}", table_name, e);
                Ok(Vec::new())
            }
        }
    }

    async fn insert(&self, table_name: &str, records: Vec<Value>) -> Result<Value, AuthenticationError> {
        let url = self.database_url("insert");
        let body = json!({ "tableName": table_name, "records": records });
        let result = self
            .call_json("insert", |token| self.http.post(&url).bearer_auth(token).json(&body))
            .await;
        self.write_outcome("insert", result)
    }

    async fn update(
        &self,
        table_name: &str,
        id_column: &str,
        id_value: Value,
        updates: Map<String, Value>,
    ) -> Result<Value, AuthenticationError> {
        let url = self.database_url("update");
        let body = json!({
            "tableName": table_name,
            "idColumn": id_column,
            "idValue": id_value,
            "updates": updates,
        });
        let result = self
            .call_json("update", |token| self.http.put(&url).bearer_auth(token).json(&body))
            .await;
        self.write_outcome("update", result)
    }

    async fn delete(
        &self,
        table_name: &str,
        id_column: &str,
        id_value: Value,
    ) -> Result<Value, AuthenticationError> {
        let url = self.database_url("delete");
        let body = json!({
            "tableName": table_name,
            "idColumn": id_column,
            "idValue": id_value,
        });
        let result = self
            .call_json("delete", |token| self.http.delete(&url).bearer_auth(token).json(&body))
            .await;
        self.write_outcome("delete", result)
    }
}

/// Map a rejected login to the most specific error the body allows
fn login_failure(status: StatusCode, body: String, email: &str) -> AuthenticationError {
    if status != StatusCode::UNAUTHORIZED {
        return AuthenticationError::Rejected {
            status: status.as_u16(),
            body,
        };
    }

    let email = email.to_string();
    let lowered = body.to_lowercase();
    if lowered.contains("not verified") || lowered.contains("no verificado") {
        AuthenticationError::NotVerified { email }
    } else if lowered.contains("not found") || lowered.contains("no encontrado") {
        AuthenticationError::NotFound { email }
    } else {
        AuthenticationError::InvalidCredentials { email }
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
