// platform/mod.rs - Authenticated data access to the Roble platform
//
// The client owns one cached bearer token. Every table operation fetches the
// token, calls the database route, and on a 401 re-authenticates and retries
// exactly once. Reads degrade to "no data" and writes to {"success": false}
// when the platform call fails; only token acquisition errors propagate.

use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod client;
pub mod error;
pub mod token;

pub use client::PlatformClient;
pub use error::{AuthenticationError, CallError, PlatformError};
pub use token::SessionToken;

/// Opaque platform row; `_id` is the only key this crate relies on
pub type Record = Map<String, Value>;

/// Default identity column for update/delete
pub const ID_COLUMN: &str = "_id";

/// Table-scoped CRUD against the platform
#[async_trait]
pub trait DataAccess: Send + Sync {
    async fn read(
        &self,
        table_name: &str,
        filters: Option<&Map<String, Value>>,
    ) -> Result<Vec<Record>, AuthenticationError>;

    async fn insert(&self, table_name: &str, records: Vec<Value>) -> Result<Value, AuthenticationError>;

    async fn update(
        &self,
        table_name: &str,
        id_column: &str,
        id_value: Value,
        updates: Map<String, Value>,
    ) -> Result<Value, AuthenticationError>;

    async fn delete(
        &self,
        table_name: &str,
        id_column: &str,
        id_value: Value,
    ) -> Result<Value, AuthenticationError>;
}
