use serde_json::{Map, Value};
use std::sync::Arc;

use crate::platform::{DataAccess, Record, ID_COLUMN};

use super::error::ExecutionError;

/// What an entry point sees when it runs: the request parameters and the
/// four data helpers, pre-bound to the service's table and `_id`.
#[derive(Clone)]
pub struct ExecutionContext {
    params: Arc<Map<String, Value>>,
    data: Arc<dyn DataAccess>,
    table_name: Arc<str>,
}

impl ExecutionContext {
    pub fn new(params: Map<String, Value>, data: Arc<dyn DataAccess>, table_name: Arc<str>) -> Self {
        Self {
            params: Arc::new(params),
            data,
            table_name,
        }
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Value, ExecutionError> {
        self.param(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ExecutionError::MissingParameter(name.to_string()))
    }

    /// Object-valued parameter; query-string parameters arrive as JSON text.
    pub fn object_param(&self, name: &str) -> Result<Option<Map<String, Value>>, ExecutionError> {
        match self.param(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(Value::String(text)) => serde_json::from_str(text)
                .map(Some)
                .map_err(|e| invalid(name, e.to_string())),
            Some(_) => Err(invalid(name, "expected a JSON object".to_string())),
        }
    }

    /// Array-valued parameter; a lone object counts as a one-element array.
    pub fn array_param(&self, name: &str) -> Result<Vec<Value>, ExecutionError> {
        let value = match self.require(name)? {
            Value::String(text) => serde_json::from_str(text).map_err(|e| invalid(name, e.to_string()))?,
            other => other.clone(),
        };
        match value {
            Value::Array(items) => Ok(items),
            Value::Object(_) => Ok(vec![value]),
            _ => Err(invalid(name, "expected a JSON array or object".to_string())),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub async fn read_data(&self, filters: Option<&Map<String, Value>>) -> Result<Vec<Record>, ExecutionError> {
        Ok(self.data.read(&self.table_name, filters).await?)
    }

    pub async fn insert_data(&self, records: Vec<Value>) -> Result<Value, ExecutionError> {
        Ok(self.data.insert(&self.table_name, records).await?)
    }

    pub async fn update_data(
        &self,
        record_id: impl Into<Value>,
        updates: Map<String, Value>,
    ) -> Result<Value, ExecutionError> {
        Ok(self
            .data
            .update(&self.table_name, ID_COLUMN, record_id.into(), updates)
            .await?)
    }

    pub async fn delete_data(&self, record_id: impl Into<Value>) -> Result<Value, ExecutionError> {
        Ok(self
            .data
            .delete(&self.table_name, ID_COLUMN, record_id.into())
            .await?)
    }
}

fn invalid(name: &str, reason: String) -> ExecutionError {
    ExecutionError::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}
