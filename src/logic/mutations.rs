use futures::FutureExt;
use serde_json::Value;

use crate::dispatch::{DispatchError, ExecutionContext, ExecutionError, Scope};

use super::InjectedLogic;

/// `insert_data(records)`; `records` may be one object or an array of them
pub struct InsertRecords;

/// `update_data(record_id, updates)`
pub struct UpdateRecord;

/// `delete_data(record_id)`
pub struct DeleteRecord;

impl InjectedLogic for InsertRecords {
    fn name(&self) -> &str {
        "insert-records"
    }

    fn evaluate(&self, scope: &mut Scope) -> Result<(), DispatchError> {
        scope.define("main", |ctx| insert(ctx).boxed());
        Ok(())
    }
}

impl InjectedLogic for UpdateRecord {
    fn name(&self) -> &str {
        "update-record"
    }

    fn evaluate(&self, scope: &mut Scope) -> Result<(), DispatchError> {
        scope.define("main", |ctx| update(ctx).boxed());
        Ok(())
    }
}

impl InjectedLogic for DeleteRecord {
    fn name(&self) -> &str {
        "delete-record"
    }

    fn evaluate(&self, scope: &mut Scope) -> Result<(), DispatchError> {
        scope.define("main", |ctx| delete(ctx).boxed());
        Ok(())
    }
}

async fn insert(ctx: ExecutionContext) -> Result<Value, ExecutionError> {
    let records = ctx.array_param("records")?;
    ctx.insert_data(records).await
}

async fn update(ctx: ExecutionContext) -> Result<Value, ExecutionError> {
    let record_id = ctx.require("record_id")?.clone();
    let updates = ctx
        .object_param("updates")?
        .ok_or_else(|| ExecutionError::MissingParameter("updates".to_string()))?;
    ctx.update_data(record_id, updates).await
}

async fn delete(ctx: ExecutionContext) -> Result<Value, ExecutionError> {
    let record_id = ctx.require("record_id")?.clone();
    ctx.delete_data(record_id).await
}
