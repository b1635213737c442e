use futures::FutureExt;
use serde_json::{json, Value};

use crate::dispatch::{DispatchError, ExecutionContext, ExecutionError, Scope};

use super::InjectedLogic;

/// Reads the service table and reports how many rows came back.
/// `filters`, when given as an object, is forwarded to the read.
pub struct RecordsReport {
    name: &'static str,
    include_records: bool,
}

impl RecordsReport {
    pub fn summary() -> Self {
        Self {
            name: "records-summary",
            include_records: false,
        }
    }

    /// Same report, with the rows themselves in the result
    pub fn listing() -> Self {
        Self {
            name: "records-listing",
            include_records: true,
        }
    }
}

impl InjectedLogic for RecordsReport {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, scope: &mut Scope) -> Result<(), DispatchError> {
        let include_records = self.include_records;
        scope.define("main", move |ctx| report(ctx, include_records).boxed());
        Ok(())
    }
}

async fn report(ctx: ExecutionContext, include_records: bool) -> Result<Value, ExecutionError> {
    let filters = ctx.object_param("filters")?;
    let records = ctx.read_data(filters.as_ref()).await?;
    tracing::debug!("found {} records in {}", records.len(), ctx.table_name());

    let mut result = json!({
        "message": "Roble microservice executed successfully",
        "records_count": records.len(),
        "status": "completed",
    });
    if include_records {
        result["records"] = json!(records);
    }

    Ok(result)
}
