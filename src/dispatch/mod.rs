// dispatch/mod.rs - Per-request execution of injected logic
//
// Two guards, two outcomes:
//   * anything failing before an entry point runs (payload, evaluation) is a
//     DispatchError and becomes an HTTP 500 with success=false;
//   * a failing entry point is captured into `result` as a descriptive string
//     and the execution is still reported as success=true.

use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::logic::InjectedLogic;
use crate::platform::DataAccess;

pub mod context;
pub mod error;
pub mod scope;

pub use context::ExecutionContext;
pub use error::{DispatchError, ExecutionError};
pub use scope::{Binding, EntryPoint, Scope, HELPER_NAMES};

/// Result when the injected logic defines nothing to run
pub const EXECUTION_COMPLETED: &str = "Execution completed";

/// Successful dispatch payload, serialized as the `/execute` response
#[derive(Debug, Clone, Serialize)]
pub struct Execution {
    pub success: bool,
    pub result: Value,
    pub params: Map<String, Value>,
}

pub struct Dispatcher {
    data: Arc<dyn DataAccess>,
    table_name: Arc<str>,
    logic: Arc<dyn InjectedLogic>,
}

impl Dispatcher {
    pub fn new(
        data: Arc<dyn DataAccess>,
        table_name: impl Into<Arc<str>>,
        logic: Arc<dyn InjectedLogic>,
    ) -> Self {
        Self {
            data,
            table_name: table_name.into(),
            logic,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn logic_name(&self) -> &str {
        self.logic.name()
    }

    /// Merge the raw request payload and dispatch it
    pub async fn handle<I>(&self, body: Option<&[u8]>, query: I) -> Result<Execution, DispatchError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let params = merge_params(body, query)?;
        self.dispatch(params).await
    }

    pub async fn dispatch(&self, params: Map<String, Value>) -> Result<Execution, DispatchError> {
        let mut scope = Scope::new();
        scope.bind_params(&params);
        scope.bind_helpers();
        self.evaluate(&mut scope)?;

        let result = match scope.entry_point() {
            Some((name, entry)) => {
                let ctx = ExecutionContext::new(scope.values(), self.data.clone(), self.table_name.clone());
                invoke(&name, entry.as_ref(), ctx).await
            }
            None => Value::String(EXECUTION_COMPLETED.to_string()),
        };

        Ok(Execution {
            success: true,
            result,
            params,
        })
    }

    fn evaluate(&self, scope: &mut Scope) -> Result<(), DispatchError> {
        let logic = self.logic.as_ref();
        match std::panic::catch_unwind(AssertUnwindSafe(|| logic.evaluate(scope))) {
            Ok(outcome) => outcome,
            Err(panic) => Err(DispatchError::evaluation(logic.name(), panic_message(panic))),
        }
    }
}

async fn invoke(name: &str, entry: &dyn EntryPoint, ctx: ExecutionContext) -> Value {
    let outcome = AssertUnwindSafe(entry.call(ctx)).catch_unwind().await;
    let message = match outcome {
        Ok(Ok(value)) => return value,
        Ok(Err(e)) => e.to_string(),
        Err(panic) => panic_message(panic),
    };

    tracing::warn!("entry point {} failed: {}", name, message);
    Value::String(format!("Error executing function {}: {}", name, message))
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}

/// JSON body parameters overlaid by query parameters (query wins).
/// An absent or empty body counts as `{}`.
pub fn merge_params<I>(body: Option<&[u8]>, query: I) -> Result<Map<String, Value>, DispatchError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut params = match body.filter(|b| !b.iter().all(u8::is_ascii_whitespace)) {
        None => Map::new(),
        Some(bytes) => match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(DispatchError::BodyNotObject),
        },
    };

    for (key, value) in query {
        params.insert(key, Value::String(value));
    }

    Ok(params)
}
