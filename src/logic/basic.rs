use futures::FutureExt;
use serde_json::Value;

use crate::dispatch::{DispatchError, ExecutionError, Scope};

use super::InjectedLogic;

/// Defines `echo_params` (no `main`), returning the merged parameters
pub struct Echo;

/// Defines nothing
pub struct Nothing;

impl InjectedLogic for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn evaluate(&self, scope: &mut Scope) -> Result<(), DispatchError> {
        scope.define("echo_params", |ctx| {
            async move { Ok::<_, ExecutionError>(Value::Object(ctx.params().clone())) }.boxed()
        });
        Ok(())
    }
}

impl InjectedLogic for Nothing {
    fn name(&self) -> &str {
        "none"
    }

    fn evaluate(&self, _scope: &mut Scope) -> Result<(), DispatchError> {
        Ok(())
    }
}
