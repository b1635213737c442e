use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::context::ExecutionContext;
use super::error::ExecutionError;

/// Names reserved for the data helpers exposed to injected logic
pub const HELPER_NAMES: [&str; 4] = ["read_data", "insert_data", "update_data", "delete_data"];

/// Preferred entry point name
pub const MAIN: &str = "main";

/// A callable defined by injected logic, invoked with no arguments beyond its context
#[async_trait]
pub trait EntryPoint: Send + Sync {
    async fn call(&self, ctx: ExecutionContext) -> Result<Value, ExecutionError>;
}

struct FnEntryPoint<F>(F);

#[async_trait]
impl<F> EntryPoint for FnEntryPoint<F>
where
    F: Fn(ExecutionContext) -> BoxFuture<'static, Result<Value, ExecutionError>> + Send + Sync,
{
    async fn call(&self, ctx: ExecutionContext) -> Result<Value, ExecutionError> {
        (self.0)(ctx).await
    }
}

#[derive(Clone)]
pub enum Binding {
    /// Request parameter
    Value(Value),
    /// One of the four data helpers
    Helper,
    /// Callable defined by injected logic
    Function(Arc<dyn EntryPoint>),
}

/// Ordered name bindings for one execution. Rebinding a name keeps its
/// original position, so declaration order is stable.
#[derive(Clone, Default)]
pub struct Scope {
    bindings: Vec<(String, Binding)>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        let name = name.into();
        match self.bindings.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = binding,
            None => self.bindings.push((name, binding)),
        }
    }

    pub fn bind_params(&mut self, params: &Map<String, Value>) {
        for (name, value) in params {
            self.bind(name.clone(), Binding::Value(value.clone()));
        }
    }

    pub fn bind_helpers(&mut self) {
        for name in HELPER_NAMES {
            self.bind(name, Binding::Helper);
        }
    }

    /// Define a callable from an async closure
    pub fn define<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(ExecutionContext) -> BoxFuture<'static, Result<Value, ExecutionError>>
            + Send
            + Sync
            + 'static,
    {
        self.bind(name, Binding::Function(Arc::new(FnEntryPoint(f))));
    }

    pub fn define_entry(&mut self, name: impl Into<String>, entry: Arc<dyn EntryPoint>) {
        self.bind(name, Binding::Function(entry));
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name) {
            Some(Binding::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// All value bindings
    pub fn values(&self) -> Map<String, Value> {
        self.bindings
            .iter()
            .filter_map(|(name, b)| match b {
                Binding::Value(v) => Some((name.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(n, _)| n.as_str())
    }

    /// `main` if it is a callable, otherwise the first user callable in declaration order
    pub fn entry_point(&self) -> Option<(String, Arc<dyn EntryPoint>)> {
        if let Some(Binding::Function(f)) = self.get(MAIN) {
            return Some((MAIN.to_string(), f.clone()));
        }

        self.bindings.iter().find_map(|(name, b)| match b {
            Binding::Function(f) if is_entry_candidate(name) => Some((name.clone(), f.clone())),
            _ => None,
        })
    }
}

fn is_entry_candidate(name: &str) -> bool {
    !name.starts_with('_') && name != "execute" && !HELPER_NAMES.contains(&name)
}
