// logic/mod.rs - Operator-selected injected logic
//
// Each service instance runs exactly one piece of logic, chosen at startup by
// SERVICE_LOGIC. Evaluating it only defines callables in the scope; the
// dispatcher decides which one runs.

use std::sync::Arc;

use crate::config::ConfigurationError;
use crate::dispatch::{DispatchError, Scope};

pub mod basic;
pub mod mutations;
pub mod records;

pub const DEFAULT_LOGIC: &str = "records-summary";

/// Body of operator-supplied logic, fixed per service instance
pub trait InjectedLogic: Send + Sync {
    fn name(&self) -> &str;

    /// Define callables in `scope`. Bound request parameters may be inspected;
    /// no I/O happens here.
    fn evaluate(&self, scope: &mut Scope) -> Result<(), DispatchError>;
}

/// Names accepted by [`from_name`]
pub const CATALOG: [&str; 7] = [
    "records-summary",
    "records-listing",
    "insert-records",
    "update-record",
    "delete-record",
    "echo",
    "none",
];

pub fn from_name(name: &str) -> Result<Arc<dyn InjectedLogic>, ConfigurationError> {
    let logic: Arc<dyn InjectedLogic> = match name {
        "records-summary" => Arc::new(records::RecordsReport::summary()),
        "records-listing" => Arc::new(records::RecordsReport::listing()),
        "insert-records" => Arc::new(mutations::InsertRecords),
        "update-record" => Arc::new(mutations::UpdateRecord),
        "delete-record" => Arc::new(mutations::DeleteRecord),
        "echo" => Arc::new(basic::Echo),
        "none" => Arc::new(basic::Nothing),
        other => return Err(ConfigurationError::UnknownLogic(other.to_string())),
    };
    Ok(logic)
}
