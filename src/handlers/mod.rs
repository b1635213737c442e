// handlers/mod.rs - HTTP surface of one service instance
//
// Three routes, all public:
//   GET      /         static descriptor
//   GET      /health   liveness, no dependency checks
//   GET|POST /execute  run the injected logic against the request parameters

pub mod execute;
pub mod service;

pub use execute::execute;
pub use service::{health, home, not_found};
