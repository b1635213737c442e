pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod platform;

pub use app::{app, AppState};
