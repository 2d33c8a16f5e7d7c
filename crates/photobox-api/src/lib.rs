//! Photobox API Library
//!
//! This crate provides the HTTP handlers, error rendering and application
//! setup of the photo gallery service.

// Module declarations
mod api_doc;
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
