//! Caption Studio Core Engine
//!
//! Core editing engine module. Handles the entity store, timeline
//! interaction, overlay editing, history, persistence, and external service
//! contracts.

pub mod captions;
pub mod history;
pub mod overlay;
pub mod project;
pub mod services;
pub mod timeline;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
