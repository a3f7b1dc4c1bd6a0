//! Project Module
//!
//! The editor session owning all state for one loaded video, and the JSON
//! persistence that mirrors it to durable storage.

pub mod persist;
pub mod session;

pub use persist::SessionSnapshot;
pub use session::{EditorSession, SessionMeta};
