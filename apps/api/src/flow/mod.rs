//! Upload → template → edit flow over in-memory sessions.

pub mod handlers;
pub mod service;
pub mod session;
pub mod store;

pub use store::SessionStore;
