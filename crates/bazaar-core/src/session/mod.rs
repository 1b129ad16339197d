//! Session domain module.
//!
//! Everything one chat identity owns: the session record itself, its typed
//! context bag, its navigation history, and the concurrency-safe store that
//! hands out per-chat session slots.

mod context;
mod model;
mod navigation;
mod store;

// Re-export public API
pub use context::ContextBag;
pub use model::Session;
pub use navigation::NavigationStack;
pub use store::{SessionSlot, SessionStore};
