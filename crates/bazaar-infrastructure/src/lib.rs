//! In-memory infrastructure for the Bazaar engine.
//!
//! Implementations of the core ports that keep everything in process memory:
//! a recording channel gateway and the five domain services. Integration
//! tests and demo embeddings exercise every screen end-to-end against them; a
//! real deployment swaps in an actual chat transport and persistent
//! marketplace services. The idle-session housekeeping task also lives here.

pub mod housekeeping;
pub mod memory;

pub use housekeeping::spawn_idle_sweeper;
pub use memory::{
    InMemoryApplications, InMemoryNotifications, InMemoryOrders, InMemoryPayments,
    InMemoryProjects, RecordingGateway,
};
