//! In-memory implementations of the engine's ports.

mod gateway;
mod services;

// Re-export public API
pub use gateway::{CallCounts, RecordingGateway};
pub use services::{
    InMemoryApplications, InMemoryNotifications, InMemoryOrders, InMemoryPayments,
    InMemoryProjects,
};
