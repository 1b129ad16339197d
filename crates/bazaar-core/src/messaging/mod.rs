//! Outbound messaging: the channel port and per-session message lifecycle.

mod gateway;
mod lifecycle;

// Re-export public API
pub use gateway::{Button, ChannelGateway, DeliveryStatus, Keyboard, ScreenContent};
pub use lifecycle::MessageLifecycle;
