//! Application layer for Bazaar.
//!
//! This crate wires the session engine to the marketplace: the dispatcher
//! routes inbound chat events through navigation, wizards and pagination, and
//! the screen handlers render each logical screen through the message
//! lifecycle manager.

pub mod dispatcher;
pub mod screens;

pub use dispatcher::{Dispatcher, NavIntent, Services};
