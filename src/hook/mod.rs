//! Hook event classification and dispatch.

pub mod events;
pub mod handler;
pub mod messages;
pub mod notifier;
