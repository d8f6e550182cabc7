//! Utilities shared by the hook handler: payload access, state, processes, logging.

pub mod debug;
pub mod payload;
pub mod persistence;
pub mod runner;
