//! chat-server
//!
//! Multi-client async TCP server for the room chat system.

pub mod config;
pub mod server;

// these are internal modules, not re-exported
mod broadcast;
mod session;
