//! Session identity and per-session channel aliases.

use tokio::sync::mpsc;

use crate::messages::ServerMessage;

/// Identifier for a connected session.
///
/// This is intentionally opaque; we just guarantee uniqueness
/// over the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Outbound messages queued for delivery to one client.
///
/// All writes to a client's socket flow through this single channel
/// (its own replies and other sessions' broadcasts alike), so the
/// socket's write half never needs a lock.
pub type OutboundTx = mpsc::UnboundedSender<ServerMessage>;
pub type OutboundRx = mpsc::UnboundedReceiver<ServerMessage>;
