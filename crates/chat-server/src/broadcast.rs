//! Room fan-out.
//!
//! A broadcast never writes to sockets directly: recipients are
//! snapshotted from the room directory in one atomic scan, then the
//! message is queued on each recipient's outbound channel. Each
//! session's writer task is the only thing that touches its socket,
//! so concurrent broadcasts to the same target interleave at line
//! granularity for free.

use std::sync::Arc;

use tracing::warn;

use chat_core::{RoomDirectory, RoomId, ServerMessage, SessionId};

/// Delivers messages to every current member of a room except one.
#[derive(Clone)]
pub struct Broadcaster {
    directory: Arc<RoomDirectory>,
}

impl Broadcaster {
    pub fn new(directory: Arc<RoomDirectory>) -> Self {
        Self { directory }
    }

    /// Queue `msg` for every member of `room` other than `exclude`.
    ///
    /// Fire-and-forget: a recipient whose outbound channel has closed
    /// (its writer died and cleanup is in flight) is logged and
    /// skipped, and nothing propagates back to the sender.
    pub async fn to_room(&self, room: RoomId, exclude: Option<SessionId>, msg: ServerMessage) {
        for member in self.directory.room_members(room, exclude).await {
            if member.outbound.send(msg.clone()).is_err() {
                warn!(
                    session = member.id.0,
                    nickname = %member.nickname,
                    room,
                    "dropping broadcast to closed session"
                );
            }
        }
    }
}
