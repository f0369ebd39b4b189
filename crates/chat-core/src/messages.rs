//! Message types used by the chat core.
//!
//! These are **transport-agnostic** logical messages:
//! - [`ServerMessage`]: everything the server can say to a client.
//! - [`ClientCommand`]: the room commands a client can issue.
//!
//! The line-level rendering/parsing of these lives in the
//! `chat-protocol` crate; this module is purely logical.

/// Identifier of a chat room.
pub type RoomId = u64;

/// The default room every session starts in and returns to on `LEAVE`.
///
/// The lobby is not a real room for notification purposes: no
/// joined/left notices are broadcast for movements into it beyond the
/// notice sent to the room being left.
pub const LOBBY: RoomId = 0;

/// A room command issued by an active client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    /// Join (or switch to) the given room. Always a positive id;
    /// the lobby cannot be joined explicitly.
    Join(RoomId),

    /// Return to the lobby.
    Leave,
}

/// A logical message from the server to one client.
///
/// Every variant corresponds to exactly one wire line; see
/// `chat_protocol::line_codec` for the rendered forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Sent once on connect: the client must supply a nickname next.
    NickRequired,

    /// The proposed nickname was invalid or taken.
    NickRejected { reason: String },

    /// The nickname was registered; the session is now active, in the lobby.
    NickAccepted,

    /// The sender is now a member of the given room.
    RoomJoined(RoomId),

    /// The sender left the given room and is back in the lobby.
    RoomLeft(RoomId),

    /// Snapshot of the *other* members of a room.
    UserList { room: RoomId, nicknames: Vec<String> },

    /// Malformed input or invalid command.
    Error(String),

    /// Informational reply, no state change.
    Info(String),

    /// A chat line relayed from another member of the same room.
    Chat { sender: String, text: String },

    /// Room notice: another member joined the room.
    MemberJoined { nickname: String, room: RoomId },

    /// Room notice: another member left the room (or disconnected).
    MemberLeft { nickname: String, room: RoomId },
}
