//! The line protocol.
//!
//! Client → server (one line each):
//!
//! - Nickname proposal (only valid pre-activation):
//!   `NICK <name>`
//!
//! - Join/switch room:
//!   `COMMAND:JOIN:<n>`   (`<n>` a positive integer)
//!
//! - Return to the lobby:
//!   `COMMAND:LEAVE`
//!
//! - Anything else non-empty: chat text, relayed to the current room.
//!
//! Server → client lines are rendered by [`render_server_line`]; the
//! prefix of each line determines its type:
//!
//! - `NICK_REQUIRED` / `NICK_ACCEPTED` / `NICK_REJECTED: <reason>`
//! - `ROOM_JOINED:<n>` / `ROOM_LEFT:<n>`
//! - `USER_LIST:<room>:<comma-separated nicknames>`
//! - `ERROR: <text>` / `INFO: <text>`
//! - `<nickname>: <text>` (relayed chat)
//! - `<nickname> has joined/left room number '<n>'.` (room notices)

use chat_core::{ClientCommand, ServerMessage};
use thiserror::Error;

/// Prefix that marks a line as a command rather than chat text.
pub const COMMAND_PREFIX: &str = "COMMAND:";

/// Why a `COMMAND:` line could not be turned into a [`ClientCommand`].
///
/// The `Display` strings are sent back verbatim as the text of the
/// `ERROR:` reply, so they are part of the protocol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// `JOIN` with a missing, non-numeric, or non-positive room number.
    #[error("room number must be a positive integer.")]
    BadRoomNumber,

    /// A `COMMAND:` line naming no known command.
    #[error("unknown command '{0}'.")]
    UnknownCommand(String),
}

/// One parsed line from an active (post-negotiation) client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientLine {
    /// Blank after trimming; ignored without a response.
    Empty,

    /// A well-formed `COMMAND:` line.
    Command(ClientCommand),

    /// A malformed `COMMAND:` line; answered with `ERROR:`, never
    /// relayed as chat.
    Invalid(CommandError),

    /// Plain chat text.
    Chat(String),
}

/// Parse a line received while the session is still unauthenticated.
///
/// Returns the proposed nickname for `NICK <name>` lines, and `None`
/// for anything else. The name is trimmed but may be empty; emptiness
/// and length are validated at registration.
pub fn parse_nick_line(line: &str) -> Option<String> {
    let line = line.trim_end();
    let name = line.strip_prefix("NICK ")?;
    Some(name.trim().to_string())
}

/// Parse a line received from an active session.
///
/// Only trailing whitespace is trimmed; a leading space keeps a line
/// out of command territory and makes it chat text.
pub fn parse_active_line(line: &str) -> ClientLine {
    let line = line.trim_end();
    if line.is_empty() {
        return ClientLine::Empty;
    }

    let Some(command) = line.strip_prefix(COMMAND_PREFIX) else {
        return ClientLine::Chat(line.to_string());
    };

    if command == "LEAVE" {
        return ClientLine::Command(ClientCommand::Leave);
    }
    if command == "JOIN" || command.starts_with("JOIN:") {
        let number = command.strip_prefix("JOIN:").unwrap_or("");
        return match number.parse::<u64>() {
            Ok(n) if n > 0 => ClientLine::Command(ClientCommand::Join(n)),
            _ => ClientLine::Invalid(CommandError::BadRoomNumber),
        };
    }
    ClientLine::Invalid(CommandError::UnknownCommand(command.to_string()))
}

/// Render one [`ServerMessage`] as a wire line, without the trailing
/// newline (the writer appends it).
pub fn render_server_line(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::NickRequired => "NICK_REQUIRED".to_string(),
        ServerMessage::NickRejected { reason } => format!("NICK_REJECTED: {reason}"),
        ServerMessage::NickAccepted => "NICK_ACCEPTED".to_string(),
        ServerMessage::RoomJoined(room) => format!("ROOM_JOINED:{room}"),
        ServerMessage::RoomLeft(room) => format!("ROOM_LEFT:{room}"),
        ServerMessage::UserList { room, nicknames } => {
            format!("USER_LIST:{room}:{}", nicknames.join(","))
        }
        ServerMessage::Error(text) => format!("ERROR: {text}"),
        ServerMessage::Info(text) => format!("INFO: {text}"),
        ServerMessage::Chat { sender, text } => format!("{sender}: {text}"),
        ServerMessage::MemberJoined { nickname, room } => {
            format!("{nickname} has joined room number '{room}'.")
        }
        ServerMessage::MemberLeft { nickname, room } => {
            format!("{nickname} has left room number '{room}'.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nick_lines_yield_trimmed_names() {
        assert_eq!(parse_nick_line("NICK alice\r"), Some("alice".to_string()));
        assert_eq!(parse_nick_line("NICK   bob  "), Some("bob".to_string()));
        // Empty proposals still parse; registration rejects them.
        assert_eq!(parse_nick_line("NICK "), Some(String::new()));

        assert_eq!(parse_nick_line("NICKalice"), None);
        assert_eq!(parse_nick_line("hello"), None);
        assert_eq!(parse_nick_line(""), None);
    }

    #[test]
    fn join_and_leave_commands_parse() {
        assert_eq!(
            parse_active_line("COMMAND:JOIN:5"),
            ClientLine::Command(ClientCommand::Join(5))
        );
        assert_eq!(
            parse_active_line("COMMAND:JOIN:10\r\n".trim_end()),
            ClientLine::Command(ClientCommand::Join(10))
        );
        assert_eq!(
            parse_active_line("COMMAND:LEAVE"),
            ClientLine::Command(ClientCommand::Leave)
        );
    }

    #[test]
    fn bad_room_numbers_are_invalid_not_chat() {
        for line in [
            "COMMAND:JOIN:abc",
            "COMMAND:JOIN:0",
            "COMMAND:JOIN:-3",
            "COMMAND:JOIN:",
            "COMMAND:JOIN",
        ] {
            assert_eq!(
                parse_active_line(line),
                ClientLine::Invalid(CommandError::BadRoomNumber),
                "line: {line}"
            );
        }
    }

    #[test]
    fn unknown_commands_are_invalid_not_chat() {
        assert_eq!(
            parse_active_line("COMMAND:SHOUT:5"),
            ClientLine::Invalid(CommandError::UnknownCommand("SHOUT:5".to_string()))
        );
        // Commands are case-sensitive.
        assert_eq!(
            parse_active_line("COMMAND:leave"),
            ClientLine::Invalid(CommandError::UnknownCommand("leave".to_string()))
        );
    }

    #[test]
    fn everything_else_is_chat_or_empty() {
        assert_eq!(parse_active_line(""), ClientLine::Empty);
        assert_eq!(parse_active_line("   \r\n"), ClientLine::Empty);
        assert_eq!(
            parse_active_line("hello there\r"),
            ClientLine::Chat("hello there".to_string())
        );
        // NICK is not a command once active; it relays as chat.
        assert_eq!(
            parse_active_line("NICK carol"),
            ClientLine::Chat("NICK carol".to_string())
        );
        // A leading space demotes a would-be command to chat.
        assert_eq!(
            parse_active_line(" COMMAND:LEAVE"),
            ClientLine::Chat(" COMMAND:LEAVE".to_string())
        );
    }

    #[test]
    fn server_lines_render_the_documented_forms() {
        assert_eq!(render_server_line(&ServerMessage::NickRequired), "NICK_REQUIRED");
        assert_eq!(render_server_line(&ServerMessage::NickAccepted), "NICK_ACCEPTED");
        assert_eq!(
            render_server_line(&ServerMessage::NickRejected {
                reason: "Nickname 'alice' is already taken.".to_string()
            }),
            "NICK_REJECTED: Nickname 'alice' is already taken."
        );
        assert_eq!(render_server_line(&ServerMessage::RoomJoined(10)), "ROOM_JOINED:10");
        assert_eq!(render_server_line(&ServerMessage::RoomLeft(10)), "ROOM_LEFT:10");
        assert_eq!(
            render_server_line(&ServerMessage::UserList {
                room: 5,
                nicknames: vec!["alice".to_string(), "bob".to_string()]
            }),
            "USER_LIST:5:alice,bob"
        );
        assert_eq!(
            render_server_line(&ServerMessage::UserList {
                room: 0,
                nicknames: vec![]
            }),
            "USER_LIST:0:"
        );
        assert_eq!(
            render_server_line(&ServerMessage::Error("bad".to_string())),
            "ERROR: bad"
        );
        assert_eq!(
            render_server_line(&ServerMessage::Info("already in lobby.".to_string())),
            "INFO: already in lobby."
        );
        assert_eq!(
            render_server_line(&ServerMessage::Chat {
                sender: "alice".to_string(),
                text: "hi".to_string()
            }),
            "alice: hi"
        );
        assert_eq!(
            render_server_line(&ServerMessage::MemberJoined {
                nickname: "bob".to_string(),
                room: 10
            }),
            "bob has joined room number '10'."
        );
        assert_eq!(
            render_server_line(&ServerMessage::MemberLeft {
                nickname: "bob".to_string(),
                room: 10
            }),
            "bob has left room number '10'."
        );
    }
}
