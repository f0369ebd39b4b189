//! chat-protocol
//!
//! Wire-level parsing/rendering for the chat server.
//!
//! This crate is responsible for turning logical chat messages
//! (`chat_core::ServerMessage` / `ClientCommand`) into newline-terminated
//! text lines and back again.
//!
//! - [`line_codec`] : the line protocol spoken over TCP

pub mod line_codec;

pub use line_codec::{
    parse_active_line,
    parse_nick_line,
    render_server_line,
    ClientLine,
    CommandError,
    COMMAND_PREFIX,
};
