//! Error types for the chat core.

use thiserror::Error;

/// Why a nickname registration was refused.
///
/// The `Display` strings double as the reason text carried by the
/// `NICK_REJECTED:` wire line, so they are part of the protocol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// Empty after trimming, or longer than the nickname limit.
    #[error("Nickname invalid (empty or too long).")]
    InvalidNickname,

    /// Another live session already holds this exact nickname.
    #[error("Nickname '{0}' is already taken.")]
    NicknameTaken(String),
}
