//! chat-core
//!
//! Pure chat session logic:
//! - messages (server/client logical types)
//! - session identity and channel aliases
//! - the shared room directory (membership + nickname uniqueness)

pub mod directory;
pub mod error;
pub mod messages;
pub mod session;

pub use messages::{ClientCommand, RoomId, ServerMessage, LOBBY};

pub use session::{OutboundRx, OutboundTx, SessionId};

pub use directory::{Departure, MemberHandle, RoomDirectory, RoomUpdate};
pub use error::RegisterError;
