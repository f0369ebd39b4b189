//! The room directory: the single source of truth for membership.
//!
//! Maps each active [`SessionId`] to its nickname, current room, and
//! outbound channel. Every membership-scoped operation goes through
//! this one structure, serialized behind a single `RwLock`:
//! - nickname uniqueness checks
//! - room moves
//! - fan-out target selection and user-list snapshots
//!
//! Two rules keep the rest of the server simple:
//! - only the session that owns an entry ever mutates it;
//! - no I/O happens while the lock is held (outbound channel sends are
//!   non-blocking and do not count).

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::RegisterError;
use crate::messages::{RoomId, LOBBY};
use crate::session::{OutboundTx, SessionId};

/// Maximum accepted nickname length, in characters.
pub const MAX_NICKNAME_LEN: usize = 20;

/// One live session's entry. Never leaves the directory; callers get
/// [`MemberHandle`] / [`Departure`] copies instead.
#[derive(Debug)]
struct Member {
    nickname: String,
    room: RoomId,
    outbound: OutboundTx,
}

/// Snapshot of one room member, taken for fan-out.
#[derive(Debug, Clone)]
pub struct MemberHandle {
    pub id: SessionId,
    pub nickname: String,
    pub outbound: OutboundTx,
}

/// What `unregister` captured about the removed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub nickname: String,
    pub room: RoomId,
}

/// Result of an atomic room change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomUpdate {
    /// The entry moved; `old_room` is where it was before the update.
    Moved { old_room: RoomId },

    /// The entry was already in the requested room; nothing changed.
    Unchanged,
}

/// Shared membership table. See the module docs for the locking rules.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    members: RwLock<HashMap<SessionId, Member>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly negotiated nickname for `id`, placing the
    /// session in the lobby.
    ///
    /// Validation and the uniqueness scan happen under the write lock,
    /// so two sessions racing to claim the same name cannot both
    /// succeed. Comparison is exact-match, case-sensitive.
    ///
    /// The caller must not already hold an entry for `id`; sessions
    /// register at most once in their lifetime.
    pub async fn register(
        &self,
        id: SessionId,
        nickname: &str,
        outbound: OutboundTx,
    ) -> Result<(), RegisterError> {
        let nickname = nickname.trim();
        if nickname.is_empty() || nickname.chars().count() > MAX_NICKNAME_LEN {
            return Err(RegisterError::InvalidNickname);
        }

        let mut members = self.members.write().await;
        if members.values().any(|m| m.nickname == nickname) {
            return Err(RegisterError::NicknameTaken(nickname.to_string()));
        }
        members.insert(
            id,
            Member {
                nickname: nickname.to_string(),
                room: LOBBY,
                outbound,
            },
        );
        Ok(())
    }

    /// Remove the entry for `id`, capturing its last-known nickname and
    /// room. Returns `None` if the session never registered (e.g. it
    /// disconnected during nickname negotiation).
    pub async fn unregister(&self, id: SessionId) -> Option<Departure> {
        let mut members = self.members.write().await;
        members.remove(&id).map(|m| Departure {
            nickname: m.nickname,
            room: m.room,
        })
    }

    /// Atomically move `id` to `room`.
    ///
    /// Returns `None` if `id` has no entry. The caller broadcasts any
    /// joined/left notices strictly *after* this returns, so the
    /// mutation is visible before the notifications go out.
    pub async fn set_room(&self, id: SessionId, room: RoomId) -> Option<RoomUpdate> {
        let mut members = self.members.write().await;
        let member = members.get_mut(&id)?;
        if member.room == room {
            return Some(RoomUpdate::Unchanged);
        }
        let old_room = member.room;
        member.room = room;
        Some(RoomUpdate::Moved { old_room })
    }

    /// Current room of `id`, read fresh from the directory.
    pub async fn room_of(&self, id: SessionId) -> Option<RoomId> {
        let members = self.members.read().await;
        members.get(&id).map(|m| m.room)
    }

    /// Whether any live entry holds exactly this nickname.
    pub async fn is_nickname_taken(&self, nickname: &str) -> bool {
        let members = self.members.read().await;
        members.values().any(|m| m.nickname == nickname)
    }

    /// Nicknames of the members of `room`, excluding `exclude`, sorted
    /// for deterministic `USER_LIST` output.
    pub async fn snapshot_room(&self, room: RoomId, exclude: Option<SessionId>) -> Vec<String> {
        let members = self.members.read().await;
        let mut names: Vec<String> = members
            .iter()
            .filter(|(id, m)| m.room == room && Some(**id) != exclude)
            .map(|(_, m)| m.nickname.clone())
            .collect();
        names.sort();
        names
    }

    /// Fan-out targets: handles for every member of `room` except
    /// `exclude`, snapshotted under the lock in one atomic scan.
    pub async fn room_members(
        &self,
        room: RoomId,
        exclude: Option<SessionId>,
    ) -> Vec<MemberHandle> {
        let members = self.members.read().await;
        members
            .iter()
            .filter(|(id, m)| m.room == room && Some(**id) != exclude)
            .map(|(id, m)| MemberHandle {
                id: *id,
                nickname: m.nickname.clone(),
                outbound: m.outbound.clone(),
            })
            .collect()
    }

    /// Number of live (registered) sessions.
    pub async fn member_count(&self) -> usize {
        let members = self.members.read().await;
        members.len()
    }
}
