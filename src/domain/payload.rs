//! Stream payloads pushed to connected clients.
//!
//! Every payload serializes to the wire envelope `{"type": ..., "data": ...}`.
//! Payloads are immutable once constructed and delivered fire-and-forget;
//! there is no acknowledgement.

use serde::{Deserialize, Serialize};

use super::{ClientId, RoomCode, RoomUser, Username};

/// Discriminated stream payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SsePayload {
    /// Someone joined the room (sent to existing members).
    #[serde(rename = "room:user:enter")]
    UserEnter(UserEventData),

    /// Someone left the room (sent to remaining members).
    #[serde(rename = "room:user:leave")]
    UserLeave(UserEventData),

    /// Point-in-time roster snapshot.
    #[serde(rename = "room:users:list")]
    UsersList(RosterData),

    /// Chat message relayed to room members.
    #[serde(rename = "room:message")]
    Message(MessageData),
}

/// `data` body for enter/leave notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEventData {
    pub user: String,
    pub uid: String,
    #[serde(rename = "roomId")]
    pub room_id: String,
    pub timestamp: String,
}

/// One `{uid, username}` roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub uid: String,
    pub username: String,
}

/// `data` body for roster snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterData {
    pub users: Vec<RosterEntry>,
    #[serde(rename = "roomId")]
    pub room_id: String,
    pub timestamp: String,
}

/// `data` body for chat messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub id: String,
    pub user: String,
    pub uid: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
}

impl SsePayload {
    /// Build a roster snapshot from resolved room members.
    pub fn users_list(roster: &[RoomUser], room: &RoomCode, timestamp: String) -> Self {
        let users = roster
            .iter()
            .map(|member| RosterEntry {
                uid: member.uid.as_str().to_string(),
                username: member.username.as_str().to_string(),
            })
            .collect();
        Self::UsersList(RosterData {
            users,
            room_id: room.as_str().to_string(),
            timestamp,
        })
    }

    /// Build an enter notification for `uid`.
    pub fn user_enter(
        username: &Username,
        uid: &ClientId,
        room: &RoomCode,
        timestamp: String,
    ) -> Self {
        Self::UserEnter(UserEventData {
            user: username.as_str().to_string(),
            uid: uid.as_str().to_string(),
            room_id: room.as_str().to_string(),
            timestamp,
        })
    }

    /// Build a leave notification for `uid`.
    pub fn user_leave(
        username: &Username,
        uid: &ClientId,
        room: &RoomCode,
        timestamp: String,
    ) -> Self {
        Self::UserLeave(UserEventData {
            user: username.as_str().to_string(),
            uid: uid.as_str().to_string(),
            room_id: room.as_str().to_string(),
            timestamp,
        })
    }

    /// Serialize to the wire JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
