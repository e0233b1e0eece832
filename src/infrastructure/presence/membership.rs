//! Room membership index: room code to member-identity set.

use std::collections::{HashMap, HashSet};

use crate::domain::{ClientId, RoomCode};

/// Auxiliary index kept consistent with the connection registry. Member sets
/// hold identities only, not connections; an empty set never persists.
#[derive(Default)]
pub struct RoomMembershipIndex {
    rooms: HashMap<RoomCode, HashSet<ClientId>>,
}

impl RoomMembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a member set exists for the room, then insert `uid`.
    /// Idempotent: inserting twice has no additional effect.
    pub fn add_member(&mut self, room: &RoomCode, uid: &ClientId) {
        self.rooms
            .entry(room.clone())
            .or_default()
            .insert(uid.clone());
    }

    /// Remove `uid` from the room's set; drop the room entry once the set
    /// empties. No-op for unknown rooms or members.
    pub fn remove_member(&mut self, room: &RoomCode, uid: &ClientId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(uid);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }

    /// Point-in-time snapshot of the room's members; empty for unknown rooms.
    pub fn members_of(&self, room: &RoomCode) -> Vec<ClientId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
