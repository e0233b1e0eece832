//! Room entity and room-code generation.
//!
//! Rooms are short-lived: the expiration timestamp is computed once at
//! creation (`created_at + TTL`) and never renewed afterwards, so a busy
//! room still expires on schedule.

use rand::Rng;

use super::{DomainError, Timestamp};

/// Fixed room lifetime applied at creation.
pub const DEFAULT_ROOM_TTL_HOURS: i64 = 24;

/// 6-digit, zero-padded room code (e.g. `"000123"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(String);

impl RoomCode {
    /// Create a RoomCode; the value must be exactly 6 ASCII digits.
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidRoomCode(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Factory for random room codes.
pub struct RoomCodeFactory;

impl RoomCodeFactory {
    /// Generate a random code in `000000..=999999`, zero-padded to 6 digits.
    pub fn generate() -> RoomCode {
        let n: u32 = rand::rng().random_range(0..1_000_000);
        RoomCode(format!("{:06}", n))
    }
}

/// Persisted room record, referenced by the presence layer only through its
/// code and `expired_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub room_id: RoomCode,
    pub room_name: Option<String>,
    pub is_private: bool,
    pub created_at: Timestamp,
    pub expired_time: Timestamp,
}

impl Room {
    /// Whether this room is past its expiration at `now`.
    ///
    /// Strictly-less comparison: a room whose `expired_time` equals `now`
    /// is not yet expired.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expired_time < now
    }
}

/// Creation attributes supplied by the caller; code and timestamps are
/// assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewRoom {
    pub room_name: Option<String>,
    pub password: Option<String>,
}

impl NewRoom {
    /// A room is private when a non-empty password was supplied.
    pub fn is_private(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}
