//! Room store interface.
//!
//! ドメイン層が必要とするルーム永続化のインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use thiserror::Error;

use super::{NewRoom, Room, RoomCode, Timestamp};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("room code pool exhausted")]
    CodePoolExhausted,

    #[error("room storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable room storage, the authority for room expiry.
///
/// `delete_expired` must be an unconditional delete-by-predicate: idempotent
/// (deleting already-deleted rooms affects zero rows) and safe to run
/// concurrently with itself and with room creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Create a room, assigning a fresh code and
    /// `expired_time = now + TTL`.
    async fn create_room(&self, new_room: NewRoom) -> Result<Room, StoreError>;

    /// Look a room up by its 6-digit code.
    async fn find_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError>;

    /// Delete every room with `expired_time < now`; returns the number of
    /// rooms deleted (zero is a valid, non-error outcome).
    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError>;

    /// Count rooms with `expired_time < now` without deleting them.
    async fn count_expired(&self, now: Timestamp) -> Result<u64, StoreError>;
}
