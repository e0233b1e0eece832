//! InMemory Room Store 実装
//!
//! ドメイン層が定義する RoomStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! 削除は述語による無条件削除です：既に消えた行の再削除は 0 行に作用し、
//! 自分自身との並行実行やルーム作成との並行実行に対して安全です。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::time::Clock;
use crate::domain::{NewRoom, Room, RoomCode, RoomCodeFactory, RoomStore, StoreError, Timestamp};

/// Bounded retries when a generated code collides with a live room.
const MAX_CODE_ATTEMPTS: usize = 100;

/// インメモリ Room Store 実装
pub struct InMemoryRoomStore {
    rooms: Mutex<HashMap<RoomCode, Room>>,
    clock: Arc<dyn Clock>,
    ttl_hours: i64,
}

impl InMemoryRoomStore {
    /// Create a store computing `expired_time = now + ttl_hours` at creation.
    pub fn new(clock: Arc<dyn Clock>, ttl_hours: i64) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            clock,
            ttl_hours,
        }
    }

    /// Number of rooms currently stored (diagnostics and tests).
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn create_room(&self, new_room: NewRoom) -> Result<Room, StoreError> {
        let mut rooms = self.rooms.lock().await;

        let mut code = RoomCodeFactory::generate();
        let mut attempts = 1;
        while rooms.contains_key(&code) {
            if attempts >= MAX_CODE_ATTEMPTS {
                return Err(StoreError::CodePoolExhausted);
            }
            code = RoomCodeFactory::generate();
            attempts += 1;
        }

        let created_at = Timestamp::new(self.clock.now_millis());
        let room = Room {
            room_id: code.clone(),
            room_name: new_room.room_name.clone(),
            is_private: new_room.is_private(),
            created_at,
            expired_time: created_at.plus_hours(self.ttl_hours),
        };
        rooms.insert(code, room.clone());

        tracing::info!(
            "Room {} created, expires at {}",
            room.room_id.as_str(),
            room.expired_time.value()
        );
        Ok(room)
    }

    async fn find_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(code).cloned())
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut rooms = self.rooms.lock().await;
        let before = rooms.len();
        rooms.retain(|_, room| !room.is_expired(now));
        Ok((before - rooms.len()) as u64)
    }

    async fn count_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.values().filter(|room| room.is_expired(now)).count() as u64)
    }
}
