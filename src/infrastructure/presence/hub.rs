//! SSE 実装のプレゼンスハブ
//!
//! ## 責務
//!
//! - 接続レジストリとルームメンバーシップの一元管理
//! - クライアントへのペイロード送信（send_to, broadcast）
//!
//! ## 設計ノート
//!
//! SSE ストリームの生成は UI 層（`src/ui/handler/sse.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、ペイロード送信に
//! 使用します。レジストリとメンバーシップは 1 つの Mutex の下にあり、
//! 各操作は実行モデル上の不可分な 1 ステップになります。上位のセッション
//! 手順（join/leave の一連のブロードキャスト）は操作間のインターリーブを
//! 許容します。

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ClientConnection, ClientId, ConnectionInfo, PresenceHub, PusherChannel, RoomCode, RoomUser,
    SessionId, Username,
};

use super::{membership::RoomMembershipIndex, registry::ConnectionRegistry};

struct HubInner {
    registry: ConnectionRegistry,
    membership: RoomMembershipIndex,
}

/// Production presence hub backed by SSE pusher channels.
///
/// Constructed once at process start and shared through `AppState`; tests
/// isolate state by constructing independent hub instances.
pub struct SsePresenceHub {
    inner: Mutex<HubInner>,
    next_session: AtomicU64,
}

impl SsePresenceHub {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HubInner {
                registry: ConnectionRegistry::new(),
                membership: RoomMembershipIndex::new(),
            }),
            next_session: AtomicU64::new(1),
        }
    }
}

impl Default for SsePresenceHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresenceHub for SsePresenceHub {
    async fn register(
        &self,
        uid: ClientId,
        username: Username,
        room: RoomCode,
        sender: PusherChannel,
    ) -> (SessionId, Option<ClientConnection>) {
        let session = self.next_session.fetch_add(1, Ordering::Relaxed);
        let conn = ClientConnection {
            uid: uid.clone(),
            username,
            room,
            sender,
            session,
        };

        let mut inner = self.inner.lock().await;
        let replaced = inner.registry.register(conn);
        tracing::debug!("Client '{}' registered (session {})", uid.as_str(), session);
        (session, replaced)
    }

    async fn release(&self, uid: &ClientId, session: SessionId) -> Option<ClientConnection> {
        let mut inner = self.inner.lock().await;
        let released = inner.registry.release(uid, session);
        if released.is_some() {
            tracing::debug!(
                "Client '{}' unregistered (session {})",
                uid.as_str(),
                session
            );
        }
        released
    }

    async fn join_room(&self, room: &RoomCode, uid: &ClientId) {
        let mut inner = self.inner.lock().await;
        inner.membership.add_member(room, uid);
    }

    async fn leave_room(&self, room: &RoomCode, uid: &ClientId) {
        let mut inner = self.inner.lock().await;
        inner.membership.remove_member(room, uid);
    }

    async fn members_of(&self, room: &RoomCode) -> Vec<ClientId> {
        let inner = self.inner.lock().await;
        inner.membership.members_of(room)
    }

    async fn resolve_roster(&self, room: &RoomCode) -> Vec<RoomUser> {
        let inner = self.inner.lock().await;
        inner
            .membership
            .members_of(room)
            .into_iter()
            // Members whose connection vanished between the index update and
            // this resolution are skipped, not reported as errors.
            .filter_map(|uid| {
                inner.registry.get(&uid).map(|conn| RoomUser {
                    uid: conn.uid.clone(),
                    username: conn.username.clone(),
                })
            })
            .collect()
    }

    async fn send_to(&self, uid: &ClientId, content: &str) {
        let inner = self.inner.lock().await;
        if let Some(conn) = inner.registry.get(uid) {
            if let Err(e) = conn.sender.send(content.to_string()) {
                tracing::warn!("Failed to push payload to client '{}': {}", uid.as_str(), e);
            }
        }
    }

    async fn broadcast(&self, room: &RoomCode, content: &str, exclude: Option<&ClientId>) {
        let inner = self.inner.lock().await;
        let members = inner.membership.members_of(room);
        let mut delivered = 0usize;

        for uid in &members {
            if exclude.is_some_and(|excluded| excluded == uid) {
                continue;
            }
            let Some(conn) = inner.registry.get(uid) else {
                tracing::warn!(
                    "Member '{}' of room {} has no live connection, skipping",
                    uid.as_str(),
                    room.as_str()
                );
                continue;
            };
            // 一部の送信失敗はブロードキャスト全体を中断しない
            if let Err(e) = conn.sender.send(content.to_string()) {
                tracing::warn!("Failed to push payload to client '{}': {}", uid.as_str(), e);
            } else {
                delivered += 1;
            }
        }

        tracing::debug!(
            "Broadcast to room {} delivered to {} of {} members",
            room.as_str(),
            delivered,
            members.len()
        );
    }

    async fn connections(&self) -> Vec<ConnectionInfo> {
        let inner = self.inner.lock().await;
        inner
            .registry
            .iter()
            .map(|conn| ConnectionInfo {
                uid: conn.uid.as_str().to_string(),
                username: conn.username.as_str().to_string(),
                room_id: conn.room.as_str().to_string(),
                session: conn.session,
            })
            .collect()
    }
}
