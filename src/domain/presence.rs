//! Presence hub interface.
//!
//! プレゼンスハブ（接続レジストリ・ルームメンバーシップ・ブロードキャスト）が
//! ドメイン層に公開するインターフェース。UseCase 層はこの trait に依存し、
//! Infrastructure 層の具体的な実装（SSE 実装）には依存しない。

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use super::{ClientId, RoomCode, Username};

/// Channel used to push serialized payloads to one live connection.
///
/// This is the connection's only capability: dropping every clone of the
/// sender terminates the receiving stream.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Process-wide monotonic serial distinguishing successive connections that
/// reuse the same `uid` (take-over protocol).
pub type SessionId = u64;

/// One live streaming connection owned by the registry.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    pub uid: ClientId,
    pub username: Username,
    pub room: RoomCode,
    pub sender: PusherChannel,
    pub session: SessionId,
}

/// A resolved roster member: identity plus display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomUser {
    pub uid: ClientId,
    pub username: Username,
}

/// Diagnostics snapshot of one registered connection.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub uid: String,
    pub username: String,
    pub room_id: String,
    pub session: SessionId,
}

/// Presence hub: connection registry, room membership index and broadcast
/// router behind one injectable object.
#[async_trait]
pub trait PresenceHub: Send + Sync {
    /// Register a connection under `uid`, assigning it a fresh session id.
    ///
    /// A second registration for the same `uid` replaces the first entry and
    /// returns the replaced connection so the caller can drop its channel
    /// (terminating the superseded stream) and, when the replaced connection
    /// belonged to a different room, clean that room's membership (explicit
    /// take-over).
    async fn register(
        &self,
        uid: ClientId,
        username: Username,
        room: RoomCode,
        sender: PusherChannel,
    ) -> (SessionId, Option<ClientConnection>);

    /// Remove the registry entry for `uid` only while it still belongs to
    /// `session`, returning the released connection.
    ///
    /// Returns `None` for a stale teardown: the entry is absent or has been
    /// taken over by a newer session. Safe to call repeatedly.
    async fn release(&self, uid: &ClientId, session: SessionId) -> Option<ClientConnection>;

    /// Add `uid` to the room's member set (idempotent).
    async fn join_room(&self, room: &RoomCode, uid: &ClientId);

    /// Remove `uid` from the room's member set; the room entry disappears
    /// when the set empties. No-op for unknown rooms or members.
    async fn leave_room(&self, room: &RoomCode, uid: &ClientId);

    /// Point-in-time snapshot of the room's member identities.
    async fn members_of(&self, room: &RoomCode) -> Vec<ClientId>;

    /// Join the member set against the registry; members whose connection
    /// vanished between index update and resolution are silently skipped.
    async fn resolve_roster(&self, room: &RoomCode) -> Vec<RoomUser>;

    /// Deliver to exactly one connection if present; no-op if absent.
    async fn send_to(&self, uid: &ClientId, content: &str);

    /// Fan `content` out to all room members except `exclude`. Best-effort:
    /// per-recipient push failures are logged and swallowed.
    async fn broadcast(&self, room: &RoomCode, content: &str, exclude: Option<&ClientId>);

    /// Snapshot of every registered connection, for diagnostics.
    async fn connections(&self) -> Vec<ConnectionInfo>;
}
