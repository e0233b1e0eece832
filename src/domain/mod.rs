//! Domain layer: value objects, entities, wire payloads and the interfaces
//! the usecase layer depends on.
//!
//! 具体的な実装（インメモリストア、SSE プレゼンスハブ）は Infrastructure 層が
//! 提供します（依存性の逆転）。

mod error;
pub mod payload;
pub mod presence;
pub mod room;
pub mod store;
mod values;

pub use error::DomainError;
pub use payload::{MessageData, RosterData, RosterEntry, SsePayload, UserEventData};
pub use presence::{
    ClientConnection, ConnectionInfo, PresenceHub, PusherChannel, RoomUser, SessionId,
};
pub use room::{DEFAULT_ROOM_TTL_HOURS, NewRoom, Room, RoomCode, RoomCodeFactory};
pub use store::{RoomStore, StoreError};
pub use values::{ClientId, MAX_MESSAGE_CONTENT_CHARS, MessageContent, Timestamp, Username};
