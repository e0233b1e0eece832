//! SSE presence hub: connection registry, room membership index and
//! broadcast fan-out.

mod hub;
mod membership;
mod registry;

pub use hub::SsePresenceHub;
pub use membership::RoomMembershipIndex;
pub use registry::ConnectionRegistry;
