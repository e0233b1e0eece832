//! Request handlers.

pub mod admin;
pub mod http;
pub mod room;
pub mod sse;

pub use admin::admin_action;
pub use http::{debug_connections, health_check};
pub use room::{create_room, find_room, post_message};
pub use sse::sse_handler;
