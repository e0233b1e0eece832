//! SSE chat-room server implementation.

pub mod handler; // 結合テストからアクセスするため public に変更
mod server;
mod signal;
pub mod state;

pub use server::Server;
