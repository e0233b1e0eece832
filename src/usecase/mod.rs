//! UseCase 層
//!
//! セッション確立・切断・メッセージ投稿の各ユースケース。
//! PresenceHub trait にのみ依存し、トランスポートの詳細には依存しない。

mod close_session;
mod error;
mod open_session;
mod post_message;

pub use close_session::CloseSessionUseCase;
pub use error::PresenceError;
pub use open_session::OpenSessionUseCase;
pub use post_message::PostMessageUseCase;
