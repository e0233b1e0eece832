//! Server state and connection management.

use std::sync::Arc;

use crate::common::time::Clock;
use crate::domain::{PresenceHub, RoomStore};
use crate::infrastructure::scheduler::SchedulerHandle;
use crate::usecase::{CloseSessionUseCase, OpenSessionUseCase, PostMessageUseCase};

/// Shared application state
pub struct AppState {
    /// OpenSessionUseCase（セッション確立のユースケース）
    pub open_session_usecase: Arc<OpenSessionUseCase>,
    /// CloseSessionUseCase（セッション切断のユースケース）
    pub close_session_usecase: Arc<CloseSessionUseCase>,
    /// PostMessageUseCase（メッセージ投稿のユースケース）
    pub post_message_usecase: Arc<PostMessageUseCase>,
    /// Room Store（ルーム永続化の抽象化）
    pub room_store: Arc<dyn RoomStore>,
    /// PresenceHub（接続レジストリの抽象化、診断用）
    pub hub: Arc<dyn PresenceHub>,
    /// 期限切れルーム削除スケジューラへのハンドル
    pub scheduler: SchedulerHandle,
    /// Clock（時刻取得の抽象化）
    pub clock: Arc<dyn Clock>,
}
