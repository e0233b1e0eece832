//! UseCase: セッション切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CloseSessionUseCase::execute() メソッド
//! - レジストリ解放・ルーム退出・退室通知・roster 更新の一連の流れ
//!
//! ### なぜこのテストが必要か
//! - 切断経路（明示的な切断とストリーム drop）が複数あるため、
//!   退室通知がちょうど 1 回だけ配られることを保証する必要がある
//! - take-over 後の旧セッションの後始末が後続の接続を壊さないことを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーの切断と残存メンバーへの通知
//! - エッジケース：stale なセッション ID での二重解放、take-over 後の旧
//!   セッションの解放

use std::sync::Arc;

use crate::common::time::{get_utc_timestamp, timestamp_to_rfc3339};
use crate::domain::{ClientId, PresenceHub, SessionId, SsePayload};

use super::error::PresenceError;

/// セッション切断のユースケース
pub struct CloseSessionUseCase {
    hub: Arc<dyn PresenceHub>,
}

impl CloseSessionUseCase {
    pub fn new(hub: Arc<dyn PresenceHub>) -> Self {
        Self { hub }
    }

    /// セッション切断を実行
    ///
    /// `session` が現在の登録と一致しない場合（既に解放済み、または新しい
    /// 接続に置き換えられている場合）は何もしない。切断経路が重複しても
    /// 退室通知は 1 回しか配られない。
    pub async fn execute(&self, uid: &ClientId, session: SessionId) -> Result<(), PresenceError> {
        // 1. セッション ID が一致する場合のみレジストリから解放
        let Some(connection) = self.hub.release(uid, session).await else {
            tracing::debug!(
                "Stale teardown for uid {} (session {}), nothing to do",
                uid.as_str(),
                session
            );
            return Ok(());
        };

        // 2. ルームのメンバー集合から除去
        let room = connection.room.clone();
        self.hub.leave_room(&room, uid).await;

        // 3. 残存メンバーへ退室通知と更新済み roster を配る
        let now = get_utc_timestamp();
        let timestamp = timestamp_to_rfc3339(now);
        let leave_payload =
            SsePayload::user_leave(&connection.username, uid, &room, timestamp.clone())
                .to_json()?;
        self.hub.broadcast(&room, &leave_payload, None).await;

        let roster = self.hub.resolve_roster(&room).await;
        let roster_payload = SsePayload::users_list(&roster, &room, timestamp).to_json()?;
        self.hub.broadcast(&room, &roster_payload, None).await;

        tracing::info!(
            "Session {} closed: uid {} left room {}",
            session,
            uid.as_str(),
            room.as_str()
        );
        Ok(())
    }
}
