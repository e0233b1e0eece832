//! UseCase: メッセージ投稿処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PostMessageUseCase::execute() メソッド
//! - メッセージペイロードの構築と送信者以外へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者自身にメッセージがエコーバックされないことを保証するため
//! - サーバ側で付与する ID とタイムスタンプがレスポンスに含まれることを
//!   確認するため
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数メンバーのルームへの投稿
//! - エッジケース：送信者しかいないルームへの投稿

use std::sync::Arc;

use uuid::Uuid;

use crate::common::time::{get_utc_timestamp, timestamp_to_rfc3339};
use crate::domain::{
    ClientId, MessageContent, MessageData, PresenceHub, RoomCode, SsePayload, Username,
};

use super::error::PresenceError;

/// メッセージ投稿のユースケース
pub struct PostMessageUseCase {
    hub: Arc<dyn PresenceHub>,
}

impl PostMessageUseCase {
    pub fn new(hub: Arc<dyn PresenceHub>) -> Self {
        Self { hub }
    }

    /// メッセージ投稿を実行
    ///
    /// ID とタイムスタンプはサーバ側で付与する。送信者自身には配信されない
    /// （クライアントは自分の投稿をローカルに表示する前提）。
    ///
    /// # Returns
    ///
    /// * `Ok(MessageData)` - 配信したメッセージ（レスポンスにそのまま返せる）
    /// * `Err(PresenceError)` - ペイロードの構築に失敗
    pub async fn execute(
        &self,
        room: RoomCode,
        sender_uid: ClientId,
        sender_name: Username,
        content: MessageContent,
        kind: Option<String>,
    ) -> Result<MessageData, PresenceError> {
        // 1. サーバ側で ID とタイムスタンプを付与してペイロードを構築
        let message = MessageData {
            id: Uuid::new_v4().to_string(),
            user: sender_name.as_str().to_string(),
            uid: sender_uid.as_str().to_string(),
            content: content.as_str().to_string(),
            kind: kind.unwrap_or_else(|| "text".to_string()),
            timestamp: timestamp_to_rfc3339(get_utc_timestamp()),
        };
        let payload = SsePayload::Message(message.clone()).to_json()?;

        // 2. 送信者を除いてブロードキャスト
        self.hub.broadcast(&room, &payload, Some(&sender_uid)).await;

        tracing::debug!(
            "Message {} from uid {} relayed to room {}",
            message.id,
            sender_uid.as_str(),
            room.as_str()
        );
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::presence::SsePresenceHub;
    use crate::usecase::OpenSessionUseCase;
    use tokio::sync::mpsc;

    fn room() -> RoomCode {
        RoomCode::new("000123".to_string()).unwrap()
    }

    fn uid(s: &str) -> ClientId {
        ClientId::new(s.to_string()).unwrap()
    }

    fn name(s: &str) -> Username {
        Username::new(s.to_string()).unwrap()
    }

    fn content(s: &str) -> MessageContent {
        MessageContent::new(s.to_string()).unwrap()
    }

    async fn join(
        open: &OpenSessionUseCase,
        id: &str,
        user: &str,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        open.execute(uid(id), name(user), room(), tx).await.unwrap();
        let _ = rx.recv().await; // 本人宛の roster を読み捨てる
        rx
    }

    #[tokio::test]
    async fn test_message_reaches_everyone_but_the_sender() {
        // テスト項目: メッセージは送信者以外の全メンバーに届く
        // given (前提条件): alice と bob が入室済み
        let hub = Arc::new(SsePresenceHub::new());
        let open = OpenSessionUseCase::new(hub.clone());
        let post = PostMessageUseCase::new(hub.clone());
        let mut rx_a = join(&open, "uid-a", "alice").await;
        let mut rx_b = join(&open, "uid-b", "bob").await;
        let _ = rx_a.recv().await; // bob の enter
        let _ = rx_a.recv().await; // 更新済み roster

        // when (操作): alice が投稿
        let sent = post
            .execute(room(), uid("uid-a"), name("alice"), content("hello"), None)
            .await
            .unwrap();

        // then (期待する結果): bob にだけ届き、内容が一致する
        let received: serde_json::Value =
            serde_json::from_str(&rx_b.recv().await.unwrap()).unwrap();
        assert_eq!(received["type"], "room:message");
        assert_eq!(received["data"]["id"], sent.id.as_str());
        assert_eq!(received["data"]["content"], "hello");
        assert_eq!(received["data"]["user"], "alice");
        assert_eq!(received["data"]["type"], "text");
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_server_assigns_id_and_timestamp() {
        // テスト項目: ID とタイムスタンプはサーバ側で付与される
        // given (前提条件):
        let hub = Arc::new(SsePresenceHub::new());
        let post = PostMessageUseCase::new(hub.clone());

        // when (操作): 2 回投稿する
        let first = post
            .execute(room(), uid("uid-a"), name("alice"), content("one"), None)
            .await
            .unwrap();
        let second = post
            .execute(room(), uid("uid-a"), name("alice"), content("two"), None)
            .await
            .unwrap();

        // then (期待する結果): ID は一意、タイムスタンプは RFC 3339 形式
        assert_ne!(first.id, second.id);
        assert!(first.timestamp.contains('T'));
        assert!(first.timestamp.contains("+00:00"));
    }

    #[tokio::test]
    async fn test_posting_to_a_room_with_only_the_sender_is_ok() {
        // テスト項目: 送信者しかいないルームへの投稿も成功する
        // given (前提条件): alice のみ入室
        let hub = Arc::new(SsePresenceHub::new());
        let open = OpenSessionUseCase::new(hub.clone());
        let post = PostMessageUseCase::new(hub.clone());
        let mut rx_a = join(&open, "uid-a", "alice").await;

        // when (操作):
        let result = post
            .execute(room(), uid("uid-a"), name("alice"), content("solo"), None)
            .await;

        // then (期待する結果): 成功し、本人には何も届かない
        assert!(result.is_ok());
        assert!(rx_a.try_recv().is_err());
    }
}
