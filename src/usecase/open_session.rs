//! UseCase: セッション確立処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - OpenSessionUseCase::execute() メソッド
//! - 接続登録・ルーム参加・roster 配信・入室通知の一連の流れ
//!
//! ### なぜこのテストが必要か
//! - 本人には roster のみ、既存メンバーには enter + roster が届くという
//!   配信先の振り分けを保証するため
//! - 同一 uid の再接続（take-over）で旧ストリームが終了することを確認するため
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のルームへの最初の入室、既存メンバーがいるルームへの入室
//! - エッジケース：同一 uid での再接続（同一ルーム・別ルームの両方）

use std::sync::Arc;

use crate::common::time::{get_utc_timestamp, timestamp_to_rfc3339};
use crate::domain::{ClientId, PresenceHub, PusherChannel, RoomCode, SessionId, SsePayload, Username};

use super::error::PresenceError;

/// セッション確立のユースケース
pub struct OpenSessionUseCase {
    /// PresenceHub（接続レジストリ・メンバーシップ・配信の抽象化）
    hub: Arc<dyn PresenceHub>,
}

impl OpenSessionUseCase {
    pub fn new(hub: Arc<dyn PresenceHub>) -> Self {
        Self { hub }
    }

    /// セッション確立を実行
    ///
    /// # Arguments
    ///
    /// * `uid` - 接続するクライアントの ID
    /// * `username` - 表示名
    /// * `room` - 参加するルームのコード
    /// * `sender` - クライアントへのペイロード送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(SessionId)` - 確立成功（後始末に使うセッション ID を返す）
    /// * `Err(PresenceError)` - ペイロードの構築に失敗
    pub async fn execute(
        &self,
        uid: ClientId,
        username: Username,
        room: RoomCode,
        sender: PusherChannel,
    ) -> Result<SessionId, PresenceError> {
        // 1. レジストリに登録（同一 uid の既存エントリは置き換え）
        let (session, replaced) = self
            .hub
            .register(uid.clone(), username.clone(), room.clone(), sender)
            .await;
        if let Some(previous) = replaced {
            tracing::warn!(
                "Connection for uid {} taken over by session {}",
                uid.as_str(),
                session
            );
            // 旧 sender を破棄すると置き換えられたストリームが終了する
            drop(previous.sender);
            // 別ルームからの再接続は旧ルームの membership を残してしまうため、
            // ここで退室の一連の処理を行う。同一ルームへの再接続では在室の
            // ままなので何もしない。
            if previous.room != room {
                self.leave_previous_room(&uid, &previous.username, &previous.room)
                    .await?;
            }
        }

        // 2. ルームのメンバー集合に追加
        self.hub.join_room(&room, &uid).await;

        // 3. roster を解決し、本人へスナップショットを送る
        let now = get_utc_timestamp();
        let timestamp = timestamp_to_rfc3339(now);
        let roster = self.hub.resolve_roster(&room).await;
        let roster_payload = SsePayload::users_list(&roster, &room, timestamp.clone()).to_json()?;
        self.hub.send_to(&uid, &roster_payload).await;

        // 4. 既存メンバーへ入室通知と更新済み roster を配る（本人除外）
        let enter_payload =
            SsePayload::user_enter(&username, &uid, &room, timestamp).to_json()?;
        self.hub.broadcast(&room, &enter_payload, Some(&uid)).await;
        self.hub
            .broadcast(&room, &roster_payload, Some(&uid))
            .await;

        tracing::info!(
            "Session {} opened: uid {} joined room {}",
            session,
            uid.as_str(),
            room.as_str()
        );
        Ok(session)
    }

    /// take-over で置き換えられた接続の旧ルームを退室させ、残存メンバーへ
    /// leave と更新済み roster を配る
    async fn leave_previous_room(
        &self,
        uid: &ClientId,
        username: &Username,
        room: &RoomCode,
    ) -> Result<(), PresenceError> {
        self.hub.leave_room(room, uid).await;

        let timestamp = timestamp_to_rfc3339(get_utc_timestamp());
        let leave_payload =
            SsePayload::user_leave(username, uid, room, timestamp.clone()).to_json()?;
        self.hub.broadcast(room, &leave_payload, None).await;

        let roster = self.hub.resolve_roster(room).await;
        let roster_payload = SsePayload::users_list(&roster, room, timestamp).to_json()?;
        self.hub.broadcast(room, &roster_payload, None).await;

        tracing::info!(
            "uid {} moved out of room {} by take-over",
            uid.as_str(),
            room.as_str()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::presence::SsePresenceHub;
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

    fn decode(raw: &str) -> serde_json::Value {
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test]
    async fn test_first_member_receives_only_own_roster() {
        // テスト項目: 空のルームに入った本人には roster だけが届く
        // given (前提条件):
        let hub = Arc::new(SsePresenceHub::new());
        let usecase = OpenSessionUseCase::new(hub.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        usecase
            .execute(uid("uid-a"), name("alice"), room(), tx)
            .await
            .unwrap();

        // then (期待する結果):
        let payload = decode(&rx.recv().await.unwrap());
        assert_eq!(payload["type"], "room:users:list");
        assert_eq!(payload["data"]["users"].as_array().unwrap().len(), 1);
        assert_eq!(payload["data"]["users"][0]["uid"], "uid-a");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_existing_member_receives_enter_then_roster() {
        // テスト項目: 既存メンバーには enter 通知と更新済み roster が順に届く
        // given (前提条件): alice が入室済み
        let hub = Arc::new(SsePresenceHub::new());
        let usecase = OpenSessionUseCase::new(hub.clone());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        usecase
            .execute(uid("uid-a"), name("alice"), room(), tx_a)
            .await
            .unwrap();
        let _ = rx_a.recv().await; // alice 自身の roster を読み捨てる

        // when (操作): bob が入室
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        usecase
            .execute(uid("uid-b"), name("bob"), room(), tx_b)
            .await
            .unwrap();

        // then (期待する結果): alice には enter → roster の順で 2 件
        let enter = decode(&rx_a.recv().await.unwrap());
        assert_eq!(enter["type"], "room:user:enter");
        assert_eq!(enter["data"]["uid"], "uid-b");
        assert_eq!(enter["data"]["user"], "bob");

        let roster = decode(&rx_a.recv().await.unwrap());
        assert_eq!(roster["type"], "room:users:list");
        assert_eq!(roster["data"]["users"].as_array().unwrap().len(), 2);

        // bob 本人には roster のみ（自分の enter は届かない）
        let own = decode(&rx_b.recv().await.unwrap());
        assert_eq!(own["type"], "room:users:list");
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reconnect_with_same_uid_terminates_old_stream() {
        // テスト項目: 同一 uid の再接続で旧チャンネルが閉じられる
        // given (前提条件): uid-a の最初の接続
        let hub = Arc::new(SsePresenceHub::new());
        let usecase = OpenSessionUseCase::new(hub.clone());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let first = usecase
            .execute(uid("uid-a"), name("alice"), room(), tx1)
            .await
            .unwrap();
        let _ = rx1.recv().await;

        // when (操作): 同じ uid で再接続
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let second = usecase
            .execute(uid("uid-a"), name("alice"), room(), tx2)
            .await
            .unwrap();

        // then (期待する結果): セッション ID は進み、旧ストリームは終了する
        assert!(second > first);
        assert_eq!(rx1.recv().await, None);
        let own = decode(&rx2.recv().await.unwrap());
        assert_eq!(own["type"], "room:users:list");
        assert_eq!(own["data"]["users"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_into_another_room_cleans_previous_membership() {
        // テスト項目: 別ルームへの再接続で旧ルームの membership が掃除され、
        //             残存メンバーに leave と roster が届く
        // given (前提条件): alice と bob が 000123 に入室済み
        let hub = Arc::new(SsePresenceHub::new());
        let usecase = OpenSessionUseCase::new(hub.clone());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        usecase
            .execute(uid("uid-a"), name("alice"), room(), tx_a)
            .await
            .unwrap();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        usecase
            .execute(uid("uid-b"), name("bob"), room(), tx_b)
            .await
            .unwrap();
        let _ = rx_a.recv().await; // alice 自身の roster
        let _ = rx_a.recv().await; // bob の enter
        let _ = rx_a.recv().await; // 更新済み roster
        let _ = rx_b.recv().await; // bob 自身の roster

        // when (操作): alice が別ルーム 999000 に再接続
        let other = RoomCode::new("999000".to_string()).unwrap();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        usecase
            .execute(uid("uid-a"), name("alice"), other.clone(), tx2)
            .await
            .unwrap();

        // then (期待する結果): 旧ルームには bob だけが残る
        assert_eq!(hub.members_of(&room()).await, vec![uid("uid-b")]);
        assert_eq!(hub.members_of(&other).await, vec![uid("uid-a")]);

        // bob には leave → roster([bob]) が届く
        let leave = decode(&rx_b.recv().await.unwrap());
        assert_eq!(leave["type"], "room:user:leave");
        assert_eq!(leave["data"]["uid"], "uid-a");
        assert_eq!(leave["data"]["roomId"], "000123");
        let roster = decode(&rx_b.recv().await.unwrap());
        assert_eq!(roster["type"], "room:users:list");
        let users = roster["data"]["users"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["uid"], "uid-b");
        assert!(rx_b.try_recv().is_err());

        // 旧ストリームは終了し、新ストリームには新ルームの roster が届く
        assert_eq!(rx_a.recv().await, None);
        let own = decode(&rx2.recv().await.unwrap());
        assert_eq!(own["type"], "room:users:list");
        assert_eq!(own["data"]["roomId"], "999000");
        assert_eq!(own["data"]["users"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_members_in_other_rooms_hear_nothing() {
        // テスト項目: 別ルームのメンバーには入室通知が届かない
        // given (前提条件): ルーム 000123 に alice
        let hub = Arc::new(SsePresenceHub::new());
        let usecase = OpenSessionUseCase::new(hub.clone());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        usecase
            .execute(uid("uid-a"), name("alice"), room(), tx_a)
            .await
            .unwrap();
        let _ = rx_a.recv().await;

        // when (操作): 別ルーム 999000 に bob が入室
        let other = RoomCode::new("999000".to_string()).unwrap();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        usecase
            .execute(uid("uid-b"), name("bob"), other, tx_b)
            .await
            .unwrap();

        // then (期待する結果): alice には何も届かない
        assert!(rx_a.try_recv().is_err());
    }
}
