//! ルームの作成から期限切れ削除までを、ストアとスケジューラを組み合わせて
//! 検証する結合テスト。
//!
//! 時刻は AtomicI64 ベースのテスト用クロックで進める。スケジューラと
//! ストアが同じクロックを共有するため、TTL 境界をミリ秒単位で制御できる。

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use hanare::common::time::Clock;
use hanare::domain::{NewRoom, RoomStore, Timestamp};
use hanare::infrastructure::repository::InMemoryRoomStore;
use hanare::infrastructure::scheduler::SchedulerService;

const T0: i64 = 1_700_000_000_000;

fn hours(n: i64) -> i64 {
    n * 3_600_000
}

/// 手動で進められるテスト用クロック
struct TestClock {
    now: AtomicI64,
}

impl TestClock {
    fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn test_rooms_expire_24_hours_after_their_own_creation() {
    // テスト項目: 期限は作成時刻ごとに計算され、古いルームだけが削除される
    // given (前提条件): T0 と T0+2h に作成された 2 つのルーム
    let clock = Arc::new(TestClock::new(T0));
    let store = Arc::new(InMemoryRoomStore::new(clock.clone(), 24));
    let early = store.create_room(NewRoom::default()).await.unwrap();
    clock.advance(hours(2));
    let late = store.create_room(NewRoom::default()).await.unwrap();
    let scheduler =
        SchedulerService::new(store.clone(), clock.clone(), Duration::from_secs(600)).spawn();

    // when (操作): T0+25h（early のみ期限切れ）で手動削除
    clock.advance(hours(23));
    let deleted = scheduler.manual_cleanup().await.unwrap();

    // then (期待する結果): early だけが消える
    assert_eq!(deleted, 1);
    assert!(store.find_by_code(&early.room_id).await.unwrap().is_none());
    assert_eq!(
        store.find_by_code(&late.room_id).await.unwrap(),
        Some(late.clone())
    );

    // when (操作): さらに 2 時間進めて再実行（T0+27h、late も期限切れ）
    clock.advance(hours(2));
    let deleted = scheduler.manual_cleanup().await.unwrap();

    // then (期待する結果): late も消え、ストアは空になる
    assert_eq!(deleted, 1);
    assert_eq!(store.room_count().await, 0);
}

#[tokio::test]
async fn test_exact_expiry_boundary_survives_cleanup() {
    // テスト項目: expired_time ちょうどの時刻では削除されない（厳密な <）
    // given (前提条件):
    let clock = Arc::new(TestClock::new(T0));
    let store = Arc::new(InMemoryRoomStore::new(clock.clone(), 24));
    store.create_room(NewRoom::default()).await.unwrap();
    let scheduler =
        SchedulerService::new(store.clone(), clock.clone(), Duration::from_secs(600)).spawn();

    // when (操作): ちょうど 24 時間後に削除を実行
    clock.advance(hours(24));
    let at_boundary = scheduler.manual_cleanup().await.unwrap();

    // then (期待する結果): まだ残っている
    assert_eq!(at_boundary, 0);
    assert_eq!(store.room_count().await, 1);

    // when (操作): 1 ミリ秒進めて再実行
    clock.advance(1);
    let past_boundary = scheduler.manual_cleanup().await.unwrap();

    // then (期待する結果): 削除される
    assert_eq!(past_boundary, 1);
    assert_eq!(store.room_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_manual_cleanups_delete_each_room_once() {
    // テスト項目: 手動削除の並行実行でも削除合計は期限切れルーム数に一致
    // given (前提条件): 3 つの期限切れルーム
    let clock = Arc::new(TestClock::new(T0));
    let store = Arc::new(InMemoryRoomStore::new(clock.clone(), 24));
    for _ in 0..3 {
        store.create_room(NewRoom::default()).await.unwrap();
    }
    clock.advance(hours(25));
    let scheduler =
        SchedulerService::new(store.clone(), clock.clone(), Duration::from_secs(600)).spawn();

    // when (操作): 同じハンドルから並行して実行
    let (first, second, third) = tokio::join!(
        scheduler.manual_cleanup(),
        scheduler.manual_cleanup(),
        scheduler.manual_cleanup(),
    );

    // then (期待する結果): 二重計上なし
    assert_eq!(first.unwrap() + second.unwrap() + third.unwrap(), 3);
    assert_eq!(store.room_count().await, 0);
}

#[tokio::test]
async fn test_periodic_sweep_runs_until_stopped() {
    // テスト項目: start 後の周期 sweep が削除を行い、stop 後は行わない
    // given (前提条件): 期限切れルーム 1 件と 10ms 間隔のスケジューラ
    let clock = Arc::new(TestClock::new(T0));
    let store = Arc::new(InMemoryRoomStore::new(clock.clone(), 24));
    store.create_room(NewRoom::default()).await.unwrap();
    clock.advance(hours(25));
    let scheduler =
        SchedulerService::new(store.clone(), clock.clone(), Duration::from_millis(10)).spawn();

    // when (操作): start して tick を待つ
    scheduler.start_all_tasks().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // then (期待する結果): 周期 sweep が削除済み
    assert_eq!(store.room_count().await, 0);

    // when (操作): stop 後に新たな期限切れルームを作る
    scheduler.stop_all_tasks().await.unwrap();
    assert!(!scheduler.status().await.unwrap().is_running);
    store.create_room(NewRoom::default()).await.unwrap();
    clock.advance(hours(25));
    tokio::time::sleep(Duration::from_millis(100)).await;

    // then (期待する結果): tick は何もしない
    assert_eq!(store.room_count().await, 1);

    // 手動削除は停止中でも使える
    assert_eq!(scheduler.manual_cleanup().await.unwrap(), 1);
}

#[tokio::test]
async fn test_count_expired_reports_pending_deletions() {
    // テスト項目: count_expired は削除せずに未処理の期限切れ件数を返す
    // given (前提条件): 期限切れ 2 件と存命 1 件
    let clock = Arc::new(TestClock::new(T0));
    let store = Arc::new(InMemoryRoomStore::new(clock.clone(), 24));
    store.create_room(NewRoom::default()).await.unwrap();
    store.create_room(NewRoom::default()).await.unwrap();
    clock.advance(hours(25));
    store.create_room(NewRoom::default()).await.unwrap();

    // when (操作):
    let now = Timestamp::new(clock.now_millis());
    let count = store.count_expired(now).await.unwrap();

    // then (期待する結果): 件数のみで、ルームは残っている
    assert_eq!(count, 2);
    assert_eq!(store.room_count().await, 3);
}
