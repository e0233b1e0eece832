//! Room expiry scheduler.
//!
//! 期限切れルームの削除を担う単一のコーディネータタスク。Room Store の
//! delete 操作はこのタスクだけが呼び出し、start / stop / run-once / status
//! はコマンドチャンネル経由で直列化されます。手動実行と周期 tick が同じ
//! タスクを通るため、並行呼び出しの安全性はタイミングに依存しません
//! （ストア側の削除が冪等であることが前提）。

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::common::time::Clock;
use crate::domain::{RoomStore, StoreError, Timestamp};

/// Interval between scheduled cleanup ticks.
pub const DEFAULT_CLEANUP_INTERVAL_MINUTES: u64 = 10;

const ROOM_CLEANUP_TASK: &str = "room-cleanup";

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The scheduler task has exited and no longer accepts commands.
    #[error("scheduler task is not reachable")]
    TaskGone,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Snapshot of the scheduler state, shaped for the admin endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    #[serde(rename = "isRunning")]
    pub is_running: bool,
    pub tasks: Vec<String>,
}

enum SchedulerCommand {
    Start,
    Stop,
    RunOnce {
        reply: oneshot::Sender<Result<u64, StoreError>>,
    },
    Status {
        reply: oneshot::Sender<SchedulerStatus>,
    },
}

/// Owns the store's delete-expired operation and the periodic timer.
pub struct SchedulerService {
    store: Arc<dyn RoomStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl SchedulerService {
    pub fn new(store: Arc<dyn RoomStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            clock,
            interval,
        }
    }

    /// Spawn the coordinator task and return a cloneable handle to it.
    ///
    /// The task starts in the stopped state; ticks do nothing until
    /// `start_all_tasks` is called.
    pub fn spawn(self) -> SchedulerHandle {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(self.run(rx));
        SchedulerHandle { tx }
    }

    async fn run(self, mut commands: mpsc::Receiver<SchedulerCommand>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // tokio interval fires immediately on the first tick
        ticker.tick().await;

        let mut is_running = false;

        loop {
            tokio::select! {
                command = commands.recv() => {
                    // Every handle dropped: nothing can reach the task anymore.
                    let Some(command) = command else { break };
                    match command {
                        SchedulerCommand::Start => {
                            if is_running {
                                tracing::info!("Cleanup task already running, start ignored");
                            } else {
                                is_running = true;
                                tracing::info!(
                                    "Cleanup task started (interval {:?})",
                                    self.interval
                                );
                            }
                        }
                        SchedulerCommand::Stop => {
                            if is_running {
                                is_running = false;
                                tracing::info!("Cleanup task stopped");
                            } else {
                                tracing::info!("Cleanup task not running, stop ignored");
                            }
                        }
                        SchedulerCommand::RunOnce { reply } => {
                            let result = self.run_once().await;
                            let _ = reply.send(result);
                        }
                        SchedulerCommand::Status { reply } => {
                            let _ = reply.send(SchedulerStatus {
                                is_running,
                                tasks: vec![ROOM_CLEANUP_TASK.to_string()],
                            });
                        }
                    }
                }
                _ = ticker.tick() => {
                    if !is_running {
                        continue;
                    }
                    match self.run_once().await {
                        Ok(0) => tracing::debug!("Scheduled cleanup found no expired rooms"),
                        Ok(deleted) => {
                            tracing::info!("Scheduled cleanup deleted {} expired rooms", deleted);
                        }
                        // A storage error must not terminate the timer; the
                        // next scheduled tick still fires.
                        Err(e) => tracing::warn!("Scheduled cleanup failed: {}", e),
                    }
                }
            }
        }

        tracing::debug!("Scheduler task exiting");
    }

    async fn run_once(&self) -> Result<u64, StoreError> {
        let now = Timestamp::new(self.clock.now_millis());
        self.store.delete_expired(now).await
    }
}

/// Handle to the scheduler task; all operations are serialized through its
/// command channel.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    /// Start periodic cleanup; idempotent (a second start is a logged no-op).
    pub async fn start_all_tasks(&self) -> Result<(), SchedulerError> {
        self.tx
            .send(SchedulerCommand::Start)
            .await
            .map_err(|_| SchedulerError::TaskGone)
    }

    /// Stop periodic cleanup; idempotent.
    pub async fn stop_all_tasks(&self) -> Result<(), SchedulerError> {
        self.tx
            .send(SchedulerCommand::Stop)
            .await
            .map_err(|_| SchedulerError::TaskGone)
    }

    /// Current scheduler state.
    pub async fn status(&self) -> Result<SchedulerStatus, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SchedulerCommand::Status { reply })
            .await
            .map_err(|_| SchedulerError::TaskGone)?;
        rx.await.map_err(|_| SchedulerError::TaskGone)
    }

    /// Run one cleanup out-of-band; safe while the periodic timer is active.
    /// Returns the number of rooms deleted.
    pub async fn manual_cleanup(&self) -> Result<u64, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SchedulerCommand::RunOnce { reply })
            .await
            .map_err(|_| SchedulerError::TaskGone)?;
        let deleted = rx.await.map_err(|_| SchedulerError::TaskGone)??;
        Ok(deleted)
    }
}
