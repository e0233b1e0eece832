//! SSE connection handlers.
//!
//! ストリームのライフサイクルが後始末の起点になる：レスポンスストリームが
//! drop された時点（クライアント切断・keep-alive 失敗・take-over による
//! チャンネル閉鎖のいずれでも）で SessionGuard が切断処理を 1 回だけ予約する。
//! 切断処理自体はセッション ID で冪等化されているため、経路が重複しても
//! 退室通知は二重にならない。

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
};
use futures_util::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::domain::{ClientId, RoomCode, SessionId, Username};
use crate::ui::state::AppState;

/// Query parameters for SSE connection
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub user: String,
    pub uid: String,
    #[serde(rename = "roomId")]
    pub room_id: String,
}

pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Sse<KeepAliveStream<SessionStream>>, StatusCode> {
    // Convert String -> Domain Model
    let uid = match ClientId::try_from(query.uid.clone()) {
        Ok(uid) => uid,
        Err(e) => {
            tracing::warn!("Invalid uid '{}': {}", query.uid, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    let username = match Username::try_from(query.user.clone()) {
        Ok(username) => username,
        Err(e) => {
            tracing::warn!("Invalid user '{}': {}", query.user, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    let room = match RoomCode::new(query.room_id.clone()) {
        Ok(room) => room,
        Err(e) => {
            tracing::warn!("Invalid roomId '{}': {}", query.room_id, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // Create a channel for this client to receive payloads
    let (tx, rx) = mpsc::unbounded_channel();

    let session = state
        .open_session_usecase
        .execute(uid.clone(), username, room, tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to open session for uid {}: {}", uid.as_str(), e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let stream = SessionStream {
        inner: UnboundedReceiverStream::new(rx),
        _guard: SessionGuard {
            state,
            uid,
            session,
        },
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Schedules session teardown when the response stream is dropped.
struct SessionGuard {
    state: Arc<AppState>,
    uid: ClientId,
    session: SessionId,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let state = self.state.clone();
        let uid = self.uid.clone();
        let session = self.session;
        // Drop は同期なので、切断処理はタスクとして予約する
        tokio::spawn(async move {
            if let Err(e) = state.close_session_usecase.execute(&uid, session).await {
                tracing::error!(
                    "Failed to close session {} for uid {}: {}",
                    session,
                    uid.as_str(),
                    e
                );
            }
        });
    }
}

/// Receiver stream mapped to SSE events, with teardown tied to its lifetime.
pub struct SessionStream {
    inner: UnboundedReceiverStream<String>,
    _guard: SessionGuard,
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            // ペイロードは 1 行の JSON 文字列
            Poll::Ready(Some(payload)) => Poll::Ready(Some(Ok(Event::default().data(payload)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
