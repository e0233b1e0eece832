//! Room API endpoint handlers.
//!
//! 全エンドポイントが `{code, message, data}` のエンベロープを返す。
//! HTTP ステータスは常に 200 で、エラーは code で区別する:
//! 0 成功 / -1000 作成失敗 / -2000 パラメータ不足 / -2001 ルームなし /
//! -3000 操作失敗

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::common::time::timestamp_to_rfc3339;
use crate::domain::{
    ClientId, MessageContent, MessageData, NewRoom, Room, RoomCode, Timestamp, Username,
};
use crate::ui::state::AppState;

/// Response envelope shared by all room API endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Room representation returned to clients
#[derive(Debug, Serialize)]
pub struct RoomDto {
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(rename = "roomName")]
    pub room_name: Option<String>,
    #[serde(rename = "isPrivate")]
    pub is_private: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "expiredTime")]
    pub expired_time: String,
}

impl From<Room> for RoomDto {
    fn from(room: Room) -> Self {
        Self {
            room_id: room.room_id.as_str().to_string(),
            room_name: room.room_name,
            is_private: room.is_private,
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            expired_time: timestamp_to_rfc3339(room.expired_time.value()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(rename = "roomName")]
    pub room_name: Option<String>,
    pub password: Option<String>,
}

/// Create a room with a fresh 6-digit code
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Json<ApiResponse<RoomDto>> {
    let new_room = NewRoom {
        room_name: request.room_name,
        password: request.password,
    };
    match state.room_store.create_room(new_room).await {
        Ok(room) => Json(ApiResponse::ok(room.into())),
        Err(e) => {
            tracing::error!("Failed to create room: {}", e);
            Json(ApiResponse::error(-1000, "failed to create room"))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FindRoomRequest {
    #[serde(rename = "roomId")]
    pub room_id: Option<String>,
}

/// Look up a room by code; expired rooms not yet swept by the scheduler are
/// reported as not found.
pub async fn find_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FindRoomRequest>,
) -> Json<ApiResponse<RoomDto>> {
    let Some(room_id) = request.room_id else {
        return Json(ApiResponse::error(-2000, "roomId is required"));
    };
    let code = match RoomCode::new(room_id.clone()) {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!("Invalid roomId '{}': {}", room_id, e);
            return Json(ApiResponse::error(-2000, "roomId must be a 6-digit code"));
        }
    };

    match state.room_store.find_by_code(&code).await {
        Ok(Some(room)) => {
            let now = Timestamp::new(state.clock.now_millis());
            if room.is_expired(now) {
                Json(ApiResponse::error(-2001, "room not found"))
            } else {
                Json(ApiResponse::ok(room.into()))
            }
        }
        Ok(None) => Json(ApiResponse::error(-2001, "room not found")),
        Err(e) => {
            tracing::error!("Failed to find room {}: {}", code.as_str(), e);
            Json(ApiResponse::error(-3000, "operation failed"))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    #[serde(rename = "roomId")]
    pub room_id: Option<String>,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Relay a chat message to the room's connected members
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PostMessageRequest>,
) -> Json<ApiResponse<MessageData>> {
    let (Some(room_id), Some(user), Some(uid), Some(content)) =
        (request.room_id, request.user, request.uid, request.content)
    else {
        return Json(ApiResponse::error(
            -2000,
            "roomId, user, uid and content are required",
        ));
    };

    // Convert String -> Domain Model
    let room = match RoomCode::new(room_id) {
        Ok(room) => room,
        Err(e) => return Json(ApiResponse::error(-2000, e.to_string())),
    };
    let sender_uid = match ClientId::try_from(uid) {
        Ok(uid) => uid,
        Err(e) => return Json(ApiResponse::error(-2000, e.to_string())),
    };
    let sender_name = match Username::try_from(user) {
        Ok(user) => user,
        Err(e) => return Json(ApiResponse::error(-2000, e.to_string())),
    };
    let content = match MessageContent::new(content) {
        Ok(content) => content,
        Err(e) => return Json(ApiResponse::error(-2000, e.to_string())),
    };

    match state
        .post_message_usecase
        .execute(room, sender_uid, sender_name, content, request.kind)
        .await
    {
        Ok(message) => Json(ApiResponse::ok(message)),
        Err(e) => {
            tracing::error!("Failed to post message: {}", e);
            Json(ApiResponse::error(-3000, "operation failed"))
        }
    }
}
