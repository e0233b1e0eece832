//! Admin endpoint for the expiry scheduler.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;

use crate::domain::Timestamp;
use crate::ui::state::AppState;

use super::room::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub action: Option<String>,
}

/// Dispatch an admin action against the scheduler
///
/// Supported actions: `cleanup-rooms`, `status`, `start-tasks`, `stop-tasks`.
pub async fn admin_action(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdminRequest>,
) -> Json<ApiResponse<serde_json::Value>> {
    let Some(action) = request.action else {
        return Json(ApiResponse::error(-2000, "action is required"));
    };

    match action.as_str() {
        "cleanup-rooms" => match state.scheduler.manual_cleanup().await {
            Ok(deleted) => Json(ApiResponse::ok(json!({ "deleted": deleted }))),
            Err(e) => {
                tracing::error!("Manual cleanup failed: {}", e);
                Json(ApiResponse::error(-3000, "operation failed"))
            }
        },
        "status" => {
            let scheduler_status = match state.scheduler.status().await {
                Ok(status) => status,
                Err(e) => {
                    tracing::error!("Failed to get scheduler status: {}", e);
                    return Json(ApiResponse::error(-3000, "operation failed"));
                }
            };
            let now = Timestamp::new(state.clock.now_millis());
            let expired = match state.room_store.count_expired(now).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::error!("Failed to count expired rooms: {}", e);
                    return Json(ApiResponse::error(-3000, "operation failed"));
                }
            };
            Json(ApiResponse::ok(json!({
                "isRunning": scheduler_status.is_running,
                "tasks": scheduler_status.tasks,
                "expiredRooms": expired,
            })))
        }
        "start-tasks" => match state.scheduler.start_all_tasks().await {
            Ok(()) => Json(ApiResponse::ok(json!({ "started": true }))),
            Err(e) => {
                tracing::error!("Failed to start scheduler tasks: {}", e);
                Json(ApiResponse::error(-3000, "operation failed"))
            }
        },
        "stop-tasks" => match state.scheduler.stop_all_tasks().await {
            Ok(()) => Json(ApiResponse::ok(json!({ "stopped": true }))),
            Err(e) => {
                tracing::error!("Failed to stop scheduler tasks: {}", e);
                Json(ApiResponse::error(-3000, "operation failed"))
            }
        },
        other => {
            tracing::warn!("Unsupported admin action: {}", other);
            Json(ApiResponse::error(-1, "unsupported action"))
        }
    }
}
