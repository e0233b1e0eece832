//! UseCase 層のエラー型定義

use thiserror::Error;

/// プレゼンス系ユースケース共通のエラー
#[derive(Debug, Error)]
pub enum PresenceError {
    /// ペイロードの JSON 化に失敗した
    #[error("failed to encode payload: {0}")]
    EncodePayload(#[from] serde_json::Error),
}
