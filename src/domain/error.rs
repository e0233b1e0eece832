//! Domain validation errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("client id must not be empty")]
    EmptyClientId,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("room code must be exactly 6 digits, got '{0}'")]
    InvalidRoomCode(String),

    #[error("message content must not be empty")]
    EmptyMessageContent,

    #[error("message content exceeds {0} characters")]
    MessageContentTooLong(usize),
}
