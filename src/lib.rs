//! Ephemeral chat-room presence server library.
//!
//! This library provides the real-time presence-and-broadcast subsystem for
//! short-lived chat rooms (6-digit codes, 24-hour TTL) together with the
//! background scheduler that removes expired rooms.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
