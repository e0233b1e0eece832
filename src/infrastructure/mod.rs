//! Infrastructure layer: concrete implementations of the domain interfaces
//! plus the background scheduler.

pub mod presence;
pub mod repository;
pub mod scheduler;
