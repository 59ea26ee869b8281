//! Utility modules

pub mod command;
pub mod executor;
pub mod mongo;
