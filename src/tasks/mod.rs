//! Background Tasks Module
//!
//! # Tasks
//! - Expiry cleanup: purges expired in-process entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
