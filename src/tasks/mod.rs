//! Background Tasks Module
//!
//! Contains the periodic expiration sweep and the scheduler that owns it.
//!
//! # Tasks
//! - Sweep: calls a [`SweepTarget`] at a fixed interval to purge expired rows

mod cleanup;
mod scheduler;

pub use cleanup::spawn_sweep_task;
pub use scheduler::{IntervalScheduler, Scheduler, SweepTarget};
