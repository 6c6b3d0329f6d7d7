//! Off-thread rendering: the worker pool and render futures.

pub(crate) mod scheduler;
pub(crate) mod task;

pub use scheduler::{RenderScheduler, SchedulerOpts};
pub use task::RenderFuture;
