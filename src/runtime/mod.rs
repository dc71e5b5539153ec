//! # Event Loop Collaborators
//!
//! The packet reader runs on a single sequence and relies on two services
//! from its owner: a clock for yield deadlines and receipt timestamps, and a
//! task runner that accepts deferred continuations.
//!
//! ## Components
//! - **Clock**: monotonic time source (`SystemClock`, `ManualClock`)
//! - **Task**: deferred-work queues (`TaskQueue`, `LocalTaskRunner`)

pub mod clock;
pub mod task;

pub use clock::{Clock, ManualClock, SystemClock};
pub use task::{LocalTaskRunner, Task, TaskQueue, TaskRunner};
