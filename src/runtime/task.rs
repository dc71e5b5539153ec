//! # Deferred Tasks
//!
//! A [`TaskRunner`] accepts continuations that must run later on the same
//! sequence, after the current call stack unwinds. The packet reader posts its
//! result processing here when a yield budget runs out, which bounds both the
//! recursion depth and the time a single call can hold the thread.
//!
//! Two runners are provided:
//! - [`TaskQueue`]: an explicit FIFO trampoline drained by its owner
//! - [`LocalTaskRunner`]: hands tasks to `tokio::task::spawn_local`, so it
//!   must be used inside a `tokio::task::LocalSet`

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use tracing::trace;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + 'static>;

/// Owner of the event loop's deferred-task queue
pub trait TaskRunner {
    /// Schedule `task` to run after the caller returns
    fn post_task(&self, task: Task);
}

/// FIFO task queue drained explicitly with [`TaskQueue::run_until_idle`]
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
    posted: Cell<u64>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Total number of tasks ever posted
    pub fn posted(&self) -> u64 {
        self.posted.get()
    }

    /// Run the oldest queued task. Returns false if the queue was empty.
    pub fn run_one(&self) -> bool {
        // Release the borrow before running so the task may post more work
        let task = self.tasks.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run tasks, including ones posted while running, until the queue is empty.
    ///
    /// Returns the number of tasks executed.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        trace!(ran, "Task queue idle");
        ran
    }
}

impl TaskRunner for TaskQueue {
    fn post_task(&self, task: Task) {
        self.posted.set(self.posted.get() + 1);
        self.tasks.borrow_mut().push_back(task);
    }
}

/// Task runner that spawns onto the current tokio `LocalSet`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTaskRunner;

impl TaskRunner for LocalTaskRunner {
    fn post_task(&self, task: Task) {
        tokio::task::spawn_local(async move { task() });
    }
}
