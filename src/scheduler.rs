use std::thread;
use std::time::Duration;

/// Execution seam for deferred work: a delayed send runs on whatever the
/// scheduler provides, off the caller's thread.
pub trait Scheduler {
    fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static;

    /// Run `f` after `delay` without blocking the caller. Two schedules
    /// with delays d1 < d2 fire in that relative order; equal delays have
    /// no specified order.
    fn schedule<F>(&self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(move || {
            thread::sleep(delay);
            f();
        });
    }
}

pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let _ = thread::spawn(f);
    }
}
