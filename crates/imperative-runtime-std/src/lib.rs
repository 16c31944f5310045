//! Standard runtime services backed by Rust's `std` library.
//!
//! [`StdRuntime`] bundles a [`imperative_core::Runtime`] with a scheduler
//! that records turn requests and can wake a host loop blocked elsewhere,
//! for example on a channel or a condition variable.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use imperative_core::{Runtime, RuntimeHandle, RuntimeScheduler};

type Waker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that flags turn requests and forwards them to a waker.
pub struct StdScheduler {
    turn_requested: AtomicBool,
    requests: AtomicU64,
    turn_waker: RwLock<Option<Waker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            turn_requested: AtomicBool::new(false),
            requests: AtomicU64::new(0),
            turn_waker: RwLock::new(None),
        }
    }

    /// Returns whether a turn has been requested since the last call.
    pub fn take_turn_request(&self) -> bool {
        self.turn_requested.swap(false, Ordering::SeqCst)
    }

    /// Total number of turn requests seen.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Registers a waker invoked whenever a turn is requested.
    pub fn set_turn_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        match self.turn_waker.write() {
            Ok(mut slot) => *slot = Some(Arc::new(waker)),
            Err(_) => log::warn!("turn waker lock poisoned; waker not installed"),
        }
    }

    pub fn clear_turn_waker(&self) {
        if let Ok(mut slot) = self.turn_waker.write() {
            *slot = None;
        }
    }

    fn wake(&self) {
        let waker = self
            .turn_waker
            .read()
            .ok()
            .and_then(|slot| slot.clone());
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field("turn_requested", &self.turn_requested.load(Ordering::SeqCst))
            .field("requests", &self.requests())
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_turn(&self) {
        self.turn_requested.store(true, Ordering::SeqCst);
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.wake();
    }
}

/// Convenience container bundling the standard scheduler and a runtime.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    runtime: Runtime,
}

impl StdRuntime {
    pub fn new() -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        Self { scheduler, runtime }
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns whether a turn was requested since the last poll.
    pub fn take_turn_request(&self) -> bool {
        self.scheduler.take_turn_request()
    }

    pub fn set_turn_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_turn_waker(waker);
    }

    pub fn clear_turn_waker(&self) {
        self.scheduler.clear_turn_waker();
    }

    /// Runs turns for as long as the scheduler keeps requesting them.
    /// Returns the number of turns run.
    pub fn pump(&self) -> u64 {
        let mut turns = 0;
        while self.take_turn_request() || self.runtime.needs_turn() {
            self.runtime.run_turn();
            turns += 1;
        }
        turns
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("turns", &self.runtime.turns())
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}
