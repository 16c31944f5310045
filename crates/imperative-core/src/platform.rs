//! Platform abstraction for the turn scheduler.
//!
//! The core never spins an event loop of its own. Whenever work is queued
//! for a later turn it asks the host, through [`RuntimeScheduler`], to come
//! back and run [`crate::Runtime::run_turn`].

/// Requests turns from the host event loop.
///
/// Implementations may be shared with other threads (for example a waker
/// that pokes a blocked host loop), so they must be `Send + Sync` even though
/// the runtime itself is single-threaded.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host run another turn as soon as it is idle.
    fn schedule_turn(&self);
}
