use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::executor::{LocalPool, LocalSpawner};
use futures_task::{LocalFutureObj, LocalSpawn};

use crate::platform::RuntimeScheduler;

type Task = Box<dyn FnOnce() + 'static>;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_turn: Cell<bool>,
    pending_tasks: RefCell<VecDeque<Task>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    turns: Cell<u64>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            scheduler,
            needs_turn: Cell::new(false),
            pending_tasks: RefCell::new(VecDeque::new()),
            pool: RefCell::new(pool),
            spawner,
            turns: Cell::new(0),
        }
    }

    fn schedule(&self) {
        self.needs_turn.set(true);
        self.scheduler.schedule_turn();
    }

    fn enqueue_task(&self, task: Task) {
        self.pending_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn spawn_local(&self, future: LocalFutureObj<'static, ()>) -> bool {
        match self.spawner.spawn_local_obj(future) {
            Ok(()) => {
                self.schedule();
                true
            }
            Err(err) => {
                log::warn!("local executor refused a future: {err}");
                false
            }
        }
    }

    fn has_tasks(&self) -> bool {
        !self.pending_tasks.borrow().is_empty()
    }

    /// Polls every woken local future until none can make progress.
    fn run_local_futures(&self) {
        match self.pool.try_borrow_mut() {
            Ok(mut pool) => pool.run_until_stalled(),
            Err(_) => log::warn!("turn requested from inside a local future; skipping"),
        }
    }

    fn run_turn(&self) -> bool {
        self.needs_turn.set(false);
        self.turns.set(self.turns.get() + 1);
        self.run_local_futures();

        // Only the tasks queued before this turn started; anything they queue
        // waits for the next one.
        let batch: Vec<Task> = {
            let mut pending = self.pending_tasks.borrow_mut();
            pending.drain(..).collect()
        };
        let ran = !batch.is_empty();
        for task in batch {
            task();
            self.run_local_futures();
        }

        if self.has_tasks() {
            self.needs_turn.set(true);
        }
        ran
    }
}

/// Single-threaded turn scheduler shared by every controller of a host.
///
/// A turn polls the local futures until they stall and then runs the tasks
/// that were queued before the turn began, polling futures again after each
/// task.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn needs_turn(&self) -> bool {
        self.inner.needs_turn.get()
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.inner.has_tasks()
    }

    /// Number of turns run so far.
    pub fn turns(&self) -> u64 {
        self.inner.turns.get()
    }

    /// Runs one turn. Returns whether any queued task ran.
    pub fn run_turn(&self) -> bool {
        self.inner.run_turn()
    }

    /// Runs turns until no task is queued and every local future is stalled.
    /// Returns how many turns were needed.
    pub fn run_until_idle(&self) -> u64 {
        let mut turns = 0;
        loop {
            self.inner.run_local_futures();
            if !self.inner.has_tasks() {
                self.inner.needs_turn.set(false);
                return turns;
            }
            self.inner.run_turn();
            turns += 1;
        }
    }

    /// Spawns `future` and runs turns until it completes.
    ///
    /// Returns `None` when the runtime went idle with the future still
    /// pending, e.g. a promise nobody settles.
    pub fn run_to_completion<F>(&self, future: F) -> Option<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let slot: Rc<RefCell<Option<F::Output>>> = Rc::new(RefCell::new(None));
        let out = Rc::clone(&slot);
        let spawned = self.handle().spawn_local(async move {
            let value = future.await;
            *out.borrow_mut() = Some(value);
        });
        if !spawned {
            return None;
        }
        self.run_until_idle();
        let value = slot.borrow_mut().take();
        value
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_turn(&self) {}
}

/// Scheduler that only counts turn requests.
#[derive(Default)]
pub struct CountingScheduler {
    requests: AtomicUsize,
}

impl CountingScheduler {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for CountingScheduler {
    fn schedule_turn(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Weak handle to a [`Runtime`], held by controllers.
#[derive(Clone)]
pub struct RuntimeHandle(pub(crate) Weak<RuntimeInner>);

impl RuntimeHandle {
    /// Queues `task` for the next turn. Runs it immediately if the runtime
    /// is gone, since nothing can still be rendering.
    pub fn spawn_task(&self, task: Box<dyn FnOnce() + 'static>) {
        if let Some(inner) = self.0.upgrade() {
            inner.enqueue_task(task);
        } else {
            task();
        }
    }

    /// Spawns a future on the runtime's local executor. Returns `false` if
    /// the runtime is gone.
    pub fn spawn_local(&self, future: impl Future<Output = ()> + 'static) -> bool {
        match self.0.upgrade() {
            Some(inner) => inner.spawn_local(LocalFutureObj::new(Box::new(future))),
            None => false,
        }
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_tasks())
            .unwrap_or(false)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}
