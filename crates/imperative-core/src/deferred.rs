//! A promise paired with externally callable settle functions.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

use crate::error::Rejection;

type Outcome<V, E> = Result<V, E>;
type Settled<V, E> = Rc<RefCell<Option<Outcome<V, E>>>>;

/// Settle side of a promise. The first `resolve`/`reject` wins; later calls
/// are ignored.
pub struct Deferred<V, E = Rejection> {
    sender: RefCell<Option<oneshot::Sender<()>>>,
    promise: Promise<V, E>,
}

pub fn create_deferred<V: Clone, E: Clone>() -> Deferred<V, E> {
    Deferred::new()
}

impl<V: Clone, E: Clone> Deferred<V, E> {
    pub fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            sender: RefCell::new(Some(sender)),
            promise: Promise {
                settled: Rc::new(RefCell::new(None)),
                signal: receiver.shared(),
                abandoned: false,
            },
        }
    }
}

impl<V, E> Deferred<V, E> {
    pub fn promise(&self) -> Promise<V, E> {
        self.promise.clone()
    }

    /// Returns `true` if this call settled the promise.
    pub fn resolve(&self, value: V) -> bool {
        self.settle(Ok(value))
    }

    /// Returns `true` if this call settled the promise.
    pub fn reject(&self, reason: E) -> bool {
        self.settle(Err(reason))
    }

    pub fn settle(&self, outcome: Outcome<V, E>) -> bool {
        let sender = self.sender.borrow_mut().take();
        match sender {
            Some(sender) => {
                *self.promise.settled.borrow_mut() = Some(outcome);
                // Every receiver may already be gone; settlement still counts.
                let _ = sender.send(());
                true
            }
            None => false,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.sender.borrow().is_none()
    }
}

impl<V: Clone, E: Clone> Default for Deferred<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> fmt::Debug for Deferred<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.sender.borrow().is_none())
            .finish()
    }
}

/// Read side of a [`Deferred`]. Every clone resolves to the same outcome.
///
/// If the `Deferred` is dropped without being settled the promise stays
/// pending forever.
pub struct Promise<V, E = Rejection> {
    settled: Settled<V, E>,
    signal: Shared<oneshot::Receiver<()>>,
    abandoned: bool,
}

impl<V, E> Promise<V, E> {
    pub fn is_settled(&self) -> bool {
        self.settled.borrow().is_some()
    }
}

impl<V: Clone, E: Clone> Promise<V, E> {
    /// The settled outcome, whether or not any clone was polled.
    pub fn peek(&self) -> Option<Outcome<V, E>> {
        self.settled.borrow().clone()
    }
}

impl<V, E> Clone for Promise<V, E> {
    fn clone(&self) -> Self {
        Self {
            settled: Rc::clone(&self.settled),
            signal: self.signal.clone(),
            abandoned: self.abandoned,
        }
    }
}

impl<V: Clone, E: Clone> Future for Promise<V, E> {
    type Output = Outcome<V, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(outcome) = this.peek() {
            return Poll::Ready(outcome);
        }
        if this.abandoned {
            return Poll::Pending;
        }
        match this.signal.poll_unpin(cx) {
            Poll::Ready(Ok(())) => match this.peek() {
                Some(outcome) => Poll::Ready(outcome),
                None => Poll::Pending,
            },
            Poll::Ready(Err(oneshot::Canceled)) => {
                this.abandoned = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<V: Clone + fmt::Debug, E: Clone + fmt::Debug> fmt::Debug for Promise<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("outcome", &self.peek())
            .finish()
    }
}
