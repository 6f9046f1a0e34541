//! Debounce: collapse a burst of calls into one delayed call with the last
//! arguments.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tracing::trace;

use super::{TimerId, TimerQueue};

/// Wraps an operation so that only the most recent call in a burst runs,
/// `window` after that call.
///
/// Each debouncer tracks its own pending call, so unrelated debouncers never
/// interfere. Clones share the same pending call. The operation runs inside
/// the timer tick and gets the queue, so it can start follow-up effects.
pub struct Debouncer<A> {
    window: Duration,
    pending: Rc<Cell<Option<TimerId>>>,
    operation: Rc<RefCell<dyn FnMut(&mut TimerQueue, A)>>,
}

impl<A> Clone for Debouncer<A> {
    fn clone(&self) -> Self {
        Self {
            window: self.window,
            pending: Rc::clone(&self.pending),
            operation: Rc::clone(&self.operation),
        }
    }
}

impl<A> std::fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .field("pending", &self.pending.get())
            .finish()
    }
}

impl<A: 'static> Debouncer<A> {
    pub fn new(window: Duration, operation: impl FnMut(&mut TimerQueue, A) + 'static) -> Self {
        Self {
            window,
            pending: Rc::new(Cell::new(None)),
            operation: Rc::new(RefCell::new(operation)),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Request a call. A call already waiting is dropped along with its
    /// arguments, and the window restarts from now.
    pub fn call(&self, timers: &mut TimerQueue, args: A) {
        if let Some(previous) = self.pending.take() {
            timers.cancel(previous);
            trace!(at = ?timers.now(), "debounced call superseded");
        }

        let pending = Rc::clone(&self.pending);
        let operation = Rc::clone(&self.operation);
        let id = timers.schedule(self.window, move |timers| {
            pending.set(None);
            let mut operation = operation.borrow_mut();
            (&mut *operation)(timers, args);
        });
        self.pending.set(Some(id));
    }

    /// Whether a call is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    /// Drop the waiting call, if any.
    pub fn cancel(&self, timers: &mut TimerQueue) -> bool {
        match self.pending.take() {
            Some(id) => timers.cancel(id),
            None => false,
        }
    }
}
