//! Effect Scheduler - timed presentation effects on a cooperative timeline.
//!
//! Everything here runs on the caller's thread. The host owns a [`TimerQueue`]
//! and pumps it from its frame loop with [`TimerQueue::advance_by`]; timer
//! callbacks run inside that call, in due-time order, and may schedule or
//! cancel further timers.
//!
//! Two primitives are built on the queue:
//! - [`Debouncer`]: only the last call in a burst runs, after a quiet window
//! - [`TextRevealer`]: incremental text reveal with fast-forward cancellation

mod debounce;
mod reveal;

pub use debounce::*;
pub use reveal::*;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

type TimerCallback = Box<dyn FnOnce(&mut TimerQueue)>;

/// Queue entry. Ordering: (due ASC, id ASC), so timers due at the same
/// instant fire in scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    due: Duration,
    id: TimerId,
}

/// A virtual clock with one-shot timers.
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
    callbacks: HashMap<TimerId, TimerCallback>,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now)
            .field("pending", &self.callbacks.len())
            .finish()
    }
}

impl TimerQueue {
    /// Create an empty queue with the clock at zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BinaryHeap::new(),
            callbacks: HashMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `callback` once, `delay` after the current time. Due times past
    /// the end of the clock are clamped to `Duration::MAX`.
    pub fn schedule(
        &mut self,
        delay: Duration,
        callback: impl FnOnce(&mut TimerQueue) + 'static,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.queue.push(Reverse(Scheduled {
            due: self.now.checked_add(delay).unwrap_or(Duration::MAX),
            id,
        }));
        self.callbacks.insert(id, Box::new(callback));
        id
    }

    /// Cancel a timer and drop its callback. Returns `false` if it already
    /// fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        if self.callbacks.remove(&id).is_none() {
            return false;
        }
        self.queue.retain(|Reverse(entry)| entry.id != id);
        true
    }

    /// Whether a timer is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.callbacks.contains_key(&id)
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.callbacks.len()
    }

    /// Due time of the next timer, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Advance the clock by `delta`, firing every timer that comes due.
    /// Returns how many callbacks ran.
    pub fn advance_by(&mut self, delta: Duration) -> usize {
        let target = self.now.checked_add(delta).unwrap_or(Duration::MAX);
        self.advance_to(target)
    }

    /// Advance the clock to `target`, firing every timer due at or before it.
    /// Timers scheduled by callbacks fire too if they come due in range.
    pub fn advance_to(&mut self, target: Duration) -> usize {
        let mut fired = 0;

        while let Some(&Reverse(next)) = self.queue.peek() {
            if next.due > target {
                break;
            }
            self.queue.pop();

            let Some(callback) = self.callbacks.remove(&next.id) else {
                continue;
            };
            self.now = self.now.max(next.due);
            callback(self);
            fired += 1;
        }

        self.now = self.now.max(target);
        fired
    }

    /// Fire timers until none remain, jumping the clock forward as needed.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(due) = self.next_due() {
            fired += self.advance_to(due);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut timers = TimerQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, name) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let log = Rc::clone(&log);
            timers.schedule(ms(delay), move |_| log.borrow_mut().push(name));
        }

        assert_eq!(timers.advance_by(ms(15)), 2);
        assert_eq!(*log.borrow(), vec!["a", "a2"]);
        assert_eq!(timers.now(), ms(15));

        assert_eq!(timers.advance_by(ms(100)), 2);
        assert_eq!(*log.borrow(), vec!["a", "a2", "b", "c"]);
        assert_eq!(timers.now(), ms(115));
    }

    #[test]
    fn test_cancel_releases_timer() {
        let mut timers = TimerQueue::new();
        let fired = Rc::new(RefCell::new(false));

        let flag = Rc::clone(&fired);
        let id = timers.schedule(ms(10), move |_| *flag.borrow_mut() = true);
        assert!(timers.is_pending(id));
        assert_eq!(Rc::strong_count(&fired), 2);

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.pending(), 0);
        assert_eq!(timers.next_due(), None);
        assert_eq!(Rc::strong_count(&fired), 1);

        timers.advance_by(ms(50));
        assert!(!*fired.borrow());
    }

    #[test]
    fn test_callbacks_can_reschedule() {
        let mut timers = TimerQueue::new();
        let count = Rc::new(RefCell::new(0));

        fn tick(count: Rc<RefCell<u32>>, timers: &mut TimerQueue) {
            *count.borrow_mut() += 1;
            if *count.borrow() < 3 {
                timers.schedule(Duration::from_millis(10), move |t| tick(count, t));
            }
        }

        let start = Rc::clone(&count);
        timers.schedule(ms(10), move |t| tick(start, t));

        timers.advance_by(ms(25));
        assert_eq!(*count.borrow(), 2);

        timers.advance_by(ms(5));
        assert_eq!(*count.borrow(), 3);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_run_until_idle() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(40), |_| {});
        timers.schedule(ms(5), |_| {});

        assert_eq!(timers.run_until_idle(), 2);
        assert_eq!(timers.now(), ms(40));
    }

    #[test]
    fn test_huge_delays_clamp_to_end_of_clock() {
        let mut timers = TimerQueue::new();
        timers.advance_by(ms(10));

        timers.schedule(Duration::MAX, |_| {});
        assert_eq!(timers.next_due(), Some(Duration::MAX));

        assert_eq!(timers.advance_by(Duration::MAX), 1);
        assert_eq!(timers.now(), Duration::MAX);
        assert_eq!(timers.pending(), 0);
    }
}
