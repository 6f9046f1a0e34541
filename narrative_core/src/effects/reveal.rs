//! Incremental text reveal (the "typewriter" effect).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tracing::trace;

use super::{TimerId, TimerQueue};

/// Something with a settable current text, such as a label widget.
pub trait DisplaySink {
    fn set_text(&mut self, text: &str);
}

impl DisplaySink for String {
    fn set_text(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

/// A display sink shared between the host and the reveal driving it.
pub type SharedSink = Rc<RefCell<dyn DisplaySink>>;

/// Callback run when a reveal reaches the end of its text on its own. It
/// receives the timer queue so it can schedule follow-up effects.
pub type OnComplete = Box<dyn FnOnce(&mut TimerQueue)>;

/// Lifecycle of a reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStatus {
    Running,
    /// Reached the end naturally.
    Completed,
    /// Fast-forwarded by `cancel`.
    Cancelled,
}

struct RevealState {
    text: String,
    /// Byte offset just past each char of `text`.
    ends: Vec<usize>,
    shown: usize,
    interval: Duration,
    sink: SharedSink,
    on_complete: Option<OnComplete>,
    timer: Option<TimerId>,
    status: RevealStatus,
}

impl RevealState {
    fn visible(&self) -> &str {
        match self.shown {
            0 => "",
            n => &self.text[..self.ends[n - 1]],
        }
    }
}

/// Handle to a running reveal. Clones refer to the same reveal.
#[derive(Clone)]
pub struct RevealHandle {
    state: Rc<RefCell<RevealState>>,
}

impl std::fmt::Debug for RevealHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RevealHandle")
            .field("shown", &state.shown)
            .field("len", &state.ends.len())
            .field("status", &state.status)
            .finish()
    }
}

impl RevealHandle {
    /// Clear the sink and start revealing `text`, one char per `interval`.
    /// Reveals are started through [`TextRevealer`], which keeps one per sink.
    fn start(
        timers: &mut TimerQueue,
        sink: SharedSink,
        text: impl Into<String>,
        interval: Duration,
        on_complete: Option<OnComplete>,
    ) -> Self {
        let text = text.into();
        let ends = text.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
        sink.borrow_mut().set_text("");

        let state = Rc::new(RefCell::new(RevealState {
            text,
            ends,
            shown: 0,
            interval,
            sink,
            on_complete,
            timer: None,
            status: RevealStatus::Running,
        }));
        schedule_tick(&state, timers);
        Self { state }
    }

    /// Stop the reveal and show the full text at once. `on_complete` is not
    /// run. Returns `false` if the reveal had already finished or been
    /// cancelled, in which case nothing changes.
    pub fn cancel(&self, timers: &mut TimerQueue) -> bool {
        let mut state = self.state.borrow_mut();
        if state.status != RevealStatus::Running {
            return false;
        }
        if let Some(id) = state.timer.take() {
            timers.cancel(id);
        }
        state.status = RevealStatus::Cancelled;
        state.on_complete = None;
        state.shown = state.ends.len();
        state.sink.borrow_mut().set_text(&state.text);
        true
    }

    pub fn status(&self) -> RevealStatus {
        self.state.borrow().status
    }

    pub fn is_running(&self) -> bool {
        self.status() == RevealStatus::Running
    }

    /// The text currently shown.
    pub fn visible_text(&self) -> String {
        self.state.borrow().visible().to_string()
    }

    /// The full text being revealed.
    pub fn full_text(&self) -> String {
        self.state.borrow().text.clone()
    }
}

fn schedule_tick(state: &Rc<RefCell<RevealState>>, timers: &mut TimerQueue) {
    let interval = state.borrow().interval;
    let ticking = Rc::clone(state);
    let id = timers.schedule(interval, move |timers| tick(&ticking, timers));
    state.borrow_mut().timer = Some(id);
}

fn tick(state: &Rc<RefCell<RevealState>>, timers: &mut TimerQueue) {
    let finished = {
        let mut s = state.borrow_mut();
        s.timer = None;
        if s.status != RevealStatus::Running {
            return;
        }
        if s.shown < s.ends.len() {
            s.shown += 1;
        }
        s.sink.borrow_mut().set_text(s.visible());
        s.shown == s.ends.len()
    };

    if !finished {
        schedule_tick(state, timers);
        return;
    }

    // Release the borrow before running the callback; it may start a new
    // reveal on the same sink.
    let on_complete = {
        let mut s = state.borrow_mut();
        s.status = RevealStatus::Completed;
        s.on_complete.take()
    };
    if let Some(on_complete) = on_complete {
        on_complete(timers);
    }
}

/// Identity of a display sink: the address of its shared allocation.
type SinkKey = *const ();

fn sink_key(sink: &SharedSink) -> SinkKey {
    Rc::as_ptr(sink) as *const ()
}

/// Runs reveals, at most one per display sink.
///
/// Sinks are told apart by identity, so two clones of the same
/// [`SharedSink`] are the same target.
#[derive(Debug, Default)]
pub struct TextRevealer {
    active: HashMap<SinkKey, RevealHandle>,
}

impl TextRevealer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing `text` into `sink`, fast-forwarding any reveal already
    /// running on that sink first.
    pub fn reveal(
        &mut self,
        timers: &mut TimerQueue,
        sink: SharedSink,
        text: impl Into<String>,
        interval: Duration,
        on_complete: Option<OnComplete>,
    ) -> RevealHandle {
        self.active.retain(|_, handle| handle.is_running());

        let key = sink_key(&sink);
        if let Some(previous) = self.active.remove(&key) {
            if previous.cancel(timers) {
                trace!(at = ?timers.now(), "reveal superseded");
            }
        }

        let handle = RevealHandle::start(timers, sink, text, interval, on_complete);
        self.active.insert(key, handle.clone());
        handle
    }

    /// Fast-forward the reveal on `sink`, if one is running.
    pub fn skip(&mut self, timers: &mut TimerQueue, sink: &SharedSink) -> bool {
        self.active
            .remove(&sink_key(sink))
            .map(|handle| handle.cancel(timers))
            .unwrap_or(false)
    }

    /// Fast-forward every running reveal.
    pub fn skip_all(&mut self, timers: &mut TimerQueue) -> usize {
        self.active
            .drain()
            .filter(|(_, handle)| handle.cancel(timers))
            .count()
    }

    /// Whether `sink` has a reveal still in progress.
    pub fn is_revealing(&self, sink: &SharedSink) -> bool {
        self.active
            .get(&sink_key(sink))
            .map(RevealHandle::is_running)
            .unwrap_or(false)
    }
}
