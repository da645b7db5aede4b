//! Timer abstraction the game is driven by.
//!
//! Every callback runs to completion on one thread before the next one fires,
//! so game state lives in `Rc<RefCell<_>>` and needs no locking. Handles are
//! cancelled explicitly on teardown; a cancelled callback never runs again.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Break,
}

/// Cancellation token shared between a scheduled callback and its owner.
///
/// A scheduler may attach a hook with [`TimerHandle::on_cancel`] to release
/// whatever backs the timer; it runs at most once.
#[derive(Clone, Default)]
pub struct TimerHandle {
    cancelled: Rc<Cell<bool>>,
    hook: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        let hook = self.hook.borrow_mut().take();
        if let Some(hook) = hook {
            hook();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Registers `hook` to run on cancel. Runs it right away if already cancelled.
    pub fn on_cancel(&self, hook: impl FnOnce() + 'static) {
        if self.is_cancelled() {
            hook();
        } else {
            *self.hook.borrow_mut() = Some(Box::new(hook));
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.cancelled.get())
            .finish_non_exhaustive()
    }
}

pub trait Scheduler {
    /// Runs `tick` every `period` until it returns [`ControlFlow::Break`] or the handle is cancelled.
    fn every(&self, period: Duration, tick: Box<dyn FnMut() -> ControlFlow>) -> TimerHandle;

    /// Runs `fire` once after `delay` unless the handle is cancelled first.
    fn after(&self, delay: Duration, fire: Box<dyn FnOnce()>) -> TimerHandle;

    /// Monotonic time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

enum Task {
    Once(Box<dyn FnOnce()>),
    Every(Duration, Box<dyn FnMut() -> ControlFlow>),
}

struct Entry {
    due: Duration,
    seq: u64,
    handle: TimerHandle,
    task: Task,
}

/// Deterministic scheduler with a virtual clock that only moves on [`ManualScheduler::advance`].
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    queue: RefCell<Vec<Entry>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, due: Duration, handle: TimerHandle, task: Task) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.queue.borrow_mut().push(Entry {
            due,
            seq,
            handle,
            task,
        });
    }

    fn pop_due(&self, deadline: Duration) -> Option<Entry> {
        let mut queue = self.queue.borrow_mut();
        let idx = queue
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= deadline)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(idx, _)| idx)?;
        Some(queue.swap_remove(idx))
    }

    /// Moves the clock forward, firing everything that falls due in order.
    /// Callbacks may schedule or cancel further timers.
    pub fn advance(&self, by: Duration) {
        let deadline = self.now.get() + by;
        while let Some(entry) = self.pop_due(deadline) {
            self.now.set(entry.due);
            if entry.handle.is_cancelled() {
                continue;
            }
            match entry.task {
                Task::Once(fire) => fire(),
                Task::Every(period, mut tick) => {
                    if tick() == ControlFlow::Continue && !entry.handle.is_cancelled() {
                        self.push(entry.due + period, entry.handle, Task::Every(period, tick));
                    }
                }
            }
        }
        self.now.set(deadline);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Live (not cancelled) timers still queued.
    pub fn pending_timers(&self) -> usize {
        self.queue
            .borrow()
            .iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period: Duration, tick: Box<dyn FnMut() -> ControlFlow>) -> TimerHandle {
        let handle = TimerHandle::new();
        let period = period.max(Duration::from_millis(1));
        self.push(self.now.get() + period, handle.clone(), Task::Every(period, tick));
        handle
    }

    fn after(&self, delay: Duration, fire: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = TimerHandle::new();
        self.push(self.now.get() + delay, handle.clone(), Task::Once(fire));
        handle
    }

    fn now(&self) -> Duration {
        self.now.get()
    }
}
