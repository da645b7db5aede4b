use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gtk4::glib;

use crate::engine::{ControlFlow, Scheduler, TimerHandle};

// Holds the source id while GLib still owns the callback.
type SourceSlot = Rc<RefCell<Option<glib::SourceId>>>;

fn attach_source(handle: &TimerHandle, source: SourceSlot, id: glib::SourceId) {
    source.replace(Some(id));
    handle.on_cancel(move || {
        let id = source.borrow_mut().take();
        if let Some(id) = id {
            id.remove();
        }
    });
}

pub struct GlibScheduler {
    origin_us: i64,
}

impl GlibScheduler {
    pub fn new() -> Self {
        GlibScheduler {
            origin_us: glib::monotonic_time(),
        }
    }
}

impl Default for GlibScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for GlibScheduler {
    fn every(&self, period: Duration, mut tick: Box<dyn FnMut() -> ControlFlow>) -> TimerHandle {
        let handle = TimerHandle::new();
        let guard = handle.clone();
        let source = SourceSlot::default();
        let finished = source.clone();
        let id = glib::timeout_add_local(period, move || {
            let flow = if guard.is_cancelled() {
                ControlFlow::Break
            } else {
                tick()
            };
            match flow {
                ControlFlow::Continue => glib::ControlFlow::Continue,
                ControlFlow::Break => {
                    finished.borrow_mut().take();
                    glib::ControlFlow::Break
                }
            }
        });
        attach_source(&handle, source, id);
        handle
    }

    fn after(&self, delay: Duration, fire: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = TimerHandle::new();
        let guard = handle.clone();
        let source = SourceSlot::default();
        let finished = source.clone();
        let id = glib::timeout_add_local_once(delay, move || {
            finished.borrow_mut().take();
            if !guard.is_cancelled() {
                fire();
            }
        });
        attach_source(&handle, source, id);
        handle
    }

    fn now(&self) -> Duration {
        let elapsed_us = glib::monotonic_time() - self.origin_us;
        Duration::from_micros(elapsed_us.max(0) as u64)
    }
}
