//! Re-entry point for browser callbacks.
//!
//! JS callbacks (promise resolutions, recorder events, interval ticks) only
//! push onto the session's event sink. They then call [`Waker::wake`], which
//! runs whatever pump the owner installed, normally a closure that drains
//! the queue on the `SessionManager`.

use std::cell::RefCell;
use std::rc::Rc;

type Pump = Rc<dyn Fn()>;

#[derive(Clone, Default)]
pub struct Waker {
    pump: Rc<RefCell<Option<Pump>>>,
}

impl Waker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the closure run on every wake. Replaces any previous one.
    pub fn set(&self, pump: impl Fn() + 'static) {
        *self.pump.borrow_mut() = Some(Rc::new(pump));
    }

    pub fn clear(&self) {
        self.pump.borrow_mut().take();
    }

    pub fn wake(&self) {
        // Clone out first so the pump may call `set`/`clear` itself.
        let pump = self.pump.borrow().clone();
        if let Some(pump) = pump {
            pump();
        }
    }
}
