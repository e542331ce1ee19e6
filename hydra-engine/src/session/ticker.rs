//! The one recurring timer that drives the running session.
//!
//! A `Ticker` owns a `setInterval` registration and clears it on drop.
//! `reconcile` keeps at most one ticker alive and always for the engine's
//! current running session, so replacing or ending a session stops the old
//! timer before a new one is installed.

use std::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Window, WorkerGlobalScope};

use crate::config;
use crate::error::SyncError;
use crate::session::engine::{SessionHandle, SessionKind};

struct Interval {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    fn start(period_ms: u32, callback: Closure<dyn FnMut()>) -> Result<Self, SyncError> {
        let global = js_sys::global();
        let function: &js_sys::Function = callback.as_ref().unchecked_ref();
        let timeout = period_ms.min(i32::MAX as u32) as i32;
        let registered = if let Some(window) = global.dyn_ref::<Window>() {
            window.set_interval_with_callback_and_timeout_and_arguments_0(function, timeout)
        } else if let Some(worker) = global.dyn_ref::<WorkerGlobalScope>() {
            worker.set_interval_with_callback_and_timeout_and_arguments_0(function, timeout)
        } else {
            return Err(SyncError::Request(
                "setInterval is unavailable in this context".to_string(),
            ));
        };
        let id = registered.map_err(js_timer_error)?;
        Ok(Self {
            id,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        let global = js_sys::global();
        if let Some(window) = global.dyn_ref::<Window>() {
            window.clear_interval_with_handle(self.id);
        } else if let Some(worker) = global.dyn_ref::<WorkerGlobalScope>() {
            worker.clear_interval_with_handle(self.id);
        }
    }
}

fn js_timer_error(e: JsValue) -> SyncError {
    SyncError::Request(format!("could not start timer: {:?}", e))
}

struct Ticker {
    session: SessionHandle,
    _interval: Interval,
}

thread_local! {
    static TICKER: RefCell<Option<Ticker>> = const { RefCell::new(None) };
}

/// Period for a session kind, from the active configuration.
pub fn period_for(kind: SessionKind) -> u32 {
    config::with_config(|c| match kind {
        SessionKind::Live => c.poll_interval_ms,
        SessionKind::Replaying => c.replay_interval_ms,
    })
}

/// Make the installed timer match `running`: keep it, replace it, or stop it.
pub fn reconcile(running: Option<SessionHandle>, on_tick: fn(SessionKind)) {
    if installed() == running {
        return;
    }
    // Drop the old interval before a new one can fire.
    let old = TICKER.with(|t| t.borrow_mut().take());
    drop(old);

    let Some(session) = running else {
        return;
    };
    let period = period_for(session.kind);
    let callback = Closure::<dyn FnMut()>::new(move || on_tick(session.kind));
    match Interval::start(period, callback) {
        Ok(interval) => {
            log::debug!("session {}: ticking every {} ms", session.id, period);
            TICKER.with(|t| {
                *t.borrow_mut() = Some(Ticker {
                    session,
                    _interval: interval,
                })
            });
        }
        Err(e) => log::error!("session {}: {}", session.id, e),
    }
}

/// Session the installed timer is ticking for, if any.
pub fn installed() -> Option<SessionHandle> {
    TICKER.with(|t| t.borrow().as_ref().map(|ticker| ticker.session))
}

/// Stop ticking regardless of session state.
pub fn stop() {
    let old = TICKER.with(|t| t.borrow_mut().take());
    drop(old);
}
