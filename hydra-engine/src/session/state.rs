//! Global session container.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in single-threaded
//! WASM. Each borrow covers one engine call, so a diff is applied under a
//! single exclusive borrow and ticks can never interleave with it.

use std::cell::RefCell;

use crate::session::engine::SyncEngine;

thread_local! {
    static ENGINE: RefCell<SyncEngine> = RefCell::new(SyncEngine::new());
    static REPAINT: RefCell<Option<js_sys::Function>> = const { RefCell::new(None) };
    static ON_ERROR: RefCell<Option<js_sys::Function>> = const { RefCell::new(None) };
}

/// Execute a closure with read access to the engine.
pub fn with_engine<F, R>(f: F) -> R
where
    F: FnOnce(&SyncEngine) -> R,
{
    ENGINE.with(|e| f(&e.borrow()))
}

/// Execute a closure with mutable access to the engine.
pub fn with_engine_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut SyncEngine) -> R,
{
    ENGINE.with(|e| f(&mut e.borrow_mut()))
}

/// Replace the engine wholesale (used on teardown).
pub fn replace_engine(engine: SyncEngine) {
    ENGINE.with(|e| {
        *e.borrow_mut() = engine;
    });
}

pub fn set_repaint_callback(callback: Option<js_sys::Function>) {
    REPAINT.with(|r| *r.borrow_mut() = callback);
}

pub fn set_error_callback(callback: Option<js_sys::Function>) {
    ON_ERROR.with(|r| *r.borrow_mut() = callback);
}

/// Tell the renderer the state (or the whole view) changed.
pub fn notify_repaint() {
    let callback = REPAINT.with(|r| r.borrow().clone());
    if let Some(f) = callback {
        if let Err(e) = f.call0(&wasm_bindgen::JsValue::NULL) {
            log::warn!("repaint callback threw: {:?}", e);
        }
    }
}

/// Hand a session error to the page.
pub fn notify_error(message: &str) {
    let callback = ON_ERROR.with(|r| r.borrow().clone());
    if let Some(f) = callback {
        let arg = wasm_bindgen::JsValue::from_str(message);
        if let Err(e) = f.call1(&wasm_bindgen::JsValue::NULL, &arg) {
            log::warn!("error callback threw: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::engine::SessionState;

    #[test]
    fn engine_starts_idle() {
        replace_engine(SyncEngine::new());
        with_engine(|e| assert_eq!(e.session_state(), SessionState::Idle));
    }

    #[test]
    fn mutations_persist_between_borrows() {
        replace_engine(SyncEngine::new());
        with_engine_mut(|e| e.start_live(2, 2)).unwrap();
        with_engine(|e| assert!(matches!(e.session_state(), SessionState::Starting(_))));
        replace_engine(SyncEngine::new());
    }

    #[test]
    fn notify_without_callbacks_is_a_no_op() {
        notify_repaint();
        notify_error("nothing listening");
    }
}
