//! Session module — live polling and replay of server-side games.
//!
//! `engine` is the I/O-free state machine; `driver` and `ticker` wire it to
//! `fetch` and `setInterval`; `state` holds the single engine instance in
//! WASM memory for the lifetime of the page.

pub mod direction;
pub mod driver;
pub mod engine;
pub mod state;
pub mod ticker;
pub mod view;

pub use direction::Direction;
pub use engine::{SessionEnd, SessionHandle, SessionKind, SessionState, SyncEngine, Transition};
pub use view::View;
