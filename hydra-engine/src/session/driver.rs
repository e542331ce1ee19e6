//! Drives the engine from the browser: performs its requests with `fetch`,
//! feeds replies back, and keeps the interval timer in step with the
//! running session.

use wasm_bindgen_futures::spawn_local;

use crate::config;
use crate::error::SyncError;
use crate::net::client::GameServer;
use crate::net::protocol::AgentConfiguration;
use crate::session::engine::{PendingRequest, SessionKind, Transition};
use crate::session::state::{notify_error, notify_repaint, with_engine, with_engine_mut};
use crate::session::ticker;

fn server() -> GameServer {
    GameServer::new(config::with_config(|c| c.server_url.clone()))
}

pub fn start_live(level_size: usize, dim_count: usize) -> Result<(), SyncError> {
    let pending = with_engine_mut(|e| e.start_live(level_size, dim_count))?;
    reconcile();
    dispatch(pending);
    Ok(())
}

pub fn start_replay(agent: AgentConfiguration) -> Result<(), SyncError> {
    let pending = with_engine_mut(|e| e.start_replay(agent))?;
    reconcile();
    dispatch(pending);
    Ok(())
}

pub fn stop() {
    if with_engine_mut(|e| e.stop()) {
        notify_repaint();
    }
    ticker::stop();
}

pub async fn agent_configurations() -> Result<Vec<AgentConfiguration>, SyncError> {
    server().agent_configurations().await
}

fn dispatch(pending: PendingRequest) {
    let server = server();
    spawn_local(async move {
        let result = server.send(&pending.request).await;
        settle(with_engine_mut(|e| e.complete(pending.handle, result)));
    });
}

fn settle(outcome: Result<Transition, SyncError>) {
    match outcome {
        Ok(Transition::Stale) | Ok(Transition::Ignored) => {}
        Ok(_) => notify_repaint(),
        Err(e) => {
            notify_error(&e.to_string());
            if !e.is_request_failure() {
                notify_repaint();
            }
        }
    }
    reconcile();
}

fn on_tick(kind: SessionKind) {
    match kind {
        SessionKind::Live => {
            if let Some(pending) = with_engine(|e| e.poll_tick()) {
                dispatch(pending);
            }
        }
        SessionKind::Replaying => settle(with_engine_mut(|e| e.replay_tick())),
    }
}

fn reconcile() {
    ticker::reconcile(with_engine(|e| e.running_session()), on_tick);
}
