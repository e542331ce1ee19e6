//! Sync engine — keeps the flattened state in step with the game server.
//!
//! The engine performs no I/O. Starting a session or polling hands back a
//! [`PendingRequest`] tagged with the session's [`SessionHandle`]; the
//! driver performs the request and feeds the reply to [`SyncEngine::complete`].
//! Every session start, stop, or end bumps the generation, so a reply
//! tagged with an older handle is discarded as stale.
//!
//! ```text
//!            start_live ──► Starting(Live) ──init ok──► Live ──status > 0──► Idle
//!  Idle ──┤                       │                      │
//!            start_replay ─► Starting(Replay) ─ok─► Replaying ──step > k──► Idle
//!                                 └── request / shape failure ──────────────► Idle
//! ```

use crate::error::SyncError;
use crate::grid::shape::DimensionSizes;
use crate::grid::tensor::{CellCode, StateTensor};
use crate::net::protocol::{
    AgentConfiguration, AgentGameResponse, Diff, GameStatus, ProgressResponse, Reply, Request,
};
use crate::session::direction::{key_binding, Direction};
use crate::session::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Live,
    Replaying,
}

/// Identifies one session. `id` is the engine generation at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub id: u64,
    pub kind: SessionKind,
}

/// A request the driver must perform on behalf of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub handle: SessionHandle,
    pub request: Request,
}

/// Externally visible session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting(SessionKind),
    Live,
    Replaying,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Starting(_) => "starting",
            SessionState::Live => "live",
            SessionState::Replaying => "replaying",
        }
    }
}

/// Why the last session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server reported a terminal status.
    Finished(GameStatus),
    /// Replay ran through every diff.
    Exhausted,
    /// Stopped or replaced by the user.
    Stopped,
    /// Start-up request failed or the server broke the shape contract.
    Failed,
}

impl SessionEnd {
    pub fn label(self) -> String {
        match self {
            SessionEnd::Finished(status) => status.label(),
            SessionEnd::Exhausted => "replay finished".to_string(),
            SessionEnd::Stopped => "stopped".to_string(),
            SessionEnd::Failed => "failed".to_string(),
        }
    }
}

/// Result of feeding the engine a reply or a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Reply from a superseded session; dropped.
    Stale,
    /// Tick fired outside the phase it belongs to.
    Ignored,
    Started(SessionKind),
    Applied { cells: usize },
    Ended(SessionEnd),
}

#[derive(Debug)]
enum Phase {
    Idle,
    Starting {
        handle: SessionHandle,
        sizes: DimensionSizes,
    },
    Live(SessionHandle),
    Replaying {
        handle: SessionHandle,
        diffs: Vec<Diff>,
        step: usize,
    },
}

#[derive(Debug)]
pub struct SyncEngine {
    generation: u64,
    phase: Phase,
    view: Option<View>,
    direction: Direction,
    group: usize,
    applied: usize,
    last_end: Option<SessionEnd>,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEngine {
    pub fn new() -> Self {
        Self {
            generation: 0,
            phase: Phase::Idle,
            view: None,
            direction: Direction::default(),
            group: 0,
            applied: 0,
            last_end: None,
        }
    }

    // ── Session lifecycle ──────────────────────────────────────────

    /// Begin a live game on a `dim_count`-dimensional cube of side `level_size`.
    /// Any running session is superseded.
    pub fn start_live(
        &mut self,
        level_size: usize,
        dim_count: usize,
    ) -> Result<PendingRequest, SyncError> {
        let sizes = DimensionSizes::cube(level_size, dim_count)?;
        let handle = self.begin(SessionKind::Live, sizes);
        log::info!(
            "session {}: starting live game ({}^{})",
            handle.id,
            level_size,
            dim_count
        );
        Ok(PendingRequest {
            handle,
            request: Request::Init {
                level_size,
                dim_count,
            },
        })
    }

    /// Begin replaying a game played by a trained agent.
    pub fn start_replay(
        &mut self,
        agent: AgentConfiguration,
    ) -> Result<PendingRequest, SyncError> {
        let sizes = DimensionSizes::cube(agent.level_size, agent.n_dims)?;
        let handle = self.begin(SessionKind::Replaying, sizes);
        log::info!(
            "session {}: fetching {} agent game ({}^{}, {} steps)",
            handle.id,
            agent.model_name,
            agent.level_size,
            agent.n_dims,
            agent.train_timesteps
        );
        Ok(PendingRequest {
            handle,
            request: Request::GameFromAgent(agent),
        })
    }

    /// Stop the running session, if any. In-flight replies become stale.
    pub fn stop(&mut self) -> bool {
        if matches!(self.phase, Phase::Idle) {
            return false;
        }
        self.end(SessionEnd::Stopped);
        true
    }

    fn begin(&mut self, kind: SessionKind, sizes: DimensionSizes) -> SessionHandle {
        if !matches!(self.phase, Phase::Idle) {
            log::info!("session {}: superseded", self.generation);
            self.last_end = Some(SessionEnd::Stopped);
        }
        self.generation += 1;
        let handle = SessionHandle {
            id: self.generation,
            kind,
        };
        self.phase = Phase::Starting { handle, sizes };
        handle
    }

    fn end(&mut self, end: SessionEnd) {
        log::info!("session {}: ended ({})", self.generation, end.label());
        self.generation += 1;
        self.phase = Phase::Idle;
        self.last_end = Some(end);
    }

    /// Contract violation: end the session and hand the error back.
    fn violation(&mut self, err: SyncError) -> SyncError {
        log::error!("session {}: {}", self.generation, err);
        self.end(SessionEnd::Failed);
        err
    }

    // ── Ticks ──────────────────────────────────────────────────────

    /// Request for one poll tick. `None` unless live.
    pub fn poll_tick(&self) -> Option<PendingRequest> {
        match self.phase {
            Phase::Live(handle) => Some(PendingRequest {
                handle,
                request: Request::Progress {
                    direction: self.direction.code(),
                },
            }),
            _ => None,
        }
    }

    /// Advance the replay by one diff; one tick past the last diff ends it.
    pub fn replay_tick(&mut self) -> Result<Transition, SyncError> {
        let next = match &mut self.phase {
            Phase::Replaying { diffs, step, .. } => {
                *step += 1;
                diffs.get(*step - 1).cloned()
            }
            _ => return Ok(Transition::Ignored),
        };
        let Some(diff) = next else {
            self.end(SessionEnd::Exhausted);
            return Ok(Transition::Ended(SessionEnd::Exhausted));
        };
        let Some(view) = self.view.as_mut() else {
            return Ok(Transition::Ignored);
        };
        match view.apply(&diff) {
            Ok(cells) => {
                self.applied += 1;
                Ok(Transition::Applied { cells })
            }
            Err(e) => Err(self.violation(e.into())),
        }
    }

    // ── Replies ────────────────────────────────────────────────────

    /// Feed the outcome of a [`PendingRequest`] back into the engine.
    ///
    /// Request failures during a live session leave it running; during
    /// start-up they return the engine to idle. Shape violations always end
    /// the session.
    pub fn complete(
        &mut self,
        handle: SessionHandle,
        result: Result<Reply, SyncError>,
    ) -> Result<Transition, SyncError> {
        if handle.id != self.generation {
            log::debug!(
                "dropping reply for session {} (current {})",
                handle.id,
                self.generation
            );
            return Ok(Transition::Stale);
        }
        let reply = match result {
            Ok(reply) => reply,
            Err(err) => return Err(self.request_failed(err)),
        };
        match reply {
            Reply::Init(init) => self.enter(SessionKind::Live, &init.state, Vec::new()),
            Reply::GameFromAgent(AgentGameResponse {
                initial_state,
                diffs,
            }) => self.enter(SessionKind::Replaying, &initial_state, diffs),
            Reply::Progress(progress) => self.apply_progress(progress),
        }
    }

    fn request_failed(&mut self, err: SyncError) -> SyncError {
        if matches!(self.phase, Phase::Starting { .. }) {
            log::warn!("session {}: start-up failed: {}", self.generation, err);
            self.end(SessionEnd::Failed);
        } else {
            log::warn!("session {}: {}", self.generation, err);
        }
        err
    }

    fn enter(
        &mut self,
        kind: SessionKind,
        tensor: &StateTensor,
        diffs: Vec<Diff>,
    ) -> Result<Transition, SyncError> {
        let (handle, sizes) = match &self.phase {
            Phase::Starting { handle, sizes } if handle.kind == kind => (*handle, sizes.clone()),
            _ => {
                let received = match kind {
                    SessionKind::Live => "init",
                    SessionKind::Replaying => "game_from_agent",
                };
                return Err(self.violation(SyncError::UnexpectedReply { received }));
            }
        };
        let view = match View::build(sizes, tensor) {
            Ok(view) => view,
            Err(e) => return Err(self.violation(e.into())),
        };
        log::info!(
            "session {}: {} cells across {} dimensions",
            handle.id,
            view.state().len(),
            view.sizes().len()
        );
        self.view = Some(view);
        self.direction = Direction::default();
        self.group = 0;
        self.applied = 0;
        self.phase = match kind {
            SessionKind::Live => Phase::Live(handle),
            SessionKind::Replaying => Phase::Replaying {
                handle,
                diffs,
                step: 0,
            },
        };
        Ok(Transition::Started(kind))
    }

    fn apply_progress(&mut self, progress: ProgressResponse) -> Result<Transition, SyncError> {
        if !matches!(self.phase, Phase::Live(_)) {
            return Err(self.violation(SyncError::UnexpectedReply {
                received: "progress",
            }));
        }
        let mut cells = 0;
        if let Some(diff) = &progress.diff {
            match self.view.as_mut().map(|view| view.apply(diff)) {
                Some(Ok(n)) => {
                    cells = n;
                    self.applied += 1;
                }
                Some(Err(e)) => return Err(self.violation(e.into())),
                None => {}
            }
        }
        if progress.status.is_over() {
            let end = SessionEnd::Finished(progress.status);
            self.end(end);
            return Ok(Transition::Ended(end));
        }
        Ok(Transition::Applied { cells })
    }

    // ── Directional input ──────────────────────────────────────────

    fn dimensions(&self) -> usize {
        match &self.phase {
            Phase::Starting { sizes, .. } => sizes.len(),
            _ => self.view.as_ref().map_or(0, |v| v.sizes().len()),
        }
    }

    /// Set the direction from its wire code.
    pub fn set_direction(&mut self, code: i32) -> Result<Direction, SyncError> {
        let direction = Direction::from_code(code, self.dimensions())?;
        self.direction = direction;
        Ok(direction)
    }

    /// Choose which dimension group the X/Y/Z keys steer.
    pub fn select_group(&mut self, group: usize) -> Result<(), SyncError> {
        let groups = self.dimensions().div_ceil(3);
        if group >= groups {
            return Err(SyncError::InvalidGroup { group, groups });
        }
        self.group = group;
        Ok(())
    }

    /// Steer with a controller key. Unbound keys return `Ok(None)`.
    pub fn press_key(&mut self, key: &str) -> Result<Option<Direction>, SyncError> {
        let Some((axis, positive)) = key_binding(key) else {
            return Ok(None);
        };
        let direction = Direction::in_group(self.group, axis, positive, self.dimensions())?;
        self.direction = direction;
        Ok(Some(direction))
    }

    // ── Read access ────────────────────────────────────────────────

    pub fn session_state(&self) -> SessionState {
        match &self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Starting { handle, .. } => SessionState::Starting(handle.kind),
            Phase::Live(_) => SessionState::Live,
            Phase::Replaying { .. } => SessionState::Replaying,
        }
    }

    /// The session that should currently be ticking.
    pub fn running_session(&self) -> Option<SessionHandle> {
        match &self.phase {
            Phase::Live(handle) | Phase::Replaying { handle, .. } => Some(*handle),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn state(&self) -> &[CellCode] {
        self.view.as_ref().map_or(&[], |v| v.state())
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn selected_group(&self) -> usize {
        self.group
    }

    /// `(step, total)` while replaying.
    pub fn replay_progress(&self) -> Option<(usize, usize)> {
        match &self.phase {
            Phase::Replaying { diffs, step, .. } => Some((*step, diffs.len())),
            _ => None,
        }
    }

    /// Diffs applied since the current (or last) session started.
    pub fn applied_diffs(&self) -> usize {
        self.applied
    }

    pub fn last_end(&self) -> Option<SessionEnd> {
        self.last_end
    }
}
