//! Wire types exchanged with the Ouroboros game server.
//!
//! ```text
//! GET /init?level_size=5&n_dims=4              → { "state": [[...]] }
//! GET /progress?direction=-2                   → { "diff": {"17": 2, "18": 1}, "status": 0 }
//! GET /available_agent_configurations          → { "configurations": [ {...} ] }
//! GET /game_from_agent?level_size=..&n_dims=..
//!         &model_name=..&train_timesteps=..    → { "initial_state": [[...]], "diffs": [ {...} ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GridError;
use crate::grid::tensor::{CellCode, StateTensor};

/// Sparse absolute overwrite: flat index → new cell code.
///
/// Keys arrive as JSON strings. Any key that is not an `i64` is kept aside
/// rather than failing the whole body, so a malformed index surfaces from
/// [`apply`](Self::apply) as a shape violation instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    cells: BTreeMap<i64, CellCode>,
    unparsed: Option<String>,
}

impl Diff {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.unparsed.is_none()
    }

    /// Overwrite every listed cell. All indices are checked before the
    /// first write, so a rejected diff leaves `state` untouched.
    pub fn apply(&self, state: &mut [CellCode]) -> Result<usize, GridError> {
        if let Some(key) = &self.unparsed {
            return Err(GridError::MalformedIndex { key: key.clone() });
        }
        let len = state.len();
        if let Some(&index) = self
            .cells
            .keys()
            .find(|&&i| i < 0 || i as u64 >= len as u64)
        {
            return Err(GridError::IndexOutOfRange { index, len });
        }
        for (&index, &code) in &self.cells {
            state[index as usize] = code;
        }
        Ok(self.cells.len())
    }
}

impl<'de> Deserialize<'de> for Diff {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, CellCode>::deserialize(deserializer)?;
        let mut diff = Diff::default();
        for (key, code) in raw {
            match key.parse::<i64>() {
                Ok(index) => {
                    diff.cells.insert(index, code);
                }
                Err(_) => {
                    diff.unparsed.get_or_insert(key);
                }
            }
        }
        Ok(diff)
    }
}

impl<const N: usize> From<[(i64, CellCode); N]> for Diff {
    fn from(entries: [(i64, CellCode); N]) -> Self {
        Diff {
            cells: BTreeMap::from(entries),
            unparsed: None,
        }
    }
}

/// Game status as reported by `progress`. Any positive code ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "i32")]
pub enum GameStatus {
    Playing,
    Lost,
    Won,
    Other(i32),
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        i32::from(self) > 0
    }

    pub fn label(self) -> String {
        match self {
            GameStatus::Playing => "playing".to_string(),
            GameStatus::Lost => "lost".to_string(),
            GameStatus::Won => "won".to_string(),
            GameStatus::Other(code) => format!("status {}", code),
        }
    }
}

impl From<i32> for GameStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => GameStatus::Playing,
            1 => GameStatus::Lost,
            2 => GameStatus::Won,
            other => GameStatus::Other(other),
        }
    }
}

impl From<GameStatus> for i32 {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Playing => 0,
            GameStatus::Lost => 1,
            GameStatus::Won => 2,
            GameStatus::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InitResponse {
    pub state: StateTensor,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressResponse {
    #[serde(default)]
    pub diff: Option<Diff>,
    pub status: GameStatus,
}

/// A trained agent whose games can be replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    pub model_name: String,
    pub n_dims: usize,
    pub level_size: usize,
    pub train_timesteps: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentConfigurationsResponse {
    pub configurations: Vec<AgentConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentGameResponse {
    pub initial_state: StateTensor,
    pub diffs: Vec<Diff>,
}

/// Session-scoped requests the sync engine asks its driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Init { level_size: usize, dim_count: usize },
    Progress { direction: i32 },
    GameFromAgent(AgentConfiguration),
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::Init { .. } => "init",
            Request::Progress { .. } => "progress",
            Request::GameFromAgent(_) => "game_from_agent",
        }
    }
}

/// Decoded reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Init(InitResponse),
    Progress(ProgressResponse),
    GameFromAgent(AgentGameResponse),
}
