//! Viewer configuration, supplied by the page as JSON.
//!
//! ```json
//! { "server_url": "http://localhost:5000", "poll_interval_ms": 1000,
//!   "replay_interval_ms": 100, "log_level": "info" }
//! ```
//!
//! Every field is optional. Lives in WASM memory (thread_local) for the
//! lifetime of the module, like the session state.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

use crate::error::SyncError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL of the game server.
    pub server_url: String,
    /// Live-session poll period.
    pub poll_interval_ms: u32,
    /// Replay tick period.
    pub replay_interval_ms: u32,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            poll_interval_ms: 1000,
            replay_interval_ms: 100,
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        let config: ViewerConfig =
            serde_json::from_str(json).map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.server_url.trim().is_empty() {
            return Err(SyncError::Config("server_url must not be empty".to_string()));
        }
        if self.poll_interval_ms == 0 || self.replay_interval_ms == 0 {
            return Err(SyncError::Config("intervals must be at least 1 ms".to_string()));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<log::LevelFilter, SyncError> {
        self.log_level
            .parse()
            .map_err(|_| SyncError::Config(format!("unknown log level `{}`", self.log_level)))
    }
}

thread_local! {
    static CONFIG: RefCell<ViewerConfig> = RefCell::new(ViewerConfig::default());
}

/// Execute a closure with read access to the active configuration.
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&ViewerConfig) -> R,
{
    CONFIG.with(|c| f(&c.borrow()))
}

/// Replace the active configuration.
pub fn replace_config(config: ViewerConfig) {
    CONFIG.with(|c| {
        *c.borrow_mut() = config;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_nominal_ticks() {
        let c = ViewerConfig::default();
        assert_eq!(c.poll_interval_ms, 1000);
        assert_eq!(c.replay_interval_ms, 100);
        assert_eq!(c.level_filter().unwrap(), log::LevelFilter::Info);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = ViewerConfig::from_json(r#"{"server_url": "https://snake.example"}"#).unwrap();
        assert_eq!(c.server_url, "https://snake.example");
        assert_eq!(c.poll_interval_ms, 1000);
    }

    #[test]
    fn rejects_zero_interval() {
        let err = ViewerConfig::from_json(r#"{"replay_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(ViewerConfig::from_json(r#"{"log_level": "loud"}"#).is_err());
        assert!(ViewerConfig::from_json(r#"{"log_level": "DEBUG"}"#).is_ok());
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(ViewerConfig::from_json("not valid json {{{").is_err());
    }

    #[test]
    fn replace_and_read_back() {
        let mut c = ViewerConfig::default();
        c.poll_interval_ms = 250;
        replace_config(c);
        assert_eq!(with_config(|c| c.poll_interval_ms), 250);
        replace_config(ViewerConfig::default());
    }
}
