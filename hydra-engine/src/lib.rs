//! Hydra in-browser WASM engine.
//!
//! Computational core of the N-dimensional snake viewer. The page (three.js
//! renderer plus UI) calls these exports; everything stateful lives in WASM
//! memory for the lifetime of the module.
//!
//! - `layout` — hyper-layout of an N-dimensional grid into 3D positions.
//! - `start_live_session` / `start_replay_session` — keep the flattened cell
//!   state in sync with the game server, by polling or by replaying an
//!   agent's recorded game.
//! - `flattened_state`, `positions`, `cell_colors` — read each repaint.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod grid;
pub mod logging;
pub mod net;
pub mod session;

use crate::config::{replace_config, with_config, ViewerConfig};
use crate::error::SyncError;
use crate::grid::DimensionSizes;
use crate::net::protocol::AgentConfiguration;
use crate::session::state::{self, with_engine, with_engine_mut};
use crate::session::{driver, SyncEngine};

/// Module entry point: installs the panic hook and console logger.
#[wasm_bindgen(start)]
pub fn start() {
    let level = with_config(|c| c.level_filter()).unwrap_or(log::LevelFilter::Info);
    logging::init_logging(level);
    log::info!("hydra-engine {} ready", env!("CARGO_PKG_VERSION"));
}

/// Replace the viewer configuration with `json` (see [`ViewerConfig`]).
/// The previous configuration stays active if `json` is invalid.
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let config = ViewerConfig::from_json(json)?;
    logging::init_logging(config.level_filter()?);
    replace_config(config);
    Ok(())
}

// ── Layout ─────────────────────────────────────────────────────────

/// Positions for a grid of the given sizes (innermost dimension first),
/// as a flat `[x0, y0, z0, x1, ...]` buffer.
#[wasm_bindgen(js_name = layout)]
pub fn layout_positions(sizes: Vec<u32>) -> Result<Vec<f32>, JsValue> {
    let sizes = DimensionSizes::new(sizes.into_iter().map(|s| s as usize).collect())
        .map_err(SyncError::from)?;
    Ok(grid::layout(&sizes).to_flat())
}

// ── Sessions ───────────────────────────────────────────────────────

/// Start a live game on a `dim_count`-dimensional cube of side `level_size`.
#[wasm_bindgen]
pub fn start_live_session(level_size: u32, dim_count: u32) -> Result<(), JsValue> {
    driver::start_live(level_size as usize, dim_count as usize)?;
    Ok(())
}

/// Replay a game played by the agent described by `descriptor`
/// (`{ model_name, n_dims, level_size, train_timesteps }`).
#[wasm_bindgen]
pub fn start_replay_session(descriptor: JsValue) -> Result<(), JsValue> {
    let agent: AgentConfiguration = serde_wasm_bindgen::from_value(descriptor)
        .map_err(|e| SyncError::Decode(e.to_string()))?;
    driver::start_replay(agent)?;
    Ok(())
}

/// Agents the server can replay games for.
#[wasm_bindgen]
pub async fn list_agent_configurations() -> Result<JsValue, JsValue> {
    let configurations = driver::agent_configurations().await?;
    serde_wasm_bindgen::to_value(&configurations).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn stop_session() {
    driver::stop();
}

/// Stop everything and forget the current view and callbacks.
#[wasm_bindgen]
pub fn teardown() {
    driver::stop();
    state::set_repaint_callback(None);
    state::set_error_callback(None);
    state::replace_engine(SyncEngine::new());
}

/// `idle`, `starting`, `live` or `replaying`.
#[wasm_bindgen]
pub fn session_state() -> String {
    with_engine(|e| e.session_state().label().to_string())
}

/// How the last session ended, if one has.
#[wasm_bindgen]
pub fn last_outcome() -> Option<String> {
    with_engine(|e| e.last_end().map(|end| end.label()))
}

/// `[step, total]` while replaying, empty otherwise.
#[wasm_bindgen]
pub fn replay_progress() -> Vec<u32> {
    with_engine(|e| {
        e.replay_progress()
            .map(|(step, total)| vec![step as u32, total as u32])
            .unwrap_or_default()
    })
}

#[wasm_bindgen]
pub fn set_repaint_callback(callback: Option<js_sys::Function>) {
    state::set_repaint_callback(callback);
}

#[wasm_bindgen]
pub fn set_error_callback(callback: Option<js_sys::Function>) {
    state::set_error_callback(callback);
}

// ── Directional input ──────────────────────────────────────────────

/// Set the direction sent with the next poll (`±dimension`).
#[wasm_bindgen]
pub fn set_direction(code: i32) -> Result<(), JsValue> {
    with_engine_mut(|e| e.set_direction(code))?;
    Ok(())
}

/// Steer with a controller key; returns the new direction code, or
/// `undefined` for unbound keys.
#[wasm_bindgen]
pub fn press_key(key: &str) -> Result<Option<i32>, JsValue> {
    let direction = with_engine_mut(|e| e.press_key(key))?;
    Ok(direction.map(|d| d.code()))
}

/// Choose which dimension group (0-based) the X/Y/Z keys steer.
#[wasm_bindgen]
pub fn select_dimension_group(group: u32) -> Result<(), JsValue> {
    with_engine_mut(|e| e.select_group(group as usize))?;
    Ok(())
}

#[wasm_bindgen]
pub fn direction() -> i32 {
    with_engine(|e| e.direction().code())
}

/// Current direction as a unit vector over all dimensions, innermost first.
/// Empty without a view.
#[wasm_bindgen]
pub fn direction_vector() -> Vec<i32> {
    with_engine(|e| {
        e.view()
            .map(|v| e.direction().to_vector(v.sizes().len()))
            .unwrap_or_default()
    })
}

// ── View (read each repaint) ───────────────────────────────────────

#[wasm_bindgen]
pub fn dimension_sizes() -> Vec<u32> {
    with_engine(|e| {
        e.view()
            .map(|v| v.sizes().as_slice().iter().map(|&s| s as u32).collect())
            .unwrap_or_default()
    })
}

#[wasm_bindgen]
pub fn flattened_state() -> Vec<i32> {
    with_engine(|e| e.state().to_vec())
}

#[wasm_bindgen]
pub fn positions() -> Vec<f32> {
    with_engine(|e| e.view().map(|v| v.positions().to_flat()).unwrap_or_default())
}

/// `0xRRGGBB` per cell, aligned with `flattened_state`.
#[wasm_bindgen]
pub fn cell_colors() -> Vec<u32> {
    with_engine(|e| e.view().map(|v| v.colors()).unwrap_or_default())
}

/// `[min_x, min_y, min_z, max_x, max_y, max_z]`, empty without a view.
#[wasm_bindgen]
pub fn view_bounds() -> Vec<f32> {
    with_engine(|e| {
        e.view()
            .and_then(|v| v.bounds())
            .map(|b| b.min.iter().chain(b.max.iter()).copied().collect())
            .unwrap_or_default()
    })
}

/// Midpoint of `view_bounds`, for the camera target.
#[wasm_bindgen]
pub fn view_center() -> Vec<f32> {
    with_engine(|e| {
        e.view()
            .and_then(|v| v.bounds())
            .map(|b| b.center().to_vec())
            .unwrap_or_default()
    })
}
