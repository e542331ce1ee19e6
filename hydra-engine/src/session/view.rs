//! The renderable pair: positions and flattened state for one grid shape.
//!
//! A `View` is only ever built whole from a shape and a tensor, and only
//! ever replaced whole, so positions and state can never come from two
//! different dimension-size configurations.

use crate::error::GridError;
use crate::grid::cell;
use crate::grid::layout::{layout, Bounds, PositionTable};
use crate::grid::shape::DimensionSizes;
use crate::grid::tensor::{CellCode, StateTensor};
use crate::net::protocol::Diff;

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    sizes: DimensionSizes,
    positions: PositionTable,
    state: Vec<CellCode>,
}

impl View {
    /// Flatten `tensor` against `sizes` and lay the grid out.
    pub fn build(sizes: DimensionSizes, tensor: &StateTensor) -> Result<Self, GridError> {
        let state = tensor.flatten(&sizes)?;
        let positions = layout(&sizes);
        Ok(Self {
            sizes,
            positions,
            state,
        })
    }

    pub fn sizes(&self) -> &DimensionSizes {
        &self.sizes
    }

    pub fn positions(&self) -> &PositionTable {
        &self.positions
    }

    pub fn state(&self) -> &[CellCode] {
        &self.state
    }

    pub fn colors(&self) -> Vec<u32> {
        cell::colors(&self.state)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.positions.bounds()
    }

    /// Apply one diff atomically. Returns the number of cells written.
    pub fn apply(&mut self, diff: &Diff) -> Result<usize, GridError> {
        diff.apply(&mut self.state)
    }
}
