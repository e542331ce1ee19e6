//! Cell state codes and the colours the viewer paints them with.

use crate::grid::tensor::CellCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Fruit,
    Empty,
    Head,
    Body,
}

impl CellKind {
    /// Unknown codes render as empty cells.
    pub fn from_code(code: CellCode) -> CellKind {
        match code {
            -2 => CellKind::Wall,
            -1 => CellKind::Fruit,
            1 => CellKind::Head,
            2 => CellKind::Body,
            _ => CellKind::Empty,
        }
    }

    pub fn code(self) -> CellCode {
        match self {
            CellKind::Wall => -2,
            CellKind::Fruit => -1,
            CellKind::Empty => 0,
            CellKind::Head => 1,
            CellKind::Body => 2,
        }
    }

    /// `0xRRGGBB`.
    pub fn color(self) -> u32 {
        match self {
            CellKind::Fruit => 0xff0000,
            CellKind::Wall => 0x18191c,
            CellKind::Head => 0x0ac9c3,
            CellKind::Body => 0x4c63e6,
            CellKind::Empty => 0xffffff,
        }
    }
}

/// One colour per flattened cell, index-aligned with `state`.
pub fn colors(state: &[CellCode]) -> Vec<u32> {
    state
        .iter()
        .map(|&code| CellKind::from_code(code).color())
        .collect()
}
