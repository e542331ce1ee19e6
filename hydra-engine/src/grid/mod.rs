//! Grid geometry — shapes, flattening, cell codes, and the hyper-layout.
//!
//! Everything here is pure: no global state, no I/O. The sync engine and
//! the renderer share the flattening convention defined in `shape`.

pub mod cell;
pub mod layout;
pub mod shape;
pub mod tensor;

pub use layout::{layout, Bounds, PositionTable};
pub use shape::{Axis, DimensionSizes, Strides};
pub use tensor::{CellCode, StateTensor};
