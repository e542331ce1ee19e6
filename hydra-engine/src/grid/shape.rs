//! Dimension sizes, axis assignment, and the flattening stride table.
//!
//! Dimensions are numbered 1..=N from innermost (fastest varying) to
//! outermost. Internally they live in a zero-based `Vec`, so `sizes[0]` is
//! dimension 1.

use crate::error::GridError;

/// Upper bound on `∏ (size + 1)` over the dimensions drawn along one axis.
/// Every coordinate is `1.5 * k` with `k` below this bound, so `3 * k` stays
/// under 2^24 and each position is exact in `f32`.
pub const MAX_AXIS_SPAN: u64 = 1 << 22;

/// Spatial axis a dimension is drawn along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Axis for a 1-based dimension number: X for `d % 3 == 1`, Y for 2, Z for 0.
    pub fn of_dimension(dimension: usize) -> Axis {
        match dimension % 3 {
            1 => Axis::X,
            2 => Axis::Y,
            _ => Axis::Z,
        }
    }

    /// Slot of this axis in an `[x, y, z]` triple.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Offset of this axis inside its dimension group (X = 1, Y = 2, Z = 3).
    pub fn rank(self) -> usize {
        self.index() + 1
    }
}

/// Zero-based group of a 1-based dimension: dimensions 1–3 are group 0,
/// 4–6 group 1, and so on.
pub fn group_of(dimension: usize) -> usize {
    (dimension - 1) / 3
}

/// Validated N-dimensional grid shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSizes(Vec<usize>);

impl DimensionSizes {
    pub fn new(sizes: Vec<usize>) -> Result<Self, GridError> {
        if sizes.is_empty() {
            return Err(GridError::NoDimensions);
        }
        if let Some(pos) = sizes.iter().position(|&s| s == 0) {
            return Err(GridError::ZeroSize { dimension: pos + 1 });
        }
        let cells = sizes.iter().map(|&s| s as u128).product::<u128>();
        if cells > u32::MAX as u128 {
            return Err(GridError::TooLarge { cells });
        }
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            if axis_span(&sizes, axis).is_none() {
                return Err(GridError::TooWide {
                    dimensions: sizes.len(),
                });
            }
        }
        Ok(Self(sizes))
    }

    /// A hypercube level: `dim_count` copies of `level_size`.
    pub fn cube(level_size: usize, dim_count: usize) -> Result<Self, GridError> {
        Self::new(vec![level_size; dim_count])
    }

    /// Number of dimensions N.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Size of the 1-based dimension `d`.
    pub fn size(&self, dimension: usize) -> usize {
        self.0[dimension - 1]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Total number of cells, `∏ size[d]`.
    pub fn cell_count(&self) -> usize {
        self.0.iter().product()
    }

    pub fn strides(&self) -> Strides {
        Strides::for_sizes(self)
    }
}

// `∏ (size + 1)` over the dimensions on `axis`, or `None` past `MAX_AXIS_SPAN`.
fn axis_span(sizes: &[usize], axis: Axis) -> Option<u64> {
    sizes
        .iter()
        .enumerate()
        .filter(|&(slot, _)| Axis::of_dimension(slot + 1) == axis)
        .try_fold(1u64, |span, (_, &size)| {
            span.checked_mul(size as u64 + 1)
                .filter(|&span| span <= MAX_AXIS_SPAN)
        })
}

/// Flattening convention: `stride[1] = 1`, `stride[d] = stride[d-1] * size[d-1]`.
/// The flat index of a grid address is `Σ index[d] * stride[d]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strides(Vec<usize>);

impl Strides {
    pub fn for_sizes(sizes: &DimensionSizes) -> Self {
        let mut strides = Vec::with_capacity(sizes.len());
        let mut acc = 1;
        for &s in sizes.as_slice() {
            strides.push(acc);
            acc *= s;
        }
        Self(strides)
    }

    /// Stride of the 1-based dimension `d`.
    pub fn stride(&self, dimension: usize) -> usize {
        self.0[dimension - 1]
    }

    /// Flat index for an address given innermost-first (`address[0]` is dimension 1).
    pub fn flat_index(&self, address: &[usize]) -> usize {
        address.iter().zip(&self.0).map(|(i, s)| i * s).sum()
    }

    /// Inverse of [`flat_index`](Self::flat_index), innermost-first.
    pub fn address(&self, mut flat: usize) -> Vec<usize> {
        let mut address = vec![0; self.0.len()];
        for (slot, &stride) in self.0.iter().enumerate().rev() {
            address[slot] = flat / stride;
            flat %= stride;
        }
        address
    }
}
