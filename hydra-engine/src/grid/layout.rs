//! Hyper-layout: places every cell of an N-dimensional grid in 3D space.
//!
//! Dimensions cycle through the X, Y and Z axes in groups of three. A
//! dimension in an outer group steps far enough along its axis to clear the
//! whole sub-grid built by the inner dimensions sharing that axis, plus a
//! one-cell gap, so nested sub-grids never overlap.
//!
//! ```text
//! dims 1-3  (group 0)  step = 1.5 on X, Y, Z
//! dims 4-6  (group 1)  step = 1.5 * (size[1|2|3] + 1)
//! dims 7-9  (group 2)  step = 1.5 * (size[1|2|3] + 1) * (size[4|5|6] + 1)
//! ```

use crate::grid::shape::{Axis, DimensionSizes, group_of};

/// Base pitch between neighbouring cells of the innermost group.
pub const BASE_PITCH: f32 = 1.5;

pub type Position = [f32; 3];

/// How one dimension advances the running offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisStep {
    pub axis: Axis,
    pub step: f32,
    pub extent: usize,
}

/// Per-dimension steps, innermost first.
pub fn plan(sizes: &DimensionSizes) -> Vec<AxisStep> {
    (1..=sizes.len())
        .map(|d| {
            let axis = Axis::of_dimension(d);
            let group = group_of(d);
            let factor: usize = (1..d)
                .filter(|&inner| group_of(inner) < group && Axis::of_dimension(inner) == axis)
                .map(|inner| sizes.size(inner) + 1)
                .product();
            AxisStep {
                axis,
                step: BASE_PITCH * factor.max(1) as f32,
                extent: sizes.size(d),
            }
        })
        .collect()
}

/// Positions for every flattened cell, index-aligned with the flattened state.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionTable(Vec<Position>);

/// Axis-aligned box enclosing all positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn center(&self) -> Position {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }
}

impl PositionTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Position] {
        &self.0
    }

    /// `[x0, y0, z0, x1, ...]` for instance matrices.
    pub fn to_flat(&self) -> Vec<f32> {
        self.0.iter().flat_map(|p| p.iter().copied()).collect()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.0.first()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in &self.0[1..] {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(p[axis]);
                bounds.max[axis] = bounds.max[axis].max(p[axis]);
            }
        }
        Some(bounds)
    }
}

/// Compute the position of every cell of a grid shaped by `sizes`.
pub fn layout(sizes: &DimensionSizes) -> PositionTable {
    let plan = plan(sizes);
    let mut out = Vec::with_capacity(sizes.cell_count());
    place(sizes.len(), [0.0; 3], &plan, &mut out);
    PositionTable(out)
}

// `origin` is owned by this frame; each child gets its own copy of `cursor`.
fn place(dimension: usize, origin: Position, plan: &[AxisStep], out: &mut Vec<Position>) {
    if dimension == 0 {
        out.push(origin);
        return;
    }
    let AxisStep { axis, step, extent } = plan[dimension - 1];
    let mut cursor = origin;
    for _ in 0..extent {
        cursor[axis.index()] += step;
        place(dimension - 1, cursor, plan, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sizes(v: &[usize]) -> DimensionSizes {
        DimensionSizes::new(v.to_vec()).unwrap()
    }

    #[test]
    fn two_by_two_grid() {
        let table = layout(&sizes(&[2, 2]));
        assert_eq!(
            table.as_slice(),
            &[
                [1.5, 1.5, 0.0],
                [3.0, 1.5, 0.0],
                [1.5, 3.0, 0.0],
                [3.0, 3.0, 0.0],
            ]
        );
        // Same dimension-2 index, neighbours along X.
        assert_eq!(table.as_slice()[1][0] - table.as_slice()[0][0], 1.5);
        // Same dimension-1 index, neighbours along Y.
        assert_eq!(table.as_slice()[2][1] - table.as_slice()[0][1], 1.5);
    }

    #[test]
    fn no_cell_sits_at_the_origin() {
        let table = layout(&sizes(&[1]));
        assert_eq!(table.as_slice(), &[[1.5, 0.0, 0.0]]);
    }

    #[test]
    fn group_zero_uses_base_pitch() {
        let steps = plan(&sizes(&[5, 4, 3]));
        assert!(steps.iter().all(|s| s.step == BASE_PITCH));
        assert_eq!(
            steps.iter().map(|s| s.axis).collect::<Vec<_>>(),
            vec![Axis::X, Axis::Y, Axis::Z]
        );
    }

    #[test]
    fn outer_groups_clear_inner_subgrids() {
        let steps = plan(&sizes(&[2, 3, 4, 5, 6, 7, 2]));
        assert_eq!(steps[3].step, 1.5 * 3.0); // X: (2+1)
        assert_eq!(steps[4].step, 1.5 * 4.0); // Y: (3+1)
        assert_eq!(steps[5].step, 1.5 * 5.0); // Z: (4+1)
        assert_eq!(steps[6].step, 1.5 * 3.0 * 6.0); // X: (2+1)(5+1)
    }

    #[test]
    fn fourth_dimension_contains_inner_cube() {
        let s = sizes(&[2, 2, 2, 2]);
        let table = layout(&s);
        let step4 = plan(&s)[3].step;
        let block = s.strides().stride(4);
        let blocks: Vec<&[Position]> = table.as_slice().chunks(block).collect();
        assert_eq!(blocks.len(), 2);
        for axis in 0..3 {
            let lo = blocks[0].iter().map(|p| p[axis]).fold(f32::MAX, f32::min);
            let hi = blocks[0].iter().map(|p| p[axis]).fold(f32::MIN, f32::max);
            assert!(hi - lo < step4);
        }
        // The second block is the first shifted by one dimension-4 step on X.
        for (a, b) in blocks[0].iter().zip(blocks[1]) {
            assert_eq!(b[0] - a[0], step4);
            assert_eq!(b[1], a[1]);
            assert_eq!(b[2], a[2]);
        }
        let first_max_x = blocks[0].iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        let second_min_x = blocks[1].iter().map(|p| p[0]).fold(f32::MAX, f32::min);
        assert!(second_min_x - first_max_x > BASE_PITCH);
    }

    #[test]
    fn bounds_and_center() {
        let table = layout(&sizes(&[3, 2]));
        let b = table.bounds().unwrap();
        assert_eq!(b.min, [1.5, 1.5, 0.0]);
        assert_eq!(b.max, [4.5, 3.0, 0.0]);
        assert_eq!(b.center(), [3.0, 2.25, 0.0]);
    }

    #[test]
    fn flat_buffer_interleaves_xyz() {
        let table = layout(&sizes(&[2]));
        assert_eq!(table.to_flat(), vec![1.5, 0.0, 0.0, 3.0, 0.0, 0.0]);
    }

    fn small_sizes() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..=3, 1..=7)
    }

    fn many_dimensions() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(prop_oneof![9 => Just(1usize), 1 => Just(2usize)], 20..=70)
    }

    fn all_distinct(table: &PositionTable) -> bool {
        let mut seen: Vec<[u32; 3]> = table
            .as_slice()
            .iter()
            .map(|p| [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()])
            .collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        seen.len() == total
    }

    #[test]
    fn widest_accepted_grid_keeps_unit_steps() {
        // 64 dimensions, two cells apart along dimension 2 (Y).
        let mut v = vec![1; 64];
        v[1] = 2;
        let table = layout(&sizes(&v));
        assert_eq!(table.len(), 2);
        let (a, b) = (table.as_slice()[0], table.as_slice()[1]);
        assert_eq!(b[1] - a[1], BASE_PITCH);
        assert_eq!(b[0], a[0]);
        assert_eq!(b[2], a[2]);
    }

    proptest! {
        #[test]
        fn positions_are_distinct(v in small_sizes()) {
            prop_assert!(all_distinct(&layout(&sizes(&v))));
        }

        #[test]
        fn wide_grids_stay_distinct(v in many_dimensions()) {
            // Shapes past the per-axis span limit are rejected up front.
            let Ok(s) = DimensionSizes::new(v) else {
                return Ok(());
            };
            prop_assert!(all_distinct(&layout(&s)));
        }

        #[test]
        fn one_dimension_moves_one_axis(v in small_sizes()) {
            let s = sizes(&v);
            let table = layout(&s);
            let strides = s.strides();
            prop_assert_eq!(table.len(), s.cell_count());
            for flat in 0..s.cell_count() {
                let address = strides.address(flat);
                for d in 1..=s.len() {
                    if address[d - 1] + 1 < s.size(d) {
                        let next = flat + strides.stride(d);
                        let axis = Axis::of_dimension(d).index();
                        let (a, b) = (table.as_slice()[flat], table.as_slice()[next]);
                        for k in 0..3 {
                            if k == axis {
                                prop_assert!(b[k] > a[k]);
                            } else {
                                prop_assert_eq!(b[k], a[k]);
                            }
                        }
                    }
                }
            }
        }

        #[test]
        fn layout_is_deterministic(v in small_sizes()) {
            let s = sizes(&v);
            prop_assert_eq!(layout(&s), layout(&s));
        }
    }
}
