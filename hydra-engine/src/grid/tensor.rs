//! Nested state tensors as they arrive from the game server, and their
//! flattening into the linear cell array the renderer reads.

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::grid::shape::DimensionSizes;

/// Integer cell state code (see [`CellKind`](crate::grid::cell::CellKind)).
pub type CellCode = i32;

/// Nested sequence of cell codes. The outermost list is dimension N.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateTensor {
    Cell(CellCode),
    Nested(Vec<StateTensor>),
}

impl StateTensor {
    /// Nesting depth along the first branch. A bare cell has depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self;
        while let StateTensor::Nested(children) = node {
            depth += 1;
            match children.first() {
                Some(first) => node = first,
                None => break,
            }
        }
        depth
    }

    /// Flatten into depth-first order (outermost dimension slowest),
    /// checking every level against `sizes`.
    pub fn flatten(&self, sizes: &DimensionSizes) -> Result<Vec<CellCode>, GridError> {
        let found = self.depth();
        if found != sizes.len() {
            return Err(GridError::DepthMismatch {
                expected: sizes.len(),
                found,
            });
        }
        let mut out = Vec::with_capacity(sizes.cell_count());
        flatten_into(self, sizes.len(), sizes, &mut out)?;
        Ok(out)
    }
}

fn flatten_into(
    node: &StateTensor,
    dimension: usize,
    sizes: &DimensionSizes,
    out: &mut Vec<CellCode>,
) -> Result<(), GridError> {
    match node {
        StateTensor::Cell(code) if dimension == 0 => {
            out.push(*code);
            Ok(())
        }
        StateTensor::Nested(children) if dimension > 0 => {
            let expected = sizes.size(dimension);
            if children.len() != expected {
                return Err(GridError::LengthMismatch {
                    dimension,
                    expected,
                    found: children.len(),
                });
            }
            for child in children {
                flatten_into(child, dimension - 1, sizes, out)?;
            }
            Ok(())
        }
        // A ragged tensor: a leaf above the bottom level or a list below it.
        _ => Err(GridError::DepthMismatch {
            expected: sizes.len(),
            found: sizes.len() - dimension + usize::from(matches!(node, StateTensor::Nested(_))),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> StateTensor {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_nested_json() {
        let t = parse("[[0, -1], [2, 1]]");
        assert_eq!(t.depth(), 2);
        assert_eq!(
            t,
            StateTensor::Nested(vec![
                StateTensor::Nested(vec![StateTensor::Cell(0), StateTensor::Cell(-1)]),
                StateTensor::Nested(vec![StateTensor::Cell(2), StateTensor::Cell(1)]),
            ])
        );
    }

    #[test]
    fn flattens_outermost_slowest() {
        let sizes = DimensionSizes::new(vec![3, 2]).unwrap();
        let t = parse("[[1, 2, 3], [4, 5, 6]]");
        assert_eq!(t.flatten(&sizes).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn flat_index_matches_strides() {
        let sizes = DimensionSizes::new(vec![2, 3, 2]).unwrap();
        let strides = sizes.strides();
        // Value at address (i1, i2, i3) encodes its own address.
        let t = StateTensor::Nested(
            (0..2)
                .map(|i3| {
                    StateTensor::Nested(
                        (0..3)
                            .map(|i2| {
                                StateTensor::Nested(
                                    (0..2)
                                        .map(|i1| StateTensor::Cell(100 * i3 + 10 * i2 + i1))
                                        .collect(),
                                )
                            })
                            .collect(),
                    )
                })
                .collect(),
        );
        let flat = t.flatten(&sizes).unwrap();
        for (i, &code) in flat.iter().enumerate() {
            let a = strides.address(i);
            assert_eq!(code, (100 * a[2] + 10 * a[1] + a[0]) as i32);
        }
    }

    #[test]
    fn rejects_wrong_depth() {
        let sizes = DimensionSizes::new(vec![2, 2, 2]).unwrap();
        let t = parse("[[0, 0], [0, 0]]");
        assert_eq!(
            t.flatten(&sizes),
            Err(GridError::DepthMismatch {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn rejects_wrong_length() {
        let sizes = DimensionSizes::new(vec![2, 2]).unwrap();
        let t = parse("[[0, 0], [0, 0, 0]]");
        assert_eq!(
            t.flatten(&sizes),
            Err(GridError::LengthMismatch {
                dimension: 1,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn rejects_ragged_leaves() {
        let sizes = DimensionSizes::new(vec![2, 2]).unwrap();
        let t = parse("[[0, 0], 5]");
        assert!(matches!(
            t.flatten(&sizes),
            Err(GridError::DepthMismatch { .. })
        ));
    }
}
