//! Directional input and its wire encoding.
//!
//! The wire code is `sign * dimension`, where `dimension` is the 1-based
//! dimension the snake moves along. Seen from the UI, the player picks a
//! dimension group and an X/Y/Z key; the dimension is then
//! `3 * (group + 1) - {2 for X, 1 for Y, 0 for Z}`.

use crate::error::SyncError;
use crate::grid::shape::{group_of, Axis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    dimension: usize,
    positive: bool,
}

impl Default for Direction {
    fn default() -> Self {
        Self {
            dimension: 1,
            positive: true,
        }
    }
}

impl Direction {
    /// Decode a wire code, checking it against the level's dimension count.
    pub fn from_code(code: i32, dimensions: usize) -> Result<Self, SyncError> {
        let dimension = code.unsigned_abs() as usize;
        if code == 0 || dimension > dimensions {
            return Err(SyncError::InvalidDirection { code, dimensions });
        }
        Ok(Self {
            dimension,
            positive: code > 0,
        })
    }

    /// Direction along `axis` of the zero-based dimension `group`.
    pub fn in_group(
        group: usize,
        axis: Axis,
        positive: bool,
        dimensions: usize,
    ) -> Result<Self, SyncError> {
        let groups = dimensions.div_ceil(3);
        if group >= groups {
            return Err(SyncError::InvalidGroup { group, groups });
        }
        let dimension = 3 * group + axis.rank();
        let code = if positive { dimension as i32 } else { -(dimension as i32) };
        Self::from_code(code, dimensions)
    }

    pub fn code(self) -> i32 {
        let magnitude = self.dimension as i32;
        if self.positive { magnitude } else { -magnitude }
    }

    pub fn dimension(self) -> usize {
        self.dimension
    }

    pub fn axis(self) -> Axis {
        Axis::of_dimension(self.dimension)
    }

    pub fn group(self) -> usize {
        group_of(self.dimension)
    }

    /// Unit vector over all N dimensions, innermost first.
    pub fn to_vector(self, dimensions: usize) -> Vec<i32> {
        let mut v = vec![0; dimensions];
        if let Some(slot) = v.get_mut(self.dimension - 1) {
            *slot = if self.positive { 1 } else { -1 };
        }
        v
    }
}

/// Keyboard layout of the 3D controller: `d`/`a` on X, `w`/`s` on Y, `j`/`k` on Z.
pub fn key_binding(key: &str) -> Option<(Axis, bool)> {
    match key.to_ascii_lowercase().as_str() {
        "d" => Some((Axis::X, true)),
        "a" => Some((Axis::X, false)),
        "w" => Some((Axis::Y, true)),
        "s" => Some((Axis::Y, false)),
        "j" => Some((Axis::Z, true)),
        "k" => Some((Axis::Z, false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip() {
        for code in [-4, -1, 1, 2, 4] {
            assert_eq!(Direction::from_code(code, 4).unwrap().code(), code);
        }
    }

    #[test]
    fn rejects_zero_and_out_of_range() {
        assert_eq!(
            Direction::from_code(0, 3),
            Err(SyncError::InvalidDirection {
                code: 0,
                dimensions: 3
            })
        );
        assert!(Direction::from_code(4, 3).is_err());
        assert!(Direction::from_code(-4, 3).is_err());
    }

    #[test]
    fn group_encoding() {
        // Group 0 (1-based group 1): X = 1, Y = 2, Z = 3.
        assert_eq!(Direction::in_group(0, Axis::X, true, 6).unwrap().code(), 1);
        assert_eq!(Direction::in_group(0, Axis::Z, false, 6).unwrap().code(), -3);
        // Group 1: X = 4, Y = 5, Z = 6.
        assert_eq!(Direction::in_group(1, Axis::Y, true, 6).unwrap().code(), 5);
        assert_eq!(Direction::in_group(1, Axis::Z, false, 6).unwrap().code(), -6);
    }

    #[test]
    fn partial_last_group() {
        // Four dimensions: group 1 only has X.
        assert_eq!(Direction::in_group(1, Axis::X, true, 4).unwrap().code(), 4);
        assert!(matches!(
            Direction::in_group(1, Axis::Y, true, 4),
            Err(SyncError::InvalidDirection { code: 5, .. })
        ));
        assert_eq!(
            Direction::in_group(2, Axis::X, true, 4),
            Err(SyncError::InvalidGroup {
                group: 2,
                groups: 2
            })
        );
    }

    #[test]
    fn axis_and_group_of_direction() {
        let d = Direction::from_code(-5, 6).unwrap();
        assert_eq!(d.axis(), Axis::Y);
        assert_eq!(d.group(), 1);
        assert_eq!(d.dimension(), 5);
    }

    #[test]
    fn unit_vector() {
        assert_eq!(Direction::from_code(-2, 3).unwrap().to_vector(3), vec![0, -1, 0]);
        assert_eq!(Direction::default().to_vector(2), vec![1, 0]);
    }

    #[test]
    fn key_bindings() {
        assert_eq!(key_binding("W"), Some((Axis::Y, true)));
        assert_eq!(key_binding("a"), Some((Axis::X, false)));
        assert_eq!(key_binding("k"), Some((Axis::Z, false)));
        assert_eq!(key_binding("q"), None);
    }
}
