use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Ix;
use serde::{Deserialize, Serialize};

/// A single grid coordinate component.
pub type Coord = usize;
/// A grid extent; chips are never zero cells wide or tall.
pub type Dimension = NonZero<Coord>;

/// A cell on the chip grid, in `(x, y)` order with `(0, 0)` at the top left.
///
/// The derived ordering compares `x` first, then `y`; it is the tie-break order used throughout routing.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
// x, y
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    /// Offset this location by `rhs`, returning [`None`] if either component would become negative.
    pub fn offset_by(self, rhs: (isize, isize)) -> Option<Self> {
        Some(Self(self.0.checked_add_signed(rhs.0)?, self.1.checked_add_signed(rhs.1)?))
    }

    /// Manhattan (taxicab) distance between two locations.
    pub fn manhattan(self, other: Location) -> Coord {
        self.0.abs_diff(other.0) + self.1.abs_diff(other.1)
    }

    /// Whether `other` is exactly one orthogonal step away, ignoring any chip topology.
    pub fn touches(self, other: Location) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}

impl From<[Coord; 2]> for Location {
    fn from(value: [Coord; 2]) -> Self {
        Self(value[0], value[1])
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
