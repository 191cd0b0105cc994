use itertools::Itertools;
use strum::{Display, VariantArray};

use crate::location::Location;

/// The four orthogonal steps between cells of a rectangular chip.
///
/// Variants are declared in the base enumeration order used for neighbor lookups:
/// right, up, left, down, i.e. `(x+1, y), (x, y-1), (x-1, y), (x, y+1)`.
#[derive(Copy, Clone, VariantArray, Display, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    /// Towards larger `x`.
    Right,
    /// Towards smaller `y`.
    Up,
    /// Towards smaller `x`.
    Left,
    /// Towards larger `y`.
    Down,
}

/// The axis a step moves along.
#[derive(Copy, Clone, Display, Eq, PartialEq, Hash, Debug)]
pub enum Axis {
    /// Left and right.
    Horizontal,
    /// Up and down.
    Vertical,
}

impl SquareStep {
    /// Attempt the step from `location`, returning [`None`] if it would leave the non-negative quadrant.
    /// Upper bounds are the caller's concern.
    pub fn attempt_from(&self, location: Location) -> Option<Location> {
        match self {
            Self::Right => location.offset_by((1, 0)),
            Self::Up => location.offset_by((0, -1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Down => location.offset_by((0, 1)),
        }
    }

    /// The axis this step moves along.
    pub fn axis(&self) -> Axis {
        match self {
            Self::Right | Self::Left => Axis::Horizontal,
            Self::Up | Self::Down => Axis::Vertical,
        }
    }

    /// Candidate neighbors of `location` in enumeration order, optionally restricted to one `axis`.
    ///
    /// The base order is reversed whenever `x + y` is even; routing tie-breaks depend on this order.
    pub(crate) fn enumerate_from(location: Location, axis: Option<Axis>) -> Vec<Location> {
        let mut steps = Self::VARIANTS.iter()
            .filter(|step| axis.map_or(true, |axis| step.axis() == axis))
            .collect_vec();

        if (location.0 + location.1) % 2 == 0 {
            steps.reverse();
        }

        steps.into_iter()
            .filter_map(|step| step.attempt_from(location))
            .collect_vec()
    }
}
