use strum::{AsRefStr, Display};

use crate::location::Location;

/// Static classification of a single grid cell.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, AsRefStr, Display)]
pub enum Site {
    /// Never traversable.
    Wall,
    /// A named, non-actuatable source or sink.
    Reservoir,
    /// A named valve bridging a reservoir to the interior along one axis only.
    PerimeterValve,
    /// A named valve available for routing.
    InteriorValve,
    /// Unnamed, passable, not actuatable.
    #[default]
    Channel,
}

impl Site {
    /// Reservoirs and perimeter valves have direction-restricted adjacency near the chip edge.
    pub(crate) fn is_edge_feature(&self) -> bool {
        matches!(self, Self::Reservoir | Self::PerimeterValve)
    }

    pub(crate) fn glyph(&self) -> char {
        match self {
            Self::Wall => '#',
            Self::Reservoir => 'R',
            Self::PerimeterValve => 'P',
            Self::InteriorValve => 'o',
            Self::Channel => '.',
        }
    }
}

/// Where a name resolves to on the chip, tagged with the kind of feature found there.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Position {
    /// A reservoir.
    Reservoir(Location),
    /// A perimeter valve.
    PerimeterValve(Location),
    /// An interior valve.
    InteriorValve(Location),
}

impl Position {
    /// The cell this name occupies.
    pub fn location(&self) -> Location {
        match self {
            Self::Reservoir(location) | Self::PerimeterValve(location) | Self::InteriorValve(location) => *location,
        }
    }

    /// The [`Site`] at [`Self::location`].
    pub fn site(&self) -> Site {
        match self {
            Self::Reservoir(_) => Site::Reservoir,
            Self::PerimeterValve(_) => Site::PerimeterValve,
            Self::InteriorValve(_) => Site::InteriorValve,
        }
    }
}
