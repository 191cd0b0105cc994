//! Per-request mutable state and the passability view built on it.

use std::collections::HashSet;

use itertools::Itertools;
use tracing::debug;

use crate::cell::{Position, Site};
use crate::chip::{Chip, Weight};
use crate::location::Location;
use crate::search::Topology;

/// The mutable state of one routing request: valves excluded by the user and valves claimed so far.
///
/// A session belongs to a single request at a time. [`Router::plan`](crate::router::Router::plan)
/// starts by resetting it, but never resets it on failure; callers decide when to [`reset`](Self::reset).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    pub(crate) blocked_perimeter: HashSet<Location>,
    pub(crate) blocked_valves: HashSet<Location>,
    pub(crate) open: HashSet<Location>,
}

impl Session {
    /// Clear the blocked sets and every claimed valve.
    pub fn reset(&mut self) {
        self.blocked_perimeter.clear();
        self.blocked_valves.clear();
        self.open.clear();
    }

    /// Exclude the named valves for this session, replacing any earlier exclusions.
    ///
    /// Names are partitioned into perimeter and interior valves; reservoirs and unknown names are ignored.
    pub fn block_valves<S: AsRef<str>>(&mut self, chip: &Chip, names: impl IntoIterator<Item=S>) {
        let mut blocked_perimeter = HashSet::new();
        let mut blocked_valves = HashSet::new();

        for name in names {
            match chip.lookup_position(name.as_ref()) {
                Some(Position::InteriorValve(location)) => { blocked_valves.insert(location); }
                Some(Position::PerimeterValve(location)) => { blocked_perimeter.insert(location); }
                _ => {}
            }
        }

        debug!(perimeter = blocked_perimeter.len(), interior = blocked_valves.len(), "valves blocked");
        self.blocked_perimeter = blocked_perimeter;
        self.blocked_valves = blocked_valves;
    }

    /// Whether `location` was excluded for this session.
    pub fn is_blocked(&self, location: Location) -> bool {
        self.blocked_perimeter.contains(&location) || self.blocked_valves.contains(&location)
    }

    /// Whether `location` has been claimed by this session.
    pub fn is_open(&self, location: Location) -> bool {
        self.open.contains(&location)
    }

    /// Claimed valves in ascending [`Location`] order.
    pub fn open_valves(&self) -> Vec<Location> {
        self.open.iter().copied().sorted().collect_vec()
    }

    pub(crate) fn claim(&mut self, locations: impl IntoIterator<Item=Location>) {
        self.open.extend(locations);
    }
}

/// A [`Chip`] seen through the exclusions of a [`Session`].
#[derive(Clone, Copy)]
pub struct GridView<'a> {
    pub(crate) chip: &'a Chip,
    pub(crate) session: &'a Session,
}

impl<'a> GridView<'a> {
    /// View `chip` under `session`.
    pub fn new(chip: &'a Chip, session: &'a Session) -> Self {
        Self { chip, session }
    }

    /// True iff `location` is on the chip, not a wall and not blocked.
    pub fn passable(&self, location: Location) -> bool {
        self.chip.in_bounds(location)
            && self.chip.site(location) != Site::Wall
            && !self.session.is_blocked(location)
    }

    /// Up to four adjacent passable cells, in the chip's fixed enumeration order.
    pub fn neighbors(&self, location: Location) -> Vec<Location> {
        self.chip.adjacent(location)
            .filter(|other| self.passable(*other))
            .collect_vec()
    }

    /// Cost of stepping from `from` into `to`.
    pub fn cost(&self, from: Location, to: Location) -> Weight {
        self.chip.cost(from, to)
    }

    /// Whether `location` is an interior valve that is neither blocked nor already claimed.
    pub(crate) fn is_free_valve(&self, location: Location) -> bool {
        self.chip.site(location) == Site::InteriorValve
            && !self.session.is_open(location)
            && !self.session.is_blocked(location)
    }
}

impl Topology for GridView<'_> {
    type Node = Location;

    fn neighbors(&self, node: Location) -> Vec<Location> {
        GridView::neighbors(self, node)
    }

    fn cost(&self, from: Location, to: Location) -> Weight {
        GridView::cost(self, from, to)
    }
}
