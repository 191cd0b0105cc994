use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

use ndarray::{Array2, AssignElem};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::cell::{Position, Site};
use crate::location::{Dimension, Location};
use crate::session::Session;
use crate::shape::Axis;

/// Cost of traversing into a cell.
pub type Weight = u32;
/// Cost of traversing into a cell with no override.
pub const DEFAULT_COST: Weight = 1;

/// The static topology of a microfluidic chip.
///
/// Adjacency is directed: a reservoir or perimeter valve near the edge only reaches along one axis,
/// while its interior neighbors may still reach it. Each edge carries the cost of entering its target.
///
/// [`Chip`]s should be built using a [`ChipBuilder`](crate::builder::ChipBuilder) or loaded with
/// [`ChipConfig`](crate::config::ChipConfig).
#[derive(Clone, Debug)]
pub struct Chip {
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) sites: Array2<Site>,
    pub(crate) graph: DiGraphMap<Location, Weight>,
    pub(crate) positions: HashMap<String, Position>,
    pub(crate) labels: BTreeMap<Location, String>,
}

impl Chip {
    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.dims.0.get()
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.dims.1.get()
    }

    /// Whether `location` lies on the grid.
    pub fn in_bounds(&self, location: Location) -> bool {
        location.0 < self.width() && location.1 < self.height()
    }

    /// The classification of `location`; out of bounds cells read as walls.
    pub fn site(&self, location: Location) -> Site {
        self.sites.get(location.as_index()).copied().unwrap_or(Site::Wall)
    }

    /// Resolve a reservoir, perimeter valve or interior valve name to its [`Position`].
    pub fn lookup_position(&self, name: &str) -> Option<Position> {
        self.positions.get(name).copied()
    }

    /// The name of the feature at `location`, if it is named.
    pub fn name_of(&self, location: Location) -> Option<&str> {
        self.labels.get(&location).map(String::as_str)
    }

    /// All interior valves in ascending [`Location`] order.
    pub fn interior_valves(&self) -> impl Iterator<Item=Location> + '_ {
        self.labels.keys()
            .copied()
            .filter(|location| self.site(*location) == Site::InteriorValve)
    }

    /// Number of interior valves on the chip, blocked or not.
    pub fn interior_valve_count(&self) -> usize {
        self.interior_valves().count()
    }

    /// Statically adjacent cells of `location` in enumeration order, before any session filtering.
    pub(crate) fn adjacent(&self, location: Location) -> impl Iterator<Item=Location> + '_ {
        self.graph.neighbors_directed(location, Direction::Outgoing)
    }

    /// Cost of stepping from `from` into `to`.
    pub fn cost(&self, from: Location, to: Location) -> Weight {
        self.graph.edge_weight(from, to).copied().unwrap_or(DEFAULT_COST)
    }

    /// Rename a reservoir, keeping its location.
    ///
    /// Returns `false` and changes nothing if `old` is not a reservoir or `new` is already taken.
    pub fn rename_reservoir(&mut self, old: &str, new: impl Into<String>) -> bool {
        let new = new.into();
        if self.positions.contains_key(&new) {
            return false;
        }

        match self.positions.get(old).copied() {
            Some(position @ Position::Reservoir(location)) => {
                self.positions.remove(old);
                self.positions.insert(new.clone(), position);
                self.labels.insert(location, new);
                true
            }
            _ => false,
        }
    }

    /// Draw the chip with the state of `session` overlaid.
    ///
    /// `#` wall, `X` blocked, `@` open, `R` reservoir, `P` perimeter valve, `o` interior valve, `.` channel.
    pub fn render(&self, session: &Session) -> String {
        let mut glyphs = self.sites.map(Site::glyph);
        for (index, glyph) in glyphs.indexed_iter_mut() {
            let location = Location::from(index);
            if session.is_blocked(location) {
                glyph.assign_elem('X');
            } else if session.is_open(location) {
                glyph.assign_elem('@');
            }
        }

        print(glyphs)
    }
}

/// The axis a cell's adjacency is restricted to, if any.
///
/// Reservoirs and perimeter valves in the two outermost rows only connect vertically,
/// and in the two outermost columns only horizontally; the row rule wins in corners.
pub(crate) fn edge_axis(dims: (Dimension, Dimension), location: Location, site: Site) -> Option<Axis> {
    if !site.is_edge_feature() {
        return None;
    }

    let Location(x, y) = location;
    if y <= 1 || y + 2 >= dims.1.get() {
        Some(Axis::Vertical)
    } else if x <= 1 || x + 2 >= dims.0.get() {
        Some(Axis::Horizontal)
    } else {
        None
    }
}

fn print(board: Array2<char>) -> String {
    let mut out = String::with_capacity(board.nrows() * (board.ncols() + 1));

    for row in board.rows() {
        for col in row {
            out.push(*col);
        }
        out.push('\n');
    }

    out
}

impl Display for Chip {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print(self.sites.map(Site::glyph)))
    }
}
