use std::collections::{BTreeMap, HashMap};
use std::ops::IndexMut;

use ndarray::{Array2, AssignElem};
use petgraph::graphmap::DiGraphMap;

use crate::cell::{Position, Site};
use crate::chip::{edge_axis, Chip, Weight, DEFAULT_COST};
use crate::location::{Dimension, Location};
use crate::shape::SquareStep;

/// Reasons a builder may become invalid while building.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// A feature was placed outside the bounds specified by `dims`.
    FeatureOutOfBounds(Location),
    /// A feature was placed on a cell already holding a wall, reservoir or valve.
    OverlappingFeature(Location),
    /// A name was given to more than one reservoir or valve.
    DuplicateName(String),
}

/// Accumulates chip topology: walls, named reservoirs, perimeter valves, interior valves and cost overrides.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Once a builder is invalid, further additions do nothing.
#[derive(Clone, Debug)]
pub struct ChipBuilder {
    // width, height
    dims: (Dimension, Dimension),
    sites: Array2<Site>,
    names: HashMap<String, Position>,
    weights: HashMap<Location, Weight>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl ChipBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(x, y)` order.
    /// Every cell starts out as an unnamed [`Channel`](Site::Channel).
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            sites: Array2::from_shape_simple_fn((dims.1.get(), dims.0.get()), Site::default),
            names: Default::default(),
            weights: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    fn in_bounds(&self, location: Location) -> bool {
        location.0 < self.dims.0.get() && location.1 < self.dims.1.get()
    }

    fn place(&mut self, location: Location, site: Site) -> bool {
        if !self.invalid_reasons.is_empty() {
            return false;
        }

        if !self.in_bounds(location) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds(location));
            return false;
        }

        if self.sites[location.as_index()] != Site::Channel {
            self.invalid_reasons.push(BuilderInvalidReason::OverlappingFeature(location));
            return false;
        }

        self.sites.index_mut(location.as_index()).assign_elem(site);
        true
    }

    fn place_named(&mut self, name: String, position: Position) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if self.names.contains_key(&name) {
            self.invalid_reasons.push(BuilderInvalidReason::DuplicateName(name));
            return self;
        }

        if self.place(position.location(), position.site()) {
            self.names.insert(name, position);
        }

        self
    }

    /// Mark `location` as a wall.
    pub fn add_wall(&mut self, location: Location) -> &mut Self {
        self.place(location, Site::Wall);
        self
    }

    /// Shorthand for multiple calls to [`Self::add_wall`].
    pub fn add_walls(&mut self, locations: impl IntoIterator<Item=Location>) -> &mut Self {
        for location in locations {
            self.add_wall(location);
        }

        self
    }

    /// Add a named reservoir.
    pub fn add_reservoir(&mut self, name: impl Into<String>, location: Location) -> &mut Self {
        self.place_named(name.into(), Position::Reservoir(location))
    }

    /// Add a named perimeter valve, the bridge between a reservoir and the interior.
    pub fn add_perimeter_valve(&mut self, name: impl Into<String>, location: Location) -> &mut Self {
        self.place_named(name.into(), Position::PerimeterValve(location))
    }

    /// Add a named interior valve.
    pub fn add_valve(&mut self, name: impl Into<String>, location: Location) -> &mut Self {
        self.place_named(name.into(), Position::InteriorValve(location))
    }

    /// Override the cost of entering `location`. Costs default to [`DEFAULT_COST`].
    pub fn set_weight(&mut self, location: Location, cost: Weight) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !self.in_bounds(location) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds(location));
            return self;
        }

        self.weights.insert(location, cost);
        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Chip`].
    /// If the builder is invalid for any reason, a reference to a [`Vec`] of [`BuilderInvalidReason`] will indicate why.
    pub fn build(&self) -> Result<Chip, &Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(&self.invalid_reasons);
        }

        let mut graph = DiGraphMap::with_capacity(
            self.sites.len(),
            // every cell reaches at most four others
            self.sites.len() * 4,
        );

        for y in 0..self.dims.1.get() {
            for x in 0..self.dims.0.get() {
                let location = Location(x, y);
                let site = self.sites[location.as_index()];
                if site == Site::Wall {
                    continue;
                }

                graph.add_node(location);
                // edges go in enumeration order so that neighbor lookups on the graph keep it
                for other in SquareStep::enumerate_from(location, edge_axis(self.dims, location, site)) {
                    if !self.in_bounds(other) || self.sites[other.as_index()] == Site::Wall {
                        continue;
                    }

                    let cost = self.weights.get(&other).copied().unwrap_or(DEFAULT_COST);
                    graph.add_edge(location, other, cost);
                }
            }
        }

        let labels = self.names.iter()
            .map(|(name, position)| (position.location(), name.clone()))
            .collect::<BTreeMap<_, _>>();

        Ok(Chip {
            dims: self.dims,
            sites: self.sites.clone(),
            graph,
            positions: self.names.clone(),
            labels,
        })
    }
}
