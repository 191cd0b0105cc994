//! Chip topology stored as TOML.
//!
//! ```toml
//! width = 7
//! height = 7
//! walls = [[0, 0], [1, 0]]
//!
//! [reservoirs]
//! A = [0, 3]
//!
//! [perimeter_valves]
//! PA = [1, 3]
//!
//! [valves]
//! "4" = [2, 3]
//!
//! [[weights]]
//! at = [3, 3]
//! cost = 5
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::num::NonZero;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::builder::{BuilderInvalidReason, ChipBuilder};
use crate::chip::{Chip, Weight};
use crate::location::{Coord, Location};

/// Reasons a topology may fail to load.
#[derive(Error, Debug)]
pub enum TopologyError {
    /// The file could not be read.
    #[error("read {path}: {source}")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// The document is not valid topology TOML.
    #[error("parse topology: {0}")]
    Parse(#[from] toml::de::Error),

    /// Width or height is zero.
    #[error("chip dimensions must be non-zero, got {0}x{1}")]
    EmptyChip(Coord, Coord),

    /// The features do not fit together.
    #[error("invalid topology: {0:?}")]
    Invalid(Vec<BuilderInvalidReason>),
}

/// Cost override for one cell.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WeightOverride {
    /// Cell whose entry cost changes.
    pub at: [Coord; 2],
    /// New entry cost.
    pub cost: Weight,
}

/// Static chip topology as written by hand.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Grid width in cells.
    pub width: Coord,
    /// Grid height in cells.
    pub height: Coord,
    /// Cells that are never traversable.
    pub walls: Vec<[Coord; 2]>,
    /// Named non-actuatable sources and sinks.
    pub reservoirs: BTreeMap<String, [Coord; 2]>,
    /// Named valves bridging reservoirs to the interior.
    pub perimeter_valves: BTreeMap<String, [Coord; 2]>,
    /// Named interior valves.
    pub valves: BTreeMap<String, [Coord; 2]>,
    /// Per-cell entry cost overrides.
    pub weights: Vec<WeightOverride>,
}

impl ChipConfig {
    /// Parse a topology document.
    pub fn from_toml_str(contents: &str) -> Result<Self, TopologyError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a topology file.
    pub fn load(path: &Path) -> Result<Self, TopologyError> {
        debug!(path = %path.display(), "loading chip topology");
        let contents = fs::read_to_string(path).map_err(|source| TopologyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// The builder this topology describes.
    pub fn to_builder(&self) -> Result<ChipBuilder, TopologyError> {
        let (Some(width), Some(height)) = (NonZero::new(self.width), NonZero::new(self.height)) else {
            return Err(TopologyError::EmptyChip(self.width, self.height));
        };

        let mut builder = ChipBuilder::with_dims((width, height));
        builder.add_walls(self.walls.iter().copied().map(Location::from));
        for (name, at) in &self.reservoirs {
            builder.add_reservoir(name.clone(), Location::from(*at));
        }
        for (name, at) in &self.perimeter_valves {
            builder.add_perimeter_valve(name.clone(), Location::from(*at));
        }
        for (name, at) in &self.valves {
            builder.add_valve(name.clone(), Location::from(*at));
        }
        for weight in &self.weights {
            builder.set_weight(Location::from(weight.at), weight.cost);
        }

        Ok(builder)
    }

    /// Build the [`Chip`] this topology describes.
    pub fn build(&self) -> Result<Chip, TopologyError> {
        self.to_builder()?
            .build()
            .map_err(|reasons| TopologyError::Invalid(reasons.clone()))
    }
}
