//! Operations handed to whatever drives the valves.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A single discrete step for the valve hardware.
///
/// Waits are data for whoever executes the sequence; the router never sleeps.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum ActuationOp {
    /// Open the named valve.
    Open(String),
    /// Close the named valve.
    Close(String),
    /// Pause for this many milliseconds.
    Wait(u32),
}

impl Display for ActuationOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(name) => write!(f, "o{name}"),
            Self::Close(name) => write!(f, "c{name}"),
            Self::Wait(ms) => write!(f, "w{ms}"),
        }
    }
}

/// The finalized, totally ordered result of a routing request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Free text from the request.
    pub description: String,
    /// Operations in execution order.
    pub ops: Vec<ActuationOp>,
}

impl Plan {
    /// Names of opened valves, in order.
    pub fn opened(&self) -> impl Iterator<Item=&str> {
        self.ops.iter().filter_map(|op| match op {
            ActuationOp::Open(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Names of closed valves, in order.
    pub fn closed(&self) -> impl Iterator<Item=&str> {
        self.ops.iter().filter_map(|op| match op {
            ActuationOp::Close(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Sum of every wait in the plan.
    pub fn total_wait_ms(&self) -> u64 {
        self.ops.iter()
            .filter_map(|op| match op {
                ActuationOp::Wait(ms) => Some(u64::from(*ms)),
                _ => None,
            })
            .sum()
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ops.iter().join(","))
    }
}
