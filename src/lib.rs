#![warn(missing_docs)]

//! # `valveroute`
//!
//! Plans and sequences solenoid valve actuation on grid-addressed microfluidic chips, so that fluid moves from
//! one or more labeled reservoirs to a labeled destination without ever opening conflicting paths or closing a
//! path out from under fluid still in it.
//! Begin by describing a chip with a [`ChipBuilder`](builder::ChipBuilder) or a [`ChipConfig`](config::ChipConfig).
//! Then hand a [`RoutingRequest`] and a [`Session`] to a [`Router`], which yields a [`Plan`]: a totally ordered
//! list of [`ActuationOp`]s ready for a script generator or a hardware driver.
//!
//! # Internals
//! The chip is a grid graph. Cells are walls, reservoirs (sources and sinks that cannot be actuated),
//! perimeter valves (bridges between a reservoir and the interior, connected along one axis only),
//! interior valves, or plain channels.
//!
//! A high level overview of one request is as follows:
//!
//! 1. Every input claims a contiguous chain of interior valves, walking from its perimeter valve towards the
//!    output and jumping to the nearest free valve when the walk dead-ends.
//! 2. The chain nearest the output is joined to it along a shortest path, then the remaining chains are joined,
//!    always picking the globally nearest pair of (already connected cell, unconnected cell) next.
//! 3. Everything that was stitched closes in reverse, reordered where needed so that every valve still open
//!    remains adjacent to another open one until the last closes.
//!
//! All of this is single-threaded and deterministic: the same chip, session and request yield the same plan.

pub use actuation::{ActuationOp, Plan};
pub use builder::ChipBuilder;
pub use chip::Chip;
pub use error::{RoutingError, RoutingResult};
pub use location::Location;
pub use request::{InputDemand, RoutingRequest};
pub use router::Router;
pub use session::{GridView, Session};

pub mod actuation;
pub mod allocation;
pub mod builder;
pub mod cell;
pub mod chip;
pub mod closing;
pub mod config;
pub mod error;
pub mod location;
pub mod request;
pub mod router;
pub mod search;
pub mod session;
pub mod shape;
mod tests;
