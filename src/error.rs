//! Error types surfaced to callers.
//!
//! Every [`RoutingError`] is scoped to one request and terminal for it: the router never retries,
//! never returns a partial sequence, and never resets the [`Session`](crate::session::Session) on failure.

use thiserror::Error;

use crate::location::Location;

/// Convenience alias for results of routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Reasons a routing request may fail.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RoutingError {
    /// The output also appears among the inputs.
    #[error("input and output are both {0}")]
    SameInputOutput(String),

    /// The inputs ask for more interior valves than the chip has unblocked.
    #[error("inputs require {requested} valves but only {available} are available")]
    OverAllocated {
        /// Sum of requested valve counts.
        requested: usize,
        /// Interior valves minus blocked interior valves.
        available: usize,
    },

    /// No further valve could be claimed for an input.
    #[error("input {input} asked for {requested} valves but only {claimed} could be claimed")]
    InsufficientValves {
        /// Name of the input being allocated.
        input: String,
        /// Valves it asked for.
        requested: usize,
        /// Valves claimed before allocation got stuck.
        claimed: usize,
    },

    /// The topology leaves `to` unreachable from `from`.
    #[error("no path from {from} to {to}")]
    PathNotFound {
        /// Search origin.
        from: Location,
        /// Search goal.
        to: Location,
    },

    /// The output name resolves to nothing on the chip.
    #[error("unknown output {0}")]
    UnknownOutput(String),

    /// An input name resolves to nothing on the chip.
    #[error("unknown input {0}")]
    UnknownInput(String),

    /// No ordering of the closing valves reachable by adjacent swaps keeps the remainder connected.
    #[error("no safe closing order found after {swaps} swaps")]
    UnclosableSequence {
        /// Swaps attempted before giving up.
        swaps: usize,
    },

    /// An output was given without any inputs.
    #[error("no inputs given")]
    NoInputs,

    /// An input asked for zero valves.
    #[error("input {0} asks for no valves")]
    EmptyDemand(String),

    /// The endpoint has no perimeter valve to bracket its flow with.
    #[error("{0} is not bridged to the interior by a perimeter valve")]
    UnbridgedEndpoint(String),
}

/// Reasons free-text request fields may fail to parse.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RequestParseError {
    /// An input entry was not of the form `NAME:COUNT`.
    #[error("expected NAME:COUNT, got {0:?}")]
    MalformedInput(String),

    /// A valve to avoid was not a valve number.
    #[error("expected a valve number, got {0:?}")]
    MalformedAvoid(String),
}
