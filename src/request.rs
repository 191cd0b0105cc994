//! Parsing and representation of routing requests.

use serde::{Deserialize, Serialize};

use crate::error::RequestParseError;

/// Wait between steps when a request gives none, in milliseconds.
pub const DEFAULT_WAIT_MS: u32 = 300;

/// One input and the number of interior valves its flow should occupy.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct InputDemand {
    /// Reservoir or perimeter valve name.
    pub name: String,
    /// Interior valves to claim for this input.
    pub valves: usize,
}

/// A declarative request to move fluid from one or more inputs to a single output.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoutingRequest {
    /// Reservoir or perimeter valve name receiving the flow. Empty together with no inputs means pause only.
    pub output: String,
    /// Inputs in the order given; the router processes them by ascending valve count, stably.
    pub inputs: Vec<InputDemand>,
    /// Valve names unavailable for this request.
    pub avoid: Vec<String>,
    /// Wait after every open and close.
    pub wait_ms: u32,
    /// Free text carried through to the plan.
    pub description: String,
}

impl RoutingRequest {
    /// A request towards `output` with no inputs yet, nothing avoided and the default wait.
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            inputs: Vec::new(),
            avoid: Vec::new(),
            wait_ms: DEFAULT_WAIT_MS,
            description: String::new(),
        }
    }

    /// Add an input claiming `valves` interior valves.
    pub fn input(mut self, name: impl Into<String>, valves: usize) -> Self {
        self.inputs.push(InputDemand { name: name.into(), valves });
        self
    }

    /// Exclude valves by name.
    pub fn avoid<S: Into<String>>(mut self, names: impl IntoIterator<Item=S>) -> Self {
        self.avoid.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the wait after every step.
    pub fn wait(mut self, wait_ms: u32) -> Self {
        self.wait_ms = wait_ms;
        self
    }

    /// Attach a description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Total interior valves asked for across all inputs.
    pub fn requested_valves(&self) -> usize {
        self.inputs.iter().map(|demand| demand.valves).sum()
    }
}

/// Normalize a user-typed endpoint name: surrounding whitespace dropped, upper-cased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

fn entries(text: &str) -> impl Iterator<Item=String> + '_ {
    text.split([',', ';'])
        .map(|entry| entry.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|entry| !entry.is_empty())
}

/// Parse `NAME:COUNT` entries separated by `,` or `;`, e.g. `"a : 3; B:2"`.
///
/// Names are upper-cased. A repeated name keeps its first position and takes the last count.
pub fn parse_inputs(text: &str) -> Result<Vec<InputDemand>, RequestParseError> {
    let mut demands: Vec<InputDemand> = Vec::new();

    for entry in entries(text) {
        let (name, count) = entry.split_once(':')
            .ok_or_else(|| RequestParseError::MalformedInput(entry.clone()))?;
        let valves = count.parse::<usize>()
            .map_err(|_| RequestParseError::MalformedInput(entry.clone()))?;
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(RequestParseError::MalformedInput(entry));
        }

        match demands.iter_mut().find(|demand| demand.name == name) {
            Some(existing) => existing.valves = valves,
            None => demands.push(InputDemand { name, valves }),
        }
    }

    Ok(demands)
}

/// Parse valve numbers to avoid, separated by `,` or `;`. Numbers are normalized, so `"007"` becomes `"7"`.
pub fn parse_avoid(text: &str) -> Result<Vec<String>, RequestParseError> {
    entries(text)
        .map(|entry| entry.parse::<u64>()
            .map(|number| number.to_string())
            .map_err(|_| RequestParseError::MalformedAvoid(entry)))
        .collect()
}

/// Parse a wait in milliseconds, falling back to [`DEFAULT_WAIT_MS`] when absent or invalid.
pub fn parse_wait(text: &str) -> u32 {
    text.trim().parse().unwrap_or(DEFAULT_WAIT_MS)
}
