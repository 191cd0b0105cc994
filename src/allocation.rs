//! Per-input valve allocation.

use itertools::Itertools;
use tracing::{debug, warn};

use crate::error::{RoutingError, RoutingResult};
use crate::location::Location;
use crate::session::GridView;

/// Claim a chain of `required` interior valves for `input`, walking out from `entry` towards `goal`.
///
/// Each step takes the free neighboring valve closest to `goal`. At a dead end the walk jumps to the free valve
/// anywhere on the chip closest to `entry`; stitching connects such disjoint pieces later.
/// Valves already open in the session, blocked, or earlier in this chain are never taken.
///
/// Ties go to the earlier candidate: neighbor enumeration order for a step, ascending [`Location`] for a jump.
pub fn claim_chain(
    view: &GridView<'_>,
    input: &str,
    entry: Location,
    goal: Location,
    required: usize,
) -> RoutingResult<Vec<Location>> {
    let mut chain: Vec<Location> = Vec::with_capacity(required);
    let mut current = entry;

    while chain.len() < required {
        let next = match closest_neighbor(view, current, goal, &chain) {
            Some(next) => next,
            None => {
                let jump = closest_anywhere(view, entry, &chain).ok_or_else(|| RoutingError::InsufficientValves {
                    input: input.to_owned(),
                    requested: required,
                    claimed: chain.len(),
                })?;
                warn!(input, from = %current, to = %jump, "dead end, jumping to nearest free valve");
                jump
            }
        };

        chain.push(next);
        current = next;
    }

    debug!(input, entry = %entry, length = chain.len(), "chain claimed");
    Ok(chain)
}

fn closest_neighbor(view: &GridView<'_>, current: Location, goal: Location, chain: &[Location]) -> Option<Location> {
    let candidates = view.neighbors(current).into_iter()
        .filter(|candidate| view.is_free_valve(*candidate) && !chain.contains(candidate))
        .collect_vec();

    candidates.iter()
        .position_min_by_key(|candidate| candidate.manhattan(goal))
        .map(|index| candidates[index])
}

fn closest_anywhere(view: &GridView<'_>, entry: Location, chain: &[Location]) -> Option<Location> {
    let candidates = view.chip.interior_valves()
        .filter(|candidate| view.is_free_valve(*candidate) && !chain.contains(candidate))
        .collect_vec();

    candidates.iter()
        .position_min_by_key(|candidate| candidate.manhattan(entry))
        .map(|index| candidates[index])
}
