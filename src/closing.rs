//! Ordering closes so no open segment is cut off from the rest.

use tracing::debug;

use crate::error::{RoutingError, RoutingResult};
use crate::location::Location;
use crate::session::GridView;

/// Repair a candidate closing order so that no close strands a still-open segment.
///
/// For every suffix of the result, its first valve is adjacent to at least one other valve of that suffix.
/// A violating valve is swapped with its predecessor (its successor when it is first) and the scan restarts
/// from the beginning, since a swap can break adjacency that was already checked.
///
/// Fails with [`RoutingError::UnclosableSequence`] after `n * n` swaps (at least 2) without converging.
pub fn validate_closing_order(view: &GridView<'_>, mut closing: Vec<Location>) -> RoutingResult<Vec<Location>> {
    let limit = (closing.len() * closing.len()).max(2);
    let mut swaps = 0;

    while let Some(index) = first_stranded(view, &closing) {
        if swaps == limit {
            return Err(RoutingError::UnclosableSequence { swaps });
        }

        let partner = if index == 0 { 1 } else { index - 1 };
        closing.swap(partner, index);
        swaps += 1;
    }

    if swaps > 0 {
        debug!(swaps, length = closing.len(), "closing order repaired");
    }
    Ok(closing)
}

/// Index of the first valve with no neighbor among the valves closed after it.
/// The last valve closes alone and is never stranded.
pub(crate) fn first_stranded(view: &GridView<'_>, closing: &[Location]) -> Option<usize> {
    (0..closing.len().saturating_sub(1)).find(|&index| {
        let neighbors = view.neighbors(closing[index]);
        !closing[index + 1..].iter().any(|other| neighbors.contains(other))
    })
}
