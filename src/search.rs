//! Weighted shortest paths over any [`Topology`].

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graphmap::NodeTrait;

use crate::chip::Weight;
use crate::error::RoutingError;
use crate::location::Location;
use crate::session::GridView;

/// Constraint on graphs searched by [`dijkstra`].
///
/// Nodes must be totally ordered so that equal-cost frontier entries pop in a fixed order.
pub trait Topology {
    /// Node identifier.
    type Node: NodeTrait;
    /// Nodes reachable in one step from `node`, in a deterministic order.
    fn neighbors(&self, node: Self::Node) -> Vec<Self::Node>;
    /// Cost of the step from `from` to `to`.
    fn cost(&self, from: Self::Node, to: Self::Node) -> Weight;
}

/// Predecessor of every reached node; the start maps to [`None`].
pub type CameFrom<N> = HashMap<N, Option<N>>;

/// Weighted single-source shortest path search from `start`, stopping as soon as `goal` is popped.
///
/// A `goal` missing from the result was unreachable.
pub fn dijkstra<T: Topology>(graph: &T, start: T::Node, goal: T::Node) -> CameFrom<T::Node> {
    let mut frontier = BinaryHeap::new();
    let mut came_from = HashMap::new();
    let mut cost_so_far: HashMap<T::Node, Weight> = HashMap::new();

    frontier.push(Reverse((0, start)));
    came_from.insert(start, None);
    cost_so_far.insert(start, 0);

    while let Some(Reverse((cost, current))) = frontier.pop() {
        if current == goal {
            break;
        }

        // stale entry, a cheaper route was already expanded
        if cost_so_far.get(&current).is_some_and(|best| cost > *best) {
            continue;
        }

        for next in graph.neighbors(current) {
            let new_cost = cost + graph.cost(current, next);
            if cost_so_far.get(&next).map_or(true, |known| new_cost < *known) {
                cost_so_far.insert(next, new_cost);
                frontier.push(Reverse((new_cost, next)));
                came_from.insert(next, Some(current));
            }
        }
    }

    came_from
}

/// Walk `came_from` backwards from `goal` and return the path from `start` to `goal`, both included.
///
/// Returns [`None`] if `goal` was never reached.
pub fn reconstruct_path<N: NodeTrait>(came_from: &CameFrom<N>, start: N, goal: N) -> Option<Vec<N>> {
    let mut path = Vec::new();
    let mut current = goal;

    while current != start {
        path.push(current);
        current = (*came_from.get(&current)?)?;
    }

    path.push(start);
    path.reverse();
    Some(path)
}

/// Cheapest path between two cells under the exclusions of `view`.
pub(crate) fn shortest_path(view: &GridView<'_>, start: Location, goal: Location) -> Result<Vec<Location>, RoutingError> {
    let came_from = dijkstra(view, start, goal);
    reconstruct_path(&came_from, start, goal)
        .ok_or(RoutingError::PathNotFound { from: start, to: goal })
}
