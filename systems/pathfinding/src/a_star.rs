//! Cost plus Manhattan-heuristic search.

use std::{cmp::Reverse, collections::BinaryHeap};

use delve_core::{CellCoord, GridView};

use crate::{reconstruct, trivial_result, CellTable};

/// Finds a shortest path guided by the Manhattan-distance heuristic.
///
/// Every step costs one, so the heuristic is admissible and the result has
/// the same length as a breadth-first path. Entries with equal priority are
/// expanded in the order they were queued.
#[must_use]
pub fn a_star(view: GridView<'_>, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    if let Some(path) = trivial_result(view, start, goal) {
        return path;
    }

    let mut best_cost = CellTable::new(view, u32::MAX);
    let mut predecessors = CellTable::new(view, None);
    let mut frontier = BinaryHeap::new();
    let mut sequence: u64 = 0;

    if let Some(slot) = best_cost.get_mut(start) {
        *slot = 0;
    }
    frontier.push(Reverse((start.manhattan_distance(goal), sequence, start)));

    while let Some(Reverse((_, _, cell))) = frontier.pop() {
        if cell == goal {
            return reconstruct(&predecessors, start, goal);
        }

        let Some(cost) = best_cost.get(cell).copied() else {
            continue;
        };
        let next_cost = cost.saturating_add(1);

        for neighbor in view.neighbors(cell) {
            let Some(known) = best_cost.get_mut(neighbor) else {
                continue;
            };
            if next_cost >= *known {
                continue;
            }
            *known = next_cost;

            if let Some(slot) = predecessors.get_mut(neighbor) {
                *slot = Some(cell);
            }
            sequence += 1;
            let priority = next_cost.saturating_add(neighbor.manhattan_distance(goal));
            frontier.push(Reverse((priority, sequence, neighbor)));
        }
    }

    Vec::new()
}
