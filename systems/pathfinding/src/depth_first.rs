//! Depth-first search.

use delve_core::{CellCoord, GridView};

use crate::{reconstruct, trivial_result, CellTable};

/// Returns the first path found by a LIFO frontier.
///
/// Neighbours are pushed in reverse north, east, south, west order so that
/// north is explored first. The result reaches the goal but is usually longer
/// than the shortest path.
#[must_use]
pub fn depth_first(view: GridView<'_>, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    if let Some(path) = trivial_result(view, start, goal) {
        return path;
    }

    let mut visited = CellTable::new(view, false);
    let mut predecessors = CellTable::new(view, None);
    let mut stack: Vec<(CellCoord, Option<CellCoord>)> = vec![(start, None)];

    while let Some((cell, parent)) = stack.pop() {
        let Some(seen) = visited.get_mut(cell) else {
            continue;
        };
        if *seen {
            continue;
        }
        *seen = true;

        if let Some(slot) = predecessors.get_mut(cell) {
            *slot = parent;
        }
        if cell == goal {
            return reconstruct(&predecessors, start, goal);
        }

        let mut neighbors = [None; 4];
        for (slot, neighbor) in neighbors.iter_mut().zip(view.neighbors(cell)) {
            *slot = Some(neighbor);
        }
        for neighbor in neighbors.into_iter().rev().flatten() {
            if visited.get(neighbor).copied() == Some(false) {
                stack.push((neighbor, Some(cell)));
            }
        }
    }

    Vec::new()
}
