//! Unweighted shortest-path search.

use std::collections::VecDeque;

use delve_core::{CellCoord, GridView};

use crate::{reconstruct, trivial_result, CellTable};

/// Finds a path with the fewest steps using a FIFO frontier.
///
/// Cells are marked visited when they are queued, so the first time the goal
/// is reached its predecessor chain is a shortest one.
#[must_use]
pub fn breadth_first(view: GridView<'_>, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    if let Some(path) = trivial_result(view, start, goal) {
        return path;
    }

    let mut visited = CellTable::new(view, false);
    let mut predecessors = CellTable::new(view, None);
    let mut frontier = VecDeque::new();

    if let Some(slot) = visited.get_mut(start) {
        *slot = true;
    }
    frontier.push_back(start);

    while let Some(cell) = frontier.pop_front() {
        for neighbor in view.neighbors(cell) {
            let Some(seen) = visited.get_mut(neighbor) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;

            if let Some(slot) = predecessors.get_mut(neighbor) {
                *slot = Some(cell);
            }
            if neighbor == goal {
                return reconstruct(&predecessors, start, goal);
            }
            frontier.push_back(neighbor);
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::Grid;

    #[test]
    fn routes_around_pillar() {
        let grid = Grid::from_ascii(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let path = breadth_first(
            GridView::new(&grid),
            CellCoord::new(2, 1),
            CellCoord::new(2, 3),
        );

        assert_eq!(
            path,
            vec![
                CellCoord::new(2, 1),
                CellCoord::new(3, 1),
                CellCoord::new(3, 2),
                CellCoord::new(3, 3),
                CellCoord::new(2, 3),
            ]
        );
    }
}
