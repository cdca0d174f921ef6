#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid search strategies used by the bot to plan routes to the exit.
//!
//! Every strategy walks the same [`GridView`] neighbour source and returns an
//! ordered list of cells that begins at the start cell and ends at the goal.
//! An empty list means the goal could not be reached. When the start and the
//! goal coincide the result is the single start cell.

mod a_star;
mod breadth_first;
mod depth_first;
mod exploration;

use delve_core::{CellCoord, GridView, Room, SearchStrategy};

pub use a_star::a_star;
pub use breadth_first::breadth_first;
pub use depth_first::depth_first;
pub use exploration::exploration;

/// Computes a path from `start` to `goal` with the selected strategy.
///
/// `rooms` is only consulted by [`SearchStrategy::Exploration`], which
/// visits every room centre before heading for the goal.
#[must_use]
pub fn find_path(
    strategy: SearchStrategy,
    view: GridView<'_>,
    start: CellCoord,
    goal: CellCoord,
    rooms: &[Room],
) -> Vec<CellCoord> {
    let path = match strategy {
        SearchStrategy::BreadthFirst => breadth_first(view, start, goal),
        SearchStrategy::DepthFirst => depth_first(view, start, goal),
        SearchStrategy::AStar => a_star(view, start, goal),
        SearchStrategy::Exploration => exploration(view, start, goal, rooms),
    };
    log::debug!(
        "{} search from {start:?} to {goal:?} produced {} cells",
        strategy.label(),
        path.len()
    );
    path
}

/// Dense per-cell bookkeeping shared by the single-goal searches.
#[derive(Debug)]
pub(crate) struct CellTable<T> {
    columns: usize,
    slots: Vec<T>,
}

impl<T: Clone> CellTable<T> {
    pub(crate) fn new(view: GridView<'_>, fill: T) -> Self {
        let (columns, rows) = view.dimensions();
        let columns = usize::try_from(columns).unwrap_or(0);
        let rows = usize::try_from(rows).unwrap_or(0);
        Self {
            columns,
            slots: vec![fill; columns.saturating_mul(rows)],
        }
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&T> {
        self.index(cell).and_then(|index| self.slots.get(index))
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Option<&mut T> {
        self.index(cell).and_then(|index| self.slots.get_mut(index))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        if column >= self.columns {
            return None;
        }
        row.checked_mul(self.columns)?.checked_add(column)
    }
}

/// Walks predecessor links back from `goal` and returns the path in travel
/// order.
pub(crate) fn reconstruct(
    predecessors: &CellTable<Option<CellCoord>>,
    start: CellCoord,
    goal: CellCoord,
) -> Vec<CellCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match predecessors.get(current).copied().flatten() {
            Some(previous) => {
                path.push(previous);
                current = previous;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

/// Checks that searching between the two cells makes sense at all.
///
/// Returns `None` when the caller should stop with the returned path.
pub(crate) fn trivial_result(
    view: GridView<'_>,
    start: CellCoord,
    goal: CellCoord,
) -> Option<Vec<CellCoord>> {
    if start == goal {
        return Some(vec![start]);
    }
    let (columns, rows) = view.dimensions();
    let inside = |cell: CellCoord| cell.column() < columns && cell.row() < rows;
    if !inside(start) || !view.is_walkable(goal) {
        return Some(Vec::new());
    }
    None
}
