//! Multi-goal search that tours every room before the exit.

use delve_core::{CellCoord, GridView, Room};

use crate::breadth_first;

/// Visits every room centre, nearest first, then heads for the goal.
///
/// Each leg is a breadth-first path from the current position to the closest
/// remaining centre by Manhattan distance. A leg that cannot be planned is
/// skipped and the tour continues from the same position. The closing leg to
/// the goal is mandatory: if it fails the whole tour is discarded.
#[must_use]
pub fn exploration(
    view: GridView<'_>,
    start: CellCoord,
    goal: CellCoord,
    rooms: &[Room],
) -> Vec<CellCoord> {
    if start == goal {
        return vec![start];
    }

    let mut remaining: Vec<CellCoord> = Vec::with_capacity(rooms.len() + 1);
    for center in rooms.iter().map(Room::center).chain(std::iter::once(goal)) {
        if !remaining.contains(&center) {
            remaining.push(center);
        }
    }

    let mut path = vec![start];
    let mut position = start;

    while !remaining.is_empty() {
        remaining.sort_by_key(|center| center.manhattan_distance(position));
        let target = remaining.remove(0);

        let segment = breadth_first(view, position, target);
        if segment.is_empty() {
            log::warn!("exploration skipped unreachable waypoint {target:?}");
            continue;
        }
        append_segment(&mut path, &segment);
        position = target;
    }

    if position != goal {
        let closing = breadth_first(view, position, goal);
        if closing.is_empty() {
            log::warn!("exploration could not reach goal {goal:?} from {position:?}");
            return Vec::new();
        }
        append_segment(&mut path, &closing);
    }

    path
}

fn append_segment(path: &mut Vec<CellCoord>, segment: &[CellCoord]) {
    let skip = usize::from(path.last() == segment.first());
    path.extend_from_slice(&segment[skip..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junction_cells_are_not_duplicated() {
        let mut path = vec![CellCoord::new(0, 0), CellCoord::new(1, 0)];
        append_segment(&mut path, &[CellCoord::new(1, 0), CellCoord::new(2, 0)]);
        assert_eq!(
            path,
            vec![CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(2, 0)]
        );
    }
}
