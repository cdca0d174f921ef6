//! Per-cell memory of what the agent has seen.

use delve_core::{CellCoord, DiscoveryView};

/// Dense row-major discovery flags matching the level grid.
///
/// Flags only ever flip from unseen to seen. A new level replaces the whole
/// map with one where every cell is unseen.
#[derive(Clone, Debug, Default)]
pub(crate) struct DiscoveryMap {
    columns: u32,
    rows: u32,
    flags: Vec<bool>,
}

impl DiscoveryMap {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            flags: vec![false; capacity],
        }
    }

    /// Marks the cell as seen, returning whether it was unseen before.
    pub(crate) fn reveal(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        match self.flags.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn view(&self) -> DiscoveryView<'_> {
        DiscoveryView::new(&self.flags, self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_reports_only_first_sighting() {
        let mut map = DiscoveryMap::new(3, 2);
        assert!(map.reveal(CellCoord::new(2, 1)));
        assert!(!map.reveal(CellCoord::new(2, 1)));
        assert!(!map.reveal(CellCoord::new(3, 0)));
        assert_eq!(map.view().count(), 1);
        assert!(map.view().is_discovered(CellCoord::new(2, 1)));
    }
}
