//! In-memory tabular data shared by the extractor, cleaner and loader

pub mod cell;
pub mod columns;

pub use cell::*;

/// Column-named rows of cells. Row indices are always dense.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`; `Null` when the column is absent
    pub fn get(&self, row: usize, column: &str) -> &Cell {
        const NULL: &Cell = &Cell::Null;
        match self.column_index(column) {
            Some(idx) => self.rows.get(row).and_then(|r| r.get(idx)).unwrap_or(NULL),
            None => NULL,
        }
    }

    /// Distinct values of a column in order of first appearance, missing included
    pub fn unique(&self, column: &str) -> Vec<Cell> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .map(|r| &r[idx])
            .filter(|c| seen.insert(*c))
            .cloned()
            .collect()
    }

    /// Index of the first row whose `column` equals `value`
    pub fn first_row_where(&self, column: &str, value: &Cell) -> Option<usize> {
        let idx = self.column_index(column)?;
        self.rows.iter().position(|r| &r[idx] == value)
    }

    pub fn drop_column(&mut self, idx: usize) {
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
    }

    /// Remove rows with a missing value in the given column
    pub fn drop_missing(&mut self, idx: usize) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !r[idx].is_null());
        before - self.rows.len()
    }
}
