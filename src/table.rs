//! Tabular core: typed cells, coercion, and the rankings merge.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Columns used for row filtering/labeling. Never numerically coerced and
/// never offered as chart series.
pub const IDENTIFIER_COLUMNS: [&str; 3] = ["Rank", "Team", "Conference"];

pub const RANK_COLUMN: &str = "Rank";
pub const TEAM_COLUMN: &str = "Team";
pub const CONFERENCE_COLUMN: &str = "Conference";
pub const UNKNOWN_CONFERENCE: &str = "Unknown Conference";

/// One table value. `Null` means "absent or non-numeric" and is distinct
/// from zero; chart and grid layers render it as a gap, never as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Null,
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text used for category labels and key comparison.
    pub fn label(&self) -> String {
        match self {
            Cell::Text(value) => value.clone(),
            Cell::Number(value) => format!("{value}"),
            Cell::Null => String::new(),
        }
    }
}

/// Parsed-but-untyped table, straight out of the HTML extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Rectangular named-column table with the coercion policy applied.
/// Immutable for the process lifetime once handed to the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn is_identifier_column(name: &str) -> bool {
    IDENTIFIER_COLUMNS.contains(&name)
}

/// Numeric coercion for one cell. Total: anything that does not parse as a
/// finite float becomes `Null`, never an error.
pub fn parse_number(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Cell::Number(value),
        _ => Cell::Null,
    }
}

impl TypedTable {
    pub fn empty(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|name| (*name).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Coerce a raw table. The columns list is authoritative: rows whose
    /// cell count disagrees with the header count are aligned positionally
    /// (truncated or Null-padded), reproducing the source pages' silent
    /// misalignment instead of rejecting the row.
    pub fn from_raw(raw: RawTable) -> Self {
        let width = raw.columns.len();
        let rows = raw
            .rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, String::new());
                cells
                    .into_iter()
                    .zip(raw.columns.iter())
                    .map(|(value, column)| {
                        if is_identifier_column(column) {
                            Cell::Text(value)
                        } else {
                            parse_number(&value)
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            columns: raw.columns,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Distinct non-empty text values of a column, sorted. Used to populate
    /// the filter dropdowns.
    pub fn distinct_text_values(&self, name: &str) -> Vec<String> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        let mut values: Vec<String> = self
            .rows
            .iter()
            .filter_map(|row| row.get(idx).and_then(Cell::as_text))
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /// Keep only the named columns, in the given order; names the table
    /// does not have are skipped. On duplicate names the first occurrence
    /// wins.
    pub fn project(&self, names: &[&str]) -> TypedTable {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        TypedTable {
            columns: indices
                .iter()
                .map(|idx| self.columns[*idx].clone())
                .collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|idx| row[*idx].clone()).collect())
                .collect(),
        }
    }

    pub fn ensure_column(&mut self, name: &str, fill: Cell) {
        if self.column_index(name).is_some() {
            return;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(fill.clone());
        }
    }
}

/// Left join of `primary` with `secondary` on `key`, attaching the
/// secondary's non-key columns. Every primary row is retained exactly once;
/// unmatched keys get `Null` joined cells. Duplicate secondary keys take the
/// first match, so a duplicated rankings row can never fan out the stats
/// table. Empty inputs make the join a no-op. A "Conference" column is
/// guaranteed present afterwards whenever the primary has rows.
pub fn merge(primary: TypedTable, secondary: &TypedTable, key: &str) -> TypedTable {
    if primary.rows.is_empty() {
        return primary;
    }

    let mut merged = primary;
    let joinable = (
        merged.column_index(key),
        secondary.column_index(key),
        secondary.rows.is_empty(),
    );

    if let (Some(primary_key), Some(secondary_key), false) = joinable {
        let mut by_key: HashMap<String, &Vec<Cell>> = HashMap::new();
        for row in &secondary.rows {
            let label = row[secondary_key].label().trim().to_string();
            by_key.entry(label).or_insert(row);
        }

        let joined_columns: Vec<usize> = (0..secondary.columns.len())
            .filter(|idx| *idx != secondary_key)
            .collect();

        for row in &mut merged.rows {
            let label = row[primary_key].label().trim().to_string();
            match by_key.get(&label) {
                Some(matched) => {
                    for idx in &joined_columns {
                        row.push(matched[*idx].clone());
                    }
                }
                None => {
                    for _ in &joined_columns {
                        row.push(Cell::Null);
                    }
                }
            }
        }
        for idx in &joined_columns {
            merged.columns.push(secondary.columns[*idx].clone());
        }
    }

    merged.ensure_column(
        CONFERENCE_COLUMN,
        Cell::Text(UNKNOWN_CONFERENCE.to_string()),
    );
    merged
}
