//! Typed cell grid used for both the annotated source and the pivot target.

use std::collections::BTreeMap;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// #region Cell

/// One typed grid cell.
///
/// Equality is tag-guarded: two cells are equal only when they carry the same
/// variant and equal payloads (`==` on `f64`, exact string comparison). Grouping
/// in the pivot uses [`EnumCell::is_same_group`], which also matches NaN.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCell {
    /// Empty cell.
    #[default]
    Blank,
    /// Boolean value.
    Boolean(bool),
    /// Numeric value.
    Numeric(f64),
    /// Text value.
    Text(String),
    /// Spreadsheet error code.
    Error(u8),
    /// Deferred formula expression, without the leading `=`.
    Formula(String),
}

static CELL_BLANK: EnumCell = EnumCell::Blank;

impl EnumCell {
    /// Build a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// `true` for `Blank`.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }

    /// `true` for `Blank` or an empty string.
    pub fn is_blank_or_empty(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    /// Text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Grouping equality: `==`, except that two NaN numbers are one group.
    ///
    /// Every key comparison in the pivot (header values, header lookup, row
    /// keys) goes through this so a key always finds the slot it created.
    pub fn is_same_group(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Numeric(lhs), Self::Numeric(rhs)) if lhs.is_nan() && rhs.is_nan() => true,
            _ => self == other,
        }
    }

    /// Short variant name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Boolean(_) => "boolean",
            Self::Numeric(_) => "numeric",
            Self::Text(_) => "text",
            Self::Error(_) => "error",
            Self::Formula(_) => "formula",
        }
    }
}

impl fmt::Display for EnumCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => Ok(()),
            Self::Boolean(val) => write!(f, "{}", if *val { "TRUE" } else { "FALSE" }),
            Self::Numeric(val) => write!(f, "{val}"),
            Self::Text(val) => write!(f, "{val}"),
            Self::Error(code) => write!(f, "#ERR{code}"),
            Self::Formula(val) => write!(f, "={val}"),
        }
    }
}

impl From<f64> for EnumCell {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<bool> for EnumCell {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for EnumCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnumCell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Row

/// Sparse row: column index to cell. Missing index reads as blank.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRow {
    dict_cells: BTreeMap<usize, EnumCell>,
}

impl SpecRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dense row from consecutive cells starting at column 0.
    pub fn from_cells<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<EnumCell>,
    {
        let dict_cells = cells
            .into_iter()
            .enumerate()
            .map(|(n_idx_col, cell)| (n_idx_col, cell.into()))
            .collect();
        Self { dict_cells }
    }

    /// Stored cell at `n_idx_col`, `None` when absent.
    pub fn get(&self, n_idx_col: usize) -> Option<&EnumCell> {
        self.dict_cells.get(&n_idx_col)
    }

    /// Cell at `n_idx_col`, reading absent entries as blank.
    pub fn cell(&self, n_idx_col: usize) -> &EnumCell {
        self.dict_cells.get(&n_idx_col).unwrap_or(&CELL_BLANK)
    }

    /// Mutable access to a stored cell.
    pub fn get_mut(&mut self, n_idx_col: usize) -> Option<&mut EnumCell> {
        self.dict_cells.get_mut(&n_idx_col)
    }

    /// Store `cell` at `n_idx_col`, replacing any previous cell.
    pub fn set(&mut self, n_idx_col: usize, cell: impl Into<EnumCell>) {
        self.dict_cells.insert(n_idx_col, cell.into());
    }

    /// One past the highest stored column index.
    pub fn width(&self) -> usize {
        self.dict_cells
            .last_key_value()
            .map_or(0, |(n_idx_col, _)| n_idx_col + 1)
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.dict_cells.len()
    }

    /// `true` when no cell is stored.
    pub fn is_empty(&self) -> bool {
        self.dict_cells.is_empty()
    }

    /// Stored `(column, cell)` pairs in ascending column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &EnumCell)> {
        self.dict_cells.iter().map(|(n_idx_col, cell)| (*n_idx_col, cell))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Table

/// Ordered sequence of sparse rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTable {
    l_rows: Vec<SpecRow>,
}

impl SpecTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows.
    pub fn from_rows(rows: Vec<SpecRow>) -> Self {
        Self { l_rows: rows }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.l_rows.len()
    }

    /// `true` when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.l_rows.is_empty()
    }

    /// Widest row width.
    pub fn width(&self) -> usize {
        self.l_rows.iter().map(SpecRow::width).max().unwrap_or(0)
    }

    /// Row at `n_idx_row`.
    pub fn row(&self, n_idx_row: usize) -> Option<&SpecRow> {
        self.l_rows.get(n_idx_row)
    }

    /// Mutable row at `n_idx_row`, growing the table with empty rows as needed.
    pub fn row_mut(&mut self, n_idx_row: usize) -> &mut SpecRow {
        if n_idx_row >= self.l_rows.len() {
            self.l_rows.resize_with(n_idx_row + 1, SpecRow::default);
        }
        &mut self.l_rows[n_idx_row]
    }

    /// Append a row and return its index.
    pub fn push_row(&mut self, row: SpecRow) -> usize {
        self.l_rows.push(row);
        self.l_rows.len() - 1
    }

    /// Cell at `(n_idx_row, n_idx_col)`, reading absent rows/cells as blank.
    pub fn cell(&self, n_idx_row: usize, n_idx_col: usize) -> &EnumCell {
        self.l_rows
            .get(n_idx_row)
            .map_or(&CELL_BLANK, |row| row.cell(n_idx_col))
    }

    /// Store `cell` at `(n_idx_row, n_idx_col)`.
    pub fn set_cell(&mut self, n_idx_row: usize, n_idx_col: usize, cell: impl Into<EnumCell>) {
        self.row_mut(n_idx_row).set(n_idx_col, cell);
    }

    /// Rows in order.
    pub fn rows(&self) -> &[SpecRow] {
        &self.l_rows
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_equality_is_tag_guarded() {
        assert_eq!(EnumCell::Numeric(1.0), EnumCell::Numeric(1.0));
        assert_ne!(EnumCell::Numeric(1.0), EnumCell::text("1"));
        assert_ne!(EnumCell::Boolean(true), EnumCell::Numeric(1.0));
        assert_eq!(EnumCell::Blank, EnumCell::Blank);
        assert_ne!(EnumCell::Blank, EnumCell::text(""));
    }

    #[test]
    fn test_same_group_matches_nan_but_keeps_tags_apart() {
        let nan = EnumCell::Numeric(f64::NAN);
        assert_ne!(nan, nan.clone());
        assert!(nan.is_same_group(&EnumCell::Numeric(f64::NAN)));
        assert!(!nan.is_same_group(&EnumCell::Numeric(0.0)));
        assert!(!nan.is_same_group(&EnumCell::text("NaN")));
        assert!(EnumCell::text("Q1").is_same_group(&EnumCell::text("Q1")));
        assert!(!EnumCell::Numeric(1.0).is_same_group(&EnumCell::text("1")));
    }

    #[test]
    fn test_blank_or_empty_covers_empty_text_only() {
        assert!(EnumCell::Blank.is_blank_or_empty());
        assert!(EnumCell::text("").is_blank_or_empty());
        assert!(!EnumCell::text(" ").is_blank_or_empty());
        assert!(!EnumCell::Numeric(0.0).is_blank_or_empty());
    }

    #[test]
    fn test_sparse_row_reads_missing_as_blank() {
        let mut row = SpecRow::new();
        row.set(3, 2.5);
        assert_eq!(row.width(), 4);
        assert_eq!(row.len(), 1);
        assert!(row.get(1).is_none());
        assert!(row.cell(1).is_blank());
        assert_eq!(row.cell(3).as_f64(), Some(2.5));
    }

    #[test]
    fn test_table_grows_on_write() {
        let mut table = SpecTable::new();
        table.set_cell(2, 1, "x");
        assert_eq!(table.height(), 3);
        assert_eq!(table.width(), 2);
        assert!(table.row(0).is_some_and(SpecRow::is_empty));
        assert_eq!(table.cell(2, 1).as_str(), Some("x"));
        assert!(table.cell(9, 9).is_blank());
    }
}
