//! Pivot specification models, options, and top-level error types.

use thiserror::Error;

use crate::conf::{C_LABEL_TOTAL, C_SENTINEL_EMPTY, C_SUFFIX_COUNT, C_SUFFIX_SUM};
use crate::report::ReportPivot;
use crate::table::{EnumCell, SpecTable};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Role a source column plays in the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumPivotRole {
    /// The single row dimension; its distinct values become row labels.
    Row,
    /// A column dimension; its distinct values span the header.
    Column,
    /// A numeric field aggregated into the body.
    Value,
    /// A field copied once per row-key group.
    Decoration,
}

/// Aggregation applied to a value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumAggregation {
    /// Arithmetic sum of the source numbers.
    #[default]
    Sum,
    /// Number of matching source rows.
    Count,
}

/// Representation of totals cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumTotalsMode {
    /// Already-computed numbers.
    #[default]
    Value,
    /// `SUM(..)` expressions over the target coordinates (A1 notation).
    Formula,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RoleCatalog

/// One recognized source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRoleTriplet {
    /// Pivot role.
    pub role: EnumPivotRole,
    /// Zero-based source column index.
    pub column_index: usize,
    /// Sort key within the role group.
    pub order: i32,
    /// Aggregation kind; only `Some` for value triplets.
    pub aggregation: Option<EnumAggregation>,
}

/// Role triplets grouped by role, each group sorted by `(order, column_index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRoleCatalog {
    /// The row dimension.
    pub row: SpecRoleTriplet,
    /// Column dimensions.
    pub columns: Vec<SpecRoleTriplet>,
    /// Value fields.
    pub values: Vec<SpecRoleTriplet>,
    /// Decoration fields.
    pub decorations: Vec<SpecRoleTriplet>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Layout

/// Fixed target-table offsets derived from the role catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecPivotLayout {
    /// First header/value column: row label plus decoration columns.
    pub column_label_offset_x: usize,
    /// Field-name row index; equals the number of column dimensions.
    pub value_row_offset_y: usize,
    /// First decoration column.
    pub deco_offset_x: usize,
}

impl SpecPivotLayout {
    /// First target data row.
    pub fn first_data_row_y(&self) -> usize {
        self.value_row_offset_y + 1
    }
}

/// Insertion-ordered distinct values of every column dimension plus the
/// resulting header arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecColumnAxis {
    /// Distinct values per dimension, in first-encountered source order.
    pub values_by_dimension: Vec<Vec<EnumCell>>,
    /// Number of value fields.
    pub n_values: usize,
}

impl SpecColumnAxis {
    /// Distinct-value count of every dimension.
    pub fn counts(&self) -> Vec<usize> {
        self.values_by_dimension.iter().map(Vec::len).collect()
    }

    /// Number of times the value block of dimension `n_idx_dim` repeats:
    /// product of distinct counts of all earlier dimensions.
    pub fn multiplier(&self, n_idx_dim: usize) -> usize {
        self.values_by_dimension[..n_idx_dim]
            .iter()
            .map(Vec::len)
            .product()
    }

    /// Header columns spanned by one value of dimension `n_idx_dim`: product of
    /// distinct counts of all later dimensions times the number of value fields.
    pub fn block_width(&self, n_idx_dim: usize) -> usize {
        self.values_by_dimension[n_idx_dim + 1..]
            .iter()
            .map(Vec::len)
            .product::<usize>()
            * self.n_values
    }

    /// Number of value columns: product of all distinct counts times the
    /// number of value fields.
    pub fn span_width(&self) -> usize {
        self.values_by_dimension
            .iter()
            .map(Vec::len)
            .product::<usize>()
            * self.n_values
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Pivot invocation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPivotOptions {
    /// Replacement text for blank grouping keys.
    pub sentinel_empty: String,
    /// Totals representation.
    pub rule_totals: EnumTotalsMode,
    /// Emit the trailing row-totals column (only honored with fewer than two value fields).
    pub if_emit_row_totals: bool,
    /// Emit the trailing column-totals row.
    pub if_emit_column_totals: bool,
    /// Label used for the totals column header and the totals row.
    pub label_total: String,
    /// Suffix appended to `Sum` field names.
    pub suffix_sum: String,
    /// Suffix appended to `Count` field names.
    pub suffix_count: String,
    /// Reject catalogs without at least one row, column and value role.
    pub if_require_full_roles: bool,
    /// Maximum worker threads for batch pivoting.
    pub num_workers_max: Option<usize>,
}

impl Default for SpecPivotOptions {
    fn default() -> Self {
        Self {
            sentinel_empty: C_SENTINEL_EMPTY.to_string(),
            rule_totals: EnumTotalsMode::Value,
            if_emit_row_totals: true,
            if_emit_column_totals: true,
            label_total: C_LABEL_TOTAL.to_string(),
            suffix_sum: C_SUFFIX_SUM.to_string(),
            suffix_count: C_SUFFIX_COUNT.to_string(),
            if_require_full_roles: false,
            num_workers_max: None,
        }
    }
}

impl SpecPivotOptions {
    /// Field-name suffix for `aggregation`.
    pub fn suffix_for(&self, aggregation: EnumAggregation) -> &str {
        match aggregation {
            EnumAggregation::Sum => &self.suffix_sum,
            EnumAggregation::Count => &self.suffix_count,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OutputAndErrors

/// Populated target table plus the run report.
#[derive(Debug, Clone)]
pub struct SpecPivotOutput {
    /// Cross-tabulated target table.
    pub table: SpecTable,
    /// Layout used to build `table`.
    pub layout: SpecPivotLayout,
    /// Header width excluding the totals column.
    pub table_width: usize,
    /// Run report.
    pub report: ReportPivot,
}

/// One value column that failed numeric validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecNonNumericColumn {
    /// Source field name.
    pub field_name: String,
    /// Source column index.
    pub column_index: usize,
    /// Number of offending cells.
    pub cnt_cells: usize,
    /// First offending source row index.
    pub row_first: usize,
    /// Cell kind found at `row_first` (`EnumCell::kind`).
    pub kind_first: &'static str,
}

/// Pivot call failed before producing a valid target table.
#[derive(Debug, Error)]
pub enum PivotError {
    /// No source column is tagged as the row dimension.
    #[error("No column is tagged as the row dimension.")]
    MissingRowRole,
    /// More than one source column is tagged as the row dimension.
    #[error("Exactly one row dimension is supported; found columns {columns:?}.")]
    MultipleRowRoles {
        /// Tagged column indices.
        columns: Vec<usize>,
    },
    /// A value column holds non-numeric, non-blank cells.
    #[error("Value columns contain non-numeric cells: {}", derive_non_numeric_text(.columns))]
    NonNumericValueCell {
        /// Offending columns in catalog order.
        columns: Vec<SpecNonNumericColumn>,
    },
    /// Header lookup failed during aggregation.
    #[error("Internal layout inconsistency at source row {row}: {message}")]
    InternalLayoutInconsistency {
        /// Source row being aggregated.
        row: usize,
        /// Lookup that failed.
        message: String,
    },
    /// Source lacks the fixed header rows.
    #[error("Source table needs >= 4 header rows (role, order, aggregation, field name); got {height}.")]
    SourceTooShort {
        /// Actual source height.
        height: usize,
    },
    /// Target table handed in is not blank.
    #[error("Target table must be empty before pivoting.")]
    TargetNotEmpty,
    /// Role catalog or options rejected by pre-validation.
    #[error("{0}")]
    InvalidOptions(String),
}

fn derive_non_numeric_text(columns: &[SpecNonNumericColumn]) -> String {
    columns
        .iter()
        .map(|col| {
            format!(
                "{:?} (column {}) x{} first at row {} ({})",
                col.field_name, col.column_index, col.cnt_cells, col.row_first, col.kind_first
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
