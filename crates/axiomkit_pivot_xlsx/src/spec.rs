//! Shared XLSX pivot specification models and errors.

use std::collections::BTreeMap;

use axiomkit_pivot::{EnumAggregation, EnumCell, EnumPivotRole, PivotError};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Pivot region a target cell belongs to; selects its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumPivotRegion {
    /// Column-dimension header rows.
    Header,
    /// Field-name row.
    Field,
    /// Row label and decoration cells of data rows.
    Label,
    /// Aggregated body cells.
    Body,
    /// Totals row and totals column.
    Total,
}

/// Horizontal merge plan item.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetHorizontalMerge {
    /// Row index where merge is applied.
    pub row_idx_start: usize,
    /// Start column index (inclusive).
    pub col_idx_start: usize,
    /// End column index (inclusive).
    pub col_idx_end: usize,
    /// Merge display text.
    pub text: String,
    /// Typed anchor cell, rewritten over the merged range.
    pub cell: EnumCell,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RoleAssignment

/// Resolved role assignment for one DataFrame column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPivotField {
    /// DataFrame column name.
    pub name: String,
    /// Pivot role.
    pub role: EnumPivotRole,
    /// Sort key within the role group.
    pub order: i32,
    /// Aggregation kind; only read for value fields.
    pub aggregation: EnumAggregation,
}

impl SpecPivotField {
    /// Field with `order = 0` and `Sum` aggregation.
    pub fn new(name: impl Into<String>, role: EnumPivotRole) -> Self {
        Self {
            name: name.into(),
            role,
            order: 0,
            aggregation: EnumAggregation::Sum,
        }
    }

    /// Set the order key.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Set the aggregation kind.
    pub fn with_aggregation(mut self, aggregation: EnumAggregation) -> Self {
        self.aggregation = aggregation;
        self
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header and field-name rows only.
    Header,
    /// Infer width from data and totals rows only.
    Body,
    /// Infer width from every row (default).
    #[default]
    All,
}

/// Autofit policy for per-sheet write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::All,
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Per-sheet call options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPivotSheetWriteOptions {
    /// Freeze rows above the first data row and columns left of the first value column.
    pub if_freeze_panes: bool,
    /// Merge each dimension value with its blank placeholders.
    pub if_merge_header: bool,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Per-region patches overlaid on the writer presets for this sheet.
    pub dict_fmt_overrides: BTreeMap<EnumPivotRegion, SpecCellFormat>,
}

impl Default for SpecPivotSheetWriteOptions {
    fn default() -> Self {
        Self {
            if_freeze_panes: true,
            if_merge_header: true,
            policy_autofit: SpecAutofitCellsPolicy::default(),
            dict_fmt_overrides: BTreeMap::new(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportAndErrors

/// Per-sheet write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecPivotSheetReport {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Rows written.
    pub n_rows: usize,
    /// Columns written.
    pub n_cols: usize,
    /// Header merges applied.
    pub cnt_merges: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecPivotSheetReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

/// XLSX pivot import/export failure.
#[derive(Debug, Error)]
pub enum PivotXlsxError {
    /// Pivot engine failure.
    #[error(transparent)]
    Pivot(#[from] PivotError),
    /// DataFrame access failure.
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
    /// Workbook write failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// Role assignment does not fit the DataFrame.
    #[error("{0}")]
    RoleAssignment(String),
    /// Row/column index beyond Excel limits.
    #[error("{0}")]
    IndexOverflow(String),
    /// Write attempted after `close()`.
    #[error("Cannot write after close().")]
    WriterClosed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
