//! Pivot report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one pivot run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportPivot {
    /// Source data rows scanned (header rows excluded).
    pub cnt_rows_scanned: u64,
    /// Blank grouping-key cells replaced by the sentinel.
    pub cnt_cells_normalized: u64,
    /// Distinct row-key groups emitted as target rows.
    pub cnt_groups: u64,
    /// Value cells folded into the pivot body.
    pub cnt_cells_accumulated: u64,
    /// Target header width excluding the totals column.
    pub n_width_table: u64,
    /// Whether the row-totals column was emitted.
    pub if_row_totals: bool,
    /// Whether the column-totals row was emitted.
    pub if_column_totals: bool,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl ReportPivot {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_rows_scanned".to_string(), self.cnt_rows_scanned);
        dict_counts.insert(
            "cnt_cells_normalized".to_string(),
            self.cnt_cells_normalized,
        );
        dict_counts.insert("cnt_groups".to_string(), self.cnt_groups);
        dict_counts.insert(
            "cnt_cells_accumulated".to_string(),
            self.cnt_cells_accumulated,
        );
        dict_counts.insert("n_width_table".to_string(), self.n_width_table);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} rows={} normalized={} groups={} accumulated={} width={} row_totals={} column_totals={} warnings={}",
            dict_counts["cnt_rows_scanned"],
            dict_counts["cnt_cells_normalized"],
            dict_counts["cnt_groups"],
            dict_counts["cnt_cells_accumulated"],
            dict_counts["n_width_table"],
            self.if_row_totals,
            self.if_column_totals,
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportPivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[PIVOT]"))
    }
}

/// Mutable accumulator for pivot statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportPivotBuilder {
    /// See [`ReportPivot::cnt_rows_scanned`].
    pub cnt_rows_scanned: u64,
    /// See [`ReportPivot::cnt_cells_normalized`].
    pub cnt_cells_normalized: u64,
    /// See [`ReportPivot::cnt_groups`].
    pub cnt_groups: u64,
    /// See [`ReportPivot::cnt_cells_accumulated`].
    pub cnt_cells_accumulated: u64,
    /// See [`ReportPivot::n_width_table`].
    pub n_width_table: u64,
    /// See [`ReportPivot::if_row_totals`].
    pub if_row_totals: bool,
    /// See [`ReportPivot::if_column_totals`].
    pub if_column_totals: bool,
    /// See [`ReportPivot::warnings`].
    pub warnings: Vec<String>,
}

impl ReportPivotBuilder {
    /// Increment scanned row count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_rows_scanned += 1;
    }

    /// Add to the normalized key-cell count.
    pub fn add_normalized(&mut self, value: u64) {
        self.cnt_cells_normalized += value;
    }

    /// Increment group count by one.
    pub fn add_group(&mut self) {
        self.cnt_groups += 1;
    }

    /// Increment accumulated value-cell count by one.
    pub fn add_accumulated(&mut self) {
        self.cnt_cells_accumulated += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportPivot {
        ReportPivot {
            cnt_rows_scanned: self.cnt_rows_scanned,
            cnt_cells_normalized: self.cnt_cells_normalized,
            cnt_groups: self.cnt_groups,
            cnt_cells_accumulated: self.cnt_cells_accumulated,
            n_width_table: self.n_width_table,
            if_row_totals: self.if_row_totals,
            if_column_totals: self.if_column_totals,
            warnings: self.warnings,
        }
    }
}
