//! Trailing row-totals column and column-totals row.

use crate::layout::N_COL_IDX_ROW_LABEL;
use crate::report::ReportPivotBuilder;
use crate::spec::{EnumTotalsMode, SpecPivotLayout, SpecPivotOptions};
use crate::table::{EnumCell, SpecTable};
use crate::util::derive_sum_formula;

/// Append totals to a fully aggregated target table.
///
/// The row-totals column is only emitted with fewer than two value fields.
/// The column-totals row covers every value column plus, when row totals
/// exist, the grand total.
pub fn emit_totals(
    target: &mut SpecTable,
    layout: &SpecPivotLayout,
    n_width_table: usize,
    n_values: usize,
    options: &SpecPivotOptions,
    builder: &mut ReportPivotBuilder,
) {
    let n_row_start = layout.first_data_row_y();
    let n_row_end = usize::max(n_row_start, target.height());

    let if_row_totals = options.if_emit_row_totals && n_values < 2;
    if options.if_emit_row_totals && !if_row_totals {
        tracing::warn!(n_values, "pivot row totals suppressed");
        builder.add_warning(format!(
            "Row totals suppressed: {n_values} value fields cannot be summed per row."
        ));
    }

    if if_row_totals {
        target.set_cell(
            layout.value_row_offset_y,
            n_width_table,
            options.label_total.clone(),
        );
        for n_idx_row in n_row_start..n_row_end {
            let cell = match options.rule_totals {
                EnumTotalsMode::Value => EnumCell::Numeric(sum_numeric(
                    (layout.column_label_offset_x..n_width_table)
                        .map(|n_idx_col| target.cell(n_idx_row, n_idx_col)),
                )),
                EnumTotalsMode::Formula => {
                    if n_width_table > layout.column_label_offset_x {
                        EnumCell::Formula(derive_sum_formula(
                            n_idx_row,
                            layout.column_label_offset_x,
                            n_idx_row,
                            n_width_table - 1,
                        ))
                    } else {
                        EnumCell::Numeric(0.0)
                    }
                }
            };
            target.set_cell(n_idx_row, n_width_table, cell);
        }
    }

    if options.if_emit_column_totals {
        let n_row_totals = n_row_end;
        target.set_cell(n_row_totals, N_COL_IDX_ROW_LABEL, options.label_total.clone());

        let n_col_end = if if_row_totals {
            n_width_table + 1
        } else {
            n_width_table
        };
        for n_idx_col in layout.column_label_offset_x..n_col_end {
            let cell = match options.rule_totals {
                EnumTotalsMode::Value => EnumCell::Numeric(sum_numeric(
                    (n_row_start..n_row_end).map(|n_idx_row| target.cell(n_idx_row, n_idx_col)),
                )),
                EnumTotalsMode::Formula => {
                    if n_row_end > n_row_start {
                        EnumCell::Formula(derive_sum_formula(
                            n_row_start,
                            n_idx_col,
                            n_row_end - 1,
                            n_idx_col,
                        ))
                    } else {
                        EnumCell::Numeric(0.0)
                    }
                }
            };
            target.set_cell(n_row_totals, n_idx_col, cell);
        }
    }

    builder.if_row_totals = if_row_totals;
    builder.if_column_totals = options.if_emit_column_totals;
    tracing::debug!(
        if_row_totals,
        if_column_totals = options.if_emit_column_totals,
        n_rows_data = n_row_end - n_row_start,
        "pivot totals emitted"
    );
}

fn sum_numeric<'a>(cells: impl Iterator<Item = &'a EnumCell>) -> f64 {
    cells.filter_map(EnumCell::as_f64).sum()
}
