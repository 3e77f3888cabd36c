//! Central aggregation loop: one pass over the source data rows.

use crate::conf::N_ROWS_SOURCE_HEADER;
use crate::header::derive_value_label;
use crate::layout::N_COL_IDX_ROW_LABEL;
use crate::report::ReportPivotBuilder;
use crate::spec::{
    EnumAggregation, PivotError, SpecColumnAxis, SpecPivotLayout, SpecPivotOptions,
    SpecRoleCatalog,
};
use crate::table::{EnumCell, SpecRow, SpecTable};

/// Borrowed inputs shared by every aggregation step.
pub struct SpecAggregateContext<'a> {
    /// Normalized, validated source.
    pub source: &'a SpecTable,
    /// Role catalog of `source`.
    pub catalog: &'a SpecRoleCatalog,
    /// Target layout.
    pub layout: &'a SpecPivotLayout,
    /// Distinct dimension values.
    pub axis: &'a SpecColumnAxis,
    /// Header width.
    pub n_width_table: usize,
    /// Pivot options.
    pub options: &'a SpecPivotOptions,
}

/// Fold every source data row into `target`.
///
/// Target rows are created in first-seen row-key order; decoration cells are
/// copied from the first row of each group only. Lookups always take the first
/// grouping-equal match (see `EnumCell::is_same_group`), so each row key and each
/// (dimension values, value field) combination maps to exactly one cell.
pub fn aggregate_rows(
    target: &mut SpecTable,
    ctx: &SpecAggregateContext<'_>,
    builder: &mut ReportPivotBuilder,
) -> Result<(), PivotError> {
    let l_value_labels: Vec<String> = ctx
        .catalog
        .values
        .iter()
        .map(|triplet| derive_value_label(ctx.source, triplet, ctx.options))
        .collect();

    for (n_idx_row_src, row_src) in ctx
        .source
        .rows()
        .iter()
        .enumerate()
        .skip(N_ROWS_SOURCE_HEADER)
    {
        builder.add_scanned();
        let n_idx_row_dst = locate_or_create_target_row(target, row_src, ctx, builder);

        for (triplet, label) in ctx.catalog.values.iter().zip(&l_value_labels) {
            let n_idx_col_dst = locate_target_column(target, row_src, label, ctx)
                .ok_or_else(|| PivotError::InternalLayoutInconsistency {
                    row: n_idx_row_src,
                    message: format!("no header column for value field {label:?}"),
                })?;

            let cell_src = row_src.cell(triplet.column_index);
            let aggregation = triplet.aggregation.unwrap_or(EnumAggregation::Sum);
            let row_dst = target.row_mut(n_idx_row_dst);
            if accumulate_cell(row_dst, n_idx_col_dst, cell_src, aggregation) {
                builder.add_accumulated();
            }
        }
    }
    tracing::debug!(
        n_rows_target = target.height(),
        cnt_groups = builder.cnt_groups,
        cnt_cells_accumulated = builder.cnt_cells_accumulated,
        "pivot aggregation finished"
    );
    Ok(())
}

fn locate_or_create_target_row(
    target: &mut SpecTable,
    row_src: &SpecRow,
    ctx: &SpecAggregateContext<'_>,
    builder: &mut ReportPivotBuilder,
) -> usize {
    let cell_key = row_src.cell(ctx.catalog.row.column_index);
    let n_row_first = ctx.layout.first_data_row_y();
    if let Some(n_idx_row) = (n_row_first..target.height()).find(|n_idx_row| {
        target
            .cell(*n_idx_row, N_COL_IDX_ROW_LABEL)
            .is_same_group(cell_key)
    }) {
        return n_idx_row;
    }

    let mut row_dst = SpecRow::new();
    row_dst.set(N_COL_IDX_ROW_LABEL, cell_key.clone());
    for (n_idx_deco, triplet) in ctx.catalog.decorations.iter().enumerate() {
        if let Some(cell) = row_src.get(triplet.column_index)
            && !cell.is_blank()
        {
            row_dst.set(ctx.layout.deco_offset_x + n_idx_deco, cell.clone());
        }
    }
    builder.add_group();
    target.push_row(row_dst)
}

/// Narrow the header window dimension by dimension, then pick the value
/// field column inside the final window.
fn locate_target_column(
    target: &SpecTable,
    row_src: &SpecRow,
    label: &str,
    ctx: &SpecAggregateContext<'_>,
) -> Option<usize> {
    let mut n_col_start = ctx.layout.column_label_offset_x;
    let mut n_col_end = ctx.n_width_table;

    for (n_idx_dim, triplet) in ctx.catalog.columns.iter().enumerate() {
        let cell_key = row_src.cell(triplet.column_index);
        let n_idx_col = (n_col_start..n_col_end).find(|n_idx_col| {
            target.cell(n_idx_dim, *n_idx_col).is_same_group(cell_key)
        })?;
        n_col_start = n_idx_col;
        n_col_end = usize::min(n_col_end, n_idx_col + ctx.axis.block_width(n_idx_dim));
    }

    (n_col_start..n_col_end).find(|n_idx_col| {
        target.cell(ctx.layout.value_row_offset_y, *n_idx_col).as_str() == Some(label)
    })
}

/// Apply one source cell to the target cell. Returns `true` when the target
/// changed.
///
/// `Sum` leaves the target untouched for a blank source cell; `Count` ignores
/// the source cell entirely.
fn accumulate_cell(
    row_dst: &mut SpecRow,
    n_idx_col: usize,
    cell_src: &EnumCell,
    aggregation: EnumAggregation,
) -> bool {
    let n_increment = match aggregation {
        EnumAggregation::Sum => match cell_src.as_f64() {
            Some(n) => n,
            None => return false,
        },
        EnumAggregation::Count => 1.0,
    };

    match row_dst.get_mut(n_idx_col) {
        Some(EnumCell::Numeric(n_existing)) => *n_existing += n_increment,
        _ => row_dst.set(n_idx_col, EnumCell::Numeric(n_increment)),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_skips_blank_source_and_count_does_not() {
        let mut row = SpecRow::new();
        assert!(!accumulate_cell(&mut row, 1, &EnumCell::Blank, EnumAggregation::Sum));
        assert!(row.get(1).is_none());

        assert!(accumulate_cell(&mut row, 1, &EnumCell::Numeric(2.5), EnumAggregation::Sum));
        assert!(accumulate_cell(&mut row, 1, &EnumCell::Numeric(4.0), EnumAggregation::Sum));
        assert_eq!(row.cell(1).as_f64(), Some(6.5));

        assert!(accumulate_cell(&mut row, 2, &EnumCell::Blank, EnumAggregation::Count));
        assert!(accumulate_cell(&mut row, 2, &EnumCell::Numeric(9.0), EnumAggregation::Count));
        assert_eq!(row.cell(2).as_f64(), Some(2.0));
    }

    #[test]
    fn test_sum_over_explicit_blank_initializes() {
        let mut row = SpecRow::new();
        row.set(0, EnumCell::Blank);
        assert!(accumulate_cell(&mut row, 0, &EnumCell::Numeric(3.0), EnumAggregation::Sum));
        assert_eq!(row.cell(0).as_f64(), Some(3.0));
    }
}
