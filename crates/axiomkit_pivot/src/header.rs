//! Multi-row column header and field-name row construction.

use crate::catalog::derive_field_name;
use crate::layout::{N_COL_IDX_ROW_LABEL, calculate_table_width};
use crate::spec::{
    EnumAggregation, SpecColumnAxis, SpecPivotLayout, SpecPivotOptions, SpecRoleCatalog,
    SpecRoleTriplet,
};
use crate::table::{EnumCell, SpecTable};

/// Field-name row label of a value field: field name plus aggregation suffix.
pub fn derive_value_label(
    source: &SpecTable,
    triplet: &SpecRoleTriplet,
    options: &SpecPivotOptions,
) -> String {
    let aggregation = triplet.aggregation.unwrap_or(EnumAggregation::Sum);
    format!(
        "{}{}",
        derive_field_name(source, triplet),
        options.suffix_for(aggregation)
    )
}

/// Write one header row per column dimension, then the field-name row.
///
/// Dimension `d` lands on row `d`. Each distinct value is written once and
/// followed by blank placeholders up to its block width; the whole value run
/// repeats `multiplier(d)` times. The dimension's field name sits just left of
/// the first header column.
///
/// Returns the header width.
pub fn build_header(
    target: &mut SpecTable,
    source: &SpecTable,
    catalog: &SpecRoleCatalog,
    layout: &SpecPivotLayout,
    axis: &SpecColumnAxis,
    options: &SpecPivotOptions,
) -> usize {
    let n_width_table = calculate_table_width(layout, axis);

    for (n_idx_dim, triplet) in catalog.columns.iter().enumerate() {
        let row = target.row_mut(n_idx_dim);
        row.set(
            layout.column_label_offset_x - 1,
            EnumCell::Text(derive_field_name(source, triplet)),
        );

        let n_block_width = axis.block_width(n_idx_dim);
        if n_block_width == 0 {
            continue;
        }
        let mut n_idx_col = layout.column_label_offset_x;
        for _ in 0..axis.multiplier(n_idx_dim) {
            for value in &axis.values_by_dimension[n_idx_dim] {
                row.set(n_idx_col, value.clone());
                for n_offset in 1..n_block_width {
                    row.set(n_idx_col + n_offset, EnumCell::Blank);
                }
                n_idx_col += n_block_width;
            }
        }
    }

    let row_field = target.row_mut(layout.value_row_offset_y);
    row_field.set(
        N_COL_IDX_ROW_LABEL,
        EnumCell::Text(derive_field_name(source, &catalog.row)),
    );
    for (n_idx_deco, triplet) in catalog.decorations.iter().enumerate() {
        row_field.set(
            layout.deco_offset_x + n_idx_deco,
            EnumCell::Text(derive_field_name(source, triplet)),
        );
    }

    let l_value_labels: Vec<String> = catalog
        .values
        .iter()
        .map(|triplet| derive_value_label(source, triplet, options))
        .collect();
    if !l_value_labels.is_empty() {
        for n_idx_col in layout.column_label_offset_x..n_width_table {
            let n_idx_value = (n_idx_col - layout.column_label_offset_x) % l_value_labels.len();
            row_field.set(n_idx_col, l_value_labels[n_idx_value].clone());
        }
    }

    tracing::debug!(
        n_dimensions = catalog.columns.len(),
        n_values = catalog.values.len(),
        n_width_table,
        "pivot header built"
    );
    n_width_table
}
