//! Target-table layout arithmetic.

use crate::conf::N_ROWS_SOURCE_HEADER;
use crate::spec::{SpecColumnAxis, SpecPivotLayout, SpecRoleCatalog};
use crate::table::{EnumCell, SpecTable};

/// Column of the row label in the target table.
pub const N_COL_IDX_ROW_LABEL: usize = 0;

/// Derive the fixed offsets from the catalog group sizes.
pub fn derive_pivot_layout(catalog: &SpecRoleCatalog) -> SpecPivotLayout {
    SpecPivotLayout {
        column_label_offset_x: 1 + catalog.decorations.len(),
        value_row_offset_y: catalog.columns.len(),
        deco_offset_x: 1,
    }
}

/// Collect distinct values of every column dimension in first-encountered
/// source order.
///
/// Expects a normalized source: blank keys already replaced by the sentinel.
pub fn collect_column_axis(source: &SpecTable, catalog: &SpecRoleCatalog) -> SpecColumnAxis {
    let mut values_by_dimension: Vec<Vec<EnumCell>> = vec![Vec::new(); catalog.columns.len()];

    for row in source.rows().iter().skip(N_ROWS_SOURCE_HEADER) {
        for (n_idx_dim, triplet) in catalog.columns.iter().enumerate() {
            let cell = row.cell(triplet.column_index);
            let l_seen = &mut values_by_dimension[n_idx_dim];
            if !l_seen.iter().any(|seen| seen.is_same_group(cell)) {
                l_seen.push(cell.clone());
            }
        }
    }

    SpecColumnAxis {
        values_by_dimension,
        n_values: catalog.values.len(),
    }
}

/// Full header width: label/decoration columns plus every value column.
pub fn calculate_table_width(layout: &SpecPivotLayout, axis: &SpecColumnAxis) -> usize {
    layout.column_label_offset_x + axis.span_width()
}
