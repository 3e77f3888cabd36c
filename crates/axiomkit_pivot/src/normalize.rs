//! Source validation and grouping-key normalization.

use crate::catalog::derive_field_name;
use crate::conf::N_ROWS_SOURCE_HEADER;
use crate::spec::{PivotError, SpecNonNumericColumn, SpecRoleCatalog};
use crate::table::{EnumCell, SpecTable};

/// Reject value columns holding anything other than numbers or blanks.
///
/// Scans every data row of every value column before reporting, so the error
/// lists each offending column once.
pub fn validate_value_columns(
    source: &SpecTable,
    catalog: &SpecRoleCatalog,
) -> Result<(), PivotError> {
    let mut l_offending = Vec::new();

    for triplet in &catalog.values {
        let mut cnt_cells = 0usize;
        let mut first = None;
        for (n_idx_row, row) in source
            .rows()
            .iter()
            .enumerate()
            .skip(N_ROWS_SOURCE_HEADER)
        {
            let cell = row.cell(triplet.column_index);
            if cell.is_blank_or_empty() || matches!(cell, EnumCell::Numeric(_)) {
                continue;
            }
            cnt_cells += 1;
            first.get_or_insert((n_idx_row, cell.kind()));
        }
        if let Some((row_first, kind_first)) = first {
            l_offending.push(SpecNonNumericColumn {
                field_name: derive_field_name(source, triplet),
                column_index: triplet.column_index,
                cnt_cells,
                row_first,
                kind_first,
            });
        }
    }

    if l_offending.is_empty() {
        Ok(())
    } else {
        Err(PivotError::NonNumericValueCell {
            columns: l_offending,
        })
    }
}

/// Replace absent, blank and empty-string cells in the row-key column and
/// every column-dimension column with `sentinel`.
///
/// Returns the number of replaced cells. Running it twice is a no-op the
/// second time.
pub fn normalize_key_cells(
    source: &mut SpecTable,
    catalog: &SpecRoleCatalog,
    sentinel: &str,
) -> usize {
    let l_cols_idx_key: Vec<usize> = std::iter::once(catalog.row.column_index)
        .chain(catalog.columns.iter().map(|t| t.column_index))
        .collect();

    let mut cnt_replaced = 0usize;
    for n_idx_row in N_ROWS_SOURCE_HEADER..source.height() {
        let row = source.row_mut(n_idx_row);
        for n_idx_col in &l_cols_idx_key {
            if row.cell(*n_idx_col).is_blank_or_empty() {
                row.set(*n_idx_col, EnumCell::text(sentinel));
                cnt_replaced += 1;
            }
        }
    }
    tracing::debug!(
        cnt_replaced,
        n_cols_key = l_cols_idx_key.len(),
        "pivot key cells normalized"
    );
    cnt_replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_role_catalog;
    use crate::conf::C_SENTINEL_EMPTY;
    use crate::table::SpecRow;

    fn header() -> Vec<SpecRow> {
        vec![
            SpecRow::from_cells(["row", "column", "value", "deco"]),
            SpecRow::from_cells([0.0, 0.0, 0.0, 0.0]),
            SpecRow::from_cells(["", "", "", ""]),
            SpecRow::from_cells(["Region", "Quarter", "Revenue", "Manager"]),
        ]
    }

    #[test]
    fn test_blank_keys_become_sentinel_and_second_pass_is_noop() {
        let mut l_rows = header();
        let mut row_blank = SpecRow::new();
        row_blank.set(1, "");
        row_blank.set(2, 5.0);
        l_rows.push(row_blank);
        l_rows.push(SpecRow::from_cells([
            EnumCell::text("North"),
            EnumCell::Blank,
            EnumCell::Numeric(1.0),
            EnumCell::Blank,
        ]));
        let mut source = SpecTable::from_rows(l_rows);
        let catalog = build_role_catalog(&source).expect("catalog");

        assert_eq!(normalize_key_cells(&mut source, &catalog, C_SENTINEL_EMPTY), 3);
        assert_eq!(source.cell(4, 0).as_str(), Some(C_SENTINEL_EMPTY));
        assert_eq!(source.cell(4, 1).as_str(), Some(C_SENTINEL_EMPTY));
        assert_eq!(source.cell(5, 0).as_str(), Some("North"));
        assert_eq!(source.cell(5, 1).as_str(), Some(C_SENTINEL_EMPTY));
        // decoration column is left alone
        assert!(source.cell(5, 3).is_blank());

        let snapshot = source.clone();
        assert_eq!(normalize_key_cells(&mut source, &catalog, C_SENTINEL_EMPTY), 0);
        assert_eq!(source, snapshot);
    }

    #[test]
    fn test_non_numeric_value_cells_are_collected_per_column() {
        let mut l_rows = header();
        l_rows.push(SpecRow::from_cells(["North", "Q1", "n/a"]));
        l_rows.push(SpecRow::from_cells(["North", "Q2", ""]));
        l_rows.push(SpecRow::from_cells(["South", "Q1", "zero"]));
        let source = SpecTable::from_rows(l_rows);
        let catalog = build_role_catalog(&source).expect("catalog");

        let err = validate_value_columns(&source, &catalog).expect_err("must fail");
        let PivotError::NonNumericValueCell { columns } = err else {
            panic!("unexpected error variant");
        };
        assert_eq!(
            columns,
            vec![SpecNonNumericColumn {
                field_name: "Revenue".to_string(),
                column_index: 2,
                cnt_cells: 2,
                row_first: 4,
                kind_first: "text",
            }]
        );
    }

    #[test]
    fn test_numbers_and_blanks_pass_validation() {
        let mut l_rows = header();
        l_rows.push(SpecRow::from_cells([
            EnumCell::text("North"),
            EnumCell::text("Q1"),
            EnumCell::Numeric(3.0),
        ]));
        l_rows.push(SpecRow::from_cells(["North", "Q2"]));
        let source = SpecTable::from_rows(l_rows);
        let catalog = build_role_catalog(&source).expect("catalog");
        assert!(validate_value_columns(&source, &catalog).is_ok());
    }
}
