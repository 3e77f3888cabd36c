//! Role catalog extraction from the three annotation rows of a source table.

use crate::conf::{
    C_AGGREGATION_TAG_COUNT, C_ROLE_TAG_COLUMN, C_ROLE_TAG_DECORATION, C_ROLE_TAG_ROW,
    C_ROLE_TAG_VALUE, N_ROW_IDX_AGGREGATION, N_ROW_IDX_FIELD_NAME, N_ROW_IDX_ORDER,
    N_ROW_IDX_ROLE, N_ROWS_SOURCE_HEADER,
};
use crate::spec::{EnumAggregation, EnumPivotRole, PivotError, SpecRoleCatalog, SpecRoleTriplet};
use crate::table::{EnumCell, SpecTable};
use crate::util::{convert_cell_to_order, derive_cell_text};

/// Build the role catalog from the role, order and aggregation-type rows.
///
/// Columns whose role tag is not one of `row` / `column` / `value` / `deco`
/// are ignored. Each group is sorted by `order`; ties keep source column order.
///
/// Fails with [`PivotError::MissingRowRole`] when no column carries the row
/// tag and [`PivotError::MultipleRowRoles`] when more than one does.
pub fn build_role_catalog(source: &SpecTable) -> Result<SpecRoleCatalog, PivotError> {
    if source.height() < N_ROWS_SOURCE_HEADER {
        return Err(PivotError::SourceTooShort {
            height: source.height(),
        });
    }

    let mut l_rows = Vec::new();
    let mut l_columns = Vec::new();
    let mut l_values = Vec::new();
    let mut l_decorations = Vec::new();

    let Some(row_role) = source.row(N_ROW_IDX_ROLE) else {
        return Err(PivotError::MissingRowRole);
    };
    for (n_idx_col, cell_role) in row_role.iter() {
        let Some(role) = parse_role_tag(cell_role) else {
            continue;
        };
        let order = convert_cell_to_order(source.cell(N_ROW_IDX_ORDER, n_idx_col));
        let aggregation = match role {
            EnumPivotRole::Value => Some(parse_aggregation_tag(
                source.cell(N_ROW_IDX_AGGREGATION, n_idx_col),
            )),
            _ => None,
        };
        let triplet = SpecRoleTriplet {
            role,
            column_index: n_idx_col,
            order,
            aggregation,
        };
        match role {
            EnumPivotRole::Row => l_rows.push(triplet),
            EnumPivotRole::Column => l_columns.push(triplet),
            EnumPivotRole::Value => l_values.push(triplet),
            EnumPivotRole::Decoration => l_decorations.push(triplet),
        }
    }

    if l_rows.len() > 1 {
        return Err(PivotError::MultipleRowRoles {
            columns: l_rows.iter().map(|t| t.column_index).collect(),
        });
    }
    let Some(row) = l_rows.pop() else {
        return Err(PivotError::MissingRowRole);
    };

    // Row iteration is ascending by column, so a stable sort keeps index tie-break.
    for l_group in [&mut l_columns, &mut l_values, &mut l_decorations] {
        l_group.sort_by_key(|t| t.order);
    }

    Ok(SpecRoleCatalog {
        row,
        columns: l_columns,
        values: l_values,
        decorations: l_decorations,
    })
}

/// Check that the catalog describes a meaningful pivot: one row dimension,
/// at least one column dimension and at least one value field.
pub fn validate_role_catalog(catalog: &SpecRoleCatalog) -> Result<(), PivotError> {
    let mut l_missing = Vec::new();
    if catalog.columns.is_empty() {
        l_missing.push(C_ROLE_TAG_COLUMN);
    }
    if catalog.values.is_empty() {
        l_missing.push(C_ROLE_TAG_VALUE);
    }
    if l_missing.is_empty() {
        return Ok(());
    }
    Err(PivotError::InvalidOptions(format!(
        "Pivot requires at least one {} role.",
        l_missing.join(" and one ")
    )))
}

/// Field name of `triplet` from the source field-name row.
pub fn derive_field_name(source: &SpecTable, triplet: &SpecRoleTriplet) -> String {
    derive_cell_text(source.cell(N_ROW_IDX_FIELD_NAME, triplet.column_index))
}

fn parse_role_tag(cell: &EnumCell) -> Option<EnumPivotRole> {
    match cell.as_str()? {
        C_ROLE_TAG_ROW => Some(EnumPivotRole::Row),
        C_ROLE_TAG_COLUMN => Some(EnumPivotRole::Column),
        C_ROLE_TAG_VALUE => Some(EnumPivotRole::Value),
        C_ROLE_TAG_DECORATION => Some(EnumPivotRole::Decoration),
        _ => None,
    }
}

fn parse_aggregation_tag(cell: &EnumCell) -> EnumAggregation {
    match cell.as_str() {
        Some(C_AGGREGATION_TAG_COUNT) => EnumAggregation::Count,
        _ => EnumAggregation::Sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SpecRow;

    fn source_from_header(
        roles: &[&str],
        orders: &[f64],
        aggregations: &[&str],
        names: &[&str],
    ) -> SpecTable {
        SpecTable::from_rows(vec![
            SpecRow::from_cells(roles.iter().copied()),
            SpecRow::from_cells(orders.iter().copied()),
            SpecRow::from_cells(aggregations.iter().copied()),
            SpecRow::from_cells(names.iter().copied()),
        ])
    }

    #[test]
    fn test_groups_are_sorted_by_order_then_column() {
        let source = source_from_header(
            &["column", "row", "value", "column", "value", "deco", "note"],
            &[2.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0],
            &["", "", "COUNT", "", "sum", "", ""],
            &["Quarter", "Region", "Orders", "Year", "Revenue", "Manager", "Memo"],
        );
        let catalog = build_role_catalog(&source).expect("catalog");

        assert_eq!(catalog.row.column_index, 1);
        assert_eq!(catalog.row.aggregation, None);
        assert_eq!(
            catalog.columns.iter().map(|t| t.column_index).collect::<Vec<_>>(),
            vec![3, 0]
        );
        assert_eq!(
            catalog.values.iter().map(|t| t.column_index).collect::<Vec<_>>(),
            vec![2, 4]
        );
        assert_eq!(catalog.values[0].aggregation, Some(EnumAggregation::Count));
        assert_eq!(catalog.values[1].aggregation, Some(EnumAggregation::Sum));
        assert_eq!(catalog.decorations.len(), 1);
        assert_eq!(derive_field_name(&source, &catalog.columns[0]), "Year");
    }

    #[test]
    fn test_blank_aggregation_defaults_to_sum() {
        let source = source_from_header(&["row", "value"], &[0.0, 0.0], &[], &["K", "V"]);
        let catalog = build_role_catalog(&source).expect("catalog");
        assert_eq!(catalog.values[0].aggregation, Some(EnumAggregation::Sum));
    }

    #[test]
    fn test_missing_row_role_is_rejected() {
        let source = source_from_header(&["column", "value"], &[0.0, 0.0], &["", ""], &["A", "B"]);
        assert!(matches!(
            build_role_catalog(&source),
            Err(PivotError::MissingRowRole)
        ));
    }

    #[test]
    fn test_second_row_role_is_rejected() {
        let source = source_from_header(&["row", "row"], &[0.0, 0.0], &["", ""], &["A", "B"]);
        assert!(matches!(
            build_role_catalog(&source),
            Err(PivotError::MultipleRowRoles { columns }) if columns == vec![0, 1]
        ));
    }

    #[test]
    fn test_short_source_is_rejected() {
        let source = SpecTable::from_rows(vec![SpecRow::from_cells(["row"])]);
        assert!(matches!(
            build_role_catalog(&source),
            Err(PivotError::SourceTooShort { height: 1 })
        ));
    }

    #[test]
    fn test_degenerate_catalog_passes_build_but_fails_validation() {
        let source = source_from_header(&["row"], &[0.0], &[""], &["K"]);
        let catalog = build_role_catalog(&source).expect("catalog");
        let err = validate_role_catalog(&catalog).expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "Pivot requires at least one column and one value role."
        );
    }
}
