//! Annotated source assembly from a Polars `DataFrame` plus a role assignment.

use std::collections::BTreeMap;
use std::io::Cursor;

use axiomkit_pivot::conf::{
    N_ROW_IDX_AGGREGATION, N_ROW_IDX_FIELD_NAME, N_ROW_IDX_ORDER, N_ROW_IDX_ROLE,
};
use axiomkit_pivot::{
    C_AGGREGATION_TAG_COUNT, C_ROLE_TAG_COLUMN, C_ROLE_TAG_DECORATION, C_ROLE_TAG_ROW,
    C_ROLE_TAG_VALUE, EnumAggregation, EnumCell, EnumPivotRole, SpecRow, SpecTable,
};
use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};

use crate::spec::{PivotXlsxError, SpecPivotField};

const C_AGGREGATION_TAG_SUM: &str = "SUM";

/// Build an annotated source table from `df` and the resolved `fields`.
///
/// Every DataFrame column gets a field-name header; only columns named in
/// `fields` carry a role, order and aggregation tag. Nulls stay absent.
pub fn derive_source_table_from_dataframe(
    df: &DataFrame,
    fields: &[SpecPivotField],
) -> Result<SpecTable, PivotXlsxError> {
    let l_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c_name| c_name.to_string())
        .collect();
    let dict_field_by_col = derive_field_assignment(&l_names, fields)?;

    let mut source = SpecTable::new();
    for (n_idx_col, c_name) in l_names.iter().enumerate() {
        source.set_cell(N_ROW_IDX_FIELD_NAME, n_idx_col, c_name.as_str());
        let Some(field) = dict_field_by_col.get(&n_idx_col) else {
            continue;
        };
        source.set_cell(N_ROW_IDX_ROLE, n_idx_col, derive_role_tag(field.role));
        source.set_cell(N_ROW_IDX_ORDER, n_idx_col, f64::from(field.order));
        if field.role == EnumPivotRole::Value {
            let c_tag = match field.aggregation {
                EnumAggregation::Count => C_AGGREGATION_TAG_COUNT,
                EnumAggregation::Sum => C_AGGREGATION_TAG_SUM,
            };
            source.set_cell(N_ROW_IDX_AGGREGATION, n_idx_col, c_tag);
        }
    }

    let l_cols = df.get_columns();
    for n_idx_row in 0..df.height() {
        let mut row = SpecRow::new();
        for (n_idx_col, col) in l_cols.iter().enumerate() {
            let value = col.get(n_idx_row)?;
            if let Some(cell) = derive_cell_from_any_value(value) {
                row.set(n_idx_col, cell);
            }
        }
        source.push_row(row);
    }

    tracing::debug!(
        n_rows = df.height(),
        n_cols = l_names.len(),
        n_fields = fields.len(),
        "pivot source assembled from dataframe"
    );
    Ok(source)
}

/// Decode Polars IPC bytes and build an annotated source table.
pub fn derive_source_table_from_ipc_bytes(
    v_ipc_df: &[u8],
    fields: &[SpecPivotField],
) -> Result<SpecTable, PivotXlsxError> {
    let df = IpcReader::new(Cursor::new(v_ipc_df)).finish()?;
    derive_source_table_from_dataframe(&df, fields)
}

fn derive_field_assignment<'a>(
    l_names: &[String],
    fields: &'a [SpecPivotField],
) -> Result<BTreeMap<usize, &'a SpecPivotField>, PivotXlsxError> {
    let mut dict_field_by_col = BTreeMap::new();
    for field in fields {
        let Some(n_idx_col) = l_names.iter().position(|c_name| *c_name == field.name) else {
            return Err(PivotXlsxError::RoleAssignment(format!(
                "Field not found in DataFrame: {:?}",
                field.name
            )));
        };
        if dict_field_by_col.insert(n_idx_col, field).is_some() {
            return Err(PivotXlsxError::RoleAssignment(format!(
                "Field assigned more than once: {:?}",
                field.name
            )));
        }
    }
    Ok(dict_field_by_col)
}

fn derive_role_tag(role: EnumPivotRole) -> &'static str {
    match role {
        EnumPivotRole::Row => C_ROLE_TAG_ROW,
        EnumPivotRole::Column => C_ROLE_TAG_COLUMN,
        EnumPivotRole::Value => C_ROLE_TAG_VALUE,
        EnumPivotRole::Decoration => C_ROLE_TAG_DECORATION,
    }
}

fn derive_cell_from_any_value(value: AnyValue<'_>) -> Option<EnumCell> {
    let cell = match value {
        AnyValue::Null => return None,
        AnyValue::String(val) => EnumCell::text(val),
        AnyValue::StringOwned(val) => EnumCell::text(val.as_str()),
        AnyValue::Boolean(val) => EnumCell::Boolean(val),
        AnyValue::UInt8(val) => EnumCell::Numeric(val as f64),
        AnyValue::UInt16(val) => EnumCell::Numeric(val as f64),
        AnyValue::UInt32(val) => EnumCell::Numeric(val as f64),
        AnyValue::UInt64(val) => EnumCell::Numeric(val as f64),
        AnyValue::Int8(val) => EnumCell::Numeric(val as f64),
        AnyValue::Int16(val) => EnumCell::Numeric(val as f64),
        AnyValue::Int32(val) => EnumCell::Numeric(val as f64),
        AnyValue::Int64(val) => EnumCell::Numeric(val as f64),
        AnyValue::Float32(val) => EnumCell::Numeric(val as f64),
        AnyValue::Float64(val) => EnumCell::Numeric(val),
        _ => EnumCell::text(value.to_string()),
    };
    Some(cell)
}
