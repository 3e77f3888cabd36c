//! Pivot constants and default preset factories.

use crate::spec::SpecPivotOptions;

/// Source row holding role tags (`row` / `column` / `value` / `deco`).
pub const N_ROW_IDX_ROLE: usize = 0;
/// Source row holding numeric order keys.
pub const N_ROW_IDX_ORDER: usize = 1;
/// Source row holding aggregation-type tags.
pub const N_ROW_IDX_AGGREGATION: usize = 2;
/// Source row holding field names.
pub const N_ROW_IDX_FIELD_NAME: usize = 3;
/// Number of fixed header rows before the first source data row.
pub const N_ROWS_SOURCE_HEADER: usize = 4;

/// Role tag for the single row dimension.
pub const C_ROLE_TAG_ROW: &str = "row";
/// Role tag for a column dimension.
pub const C_ROLE_TAG_COLUMN: &str = "column";
/// Role tag for a value field.
pub const C_ROLE_TAG_VALUE: &str = "value";
/// Role tag for a decoration field.
pub const C_ROLE_TAG_DECORATION: &str = "deco";
/// Aggregation tag selecting `Count`. Anything else selects `Sum`.
pub const C_AGGREGATION_TAG_COUNT: &str = "COUNT";

/// Placeholder substituted for blank grouping keys.
///
/// A literal source value equal to this text lands in the same group as the
/// blank keys. NaN keys are not replaced; they group with each other.
pub const C_SENTINEL_EMPTY: &str = "(empty)";
/// Label above the row-totals column and left of the totals row.
pub const C_LABEL_TOTAL: &str = "Total";
/// Field-name suffix for `Sum` value columns.
pub const C_SUFFIX_SUM: &str = " (sum)";
/// Field-name suffix for `Count` value columns.
pub const C_SUFFIX_COUNT: &str = " (count)";

/// Build default pivot options.
pub fn derive_default_pivot_options() -> SpecPivotOptions {
    SpecPivotOptions::default()
}
