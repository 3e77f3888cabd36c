//! `axiomkit_pivot` v1:
//! Rust-side cross-tab (pivot) kernel.
//!
//! Pipeline, one source/target pair per call:
//! - `catalog`   : role catalog from the annotation rows
//! - `layout`    : fixed offsets and column-axis arithmetic
//! - `normalize` : value validation and blank-key normalization
//! - `header`    : multi-row column header and field-name row
//! - `aggregate` : sum/count accumulation
//! - `totals`    : row/column totals
//! - `pivot`     : orchestration and batch execution
//!
//! Supporting modules: `conf` (constants/presets), `spec` (enums, options,
//! errors), `table` (cell grid), `report` (run report), `util` (helpers).
pub mod aggregate;
pub mod catalog;
pub mod conf;
pub mod header;
pub mod layout;
pub mod normalize;
pub mod pivot;
pub mod report;
pub mod spec;
pub mod table;
pub mod totals;
pub mod util;

pub use catalog::{build_role_catalog, derive_field_name, validate_role_catalog};
pub use conf::{
    C_AGGREGATION_TAG_COUNT, C_LABEL_TOTAL, C_ROLE_TAG_COLUMN, C_ROLE_TAG_DECORATION,
    C_ROLE_TAG_ROW, C_ROLE_TAG_VALUE, C_SENTINEL_EMPTY, N_ROWS_SOURCE_HEADER,
    derive_default_pivot_options,
};
pub use layout::{calculate_table_width, collect_column_axis, derive_pivot_layout};
pub use normalize::{normalize_key_cells, validate_value_columns};
pub use pivot::{pivot_into, pivot_table, pivot_tables};
pub use report::{ReportPivot, ReportPivotBuilder};
pub use spec::{
    EnumAggregation, EnumPivotRole, EnumTotalsMode, PivotError, SpecColumnAxis,
    SpecNonNumericColumn, SpecPivotLayout, SpecPivotOptions, SpecPivotOutput, SpecRoleCatalog,
    SpecRoleTriplet,
};
pub use table::{EnumCell, SpecRow, SpecTable};
pub use util::{derive_cell_reference, derive_column_letters, derive_sum_formula};
