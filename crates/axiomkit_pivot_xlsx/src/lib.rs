//! `axiomkit_pivot_xlsx` v1:
//! Polars source assembly and XLSX serialization around `axiomkit_pivot`.
//!
//! - `conf`   : Excel limits and default format presets
//! - `spec`   : formats, role assignment, write options, reports, errors
//! - `source` : annotated source table from a DataFrame or IPC bytes
//! - `util`   : pure helper functions
//! - `writer` : workbook writer kernel
pub mod conf;
pub mod source;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
    derive_default_pivot_xlsx_formats,
};
pub use source::{derive_source_table_from_dataframe, derive_source_table_from_ipc_bytes};
pub use spec::{
    EnumAutofitColumnsRule, EnumPivotRegion, PivotXlsxError, SpecAutofitCellsPolicy,
    SpecCellFormat, SpecPivotField, SpecPivotSheetReport, SpecPivotSheetWriteOptions,
    SpecSheetHorizontalMerge,
};
pub use util::{plan_header_merges, sanitize_sheet_name};
pub use writer::PivotXlsxWriter;
