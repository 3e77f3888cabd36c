//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Preset key for label/decoration cells.
pub const C_FMT_KEY_TEXT: &str = "text";
/// Preset key for column-dimension header cells.
pub const C_FMT_KEY_HEADER: &str = "header";
/// Preset key for the field-name row.
pub const C_FMT_KEY_FIELD: &str = "field";
/// Preset key for aggregated body cells.
pub const C_FMT_KEY_NUMBER: &str = "number";
/// Preset key for totals cells.
pub const C_FMT_KEY_TOTAL: &str = "total";

/// Build default named format presets used by [`crate::writer::PivotXlsxWriter`].
pub fn derive_default_pivot_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Times New Roman".to_string()),
        font_size: Some(11),
        border: Some(1),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(C_FMT_KEY_TEXT.to_string(), cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        C_FMT_KEY_HEADER.to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        C_FMT_KEY_FIELD.to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            bg_color: Some("#D9E1F2".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        C_FMT_KEY_NUMBER.to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some("right".to_string()),
            num_format: Some("#,##0.##".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        C_FMT_KEY_TOTAL.to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("right".to_string()),
            num_format: Some("#,##0.##".to_string()),
            bg_color: Some("#F2F2F2".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}
