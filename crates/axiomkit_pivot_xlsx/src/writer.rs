//! XLSX writer kernel that serializes pivot outputs into workbook sheets.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use axiomkit_pivot::{EnumCell, SpecPivotOutput};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{
    C_FMT_KEY_FIELD, C_FMT_KEY_HEADER, C_FMT_KEY_NUMBER, C_FMT_KEY_TEXT, C_FMT_KEY_TOTAL,
    derive_default_pivot_xlsx_formats,
};
use crate::spec::{
    EnumAutofitColumnsRule, EnumPivotRegion, PivotXlsxError, SpecCellFormat,
    SpecPivotSheetReport, SpecPivotSheetWriteOptions,
};
use crate::util::{
    cast_col_num, cast_row_num, classify_pivot_region, derive_horizontal_merge_tracker,
    derive_unique_sheet_name, estimate_width_len, plan_header_merges, sanitize_sheet_name,
    validate_sheet_extent,
};

/// Resolved workbook formats, one per pivot region.
struct SpecRegionFormats {
    header: Format,
    field: Format,
    label: Format,
    body: Format,
    total: Format,
}

impl SpecRegionFormats {
    fn get(&self, region: EnumPivotRegion) -> &Format {
        match region {
            EnumPivotRegion::Header => &self.header,
            EnumPivotRegion::Field => &self.field,
            EnumPivotRegion::Label => &self.label,
            EnumPivotRegion::Body => &self.body,
            EnumPivotRegion::Total => &self.total,
        }
    }
}

/// Stateful workbook writer.
pub struct PivotXlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    dict_fmt_by_region: BTreeMap<EnumPivotRegion, SpecCellFormat>,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecPivotSheetReport>,
    if_closed: bool,
}

impl PivotXlsxWriter {
    /// Create writer bound to output path and named format presets.
    ///
    /// Preset keys are `text`, `header`, `field`, `number` and `total`; a
    /// missing key falls back to the default preset. The workbook is buffered
    /// in memory until [`Self::close`] is called.
    pub fn new(
        path_file_out: PathBuf,
        dict_fmt_presets: BTreeMap<String, SpecCellFormat>,
    ) -> Self {
        let dict_fmt_default = derive_default_pivot_xlsx_formats();
        let mut dict_fmt_by_region = BTreeMap::new();
        for (c_key, region) in [
            (C_FMT_KEY_HEADER, EnumPivotRegion::Header),
            (C_FMT_KEY_FIELD, EnumPivotRegion::Field),
            (C_FMT_KEY_TEXT, EnumPivotRegion::Label),
            (C_FMT_KEY_NUMBER, EnumPivotRegion::Body),
            (C_FMT_KEY_TOTAL, EnumPivotRegion::Total),
        ] {
            let fmt_spec = dict_fmt_presets
                .get(c_key)
                .or_else(|| dict_fmt_default.get(c_key))
                .cloned()
                .unwrap_or_default();
            dict_fmt_by_region.insert(region, fmt_spec);
        }

        Self {
            path_file_out,
            workbook: Workbook::new(),
            dict_fmt_by_region,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Create writer with the default format presets.
    pub fn with_default_formats(path_file_out: PathBuf) -> Self {
        Self::new(path_file_out, BTreeMap::new())
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecPivotSheetReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), PivotXlsxError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        Ok(())
    }

    /// Write one pivot output as a new sheet.
    ///
    /// Cells keep their target coordinates. Header placeholders are merged
    /// into their dimension value when `options.if_merge_header` is set.
    pub fn write_pivot_sheet(
        &mut self,
        output: &SpecPivotOutput,
        sheet_name: &str,
        options: &SpecPivotSheetWriteOptions,
    ) -> Result<(), PivotXlsxError> {
        if self.if_closed {
            return Err(PivotXlsxError::WriterClosed);
        }

        let n_rows = output.table.height();
        let n_cols = usize::max(output.table.width(), output.table_width);
        validate_sheet_extent(n_rows, n_cols)?;

        let mut report = SpecPivotSheetReport {
            n_rows,
            n_cols,
            ..Default::default()
        };
        let sheet_name_unique = derive_unique_sheet_name(
            &mut self.set_sheet_names_existing,
            &sanitize_sheet_name(sheet_name, "_"),
        );
        if sheet_name_unique != sheet_name {
            report.warn(format!(
                "Sheet name {sheet_name:?} written as {sheet_name_unique:?}."
            ));
        }
        let fmts = self.derive_region_formats(options);

        let dict_header_merges = if options.if_merge_header {
            plan_header_merges(output)
        } else {
            BTreeMap::new()
        };
        let set_merged_cells = derive_horizontal_merge_tracker(&dict_header_merges);

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        let mut l_width_by_col_header = vec![0usize; n_cols];
        let mut l_width_by_col_body = vec![0usize; n_cols];
        for (n_idx_row, row) in output.table.rows().iter().enumerate() {
            for (n_idx_col, cell) in row.iter() {
                if set_merged_cells.contains(&(n_idx_row, n_idx_col)) {
                    continue;
                }
                let region = classify_pivot_region(output, n_idx_row, n_idx_col);
                write_cell_with_format(worksheet, n_idx_row, n_idx_col, cell, fmts.get(region))?;

                let n_width = estimate_width_len(cell);
                let l_width_by_col = match region {
                    EnumPivotRegion::Header | EnumPivotRegion::Field => {
                        &mut l_width_by_col_header
                    }
                    _ => &mut l_width_by_col_body,
                };
                if let Some(n_width_recorded) = l_width_by_col.get_mut(n_idx_col) {
                    *n_width_recorded = usize::max(*n_width_recorded, n_width);
                }
            }
        }

        for merge in dict_header_merges.values().flatten() {
            worksheet.merge_range(
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_start)?,
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_end)?,
                &merge.text,
                &fmts.header,
            )?;
            write_cell_with_format(
                worksheet,
                merge.row_idx_start,
                merge.col_idx_start,
                &merge.cell,
                &fmts.header,
            )?;
            report.cnt_merges += 1;
        }

        if options.if_freeze_panes && n_rows > output.layout.first_data_row_y() {
            worksheet.set_freeze_panes(
                cast_row_num(output.layout.first_data_row_y())?,
                cast_col_num(output.layout.column_label_offset_x)?,
            )?;
        }

        let policy = &options.policy_autofit;
        if policy.rule_columns != EnumAutofitColumnsRule::None {
            for n_idx_col in 0..n_cols {
                let n_width_recorded = match policy.rule_columns {
                    EnumAutofitColumnsRule::Header => l_width_by_col_header[n_idx_col],
                    EnumAutofitColumnsRule::Body => l_width_by_col_body[n_idx_col],
                    EnumAutofitColumnsRule::All | EnumAutofitColumnsRule::None => usize::max(
                        l_width_by_col_header[n_idx_col],
                        l_width_by_col_body[n_idx_col],
                    ),
                };
                let n_width_final = usize::min(
                    policy.width_cell_max,
                    usize::max(
                        policy.width_cell_min,
                        n_width_recorded + policy.width_cell_padding,
                    ),
                );
                worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width_final as f64)?;
            }
        }

        report.sheet_name = sheet_name_unique;
        tracing::info!(
            sheet_name = %report.sheet_name,
            n_rows,
            n_cols,
            cnt_merges = report.cnt_merges,
            "pivot sheet written"
        );
        self.l_reports.push(report);
        Ok(())
    }

    fn derive_region_formats(&self, options: &SpecPivotSheetWriteOptions) -> SpecRegionFormats {
        let derive_format = |region: EnumPivotRegion| {
            let fmt_base = self
                .dict_fmt_by_region
                .get(&region)
                .cloned()
                .unwrap_or_default();
            let fmt_spec = match options.dict_fmt_overrides.get(&region) {
                Some(fmt_patch) => fmt_base.merge(fmt_patch),
                None => fmt_base,
            };
            derive_rust_xlsx_format(&fmt_spec)
        };

        SpecRegionFormats {
            header: derive_format(EnumPivotRegion::Header),
            field: derive_format(EnumPivotRegion::Field),
            label: derive_format(EnumPivotRegion::Label),
            body: derive_format(EnumPivotRegion::Body),
            total: derive_format(EnumPivotRegion::Total),
        }
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    cell: &EnumCell,
    format: &Format,
) -> Result<(), PivotXlsxError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match cell {
        EnumCell::Blank => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCell::Numeric(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCell::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
        EnumCell::Text(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCell::Formula(val) => {
            worksheet.write_formula_with_format(n_row, n_col, val.as_str(), format)?;
        }
        EnumCell::Error(_) => {
            worksheet.write_string_with_format(n_row, n_col, cell.to_string(), format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}
