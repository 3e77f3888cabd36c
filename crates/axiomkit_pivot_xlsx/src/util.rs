//! Stateless helper utilities used by the XLSX pivot writer.

use std::collections::{BTreeMap, BTreeSet};

use axiomkit_pivot::util::derive_cell_text;
use axiomkit_pivot::{EnumCell, SpecPivotOutput};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumPivotRegion, PivotXlsxError, SpecSheetHorizontalMerge};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Return `name` or the first free `name__N` (N >= 2), and record it as taken.
pub fn derive_unique_sheet_name(set_names_existing: &mut BTreeSet<String>, name: &str) -> String {
    if set_names_existing.insert(name.to_string()) {
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();
        if set_names_existing.insert(candidate.clone()) {
            return candidate;
        }
        n_idx += 1;
    }
}

/// Reject pivot outputs that do not fit one worksheet.
pub fn validate_sheet_extent(n_rows: usize, n_cols: usize) -> Result<(), PivotXlsxError> {
    if n_rows > N_NROWS_EXCEL_MAX || n_cols > N_NCOLS_EXCEL_MAX {
        return Err(PivotXlsxError::IndexOverflow(format!(
            "Pivot output {n_rows}x{n_cols} exceeds Excel sheet limit \
             {N_NROWS_EXCEL_MAX}x{N_NCOLS_EXCEL_MAX}."
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RegionClassification

/// Classify target cell `(n_idx_row, n_idx_col)` of `output` by pivot region.
pub fn classify_pivot_region(
    output: &SpecPivotOutput,
    n_idx_row: usize,
    n_idx_col: usize,
) -> EnumPivotRegion {
    let layout = &output.layout;
    if n_idx_row < layout.value_row_offset_y {
        return EnumPivotRegion::Header;
    }
    if n_idx_row == layout.value_row_offset_y {
        return EnumPivotRegion::Field;
    }
    let if_totals_row =
        output.report.if_column_totals && n_idx_row + 1 == output.table.height();
    if if_totals_row || n_idx_col >= output.table_width {
        return EnumPivotRegion::Total;
    }
    if n_idx_col < layout.column_label_offset_x {
        return EnumPivotRegion::Label;
    }
    EnumPivotRegion::Body
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderMergeUtils

/// Plan one horizontal merge per header value followed by blank placeholders.
///
/// Only the column-dimension rows take part; a run ends at the next stored
/// non-blank cell or at the header width.
pub fn plan_header_merges(
    output: &SpecPivotOutput,
) -> BTreeMap<usize, Vec<SpecSheetHorizontalMerge>> {
    let mut dict_horizontal_merges_map = BTreeMap::new();
    let n_col_start = output.layout.column_label_offset_x;
    let n_col_end = output.table_width;

    for n_idx_row in 0..output.layout.value_row_offset_y {
        let Some(row) = output.table.row(n_idx_row) else {
            continue;
        };

        let mut n_col_idx = n_col_start;
        while n_col_idx < n_col_end {
            let cell = row.cell(n_col_idx);
            if cell.is_blank() {
                n_col_idx += 1;
                continue;
            }

            let mut n_col_idx_end = n_col_idx + 1;
            while n_col_idx_end < n_col_end && row.cell(n_col_idx_end).is_blank() {
                n_col_idx_end += 1;
            }

            if n_col_idx_end - n_col_idx > 1 {
                dict_horizontal_merges_map
                    .entry(n_idx_row)
                    .or_insert_with(Vec::new)
                    .push(SpecSheetHorizontalMerge {
                        row_idx_start: n_idx_row,
                        col_idx_start: n_col_idx,
                        col_idx_end: n_col_idx_end - 1,
                        text: derive_cell_text(cell),
                        cell: cell.clone(),
                    });
            }
            n_col_idx = n_col_idx_end;
        }
    }

    dict_horizontal_merges_map
}

/// Build lookup set for cells covered by a horizontal merge (anchor included).
pub fn derive_horizontal_merge_tracker(
    row_horizontal_merge_mapping: &BTreeMap<usize, Vec<SpecSheetHorizontalMerge>>,
) -> BTreeSet<(usize, usize)> {
    let mut set_merged_cells = BTreeSet::new();

    for (row_idx, horizontal_merges) in row_horizontal_merge_mapping {
        for merge in horizontal_merges {
            for col_idx in merge.col_idx_start..=merge.col_idx_end {
                set_merged_cells.insert((*row_idx, col_idx));
            }
        }
    }

    set_merged_cells
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthAndIndex

/// Estimate displayed width units for one target cell.
pub fn estimate_width_len(cell: &EnumCell) -> usize {
    match cell {
        EnumCell::Blank => 0,
        EnumCell::Numeric(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                derive_cell_text(cell).len()
            } else {
                format!("{n:.2}").len()
            }
        }
        EnumCell::Formula(_) => 10,
        _ => estimate_unicode_string_width(&cell.to_string()),
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Cast a zero-based row index to the worksheet row type.
pub fn cast_row_num(value: usize) -> Result<u32, PivotXlsxError> {
    u32::try_from(value)
        .map_err(|_| PivotXlsxError::IndexOverflow(format!("row index overflow: {value}")))
}

/// Cast a zero-based column index to the worksheet column type.
pub fn cast_col_num(value: usize) -> Result<u16, PivotXlsxError> {
    u16::try_from(value)
        .map_err(|_| PivotXlsxError::IndexOverflow(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use axiomkit_pivot::{ReportPivot, SpecPivotLayout, SpecRow, SpecTable};

    fn output_two_dims() -> SpecPivotOutput {
        // Region x Year x Quarter, one value: header rows 0..2, field row 2.
        let mut table = SpecTable::new();
        table.push_row(SpecRow::from_cells(vec![
            EnumCell::Blank,
            EnumCell::text("Year"),
            EnumCell::Numeric(2023.0),
            EnumCell::Blank,
            EnumCell::Numeric(2024.0),
            EnumCell::Blank,
        ]));
        table.push_row(SpecRow::from_cells(vec![
            EnumCell::Blank,
            EnumCell::text("Quarter"),
            EnumCell::text("Q1"),
            EnumCell::text("Q2"),
            EnumCell::text("Q1"),
            EnumCell::text("Q2"),
        ]));
        table.push_row(SpecRow::from_cells(vec!["Region", "Units (sum)"]));
        table.push_row(SpecRow::from_cells(vec![EnumCell::text("North"), 1.0.into()]));
        table.push_row(SpecRow::from_cells(vec![EnumCell::text("Total"), 1.0.into()]));

        SpecPivotOutput {
            table,
            layout: SpecPivotLayout {
                column_label_offset_x: 2,
                value_row_offset_y: 2,
                deco_offset_x: 1,
            },
            table_width: 6,
            report: ReportPivot {
                if_column_totals: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_sanitize_sheet_name_replaces_illegal_and_truncates() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_derive_unique_sheet_name_suffixes_duplicates() {
        let mut set_names = BTreeSet::new();
        assert_eq!(derive_unique_sheet_name(&mut set_names, "Pivot"), "Pivot");
        assert_eq!(derive_unique_sheet_name(&mut set_names, "Pivot"), "Pivot__2");
        assert_eq!(derive_unique_sheet_name(&mut set_names, "Pivot"), "Pivot__3");
    }

    #[test]
    fn test_plan_header_merges_spans_blank_placeholders() {
        let output = output_two_dims();
        let dict_merges = plan_header_merges(&output);

        assert_eq!(dict_merges.len(), 1);
        let l_merges = &dict_merges[&0];
        assert_eq!(l_merges.len(), 2);
        assert_eq!((l_merges[0].col_idx_start, l_merges[0].col_idx_end), (2, 3));
        assert_eq!(l_merges[0].text, "2023");
        assert_eq!(l_merges[0].cell, EnumCell::Numeric(2023.0));
        assert_eq!(l_merges[1].cell, EnumCell::Numeric(2024.0));
        assert_eq!((l_merges[1].col_idx_start, l_merges[1].col_idx_end), (4, 5));

        let set_tracked = derive_horizontal_merge_tracker(&dict_merges);
        assert!(set_tracked.contains(&(0, 3)));
        assert!(!set_tracked.contains(&(1, 3)));
    }

    #[test]
    fn test_classify_pivot_region() {
        let output = output_two_dims();
        assert_eq!(classify_pivot_region(&output, 0, 2), EnumPivotRegion::Header);
        assert_eq!(classify_pivot_region(&output, 2, 0), EnumPivotRegion::Field);
        assert_eq!(classify_pivot_region(&output, 3, 0), EnumPivotRegion::Label);
        assert_eq!(classify_pivot_region(&output, 3, 2), EnumPivotRegion::Body);
        assert_eq!(classify_pivot_region(&output, 3, 6), EnumPivotRegion::Total);
        assert_eq!(classify_pivot_region(&output, 4, 0), EnumPivotRegion::Total);
    }

    #[test]
    fn test_estimate_width_len() {
        assert_eq!(estimate_width_len(&EnumCell::Blank), 0);
        assert_eq!(estimate_width_len(&EnumCell::Numeric(1200.0)), 4);
        assert_eq!(estimate_width_len(&EnumCell::text("东区")), 3);
    }
}
