//! Stateless helper utilities used by the pivot kernel.

use crate::table::EnumCell;

////////////////////////////////////////////////////////////////////////////////
// #region CellConversion

/// Display text of a header cell; blank reads as empty string.
pub fn derive_cell_text(cell: &EnumCell) -> String {
    match cell {
        EnumCell::Text(s) => s.clone(),
        EnumCell::Numeric(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
        other => other.to_string(),
    }
}

/// Read an order key; non-numeric or unparsable cells order as `0`.
pub fn convert_cell_to_order(cell: &EnumCell) -> i32 {
    match cell {
        EnumCell::Numeric(n) if n.is_finite() => *n as i32,
        EnumCell::Text(s) => s.trim().parse::<i32>().unwrap_or(0),
        _ => 0,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region A1Notation

/// Convert a zero-based column index to spreadsheet letters (`0 -> A`, `26 -> AA`).
pub fn derive_column_letters(n_idx_col: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = n_idx_col + 1;
    while n_rest > 0 {
        let n_rem = (n_rest - 1) % 26;
        l_chars.push((b'A' + n_rem as u8) as char);
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// A1 reference for zero-based `(row, col)`.
pub fn derive_cell_reference(n_idx_row: usize, n_idx_col: usize) -> String {
    format!("{}{}", derive_column_letters(n_idx_col), n_idx_row + 1)
}

/// `SUM(..)` over the inclusive zero-based rectangle.
pub fn derive_sum_formula(
    n_row_start: usize,
    n_col_start: usize,
    n_row_end: usize,
    n_col_end: usize,
) -> String {
    format!(
        "SUM({}:{})",
        derive_cell_reference(n_row_start, n_col_start),
        derive_cell_reference(n_row_end, n_col_end)
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Workers

/// Clamp requested worker count to available parallelism.
pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
