use std::collections::BTreeMap;
use std::path::PathBuf;

use axiomkit_pivot::{
    EnumAggregation, EnumPivotRole, EnumTotalsMode, ReportPivot, SpecPivotOptions, pivot_tables,
};
use axiomkit_pivot_xlsx::{
    EnumAutofitColumnsRule, PivotXlsxError, PivotXlsxWriter, SpecAutofitCellsPolicy,
    SpecPivotField, SpecPivotSheetReport, SpecPivotSheetWriteOptions,
    derive_source_table_from_ipc_bytes,
};
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "axiomkit.pivot.ipc_to_xlsx.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

/// `(name, role, order, aggregation)` as passed from Python.
type FieldTuple = (String, String, i32, String);
/// `(sheet_name, ipc_bytes, fields)` as passed from Python.
type SheetTuple = (String, Vec<u8>, Vec<FieldTuple>);

#[pyclass(name = "ReportPivot")]
#[derive(Debug, Clone)]
struct PyReportPivot {
    #[pyo3(get)]
    cnt_rows_scanned: u64,
    #[pyo3(get)]
    cnt_cells_normalized: u64,
    #[pyo3(get)]
    cnt_groups: u64,
    #[pyo3(get)]
    cnt_cells_accumulated: u64,
    #[pyo3(get)]
    n_width_table: u64,
    #[pyo3(get)]
    if_row_totals: bool,
    #[pyo3(get)]
    if_column_totals: bool,
    #[pyo3(get)]
    warnings: Vec<String>,
    c_summary: String,
    dict_counts: BTreeMap<String, u64>,
}

impl From<ReportPivot> for PyReportPivot {
    fn from(report_pivot: ReportPivot) -> Self {
        Self {
            c_summary: report_pivot.format("[PIVOT]"),
            dict_counts: report_pivot.to_dict(),
            cnt_rows_scanned: report_pivot.cnt_rows_scanned,
            cnt_cells_normalized: report_pivot.cnt_cells_normalized,
            cnt_groups: report_pivot.cnt_groups,
            cnt_cells_accumulated: report_pivot.cnt_cells_accumulated,
            n_width_table: report_pivot.n_width_table,
            if_row_totals: report_pivot.if_row_totals,
            if_column_totals: report_pivot.if_column_totals,
            warnings: report_pivot.warnings,
        }
    }
}

#[pymethods]
impl PyReportPivot {
    #[getter]
    fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.dict_counts.clone()
    }

    fn __str__(&self) -> String {
        self.c_summary.clone()
    }
}

#[pyclass(name = "PivotSheetReport")]
#[derive(Debug, Clone)]
struct PyPivotSheetReport {
    #[pyo3(get)]
    sheet_name: String,
    #[pyo3(get)]
    n_rows: usize,
    #[pyo3(get)]
    n_cols: usize,
    #[pyo3(get)]
    cnt_merges: usize,
    #[pyo3(get)]
    warnings: Vec<String>,
    #[pyo3(get)]
    pivot: PyReportPivot,
}

impl PyPivotSheetReport {
    fn new(report_pivot: ReportPivot, report_sheet: SpecPivotSheetReport) -> Self {
        Self {
            sheet_name: report_sheet.sheet_name,
            n_rows: report_sheet.n_rows,
            n_cols: report_sheet.n_cols,
            cnt_merges: report_sheet.cnt_merges,
            warnings: report_sheet.warnings,
            pivot: PyReportPivot::from(report_pivot),
        }
    }
}

#[pymethods]
impl PyPivotSheetReport {
    fn __str__(&self) -> String {
        format!(
            "[SHEET] name={} rows={} cols={} merges={} warnings={} | {}",
            self.sheet_name,
            self.n_rows,
            self.n_cols,
            self.cnt_merges,
            self.warnings.len(),
            self.pivot.c_summary
        )
    }
}

fn parse_role(value: &str) -> PyResult<EnumPivotRole> {
    match value {
        "row" => Ok(EnumPivotRole::Row),
        "column" => Ok(EnumPivotRole::Column),
        "value" => Ok(EnumPivotRole::Value),
        "deco" => Ok(EnumPivotRole::Decoration),
        _ => Err(PyValueError::new_err(format!(
            "Invalid pivot role: `{value}`. Expected one of: ['row', 'column', 'value', 'deco']"
        ))),
    }
}

fn parse_aggregation(value: &str) -> PyResult<EnumAggregation> {
    match value {
        "sum" => Ok(EnumAggregation::Sum),
        "count" => Ok(EnumAggregation::Count),
        _ => Err(PyValueError::new_err(format!(
            "Invalid aggregation: `{value}`. Expected one of: ['sum', 'count']"
        ))),
    }
}

fn parse_rule_totals(value: &str) -> PyResult<EnumTotalsMode> {
    match value {
        "value" => Ok(EnumTotalsMode::Value),
        "formula" => Ok(EnumTotalsMode::Formula),
        _ => Err(PyValueError::new_err(format!(
            "Invalid totals mode: `{value}`. Expected one of: ['value', 'formula']"
        ))),
    }
}

fn parse_rule_autofit_columns(value: &str) -> PyResult<EnumAutofitColumnsRule> {
    match value {
        "none" => Ok(EnumAutofitColumnsRule::None),
        "header" => Ok(EnumAutofitColumnsRule::Header),
        "body" => Ok(EnumAutofitColumnsRule::Body),
        "all" => Ok(EnumAutofitColumnsRule::All),
        _ => Err(PyValueError::new_err(format!(
            "Invalid autofit rule: `{value}`. Expected one of: ['none', 'header', 'body', 'all']"
        ))),
    }
}

fn parse_fields(l_fields: Vec<FieldTuple>) -> PyResult<Vec<SpecPivotField>> {
    l_fields
        .into_iter()
        .map(|(name, role, order, aggregation)| {
            Ok(SpecPivotField::new(name, parse_role(&role)?)
                .with_order(order)
                .with_aggregation(parse_aggregation(&aggregation)?))
        })
        .collect()
}

fn map_pivot_xlsx_error(exception: PivotXlsxError) -> PyErr {
    match exception {
        PivotXlsxError::Xlsx(err) => PyOSError::new_err(err.to_string()),
        PivotXlsxError::WriterClosed => PyRuntimeError::new_err(exception.to_string()),
        _ => PyValueError::new_err(exception.to_string()),
    }
}

fn run_pivot_ipc_to_xlsx(
    path_file_out: PathBuf,
    l_sheets: Vec<(String, Vec<u8>, Vec<SpecPivotField>)>,
    options_pivot: &SpecPivotOptions,
    options_sheet: &SpecPivotSheetWriteOptions,
) -> Result<Vec<(ReportPivot, SpecPivotSheetReport)>, PivotXlsxError> {
    let mut l_sheet_names = Vec::with_capacity(l_sheets.len());
    let mut l_sources = Vec::with_capacity(l_sheets.len());
    for (sheet_name, v_ipc_df, l_fields) in l_sheets {
        l_sources.push(derive_source_table_from_ipc_bytes(&v_ipc_df, &l_fields)?);
        l_sheet_names.push(sheet_name);
    }

    let l_outputs = pivot_tables(l_sources, options_pivot)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let mut writer = PivotXlsxWriter::with_default_formats(path_file_out);
    for (sheet_name, output) in l_sheet_names.iter().zip(&l_outputs) {
        writer.write_pivot_sheet(output, sheet_name, options_sheet)?;
    }
    writer.close()?;

    Ok(l_outputs
        .into_iter()
        .map(|output| output.report)
        .zip(writer.report())
        .collect())
}

#[pyfunction(name = "pivot_ipc_to_xlsx")]
#[pyo3(signature = (
    file_out,
    sheets,
    sentinel_empty = None,
    rule_totals = "value",
    if_emit_row_totals = true,
    if_emit_column_totals = true,
    if_require_full_roles = false,
    num_workers_max = None,
    if_freeze_panes = true,
    if_merge_header = true,
    rule_autofit_columns = "all"
))]
#[allow(clippy::too_many_arguments)]
fn pivot_ipc_to_xlsx_py(
    py: Python<'_>,
    file_out: String,
    sheets: Vec<SheetTuple>,
    sentinel_empty: Option<String>,
    rule_totals: &str,
    if_emit_row_totals: bool,
    if_emit_column_totals: bool,
    if_require_full_roles: bool,
    num_workers_max: Option<usize>,
    if_freeze_panes: bool,
    if_merge_header: bool,
    rule_autofit_columns: &str,
) -> PyResult<Vec<PyPivotSheetReport>> {
    let options_default = SpecPivotOptions::default();
    let options_pivot = SpecPivotOptions {
        sentinel_empty: sentinel_empty.unwrap_or(options_default.sentinel_empty.clone()),
        rule_totals: parse_rule_totals(rule_totals)?,
        if_emit_row_totals,
        if_emit_column_totals,
        if_require_full_roles,
        num_workers_max,
        ..options_default
    };
    let options_sheet = SpecPivotSheetWriteOptions {
        if_freeze_panes,
        if_merge_header,
        policy_autofit: SpecAutofitCellsPolicy {
            rule_columns: parse_rule_autofit_columns(rule_autofit_columns)?,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut l_sheets = Vec::with_capacity(sheets.len());
    for (sheet_name, v_ipc_df, l_fields) in sheets {
        l_sheets.push((sheet_name, v_ipc_df, parse_fields(l_fields)?));
    }

    let l_reports = py.allow_threads(|| {
        run_pivot_ipc_to_xlsx(
            PathBuf::from(file_out),
            l_sheets,
            &options_pivot,
            &options_sheet,
        )
    });
    let l_reports = l_reports.map_err(map_pivot_xlsx_error)?;
    Ok(l_reports
        .into_iter()
        .map(|(report_pivot, report_sheet)| PyPivotSheetReport::new(report_pivot, report_sheet))
        .collect())
}

#[pymodule]
fn _axiomkit_pivot_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportPivot>()?;
    module.add_class::<PyPivotSheetReport>()?;
    module.add_function(wrap_pyfunction!(pivot_ipc_to_xlsx_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
