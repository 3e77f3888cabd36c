//! Pivot orchestration: catalog, validation, normalization, header,
//! aggregation and totals for one source/target pair.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::aggregate::{SpecAggregateContext, aggregate_rows};
use crate::catalog::{build_role_catalog, validate_role_catalog};
use crate::header::build_header;
use crate::layout::{collect_column_axis, derive_pivot_layout};
use crate::normalize::{normalize_key_cells, validate_value_columns};
use crate::report::{ReportPivot, ReportPivotBuilder};
use crate::spec::{PivotError, SpecPivotLayout, SpecPivotOptions, SpecPivotOutput};
use crate::table::SpecTable;
use crate::totals::emit_totals;
use crate::util::calculate_worker_limit;

/// Cross-tabulate `source` into a new target table.
///
/// `source` must carry the four annotation rows (role, order, aggregation
/// type, field name) followed by data rows. Blank grouping keys in `source`
/// are replaced in place by the configured sentinel.
///
/// Validation runs as a complete pre-pass: on error neither the source nor
/// any target has been modified.
pub fn pivot_table(
    source: &mut SpecTable,
    options: &SpecPivotOptions,
) -> Result<SpecPivotOutput, PivotError> {
    let mut table = SpecTable::new();
    let (layout, table_width, report) = run_pivot(source, &mut table, options)?;
    Ok(SpecPivotOutput {
        table,
        layout,
        table_width,
        report,
    })
}

/// Cross-tabulate `source` into the caller-provided blank `target`.
///
/// Fails with [`PivotError::TargetNotEmpty`] when `target` already holds rows.
pub fn pivot_into(
    source: &mut SpecTable,
    target: &mut SpecTable,
    options: &SpecPivotOptions,
) -> Result<ReportPivot, PivotError> {
    run_pivot(source, target, options).map(|(_, _, report)| report)
}

/// Pivot independent sources on a bounded worker pool.
///
/// Results keep input order. Falls back to serial execution when the pool
/// cannot be built.
pub fn pivot_tables(
    sources: Vec<SpecTable>,
    options: &SpecPivotOptions,
) -> Vec<Result<SpecPivotOutput, PivotError>> {
    let n_workers_max = calculate_worker_limit(options.num_workers_max);
    let run_serial = |sources: Vec<SpecTable>| {
        sources
            .into_iter()
            .map(|mut source| pivot_table(&mut source, options))
            .collect::<Vec<_>>()
    };

    if n_workers_max <= 1 || sources.len() <= 1 {
        return run_serial(sources);
    }

    let thread_pool = ThreadPoolBuilder::new().num_threads(n_workers_max).build();
    let Ok(thread_pool) = thread_pool else {
        tracing::warn!(
            n_workers_max,
            "failed to initialize pivot thread pool; fallback to serial"
        );
        return run_serial(sources);
    };

    thread_pool.install(|| {
        sources
            .into_par_iter()
            .map(|mut source| pivot_table(&mut source, options))
            .collect::<Vec<_>>()
    })
}

fn run_pivot(
    source: &mut SpecTable,
    target: &mut SpecTable,
    options: &SpecPivotOptions,
) -> Result<(SpecPivotLayout, usize, ReportPivot), PivotError> {
    if !target.is_empty() {
        return Err(PivotError::TargetNotEmpty);
    }
    if options.sentinel_empty.is_empty() {
        return Err(PivotError::InvalidOptions(
            "sentinel_empty must be a non-empty string.".to_string(),
        ));
    }

    let catalog = build_role_catalog(source)?;
    if options.if_require_full_roles {
        validate_role_catalog(&catalog)?;
    }
    validate_value_columns(source, &catalog)?;
    tracing::debug!(
        n_columns = catalog.columns.len(),
        n_values = catalog.values.len(),
        n_decorations = catalog.decorations.len(),
        "pivot role catalog resolved"
    );

    let mut builder = ReportPivotBuilder::default();
    if catalog.columns.is_empty() {
        builder.add_warning("No column dimension: body collapses to one column per value field.");
    }
    if catalog.values.is_empty() {
        builder.add_warning("No value field: body is empty.");
    }

    let cnt_normalized = normalize_key_cells(source, &catalog, &options.sentinel_empty);
    builder.add_normalized(cnt_normalized as u64);

    let source: &SpecTable = source;
    let layout = derive_pivot_layout(&catalog);
    let axis = collect_column_axis(source, &catalog);
    let n_width_table = build_header(target, source, &catalog, &layout, &axis, options);
    builder.n_width_table = n_width_table as u64;

    let ctx = SpecAggregateContext {
        source,
        catalog: &catalog,
        layout: &layout,
        axis: &axis,
        n_width_table,
        options,
    };
    aggregate_rows(target, &ctx, &mut builder)?;
    emit_totals(
        target,
        &layout,
        n_width_table,
        catalog.values.len(),
        options,
        &mut builder,
    );

    let report = builder.build();
    tracing::info!(
        cnt_rows_scanned = report.cnt_rows_scanned,
        cnt_groups = report.cnt_groups,
        n_width_table,
        "{report}"
    );
    Ok((layout, n_width_table, report))
}
