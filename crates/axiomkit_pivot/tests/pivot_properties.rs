use std::collections::BTreeMap;

use axiomkit_pivot::{
    C_SENTINEL_EMPTY, EnumCell, EnumTotalsMode, PivotError, SpecPivotOptions, SpecRow, SpecTable,
    pivot_into, pivot_table, pivot_tables,
};

/// `(role, order, aggregation, name)` per source column.
type FieldDef<'a> = (&'a str, f64, &'a str, &'a str);

fn build_source(fields: &[FieldDef<'_>], rows: Vec<Vec<EnumCell>>) -> SpecTable {
    let mut l_rows = vec![
        SpecRow::from_cells(fields.iter().map(|f| f.0)),
        SpecRow::from_cells(fields.iter().map(|f| f.1)),
        SpecRow::from_cells(fields.iter().map(|f| f.2)),
        SpecRow::from_cells(fields.iter().map(|f| f.3)),
    ];
    l_rows.extend(rows.into_iter().map(SpecRow::from_cells));
    SpecTable::from_rows(l_rows)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn t(value: &str) -> EnumCell {
    EnumCell::text(value)
}

fn n(value: f64) -> EnumCell {
    EnumCell::Numeric(value)
}

fn region_quarter_source(aggregation: &str) -> SpecTable {
    build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("column", 0.0, "", "Quarter"),
            ("value", 0.0, aggregation, "Revenue"),
        ],
        vec![
            vec![t("North"), t("Q1"), n(100.0)],
            vec![t("North"), t("Q2"), n(150.0)],
            vec![t("South"), t("Q1"), n(80.0)],
            vec![t("South"), t("Q2"), n(120.0)],
        ],
    )
}

fn numbers(table: &SpecTable, n_idx_row: usize, cols: std::ops::Range<usize>) -> Vec<f64> {
    cols.map(|n_idx_col| table.cell(n_idx_row, n_idx_col).as_f64().unwrap_or(f64::NAN))
        .collect()
}

#[test]
fn test_region_quarter_sum_example() {
    init_tracing();
    let mut source = region_quarter_source("");
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    let table = &output.table;

    assert_eq!(output.table_width, 3);
    assert_eq!(output.layout.column_label_offset_x, 1);
    assert_eq!(output.layout.value_row_offset_y, 1);

    assert_eq!(table.cell(0, 0), &t("Quarter"));
    assert_eq!(table.cell(0, 1), &t("Q1"));
    assert_eq!(table.cell(0, 2), &t("Q2"));
    assert_eq!(table.cell(1, 0), &t("Region"));
    assert_eq!(table.cell(1, 1), &t("Revenue (sum)"));
    assert_eq!(table.cell(1, 2), &t("Revenue (sum)"));
    assert_eq!(table.cell(1, 3), &t("Total"));

    assert_eq!(table.cell(2, 0), &t("North"));
    assert_eq!(numbers(table, 2, 1..4), vec![100.0, 150.0, 250.0]);
    assert_eq!(table.cell(3, 0), &t("South"));
    assert_eq!(numbers(table, 3, 1..4), vec![80.0, 120.0, 200.0]);
    assert_eq!(table.cell(4, 0), &t("Total"));
    assert_eq!(numbers(table, 4, 1..4), vec![180.0, 270.0, 450.0]);
    assert_eq!(table.height(), 5);

    assert_eq!(output.report.cnt_rows_scanned, 4);
    assert_eq!(output.report.cnt_groups, 2);
    assert_eq!(output.report.cnt_cells_accumulated, 4);
    assert!(output.report.if_row_totals);
}

#[test]
fn test_nan_keys_group_together() {
    let mut source = build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("column", 0.0, "", "Year"),
            ("value", 0.0, "", "Revenue"),
        ],
        vec![
            vec![t("North"), n(f64::NAN), n(1.0)],
            vec![t("South"), n(f64::NAN), n(2.0)],
            vec![t("North"), n(2024.0), n(3.0)],
            vec![n(f64::NAN), n(f64::NAN), n(4.0)],
            vec![n(f64::NAN), n(2024.0), n(5.0)],
        ],
    );
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    let table = &output.table;

    assert_eq!(output.table_width, 3);
    assert!(table.cell(0, 1).is_same_group(&n(f64::NAN)));
    assert_eq!(table.cell(0, 2), &n(2024.0));

    assert_eq!(output.report.cnt_groups, 3);
    assert_eq!(numbers(table, 2, 1..4), vec![1.0, 3.0, 4.0]);
    assert_eq!(table.cell(3, 0), &t("South"));
    assert_eq!(table.cell(3, 1).as_f64(), Some(2.0));
    assert!(table.cell(3, 2).is_blank());
    assert!(table.cell(4, 0).is_same_group(&n(f64::NAN)));
    assert_eq!(numbers(table, 4, 1..4), vec![4.0, 5.0, 9.0]);
    assert_eq!(table.cell(5, 0), &t("Total"));
    assert_eq!(numbers(table, 5, 1..4), vec![7.0, 8.0, 15.0]);
}

#[test]
fn test_region_quarter_count_example() {
    let mut source = region_quarter_source("COUNT");
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    let table = &output.table;

    assert_eq!(table.cell(1, 1), &t("Revenue (count)"));
    assert_eq!(numbers(table, 2, 1..3), vec![1.0, 1.0]);
    assert_eq!(numbers(table, 3, 1..3), vec![1.0, 1.0]);
    assert_eq!(numbers(table, 4, 1..4), vec![2.0, 2.0, 4.0]);
}

#[test]
fn test_formula_totals_keep_body_values() {
    let mut source = region_quarter_source("");
    let options = SpecPivotOptions {
        rule_totals: EnumTotalsMode::Formula,
        ..SpecPivotOptions::default()
    };
    let output = pivot_table(&mut source, &options).expect("pivot");
    let table = &output.table;

    assert_eq!(numbers(table, 2, 1..3), vec![100.0, 150.0]);
    assert_eq!(table.cell(2, 3), &EnumCell::Formula("SUM(B3:C3)".to_string()));
    assert_eq!(table.cell(4, 1), &EnumCell::Formula("SUM(B3:B4)".to_string()));
    assert_eq!(table.cell(4, 3), &EnumCell::Formula("SUM(D3:D4)".to_string()));
}

#[test]
fn test_blank_keys_group_under_sentinel_with_literal_sentinel() {
    let mut source = build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("column", 0.0, "", "Quarter"),
            ("value", 0.0, "", "Revenue"),
        ],
        vec![
            vec![EnumCell::Blank, t("Q1"), n(1.0)],
            vec![t(""), t("Q1"), n(2.0)],
            vec![t(C_SENTINEL_EMPTY), t("Q1"), n(4.0)],
            vec![t("North"), EnumCell::Blank, n(8.0)],
        ],
    );
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    let table = &output.table;

    assert_eq!(output.report.cnt_cells_normalized, 3);
    assert_eq!(table.cell(0, 1), &t("Q1"));
    assert_eq!(table.cell(0, 2), &t(C_SENTINEL_EMPTY));
    assert_eq!(table.cell(2, 0), &t(C_SENTINEL_EMPTY));
    assert_eq!(table.cell(2, 1).as_f64(), Some(7.0));
    assert_eq!(table.cell(3, 0), &t("North"));
    assert!(table.cell(3, 1).is_blank());
    assert_eq!(table.cell(3, 2).as_f64(), Some(8.0));
    assert_eq!(output.report.cnt_groups, 2);
}

#[test]
fn test_two_value_fields_suppress_row_totals() {
    let mut source = build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("column", 0.0, "", "Quarter"),
            ("value", 0.0, "", "Revenue"),
            ("value", 1.0, "COUNT", "Orders"),
        ],
        vec![
            vec![t("North"), t("Q1"), n(10.0), EnumCell::Blank],
            vec![t("North"), t("Q1"), EnumCell::Blank, EnumCell::Blank],
            vec![t("North"), t("Q2"), n(5.0), EnumCell::Blank],
        ],
    );
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    let table = &output.table;

    assert_eq!(output.table_width, 5);
    assert_eq!(table.cell(1, 1), &t("Revenue (sum)"));
    assert_eq!(table.cell(1, 2), &t("Orders (count)"));
    // Count includes rows with blank values; Sum ignores them.
    assert_eq!(numbers(table, 2, 1..5), vec![10.0, 2.0, 5.0, 1.0]);
    assert!(table.cell(1, 5).is_blank());
    assert!(table.cell(2, 5).is_blank());
    assert_eq!(numbers(table, 3, 1..5), vec![10.0, 2.0, 5.0, 1.0]);
    assert!(table.cell(3, 5).is_blank());
    assert!(!output.report.if_row_totals);
    assert_eq!(output.report.warning_count(), 1);
}

#[test]
fn test_sum_of_only_blank_values_stays_blank() {
    let mut source = build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("column", 0.0, "", "Quarter"),
            ("value", 0.0, "", "Revenue"),
        ],
        vec![
            vec![t("North"), t("Q1"), EnumCell::Blank],
            vec![t("South"), t("Q1"), n(3.0)],
        ],
    );
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    assert!(output.table.cell(2, 1).is_blank());
    assert_eq!(output.table.cell(2, 2).as_f64(), Some(0.0));
    assert_eq!(output.table.cell(3, 1).as_f64(), Some(3.0));
}

#[test]
fn test_decorations_keep_first_seen_value() {
    let mut source = build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("deco", 0.0, "", "Manager"),
            ("column", 0.0, "", "Quarter"),
            ("value", 0.0, "", "Revenue"),
        ],
        vec![
            vec![t("North"), t("Ann"), t("Q1"), n(1.0)],
            vec![t("North"), t("Bob"), t("Q2"), n(2.0)],
            vec![t("South"), EnumCell::Blank, t("Q1"), n(3.0)],
            vec![t("South"), t("Cid"), t("Q1"), n(4.0)],
        ],
    );
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    let table = &output.table;

    assert_eq!(output.layout.column_label_offset_x, 2);
    assert_eq!(table.cell(0, 1), &t("Quarter"));
    assert_eq!(table.cell(1, 0), &t("Region"));
    assert_eq!(table.cell(1, 1), &t("Manager"));
    assert_eq!(table.cell(2, 1), &t("Ann"));
    // first South row had no manager; later rows never overwrite
    assert!(table.cell(3, 1).is_blank());
    assert_eq!(table.cell(3, 2).as_f64(), Some(7.0));
    assert!(table.cell(3, 3).is_blank());
    assert_eq!(table.cell(3, 4).as_f64(), Some(7.0));
}

#[test]
fn test_two_dimensions_place_values_in_cartesian_blocks() {
    let mut source = build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("column", 1.0, "", "Quarter"),
            ("column", 0.0, "", "Year"),
            ("value", 0.0, "", "Revenue"),
        ],
        vec![
            vec![t("North"), t("Q1"), n(2023.0), n(1.0)],
            vec![t("North"), t("Q2"), n(2024.0), n(2.0)],
            vec![t("South"), t("Q2"), n(2023.0), n(4.0)],
            vec![t("South"), t("Q1"), n(2024.0), n(8.0)],
            vec![t("South"), t("Q1"), n(2024.0), n(16.0)],
        ],
    );
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    let table = &output.table;

    // Year first (order 0), then Quarter.
    assert_eq!(output.table_width, 1 + 2 * 2);
    assert_eq!(table.cell(0, 0), &t("Year"));
    assert_eq!(table.cell(0, 1), &n(2023.0));
    assert!(table.cell(0, 2).is_blank());
    assert_eq!(table.cell(0, 3), &n(2024.0));
    assert_eq!(table.cell(1, 0), &t("Quarter"));
    assert_eq!(table.cell(1, 1), &t("Q1"));
    assert_eq!(table.cell(1, 2), &t("Q2"));
    assert_eq!(table.cell(1, 3), &t("Q1"));
    assert_eq!(table.cell(1, 4), &t("Q2"));
    assert_eq!(table.cell(2, 0), &t("Region"));

    // North: 2023/Q1=1, 2024/Q2=2
    assert_eq!(table.cell(3, 1).as_f64(), Some(1.0));
    assert!(table.cell(3, 2).is_blank());
    assert!(table.cell(3, 3).is_blank());
    assert_eq!(table.cell(3, 4).as_f64(), Some(2.0));
    // South: 2023/Q2=4, 2024/Q1=24
    assert!(table.cell(4, 1).is_blank());
    assert_eq!(table.cell(4, 2).as_f64(), Some(4.0));
    assert_eq!(table.cell(4, 3).as_f64(), Some(24.0));
    assert_eq!(numbers(table, 5, 1..6), vec![1.0, 4.0, 24.0, 2.0, 31.0]);
}

#[test]
fn test_generated_data_matches_reference_aggregation() {
    let l_regions = ["North", "South", "East"];
    let l_quarters = ["Q1", "Q2", "Q3", "Q4"];
    let mut l_rows = Vec::new();
    let mut dict_expected: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
    for n_idx in 0..60usize {
        let region = l_regions[(n_idx * 7) % l_regions.len()];
        let quarter = l_quarters[(n_idx + n_idx / 5) % l_quarters.len()];
        let value = ((n_idx * 13) % 17) as f64;
        l_rows.push(vec![t(region), t(quarter), n(value), n(value)]);
        let entry = dict_expected
            .entry((region.to_string(), quarter.to_string()))
            .or_insert((0.0, 0.0));
        entry.0 += value;
        entry.1 += 1.0;
    }
    let mut source = build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("column", 0.0, "", "Quarter"),
            ("value", 0.0, "", "Amount"),
            ("value", 1.0, "COUNT", "Amount"),
        ],
        l_rows,
    );
    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    let table = &output.table;
    let n_first = output.layout.first_data_row_y();
    let n_end = n_first + output.report.cnt_groups as usize;

    // one target row per distinct region
    let l_labels: Vec<&EnumCell> = (n_first..n_end).map(|y| table.cell(y, 0)).collect();
    for region in l_regions {
        assert_eq!(l_labels.iter().filter(|c| ***c == t(region)).count(), 1);
    }

    // one column pair per distinct quarter
    let l_quarter_header: Vec<&EnumCell> = (1..output.table_width)
        .map(|x| table.cell(0, x))
        .filter(|c| !c.is_blank())
        .collect();
    assert_eq!(l_quarter_header.len(), l_quarters.len());

    for y in n_first..n_end {
        let region = table.cell(y, 0).to_string();
        for x in (1..output.table_width).step_by(2) {
            let quarter = table.cell(0, x).to_string();
            let (n_sum, n_count) = dict_expected
                .get(&(region.clone(), quarter))
                .copied()
                .unwrap_or((f64::NAN, f64::NAN));
            if n_sum.is_nan() {
                assert!(table.cell(y, x).is_blank());
                assert!(table.cell(y, x + 1).is_blank());
            } else {
                assert_eq!(table.cell(y, x).as_f64(), Some(n_sum));
                assert_eq!(table.cell(y, x + 1).as_f64(), Some(n_count));
            }
        }
    }
    assert_eq!(output.report.cnt_rows_scanned, 60);
}

#[test]
fn test_non_numeric_value_aborts_before_mutation() {
    let mut source = build_source(
        &[
            ("row", 0.0, "", "Region"),
            ("column", 0.0, "", "Quarter"),
            ("value", 0.0, "", "Revenue"),
        ],
        vec![
            vec![EnumCell::Blank, t("Q1"), n(1.0)],
            vec![t("North"), t("Q1"), t("lots")],
        ],
    );
    let snapshot = source.clone();
    let mut target = SpecTable::new();

    let err = pivot_into(&mut source, &mut target, &SpecPivotOptions::default())
        .expect_err("must fail");
    assert!(matches!(err, PivotError::NonNumericValueCell { .. }));
    assert_eq!(source, snapshot);
    assert!(target.is_empty());
}

#[test]
fn test_missing_row_role_aborts() {
    let mut source = build_source(
        &[("column", 0.0, "", "Quarter"), ("value", 0.0, "", "Revenue")],
        vec![vec![t("Q1"), n(1.0)]],
    );
    let err = pivot_table(&mut source, &SpecPivotOptions::default()).expect_err("must fail");
    assert!(matches!(err, PivotError::MissingRowRole));
}

#[test]
fn test_strict_roles_reject_degenerate_catalog() {
    let mut source = build_source(
        &[("row", 0.0, "", "Region"), ("value", 0.0, "", "Revenue")],
        vec![vec![t("North"), n(1.0)]],
    );
    let options = SpecPivotOptions {
        if_require_full_roles: true,
        ..SpecPivotOptions::default()
    };
    assert!(matches!(
        pivot_table(&mut source, &options),
        Err(PivotError::InvalidOptions(_))
    ));

    let output = pivot_table(&mut source, &SpecPivotOptions::default()).expect("pivot");
    assert_eq!(output.table.cell(0, 1), &t("Revenue (sum)"));
    assert_eq!(output.table.cell(1, 1).as_f64(), Some(1.0));
    assert_eq!(output.report.warning_count(), 1);
}

#[test]
fn test_pivot_into_rejects_non_empty_target() {
    let mut source = region_quarter_source("");
    let mut target = SpecTable::new();
    target.set_cell(0, 0, "stale");
    assert!(matches!(
        pivot_into(&mut source, &mut target, &SpecPivotOptions::default()),
        Err(PivotError::TargetNotEmpty)
    ));

    let mut target = SpecTable::new();
    let report =
        pivot_into(&mut source, &mut target, &SpecPivotOptions::default()).expect("pivot");
    assert_eq!(report.cnt_groups, 2);
    assert_eq!(target.cell(4, 3).as_f64(), Some(450.0));
}

#[test]
fn test_batch_pivot_keeps_input_order() {
    init_tracing();
    let l_sources = vec![
        region_quarter_source(""),
        region_quarter_source("COUNT"),
        build_source(&[("value", 0.0, "", "Revenue")], vec![vec![n(1.0)]]),
    ];
    let options = SpecPivotOptions {
        num_workers_max: Some(2),
        ..SpecPivotOptions::default()
    };
    let l_results = pivot_tables(l_sources, &options);

    assert_eq!(l_results.len(), 3);
    let output_sum = l_results[0].as_ref().expect("sum pivot");
    assert_eq!(output_sum.table.cell(4, 3).as_f64(), Some(450.0));
    let output_count = l_results[1].as_ref().expect("count pivot");
    assert_eq!(output_count.table.cell(4, 3).as_f64(), Some(4.0));
    assert!(matches!(l_results[2], Err(PivotError::MissingRowRole)));
}
