use kpi_engine::loader::load_rows;
use kpi_engine::reports::comparison_rows;
use kpi_engine::{aggregate, compare, AliasTable, DeltaClass, EngineConfig, KpiKind, Row};
use std::io::Write;

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn mixed_format_rows_reconcile_to_canonical_metrics() {
    let rows: Vec<Row> = vec![
        [("Sales", "1,000"), ("Transactions", "40"), ("Labor", "300")]
            .into_iter()
            .collect(),
        [("Sales", "$500"), ("Transactions", "20"), ("Labor %", "25")]
            .into_iter()
            .collect(),
    ];
    let m = aggregate(&rows);
    assert_eq!(m.sales, 1500.0);
    assert_eq!(m.transactions, 60.0);
    assert_eq!(m.labor_dollars, Some(300.0));
    assert_eq!(m.labor_pct, Some(300.0 / 1500.0 * 100.0));
    assert_eq!(m.avg_ticket, Some(25.0));
}

#[test]
fn week_against_normalized_month() {
    let week = csv_file(
        "Store, Net Sales ,TRANS,Labor $\n\
         1,\"$6,000\",240,\"1,500\"\n\
         2,\"$4,000\",160,\"1,000\"\n",
    );
    let month = csv_file(
        "Store,Revenue,Tickets,Labor Pct\n\
         1,\"32,000\",1600,20%\n\
         2,\"8,000\",400,30%\n",
    );
    let config = EngineConfig::default();

    let (week_rows, week_report) = load_rows(week.path(), &config.aliases).unwrap();
    let (month_rows, _) = load_rows(month.path(), &config.aliases).unwrap();
    assert_eq!(week_report.unmatched_headers, vec!["Store".to_string()]);

    let current = aggregate(&week_rows);
    let baseline = config.normalizer().normalize(&aggregate(&month_rows));

    assert_eq!(current.sales, 10_000.0);
    assert_eq!(current.labor_pct, Some(25.0));
    assert_eq!(baseline.sales, 10_000.0);
    assert_eq!(baseline.transactions, 500.0);
    assert_eq!(baseline.labor_dollars, None);
    // (32000*20 + 8000*30) / 40000, untouched by normalization
    assert_eq!(baseline.labor_pct, Some(22.0));
    assert_eq!(baseline.avg_ticket, Some(20.0));

    let deltas = compare(&current, &baseline);
    let by_kind = |k: KpiKind| deltas.iter().find(|d| d.kind == k).unwrap();
    assert_eq!(by_kind(KpiKind::Sales).class, DeltaClass::Neutral);
    assert_eq!(by_kind(KpiKind::Transactions).class, DeltaClass::Bad);
    assert_eq!(by_kind(KpiKind::AvgTicket).class, DeltaClass::Good);
    assert_eq!(by_kind(KpiKind::LaborPct).class, DeltaClass::Bad);

    let rows = comparison_rows(&deltas);
    assert_eq!(rows[0].current, "$10,000");
    assert_eq!(rows[2].delta, "+$5.00");
    assert_eq!(rows[4].change_pct, "+13.64%");
}

#[test]
fn config_file_changes_aliases_and_divisor() {
    let cfg_file = csv_file(r#"{"baselineWeeks": 5, "aliases": {"version": 2, "aliases": {"sales": ["Gross Sales"]}}}"#);
    let config = EngineConfig::load(cfg_file.path()).unwrap();
    assert_eq!(config.aliases.version, 2);

    let data = csv_file("Gross Sales,Sales,Trans\n500,1,10\n");
    let (rows, report) = load_rows(data.path(), &config.aliases).unwrap();
    assert_eq!(report.unmatched_headers, vec!["Sales".to_string()]);

    let m = kpi_engine::aggregate_with(&rows, &config.aliases);
    assert_eq!(m.sales, 500.0);
    assert_eq!(config.normalizer().normalize(&m).sales, 100.0);
    assert_ne!(&config.aliases, AliasTable::builtin());
}
