use kpi_engine::{
    aggregate, classify_delta, fmt_money, fmt_money2, fmt_number, fmt_pct, normalize_baseline,
    CanonicalMetrics, DeltaClass, FavorableDirection, Row, Scalar,
};
use proptest::prelude::*;

fn pct_row(sales: f64, pct: f64) -> Row {
    let mut r = Row::new();
    r.insert("Net Sales", sales);
    r.insert("Labor %", format!("{}%", pct));
    r
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn delta_verdict_examples() {
    assert_eq!(classify_delta(0.0, FavorableDirection::Up).as_str(), "");
    assert_eq!(classify_delta(5.0, FavorableDirection::Up).as_str(), "good");
    assert_eq!(classify_delta(5.0, FavorableDirection::Down).as_str(), "bad");
    assert_eq!(classify_delta(-3.0, FavorableDirection::Down).as_str(), "good");
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn unrecognised_headers_yield_empty_metrics(
        cells in prop::collection::vec(("[a-z]{3,8}_x", -1.0e6f64..1.0e6), 0..6),
        n_rows in 0usize..5,
    ) {
        let row: Row = cells.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        let rows = vec![row; n_rows];
        prop_assert_eq!(aggregate(&rows), CanonicalMetrics::default());
    }

    #[test]
    fn labor_dollars_take_precedence(
        sales in 1.0f64..1.0e7,
        labor in 0.01f64..1.0e6,
        stray_pct in 0.0f64..100.0,
    ) {
        let mut r = Row::new();
        r.insert("Sales", sales);
        r.insert("Labor Dollars", labor);
        r.insert("LaborPct", stray_pct);
        let m = aggregate(&[r]);
        prop_assert_eq!(m.labor_pct, Some(labor / sales * 100.0));
    }

    #[test]
    fn weighted_pct_ignores_row_order(
        parts in prop::collection::vec((1.0f64..1.0e5, 0.0f64..100.0), 1..8),
    ) {
        let rows: Vec<Row> = parts.iter().map(|(s, p)| pct_row(*s, *p)).collect();
        let mut reversed = rows.clone();
        reversed.reverse();
        let a = aggregate(&rows).labor_pct.unwrap();
        let b = aggregate(&reversed).labor_pct.unwrap();
        prop_assert!(close(a, b), "{} vs {}", a, b);
    }

    #[test]
    fn weighted_pct_survives_row_split(
        sales in 2.0f64..1.0e5,
        pct in 0.0f64..100.0,
        other_sales in 1.0f64..1.0e5,
        other_pct in 0.0f64..100.0,
        frac in 0.1f64..0.9,
    ) {
        let whole = vec![pct_row(sales, pct), pct_row(other_sales, other_pct)];
        let split = vec![
            pct_row(sales * frac, pct),
            pct_row(sales * (1.0 - frac), pct),
            pct_row(other_sales, other_pct),
        ];
        let a = aggregate(&whole).labor_pct.unwrap();
        let b = aggregate(&split).labor_pct.unwrap();
        prop_assert!(close(a, b), "{} vs {}", a, b);
    }

    #[test]
    fn normalize_is_linear_and_keeps_ratios(
        sales in -1.0e9f64..1.0e9,
        transactions in 0.0f64..1.0e6,
        labor in prop::option::of(0.0f64..1.0e6),
        labor_pct in prop::option::of(0.0f64..100.0),
        avg_ticket in prop::option::of(0.0f64..500.0),
    ) {
        let m = CanonicalMetrics { sales, transactions, labor_dollars: labor, labor_pct, avg_ticket };
        let w = normalize_baseline(&m);
        prop_assert_eq!(w.sales, sales / 4.0);
        prop_assert_eq!(w.transactions, transactions / 4.0);
        prop_assert_eq!(w.labor_dollars, labor.map(|l| l / 4.0));
        prop_assert_eq!(w.labor_pct.map(f64::to_bits), labor_pct.map(f64::to_bits));
        prop_assert_eq!(w.avg_ticket.map(f64::to_bits), avg_ticket.map(f64::to_bits));
    }

    #[test]
    fn classify_is_neutral_only_at_zero(delta in -1.0e6f64..1.0e6) {
        let up = classify_delta(delta, FavorableDirection::Up);
        let down = classify_delta(delta, FavorableDirection::Down);
        if delta == 0.0 {
            prop_assert_eq!(up, DeltaClass::Neutral);
            prop_assert_eq!(down, DeltaClass::Neutral);
        } else {
            prop_assert_ne!(up, DeltaClass::Neutral);
            prop_assert_ne!(up, down);
        }
    }

    #[test]
    fn pct_has_two_fraction_digits(x in -1.0e9f64..1.0e9) {
        let s = fmt_pct(x);
        prop_assert!(s.ends_with('%'));
        let body = s.trim_end_matches('%');
        let (_, frac) = body.split_once('.').unwrap();
        prop_assert_eq!(frac.len(), 2);
    }

    #[test]
    fn formatted_strings_coerce_back(x in -1.0e9f64..1.0e9) {
        for s in [fmt_money(x), fmt_money2(x), fmt_number(x), fmt_pct(x)] {
            let parsed = kpi_engine::parse_number(&Scalar::from(s.as_str())).unwrap();
            prop_assert!((parsed - x).abs() <= 0.5 + 1e-6, "{} from {}", s, x);
        }
    }
}

#[test]
fn non_finite_inputs_render_sentinel() {
    for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert_eq!(fmt_money(x), "—");
        assert_eq!(fmt_money2(x), "—");
        assert_eq!(fmt_number(x), "—");
        assert_eq!(fmt_pct(x), "—");
    }
    let pct = fmt_pct(12.345);
    assert!(pct.starts_with("12.3") && pct.ends_with('%'));
    assert_eq!(pct.len(), "12.35%".len());
}
