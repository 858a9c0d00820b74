use chrono::{Duration, NaiveDate};

use tqqq_agent::feature::{build_features, FEATURE_COLUMNS, MAX_LOOKBACK};
use tqqq_agent::market::types::DailySeries;

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + Duration::days(i as i64)
}

fn series(values: &[f64]) -> DailySeries {
    let points = values
        .iter()
        .enumerate()
        .map(|(i, v)| (day(i), *v))
        .collect();
    DailySeries::from_points(points).unwrap()
}

fn constant_series(value: f64, len: usize) -> DailySeries {
    series(&vec![value; len])
}

#[test]
fn warmup_consumes_exactly_the_longest_lookback() {
    for len in [260usize, 300, 452] {
        let price = constant_series(380.0, len);
        let vix = constant_series(20.0, len);
        let volume = constant_series(1.0e7, len);
        let table = build_features(&price, &vix, &volume);
        assert_eq!(table.len(), len - MAX_LOOKBACK, "input length {len}");
    }
}

#[test]
fn declared_feature_columns_are_all_present() {
    let price = constant_series(380.0, 260);
    let vix = constant_series(20.0, 260);
    let volume = constant_series(1.0e7, 260);
    let table = build_features(&price, &vix, &volume);
    assert!(table.missing_columns(&FEATURE_COLUMNS).is_empty());
}

#[test]
fn constant_series_yields_zero_returns_and_volatility() {
    let price = constant_series(380.0, 260);
    let vix = constant_series(20.0, 260);
    let volume = constant_series(1.0e7, 260);
    let table = build_features(&price, &vix, &volume);

    let last = table.len() - 1;
    for column in ["ret_1", "ret_5", "ret_20", "ret_200"] {
        assert_eq!(table.value(last, column), Some(0.0), "{column}");
    }
    for column in ["vol_5", "vol_20", "vol_200"] {
        assert_eq!(table.value(last, column), Some(0.0), "{column}");
    }
    // No movement at all pins RSI at neutral.
    assert_eq!(table.value(last, "rsi"), Some(50.0));
    assert_eq!(table.value(last, "vix"), Some(20.0));
    assert_eq!(table.value(last, "volume"), Some(1.0e7));
}

#[test]
fn returns_react_to_a_final_jump() {
    let mut values = vec![100.0; 260];
    values[259] = 110.0;
    let price = series(&values);
    let vix = constant_series(20.0, 260);
    let volume = constant_series(1.0e7, 260);
    let table = build_features(&price, &vix, &volume);

    let last = table.len() - 1;
    let ret_1 = table.value(last, "ret_1").unwrap();
    let ret_5 = table.value(last, "ret_5").unwrap();
    assert!((ret_1 - 0.10).abs() < 1e-12);
    assert!((ret_5 - 0.10).abs() < 1e-12);
    assert!(table.value(last, "vol_20").unwrap() > 0.0);
}

#[test]
fn calendar_features_match_the_date() {
    let price = constant_series(380.0, 260);
    let vix = constant_series(20.0, 260);
    let volume = constant_series(1.0e7, 260);
    let table = build_features(&price, &vix, &volume);

    use chrono::Datelike;
    let last = table.len() - 1;
    let date = table.dates()[last];
    assert_eq!(table.value(last, "month"), Some(date.month() as f64));
    assert_eq!(
        table.value(last, "dow"),
        Some(date.weekday().num_days_from_monday() as f64)
    );
}

#[test]
fn missing_aux_dates_drop_rows() {
    let len = 260;
    let price = constant_series(380.0, len);
    let volume = constant_series(1.0e7, len);

    // VIX series missing the final date: that row cannot be fully populated.
    let vix_points: Vec<(NaiveDate, f64)> = (0..len - 1).map(|i| (day(i), 20.0)).collect();
    let vix = DailySeries::from_points(vix_points).unwrap();

    let table = build_features(&price, &vix, &volume);
    assert_eq!(table.len(), len - MAX_LOOKBACK - 1);
    assert_eq!(*table.dates().last().unwrap(), day(len - 2));
}

#[test]
fn table_dates_ascend_without_duplicates() {
    let price = constant_series(380.0, 300);
    let vix = constant_series(20.0, 300);
    let volume = constant_series(1.0e7, 300);
    let table = build_features(&price, &vix, &volume);
    for pair in table.dates().windows(2) {
        assert!(pair[0] < pair[1]);
    }
}
