use chrono::{FixedOffset, Utc};
use rust_decimal::Decimal;

use super::*;

fn rec(date: &str, supermarket: &str, price: i64) -> PriceHistoryRecord {
    PriceHistoryRecord::new(date, supermarket, Decimal::new(price, 0))
}

#[test]
fn empty_input_yields_empty_table() {
    let table = pivot_table(&[]);
    assert!(table.is_empty());
    assert!(table.columns.is_empty());
}

#[test]
fn rows_follow_first_seen_order_not_chronology() {
    let records = vec![
        rec("2025-03-02", "A", 5),
        rec("2025-03-01", "B", 6),
        rec("2025-03-02", "B", 7),
    ];

    let rows = pivot(&records);

    let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, ["2025-03-02", "2025-03-01"]);
    assert_eq!(rows[0].price("A"), Some(Decimal::new(5, 0)));
    assert_eq!(rows[0].price("B"), Some(Decimal::new(7, 0)));
    assert_eq!(rows[0].prices.len(), 2);
    assert_eq!(rows[1].price("B"), Some(Decimal::new(6, 0)));
    assert_eq!(rows[1].price("A"), None);
}

#[test]
fn duplicate_cell_keeps_last_write() {
    let rows = pivot(&[rec("2025-03-01", "A", 5), rec("2025-03-01", "A", 6)]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].prices.len(), 1);
    assert_eq!(rows[0].price("A"), Some(Decimal::new(6, 0)));
}

#[test]
fn columns_are_the_distinct_supermarket_names() {
    let records = vec![
        rec("2025-03-01", "Carrefour", 5),
        rec("2025-03-02", "Atacadao", 4),
        rec("2025-03-02", "Carrefour", 6),
        rec("2025-03-03", "Extra", 7),
    ];

    let table = pivot_table(&records);

    assert_eq!(table.columns, ["Carrefour", "Atacadao", "Extra"]);
    let mut from_rows: Vec<&String> = table.rows.iter().flat_map(|r| r.prices.keys()).collect();
    from_rows.sort();
    from_rows.dedup();
    assert_eq!(from_rows.len(), table.columns.len());
}

#[test]
fn timestamps_on_the_same_day_share_a_row() {
    let records = vec![
        rec("2025-03-01T08:15:00+00:00", "A", 5),
        rec("2025-03-01T19:40:12.123456Z", "B", 6),
        rec("2025-03-01T21:00:00", "C", 7),
    ];

    let table = pivot_table_in(&records, &Utc);

    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].date, "2025-03-01");
    assert_eq!(table.rows[0].prices.len(), 3);
}

fn sao_paulo() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap()
}

#[test]
fn offset_timestamps_bucket_by_viewer_day() {
    assert_eq!(day_key_in("2025-03-02T01:30:00+00:00", &sao_paulo()), "2025-03-01");
    assert_eq!(day_key_in("2025-03-01T23:30:00-03:00", &sao_paulo()), "2025-03-01");
    assert_eq!(day_key_in("2025-03-01T23:30:00-03:00", &Utc), "2025-03-02");
}

#[test]
fn evening_observation_stays_on_its_local_day() {
    let records = vec![
        rec("2025-03-01T13:00:00Z", "A", 5),
        rec("2025-03-02T01:30:00Z", "A", 6),
        rec("2025-03-02T13:00:00Z", "B", 7),
    ];

    let table = pivot_table_in(&records, &sao_paulo());

    let dates: Vec<&str> = table.rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, ["2025-03-01", "2025-03-02"]);
    assert_eq!(table.rows[0].price("A"), Some(Decimal::new(6, 0)));
    assert_eq!(table.rows[1].price("A"), None);
    assert_eq!(table.rows[0].label(), "01/03");
}

#[test]
fn unparseable_dates_are_kept_verbatim() {
    let rows = pivot(&[rec("yesterday", "A", 1), rec("yesterday", "B", 2)]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "yesterday");
    assert_eq!(rows[0].label(), "yesterday");
}

#[test]
fn series_reports_gaps_as_none() {
    let table = pivot_table(&[
        rec("2025-03-01", "A", 5),
        rec("2025-03-02", "B", 6),
        rec("2025-03-03", "A", 4),
    ]);

    assert_eq!(
        table.series("A"),
        vec![Some(Decimal::new(5, 0)), None, Some(Decimal::new(4, 0))]
    );
}

#[test]
fn label_is_day_and_month() {
    let rows = pivot(&[rec("2025-03-09T12:00:00Z", "A", 5)]);
    assert_eq!(rows[0].label(), "09/03");
}
