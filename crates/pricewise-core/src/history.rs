//! Pivot of flat price-history records into a chart-ready table.
//!
//! Records are grouped into one row per calendar day, as seen in the
//! viewer's time zone. Rows keep the order in
//! which each day first appears in the input; within a row, a later record for
//! the same supermarket overwrites an earlier one. Cells that were never
//! observed stay absent so charts can draw a gap instead of a zero.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use rust_decimal::Decimal;

use crate::types::PriceHistoryRecord;

/// One day of observations, keyed by supermarket name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    /// Day key: the local `YYYY-MM-DD` when the record date parses, otherwise
    /// the raw date string.
    pub date: String,
    pub prices: BTreeMap<String, Decimal>,
}

impl PivotRow {
    fn new(date: String) -> Self {
        Self {
            date,
            prices: BTreeMap::new(),
        }
    }

    /// Price observed for `supermarket` on this day, if any.
    #[must_use]
    pub fn price(&self, supermarket: &str) -> Option<Decimal> {
        self.prices.get(supermarket).copied()
    }

    /// Short axis label (`dd/mm`); falls back to the raw key.
    #[must_use]
    pub fn label(&self) -> String {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_or_else(|_| self.date.clone(), |d| d.format("%d/%m").to_string())
    }
}

/// Pivot result together with its column set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTable {
    /// Every supermarket name seen in the input, in first-seen order.
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PriceTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column in row order; `None` marks a gap.
    #[must_use]
    pub fn series(&self, supermarket: &str) -> Vec<Option<Decimal>> {
        self.rows.iter().map(|row| row.price(supermarket)).collect()
    }
}

/// Reduces a record's date to its day key in the local time zone.
///
/// Timestamps carrying an offset (RFC 3339) are converted to the viewer's
/// calendar day, so an evening observation stays on its own day even when
/// its UTC date has rolled over. Naive timestamps and plain dates are taken
/// as already local. Anything else is used verbatim.
#[must_use]
pub fn day_key(raw: &str) -> String {
    day_key_in(raw, &Local)
}

/// Like [`day_key`], bucketing offset timestamps in `tz`.
#[must_use]
pub fn day_key_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(tz).date_naive().to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.date().to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    raw.to_string()
}

/// Pivots `records` into rows ordered by first appearance of each local day.
#[must_use]
pub fn pivot(records: &[PriceHistoryRecord]) -> Vec<PivotRow> {
    pivot_table(records).rows
}

/// Like [`pivot`], also returning the column set.
#[must_use]
pub fn pivot_table(records: &[PriceHistoryRecord]) -> PriceTable {
    pivot_table_in(records, &Local)
}

/// Pivot with days taken in `tz` instead of the local time zone.
#[must_use]
pub fn pivot_table_in<Tz: TimeZone>(records: &[PriceHistoryRecord], tz: &Tz) -> PriceTable {
    let mut rows: Vec<PivotRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut columns: Vec<String> = Vec::new();
    let mut seen_columns: HashSet<&str> = HashSet::new();

    for record in records {
        let key = day_key_in(&record.date, tz);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                rows.push(PivotRow::new(key.clone()));
                index.insert(key, rows.len() - 1);
                rows.len() - 1
            }
        };

        // Last write wins for a repeated (day, supermarket) cell.
        rows[slot]
            .prices
            .insert(record.supermarket_name.clone(), record.price);

        if seen_columns.insert(record.supermarket_name.as_str()) {
            columns.push(record.supermarket_name.clone());
        }
    }

    PriceTable { columns, rows }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
