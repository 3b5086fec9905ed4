//! Data aligner.
//!
//! Joins the two raw close series on date. Each series is cleaned on its
//! own first (duplicate dates resolved to the last report, then null or
//! non-finite closes dropped), then only dates present in both survive.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{AlignedSeries, MonitorError, PriceSeries};

/// Minimum aligned rows before the estimator is allowed to run.
pub const MIN_OBSERVATIONS: usize = 100;

fn clean(series: &PriceSeries) -> BTreeMap<NaiveDate, f64> {
    // A later report for a date replaces an earlier one even when it is null.
    let latest: BTreeMap<NaiveDate, Option<f64>> =
        series.points.iter().map(|p| (p.date, p.value())).collect();
    latest
        .into_iter()
        .filter_map(|(date, close)| close.map(|v| (date, v)))
        .collect()
}

/// Inner-join `a` and `b` on date, requiring at least `min_observations`
/// common rows.
pub fn align(
    a: &PriceSeries,
    b: &PriceSeries,
    min_observations: usize,
) -> Result<AlignedSeries, MonitorError> {
    let clean_a = clean(a);
    let clean_b = clean(b);

    let rows: Vec<(NaiveDate, f64, f64)> = clean_a
        .iter()
        .filter_map(|(date, va)| clean_b.get(date).map(|vb| (*date, *va, *vb)))
        .collect();

    debug!(
        symbol_a = %a.symbol,
        symbol_b = %b.symbol,
        raw_a = a.len(),
        raw_b = b.len(),
        valid_a = clean_a.len(),
        valid_b = clean_b.len(),
        aligned = rows.len(),
        "Series aligned"
    );

    if rows.len() < min_observations {
        return Err(MonitorError::InsufficientData {
            required: min_observations,
            actual: rows.len(),
        });
    }

    AlignedSeries::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + chrono::Duration::days(offset)
    }

    fn series(symbol: &str, days: impl Iterator<Item = i64>, f: impl Fn(i64) -> Option<f64>) -> PriceSeries {
        PriceSeries::new(
            symbol,
            days.map(|d| PricePoint { date: day(d), close: f(d) }).collect(),
        )
    }

    #[test]
    fn test_align_full_overlap() {
        let a = series("A", 0..150, |d| Some(100.0 + d as f64));
        let b = series("B", 0..150, |d| Some(80.0 + d as f64));
        let aligned = align(&a, &b, MIN_OBSERVATIONS).unwrap();
        assert_eq!(aligned.len(), 150);
        assert_eq!(aligned.first_date(), Some(day(0)));
        assert_eq!(aligned.series_b()[10], 90.0);
    }

    #[test]
    fn test_align_counts_common_non_null_dates() {
        // A: days 0..200, null every 7th day. B: days 20..220, null every 11th day.
        let a = series("A", 0..200, |d| if d % 7 == 0 { None } else { Some(1.0 + d as f64) });
        let b = series("B", 20..220, |d| if d % 11 == 0 { None } else { Some(2.0 + d as f64) });

        let expected = (20..200).filter(|d| d % 7 != 0 && d % 11 != 0).count();
        let aligned = align(&a, &b, MIN_OBSERVATIONS).unwrap();
        assert_eq!(aligned.len(), expected);
        assert_eq!(aligned.first_date(), Some(day(20)));
        assert_eq!(aligned.last_date(), Some(day(199)));
        // Both columns come from the same date on every row.
        for (va, vb) in aligned.series_a().iter().zip(aligned.series_b()) {
            assert_eq!(vb - va, 1.0);
        }
    }

    #[test]
    fn test_align_unsorted_input_is_sorted() {
        let a = series("A", (0..120).rev(), |d| Some(d as f64 + 1.0));
        let b = series("B", 0..120, |d| Some(d as f64 + 2.0));
        let aligned = align(&a, &b, MIN_OBSERVATIONS).unwrap();
        assert_eq!(aligned.len(), 120);
        assert_eq!(aligned.first_date(), Some(day(0)));
        assert_eq!(aligned.last_date(), Some(day(119)));
        assert!(aligned.series_a().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_align_nan_treated_as_missing() {
        let a = series("A", 0..110, |d| if d < 5 { Some(f64::NAN) } else { Some(1.0) });
        let b = series("B", 0..110, |_| Some(2.0));
        let aligned = align(&a, &b, MIN_OBSERVATIONS).unwrap();
        assert_eq!(aligned.len(), 105);
    }

    #[test]
    fn test_align_duplicate_date_keeps_last() {
        let mut a = series("A", 0..100, |d| Some(d as f64));
        a.points.push(PricePoint::new(day(99), 999.0));
        let b = series("B", 0..100, |d| Some(d as f64));
        let aligned = align(&a, &b, MIN_OBSERVATIONS).unwrap();
        assert_eq!(aligned.len(), 100);
        assert_eq!(aligned.series_a()[99], 999.0);
    }

    #[test]
    fn test_align_duplicate_date_later_null_wins() {
        let mut a = series("A", 0..101, |d| Some(d as f64));
        a.points.push(PricePoint::missing(day(100)));
        let b = series("B", 0..101, |d| Some(d as f64));
        let aligned = align(&a, &b, MIN_OBSERVATIONS).unwrap();
        assert_eq!(aligned.len(), 100);
        assert_eq!(aligned.last_date(), Some(day(99)));
    }

    #[test]
    fn test_align_duplicate_date_later_value_replaces_null() {
        let mut a = series("A", 0..100, |d| if d == 50 { None } else { Some(d as f64) });
        a.points.push(PricePoint::new(day(50), 50.5));
        let b = series("B", 0..100, |d| Some(d as f64));
        let aligned = align(&a, &b, MIN_OBSERVATIONS).unwrap();
        assert_eq!(aligned.len(), 100);
        assert_eq!(aligned.series_a()[50], 50.5);
    }

    #[test]
    fn test_align_insufficient_overlap() {
        let a = series("A", 0..150, |d| Some(d as f64));
        let b = series("B", 60..210, |d| Some(d as f64));
        let err = align(&a, &b, MIN_OBSERVATIONS).unwrap_err();
        assert_eq!(err, MonitorError::InsufficientData { required: 100, actual: 90 });
    }

    #[test]
    fn test_align_disjoint_and_empty() {
        let a = series("A", 0..150, |d| Some(d as f64));
        let b = series("B", 200..350, |d| Some(d as f64));
        assert!(matches!(
            align(&a, &b, MIN_OBSERVATIONS),
            Err(MonitorError::InsufficientData { actual: 0, .. })
        ));

        let empty = PriceSeries::new("E", Vec::new());
        assert!(matches!(
            align(&empty, &b, MIN_OBSERVATIONS),
            Err(MonitorError::InsufficientData { actual: 0, .. })
        ));
    }

    #[test]
    fn test_align_boundary_exactly_minimum() {
        let a = series("A", 0..100, |d| Some(d as f64));
        let b = series("B", 0..100, |d| Some(d as f64));
        assert_eq!(align(&a, &b, 100).unwrap().len(), 100);
        assert!(align(&a, &b, 101).is_err());
    }
}
