//! Daily timelines
//!
//! Items are bucketed by calendar day in a display timezone. Buckets come back in
//! ascending date order.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of items on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Summed value on one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmountPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Calendar day of `at` in `tz`
pub fn day_in<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Counts items per calendar day, sorted by date
pub fn daily_counts<I, Tz, F>(items: I, tz: &Tz, timestamp: F) -> Vec<TimelinePoint>
where
    I: IntoIterator,
    Tz: TimeZone,
    F: Fn(&I::Item) -> DateTime<Utc>,
{
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for item in items {
        *days.entry(day_in(timestamp(&item), tz)).or_insert(0) += 1;
    }
    days.into_iter()
        .map(|(date, count)| TimelinePoint { date, count })
        .collect()
}

/// Sums a value per calendar day, sorted by date
pub fn daily_sums<I, Tz, F, V>(items: I, tz: &Tz, timestamp: F, value: V) -> Vec<AmountPoint>
where
    I: IntoIterator,
    Tz: TimeZone,
    F: Fn(&I::Item) -> DateTime<Utc>,
    V: Fn(&I::Item) -> f64,
{
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for item in items {
        *days.entry(day_in(timestamp(&item), tz)).or_insert(0.0) += value(&item);
    }
    days.into_iter()
        .map(|(date, amount)| AmountPoint { date, amount })
        .collect()
}

/// Running total of counts across buckets in date order
pub fn cumulative(points: &[TimelinePoint]) -> Vec<TimelinePoint> {
    let mut total = 0;
    points
        .iter()
        .map(|p| {
            total += p.count;
            TimelinePoint {
                date: p.date,
                count: total,
            }
        })
        .collect()
}

/// Running total of amounts across buckets in date order
pub fn cumulative_amounts(points: &[AmountPoint]) -> Vec<AmountPoint> {
    let mut total = 0.0;
    points
        .iter()
        .map(|p| {
            total += p.amount;
            AmountPoint {
                date: p.date,
                amount: total,
            }
        })
        .collect()
}

/// Counts for each of the `days` days ending on `today`, zero-filled
///
/// Items outside the window are ignored.
pub fn last_n_days<I, Tz, F>(items: I, tz: &Tz, today: NaiveDate, days: u32, timestamp: F) -> Vec<TimelinePoint>
where
    I: IntoIterator,
    Tz: TimeZone,
    F: Fn(&I::Item) -> DateTime<Utc>,
{
    let mut series: Vec<TimelinePoint> = (0..i64::from(days))
        .rev()
        .map(|offset| TimelinePoint {
            date: today - Duration::days(offset),
            count: 0,
        })
        .collect();

    let Some(first) = series.first().map(|p| p.date) else {
        return series;
    };

    for item in items {
        let day = day_in(timestamp(&item), tz);
        if day < first || day > today {
            continue;
        }
        let idx = (day - first).num_days() as usize;
        series[idx].count += 1;
    }

    series
}
