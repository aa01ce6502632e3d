//! Percentages and rates with defined results for empty totals

/// `count / total * 100`, or `None` when `total` is zero
pub fn percentage(count: f64, total: f64) -> Option<f64> {
    if total == 0.0 {
        return None;
    }
    let pct = count / total * 100.0;
    pct.is_finite().then_some(pct)
}

/// Rounds to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Formats a percentage for display, `N/A` when undefined
pub fn format_percent(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{:.1}%", round1(p)),
        None => "N/A".to_string(),
    }
}

/// `total / count`, or 0 when there is nothing to average
pub fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Relative change from `previous` to `current` in percent
///
/// A zero baseline counts as 100% growth.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        100.0
    } else {
        (current - previous) / previous * 100.0
    }
}
