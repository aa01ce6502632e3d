//! Presentation adapter
//!
//! Turns aggregated data into the shapes the dashboard draws: `{label, value}`
//! chart points, stat cards, and table rows of display strings.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Display;

use crate::aggregate::{
    format_percent, ip_type_label, percentage, summarize_mint_editions, summarize_revenue,
    summarize_split_contracts, summarize_story, summarize_transactions, summarize_users,
    AmountPoint, FilterState, GroupCount, GroupSum, MintEditionSummary, RevenueSummary,
    SplitContractSummary, SplitPattern, StorySummary, TimelinePoint, TransactionSummary, Trend,
    UserSummary,
};
use crate::data::{chain_label, MintEdition, Payment, SplitContract, StoryStat, UserAnalytics};
use crate::loader::DatasetData;

/// One bar, slice or line point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// A pie slice with its share of the total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Percent of the total; `None` when the total is zero
    pub share: Option<f64>,
}

impl PieSlice {
    /// `Base (42.0%)`, or `Base (N/A)` for an empty chart
    pub fn legend(&self) -> String {
        format!("{} ({})", self.label, format_percent(self.share))
    }
}

pub fn bar_points<K: Display>(groups: &[GroupCount<K>]) -> Vec<ChartPoint> {
    groups
        .iter()
        .map(|g| ChartPoint {
            label: g.key.to_string(),
            value: g.count as f64,
        })
        .collect()
}

pub fn sum_points<K: Display>(groups: &[GroupSum<K>]) -> Vec<ChartPoint> {
    groups
        .iter()
        .map(|g| ChartPoint {
            label: g.key.to_string(),
            value: g.total,
        })
        .collect()
}

pub fn pie_slices(points: &[ChartPoint]) -> Vec<PieSlice> {
    let total: f64 = points.iter().map(|p| p.value).sum();
    points
        .iter()
        .map(|p| PieSlice {
            label: p.label.clone(),
            value: p.value,
            share: percentage(p.value, total),
        })
        .collect()
}

/// Line points labeled like `Mar 02`
pub fn line_points(timeline: &[TimelinePoint]) -> Vec<ChartPoint> {
    timeline
        .iter()
        .map(|p| ChartPoint {
            label: p.date.format("%b %d").to_string(),
            value: p.count as f64,
        })
        .collect()
}

pub fn amount_points(timeline: &[AmountPoint]) -> Vec<ChartPoint> {
    timeline
        .iter()
        .map(|p| ChartPoint {
            label: p.date.format("%b %d").to_string(),
            value: p.amount,
        })
        .collect()
}

/// Shortens `0x1234567890abcdef` to `0x1234...cdef`
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Human-readable age of `at` relative to `now`
pub fn relative_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(at);
    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h ago", age.num_hours())
    } else if age.num_days() < 30 {
        format!("{}d ago", age.num_days())
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

/// `1234.5` as `$1,234.50`
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// A row of display strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<String>,
}

impl TableRow {
    fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }
}

pub fn split_contract_row(contract: &SplitContract, now: DateTime<Utc>) -> TableRow {
    let allocations: Vec<f64> = contract
        .args
        .recipients
        .iter()
        .map(|r| r.percent_allocation)
        .collect();
    TableRow::new(vec![
        short_address(&contract.contract_address),
        contract.user_id.to_string(),
        chain_label(&contract.chain_id.to_string()),
        contract.args.recipients.len().to_string(),
        SplitPattern::classify(&allocations).to_string(),
        relative_age(contract.created_at, now),
    ])
}

pub fn mint_edition_row(edition: &MintEdition, now: DateTime<Utc>) -> TableRow {
    TableRow::new(vec![
        short_address(&edition.contract),
        edition.slug.clone(),
        chain_label(&edition.chain_id),
        edition.contract_type.clone(),
        relative_age(edition.created_at, now),
    ])
}

pub fn payment_row(payment: &Payment, now: DateTime<Utc>) -> TableRow {
    TableRow::new(vec![
        short_address(&payment.signature),
        short_address(&payment.evm_address),
        format_usd(payment.amount),
        chain_label(&payment.chain_id),
        relative_age(payment.created_at, now),
    ])
}

pub fn story_row(stat: &StoryStat, now: DateTime<Utc>) -> TableRow {
    TableRow::new(vec![
        stat.id.to_string(),
        ip_type_label(&stat.ip_type),
        stat.canvas_id.to_string(),
        short_address(&stat.spg_nft_contract),
        chain_label(&stat.chain_id),
        relative_age(stat.created_at, now),
    ])
}

/// Computed summary of whichever dataset is loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    Users(UserSummary),
    MintEditions(MintEditionSummary),
    SplitContracts(SplitContractSummary),
    Revenue(RevenueSummary),
    Story(StorySummary),
    Transactions(TransactionSummary),
}

/// Headline number on a dashboard page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: String,
    pub value: String,
}

fn card(title: &str, value: impl Display) -> StatCard {
    StatCard {
        title: title.to_string(),
        value: value.to_string(),
    }
}

/// Everything one dashboard page draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub cards: Vec<StatCard>,
    pub chart_title: String,
    pub chart: Vec<ChartPoint>,
    pub timeline_title: String,
    pub timeline: Vec<ChartPoint>,
    pub header: Vec<&'static str>,
    pub rows: Vec<TableRow>,
    /// Records left after client-side filtering
    pub matched: usize,
    pub summary: Summary,
}

/// Builds the page for `data` under the current filters
///
/// Timelines bucket by calendar day in `tz`. Revenue and mint edition summaries
/// cover the whole collection and the filters only narrow their tables; the
/// other record datasets summarize the filtered records.
pub fn build_view<Tz: TimeZone>(
    data: &DatasetData,
    filters: &FilterState,
    now: DateTime<Utc>,
    tz: &Tz,
) -> DashboardView {
    match data {
        DatasetData::Users(analytics) => users_view(analytics),
        DatasetData::MintEditions(editions) => {
            let kept = filters.apply(editions, now);
            let all: Vec<&MintEdition> = editions.iter().collect();
            let summary = summarize_mint_editions(&all, now, tz);
            DashboardView {
                cards: vec![
                    card("Total Contracts", summary.total_contracts),
                    card(
                        "Most Active Chain",
                        summary
                            .most_active_chain
                            .as_ref()
                            .map(|c| format!("{} ({})", c.name, c.count))
                            .unwrap_or_else(|| "N/A".to_string()),
                    ),
                    card("Recent Activity (30d)", summary.recent_activity),
                ],
                chart_title: "Chain Distribution".to_string(),
                chart: summary
                    .contracts_by_chain
                    .iter()
                    .map(|c| ChartPoint {
                        label: c.name.clone(),
                        value: c.count as f64,
                    })
                    .collect(),
                timeline_title: "Activity Over Time".to_string(),
                timeline: line_points(&summary.activity),
                header: vec!["Contract", "Slug", "Chain", "Type", "Created"],
                rows: kept.iter().map(|e| mint_edition_row(e, now)).collect(),
                matched: kept.len(),
                summary: Summary::MintEditions(summary),
            }
        }
        DatasetData::SplitContracts(contracts) => {
            let kept = filters.apply(contracts, now);
            let summary = summarize_split_contracts(&kept, tz);
            DashboardView {
                cards: vec![
                    card("Total Contracts", summary.total_contracts),
                    card("Unique Recipients", summary.unique_recipients),
                    card("Avg Split Size", format!("{:.1}", summary.average_split_size)),
                ],
                chart_title: "Allocation Patterns".to_string(),
                chart: bar_points(&summary.allocation_patterns),
                timeline_title: "Contracts Created".to_string(),
                timeline: line_points(&summary.timeline),
                header: vec!["Contract", "User", "Chain", "Recipients", "Pattern", "Created"],
                rows: kept.iter().map(|c| split_contract_row(c, now)).collect(),
                matched: kept.len(),
                summary: Summary::SplitContracts(summary),
            }
        }
        DatasetData::Revenue(payments) => {
            let kept = filters.apply(payments, now);
            let all: Vec<&Payment> = payments.iter().collect();
            let summary = summarize_revenue(&all, now, tz);
            let change = &summary.monthly_change;
            let arrow = match change.direction {
                Trend::Up => "▲",
                Trend::Down => "▼",
                Trend::None => "–",
            };
            DashboardView {
                cards: vec![
                    card("Total Revenue", format_usd(summary.total_revenue)),
                    card("Total Transactions", summary.total_transactions),
                    card(
                        "This Month",
                        format!(
                            "{} {} {:.1}% (last: {})",
                            format_usd(change.this_month),
                            arrow,
                            change.percent,
                            format_usd(change.last_month)
                        ),
                    ),
                ],
                chart_title: "Revenue by Chain".to_string(),
                chart: sum_points(&summary.revenue_by_chain),
                timeline_title: "Cumulative Revenue".to_string(),
                timeline: amount_points(&summary.cumulative_revenue),
                header: vec!["Signature", "Address", "Amount", "Chain", "Created"],
                rows: kept.iter().map(|p| payment_row(p, now)).collect(),
                matched: kept.len(),
                summary: Summary::Revenue(summary),
            }
        }
        DatasetData::Story(stats) => {
            let kept = filters.apply(stats, now);
            let summary = summarize_story(&kept, tz);
            DashboardView {
                cards: vec![
                    card("Total IPs", summary.total_ips),
                    card("Fresh IPs", summary.fresh_ips),
                    card("Derivative IPs", summary.derivative_ips),
                ],
                chart_title: "IP Type Distribution".to_string(),
                chart: bar_points(&summary.ip_type_distribution),
                timeline_title: "Registrations".to_string(),
                timeline: line_points(&summary.timeline),
                header: vec!["ID", "IP Type", "Canvas", "SPG Contract", "Chain", "Created"],
                rows: kept.iter().map(|s| story_row(s, now)).collect(),
                matched: kept.len(),
                summary: Summary::Story(summary),
            }
        }
        DatasetData::Transactions(stats) => {
            let summary = summarize_transactions(stats);
            DashboardView {
                cards: vec![
                    card("Total Mints", summary.total_mints),
                    card("Total Payments", summary.total_payments),
                    card("Farcaster Publishes", summary.farcaster_publishes),
                ],
                chart_title: "Mints by Chain".to_string(),
                chart: summary
                    .chains
                    .iter()
                    .map(|c| ChartPoint {
                        label: c.name.clone(),
                        value: c.mints as f64,
                    })
                    .collect(),
                timeline_title: "Payments by Chain".to_string(),
                timeline: summary
                    .chains
                    .iter()
                    .map(|c| ChartPoint {
                        label: c.name.clone(),
                        value: c.payments as f64,
                    })
                    .collect(),
                header: vec!["Chain", "Mints", "Payments"],
                rows: summary
                    .chains
                    .iter()
                    .map(|c| {
                        TableRow::new(vec![c.name.clone(), c.mints.to_string(), c.payments.to_string()])
                    })
                    .collect(),
                matched: summary.chains.len(),
                summary: Summary::Transactions(summary),
            }
        }
    }
}

fn users_view(analytics: &UserAnalytics) -> DashboardView {
    let summary = summarize_users(analytics);
    let wallets = &analytics.wallet_distribution;
    DashboardView {
        cards: vec![
            card("Total Users", summary.total_users),
            card("Monthly Growth", format!("{:+}%", summary.growth_rate)),
            card("Active (30d)", summary.active_users_last_30_days),
            card("With Canvases", summary.users_with_canvases),
        ],
        chart_title: "Wallet Distribution".to_string(),
        chart: vec![
            ChartPoint {
                label: "EVM".to_string(),
                value: wallets.evm_users as f64,
            },
            ChartPoint {
                label: "Solana".to_string(),
                value: wallets.solana_users as f64,
            },
            ChartPoint {
                label: "Both".to_string(),
                value: wallets.both_wallets as f64,
            },
        ],
        timeline_title: "User Growth".to_string(),
        timeline: analytics
            .user_growth
            .iter()
            .map(|p| ChartPoint {
                label: p.month.clone(),
                value: p.count as f64,
            })
            .collect(),
        header: vec!["Month", "New Users"],
        rows: analytics
            .user_growth
            .iter()
            .map(|p| TableRow::new(vec![p.month.clone(), p.count.to_string()]))
            .collect(),
        matched: analytics.user_growth.len(),
        summary: Summary::Users(summary),
    }
}
