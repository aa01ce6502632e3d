//! Per-dataset summaries shown on each dashboard page
//!
//! Every summary takes the records that already passed the [`FilterState`] and
//! derives the stat cards and chart series for one dataset.
//!
//! [`FilterState`]: super::FilterState

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashSet;

use super::group::{group_by_count, group_by_sum, most_common, top_n, GroupCount, GroupSum, TOP_N};
use super::pattern::SplitPattern;
use super::stats::{average, percent_change, round1};
use super::timeline::{cumulative_amounts, daily_counts, daily_sums, last_n_days, AmountPoint, TimelinePoint};
use crate::data::chains::{chain_label, FARCASTER_CHAIN_ID};
use crate::data::{
    MintEdition, Payment, SplitContract, StoryStat, TransactionStats, UserAnalytics,
};

/// Days counted as "recent" on the mint editions page
pub const RECENT_DAYS: u32 = 30;

/// Record count on one chain, with its display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainCount {
    pub chain_id: String,
    pub name: String,
    pub count: usize,
}

fn chain_counts(groups: Vec<GroupCount<String>>) -> Vec<ChainCount> {
    groups
        .into_iter()
        .map(|g| ChainCount {
            name: chain_label(&g.key),
            chain_id: g.key,
            count: g.count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitContractSummary {
    pub total_contracts: usize,
    pub unique_recipients: usize,
    /// Mean recipients per contract, one decimal
    pub average_split_size: f64,
    pub chain_distribution: Vec<ChainCount>,
    pub top_users: Vec<GroupCount<i64>>,
    pub allocation_patterns: Vec<GroupCount<SplitPattern>>,
    pub timeline: Vec<TimelinePoint>,
}

pub fn summarize_split_contracts<Tz: TimeZone>(
    contracts: &[&SplitContract],
    tz: &Tz,
) -> SplitContractSummary {
    let recipients: HashSet<&str> = contracts
        .iter()
        .flat_map(|c| c.args.recipients.iter().map(|r| r.address.as_str()))
        .collect();
    let recipient_total: usize = contracts.iter().map(|c| c.args.recipients.len()).sum();

    let patterns = group_by_count(contracts.iter(), |c| {
        let allocations: Vec<f64> = c.args.recipients.iter().map(|r| r.percent_allocation).collect();
        SplitPattern::classify(&allocations)
    });

    SplitContractSummary {
        total_contracts: contracts.len(),
        unique_recipients: recipients.len(),
        average_split_size: round1(average(recipient_total as f64, contracts.len())),
        chain_distribution: chain_counts(group_by_count(contracts.iter(), |c| c.chain_id.to_string())),
        top_users: top_n(group_by_count(contracts.iter(), |c| c.user_id), TOP_N),
        allocation_patterns: patterns,
        timeline: daily_counts(contracts.iter(), tz, |c| c.created_at),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MintEditionSummary {
    pub total_contracts: usize,
    pub contracts_by_chain: Vec<ChainCount>,
    /// `None` when there are no editions
    pub most_active_chain: Option<ChainCount>,
    /// Editions created in the last [`RECENT_DAYS`] days
    pub recent_activity: usize,
    pub contract_types: Vec<GroupCount<String>>,
    /// Zero-filled daily counts for the last [`RECENT_DAYS`] days
    pub activity: Vec<TimelinePoint>,
}

pub fn summarize_mint_editions<Tz: TimeZone>(
    editions: &[&MintEdition],
    now: DateTime<Utc>,
    tz: &Tz,
) -> MintEditionSummary {
    let by_chain = group_by_count(editions.iter(), |e| e.chain_id.clone());
    let most_active = most_common(&by_chain);
    let cutoff = now - Duration::days(i64::from(RECENT_DAYS));
    let today = now.with_timezone(tz).date_naive();

    MintEditionSummary {
        total_contracts: editions.len(),
        most_active_chain: most_active.map(|g| ChainCount {
            name: chain_label(&g.key),
            chain_id: g.key,
            count: g.count,
        }),
        contracts_by_chain: chain_counts(by_chain),
        recent_activity: editions.iter().filter(|e| e.created_at >= cutoff).count(),
        contract_types: group_by_count(editions.iter(), |e| e.contract_type.clone()),
        activity: last_n_days(editions.iter(), tz, today, RECENT_DAYS, |e| e.created_at),
    }
}

/// Direction of a month-over-month change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    None,
}

/// Revenue this calendar month against last calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyChange {
    /// Absolute percent change
    pub percent: f64,
    pub direction: Trend,
    pub this_month: f64,
    pub last_month: f64,
}

impl MonthlyChange {
    fn flat() -> Self {
        MonthlyChange {
            percent: 0.0,
            direction: Trend::None,
            this_month: 0.0,
            last_month: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub total_transactions: usize,
    pub monthly_change: MonthlyChange,
    pub revenue_by_chain: Vec<GroupSum<String>>,
    pub cumulative_revenue: Vec<AmountPoint>,
}

/// Compares revenue in the calendar month of `now` with the month before, in `tz`
pub fn monthly_change<Tz: TimeZone>(payments: &[&Payment], now: DateTime<Utc>, tz: &Tz) -> MonthlyChange {
    if payments.is_empty() {
        return MonthlyChange::flat();
    }

    let local_now = now.with_timezone(tz);
    let this_month = (local_now.year(), local_now.month());
    let last_month = if this_month.1 == 1 {
        (this_month.0 - 1, 12)
    } else {
        (this_month.0, this_month.1 - 1)
    };

    let mut this_total = 0.0;
    let mut last_total = 0.0;
    for payment in payments {
        let at = payment.created_at.with_timezone(tz);
        let month = (at.year(), at.month());
        if month == this_month {
            this_total += payment.amount;
        } else if month == last_month {
            last_total += payment.amount;
        }
    }

    let change = percent_change(this_total, last_total);
    let direction = if change > 0.0 {
        Trend::Up
    } else if change < 0.0 {
        Trend::Down
    } else {
        Trend::None
    };

    MonthlyChange {
        percent: change.abs(),
        direction,
        this_month: this_total,
        last_month: last_total,
    }
}

pub fn summarize_revenue<Tz: TimeZone>(payments: &[&Payment], now: DateTime<Utc>, tz: &Tz) -> RevenueSummary {
    let by_day = daily_sums(payments.iter(), tz, |p| p.created_at, |p| p.amount);

    RevenueSummary {
        total_revenue: payments.iter().map(|p| p.amount).sum(),
        total_transactions: payments.len(),
        monthly_change: monthly_change(payments, now, tz),
        revenue_by_chain: group_by_sum(payments.iter(), |p| chain_label(&p.chain_id), |p| p.amount),
        cumulative_revenue: cumulative_amounts(&by_day),
    }
}

/// Display label for a story IP type
pub fn ip_type_label(ip_type: &str) -> String {
    match ip_type {
        "fresh_ip" | "1" => "Fresh IP".to_string(),
        "derivative_ip" | "0" => "Derivative IP".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySummary {
    pub total_ips: usize,
    pub fresh_ips: usize,
    pub derivative_ips: usize,
    pub ip_type_distribution: Vec<GroupCount<String>>,
    pub top_canvases: Vec<GroupCount<i64>>,
    pub timeline: Vec<TimelinePoint>,
}

pub fn summarize_story<Tz: TimeZone>(stats: &[&StoryStat], tz: &Tz) -> StorySummary {
    StorySummary {
        total_ips: stats.len(),
        fresh_ips: stats.iter().filter(|s| s.ip_type == "fresh_ip").count(),
        derivative_ips: stats.iter().filter(|s| s.ip_type == "derivative_ip").count(),
        ip_type_distribution: group_by_count(stats.iter(), |s| ip_type_label(&s.ip_type)),
        top_canvases: top_n(group_by_count(stats.iter(), |s| s.canvas_id), TOP_N),
        timeline: daily_counts(stats.iter(), tz, |s| s.created_at),
    }
}

/// Mint and payment totals for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainActivity {
    pub chain_id: u64,
    pub name: String,
    pub mints: u64,
    pub payments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    /// Every chain except Farcaster, ascending by chain id
    pub chains: Vec<ChainActivity>,
    pub total_mints: u64,
    pub total_payments: u64,
    pub farcaster_publishes: u64,
}

pub fn summarize_transactions(stats: &TransactionStats) -> TransactionSummary {
    let chains: Vec<ChainActivity> = stats
        .iter()
        .filter(|(id, _)| **id != FARCASTER_CHAIN_ID)
        .map(|(id, s)| ChainActivity {
            chain_id: *id,
            name: chain_label(&id.to_string()),
            mints: s.mint.total_count,
            payments: s.payment.total_count,
        })
        .collect();

    TransactionSummary {
        total_mints: chains.iter().map(|c| c.mints).sum(),
        total_payments: chains.iter().map(|c| c.payments).sum(),
        farcaster_publishes: stats
            .get(&FARCASTER_CHAIN_ID)
            .map(|s| s.publish.total_count)
            .unwrap_or(0),
        chains,
    }
}

/// Month-over-month growth of new users, in whole percent
///
/// 0 with fewer than two months of data, 100 when the previous month had no sign-ups.
pub fn user_growth_rate(analytics: &UserAnalytics) -> i64 {
    let growth = &analytics.user_growth;
    if growth.len() < 2 {
        return 0;
    }
    let last = growth[growth.len() - 1].count as f64;
    let previous = growth[growth.len() - 2].count as f64;
    percent_change(last, previous).round() as i64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub total_users: u64,
    pub growth_rate: i64,
    pub active_users_last_30_days: u64,
    pub users_with_canvases: u64,
    pub evm_users: u64,
    pub solana_users: u64,
    pub farcaster_users: u64,
}

pub fn summarize_users(analytics: &UserAnalytics) -> UserSummary {
    UserSummary {
        total_users: analytics.total_users,
        growth_rate: user_growth_rate(analytics),
        active_users_last_30_days: analytics.engagement.active_users_last_30_days,
        users_with_canvases: analytics.engagement.users_with_canvases,
        evm_users: analytics.wallet_distribution.evm_users,
        solana_users: analytics.wallet_distribution.solana_users,
        farcaster_users: analytics.social_connections.farcaster_users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChainTransactionStats, ContractArgs, Recipient, TypeTotals, UserGrowthPoint};
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn contract(user_id: i64, chain_id: u64, allocations: &[(&str, f64)], created: DateTime<Utc>) -> SplitContract {
        SplitContract {
            contract_address: format!("0xcontract{}", user_id),
            args_hash: String::new(),
            user_id,
            created_at: created,
            chain_id,
            args: ContractArgs {
                recipients: allocations
                    .iter()
                    .map(|(address, pct)| Recipient {
                        address: address.to_string(),
                        percent_allocation: *pct,
                    })
                    .collect(),
                distributor_fee_percent: None,
            },
        }
    }

    fn edition(chain_id: &str, contract_type: &str, created: DateTime<Utc>) -> MintEdition {
        MintEdition {
            id: 1,
            slug: "slug".to_string(),
            canvas_id: 1,
            contract: "0xedition".to_string(),
            created_at: created,
            hash: "0xhash".to_string(),
            chain_id: chain_id.to_string(),
            contract_type: contract_type.to_string(),
        }
    }

    fn payment(amount: f64, chain_id: &str, created: DateTime<Utc>) -> Payment {
        Payment {
            signature: "sig".to_string(),
            evm_address: "0xpayer".to_string(),
            amount,
            chain_id: chain_id.to_string(),
            token: None,
            created_at: created,
        }
    }

    fn story(ip_type: &str, canvas_id: i64, created: DateTime<Utc>) -> StoryStat {
        StoryStat {
            id: canvas_id,
            ip_type: ip_type.to_string(),
            ip_data: Vec::new(),
            spg_nft_contract: "0xspg".to_string(),
            chain_id: "1514".to_string(),
            created_at: created,
            updated_at: created,
            canvas_id,
        }
    }

    #[test]
    fn test_split_contract_summary() {
        let contracts = vec![
            contract(7, 8453, &[("0xa", 50.0), ("0xb", 50.0)], at(2025, 3, 1)),
            contract(7, 8453, &[("0xa", 34.0), ("0xc", 33.0), ("0xd", 33.0)], at(2025, 3, 1)),
            contract(9, 999_999, &[("0xa", 60.0), ("0xb", 40.0)], at(2025, 3, 4)),
        ];
        let refs: Vec<&SplitContract> = contracts.iter().collect();

        let summary = summarize_split_contracts(&refs, &Utc);

        assert_eq!(summary.total_contracts, 3);
        assert_eq!(summary.unique_recipients, 4);
        // 7 recipients over 3 contracts
        assert_eq!(summary.average_split_size, 2.3);
        assert_eq!(summary.chain_distribution[0].name, "Base");
        assert_eq!(summary.chain_distribution[0].count, 2);
        assert_eq!(summary.chain_distribution[1].name, "Chain 999999");
        assert_eq!(summary.top_users[0], GroupCount { key: 7, count: 2 });
        let labels: Vec<String> = summary
            .allocation_patterns
            .iter()
            .map(|g| g.key.to_string())
            .collect();
        assert_eq!(labels, vec!["50-50 Split", "Equal 3-Way", "Custom Split"]);
        assert_eq!(summary.timeline.len(), 2);
        assert_eq!(summary.timeline[0].count, 2);
    }

    #[test]
    fn test_split_contract_summary_empty() {
        let summary = summarize_split_contracts(&[], &Utc);

        assert_eq!(summary.total_contracts, 0);
        assert_eq!(summary.average_split_size, 0.0);
        assert!(summary.top_users.is_empty());
        assert!(summary.timeline.is_empty());
    }

    #[test]
    fn test_mint_edition_summary() {
        let now = at(2025, 6, 30);
        let editions = vec![
            edition("8453", "ERC1155", at(2025, 6, 29)),
            edition("137", "ERC721", at(2025, 6, 29)),
            edition("137", "ERC1155", at(2025, 6, 1)),
            edition("8453", "ERC1155", at(2025, 1, 1)),
        ];
        let refs: Vec<&MintEdition> = editions.iter().collect();

        let summary = summarize_mint_editions(&refs, now, &Utc);

        assert_eq!(summary.total_contracts, 4);
        // Base and Polygon tie at 2, Base was seen first
        let most_active = summary.most_active_chain.unwrap();
        assert_eq!(most_active.name, "Base");
        assert_eq!(most_active.count, 2);
        assert_eq!(summary.recent_activity, 3);
        assert_eq!(summary.contract_types[0], GroupCount { key: "ERC1155".to_string(), count: 3 });
        assert_eq!(summary.activity.len(), 30);
        assert_eq!(summary.activity.last().unwrap().date, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
        assert_eq!(summary.activity[28].count, 2);
    }

    #[test]
    fn test_mint_edition_summary_empty_has_no_active_chain() {
        let summary = summarize_mint_editions(&[], at(2025, 6, 30), &Utc);

        assert!(summary.most_active_chain.is_none());
        assert_eq!(summary.activity.iter().map(|p| p.count).sum::<usize>(), 0);
    }

    #[test]
    fn test_revenue_summary() {
        let now = at(2025, 3, 15);
        let payments = vec![
            payment(10.0, "8453", at(2025, 2, 3)),
            payment(5.0, "137", at(2025, 3, 1)),
            payment(10.0, "8453", at(2025, 3, 2)),
        ];
        let refs: Vec<&Payment> = payments.iter().collect();

        let summary = summarize_revenue(&refs, now, &Utc);

        assert_eq!(summary.total_revenue, 25.0);
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.monthly_change.this_month, 15.0);
        assert_eq!(summary.monthly_change.last_month, 10.0);
        assert_eq!(summary.monthly_change.percent, 50.0);
        assert_eq!(summary.monthly_change.direction, Trend::Up);
        assert_eq!(summary.revenue_by_chain[0].key, "Base");
        assert_eq!(summary.revenue_by_chain[0].total, 20.0);
        let running: Vec<f64> = summary.cumulative_revenue.iter().map(|p| p.amount).collect();
        assert_eq!(running, vec![10.0, 15.0, 25.0]);
    }

    #[test]
    fn test_monthly_change_down_reports_absolute_percent() {
        let payments = vec![payment(40.0, "1", at(2024, 12, 5)), payment(10.0, "1", at(2025, 1, 5))];
        let refs: Vec<&Payment> = payments.iter().collect();

        let change = monthly_change(&refs, at(2025, 1, 20), &Utc);

        assert_eq!(change.percent, 75.0);
        assert_eq!(change.direction, Trend::Down);
    }

    #[test]
    fn test_monthly_change_zero_baseline_is_full_growth() {
        let payments = vec![payment(3.0, "1", at(2025, 5, 2))];
        let refs: Vec<&Payment> = payments.iter().collect();

        let change = monthly_change(&refs, at(2025, 5, 20), &Utc);

        assert_eq!(change.percent, 100.0);
        assert_eq!(change.direction, Trend::Up);
    }

    #[test]
    fn test_monthly_change_no_payments() {
        assert_eq!(monthly_change(&[], at(2025, 5, 20), &Utc), MonthlyChange::flat());
    }

    #[test]
    fn test_story_summary() {
        let stats = vec![
            story("fresh_ip", 1, at(2025, 4, 1)),
            story("derivative_ip", 1, at(2025, 4, 1)),
            story("1", 2, at(2025, 4, 2)),
            story("fresh_ip", 3, at(2025, 4, 3)),
        ];
        let refs: Vec<&StoryStat> = stats.iter().collect();

        let summary = summarize_story(&refs, &Utc);

        assert_eq!(summary.total_ips, 4);
        assert_eq!(summary.fresh_ips, 2);
        assert_eq!(summary.derivative_ips, 1);
        assert_eq!(
            summary.ip_type_distribution,
            vec![
                GroupCount { key: "Fresh IP".to_string(), count: 3 },
                GroupCount { key: "Derivative IP".to_string(), count: 1 },
            ]
        );
        assert_eq!(summary.top_canvases[0], GroupCount { key: 1, count: 2 });
        assert_eq!(summary.timeline.len(), 3);
    }

    #[test]
    fn test_ip_type_label_passes_unknown_values_through() {
        assert_eq!(ip_type_label("0"), "Derivative IP");
        assert_eq!(ip_type_label("remix"), "remix");
    }

    #[test]
    fn test_transaction_summary_excludes_farcaster() {
        let mut stats = TransactionStats::new();
        stats.insert(
            0,
            ChainTransactionStats {
                publish: TypeTotals { total_count: 12 },
                mint: TypeTotals { total_count: 100 },
                ..Default::default()
            },
        );
        stats.insert(
            8453,
            ChainTransactionStats {
                mint: TypeTotals { total_count: 5 },
                payment: TypeTotals { total_count: 3 },
                ..Default::default()
            },
        );
        stats.insert(
            137,
            ChainTransactionStats {
                mint: TypeTotals { total_count: 2 },
                ..Default::default()
            },
        );

        let summary = summarize_transactions(&stats);

        let names: Vec<&str> = summary.chains.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Polygon", "Base"]);
        assert_eq!(summary.total_mints, 7);
        assert_eq!(summary.total_payments, 3);
        assert_eq!(summary.farcaster_publishes, 12);
    }

    #[test]
    fn test_transaction_summary_without_farcaster_entry() {
        let summary = summarize_transactions(&TransactionStats::new());
        assert_eq!(summary.farcaster_publishes, 0);
        assert!(summary.chains.is_empty());
    }

    fn analytics(counts: &[u64]) -> UserAnalytics {
        UserAnalytics {
            total_users: counts.iter().sum(),
            user_growth: counts
                .iter()
                .enumerate()
                .map(|(i, count)| UserGrowthPoint {
                    month: format!("2025-{:02}", i + 1),
                    count: *count,
                })
                .collect(),
            engagement: Default::default(),
            wallet_distribution: Default::default(),
            social_connections: Default::default(),
        }
    }

    #[test]
    fn test_user_growth_rate() {
        assert_eq!(user_growth_rate(&analytics(&[10])), 0);
        assert_eq!(user_growth_rate(&analytics(&[0, 5])), 100);
        assert_eq!(user_growth_rate(&analytics(&[3, 4])), 33);
        assert_eq!(user_growth_rate(&analytics(&[10, 5])), -50);
    }

    #[test]
    fn test_user_summary() {
        let summary = summarize_users(&analytics(&[10, 20]));
        assert_eq!(summary.total_users, 30);
        assert_eq!(summary.growth_rate, 100);
    }
}
