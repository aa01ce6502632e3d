//! Client-side aggregation over fetched records
//!
//! Everything here is pure: records and the current [`FilterState`] go in, counts,
//! timelines and summaries come out.

pub mod datasets;
pub mod filter;
pub mod group;
pub mod pattern;
pub mod stats;
pub mod timeline;

pub use datasets::{
    ip_type_label, summarize_mint_editions, summarize_revenue, summarize_split_contracts,
    summarize_story, summarize_transactions, summarize_users, user_growth_rate, ChainCount,
    MintEditionSummary, MonthlyChange, RevenueSummary, SplitContractSummary, StorySummary,
    TransactionSummary, Trend, UserSummary,
};
pub use filter::{DateWindow, FilterState, Record};
pub use group::{group_by_count, group_by_sum, most_common, top_n, GroupCount, GroupSum, TOP_N};
pub use pattern::SplitPattern;
pub use stats::{average, format_percent, percent_change, percentage, round1};
pub use timeline::{cumulative, cumulative_amounts, daily_counts, daily_sums, last_n_days, AmountPoint, TimelinePoint};
