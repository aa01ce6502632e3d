//! Core data models for mintdash
//!
//! This module contains the backend record types, the dataset catalogue, and the
//! query filters that are forwarded to the backend.

pub mod chains;
pub mod client;
pub mod envelope;

pub use chains::{chain_label, chain_name};
pub use client::{BackendClient, Endpoint, EndpointSource};
pub use envelope::{EnvelopeSpec, FetchError, PageEnvelope, PaginationLayout};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::aggregate::Record;
use crate::cache::CacheTtl;

/// Dashboard datasets, one per backend resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    Users,
    MintEditions,
    SplitContracts,
    Revenue,
    Story,
    Transactions,
}

impl Dataset {
    /// All datasets in tab order
    pub const ALL: [Dataset; 6] = [
        Dataset::Users,
        Dataset::MintEditions,
        Dataset::SplitContracts,
        Dataset::Revenue,
        Dataset::Story,
        Dataset::Transactions,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Dataset::Users => "User Analytics",
            Dataset::MintEditions => "Mint Editions",
            Dataset::SplitContracts => "Split Contracts",
            Dataset::Revenue => "Platform Revenue",
            Dataset::Story => "Story IP Data",
            Dataset::Transactions => "Transaction Statistics",
        }
    }

    /// Name accepted on the command line
    pub fn slug(self) -> &'static str {
        match self {
            Dataset::Users => "users",
            Dataset::MintEditions => "mint-editions",
            Dataset::SplitContracts => "split-contracts",
            Dataset::Revenue => "revenue",
            Dataset::Story => "story",
            Dataset::Transactions => "transactions",
        }
    }

    /// Parses a dataset name, accepting a few short aliases
    pub fn from_str(s: &str) -> Option<Dataset> {
        match s.to_lowercase().as_str() {
            "users" | "user" => Some(Dataset::Users),
            "mint-editions" | "mint_editions" | "editions" | "mints" => Some(Dataset::MintEditions),
            "split-contracts" | "split_contracts" | "contracts" | "splits" => {
                Some(Dataset::SplitContracts)
            }
            "revenue" | "platform-revenue" | "payments" => Some(Dataset::Revenue),
            "story" | "story-data" | "ip" => Some(Dataset::Story),
            "transactions" | "transaction-stats" | "tx" => Some(Dataset::Transactions),
            _ => None,
        }
    }

    /// TTL class for cached sweeps of this dataset
    pub fn ttl_class(self) -> CacheTtl {
        match self {
            Dataset::Transactions => CacheTtl::TransactionStats,
            _ => CacheTtl::Analytics,
        }
    }

    /// Paged endpoint backing this dataset; `None` for single-shot datasets
    pub fn endpoint(self) -> Option<Endpoint> {
        match self {
            Dataset::MintEditions => Some(Endpoint::MINT_EDITIONS),
            Dataset::SplitContracts => Some(Endpoint::SPLIT_CONTRACTS),
            Dataset::Revenue => Some(Endpoint::PAYMENTS),
            Dataset::Story => Some(Endpoint::STORY_STATS),
            Dataset::Users | Dataset::Transactions => None,
        }
    }

    /// The part of `filters` the backend honors for this dataset
    pub fn backend_filters(self, filters: &Filters) -> Filters {
        match self.endpoint() {
            Some(endpoint) => filters.restricted_to(endpoint.params),
            None => Filters::default(),
        }
    }

    /// Cache key for this dataset under the given backend filters
    ///
    /// Built from the same filters the request sends, so two loads share a key
    /// only when they send the same query.
    pub fn cache_key(self, filters: &Filters) -> String {
        let filters = self.backend_filters(filters);
        let chain = filters.chain_id.as_deref().unwrap_or("all");
        match self {
            Dataset::Users => "user_analytics_cache".to_string(),
            Dataset::MintEditions => format!(
                "mint_editions_cache_all_{}",
                filters.chain_id.as_deref().unwrap_or("")
            ),
            Dataset::SplitContracts => format!(
                "split_contracts_cache_{}_{}",
                chain,
                filters.user_id.as_deref().unwrap_or("all")
            ),
            Dataset::Revenue => "platform_revenue_cache".to_string(),
            Dataset::Story => format!(
                "story_data_cache_{}_{}",
                filters.ip_type.as_deref().unwrap_or("all"),
                chain
            ),
            Dataset::Transactions => "transaction_stats_cache".to_string(),
        }
    }

    /// Next dataset in tab order, wrapping around
    pub fn next(self) -> Dataset {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous dataset in tab order, wrapping around
    pub fn prev(self) -> Dataset {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A backend query parameter an endpoint may accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterParam {
    Chain,
    User,
    IpType,
}

/// Filters forwarded to the backend as query parameters
///
/// A value of `None` (or the literal `"all"`) means the parameter is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub chain_id: Option<String>,
    pub user_id: Option<String>,
    pub ip_type: Option<String>,
}

fn set_value(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && *v != "all")
        .map(str::to_string)
}

impl Filters {
    /// Keeps only the parameters in `params`, dropping empty and `"all"` values
    pub fn restricted_to(&self, params: &[FilterParam]) -> Filters {
        let keep = |param: FilterParam, value: &Option<String>| {
            if params.contains(&param) {
                set_value(value)
            } else {
                None
            }
        };
        Filters {
            chain_id: keep(FilterParam::Chain, &self.chain_id),
            user_id: keep(FilterParam::User, &self.user_id),
            ip_type: keep(FilterParam::IpType, &self.ip_type),
        }
    }

    /// Query pairs for the parameters that are set
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |name: &'static str, value: &Option<String>| {
            if let Some(v) = set_value(value) {
                pairs.push((name, v));
            }
        };
        push("chainId", &self.chain_id);
        push("userId", &self.user_id);
        push("ipType", &self.ip_type);
        pairs
    }
}

/// One recipient of a split contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    #[serde(rename = "percentAllocation")]
    pub percent_allocation: f64,
}

/// Constructor arguments of a split contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractArgs {
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    #[serde(
        rename = "distributorFeePercent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub distributor_fee_percent: Option<f64>,
}

/// A deployed revenue split contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitContract {
    pub contract_address: String,
    #[serde(default)]
    pub args_hash: String,
    pub user_id: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub chain_id: u64,
    pub args: ContractArgs,
}

/// A minted edition contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintEdition {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "canvasId")]
    pub canvas_id: i64,
    pub contract: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub hash: String,
    #[serde(rename = "chainId", deserialize_with = "string_or_number")]
    pub chain_id: String,
    #[serde(rename = "contractType", default)]
    pub contract_type: String,
}

/// A payment received by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub signature: String,
    pub evm_address: String,
    /// Amount as sent by the backend; unparseable amounts count as zero
    #[serde(deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(deserialize_with = "string_or_number")]
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// IP asset registration details attached to a story stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpData {
    #[serde(rename = "IpId", alias = "ipID", default, skip_serializing_if = "Option::is_none")]
    pub ip_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    #[serde(rename = "tokenId")]
    pub token_id: i64,
    #[serde(rename = "licenseTermsId", default, skip_serializing_if = "Option::is_none")]
    pub license_terms_id: Option<i64>,
}

/// One IP registration on the Story network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryStat {
    pub id: i64,
    #[serde(rename = "ipType", deserialize_with = "string_or_number")]
    pub ip_type: String,
    #[serde(rename = "ipData", default)]
    pub ip_data: Vec<IpData>,
    #[serde(rename = "spgNftContract")]
    pub spg_nft_contract: String,
    #[serde(rename = "chainId", deserialize_with = "string_or_number")]
    pub chain_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "canvasId")]
    pub canvas_id: i64,
}

/// Count of transactions of one type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotals {
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
}

/// Transaction totals by type for a single chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTransactionStats {
    #[serde(rename = "MINT", default)]
    pub mint: TypeTotals,
    #[serde(rename = "PAYMENT", default)]
    pub payment: TypeTotals,
    #[serde(rename = "PUBLISH", default)]
    pub publish: TypeTotals,
}

/// Transaction metrics keyed by chain id
pub type TransactionStats = BTreeMap<u64, ChainTransactionStats>;

/// Users who joined in a given month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGrowthPoint {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLevels {
    #[serde(default)]
    pub low_activity: u64,
    #[serde(default)]
    pub medium_activity: u64,
    #[serde(default)]
    pub high_activity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEngagement {
    #[serde(default)]
    pub users_with_canvases: u64,
    #[serde(default)]
    pub users_with_published_canvases: u64,
    #[serde(default, rename = "activeUsersLast30Days")]
    pub active_users_last_30_days: u64,
    #[serde(default)]
    pub activity_levels: ActivityLevels,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDistribution {
    #[serde(default)]
    pub evm_users: u64,
    #[serde(default)]
    pub solana_users: u64,
    #[serde(default)]
    pub both_wallets: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialConnections {
    #[serde(default)]
    pub farcaster_users: u64,
    #[serde(default)]
    pub lens_users: u64,
    #[serde(default)]
    pub twitter_users: u64,
    #[serde(default, rename = "usersWithMultipleSocials")]
    pub users_with_multiple_socials: u64,
}

/// Platform-wide user statistics, computed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub total_users: u64,
    #[serde(default)]
    pub user_growth: Vec<UserGrowthPoint>,
    #[serde(default)]
    pub engagement: UserEngagement,
    #[serde(default)]
    pub wallet_distribution: WalletDistribution,
    #[serde(default)]
    pub social_connections: SocialConnections,
}

/// Accepts a JSON string or number and keeps it as text
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// Accepts a JSON number, numeric string, or null; anything unparseable becomes 0
fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if amount.is_finite() { amount } else { 0.0 })
}

impl Record for SplitContract {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.contract_address.clone(), self.user_id.to_string()]
    }

    fn chain_key(&self) -> Option<String> {
        Some(self.chain_id.to_string())
    }
}

impl Record for MintEdition {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.contract.clone(), self.slug.clone(), self.hash.clone()]
    }

    fn chain_key(&self) -> Option<String> {
        Some(self.chain_id.clone())
    }
}

impl Record for Payment {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.signature.clone(), self.evm_address.clone()]
    }

    fn chain_key(&self) -> Option<String> {
        Some(self.chain_id.clone())
    }
}

impl Record for StoryStat {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.spg_nft_contract.clone(),
            self.canvas_id.to_string(),
            self.ip_type.clone(),
        ]
    }

    fn chain_key(&self) -> Option<String> {
        Some(self.chain_id.clone())
    }
}
