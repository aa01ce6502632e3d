//! Dataset loading through the TTL caches
//!
//! A [`Loader`] owns the backend client and the two TTL caches (12 hour analytics
//! and 15 minute transaction stats), both backed by one shared store.

use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStore, CacheTtl, TtlCache};
use crate::config::Config;
use crate::data::{
    BackendClient, Dataset, Endpoint, FetchError, Filters, MintEdition, Payment, SplitContract,
    StoryStat, TransactionStats, UserAnalytics,
};
use crate::fetch::{load_all_cached, load_cached, CachePolicy, Loaded};

/// Store shared by every cache of one loader
pub type SharedStore = Arc<dyn CacheStore + Send + Sync>;

/// Everything a dataset load can produce
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetData {
    Users(UserAnalytics),
    MintEditions(Vec<MintEdition>),
    SplitContracts(Vec<SplitContract>),
    Revenue(Vec<Payment>),
    Story(Vec<StoryStat>),
    Transactions(TransactionStats),
}

impl DatasetData {
    pub fn dataset(&self) -> Dataset {
        match self {
            DatasetData::Users(_) => Dataset::Users,
            DatasetData::MintEditions(_) => Dataset::MintEditions,
            DatasetData::SplitContracts(_) => Dataset::SplitContracts,
            DatasetData::Revenue(_) => Dataset::Revenue,
            DatasetData::Story(_) => Dataset::Story,
            DatasetData::Transactions(_) => Dataset::Transactions,
        }
    }

    /// Number of records held; single-shot datasets count their entries
    pub fn len(&self) -> usize {
        match self {
            DatasetData::Users(a) => a.user_growth.len(),
            DatasetData::MintEditions(v) => v.len(),
            DatasetData::SplitContracts(v) => v.len(),
            DatasetData::Revenue(v) => v.len(),
            DatasetData::Story(v) => v.len(),
            DatasetData::Transactions(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Loader {
    client: BackendClient,
    analytics: TtlCache<SharedStore>,
    transactions: TtlCache<SharedStore>,
    page_size: u32,
    mint_editions_page_size: u32,
}

impl Loader {
    pub fn new(client: BackendClient, store: SharedStore, config: &Config) -> Self {
        Self {
            client,
            analytics: TtlCache::with_class(Arc::clone(&store), CacheTtl::Analytics),
            transactions: TtlCache::with_class(store, CacheTtl::TransactionStats),
            page_size: config.page_size,
            mint_editions_page_size: config.mint_editions_page_size,
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    fn cache_for(&self, dataset: Dataset) -> &TtlCache<SharedStore> {
        match dataset.ttl_class() {
            CacheTtl::TransactionStats => &self.transactions,
            CacheTtl::Analytics => &self.analytics,
        }
    }

    /// Loads one dataset, from the cache when allowed and fresh
    pub async fn load(
        &self,
        dataset: Dataset,
        filters: &Filters,
        policy: CachePolicy,
    ) -> Result<Loaded<DatasetData>, FetchError> {
        let cache = self.cache_for(dataset);
        let key = dataset.cache_key(filters);
        let client = &self.client;

        let loaded = match dataset {
            Dataset::Users => load_cached(cache, &key, policy, || client.fetch_user_analytics())
                .await?
                .map(DatasetData::Users),
            Dataset::Transactions => {
                load_cached(cache, &key, policy, || client.fetch_transaction_stats())
                    .await?
                    .map(DatasetData::Transactions)
            }
            Dataset::MintEditions => load_all_cached(
                cache,
                &key,
                policy,
                &client.pages::<MintEdition>(Endpoint::MINT_EDITIONS),
                self.mint_editions_page_size,
                filters,
            )
            .await?
            .map(DatasetData::MintEditions),
            Dataset::SplitContracts => load_all_cached(
                cache,
                &key,
                policy,
                &client.pages::<SplitContract>(Endpoint::SPLIT_CONTRACTS),
                self.page_size,
                filters,
            )
            .await?
            .map(DatasetData::SplitContracts),
            Dataset::Revenue => load_all_cached(
                cache,
                &key,
                policy,
                &client.pages::<Payment>(Endpoint::PAYMENTS),
                self.page_size,
                filters,
            )
            .await?
            .map(DatasetData::Revenue),
            Dataset::Story => load_all_cached(
                cache,
                &key,
                policy,
                &client.pages::<StoryStat>(Endpoint::STORY_STATS),
                self.page_size,
                filters,
            )
            .await?
            .map(DatasetData::Story),
        };

        info!(
            dataset = %dataset,
            origin = ?loaded.origin,
            records = loaded.data.len(),
            "Dataset loaded"
        );
        Ok(loaded)
    }

    /// Drops the cached entry for one dataset
    pub fn invalidate(&self, dataset: Dataset, filters: &Filters) {
        self.cache_for(dataset).clear(&dataset.cache_key(filters));
    }
}
