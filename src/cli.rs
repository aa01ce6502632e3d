//! Command-line interface parsing for mintdash
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the dataset, backend filters and client-side filters the app starts with.

use clap::Parser;
use thiserror::Error;

use crate::aggregate::{DateWindow, FilterState};
use crate::data::{Dataset, Filters};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified dataset name is not recognized
    #[error("Invalid dataset: '{0}'. Valid datasets: users, mint-editions, split-contracts, revenue, story, transactions")]
    InvalidDataset(String),

    /// The specified date range is not recognized
    #[error("Invalid range: '{0}'. Valid ranges: 7, 30, 90, 365, all")]
    InvalidRange(String),
}

/// mintdash - analytics dashboard for on-chain minting activity
#[derive(Parser, Debug)]
#[command(name = "mintdash")]
#[command(about = "Terminal analytics dashboard for on-chain minting activity")]
#[command(version)]
pub struct Cli {
    /// Dataset to open
    ///
    /// Valid datasets: users, mint-editions, split-contracts, revenue, story, transactions
    #[arg(long, short, value_name = "DATASET", default_value = "users")]
    pub dataset: String,

    /// Only request records on this chain id
    #[arg(long, value_name = "ID")]
    pub chain: Option<String>,

    /// Only request split contracts created by this user id
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,

    /// Only request story registrations of this IP type
    #[arg(long, value_name = "TYPE")]
    pub ip_type: Option<String>,

    /// Date range in days (7, 30, 90, 365) or "all"
    #[arg(long, short, value_name = "RANGE", default_value = "30")]
    pub range: String,

    /// Free-text search applied to the loaded records
    #[arg(long, short, value_name = "TEXT")]
    pub search: Option<String>,

    /// Ignore fresh cache entries and fetch from the backend
    #[arg(long)]
    pub refresh: bool,

    /// Print a JSON report to stdout instead of starting the dashboard
    #[arg(long)]
    pub json: bool,

    /// Backend base URL, overriding the environment
    #[arg(long, value_name = "URL", env = "MINTDASH_API_URL")]
    pub api_url: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub dataset: Dataset,
    /// Filters forwarded to the backend
    pub filters: Filters,
    /// Filters applied to loaded records
    pub view: FilterState,
    pub refresh: bool,
    pub json: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        StartupConfig {
            dataset: Dataset::Users,
            filters: Filters::default(),
            view: FilterState::default(),
            refresh: false,
            json: false,
        }
    }
}

/// Parses a dataset argument
pub fn parse_dataset_arg(s: &str) -> Result<Dataset, CliError> {
    Dataset::from_str(s).ok_or_else(|| CliError::InvalidDataset(s.to_string()))
}

/// Parses a range argument
pub fn parse_range_arg(s: &str) -> Result<DateWindow, CliError> {
    DateWindow::parse(s).ok_or_else(|| CliError::InvalidRange(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the selected dataset and filters
    /// * `Err(CliError)` if the dataset or range is not recognized
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let dataset = parse_dataset_arg(&cli.dataset)?;
        let window = parse_range_arg(&cli.range)?;

        let filters = Filters {
            chain_id: cli.chain.clone(),
            user_id: cli.user.clone(),
            ip_type: cli.ip_type.clone(),
        };

        let view = FilterState {
            search: cli.search.clone().unwrap_or_default(),
            window,
            chain: None,
        };

        Ok(StartupConfig {
            dataset,
            filters,
            view,
            refresh: cli.refresh,
            json: cli.json,
        })
    }
}
