//! Non-interactive JSON report
//!
//! Prints the loaded dataset in the backend's success envelope, restricted to the
//! records that pass the filters, with a computed `totalCount` and the summary
//! the dashboard would show.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::aggregate::{FilterState, Record};
use crate::data::Endpoint;
use crate::fetch::{Loaded, Origin};
use crate::loader::DatasetData;
use crate::present::{build_view, Summary};

#[derive(Debug, Serialize)]
pub struct Report {
    pub status: &'static str,
    pub code: u16,
    pub data: Map<String, Value>,
    pub summary: Summary,
    /// Where the data came from: `cache`, `backend` or `fallback`
    pub source: &'static str,
}

fn source_label(origin: Origin) -> &'static str {
    match origin {
        Origin::Cache => "cache",
        Origin::Backend => "backend",
        Origin::Fallback => "fallback",
    }
}

fn filtered<R: Record + Serialize>(
    records: &[R],
    filters: &FilterState,
    now: DateTime<Utc>,
) -> Result<(Value, usize), serde_json::Error> {
    let kept = filters.apply(records, now);
    Ok((serde_json::to_value(&kept)?, kept.len()))
}

/// Builds the report for a loaded dataset
pub fn build_report<Tz: TimeZone>(
    loaded: &Loaded<DatasetData>,
    filters: &FilterState,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Report, serde_json::Error> {
    let (field, items, total) = match &loaded.data {
        DatasetData::Users(analytics) => (
            "users",
            serde_json::to_value(analytics)?,
            analytics.total_users as usize,
        ),
        DatasetData::Transactions(stats) => ("transactionStats", serde_json::to_value(stats)?, stats.len()),
        DatasetData::MintEditions(v) => {
            let (items, total) = filtered(v, filters, now)?;
            (Endpoint::MINT_EDITIONS.spec.items_field, items, total)
        }
        DatasetData::SplitContracts(v) => {
            let (items, total) = filtered(v, filters, now)?;
            (Endpoint::SPLIT_CONTRACTS.spec.items_field, items, total)
        }
        DatasetData::Revenue(v) => {
            let (items, total) = filtered(v, filters, now)?;
            (Endpoint::PAYMENTS.spec.items_field, items, total)
        }
        DatasetData::Story(v) => {
            let (items, total) = filtered(v, filters, now)?;
            (Endpoint::STORY_STATS.spec.items_field, items, total)
        }
    };

    let mut data = Map::new();
    data.insert(field.to_string(), items);
    data.insert("totalCount".to_string(), json!(total));

    Ok(Report {
        status: "success",
        code: 200,
        data,
        summary: build_view(&loaded.data, filters, now, tz).summary,
        source: source_label(loaded.origin),
    })
}
