//! Page envelope validation
//!
//! Every paged backend response goes through [`validate_page`], which turns the
//! raw JSON body into a [`PageEnvelope`] or a [`FetchError`]. Endpoints differ in
//! where they put the items array and the pagination fields; an [`EnvelopeSpec`]
//! describes each layout.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while fetching a page from the backend
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend API responded with status {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body was not valid JSON
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response was JSON but not the expected envelope
    #[error("Invalid data format received from server: {0}")]
    Malformed(String),
}

/// One page of items plus its position in the sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    /// `None` on the last page
    pub next_page: Option<u32>,
    pub total_pages: u32,
}

impl<T> PageEnvelope<T> {
    /// Builds an envelope for `page` of `total_pages`, deriving `next_page`
    pub fn new(items: Vec<T>, current_page: u32, total_pages: u32) -> Self {
        let next_page = (current_page < total_pages).then_some(current_page + 1);
        Self {
            items,
            current_page,
            next_page,
            total_pages,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}

/// Where an endpoint keeps its pagination fields inside `data`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationLayout {
    /// `data.currentPage`, `data.nextPage`, `data.totalPages`
    Flat,
    /// The same fields under `data.<name>`, e.g. `data.pagination` or `data.pages`
    Nested(&'static str),
}

/// Describes the envelope of one paged endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeSpec {
    /// Name of the items array inside `data`
    pub items_field: &'static str,
    pub layout: PaginationLayout,
}

impl EnvelopeSpec {
    pub const fn new(items_field: &'static str, layout: PaginationLayout) -> Self {
        Self {
            items_field,
            layout,
        }
    }
}

/// Validates a backend body for `requested_page` and extracts its items and pagination
///
/// Fails with [`FetchError::Malformed`] when `status` is present but not
/// `"success"`, when `data.<items_field>` is missing or not an array, or when an
/// item does not match `T`.
pub fn validate_page<T: DeserializeOwned>(
    body: Value,
    spec: &EnvelopeSpec,
    requested_page: u32,
) -> Result<PageEnvelope<T>, FetchError> {
    if let Some(status) = body.get("status") {
        if status.as_str() != Some("success") {
            return Err(FetchError::Malformed(format!(
                "unexpected status {}",
                status
            )));
        }
    }

    let data = body
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| FetchError::Malformed("missing data object".to_string()))?;

    let raw_items = data
        .get(spec.items_field)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FetchError::Malformed(format!("missing array field data.{}", spec.items_field))
        })?;

    let items = raw_items
        .iter()
        .cloned()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| FetchError::Malformed(format!("bad item in data.{}: {}", spec.items_field, e)))?;

    let pages = match spec.layout {
        PaginationLayout::Flat => Some(data),
        PaginationLayout::Nested(name) => data.get(name).filter(|p| p.is_object()),
    };

    let current_page = pages
        .and_then(|p| page_number(p.get("currentPage")))
        .unwrap_or(requested_page);
    let total_pages = pages.and_then(|p| page_number(p.get("totalPages")));

    let next_page = match pages.and_then(|p| p.get("nextPage")) {
        Some(Value::Null) => None,
        Some(value) => Some(page_number(Some(value)).ok_or_else(|| {
            FetchError::Malformed(format!("nextPage is not a page number: {}", value))
        })?),
        None => total_pages.and_then(|total| (current_page < total).then_some(current_page + 1)),
    };

    let total_pages = match (total_pages, next_page) {
        (Some(total), _) => total,
        (None, None) => current_page,
        (None, Some(next)) => next.max(current_page + 1),
    };

    Ok(PageEnvelope {
        items,
        current_page,
        next_page,
        total_pages,
    })
}

/// Reads a positive page number sent either as a number or as numeric text
fn page_number(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Item {
        id: u32,
    }

    const FLAT: EnvelopeSpec = EnvelopeSpec::new("splitContracts", PaginationLayout::Flat);
    const PAYMENTS: EnvelopeSpec =
        EnvelopeSpec::new("payments", PaginationLayout::Nested("pagination"));
    const STORY: EnvelopeSpec = EnvelopeSpec::new("stats", PaginationLayout::Nested("pages"));

    #[test]
    fn test_flat_layout_with_next_page() {
        let body = json!({
            "status": "success",
            "code": 200,
            "data": {
                "splitContracts": [{"id": 1}, {"id": 2}],
                "currentPage": 1,
                "nextPage": 2,
                "totalPages": 3
            }
        });

        let page: PageEnvelope<Item> = validate_page(body, &FLAT, 1).unwrap();

        assert_eq!(page.items, vec![Item { id: 1 }, Item { id: 2 }]);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.next_page, Some(2));
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_nested_pagination_last_page() {
        let body = json!({
            "status": "success",
            "data": {
                "payments": [{"id": 9}],
                "pagination": {"currentPage": 4, "nextPage": null, "totalPages": 4}
            }
        });

        let page: PageEnvelope<Item> = validate_page(body, &PAYMENTS, 4).unwrap();

        assert!(page.is_last());
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn test_pages_layout_without_total_pages() {
        let body = json!({
            "status": "success",
            "data": {
                "stats": [],
                "pages": {"currentPage": 2, "nextPage": 3}
            }
        });

        let page: PageEnvelope<Item> = validate_page(body, &STORY, 2).unwrap();

        assert_eq!(page.next_page, Some(3));
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_total_pages_only_derives_next_page() {
        let spec = EnvelopeSpec::new("contracts", PaginationLayout::Flat);
        let middle = json!({"data": {"contracts": [], "currentPage": 1, "totalPages": 2}});
        let last = json!({"data": {"contracts": [], "currentPage": 2, "totalPages": 2}});

        let middle: PageEnvelope<Item> = validate_page(middle, &spec, 1).unwrap();
        let last: PageEnvelope<Item> = validate_page(last, &spec, 2).unwrap();

        assert_eq!(middle.next_page, Some(2));
        assert_eq!(last.next_page, None);
    }

    #[test]
    fn test_missing_pagination_is_last_page() {
        let body = json!({"data": {"splitContracts": [{"id": 1}]}});

        let page: PageEnvelope<Item> = validate_page(body, &FLAT, 5).unwrap();

        assert_eq!(page.current_page, 5);
        assert!(page.is_last());
        assert_eq!(page.total_pages, 5);
    }

    #[test]
    fn test_string_page_numbers_are_accepted() {
        let body = json!({"data": {"splitContracts": [], "currentPage": "1", "nextPage": "2"}});

        let page: PageEnvelope<Item> = validate_page(body, &FLAT, 1).unwrap();

        assert_eq!(page.next_page, Some(2));
    }

    #[test]
    fn test_missing_items_array_is_malformed() {
        let body = json!({"status": "success", "data": {"contracts": []}});

        let err = validate_page::<Item>(body, &FLAT, 1).unwrap_err();

        assert!(matches!(err, FetchError::Malformed(_)));
        assert!(err.to_string().contains("splitContracts"));
    }

    #[test]
    fn test_items_not_array_is_malformed() {
        let body = json!({"data": {"splitContracts": {"id": 1}}});
        assert!(matches!(
            validate_page::<Item>(body, &FLAT, 1),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_error_status_is_malformed() {
        let body = json!({"status": "error", "data": {"splitContracts": []}});
        assert!(matches!(
            validate_page::<Item>(body, &FLAT, 1),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_data_object_is_malformed() {
        let body = json!({"error": "Failed to fetch"});
        assert!(matches!(
            validate_page::<Item>(body, &FLAT, 1),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_item_with_wrong_shape_is_malformed() {
        let body = json!({"data": {"splitContracts": [{"id": "one"}]}});
        assert!(matches!(
            validate_page::<Item>(body, &FLAT, 1),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_bad_next_page_is_malformed() {
        let body = json!({"data": {"splitContracts": [], "nextPage": true}});
        assert!(matches!(
            validate_page::<Item>(body, &FLAT, 1),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_page_envelope_new_derives_next_page() {
        let page = PageEnvelope::new(vec![1, 2], 1, 2);
        assert_eq!(page.next_page, Some(2));
        let page = PageEnvelope::new(vec![3], 2, 2);
        assert!(page.is_last());
    }
}
