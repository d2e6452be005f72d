//! Paginated retrieval of list endpoints.
//!
//! Walks pages `0..total_pages` in order. Any failure stops the walk and
//! returns what was collected so far along with the reason.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::models::pagination::{page_path, PagedEnvelope};
use crate::services::client::ApiClient;

/// Why pagination stopped before the last page.
#[derive(Debug, Clone, PartialEq)]
pub enum Truncation {
    /// A page request returned a non-success status.
    Status(u16),
    /// A page request failed at the transport layer.
    Transport(String),
    /// A page body did not match the list envelope.
    Decode(String),
    /// `total_pages` differed from the value reported by the first page.
    TotalPagesChanged { expected: u32, observed: u32 },
}

/// Records collected across pages, in page order.
#[derive(Debug, Clone)]
pub struct PageCollection<T> {
    pub records: Vec<T>,
    pub pages_fetched: u32,
    pub truncated: Option<Truncation>,
}

/// Fetch every page of `base_path`, concatenating `_embedded.<collection>`.
pub async fn fetch_all<T: DeserializeOwned>(
    client: &ApiClient,
    base_path: &str,
    collection: &str,
    page_size: u32,
) -> PageCollection<T> {
    let mut records = Vec::new();
    let mut page = 0;
    let mut total_pages: Option<u32> = None;

    let truncated = loop {
        if page >= total_pages.unwrap_or(1) {
            break None;
        }

        let path = page_path(base_path, page, page_size);
        let response = match client.get(&path).await {
            Ok(response) => response,
            Err(e) => break Some(Truncation::Transport(e.to_string())),
        };
        if !response.is_success() {
            break Some(Truncation::Status(response.status));
        }

        let envelope: PagedEnvelope = match response.json() {
            Ok(envelope) => envelope,
            Err(e) => break Some(Truncation::Decode(e.to_string())),
        };
        match envelope.records::<T>(collection) {
            Ok(mut page_records) => records.append(&mut page_records),
            Err(e) => break Some(Truncation::Decode(e.to_string())),
        }
        page += 1;

        let observed = envelope.total_pages();
        match total_pages {
            None => total_pages = Some(observed),
            Some(expected) if expected != observed => {
                break Some(Truncation::TotalPagesChanged { expected, observed });
            }
            Some(_) => {}
        }
    };

    if let Some(reason) = &truncated {
        warn!(
            collection,
            pages_fetched = page,
            records = records.len(),
            reason = ?reason,
            "Pagination stopped early, continuing with partial results"
        );
    }

    PageCollection {
        records,
        pages_fetched: page,
        truncated,
    }
}
