//! Pagination envelope shared by all configservice list endpoints.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

/// Page metadata reported alongside each list response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PageMetadata {
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// HAL-style list response: records live under `_embedded.<collection>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagedEnvelope {
    #[serde(rename = "_embedded", default)]
    pub embedded: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub page: Option<PageMetadata>,
}

impl PagedEnvelope {
    /// Total page count, defaulting to 1 when the metadata is absent.
    pub fn total_pages(&self) -> u32 {
        self.page
            .as_ref()
            .and_then(|p| p.total_pages)
            .unwrap_or(1)
    }

    /// Deserialize the named embedded collection. A missing or null key is an
    /// empty page. Records that do not decode are logged and skipped; only a
    /// collection that is not an array is an error.
    pub fn records<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, serde_json::Error> {
        let Some(value) = self.embedded.get(collection) else {
            return Ok(Vec::new());
        };
        let raw = Option::<Vec<serde_json::Value>>::deserialize(value)?.unwrap_or_default();

        Ok(raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match T::deserialize(record) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(collection, index, error = %e, "Skipping undecodable record");
                    None
                }
            })
            .collect())
    }
}

/// Build a list request path with page parameters.
pub fn page_path(base: &str, page: u32, size: u32) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}page={page}&size={size}")
}
