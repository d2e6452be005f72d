//! Report rows for scan occurrences with an unverified login script.

use serde::Serialize;

/// A flagged scan occurrence. Serializes to the single `url` report column.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Finding {
    #[serde(skip)]
    pub scan_occurrence_id: String,
    #[serde(skip)]
    pub last_command: String,
    pub url: String,
}

impl Finding {
    pub fn new(web_base_url: &str, scan_occurrence_id: &str, last_command: &str) -> Self {
        Self {
            scan_occurrence_id: scan_occurrence_id.to_string(),
            last_command: last_command.to_string(),
            url: scan_details_url(web_base_url, scan_occurrence_id),
        }
    }
}

/// Deep link to a scan occurrence's detail page in the web UI.
pub fn scan_details_url(web_base_url: &str, scan_occurrence_id: &str) -> String {
    format!(
        "{}/was/#/scanoccurrence/{scan_occurrence_id}/scandetails",
        web_base_url.trim_end_matches('/')
    )
}
