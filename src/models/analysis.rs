//! Analysis and analysis occurrence records from the configservice API.

use serde::{Deserialize, Serialize};

/// Scan category of an analysis. Only web scans carry login scripts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanType {
    WebScan,
    #[serde(other)]
    Other,
}

/// A configured scan definition.
#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub analysis_id: Option<String>,
    #[serde(default)]
    pub scan_type: Option<ScanType>,
    #[serde(rename = "_links", default)]
    pub links: AnalysisLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisLinks {
    #[serde(default)]
    pub latest_occurrence: Option<Link>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: Option<String>,
}

impl Analysis {
    pub fn is_web_scan(&self) -> bool {
        self.scan_type == Some(ScanType::WebScan)
    }

    /// Analysis occurrence id taken from the last path segment of the
    /// `latest_occurrence` link.
    pub fn latest_occurrence_id(&self) -> Option<&str> {
        let href = self.links.latest_occurrence.as_ref()?.href.as_deref()?;
        let path = href.split(['?', '#']).next().unwrap_or(href);
        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
    }
}

/// One execution instance of an analysis.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalysisOccurrence {
    pub analysis_occurrence_id: String,
    pub analysis_id: String,
    #[serde(default)]
    pub scan_type: Option<ScanType>,
    /// ISO-8601 timestamp; absent while the occurrence is still running.
    #[serde(default)]
    pub actual_end_date: Option<String>,
}

impl AnalysisOccurrence {
    pub fn is_web_scan(&self) -> bool {
        self.scan_type == Some(ScanType::WebScan)
    }
}
