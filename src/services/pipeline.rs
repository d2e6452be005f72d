//! Audit pipeline: discover, expand, inspect, validate, persist.
//!
//! Runs strictly sequentially. Every per-occurrence failure is logged and
//! skipped; only report I/O failures end the run early.

use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::analysis::{Analysis, AnalysisOccurrence};
use crate::services::client::ApiClient;
use crate::services::inspector::{self, Inspection};
use crate::services::pagination;
use crate::services::reducer;
use crate::services::report::{CsvReportSink, ReportSink};
use crate::services::validator::Reporter;

pub const ANALYSES_PATH: &str = "/was/configservice/v1/analyses";
pub const ANALYSIS_OCCURRENCES_PATH: &str = "/was/configservice/v1/analysis_occurrences";

/// How analysis occurrences to audit are discovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Web-scan analyses, following each one's `latest_occurrence` link.
    #[default]
    Analyses,
    /// All analysis occurrences, reduced to the latest web scan per analysis.
    AnalysisOccurrences,
}

impl FromStr for DiscoveryStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analyses" => Ok(Self::Analyses),
            "analysis_occurrences" | "occurrences" => Ok(Self::AnalysisOccurrences),
            other => Err(AppError::Config(format!(
                "unknown discovery strategy '{other}' (expected 'analyses' or 'analysis_occurrences')"
            ))),
        }
    }
}

impl std::fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyses => write!(f, "analyses"),
            Self::AnalysisOccurrences => write!(f, "analysis_occurrences"),
        }
    }
}

/// Settings for a single run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub discovery: DiscoveryStrategy,
    pub page_size: u32,
    pub web_base_url: String,
    pub output_path: PathBuf,
}

/// Counters for a completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Analysis occurrences discovered.
    pub discovered: usize,
    /// Scan occurrence ids returned by resolution, duplicates included.
    pub resolved: usize,
    /// Distinct scan occurrences whose configuration was inspected.
    pub inspected: usize,
    /// Occurrences abandoned on a status, transport or parse failure.
    pub skipped: usize,
    /// Findings written to the report.
    pub findings: usize,
    /// Report path, absent when nothing was discovered.
    pub report_path: Option<PathBuf>,
}

/// Run the whole audit, writing findings to a CSV report.
pub async fn run(client: &ApiClient, options: &PipelineOptions) -> Result<RunSummary, AppError> {
    let occurrence_ids = discover(client, options.discovery, options.page_size).await;

    if occurrence_ids.is_empty() {
        info!("No web scan analysis occurrences found, report not written");
        return Ok(RunSummary::default());
    }

    let sink = Box::new(CsvReportSink::create(&options.output_path)?);
    let mut summary = audit(client, &occurrence_ids, &options.web_base_url, sink).await?;
    summary.report_path = Some(options.output_path.clone());

    info!(
        discovered = summary.discovered,
        resolved = summary.resolved,
        inspected = summary.inspected,
        skipped = summary.skipped,
        findings = summary.findings,
        report = %options.output_path.display(),
        "Audit complete"
    );
    Ok(summary)
}

/// Discover analysis occurrence ids with the chosen strategy, in discovery order.
pub async fn discover(
    client: &ApiClient,
    strategy: DiscoveryStrategy,
    page_size: u32,
) -> Vec<String> {
    let ids = match strategy {
        DiscoveryStrategy::Analyses => {
            let page =
                pagination::fetch_all::<Analysis>(client, ANALYSES_PATH, "analyses", page_size)
                    .await;
            page.records
                .iter()
                .filter(|a| a.is_web_scan())
                .filter_map(|a| {
                    let id = a.latest_occurrence_id();
                    if id.is_none() {
                        debug!(
                            analysis_id = ?a.analysis_id,
                            "Web scan analysis has no latest occurrence"
                        );
                    }
                    id.map(str::to_string)
                })
                .collect()
        }
        DiscoveryStrategy::AnalysisOccurrences => {
            let page = pagination::fetch_all::<AnalysisOccurrence>(
                client,
                ANALYSIS_OCCURRENCES_PATH,
                "analysis_occurrences",
                page_size,
            )
            .await;
            let latest = reducer::reduce(page.records);
            for occurrence in latest.iter() {
                debug!(
                    analysis_id = %occurrence.analysis_id,
                    analysis_occurrence_id = %occurrence.analysis_occurrence_id,
                    actual_end_date = ?occurrence.actual_end_date,
                    "Latest web scan occurrence"
                );
            }
            latest.into_occurrence_ids()
        }
    };

    info!(strategy = %strategy, discovered = ids.len(), "Discovery finished");
    ids
}

/// Expand, inspect and validate each analysis occurrence, writing findings
/// to `sink` as they are produced. The sink is finished on every exit path.
pub async fn audit(
    client: &ApiClient,
    analysis_occurrence_ids: &[String],
    web_base_url: &str,
    mut sink: Box<dyn ReportSink>,
) -> Result<RunSummary, AppError> {
    let mut summary = RunSummary {
        discovered: analysis_occurrence_ids.len(),
        ..RunSummary::default()
    };
    let mut reporter = Reporter::new(web_base_url);
    let mut processed: HashSet<String> = HashSet::new();

    let outcome = audit_into(
        client,
        analysis_occurrence_ids,
        &mut reporter,
        &mut processed,
        sink.as_mut(),
        &mut summary,
    )
    .await;

    let written = sink.finish();
    outcome?;
    summary.findings = written?;
    Ok(summary)
}

async fn audit_into(
    client: &ApiClient,
    analysis_occurrence_ids: &[String],
    reporter: &mut Reporter,
    processed: &mut HashSet<String>,
    sink: &mut dyn ReportSink,
    summary: &mut RunSummary,
) -> Result<(), AppError> {
    for analysis_occurrence_id in analysis_occurrence_ids {
        let scan_occurrence_ids =
            match inspector::resolve_scan_occurrence_ids(client, analysis_occurrence_id).await {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(
                        analysis_occurrence_id = %analysis_occurrence_id,
                        status = e.status(),
                        error = %e,
                        "Failed to retrieve scan occurrences"
                    );
                    summary.skipped += 1;
                    continue;
                }
            };
        summary.resolved += scan_occurrence_ids.len();

        for scan_occurrence_id in scan_occurrence_ids {
            if !processed.insert(scan_occurrence_id.clone()) {
                continue;
            }
            summary.inspected += 1;

            let inspection = match inspector::inspect(client, &scan_occurrence_id).await {
                Ok(inspection) => inspection,
                Err(e) if e.is_skippable() => {
                    warn!(
                        scan_occurrence_id = %scan_occurrence_id,
                        status = e.status(),
                        error = %e,
                        "Skipping scan occurrence"
                    );
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let last_command = match inspection {
                Inspection::LastCommand(command) => command,
                other => {
                    debug!(
                        scan_occurrence_id = %scan_occurrence_id,
                        outcome = ?other,
                        "Nothing to check"
                    );
                    continue;
                }
            };

            if let Some(finding) = reporter.validate(&scan_occurrence_id, &last_command) {
                info!(
                    scan_occurrence_id = %scan_occurrence_id,
                    last_command = %last_command,
                    url = %finding.url,
                    "Invalid last command in login script"
                );
                sink.write_finding(&finding)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_strategy_parses() {
        assert_eq!(
            "analyses".parse::<DiscoveryStrategy>().unwrap(),
            DiscoveryStrategy::Analyses
        );
        assert_eq!(
            "Analysis_Occurrences".parse::<DiscoveryStrategy>().unwrap(),
            DiscoveryStrategy::AnalysisOccurrences
        );
        assert!("scans".parse::<DiscoveryStrategy>().is_err());
    }

    #[test]
    fn discovery_strategy_round_trips_display() {
        for strategy in [DiscoveryStrategy::Analyses, DiscoveryStrategy::AnalysisOccurrences] {
            assert_eq!(strategy.to_string().parse::<DiscoveryStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn default_strategy_is_analyses() {
        assert_eq!(DiscoveryStrategy::default(), DiscoveryStrategy::Analyses);
    }
}
