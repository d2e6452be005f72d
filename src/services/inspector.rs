//! Scan occurrence resolution and login script inspection.

use crate::errors::AppError;
use crate::models::configuration::{LoginScript, ScanConfiguration, ScanOccurrence};
use crate::models::pagination::PagedEnvelope;
use crate::services::client::ApiClient;

const CONFIG_SERVICE: &str = "/was/configservice/v1";

/// Outcome of inspecting one scan occurrence's configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Inspection {
    NoFormAuthentication,
    NoScriptBody,
    NoCommands,
    LastCommand(String),
}

impl Inspection {
    pub fn last_command(&self) -> Option<&str> {
        match self {
            Self::LastCommand(command) => Some(command.as_str()),
            _ => None,
        }
    }
}

pub fn scan_occurrences_path(analysis_occurrence_id: &str) -> String {
    format!(
        "{CONFIG_SERVICE}/analysis_occurrences/{analysis_occurrence_id}/scan_occurrences?page=0&size=1&sort=created_on,desc"
    )
}

pub fn configuration_path(scan_occurrence_id: &str) -> String {
    format!("{CONFIG_SERVICE}/scan_occurrences/{scan_occurrence_id}/configuration")
}

/// Most recent scan occurrence id(s) for an analysis occurrence.
///
/// Errors are returned to the caller, which logs them and treats the
/// occurrence as resolving to nothing.
pub async fn resolve_scan_occurrence_ids(
    client: &ApiClient,
    analysis_occurrence_id: &str,
) -> Result<Vec<String>, AppError> {
    let envelope: PagedEnvelope = client
        .get(&scan_occurrences_path(analysis_occurrence_id))
        .await?
        .into_json(format!(
            "scan occurrences for analysis occurrence {analysis_occurrence_id}"
        ))?;

    let occurrences: Vec<ScanOccurrence> = envelope.records("scan_occurrences")?;
    Ok(occurrences
        .into_iter()
        .map(|o| o.scan_occurrence_id)
        .collect())
}

/// Fetch a scan occurrence's configuration and extract its login script's
/// final command.
pub async fn inspect(client: &ApiClient, scan_occurrence_id: &str) -> Result<Inspection, AppError> {
    let config: ScanConfiguration = client
        .get(&configuration_path(scan_occurrence_id))
        .await?
        .into_json(format!("configuration for scan occurrence {scan_occurrence_id}"))?;

    inspect_configuration(scan_occurrence_id, &config)
}

/// Walk `auth_configuration.authentications.FORM.login_script_data.script_body`
/// and parse the script. A missing link is a normal outcome; an unparsable
/// script is `AppError::MalformedScript`.
pub fn inspect_configuration(
    scan_occurrence_id: &str,
    config: &ScanConfiguration,
) -> Result<Inspection, AppError> {
    if config.form_authentication().is_none() {
        return Ok(Inspection::NoFormAuthentication);
    }
    let Some(body) = config.script_body() else {
        return Ok(Inspection::NoScriptBody);
    };

    let script = LoginScript::parse(body).map_err(|source| AppError::MalformedScript {
        scan_occurrence_id: scan_occurrence_id.to_string(),
        source,
    })?;

    Ok(match script.last_command() {
        Some(command) => Inspection::LastCommand(command.to_string()),
        None => Inspection::NoCommands,
    })
}
