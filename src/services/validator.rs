//! Terminal-step classification and per-run finding deduplication.

use std::collections::HashSet;

use crate::models::finding::Finding;

/// Commands accepted as the final step of a login script.
pub const VERIFICATION_COMMANDS: [&str; 3] = ["verifyText", "assertText", "waitForElementPresent"];

/// Whether `command` confirms the login actually succeeded.
pub fn is_verification_command(command: &str) -> bool {
    VERIFICATION_COMMANDS.contains(&command)
}

/// Builds findings for unverified login scripts, at most one per scan occurrence.
#[derive(Debug)]
pub struct Reporter {
    web_base_url: String,
    reported: HashSet<String>,
}

impl Reporter {
    pub fn new(web_base_url: impl Into<String>) -> Self {
        Self {
            web_base_url: web_base_url.into(),
            reported: HashSet::new(),
        }
    }

    /// Classify `last_command`. Returns a finding only the first time an
    /// invalid command is seen for `scan_occurrence_id`.
    pub fn validate(&mut self, scan_occurrence_id: &str, last_command: &str) -> Option<Finding> {
        if is_verification_command(last_command) {
            return None;
        }
        if !self.reported.insert(scan_occurrence_id.to_string()) {
            return None;
        }
        Some(Finding::new(
            &self.web_base_url,
            scan_occurrence_id,
            last_command,
        ))
    }

    pub fn reported_count(&self) -> usize {
        self.reported.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEB: &str = "https://web.analysiscenter.veracode.com";

    #[test]
    fn allow_list_is_exact() {
        for command in VERIFICATION_COMMANDS {
            assert!(is_verification_command(command));
        }
        for command in ["click", "", "verifytext", "assertTextPresent", " verifyText", "open"] {
            assert!(!is_verification_command(command), "{command:?} should be rejected");
        }
    }

    #[test]
    fn verification_commands_produce_no_finding() {
        let mut reporter = Reporter::new(WEB);
        assert!(reporter.validate("s1", "verifyText").is_none());
        assert!(reporter.validate("s2", "assertText").is_none());
        assert!(reporter.validate("s3", "waitForElementPresent").is_none());
        assert_eq!(reporter.reported_count(), 0);
    }

    #[test]
    fn other_commands_produce_finding() {
        let mut reporter = Reporter::new(WEB);
        let finding = reporter.validate("s1", "click").unwrap();
        assert_eq!(
            finding.url,
            "https://web.analysiscenter.veracode.com/was/#/scanoccurrence/s1/scandetails"
        );
        assert_eq!(finding.scan_occurrence_id, "s1");

        assert!(reporter.validate("s2", "").is_some());
    }

    #[test]
    fn same_occurrence_reported_once() {
        let mut reporter = Reporter::new(WEB);
        assert!(reporter.validate("s1", "click").is_some());
        assert!(reporter.validate("s1", "click").is_none());
        assert!(reporter.validate("s1", "type").is_none());
        assert_eq!(reporter.reported_count(), 1);
    }
}
