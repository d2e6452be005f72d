//! Scan occurrence configuration document and the embedded login script.
//!
//! Only the FORM authentication branch is modelled; every link in the
//! chain down to `script_body` is optional because absence is a normal
//! "nothing to check" outcome.

use serde::Deserialize;
use serde_json::Value;

/// A granular scan execution record.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScanOccurrence {
    pub scan_occurrence_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanConfiguration {
    #[serde(default)]
    pub auth_configuration: Option<AuthConfiguration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfiguration {
    #[serde(default)]
    pub authentications: Option<Authentications>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authentications {
    #[serde(rename = "FORM", default)]
    pub form: Option<FormAuthentication>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormAuthentication {
    #[serde(default)]
    pub login_script_data: Option<LoginScriptData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginScriptData {
    /// Serialized `LoginScript` JSON.
    #[serde(default)]
    pub script_body: Option<String>,
}

impl ScanConfiguration {
    pub fn form_authentication(&self) -> Option<&FormAuthentication> {
        self.auth_configuration
            .as_ref()?
            .authentications
            .as_ref()?
            .form
            .as_ref()
    }

    /// Non-empty `script_body` of the FORM login script, if configured.
    pub fn script_body(&self) -> Option<&str> {
        self.form_authentication()?
            .login_script_data
            .as_ref()?
            .script_body
            .as_deref()
            .filter(|body| !body.is_empty())
    }
}

/// Recorded browser automation script used to log in before scanning.
///
/// Shaped `{ "tests": [ { "commands": [ { "command": .. }, .. ] }, .. ] }`.
/// Only `tests[0].commands` is walked; everything else is left untyped so
/// fields that are never consulted cannot fail the parse.
#[derive(Debug, Clone, Default)]
pub struct LoginScript(Value);

impl LoginScript {
    /// Parse a `script_body`. Fails only when the body is not JSON.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body).map(Self)
    }

    /// Final command of the first test. `None` when there are no tests or
    /// the first test has no commands. A final step without a string
    /// `command` reads as the empty command.
    pub fn last_command(&self) -> Option<&str> {
        let last = self.0.pointer("/tests/0/commands")?.as_array()?.last()?;
        Some(last.get("command").and_then(Value::as_str).unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn script_body_through_full_chain() {
        let config: ScanConfiguration = serde_json::from_value(json!({
            "auth_configuration": {
                "authentications": {
                    "FORM": { "login_script_data": { "script_body": "{\"tests\":[]}" } }
                }
            }
        }))
        .unwrap();
        assert!(config.form_authentication().is_some());
        assert_eq!(config.script_body(), Some("{\"tests\":[]}"));
    }

    #[test]
    fn no_form_authentication() {
        let config: ScanConfiguration = serde_json::from_value(json!({
            "auth_configuration": { "authentications": { "BASIC": { "username": "u" } } }
        }))
        .unwrap();
        assert!(config.form_authentication().is_none());
        assert_eq!(config.script_body(), None);
    }

    #[test]
    fn empty_script_body_is_absent() {
        let config: ScanConfiguration = serde_json::from_value(json!({
            "auth_configuration": {
                "authentications": { "FORM": { "login_script_data": { "script_body": "" } } }
            }
        }))
        .unwrap();
        assert!(config.form_authentication().is_some());
        assert_eq!(config.script_body(), None);
    }

    #[test]
    fn empty_document() {
        let config: ScanConfiguration = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.script_body(), None);
    }

    #[test]
    fn last_command_of_first_test_only() {
        let script = LoginScript::parse(
            &json!({
                "tests": [
                    { "commands": [
                        { "command": "open", "target": "/login" },
                        { "command": "click", "target": "id=submit" }
                    ] },
                    { "commands": [ { "command": "verifyText" } ] }
                ]
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(script.last_command(), Some("click"));
    }

    #[test]
    fn unconsulted_fields_of_any_type_are_ignored() {
        let script = LoginScript::parse(
            r#"{"tests":[{"name":7,"commands":[{"command":"open","value":5,"target":[1]},{"command":"click"}]}]}"#,
        )
        .unwrap();
        assert_eq!(script.last_command(), Some("click"));
    }

    #[test]
    fn later_tests_are_not_walked() {
        let script =
            LoginScript::parse(r#"{"tests":[{"commands":[{"command":"click"}]},{"commands":null}]}"#)
                .unwrap();
        assert_eq!(script.last_command(), Some("click"));
    }

    #[test]
    fn last_step_without_command_is_empty() {
        let script = LoginScript::parse(r#"{"tests":[{"commands":[{"target":"x"}]}]}"#).unwrap();
        assert_eq!(script.last_command(), Some(""));
    }

    #[test]
    fn no_commands_no_last_command() {
        for body in [
            r#"{"tests":[{"commands":[]}]}"#,
            r#"{"tests":[]}"#,
            r#"{"tests":[{}]}"#,
            "{}",
        ] {
            assert_eq!(LoginScript::parse(body).unwrap().last_command(), None, "{body}");
        }
    }

    #[test]
    fn non_json_body_fails_to_parse() {
        assert!(LoginScript::parse("{tests: oops").is_err());
    }

    #[test]
    fn scan_occurrence_deserializes() {
        let occ: ScanOccurrence = serde_json::from_value(json!({
            "scan_occurrence_id": "s1",
            "created_on": "2024-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(occ.scan_occurrence_id, "s1");
    }
}
