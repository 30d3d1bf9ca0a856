//! Harness-facing configuration.
//!
//! The engine core never reads these; a harness resolves them before
//! constructing the session (pick a rule file, decide whether the hook is
//! armed at all, point logging somewhere).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const ENV_ENABLED: &str = "FAULTLINE_ENABLED";
pub const ENV_RULE_FILE: &str = "FAULTLINE_RULE_FILE";
pub const ENV_METHOD_FILTER: &str = "FAULTLINE_METHOD_FILTER";
pub const ENV_LOG_DIR: &str = "FAULTLINE_LOG_DIR";
pub const ENV_LOG_FILTER: &str = "FAULTLINE_LOG_LEVEL";

/// Settings the surrounding harness resolves before the engine exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessSettings {
    /// Whether the interception hook should be armed at all.
    pub enabled: bool,
    /// Location of the JSON rule document.
    pub rule_file: Option<PathBuf>,
    /// Location of the method-filter list handed to the hook.
    pub method_filter: Option<PathBuf>,
    /// Directory for the hook's log output.
    pub log_directory: Option<PathBuf>,
    /// Verbosity directive for the tracing subscriber, e.g. `"debug"`.
    pub log_filter: String,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            rule_file: None,
            method_filter: None,
            log_directory: None,
            log_filter: "info".to_string(),
        }
    }
}

impl HarnessSettings {
    /// Resolve settings from `FAULTLINE_*` environment variables; anything
    /// unset falls back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var(ENV_ENABLED)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.enabled),
            rule_file: env_path(ENV_RULE_FILE),
            method_filter: env_path(ENV_METHOD_FILTER),
            log_directory: env_path(ENV_LOG_DIR),
            log_filter: std::env::var(ENV_LOG_FILTER).unwrap_or(defaults.log_filter),
        }
    }

    /// Collect every misconfiguration instead of stopping at the first, so
    /// a harness can report them all in one pass before refusing to start.
    pub fn problems(&self) -> Vec<SettingsProblem> {
        let mut problems = Vec::new();
        if self.enabled && self.rule_file.is_none() {
            problems.push(SettingsProblem::MissingRuleFile);
        }
        if let Some(path) = &self.rule_file {
            if !path.is_file() {
                problems.push(SettingsProblem::RuleFileNotFound { path: path.clone() });
            }
        }
        if let Some(path) = &self.method_filter {
            if !path.is_file() {
                problems.push(SettingsProblem::MethodFilterNotFound { path: path.clone() });
            }
        }
        if let Some(path) = &self.log_directory {
            if !path.is_dir() {
                problems.push(SettingsProblem::LogDirectoryNotFound { path: path.clone() });
            }
        }
        problems
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsProblem {
    #[error("Fault injection is enabled but no rule file is configured")]
    MissingRuleFile,

    #[error("Rule file '{}' does not exist", path.display())]
    RuleFileNotFound { path: PathBuf },

    #[error("Method filter file '{}' does not exist", path.display())]
    MethodFilterNotFound { path: PathBuf },

    #[error("Log directory '{}' does not exist or is not a directory", path.display())]
    LogDirectoryNotFound { path: PathBuf },
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_disarmed() {
        let settings = HarnessSettings::default();
        assert!(!settings.enabled);
        assert!(settings.problems().is_empty());
    }

    #[test]
    fn test_enabled_without_rules_is_a_problem() {
        let settings = HarnessSettings {
            enabled: true,
            ..Default::default()
        };
        assert_eq!(settings.problems(), vec![SettingsProblem::MissingRuleFile]);
    }

    #[test]
    fn test_missing_paths_all_reported() {
        let settings = HarnessSettings {
            enabled: true,
            rule_file: Some(PathBuf::from("/nonexistent/rules.json")),
            method_filter: Some(PathBuf::from("/nonexistent/filter.txt")),
            ..Default::default()
        };
        let problems = settings.problems();
        assert_eq!(problems.len(), 2);
    }
}
