use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{SweepError, SweepResult};
use crate::validator::check_relative_pattern;
use crate::ScanOptions;

/// Well-known rule file name, looked up in the current directory.
pub const DEFAULT_RULES_FILE: &str = "sweep.rules";
/// Config file picked up from the current directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "sweep.yaml";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_rules_file")]
    pub rules_file: String,

    /// Ignore patterns added to every scan
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Skip patterns added to every scan
    #[serde(default)]
    pub skip: Vec<String>,

    /// Evaluate even if the validator rejects a rule
    #[serde(default)]
    pub skip_validation: bool,

    /// Ask before deleting anything
    #[serde(default = "default_confirm")]
    pub confirm: bool,
}

fn default_rules_file() -> String {
    DEFAULT_RULES_FILE.to_string()
}

fn default_confirm() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
            ignore: Vec::new(),
            skip: Vec::new(),
            skip_validation: false,
            confirm: default_confirm(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> SweepResult<()> {
        if self.rules_file.trim().is_empty() {
            return Err(SweepError::config("rules_file must not be empty"));
        }

        for (field, patterns) in [("ignore", &self.ignore), ("skip", &self.skip)] {
            for pattern in patterns {
                check_relative_pattern(pattern).map_err(|reason| {
                    SweepError::config(format!("{field}: {pattern:?}: {reason}"))
                })?;
            }
        }

        Ok(())
    }

    pub fn from_yaml(text: &str) -> SweepResult<Self> {
        let config: Self = serde_yml::from_str(text)
            .map_err(|e| SweepError::config(format!("config is malformed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`. A missing file is an error: it was asked for explicitly.
    pub fn load_with(path: &Path) -> SweepResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SweepError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        log::debug!("loaded config from {}", path.display());
        Self::from_yaml(&text)
    }

    /// `explicit` if given, else `sweep.yaml` in `cwd` if present, else defaults.
    /// Never creates a file.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> SweepResult<Self> {
        if let Some(path) = explicit {
            return Self::load_with(path);
        }
        let default_path = cwd.join(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            return Self::load_with(&default_path);
        }
        Ok(Self::default())
    }

    pub fn rules_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.rules_file)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            ignore: self.ignore.clone(),
            skip: self.skip.clone(),
            skip_validation: self.skip_validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.rules_file, "sweep.rules");
        assert!(config.confirm);
        assert!(!config.skip_validation);
    }

    #[test]
    fn test_parse_fields() {
        let config = Config::from_yaml(
            "rules_file: cleanup.rules\nignore: [.git]\nskip:\n  - node_modules\nconfirm: false\n",
        )
        .unwrap();
        assert_eq!(config.rules_file, "cleanup.rules");
        assert_eq!(config.ignore, vec![".git"]);
        assert_eq!(config.skip, vec!["node_modules"]);
        assert!(!config.confirm);

        let opts = config.scan_options();
        assert_eq!(opts.ignore, vec![".git"]);
        assert_eq!(opts.skip, vec!["node_modules"]);
    }

    #[test]
    fn test_rejects_escaping_patterns() {
        assert!(matches!(
            Config::from_yaml("ignore: [../up]"),
            Err(SweepError::Config { .. })
        ));
        assert!(Config::from_yaml("skip: [/abs]").is_err());
        assert!(Config::from_yaml("skip: ['']").is_err());
        assert!(Config::from_yaml("rules_file: ''").is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(Config::from_yaml("ignore: {").is_err());
        assert!(Config::from_yaml("confirm: maybe").is_err());
    }

    #[test]
    fn test_load_lookup_order() {
        let cwd = TempDir::new().unwrap();
        // nothing there: defaults, and nothing is written
        assert_eq!(Config::load(None, cwd.path()).unwrap(), Config::default());
        assert!(!cwd.path().join(DEFAULT_CONFIG_FILE).exists());

        std::fs::write(cwd.path().join(DEFAULT_CONFIG_FILE), "skip: [vendor]\n").unwrap();
        assert_eq!(Config::load(None, cwd.path()).unwrap().skip, vec!["vendor"]);

        let other = cwd.path().join("other.yaml");
        std::fs::write(&other, "ignore: [.hg]\n").unwrap();
        let config = Config::load(Some(&other), cwd.path()).unwrap();
        assert_eq!(config.ignore, vec![".hg"]);
        assert!(config.skip.is_empty());

        assert!(Config::load(Some(&cwd.path().join("missing.yaml")), cwd.path()).is_err());
    }
}
