//! Tree definitions
//!
//! A tree file bundles everything a trail is built from: the options, the
//! shared partial junctions, the root path, and optionally the values of a
//! trail to restore. TOML and JSON are both accepted, picked by extension.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::TrailError;
use crate::junction::{Junction, JunctionRef, WILDCARD};
use crate::options::OptionConfig;

/// Error type for loading tree files
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported tree format '{}' (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Trail(#[from] TrailError),
}

/// Everything needed to build a trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeDefinition {
    #[serde(default)]
    pub options: BTreeMap<String, OptionConfig>,

    #[serde(default)]
    pub partials: BTreeMap<String, Junction>,

    /// Root junction, inline or by partial name
    pub path: JunctionRef,

    /// Values of a trail to restore, replayed in order on construction
    #[serde(
        default,
        alias = "choices_values",
        alias = "choicesValues",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub initial_choice_values: Vec<String>,
}

impl TreeDefinition {
    pub fn new(path: impl Into<JunctionRef>) -> Self {
        Self {
            options: BTreeMap::new(),
            partials: BTreeMap::new(),
            path: path.into(),
            initial_choice_values: Vec::new(),
        }
    }

    /// Builder-style option declaration
    pub fn option(mut self, name: impl Into<String>, config: OptionConfig) -> Self {
        self.options.insert(name.into(), config);
        self
    }

    /// Builder-style partial declaration
    pub fn partial(mut self, name: impl Into<String>, junction: Junction) -> Self {
        self.partials.insert(name.into(), junction);
        self
    }

    pub fn from_toml_str(src: &str) -> Result<Self, TreeError> {
        Ok(toml::from_str(src)?)
    }

    pub fn from_json_str(src: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Load a tree file, choosing the parser by extension
    pub fn load(path: &Path) -> Result<Self, TreeError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let parse: fn(&str) -> Result<Self, TreeError> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(TreeError::UnsupportedFormat(path.to_path_buf())),
        };
        let contents = std::fs::read_to_string(path).map_err(|source| TreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&contents)
    }

    /// Walk every junction reachable from the root and every partial,
    /// reporting what the engine would only discover mid-walk
    pub fn lint(&self) -> Vec<LintIssue> {
        let mut linter = Linter {
            tree: self,
            issues: Vec::new(),
            visited: HashSet::new(),
        };

        for (name, config) in &self.options {
            if let Err(err) = crate::options::OptionDef::from_config(name, config.clone()) {
                linter.error(format!("options.{}", name), err.to_string());
            }
        }

        linter.visit_ref(&self.path, "path");
        for name in self.partials.keys() {
            linter.visit_partial(name, &format!("partials.{}", name));
        }

        linter.issues
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One finding of [`TreeDefinition::lint`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    /// Dotted location of the junction, e.g. `path.branches.r`
    pub location: String,
    pub message: String,
}

impl LintIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}: {}", severity, self.location, self.message)
    }
}

struct Linter<'a> {
    tree: &'a TreeDefinition,
    issues: Vec<LintIssue>,
    visited: HashSet<&'a str>,
}

impl<'a> Linter<'a> {
    fn error(&mut self, location: String, message: String) {
        self.issues.push(LintIssue {
            severity: Severity::Error,
            location,
            message,
        });
    }

    fn warning(&mut self, location: String, message: String) {
        self.issues.push(LintIssue {
            severity: Severity::Warning,
            location,
            message,
        });
    }

    fn visit_ref(&mut self, target: &'a JunctionRef, location: &str) {
        match target {
            JunctionRef::Partial(name) => {
                if self.tree.partials.contains_key(name) {
                    self.visit_partial(name, &format!("partials.{}", name));
                } else {
                    self.error(location.to_string(), format!("unknown partial '{}'", name));
                }
            }
            JunctionRef::Inline(junction) => self.visit_junction(junction, location),
        }
    }

    fn visit_partial(&mut self, name: &'a str, location: &str) {
        if !self.visited.insert(name) {
            return;
        }
        let tree = self.tree;
        if let Some(junction) = tree.partials.get(name) {
            self.visit_junction(junction, location);
        }
    }

    fn visit_junction(&mut self, junction: &'a Junction, location: &str) {
        let tree = self.tree;
        match junction.option.as_deref() {
            None if !junction.branches.is_empty() => {
                self.error(
                    location.to_string(),
                    "branches on a junction without an option can never be taken".to_string(),
                );
            }
            None => {}
            Some(name) => match tree.options.get(name) {
                None => self.error(location.to_string(), format!("unknown option '{}'", name)),
                Some(config) => self.check_branches(name, config, junction, location),
            },
        }

        for (key, target) in junction.branches.iter() {
            self.visit_ref(target, &format!("{}.branches.{}", location, key));
        }
    }

    fn check_branches(&mut self, name: &str, config: &OptionConfig, junction: &Junction, location: &str) {
        if let Some(choices) = &config.choices {
            for key in junction.branches.keys().filter(|k| *k != WILDCARD) {
                if !choices.iter().any(|c| c.value == key) {
                    self.warning(
                        format!("{}.branches.{}", location, key),
                        format!("'{}' is not a choice of option '{}'", key, name),
                    );
                }
            }
        }

        let forced = match &config.choices {
            Some(choices) => choices.len() == 1,
            None => true,
        };
        if forced && !junction.branches.is_empty() && !junction.branches.has_wildcard() {
            self.warning(
                location.to_string(),
                format!(
                    "option '{}' offers no real choice but has no '*' branch, so it will not be skipped",
                    name
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Choice;

    const SAMPLE: &str = r#"
initial_choice_values = ["r"]

[options.color]
title = "Color"
choices = [
    { value = "r", label = "Red" },
    { value = "b", label = "Blue" },
]

[options.size]
title = "Size"
choices = [{ value = "s", label = "Small" }]

[partials.sized]
option = "size"
[partials.sized.branches.s]

[path]
option = "color"
[path.branches]
r = "sized"
[path.branches.b]
option = "size"
[path.branches.b.branches."*"]
"#;

    #[test]
    fn test_parse_toml_tree() {
        let tree = TreeDefinition::from_toml_str(SAMPLE).unwrap();
        assert_eq!(tree.options.len(), 2);
        assert_eq!(tree.initial_choice_values, vec!["r".to_string()]);
        match &tree.path {
            JunctionRef::Inline(root) => {
                let keys: Vec<_> = root.branches.keys().collect();
                assert_eq!(keys, vec!["r", "b"]);
            }
            other => panic!("expected inline root, got {:?}", other),
        }
        // sized has one choice and no wildcard: flagged, but not an error
        let issues = tree.lint();
        assert!(issues.iter().all(|i| !i.is_error()), "{:?}", issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "partials.sized");
    }

    #[test]
    fn test_parse_json_tree_with_legacy_key() {
        let json = r#"{
            "options": {"note": {"title": "Note", "default": "none"}},
            "path": "start",
            "partials": {"start": {"option": "note", "branches": {"*": {}}}},
            "choices_values": ["hi"]
        }"#;
        let tree = TreeDefinition::from_json_str(json).unwrap();
        assert_eq!(tree.path, JunctionRef::partial("start"));
        assert_eq!(tree.initial_choice_values, vec!["hi".to_string()]);
    }

    #[test]
    fn test_parse_camel_case_restore_key() {
        let json = r#"{
            "options": {"note": {"default": "none"}},
            "path": {"option": "note", "branches": {"*": {}}},
            "choicesValues": ["hi", "again"]
        }"#;
        let tree = TreeDefinition::from_json_str(json).unwrap();
        assert_eq!(tree.initial_choice_values, vec!["hi", "again"]);
    }

    #[test]
    fn test_misspelled_fields_are_rejected() {
        let typo_in_junction = r#"
[options.color]
choices = [{ value = "r" }, { value = "b" }]

[path]
option = "color"
[path.branchs]
r = {}
"#;
        assert!(matches!(
            TreeDefinition::from_toml_str(typo_in_junction),
            Err(TreeError::Toml(_))
        ));

        let typo_in_tree = r#"{"path": {}, "partial": {}}"#;
        assert!(matches!(
            TreeDefinition::from_json_str(typo_in_tree),
            Err(TreeError::Json(_))
        ));
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("tree.toml");
        std::fs::write(&toml_path, SAMPLE).unwrap();
        assert!(TreeDefinition::load(&toml_path).is_ok());

        let yaml_path = dir.path().join("tree.yaml");
        std::fs::write(&yaml_path, "path: x").unwrap();
        assert!(matches!(
            TreeDefinition::load(&yaml_path),
            Err(TreeError::UnsupportedFormat(_))
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(TreeDefinition::load(&missing), Err(TreeError::Io { .. })));
    }

    #[test]
    fn test_lint_reports_broken_references() {
        let tree = TreeDefinition::new(
            Junction::new("color")
                .branch("r", JunctionRef::partial("missing"))
                .branch("g", Junction::new("ghost"))
                .branch("x", Junction::end()),
        )
        .option(
            "color",
            OptionConfig {
                choices: Some(vec![Choice::new("r", "Red"), Choice::new("g", "Green")]),
                ..Default::default()
            },
        );

        let issues = tree.lint();
        let errors: Vec<_> = issues.iter().filter(|i| i.is_error()).collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|i| i.message == "unknown partial 'missing'"));
        assert!(errors
            .iter()
            .any(|i| i.location == "path.branches.g" && i.message == "unknown option 'ghost'"));
        assert!(issues
            .iter()
            .any(|i| !i.is_error() && i.location == "path.branches.x"));
    }

    #[test]
    fn test_lint_handles_partial_cycles() {
        let tree = TreeDefinition::new(JunctionRef::partial("loop"))
            .option("note", OptionConfig::default())
            .partial(
                "loop",
                Junction::new("note").branch(WILDCARD, JunctionRef::partial("loop")),
            );
        assert!(tree.lint().is_empty());
    }

    #[test]
    fn test_lint_warns_on_forced_option_without_wildcard() {
        let tree = TreeDefinition::new(Junction::new("note").branch("a", Junction::end()))
            .option("note", OptionConfig::default());
        let issues = tree.lint();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].location, "path");
    }
}
