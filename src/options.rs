//! Option registry
//!
//! An option is a named question. Fixed options offer a list of choices and
//! the user must pick exactly one. Editable options have no list: whatever the
//! user enters is recorded, falling back to the option's default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrailError};

/// One selectable answer of a fixed option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Identifier compared against branch keys
    pub value: String,
    /// Human-readable label, also what the choice list is filtered on
    #[serde(default)]
    pub label: String,
    /// Text shown once the choice is made (defaults to the label)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            text: None,
        }
    }

    /// Text to display for a decision made with this choice
    pub fn display_text(&self) -> &str {
        match &self.text {
            Some(text) => text,
            None if !self.label.is_empty() => &self.label,
            None => &self.value,
        }
    }

    /// Case-insensitive label prefix match. An empty filter or an unlabeled
    /// choice always matches.
    pub fn matches_filter(&self, filter: &str) -> bool {
        if filter.is_empty() || self.label.is_empty() {
            return true;
        }
        self.label.to_lowercase().starts_with(&filter.to_lowercase())
    }
}

/// Option definition as written in a tree file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub default: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

/// What a decision recorded: a choice from the list, or entered text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    Choice(Choice),
    Entered(String),
}

impl Selection {
    /// Value used to walk the branch map when the trail is replayed
    pub fn value(&self) -> &str {
        match self {
            Selection::Choice(choice) => &choice.value,
            Selection::Entered(text) => text,
        }
    }

    /// Text to render for this selection
    pub fn text(&self) -> &str {
        match self {
            Selection::Choice(choice) => choice.display_text(),
            Selection::Entered(text) => text,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Selection::Choice(choice) if !choice.label.is_empty() => Some(&choice.label),
            _ => None,
        }
    }
}

/// A named question in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionDef {
    pub name: String,
    pub title: String,
    pub default: String,
    pub choices: Option<Vec<Choice>>,
}

impl OptionDef {
    /// Build a definition from its configuration, checking that a choice list
    /// is non-empty and free of duplicate values
    pub fn from_config(name: &str, config: OptionConfig) -> Result<Self> {
        if let Some(choices) = &config.choices {
            if choices.is_empty() {
                return Err(TrailError::InvalidOption {
                    name: name.to_string(),
                    reason: "choices must not be empty".to_string(),
                });
            }
            for (i, choice) in choices.iter().enumerate() {
                if choices[..i].iter().any(|c| c.value == choice.value) {
                    return Err(TrailError::InvalidOption {
                        name: name.to_string(),
                        reason: format!("duplicate choice value '{}'", choice.value),
                    });
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            title: config.title,
            default: config.default,
            choices: config.choices,
        })
    }

    /// Editable options take free text instead of a choice from a list
    pub fn is_editable(&self) -> bool {
        self.choices.is_none()
    }

    /// Resolve a value into what the decision records.
    ///
    /// Fixed options search their choice list. Editable options record the
    /// entered text, or the default when nothing was entered.
    pub fn find_choice(&self, value: &str) -> Result<Selection> {
        match &self.choices {
            Some(choices) => choices
                .iter()
                .find(|c| c.value == value)
                .cloned()
                .map(Selection::Choice)
                .ok_or_else(|| TrailError::ChoiceNotFound(value.to_string())),
            None if value.is_empty() => Ok(Selection::Entered(self.default.clone())),
            None => Ok(Selection::Entered(value.to_string())),
        }
    }

    /// Key a value walks the branch map with. Matches what `find_choice`
    /// records, so replaying a trail takes the same branches.
    pub fn branch_key<'a>(&'a self, value: &'a str) -> &'a str {
        if self.is_editable() && value.is_empty() {
            &self.default
        } else {
            value
        }
    }

    /// The only choice of a single-choice option
    pub fn sole_choice(&self) -> Option<&Choice> {
        match self.choices.as_deref() {
            Some([only]) => Some(only),
            _ => None,
        }
    }

    /// True when the user has nothing to pick: the option is editable or
    /// offers exactly one choice
    pub fn is_forced(&self) -> bool {
        self.is_editable() || self.sole_choice().is_some()
    }

    /// Value taken when a forced option is skipped automatically
    pub fn forced_value(&self) -> &str {
        match self.sole_choice() {
            Some(choice) => &choice.value,
            None => &self.default,
        }
    }

    /// Choices whose label starts with `filter`, ignoring case
    pub fn filter_choices(&self, filter: &str) -> Vec<&Choice> {
        self.choices
            .iter()
            .flatten()
            .filter(|c| c.matches_filter(filter))
            .collect()
    }

    pub fn set_default(&mut self, value: impl Into<String>) {
        self.default = value.into();
    }
}

/// All options of a tree, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionRegistry {
    options: BTreeMap<String, OptionDef>,
}

impl OptionRegistry {
    pub fn build(configs: &BTreeMap<String, OptionConfig>) -> Result<Self> {
        let options = configs
            .iter()
            .map(|(name, config)| Ok((name.clone(), OptionDef::from_config(name, config.clone())?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { options })
    }

    pub fn get(&self, name: &str) -> Result<&OptionDef> {
        self.options
            .get(name)
            .ok_or_else(|| TrailError::UnknownOption(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut OptionDef> {
        self.options
            .get_mut(name)
            .ok_or_else(|| TrailError::UnknownOption(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.values()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
