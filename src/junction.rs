//! Junctions: the nodes of a decision tree
//!
//! A junction asks one option and maps each possible answer to the next
//! junction. Targets are either written inline or name a shared partial.
//! Branch order is kept exactly as declared, duplicates included, because the
//! first matching key wins.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Branch key taken when no key matches exactly
pub const WILDCARD: &str = "*";

/// A node in the decision graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Junction {
    /// Option asked here. `None` marks an end junction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,

    #[serde(default, skip_serializing_if = "Branches::is_empty")]
    pub branches: Branches,
}

impl Junction {
    pub fn new(option: impl Into<String>) -> Self {
        Self {
            option: Some(option.into()),
            branches: Branches::default(),
        }
    }

    /// A junction with nothing left to ask
    pub fn end() -> Self {
        Self::default()
    }

    /// Builder-style branch declaration
    pub fn branch(mut self, key: impl Into<String>, target: impl Into<JunctionRef>) -> Self {
        self.branches.push(key, target);
        self
    }

    pub fn is_end(&self) -> bool {
        self.option.is_none()
    }
}

/// Where a branch leads: an inline junction or the name of a partial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JunctionRef {
    Partial(String),
    Inline(Junction),
}

impl JunctionRef {
    pub fn partial(name: impl Into<String>) -> Self {
        JunctionRef::Partial(name.into())
    }
}

impl From<Junction> for JunctionRef {
    fn from(junction: Junction) -> Self {
        JunctionRef::Inline(junction)
    }
}

/// Ordered branch map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branches(Vec<(String, JunctionRef)>);

impl Branches {
    pub fn push(&mut self, key: impl Into<String>, target: impl Into<JunctionRef>) {
        self.0.push((key.into(), target.into()));
    }

    /// First branch declared for exactly this key
    pub fn exact(&self, key: &str) -> Option<&JunctionRef> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, target)| target)
    }

    pub fn wildcard(&self) -> Option<&JunctionRef> {
        self.exact(WILDCARD)
    }

    pub fn has_wildcard(&self) -> bool {
        self.wildcard().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JunctionRef)> {
        self.0.iter().map(|(k, target)| (k.as_str(), target))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Branches {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, target) in &self.0 {
            map.serialize_entry(key, target)?;
        }
        map.end()
    }
}

struct BranchesVisitor;

impl<'de> Visitor<'de> for BranchesVisitor {
    type Value = Branches;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from choice value to junction or partial name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Branches, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, target)) = access.next_entry::<String, JunctionRef>()? {
            entries.push((key, target));
        }
        Ok(Branches(entries))
    }
}

impl<'de> Deserialize<'de> for Branches {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BranchesVisitor)
    }
}
