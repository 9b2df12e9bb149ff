//! Junction resolution
//!
//! Stateless lookups over the partials table: turn a reference into a
//! concrete junction, and pick the branch a value leads to. Partials are
//! resolved lazily, only when a walk actually reaches them, so a partial may
//! be shared by many branches or even loop back on itself by name.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{Result, TrailError};
use crate::junction::{Branches, Junction, JunctionRef};

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    partials: BTreeMap<String, Junction>,
}

impl Resolver {
    pub fn new(partials: BTreeMap<String, Junction>) -> Self {
        Self { partials }
    }

    pub fn partials(&self) -> &BTreeMap<String, Junction> {
        &self.partials
    }

    /// Resolve a reference: names go through the partials table, inline
    /// junctions are returned as they are
    pub fn resolve_root(&self, root: &JunctionRef) -> Result<Junction> {
        match root {
            JunctionRef::Partial(name) => self
                .partials
                .get(name)
                .cloned()
                .ok_or_else(|| TrailError::UnknownPartial(name.clone())),
            JunctionRef::Inline(junction) => Ok(junction.clone()),
        }
    }

    /// The junction `value` leads to from a branch map.
    ///
    /// The first branch declared for the exact value wins, wherever a
    /// wildcard sits in the map. The wildcard is only used when no key
    /// matches.
    pub fn next(&self, branches: &Branches, value: &str) -> Result<Junction> {
        let target = match branches.exact(value) {
            Some(target) => target,
            None => {
                let fallback = branches
                    .wildcard()
                    .ok_or_else(|| TrailError::NoPath(value.to_string()))?;
                trace!(value, "no exact branch, taking wildcard");
                fallback
            }
        };
        self.resolve_root(target)
    }
}
