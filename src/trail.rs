//! The decision trail
//!
//! A trail is the ordered list of decisions made so far plus a cursor: the
//! junction whose question comes next. The cursor is derived state. It is
//! always what replaying the decisions from the root would produce, and
//! `retreat` recomputes it exactly that way.
//!
//! Two rules make the walk feel natural:
//!
//! - **Auto-skip.** When the next junction asks an option with nothing to
//!   pick (editable, or a single choice) and has a `*` branch, the trail
//!   answers it immediately and records an *implicit* decision.
//! - **Implicit cascade.** Undoing an implicit decision keeps undoing until
//!   the last decision the user actually made is gone too.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, TrailError};
use crate::junction::{Junction, JunctionRef};
use crate::options::{OptionDef, OptionRegistry, Selection};
use crate::resolver::Resolver;
use crate::tree::TreeDefinition;

/// Longest auto-skip chain followed before giving up
pub const DEFAULT_MAX_CHAIN: usize = 64;

/// One recorded step of the trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Option that was asked
    pub option: OptionDef,
    /// What was answered
    pub choice: Selection,
    /// Recorded by auto-skip rather than by the caller
    pub implicit: bool,
}

impl Decision {
    /// Value the decision walks the branch map with
    pub fn value(&self) -> &str {
        self.choice.value()
    }

    pub fn text(&self) -> &str {
        self.choice.text()
    }

    /// Hover text in the form "Title: Label", when both are known
    pub fn title(&self) -> Option<String> {
        match self.choice.label() {
            Some(label) if !self.option.title.is_empty() => {
                Some(format!("{}: {}", self.option.title, label))
            }
            _ => None,
        }
    }
}

/// Result of a successful `advance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advanced {
    /// The decision asked for, followed by any auto-skipped ones
    pub appended: Vec<Decision>,
    pub cursor: Junction,
    /// Passed through untouched for the view's focus handling
    pub keep_focus: bool,
}

/// Result of a `retreat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retreated {
    /// Removed decisions in trail order
    pub removed: Vec<Decision>,
    pub cursor: Junction,
}

/// Receives change notifications after every mutating call
pub trait TrailObserver {
    fn decisions_appended(&mut self, decisions: &[Decision], keep_focus: bool);
    fn decisions_removed(&mut self, decisions: &[Decision]);
}

impl<T: TrailObserver> TrailObserver for Rc<RefCell<T>> {
    fn decisions_appended(&mut self, decisions: &[Decision], keep_focus: bool) {
        self.borrow_mut().decisions_appended(decisions, keep_focus);
    }

    fn decisions_removed(&mut self, decisions: &[Decision]) {
        self.borrow_mut().decisions_removed(decisions);
    }
}

/// Decision history and cursor over one tree
pub struct Trail {
    registry: OptionRegistry,
    resolver: Resolver,
    root: JunctionRef,
    decisions: Vec<Decision>,
    current: Junction,
    max_chain: usize,
    observers: Vec<Box<dyn TrailObserver>>,
}

impl fmt::Debug for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trail")
            .field("decisions", &self.decisions)
            .field("current", &self.current)
            .field("max_chain", &self.max_chain)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Trail {
    /// Build a trail at the root of `tree`, then replay its initial values
    pub fn new(tree: &TreeDefinition) -> Result<Self> {
        Self::with_max_chain(tree, DEFAULT_MAX_CHAIN)
    }

    pub fn with_max_chain(tree: &TreeDefinition, max_chain: usize) -> Result<Self> {
        let registry = OptionRegistry::build(&tree.options)?;
        let resolver = Resolver::new(tree.partials.clone());
        let mut trail = Self::start(registry, resolver, tree.path.clone(), max_chain)?;

        for value in &tree.initial_choice_values {
            trail.advance(value, false)?;
        }
        Ok(trail)
    }

    /// Empty trail positioned at the resolved root.
    ///
    /// `max_chain` is how many junctions one `advance` may answer
    /// automatically. Values below 1 are raised to 1.
    pub fn start(
        registry: OptionRegistry,
        resolver: Resolver,
        root: JunctionRef,
        max_chain: usize,
    ) -> Result<Self> {
        let current = resolver.resolve_root(&root)?;
        if let Some(name) = current.option.as_deref() {
            registry.get(name)?;
        }

        Ok(Self {
            registry,
            resolver,
            root,
            decisions: Vec::new(),
            current,
            max_chain: max_chain.max(1),
            observers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: Box<dyn TrailObserver>) {
        self.observers.push(observer);
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn current_junction(&self) -> &Junction {
        &self.current
    }

    /// Option asked at the cursor, `None` once the walk reached an end
    pub fn current_option(&self) -> Option<&OptionDef> {
        self.current
            .option
            .as_deref()
            .and_then(|name| self.registry.get(name).ok())
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_end()
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    pub fn max_chain(&self) -> usize {
        self.max_chain
    }

    /// Values of the decisions the caller made, skipping implicit ones.
    /// Feeding them back as initial values rebuilds this trail, since a
    /// retreat never leaves a run of implicit decisions cut short.
    pub fn values(&self) -> Vec<String> {
        self.decisions
            .iter()
            .filter(|d| !d.implicit)
            .map(|d| d.value().to_string())
            .collect()
    }

    /// Option name to recorded value, for every decision on the trail
    pub fn form_values(&self) -> Vec<(String, String)> {
        self.decisions
            .iter()
            .map(|d| (d.option.name.clone(), d.value().to_string()))
            .collect()
    }

    /// Overwrite the default of an option. Decisions already made keep the
    /// value they recorded.
    pub fn set_default(&mut self, option: &str, value: impl Into<String>) -> Result<()> {
        self.registry.get_mut(option)?.set_default(value);
        Ok(())
    }

    /// Answer the current junction with `value`.
    ///
    /// Records the decision, moves the cursor, and keeps going through any
    /// junctions that offer nothing to pick. The whole chain is worked out
    /// before anything is committed, so on error the trail is unchanged.
    pub fn advance(&mut self, value: &str, keep_focus: bool) -> Result<Advanced> {
        let mut cursor = self.current.clone();
        let mut appended: Vec<Decision> = Vec::new();
        let mut value = value.to_string();
        let mut implicit = false;

        loop {
            if appended.len() > self.max_chain {
                warn!(limit = self.max_chain, "auto-skip chain too long");
                return Err(TrailError::CycleDetected(self.max_chain));
            }

            let name = cursor
                .option
                .as_deref()
                .ok_or_else(|| TrailError::NoPath(value.clone()))?;
            let option = self.registry.get(name)?;
            let next = self
                .resolver
                .next(&cursor.branches, option.branch_key(&value))?;
            let next_option = match next.option.as_deref() {
                Some(next_name) => Some(self.registry.get(next_name)?),
                None => None,
            };
            let choice = option.find_choice(&value)?;

            debug!(
                option = %option.name,
                value = choice.value(),
                implicit,
                "decision recorded"
            );
            appended.push(Decision {
                option: option.clone(),
                choice,
                implicit,
            });

            let skip = match next_option {
                Some(next_option) if next_option.is_forced() && next.branches.has_wildcard() => {
                    Some(next_option.forced_value().to_string())
                }
                _ => None,
            };
            cursor = next;

            match skip {
                Some(forced) => {
                    value = forced;
                    implicit = true;
                }
                None => break,
            }
        }

        self.decisions.extend(appended.iter().cloned());
        self.current = cursor.clone();

        for observer in &mut self.observers {
            observer.decisions_appended(&appended, keep_focus);
        }

        Ok(Advanced {
            appended,
            cursor,
            keep_focus,
        })
    }

    /// Remove decisions from the end of the trail.
    ///
    /// `Some(index)` drops that decision and everything after it. `None`
    /// drops the last one, and does nothing on an empty trail. An implicit
    /// decision is never removed on its own: the cut moves back to the
    /// decision the caller made that led to it, so the trail never stops on
    /// a junction that would have been answered automatically.
    pub fn retreat(&mut self, from: Option<usize>) -> Result<Retreated> {
        let len = self.decisions.len();
        let mut cut = match from {
            Some(index) if index >= len => return Err(TrailError::NoSuchDecision(index)),
            Some(index) => index,
            None if len == 0 => {
                return Ok(Retreated {
                    removed: Vec::new(),
                    cursor: self.current.clone(),
                })
            }
            None => len - 1,
        };

        while cut > 0 && self.decisions[cut].implicit {
            cut -= 1;
        }
        if from.is_some_and(|index| index != cut) {
            debug!(requested = ?from, cut, "retreat moved back to the explicit decision");
        }

        let cursor = self.replay(&self.decisions[..cut])?;
        let removed = self.decisions.split_off(cut);
        self.current = cursor.clone();

        debug!(
            removed = removed.len(),
            remaining = self.decisions.len(),
            "decisions removed"
        );
        for observer in &mut self.observers {
            observer.decisions_removed(&removed);
        }

        Ok(Retreated { removed, cursor })
    }

    /// Clear the trail and return to the root
    pub fn reset(&mut self) -> Result<Retreated> {
        if self.decisions.is_empty() {
            return self.retreat(None);
        }
        self.retreat(Some(0))
    }

    /// The cursor as replaying the current decisions from the root gives it
    pub fn replay_cursor(&self) -> Result<Junction> {
        self.replay(&self.decisions)
    }

    fn replay(&self, decisions: &[Decision]) -> Result<Junction> {
        decisions
            .iter()
            .try_fold(self.resolver.resolve_root(&self.root)?, |junction, decision| {
                self.resolver.next(&junction.branches, decision.value())
            })
    }
}
