//! Waymark - guided input over branching decision trees
//!
//! Walk a user through a tree of questions, one junction at a time, and keep
//! the answers as a trail that can be cut back from any point.
//!
//! # Overview
//!
//! | Piece | Purpose |
//! |-------|---------|
//! | [`OptionRegistry`] | Named questions, fixed (pick one) or editable (free text) |
//! | [`Junction`] | A node asking one option, with branches keyed by answer |
//! | [`Resolver`] | Finds the next junction, with `*` wildcard and shared partials |
//! | [`Trail`] | Decision history plus cursor, `advance` and `retreat` |
//!
//! Junctions that leave nothing to pick are answered automatically, and
//! undoing such an implicit answer also undoes the decision that led to it.
//!
//! # Quick Start
//!
//! ```no_run
//! use waymark::{Trail, TreeDefinition};
//!
//! let tree = TreeDefinition::load("tree.toml".as_ref()).unwrap();
//! let mut trail = Trail::new(&tree).unwrap();
//!
//! // Answer the first question
//! trail.advance("r", false).unwrap();
//!
//! // Undo it again
//! trail.retreat(None).unwrap();
//! assert!(trail.decisions().is_empty());
//! ```

pub mod config;
pub mod error;
pub mod junction;
pub mod options;
pub mod resolver;
pub mod trail;
pub mod tree;
pub mod tui;

pub use config::Config;
pub use error::{Result, TrailError};
pub use junction::{Branches, Junction, JunctionRef, WILDCARD};
pub use options::{Choice, OptionConfig, OptionDef, OptionRegistry, Selection};
pub use resolver::Resolver;
pub use trail::{Advanced, Decision, Retreated, Trail, TrailObserver, DEFAULT_MAX_CHAIN};
pub use tree::{LintIssue, Severity, TreeDefinition, TreeError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify core types are re-exported from crate root
        assert_eq!(WILDCARD, "*");
        assert!(DEFAULT_MAX_CHAIN > 0);
    }
}
