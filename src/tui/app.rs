//! Application state for the picker
//!
//! `App` owns one trail for the whole session and applies messages to it.
//! Rendering reads from it; nothing else holds the trail.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use crate::config::Config;
use crate::error::TrailError;
use crate::options::{Choice, OptionDef};
use crate::trail::{Decision, Trail, TrailObserver};
use crate::tree::TreeDefinition;

use super::msg::Msg;
use super::state::{self, Focus};

/// Option name to recorded value, kept in step with the trail through its
/// change notifications. When an option was answered more than once, the
/// latest answer still on the trail wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    /// One entry per decision, in trail order
    entries: Vec<(String, String)>,
}

impl FormValues {
    pub fn from_trail(trail: &Trail) -> Self {
        Self {
            entries: trail.form_values(),
        }
    }

    pub fn get(&self, option: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name == option)
            .map(|(_, value)| value.as_str())
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        self.entries.iter().cloned().collect()
    }
}

impl TrailObserver for FormValues {
    fn decisions_appended(&mut self, decisions: &[Decision], _keep_focus: bool) {
        self.entries.extend(
            decisions
                .iter()
                .map(|d| (d.option.name.clone(), d.value().to_string())),
        );
    }

    fn decisions_removed(&mut self, decisions: &[Decision]) {
        // Removals always come off the end of the trail
        let keep = self.entries.len().saturating_sub(decisions.len());
        self.entries.truncate(keep);
    }
}

/// Main application state
pub struct App {
    pub trail: Trail,
    form: Rc<RefCell<FormValues>>,
    tree_path: Option<PathBuf>,
    pub config: Config,

    // Input state
    pub input: String,
    pub active_choice: usize,
    pub focus: Focus,
    pub choices_open: bool,

    // Refresh indicator
    pub reloaded_at: Option<Instant>,

    // Status message
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(
        tree: &TreeDefinition,
        tree_path: Option<PathBuf>,
        config: Config,
    ) -> Result<Self, TrailError> {
        let trail = Trail::with_max_chain(tree, config.engine.max_chain)?;
        let (trail, form) = observed(trail);

        Ok(Self {
            trail,
            form,
            tree_path,
            config,
            input: String::new(),
            active_choice: 0,
            focus: Focus::Input,
            choices_open: true,
            reloaded_at: None,
            status_message: None,
        })
    }

    pub fn tree_path(&self) -> Option<&Path> {
        self.tree_path.as_deref()
    }

    pub fn form_values(&self) -> BTreeMap<String, String> {
        self.form.borrow().values()
    }

    /// Option whose choices the panel shows: the focused segment's, or the
    /// one asked at the cursor
    pub fn panel_option(&self) -> Option<&OptionDef> {
        match self.focus {
            Focus::Segment(i) => self.trail.decisions().get(i).map(|d| &d.option),
            Focus::Input => self.trail.current_option(),
        }
    }

    /// Choices listed in the panel. The input filters only the cursor's list.
    pub fn visible_choices(&self) -> Vec<&Choice> {
        match (self.focus, self.panel_option()) {
            (_, None) => Vec::new(),
            (Focus::Segment(_), Some(option)) => option.filter_choices(""),
            (Focus::Input, Some(option)) => option.filter_choices(&self.input),
        }
    }

    /// Apply one message. Returns true when the picker should quit.
    pub fn update(&mut self, msg: Msg) -> bool {
        match msg {
            Msg::Quit => return true,
            Msg::Noop => {}

            Msg::Input(c) => {
                self.focus = Focus::Input;
                self.input.push(c);
                self.active_choice = 0;
                self.choices_open = true;
            }
            Msg::Backspace => {
                if self.focus == Focus::Input && self.input.pop().is_some() {
                    self.active_choice = 0;
                } else {
                    self.delete_from_here();
                }
            }
            Msg::Submit => self.submit(),

            Msg::MoveUp => {
                self.active_choice = state::move_selection_up(self.active_choice);
                self.choices_open = true;
            }
            Msg::MoveDown => {
                let count = self.visible_choices().len();
                self.active_choice = state::move_selection_down(self.active_choice, count);
                self.choices_open = true;
            }
            Msg::HideChoices => {
                self.choices_open = false;
                self.focus = Focus::Input;
            }

            Msg::FocusPrev => {
                let focus = state::focus_prev(self.focus, self.trail.decisions().len());
                self.set_focus(focus);
            }
            Msg::FocusNext => {
                let focus = state::focus_next(self.focus, self.trail.decisions().len());
                self.set_focus(focus);
            }
            Msg::DeleteFromHere => self.delete_from_here(),
            Msg::Reset => match self.trail.reset() {
                Ok(retreated) if !retreated.removed.is_empty() => {
                    self.after_retreat();
                    self.set_status("Trail cleared".to_string());
                }
                Ok(_) => {}
                Err(e) => self.set_status(e.to_string()),
            },
        }
        false
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.choices_open = true;
        self.active_choice = match focus {
            Focus::Segment(i) => {
                let decision = &self.trail.decisions()[i];
                decision
                    .option
                    .filter_choices("")
                    .iter()
                    .position(|c| c.value == decision.value())
                    .unwrap_or(0)
            }
            Focus::Input => 0,
        };
    }

    fn submit(&mut self) {
        match self.focus {
            Focus::Input => self.submit_input(),
            Focus::Segment(i) => self.submit_segment(i),
        }
    }

    fn submit_input(&mut self) {
        let value = match self.trail.current_option() {
            None => {
                self.set_status("Nothing left to decide".to_string());
                return;
            }
            Some(option) if option.is_editable() => Some(self.input.clone()),
            Some(_) => self
                .visible_choices()
                .get(self.active_choice)
                .map(|choice| choice.value.clone()),
        };
        let Some(value) = value else {
            self.set_status(format!("No choice matches '{}'", self.input));
            return;
        };

        match self.trail.advance(&value, true) {
            Ok(advanced) => {
                self.input.clear();
                self.active_choice = 0;
                self.choices_open = advanced.keep_focus;
                let skipped = advanced.appended.len() - 1;
                if skipped > 0 {
                    self.set_status(format!("Skipped {} step(s) with a single answer", skipped));
                }
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Change a decision already on the trail: everything from it on is
    /// dropped and the new value is decided in its place
    fn submit_segment(&mut self, index: usize) {
        let Some(decision) = self.trail.decisions().get(index) else {
            self.focus = Focus::Input;
            return;
        };
        if decision.implicit {
            self.set_status("That step was taken automatically".to_string());
            return;
        }
        if decision.option.is_editable() {
            self.set_status("Delete this step to change it".to_string());
            return;
        }
        let value = match self.visible_choices().get(self.active_choice) {
            Some(choice) => choice.value.clone(),
            None => return,
        };
        if value == decision.value() {
            self.set_focus(Focus::Input);
            return;
        }

        let restore: Vec<String> = self.trail.decisions()[index..]
            .iter()
            .filter(|d| !d.implicit)
            .map(|d| d.value().to_string())
            .collect();

        if let Err(e) = self.trail.retreat(Some(index)) {
            self.set_status(e.to_string());
            return;
        }
        match self.trail.advance(&value, false) {
            Ok(_) => self.set_status(format!("Changed to '{}', later steps cleared", value)),
            Err(e) => {
                // Put back what was there; these values were valid a moment ago
                for old in &restore {
                    if self.trail.advance(old, false).is_err() {
                        break;
                    }
                }
                self.set_status(e.to_string());
            }
        }
        self.set_focus(Focus::Input);
    }

    fn delete_from_here(&mut self) {
        let from = match self.focus {
            Focus::Segment(i) => Some(i),
            Focus::Input => None,
        };
        match self.trail.retreat(from) {
            Ok(retreated) if retreated.removed.len() > 1 => {
                self.set_status(format!("Removed {} steps", retreated.removed.len()));
            }
            Ok(_) => {}
            Err(e) => self.set_status(e.to_string()),
        }
        self.after_retreat();
    }

    fn after_retreat(&mut self) {
        self.focus = state::clamp_focus(self.focus, self.trail.decisions().len());
        if self.focus == Focus::Input {
            self.input.clear();
        }
        self.active_choice = state::clamp_selection(self.active_choice, self.visible_choices().len());
        self.choices_open = true;
    }

    /// Rebuild the trail from a changed tree, keeping the decisions made so
    /// far when they still fit
    pub fn reload(&mut self, tree: &TreeDefinition) {
        let max_chain = self.config.engine.max_chain;
        let mut restored = tree.clone();
        restored.initial_choice_values = self.trail.values();

        let trail = match Trail::with_max_chain(&restored, max_chain) {
            Ok(trail) => {
                self.set_status("Tree reloaded".to_string());
                trail
            }
            Err(first) => {
                restored.initial_choice_values.clear();
                match Trail::with_max_chain(&restored, max_chain) {
                    Ok(trail) => {
                        self.set_status(format!("Tree reloaded, trail reset: {}", first));
                        trail
                    }
                    Err(e) => {
                        self.set_status(format!("Reload failed: {}", e));
                        return;
                    }
                }
            }
        };

        let (trail, form) = observed(trail);
        self.trail = trail;
        self.form = form;
        self.input.clear();
        self.focus = Focus::Input;
        self.active_choice = 0;
        self.reloaded_at = Some(Instant::now());
    }

    /// Periodic tick for expiring indicators
    pub fn tick(&mut self) {
        // Clear reload indicator after 2 seconds
        if let Some(shown_at) = self.reloaded_at {
            if shown_at.elapsed().as_secs() >= 2 {
                self.reloaded_at = None;
            }
        }

        // Clear status message after 3 seconds
        if let Some((_, shown_at)) = &self.status_message {
            if shown_at.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(m, _)| m.as_str())
    }
}

fn observed(mut trail: Trail) -> (Trail, Rc<RefCell<FormValues>>) {
    let form = Rc::new(RefCell::new(FormValues::from_trail(&trail)));
    trail.subscribe(Box::new(form.clone()));
    (trail, form)
}
