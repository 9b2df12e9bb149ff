//! Terminal picker for Waymark
//!
//! Renders the trail as a row of segments with the next question's choices
//! underneath. Features:
//! - Type-to-filter choice list with arrow-key selection
//! - Backspace undo, delete-from-here, edit an earlier segment
//! - Auto-reload when the tree file changes, keeping the trail

pub mod app;
pub mod msg; // TEA message types (what happened)
pub mod state; // Pure state transformations (functional core)
pub mod ui;

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{poll, read, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::prelude::*;

use crate::config::Config;
use crate::tree::TreeDefinition;
use app::App;
use msg::key_to_msg;

/// Run the picker over a tree file. Returns the form values of the trail
/// when the user quits.
pub fn run(tree_path: &Path, config: Config) -> Result<BTreeMap<String, String>, Box<dyn std::error::Error>> {
    let tree = TreeDefinition::load(tree_path)?;
    let mut app = App::new(&tree, Some(tree_path.to_path_buf()), config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app, ensuring cleanup happens even on error
    let result = run_app_inner(&mut terminal, &mut app);

    // Restore terminal - this MUST run even if app fails
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result.map(|()| app.form_values())
}

fn run_app_inner<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup file watcher for auto-reload
    let (tx, rx) = mpsc::channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                if event.kind.is_modify() {
                    let _ = tx.send(());
                }
            }
        },
        notify::Config::default(),
    )?;

    if let Some(path) = app.tree_path() {
        watcher.watch(path, RecursiveMode::NonRecursive)?;
    }

    run_event_loop(terminal, app, rx)
}

fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    file_change_rx: mpsc::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Handle input with timeout
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if poll(timeout)? {
            if let Event::Key(key) = read()? {
                if key.kind == KeyEventKind::Press
                    && app.update(key_to_msg(key.code, key.modifiers, app.choices_open))
                {
                    return Ok(()); // Quit signal
                }
            }
        }

        // Check for file changes (non-blocking)
        if file_change_rx.try_recv().is_ok() {
            // Editors often write in bursts; drain the rest
            while file_change_rx.try_recv().is_ok() {}
            reload(app);
        }

        // Tick for indicator expiry
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }
}

fn reload(app: &mut App) {
    let Some(path) = app.tree_path().map(Path::to_path_buf) else {
        return;
    };
    match TreeDefinition::load(&path) {
        Ok(tree) => app.reload(&tree),
        Err(e) => {
            tracing::warn!("reload of {} failed: {}", path.display(), e);
            app.set_status(format!("Reload failed: {}", e));
        }
    }
}
