use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use waymark::{Config, Trail, TreeDefinition};

#[derive(Parser, Debug)]
#[command(name = "waymark")]
#[command(author, version, about = "Guided input over branching decision trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick a path through a tree interactively; prints the answers as JSON
    Run {
        /// Tree file (.toml or .json)
        tree: PathBuf,

        /// Write logs to this file (the terminal is busy with the picker)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Replay values through a tree and show the resulting trail
    Walk {
        /// Tree file (.toml or .json)
        tree: PathBuf,

        /// Values to decide, in order
        values: Vec<String>,

        /// Print the trail as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a tree and report broken references and unreachable skips
    Check {
        /// Tree file (.toml or .json)
        tree: PathBuf,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Command::Run { tree, log_file } => {
            // Logging to the terminal would draw over the picker
            if let Some(path) = &log_file {
                if let Err(e) = init_logging(cli.verbose, Some(path)) {
                    eprintln!("Error: cannot open log file {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
            match waymark::tui::run(&tree, config) {
                Ok(values) => match serde_json::to_string_pretty(&values) {
                    Ok(out) => println!("{}", out),
                    Err(e) => fail(&e.to_string()),
                },
                Err(e) => fail(&e.to_string()),
            }
        }
        Command::Walk { tree, values, json } => {
            let _ = init_logging(cli.verbose, None);
            walk(&tree, &values, json, &config);
        }
        Command::Check { tree } => {
            let _ = init_logging(cli.verbose, None);
            check(&tree, &config);
        }
        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "waymark", &mut io::stdout());
        }
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> io::Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("WAYMARK_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(1);
}

fn load_trail(path: &Path, config: &Config) -> Trail {
    let tree = match TreeDefinition::load(path) {
        Ok(tree) => tree,
        Err(e) => fail(&e.to_string()),
    };
    match Trail::with_max_chain(&tree, config.engine.max_chain) {
        Ok(trail) => trail,
        Err(e) => fail(&e.to_string()),
    }
}

fn walk(path: &Path, values: &[String], as_json: bool, config: &Config) {
    let mut trail = load_trail(path, config);

    for value in values {
        if let Err(e) = trail.advance(value, false) {
            fail(&format!("at '{}': {}", value, e));
        }
    }

    if as_json {
        let decisions: Vec<_> = trail
            .decisions()
            .iter()
            .map(|d| {
                json!({
                    "option": d.option.name,
                    "value": d.value(),
                    "text": d.text(),
                    "implicit": d.implicit,
                })
            })
            .collect();
        let next = trail.current_option().map(|option| {
            json!({
                "option": option.name,
                "title": option.title,
                "editable": option.is_editable(),
                "default": option.default,
                "choices": option.choices,
            })
        });
        let out = json!({
            "decisions": decisions,
            "complete": trail.is_complete(),
            "next": next,
            "values": trail.values(),
        });
        match serde_json::to_string_pretty(&out) {
            Ok(text) => println!("{}", text),
            Err(e) => fail(&e.to_string()),
        }
        return;
    }

    let width = trail
        .decisions()
        .iter()
        .map(|d| d.option.name.len())
        .max()
        .unwrap_or(0);
    for decision in trail.decisions() {
        let name = format!("{:width$}", decision.option.name, width = width);
        if decision.implicit {
            println!("{}  {} {}", name.dimmed(), decision.text(), "(auto)".dimmed());
        } else {
            println!("{}  {}", name.cyan(), decision.text().bold());
        }
    }

    match trail.current_option() {
        None => println!("{}", "✓ complete".green()),
        Some(option) => {
            let title = if option.title.is_empty() {
                &option.name
            } else {
                &option.title
            };
            match &option.choices {
                Some(choices) => {
                    let listed: Vec<String> = choices
                        .iter()
                        .map(|c| format!("{} ({})", c.label, c.value))
                        .collect();
                    println!("{} {}: {}", "→".yellow(), title, listed.join(", "));
                }
                None if option.default.is_empty() => {
                    println!("{} {}: free text", "→".yellow(), title);
                }
                None => {
                    println!(
                        "{} {}: free text (default: {})",
                        "→".yellow(),
                        title,
                        option.default
                    );
                }
            }
        }
    }
}

fn check(path: &Path, config: &Config) {
    let tree = match TreeDefinition::load(path) {
        Ok(tree) => tree,
        Err(e) => fail(&e.to_string()),
    };

    let issues = tree.lint();
    for issue in &issues {
        if issue.is_error() {
            println!("{} {}: {}", "error".red().bold(), issue.location, issue.message);
        } else {
            println!("{} {}: {}", "warning".yellow(), issue.location, issue.message);
        }
    }

    // Lint covers references; building the trail also replays initial values
    if let Err(e) = Trail::with_max_chain(&tree, config.engine.max_chain) {
        println!("{} {}", "error".red().bold(), e);
        std::process::exit(1);
    }

    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        eprintln!("{} error(s) in {}", errors, path.display());
        std::process::exit(1);
    }

    println!(
        "{} {}: {} option(s), {} partial(s), {} warning(s)",
        "✓".green(),
        path.display(),
        tree.options.len(),
        tree.partials.len(),
        issues.len()
    );
}
