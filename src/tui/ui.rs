//! UI rendering for the picker

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::App;
use super::state::{accent_color, Focus};

/// Main draw function - orchestrates all rendering
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, trail, choices, footer
    let main_layout = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(3), // Trail
        Constraint::Min(3),    // Choices
        Constraint::Length(1), // Footer/status
    ])
    .split(area);

    draw_header(frame, app, main_layout[0]);
    draw_trail(frame, app, main_layout[1]);
    draw_choices(frame, app, main_layout[2]);
    draw_footer(frame, app, main_layout[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let tree_name = app
        .tree_path()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "tree".to_string());

    let refresh_indicator = if app.reloaded_at.is_some() {
        " [Reloaded]"
    } else {
        ""
    };

    let progress = if app.trail.is_complete() {
        "complete".to_string()
    } else {
        format!("{} decided", app.trail.decisions().len())
    };

    let header_text = format!(" Waymark │ {} │ {}{}", tree_name, progress, refresh_indicator);

    let header =
        Paragraph::new(header_text).style(Style::default().bg(Color::Blue).fg(Color::White).bold());

    frame.render_widget(header, area);
}

/// The trail as a row of segments, followed by the input
fn draw_trail(frame: &mut Frame, app: &App, area: Rect) {
    let accent = accent_color(&app.config.ui.accent);
    let mut spans = Vec::new();

    for (i, decision) in app.trail.decisions().iter().enumerate() {
        let mut style = if decision.implicit {
            Style::default().fg(Color::DarkGray)
        } else if decision.option.is_editable() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        if app.focus == Focus::Segment(i) {
            style = style.fg(Color::Black).bg(accent).bold();
        }
        spans.push(Span::styled(format!(" {} ", decision.text()), style));
        spans.push(Span::raw("›"));
    }

    match app.trail.current_option() {
        Some(option) if app.input.is_empty() => {
            let placeholder = if option.title.is_empty() {
                option.name.as_str()
            } else {
                option.title.as_str()
            };
            spans.push(Span::styled(
                format!(" {}", placeholder),
                Style::default().fg(Color::DarkGray).italic(),
            ));
        }
        Some(_) => {
            spans.push(Span::styled(
                format!(" {}", app.input),
                Style::default().fg(accent),
            ));
        }
        None => {
            spans.push(Span::styled(" ✓", Style::default().fg(Color::Green).bold()));
        }
    }
    if app.focus == Focus::Input && !app.trail.is_complete() {
        spans.push(Span::styled("_", Style::default().fg(accent).rapid_blink()));
    }

    let trail = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(trail, area);
}

fn draw_choices(frame: &mut Frame, app: &App, area: Rect) {
    let accent = accent_color(&app.config.ui.accent);
    let Some(option) = app.panel_option() else {
        let done = Paragraph::new("Nothing left to decide. Esc to finish.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().title(" Done ").borders(Borders::ALL));
        frame.render_widget(done, area);
        return;
    };

    let title = if option.title.is_empty() {
        format!(" {} ", option.name)
    } else {
        format!(" {} ", option.title)
    };
    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    if app.config.ui.show_titles {
        if let Focus::Segment(i) = app.focus {
            if let Some(hover) = app.trail.decisions().get(i).and_then(|d| d.title()) {
                block = block.title_bottom(format!(" {} ", hover));
            }
        }
    }

    if !app.choices_open {
        frame.render_widget(block, area);
        return;
    }

    if option.is_editable() {
        let hint = if option.default.is_empty() {
            "Type a value, Enter to accept".to_string()
        } else {
            format!("Type a value, Enter to accept (default: {})", option.default)
        };
        let editable = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(editable, area);
        return;
    }

    let choices = app.visible_choices();
    if choices.is_empty() {
        let empty = Paragraph::new("No choices match your input")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = choices
        .iter()
        .enumerate()
        .map(|(idx, choice)| {
            let style = if idx == app.active_choice {
                Style::default().fg(Color::Black).bg(accent).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let label = if choice.label.is_empty() {
                choice.value.as_str()
            } else {
                choice.label.as_str()
            };
            ListItem::new(format!(" {}", label)).style(style)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.active_choice));

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let keybinds = match app.focus {
        Focus::Input => "type:filter  ↑/↓:move  Enter:choose  Backspace:undo  ←:segments  Esc:hide/quit",
        Focus::Segment(_) => "↑/↓:move  Enter:change  Del:delete from here  →:next  Esc:back",
    };

    // Show status message if present, otherwise show keybinds
    let footer_text = match app.status() {
        Some(msg) => msg.to_string(),
        None => keybinds.to_string(),
    };

    let footer = Paragraph::new(format!(" {}", footer_text))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(footer, area);
}
