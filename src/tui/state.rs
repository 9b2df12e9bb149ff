//! Pure state transformations for the picker (Functional Core)
//!
//! Index arithmetic for the choice list and the trail segments. No I/O and
//! no trail access, so every rule here is tested in isolation.

use ratatui::style::Color;

/// What keyboard input currently goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The input at the end of the trail
    Input,
    /// A decision segment, by trail index
    Segment(usize),
}

// =============================================================================
// Choice list
// =============================================================================

/// Calculate new active index after moving up
pub fn move_selection_up(current: usize) -> usize {
    current.saturating_sub(1)
}

/// Calculate new active index after moving down
pub fn move_selection_down(current: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        (current + 1).min(max - 1)
    }
}

/// Clamp active index to valid range
pub fn clamp_selection(selected: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        selected.min(max - 1)
    }
}

// =============================================================================
// Segments
// =============================================================================

/// Focus after moving left. From the input, the last segment is next.
pub fn focus_prev(focus: Focus, segments: usize) -> Focus {
    match focus {
        Focus::Input if segments == 0 => Focus::Input,
        Focus::Input => Focus::Segment(segments - 1),
        Focus::Segment(i) => Focus::Segment(i.saturating_sub(1)),
    }
}

/// Focus after moving right. Past the last segment is the input.
pub fn focus_next(focus: Focus, segments: usize) -> Focus {
    match focus {
        Focus::Segment(i) if i + 1 < segments => Focus::Segment(i + 1),
        _ => Focus::Input,
    }
}

/// Keep a segment focus valid after the trail shrank
pub fn clamp_focus(focus: Focus, segments: usize) -> Focus {
    match focus {
        Focus::Segment(i) if i < segments => Focus::Segment(i),
        _ => Focus::Input,
    }
}

/// Parse the configured accent, falling back to cyan
pub fn accent_color(name: &str) -> Color {
    name.parse().unwrap_or(Color::Cyan)
}
