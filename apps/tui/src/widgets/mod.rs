//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::{ListItem, Paragraph};

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(Color::DarkGray).fg(Color::White))
}

/// A list row with the selection marker and highlight applied.
pub(crate) fn row(text: String, selected: bool) -> ListItem<'static> {
    let (prefix, style) = if selected {
        ("▸ ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    } else {
        ("  ", Style::default())
    };
    ListItem::new(format!("{prefix}{text}")).style(style)
}

/// Dimmed single-line hint.
pub(crate) fn hint(msg: &str) -> Paragraph<'_> {
    Paragraph::new(msg)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
}

/// Move `selected` by `delta` within `0..len`.
pub(crate) fn step(selected: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    selected.saturating_add_signed(delta).min(len - 1)
}
