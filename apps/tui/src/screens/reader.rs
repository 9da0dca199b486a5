//! "Reader" screen: a rendered tutorial with saved scroll position.

use crossterm::event::{KeyCode, KeyModifiers};
use lessonhub_core::OpenedTutorial;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::Action;
use crate::widgets::hint;

const PAGE: u16 = 20;

pub(crate) struct ReaderScreen {
    opened: Option<OpenedTutorial>,
    /// Slug and message of the last failed open, for retry.
    error: Option<(String, String)>,
    scroll: u16,
}

impl ReaderScreen {
    pub(crate) fn new() -> Self {
        Self {
            opened: None,
            error: None,
            scroll: 0,
        }
    }

    pub(crate) fn current_slug(&self) -> Option<&str> {
        self.opened.as_ref().map(|o| o.slug.as_str())
    }

    pub(crate) fn scroll(&self) -> u16 {
        self.scroll
    }

    pub(crate) fn show(&mut self, opened: OpenedTutorial) {
        self.opened = Some(opened);
        self.error = None;
        self.scroll = 0;
    }

    pub(crate) fn restore_scroll(&mut self, offset: u64) {
        self.scroll = u16::try_from(offset).unwrap_or(u16::MAX);
    }

    pub(crate) fn fail(&mut self, slug: &str, message: String) {
        self.error = Some((slug.to_string(), message));
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // Body
                Constraint::Length(1), // Hint
            ])
            .split(area);

        if let Some((slug, message)) = &self.error {
            let err = Paragraph::new(format!(
                "Could not open '{slug}'.\n\n{message}\n\nPress 'r' to retry."
            ))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(" Reader "));
            f.render_widget(err, chunks[0]);
            return;
        }

        let Some(opened) = &self.opened else {
            let empty = Paragraph::new("Nothing open.\n\nPick a tutorial on the Home or Browse tab.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Reader "));
            f.render_widget(empty, chunks[0]);
            return;
        };

        let title = format!(" {} › {} ", opened.category, opened.rendered.title);
        let mut body = opened.rendered.markdown.clone();
        if !opened.rendered.links.is_empty() {
            body.push_str(&format!("\nSee also: {}\n", opened.rendered.links.join(", ")));
        }
        let page = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(page, chunks[0]);

        let quiz_hint = if opened.rendered.quizzes.is_empty() {
            ""
        } else {
            " · t take quiz"
        };
        f.render_widget(
            hint(&format!("↑/↓ scroll · PgUp/PgDn page · g top{quiz_hint}")),
            chunks[1],
        );
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        if let Some((slug, _)) = &self.error {
            return match code {
                KeyCode::Char('r') => Action::Open(slug.clone()),
                _ => Action::None,
            };
        }

        match code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll = self.scroll.saturating_add(PAGE),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('t') => {
                return match self.opened.as_ref().and_then(|o| o.rendered.quizzes.first()) {
                    Some(mount) => Action::StartQuiz(mount.clone()),
                    None => Action::Status("This tutorial has no quiz.".into()),
                };
            }
            _ => {}
        }
        Action::None
    }
}
