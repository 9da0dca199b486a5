//! "Home" screen: continue learning, featured, newest, learning paths.

use crossterm::event::{KeyCode, KeyModifiers};
use lessonhub_core::{AppState, HomeView};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use super::Action;
use crate::widgets::{hint, row, step};

/// A selectable home entry.
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Heading(String),
    Tutorial { slug: String, note: Option<String> },
}

pub(crate) struct HomeScreen {
    entries: Vec<Entry>,
    selected: usize,
}

impl HomeScreen {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
        }
    }

    /// Rebuild the entry list from a fresh view.
    pub(crate) fn refresh(&mut self, view: &HomeView) {
        let mut entries = vec![
            Entry::Heading("Continue learning".into()),
            Entry::Tutorial {
                slug: view.continue_slug.clone(),
                note: None,
            },
        ];
        for (title, slugs) in [("Featured", &view.featured), ("Newest", &view.newest)] {
            entries.push(Entry::Heading(title.into()));
            entries.extend(slugs.iter().map(|slug| Entry::Tutorial {
                slug: slug.clone(),
                note: None,
            }));
        }
        if !view.paths.is_empty() {
            entries.push(Entry::Heading("Learning paths".into()));
            entries.extend(view.paths.iter().map(|p| Entry::Tutorial {
                slug: p.start_slug.clone(),
                note: Some(format!("{} · {} steps", p.name, p.step_count())),
            }));
        }

        self.entries = entries;
        if !matches!(self.entries.get(self.selected), Some(Entry::Tutorial { .. })) {
            self.selected = self.first_selectable_from(0, 1);
        }
    }

    fn first_selectable_from(&self, start: usize, dir: isize) -> usize {
        let mut i = start;
        loop {
            if matches!(self.entries.get(i), Some(Entry::Tutorial { .. })) {
                return i;
            }
            let next = step(i, dir, self.entries.len());
            if next == i {
                return self.selected.min(self.entries.len().saturating_sub(1));
            }
            i = next;
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Progress
                Constraint::Min(1),    // Entries
                Constraint::Length(1), // Hint
            ])
            .split(area);

        let stats = state.stats();
        f.render_widget(
            Paragraph::new(format!(
                "Progress: {}/{} complete ({}%)",
                stats.done, stats.total, stats.percent
            )),
            chunks[0],
        );

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| match entry {
                Entry::Heading(title) => ListItem::new(title.clone())
                    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Entry::Tutorial { slug, note } => {
                    let title = state
                        .find(slug)
                        .map(|t| t.record.display_title().to_string())
                        .unwrap_or_else(|| slug.clone());
                    let done = if state.progress.is_complete(slug) { " ✓" } else { "" };
                    let text = match note {
                        Some(note) => format!("{note}: start with {title}{done}"),
                        None => format!("{title}{done}"),
                    };
                    row(text, i == self.selected)
                }
            })
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Home "));
        f.render_widget(list, chunks[1]);
        f.render_widget(hint("↑/↓ select · Enter open"), chunks[2]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                let prev = step(self.selected, -1, self.entries.len());
                self.selected = self.first_selectable_from(prev, -1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let next = step(self.selected, 1, self.entries.len());
                self.selected = self.first_selectable_from(next, 1);
                Action::None
            }
            KeyCode::Enter => match self.entries.get(self.selected) {
                Some(Entry::Tutorial { slug, .. }) => Action::Open(slug.clone()),
                _ => Action::None,
            },
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use lessonhub_core::LearningPath;

    use super::*;

    fn view() -> HomeView {
        HomeView {
            continue_slug: "intro".into(),
            featured: vec!["gpu".into(), "vram".into()],
            newest: Vec::new(),
            paths: vec![LearningPath {
                name: "Local".into(),
                slugs: vec!["gpu".into()],
                start_slug: "gpu".into(),
                start_title: "GPU".into(),
            }],
        }
    }

    #[test]
    fn navigation_skips_headings() {
        let mut home = HomeScreen::new();
        home.refresh(&view());
        assert!(matches!(home.handle_key(KeyCode::Enter, KeyModifiers::NONE), Action::Open(s) if s == "intro"));

        home.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert!(matches!(home.handle_key(KeyCode::Enter, KeyModifiers::NONE), Action::Open(s) if s == "gpu"));

        home.handle_key(KeyCode::Up, KeyModifiers::NONE);
        home.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert!(matches!(home.handle_key(KeyCode::Enter, KeyModifiers::NONE), Action::Open(s) if s == "intro"));
    }
}
