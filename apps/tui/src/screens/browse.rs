//! "Browse" screen: searchable, filterable tutorial list.

use crossterm::event::{KeyCode, KeyModifiers};
use lessonhub_core::{ALL_CATEGORIES, AppState, Command};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use super::Action;
use crate::widgets::{hint, row, step};

pub(crate) struct BrowseScreen {
    search: String,
    editing: bool,
    selected: usize,
}

impl BrowseScreen {
    pub(crate) fn new() -> Self {
        Self {
            search: String::new(),
            editing: false,
            selected: 0,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// Called when the list contents change.
    pub(crate) fn reset_selection(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Search
                Constraint::Length(1), // Filters
                Constraint::Min(1),    // List
                Constraint::Length(1), // Hint
            ])
            .split(area);

        let search_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let search = Paragraph::new(self.search.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .border_style(search_style),
        );
        f.render_widget(search, chunks[0]);

        let counts = state.category_counts();
        let category = &state.prefs.selected_category;
        let in_category = if category == ALL_CATEGORIES {
            counts.total
        } else {
            counts.by_category.get(category).copied().unwrap_or(0)
        };
        let stats = state.stats();
        let filters = Paragraph::new(format!(
            "Category: {category} ({in_category}) · Sort: {} · Drafts: {} · Done: {}/{} ({}%)",
            state.prefs.sort_mode.label(),
            if state.prefs.show_drafts { "shown" } else { "hidden" },
            stats.done,
            stats.total,
            stats.percent,
        ));
        f.render_widget(filters, chunks[1]);

        let list = state.browse();
        if list.is_empty() {
            let empty = Paragraph::new("No tutorials match.\n\nPress Esc to clear the search.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Tutorials "));
            f.render_widget(empty, chunks[2]);
        } else {
            let items: Vec<ListItem> = list
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let mark = if state.progress.is_complete(t.slug()) { "✓" } else { " " };
                    row(
                        format!(
                            "{mark} {}  [{}]  {}",
                            t.record.display_title(),
                            t.record.category_label(),
                            t.meta_line()
                        ),
                        i == self.selected,
                    )
                })
                .collect();
            let widget = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Tutorials ({}) ", list.len())),
            );
            f.render_widget(widget, chunks[2]);
        }

        f.render_widget(
            hint("/ search · c/C category · s sort · d drafts · Enter open · R reset progress"),
            chunks[3],
        );
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
        state: &AppState,
    ) -> Action {
        if self.editing {
            return self.handle_search_key(code);
        }

        match code {
            KeyCode::Char('/') => {
                self.editing = true;
                Action::None
            }
            KeyCode::Esc if !self.search.is_empty() => {
                self.search.clear();
                Action::Dispatch(Command::ClearSearch)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = step(self.selected, -1, state.browse().len());
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = step(self.selected, 1, state.browse().len());
                Action::None
            }
            KeyCode::Enter => state
                .browse()
                .get(self.selected)
                .map_or(Action::None, |t| Action::Open(t.slug().to_string())),
            KeyCode::Char('c') => Action::Dispatch(Command::SelectCategory(cycle_category(state, 1))),
            KeyCode::Char('C') => {
                Action::Dispatch(Command::SelectCategory(cycle_category(state, -1)))
            }
            KeyCode::Char('s') => Action::Dispatch(Command::SetSort(state.prefs.sort_mode.next())),
            KeyCode::Char('d') => Action::Dispatch(Command::SetShowDrafts(!state.prefs.show_drafts)),
            KeyCode::Char('R') => Action::Dispatch(Command::ResetProgress),
            _ => Action::None,
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Enter => {
                self.editing = false;
                Action::None
            }
            KeyCode::Esc => {
                self.editing = false;
                self.search.clear();
                Action::Dispatch(Command::ClearSearch)
            }
            KeyCode::Backspace => {
                self.search.pop();
                Action::Dispatch(Command::SetSearch(self.search.clone()))
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                Action::Dispatch(Command::SetSearch(self.search.clone()))
            }
            _ => Action::None,
        }
    }
}

/// The category after (or before) the current one, wrapping through "All".
fn cycle_category(state: &AppState, dir: isize) -> String {
    let counts = state.category_counts();
    let options: Vec<&str> = std::iter::once(ALL_CATEGORIES)
        .chain(counts.by_category.keys().map(String::as_str))
        .collect();
    let current = options
        .iter()
        .position(|c| *c == state.prefs.selected_category)
        .unwrap_or(0);
    let next = (current as isize + dir).rem_euclid(options.len() as isize) as usize;
    options[next].to_string()
}

#[cfg(test)]
mod tests {
    use lessonhub_core::Preferences;
    use lessonhub_shared::{Availability, EffectiveTutorial, ProgressMap, Status};

    use super::*;

    fn state() -> AppState {
        let tutorials = ["Basics", "Hardware", "Basics"]
            .iter()
            .enumerate()
            .map(|(index, category)| EffectiveTutorial {
                record: serde_json::from_value(serde_json::json!({
                    "slug": format!("t{index}"),
                    "category": category,
                }))
                .expect("record"),
                status: Status::Published,
                availability: Availability::Unknown,
                index,
            })
            .collect();
        AppState::new(tutorials, ProgressMap::new(), Preferences::default())
    }

    #[test]
    fn categories_cycle_through_all() {
        let mut state = state();
        assert_eq!(cycle_category(&state, 1), "Basics");
        assert_eq!(cycle_category(&state, -1), "Hardware");
        state.prefs.selected_category = "Hardware".into();
        assert_eq!(cycle_category(&state, 1), ALL_CATEGORIES);
    }

    #[test]
    fn typing_updates_search() {
        let state = state();
        let mut screen = BrowseScreen::new();
        screen.handle_key(KeyCode::Char('/'), KeyModifiers::NONE, &state);
        assert!(screen.is_editing());
        let action = screen.handle_key(KeyCode::Char('g'), KeyModifiers::NONE, &state);
        assert!(matches!(action, Action::Dispatch(Command::SetSearch(s)) if s == "g"));
        let action = screen.handle_key(KeyCode::Esc, KeyModifiers::NONE, &state);
        assert!(matches!(action, Action::Dispatch(Command::ClearSearch)));
        assert!(!screen.is_editing());
    }

    #[test]
    fn enter_opens_selection() {
        let state = state();
        let mut screen = BrowseScreen::new();
        screen.handle_key(KeyCode::Down, KeyModifiers::NONE, &state);
        let action = screen.handle_key(KeyCode::Enter, KeyModifiers::NONE, &state);
        assert!(matches!(action, Action::Open(s) if s == "t1"));
    }
}
