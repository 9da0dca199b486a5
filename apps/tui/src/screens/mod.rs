//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and encapsulates its
//! own state and rendering logic. Screens never touch the hub directly:
//! key handlers return an [`Action`] that the app carries out.

mod browse;
mod home;
mod quiz;
mod reader;

use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};
use lessonhub_content::QuizMount;
use lessonhub_core::{AppState, Command};
use ratatui::prelude::*;

pub(crate) use browse::BrowseScreen;
pub(crate) use home::HomeScreen;
pub(crate) use quiz::QuizScreen;
pub(crate) use reader::ReaderScreen;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Home,
    Browse,
    Reader,
    Quiz,
}

impl ScreenId {
    pub(crate) const ALL: [ScreenId; 4] = [Self::Home, Self::Browse, Self::Reader, Self::Quiz];
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Browse => write!(f, "Browse"),
            Self::Reader => write!(f, "Reader"),
            Self::Quiz => write!(f, "Quiz"),
        }
    }
}

/// What a key press asks the app to do.
#[derive(Debug, Clone)]
pub(crate) enum Action {
    None,
    Dispatch(Command),
    Open(String),
    StartQuiz(QuizMount),
    Status(String),
}

/// Per-screen state and behaviour.
pub(crate) struct Screens {
    pub home: HomeScreen,
    pub browse: BrowseScreen,
    pub reader: ReaderScreen,
    pub quiz: QuizScreen,
}

impl Screens {
    pub(crate) fn new() -> Self {
        Self {
            home: HomeScreen::new(),
            browse: BrowseScreen::new(),
            reader: ReaderScreen::new(),
            quiz: QuizScreen::new(),
        }
    }

    /// Whether the screen has an active text input field.
    pub(crate) fn is_editing(&self, id: ScreenId) -> bool {
        match id {
            ScreenId::Browse => self.browse.is_editing(),
            _ => false,
        }
    }

    pub(crate) fn draw(&self, id: ScreenId, f: &mut Frame, area: Rect, state: &AppState) {
        match id {
            ScreenId::Home => self.home.draw(f, area, state),
            ScreenId::Browse => self.browse.draw(f, area, state),
            ScreenId::Reader => self.reader.draw(f, area),
            ScreenId::Quiz => self.quiz.draw(f, area),
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        id: ScreenId,
        code: KeyCode,
        modifiers: KeyModifiers,
        state: &AppState,
    ) -> Action {
        match id {
            ScreenId::Home => self.home.handle_key(code, modifiers),
            ScreenId::Browse => self.browse.handle_key(code, modifiers, state),
            ScreenId::Reader => self.reader.handle_key(code, modifiers),
            ScreenId::Quiz => self.quiz.handle_key(code, modifiers),
        }
    }
}
