//! Core domain logic for LessonHub.
//!
//! This crate ties the catalog, content, quiz and storage crates together:
//! startup loading ([`load_hub`]), browse and home views over the effective
//! catalog, and a single command dispatcher ([`Hub::dispatch`]) through
//! which every state change is applied and persisted.

pub mod browse;
pub mod command;
pub mod home;
pub mod pipeline;
pub mod reader;
pub mod state;

pub use browse::{ALL_CATEGORIES, BrowseQuery, CategoryCounts, ProgressStats, normalize_str};
pub use command::{Command, Event, Hub};
pub use home::{HomeContext, HomeView, LearningPath};
pub use pipeline::{LoadSummary, LoadedHub, ProgressReporter, SilentProgress, load_hub};
pub use reader::{MISSING_CATEGORY, OpenedTutorial, load_quiz, open_tutorial};
pub use state::{AppState, Preferences};
