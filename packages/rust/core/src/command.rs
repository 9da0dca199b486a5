//! Command dispatch: the only path that mutates [`AppState`].

use lessonhub_quiz::QuizOutcome;
use lessonhub_shared::{Result, SortMode};
use lessonhub_storage::Storage;
use tracing::{debug, info, warn};

use crate::browse::ALL_CATEGORIES;
use crate::state::{AppState, clamp_scroll, keys};

/// A state change requested by a front-end.
#[derive(Debug, Clone)]
pub enum Command {
    SetSearch(String),
    ClearSearch,
    SelectCategory(String),
    SetShowDrafts(bool),
    SetSort(SortMode),
    /// Open `slug` in the reader, saving the scroll offset of the tutorial
    /// being left.
    OpenTutorial {
        slug: String,
        previous_scroll: Option<i64>,
    },
    SaveScroll {
        slug: String,
        offset: i64,
    },
    RecordQuiz {
        slug: String,
        outcome: QuizOutcome,
    },
    ResetProgress,
}

/// Notification for views that depend on the changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ListChanged,
    ProgressChanged,
    TutorialOpened { slug: String, scroll: u64 },
    TutorialCompleted { slug: String },
}

/// Application state plus the store it persists to.
pub struct Hub {
    pub state: AppState,
    storage: Storage,
}

impl Hub {
    pub fn new(state: AppState, storage: Storage) -> Self {
        Self { state, storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Apply `command`, persist what it touched, and report what changed.
    ///
    /// If a write fails, the persisted parts of the state are restored to
    /// what they were before the command, so a retry starts from the same
    /// place.
    pub async fn dispatch(&mut self, command: Command) -> Result<Vec<Event>> {
        debug!(?command, "dispatch");
        let prefs = self.state.prefs.clone();
        let progress = self.state.progress.clone();
        let current_slug = self.state.current_slug.clone();

        let result = self.apply(command).await;
        if let Err(e) = &result {
            warn!(error = %e, "command not persisted, state rolled back");
            self.state.prefs = prefs;
            self.state.progress = progress;
            self.state.current_slug = current_slug;
        }
        result
    }

    async fn apply(&mut self, command: Command) -> Result<Vec<Event>> {
        let state = &mut self.state;

        let events = match command {
            Command::SetSearch(term) => {
                state.search = term.trim().to_string();
                state.revalidate_category();
                vec![Event::ListChanged]
            }
            Command::ClearSearch => {
                state.search.clear();
                vec![Event::ListChanged]
            }
            Command::SelectCategory(name) => {
                let name = if name.trim().is_empty() {
                    ALL_CATEGORIES.to_string()
                } else {
                    name
                };
                state.prefs.selected_category = name;
                state.revalidate_category();
                self.storage
                    .set_json(keys::SELECTED_CATEGORY, &state.prefs.selected_category)
                    .await?;
                vec![Event::ListChanged]
            }
            Command::SetShowDrafts(show) => {
                state.prefs.show_drafts = show;
                self.storage.set_json(keys::SHOW_DRAFTS, &show).await?;
                if state.revalidate_category() {
                    self.storage
                        .set_json(keys::SELECTED_CATEGORY, &state.prefs.selected_category)
                        .await?;
                }
                vec![Event::ListChanged, Event::ProgressChanged]
            }
            Command::SetSort(mode) => {
                state.prefs.sort_mode = mode;
                self.storage.set_json(keys::SORT_MODE, &mode).await?;
                vec![Event::ListChanged]
            }
            Command::OpenTutorial {
                slug,
                previous_scroll,
            } => {
                if let (Some(prev), Some(offset)) = (state.current_slug.take(), previous_scroll) {
                    state
                        .prefs
                        .scroll_by_slug
                        .insert(prev, clamp_scroll(offset));
                    self.storage
                        .set_json(keys::SCROLL_BY_SLUG, &state.prefs.scroll_by_slug)
                        .await?;
                }
                state.current_slug = Some(slug.clone());
                state.prefs.last_slug = Some(slug.clone());
                self.storage.set_json(keys::LAST_SLUG, &slug).await?;
                let scroll = state.scroll_for(&slug);
                vec![Event::TutorialOpened { slug, scroll }]
            }
            Command::SaveScroll { slug, offset } => {
                state
                    .prefs
                    .scroll_by_slug
                    .insert(slug, clamp_scroll(offset));
                self.storage
                    .set_json(keys::SCROLL_BY_SLUG, &state.prefs.scroll_by_slug)
                    .await?;
                Vec::new()
            }
            Command::RecordQuiz { slug, outcome } => {
                if !outcome.passed || !state.progress.mark_complete(&slug) {
                    return Ok(Vec::new());
                }
                self.storage.set_json(keys::PROGRESS, &state.progress).await?;
                info!(%slug, percent = outcome.percent, "tutorial completed");
                vec![
                    Event::TutorialCompleted { slug },
                    Event::ProgressChanged,
                ]
            }
            Command::ResetProgress => {
                state.progress.clear();
                self.storage.remove(keys::PROGRESS).await?;
                info!("progress reset");
                vec![Event::ProgressChanged, Event::ListChanged]
            }
        };
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use lessonhub_quiz::{AnswerSet, Response, parse_quiz, score};
    use lessonhub_shared::{ProgressMap, Status};
    use uuid::Uuid;

    use super::*;
    use crate::browse::tests::tutorial;
    use crate::state::{Preferences, load_progress};

    const QUIZ: &str = r#"{
        "title": "Basics",
        "passingScore": 70,
        "questions": [
            {"type": "true-false", "question": "A?", "answer": true, "explanation": "A."},
            {"type": "true-false", "question": "B?", "answer": false, "explanation": "B."},
            {"type": "true-false", "question": "C?", "answer": true, "explanation": "C."}
        ]
    }"#;

    async fn hub() -> Hub {
        let tmp = std::env::temp_dir().join(format!("lh_core_{}.db", Uuid::now_v7()));
        let storage = Storage::open(&tmp).await.expect("open test db");
        let tutorials = vec![
            tutorial(0, r#"{"slug":"a","category":"Basics"}"#, Status::Published),
            tutorial(1, r#"{"slug":"b","category":"Drafty","status":"draft"}"#, Status::Draft),
        ];
        Hub::new(
            AppState::new(tutorials, ProgressMap::new(), Preferences::default()),
            storage,
        )
    }

    fn outcome(answers: [bool; 3]) -> QuizOutcome {
        let quiz = parse_quiz(QUIZ).expect("quiz");
        let mut set = AnswerSet::new();
        for (i, a) in answers.into_iter().enumerate() {
            set.insert(i, Response::Flag(a));
        }
        score(&quiz, &set)
    }

    #[tokio::test]
    async fn failing_attempt_writes_nothing() {
        let mut hub = hub().await;
        let result = outcome([true, false, false]);
        assert_eq!(result.percent, 67);

        let events = hub
            .dispatch(Command::RecordQuiz {
                slug: "a".into(),
                outcome: result,
            })
            .await
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(hub.storage().get_raw(keys::PROGRESS).await.unwrap(), None);
    }

    #[tokio::test]
    async fn passing_attempt_completes_once() {
        let mut hub = hub().await;
        let cmd = Command::RecordQuiz {
            slug: "a".into(),
            outcome: outcome([true, false, true]),
        };

        let first = hub.dispatch(cmd.clone()).await.unwrap();
        assert_eq!(
            first,
            vec![
                Event::TutorialCompleted { slug: "a".into() },
                Event::ProgressChanged
            ]
        );
        assert!(load_progress(hub.storage()).await.unwrap().is_complete("a"));

        let second = hub.dispatch(cmd).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_completion_retryable() {
        let tmp = std::env::temp_dir().join(format!("lh_core_{}.db", Uuid::now_v7()));
        drop(Storage::open(&tmp).await.expect("create test db"));
        let readonly = Storage::open_readonly(&tmp).await.expect("reopen read-only");

        let mut hub = hub().await;
        let writable = std::mem::replace(&mut hub.storage, readonly);
        let cmd = Command::RecordQuiz {
            slug: "a".into(),
            outcome: outcome([true, true, true]),
        };

        let err = hub.dispatch(cmd.clone()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!hub.state.progress.is_complete("a"));

        hub.storage = writable;
        let retried = hub.dispatch(cmd).await.unwrap();
        assert_eq!(
            retried,
            vec![
                Event::TutorialCompleted { slug: "a".into() },
                Event::ProgressChanged
            ]
        );
        assert!(load_progress(hub.storage()).await.unwrap().is_complete("a"));
    }

    #[tokio::test]
    async fn failed_write_restores_preferences() {
        let tmp = std::env::temp_dir().join(format!("lh_core_{}.db", Uuid::now_v7()));
        drop(Storage::open(&tmp).await.expect("create test db"));

        let mut hub = hub().await;
        hub.dispatch(Command::SetShowDrafts(true)).await.unwrap();
        hub.dispatch(Command::RecordQuiz {
            slug: "a".into(),
            outcome: outcome([true, false, true]),
        })
        .await
        .unwrap();
        hub.storage = Storage::open_readonly(&tmp).await.expect("reopen read-only");

        assert!(hub.dispatch(Command::SetShowDrafts(false)).await.is_err());
        assert!(hub.state.prefs.show_drafts);

        assert!(hub.dispatch(Command::SelectCategory("Basics".into())).await.is_err());
        assert_eq!(hub.state.prefs.selected_category, ALL_CATEGORIES);

        assert!(hub.dispatch(Command::ResetProgress).await.is_err());
        assert!(hub.state.progress.is_complete("a"));
    }

    #[tokio::test]
    async fn hiding_drafts_resets_draft_category() {
        let mut hub = hub().await;
        hub.dispatch(Command::SetShowDrafts(true)).await.unwrap();
        hub.dispatch(Command::SelectCategory("Drafty".into()))
            .await
            .unwrap();
        assert_eq!(hub.state.prefs.selected_category, "Drafty");

        let events = hub.dispatch(Command::SetShowDrafts(false)).await.unwrap();
        assert_eq!(events, vec![Event::ListChanged, Event::ProgressChanged]);
        assert_eq!(hub.state.prefs.selected_category, ALL_CATEGORIES);

        let prefs = Preferences::load(hub.storage()).await.unwrap();
        assert!(!prefs.show_drafts);
        assert_eq!(prefs.selected_category, ALL_CATEGORIES);
    }

    #[tokio::test]
    async fn opening_saves_previous_scroll() {
        let mut hub = hub().await;
        hub.dispatch(Command::OpenTutorial {
            slug: "a".into(),
            previous_scroll: None,
        })
        .await
        .unwrap();
        let events = hub
            .dispatch(Command::OpenTutorial {
                slug: "b".into(),
                previous_scroll: Some(20_000_000),
            })
            .await
            .unwrap();
        assert_eq!(
            events,
            vec![Event::TutorialOpened {
                slug: "b".into(),
                scroll: 0
            }]
        );

        hub.dispatch(Command::SaveScroll {
            slug: "b".into(),
            offset: -4,
        })
        .await
        .unwrap();

        let prefs = Preferences::load(hub.storage()).await.unwrap();
        assert_eq!(prefs.last_slug.as_deref(), Some("b"));
        assert_eq!(prefs.scroll_by_slug.get("a"), Some(&10_000_000));
        assert_eq!(prefs.scroll_by_slug.get("b"), Some(&0));
    }

    #[tokio::test]
    async fn search_trims_and_reset_clears() {
        let mut hub = hub().await;
        hub.dispatch(Command::SetSearch("  a  ".into())).await.unwrap();
        assert_eq!(hub.state.search, "a");
        hub.dispatch(Command::ClearSearch).await.unwrap();
        assert!(hub.state.search.is_empty());

        hub.dispatch(Command::RecordQuiz {
            slug: "a".into(),
            outcome: outcome([true, false, true]),
        })
        .await
        .unwrap();
        let events = hub.dispatch(Command::ResetProgress).await.unwrap();
        assert_eq!(events, vec![Event::ProgressChanged, Event::ListChanged]);
        assert_eq!(hub.storage().get_raw(keys::PROGRESS).await.unwrap(), None);
        assert_eq!(load_progress(hub.storage()).await.unwrap(), ProgressMap::new());
    }
}
