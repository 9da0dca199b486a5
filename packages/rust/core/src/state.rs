//! Application state: effective catalog, progress, and preferences.

use std::collections::BTreeMap;

use lessonhub_shared::{EffectiveTutorial, ProgressMap, Result, SortMode};
use lessonhub_storage::Storage;
use serde::{Deserialize, Serialize};

use crate::browse::{self, ALL_CATEGORIES, BrowseQuery, CategoryCounts, ProgressStats};

/// Storage keys for persisted client state.
pub mod keys {
    pub const PROGRESS: &str = "hub.progress";
    pub const SELECTED_CATEGORY: &str = "hub.selectedCategory";
    pub const SHOW_DRAFTS: &str = "hub.showDrafts";
    pub const SORT_MODE: &str = "hub.sortMode";
    pub const LAST_SLUG: &str = "hub.lastSlug";
    pub const SCROLL_BY_SLUG: &str = "hub.scrollBySlug";
}

/// Largest scroll offset kept per tutorial.
pub const MAX_SCROLL: u64 = 10_000_000;

/// Clamp a raw scroll offset into `0..=MAX_SCROLL`.
pub fn clamp_scroll(offset: i64) -> u64 {
    offset.clamp(0, MAX_SCROLL as i64) as u64
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// Persisted view preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub selected_category: String,
    pub show_drafts: bool,
    pub sort_mode: SortMode,
    pub last_slug: Option<String>,
    pub scroll_by_slug: BTreeMap<String, u64>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            selected_category: ALL_CATEGORIES.to_string(),
            show_drafts: false,
            sort_mode: SortMode::default(),
            last_slug: None,
            scroll_by_slug: BTreeMap::new(),
        }
    }
}

impl Preferences {
    /// Load each preference from its own key. Missing or malformed values
    /// fall back to defaults independently.
    pub async fn load(storage: &Storage) -> Result<Self> {
        let defaults = Self::default();
        let last_slug: Option<String> = storage.get_json(keys::LAST_SLUG).await?;

        Ok(Self {
            selected_category: storage
                .get_json_or(keys::SELECTED_CATEGORY, defaults.selected_category)
                .await?,
            show_drafts: storage
                .get_json_or(keys::SHOW_DRAFTS, defaults.show_drafts)
                .await?,
            sort_mode: storage
                .get_json_or(keys::SORT_MODE, defaults.sort_mode)
                .await?,
            last_slug: last_slug.filter(|s| !s.is_empty()),
            scroll_by_slug: storage
                .get_json_or(keys::SCROLL_BY_SLUG, defaults.scroll_by_slug)
                .await?,
        })
    }
}

/// Load the progress map, defaulting to empty.
pub async fn load_progress(storage: &Storage) -> Result<ProgressMap> {
    storage.get_json_or(keys::PROGRESS, ProgressMap::new()).await
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything the views read. Mutated only through [`crate::Hub::dispatch`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub tutorials: Vec<EffectiveTutorial>,
    pub progress: ProgressMap,
    pub prefs: Preferences,
    /// Current search term (not persisted).
    pub search: String,
    /// Slug currently open in the reader.
    pub current_slug: Option<String>,
}

impl AppState {
    pub fn new(tutorials: Vec<EffectiveTutorial>, progress: ProgressMap, prefs: Preferences) -> Self {
        let mut state = Self {
            tutorials,
            progress,
            prefs,
            search: String::new(),
            current_slug: None,
        };
        state.revalidate_category();
        state
    }

    pub fn find(&self, slug: &str) -> Option<&EffectiveTutorial> {
        self.tutorials.iter().find(|t| t.slug() == slug)
    }

    pub fn query(&self) -> BrowseQuery<'_> {
        BrowseQuery {
            search: &self.search,
            category: &self.prefs.selected_category,
            show_drafts: self.prefs.show_drafts,
            sort: self.prefs.sort_mode,
        }
    }

    /// The browse list for the current query.
    pub fn browse(&self) -> Vec<&EffectiveTutorial> {
        browse::browse_list(&self.tutorials, &self.query(), &self.progress)
    }

    pub fn category_counts(&self) -> CategoryCounts {
        browse::category_counts(&self.tutorials, &self.search, self.prefs.show_drafts)
    }

    pub fn stats(&self) -> ProgressStats {
        browse::progress_stats(&self.tutorials, self.prefs.show_drafts, &self.progress)
    }

    /// Saved scroll offset for `slug`, or 0.
    pub fn scroll_for(&self, slug: &str) -> u64 {
        self.prefs
            .scroll_by_slug
            .get(slug)
            .copied()
            .map_or(0, |v| v.min(MAX_SCROLL))
    }

    /// Reset the category to "All" if it no longer has any visible match.
    /// Returns `true` if the selection changed.
    pub fn revalidate_category(&mut self) -> bool {
        if self.category_counts().allows(&self.prefs.selected_category) {
            return false;
        }
        tracing::debug!(
            category = %self.prefs.selected_category,
            "selected category no longer available, resetting"
        );
        self.prefs.selected_category = ALL_CATEGORIES.to_string();
        true
    }
}
