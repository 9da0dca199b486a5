//! Core domain types for LessonHub catalogs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

/// Category label used when a record has none.
pub const UNCATEGORIZED: &str = "Uncategorized";

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

/// Root structure of `tutorials.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// All tutorial records, in catalog order.
    pub tutorials: Vec<TutorialRecord>,
}

/// The `status` field as it may appear in the catalog: a word or a flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DeclaredStatus {
    Text(String),
    Flag(bool),
    /// Present but neither a string nor a boolean.
    Unrecognized,
}

/// A single tutorial entry from `tutorials.json`.
///
/// Immutable once loaded. Unknown fields are ignored and a field of the
/// wrong JSON type reads as its default, so newer catalogs keep loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorialRecord {
    /// Unique key, used for file names and the progress map.
    #[serde(default, deserialize_with = "lenient")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient")]
    pub difficulty: String,
    /// Estimated reading time.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub minutes: Option<f64>,
    #[serde(
        default,
        deserialize_with = "declared",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<DeclaredStatus>,
    /// Legacy boolean form of `status`, consulted only when `status` is absent.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub published: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    /// Explicit "newest" ordering score (higher is newer).
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub added_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub featured: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub pinned: bool,
}

impl TutorialRecord {
    /// Status declared in the catalog, if it is one we recognize.
    ///
    /// `status` takes precedence over `published`; an unrecognized word
    /// yields `None` without falling back to `published`.
    pub fn declared_status(&self) -> Option<Status> {
        match &self.status {
            Some(DeclaredStatus::Text(s)) => match s.trim().to_lowercase().as_str() {
                "draft" | "hidden" => Some(Status::Draft),
                "published" | "public" => Some(Status::Published),
                _ => None,
            },
            Some(DeclaredStatus::Flag(flag)) => Some(status_from_flag(*flag)),
            Some(DeclaredStatus::Unrecognized) => None,
            None => self.published.map(status_from_flag),
        }
    }

    /// Category, or [`UNCATEGORIZED`] when empty.
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            UNCATEGORIZED
        } else {
            &self.category
        }
    }

    /// Title, or the slug when the title is empty.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.slug
        } else {
            &self.title
        }
    }

    /// Difficulty, or an em dash when empty.
    pub fn difficulty_label(&self) -> &str {
        if self.difficulty.is_empty() {
            "—"
        } else {
            &self.difficulty
        }
    }

    /// Minutes formatted with `suffix` (e.g. `"12m"`, `"12 min"`), or an em dash.
    pub fn minutes_label(&self, suffix: &str) -> String {
        match self.minutes {
            Some(m) if m.is_finite() => {
                if m.fract() == 0.0 {
                    format!("{}{suffix}", m as i64)
                } else {
                    format!("{m}{suffix}")
                }
            }
            _ => "—".to_string(),
        }
    }

    /// Minutes used for sorting; absent counts as zero.
    pub fn minutes_or_zero(&self) -> f64 {
        self.minutes.filter(|m| m.is_finite()).unwrap_or(0.0)
    }
}

fn status_from_flag(flag: bool) -> Status {
    if flag { Status::Published } else { Status::Draft }
}

/// Deserialize `T`, or its default when the value has another JSON type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Value(T),
        Other(IgnoredAny),
    }

    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Value(value) => value,
        Lenient::Other(_) => T::default(),
    })
}

/// Deserialize `status`; `null` is absent, other shapes are unrecognized.
fn declared<'de, D>(deserializer: D) -> Result<Option<DeclaredStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Flag(bool),
        Other(IgnoredAny),
    }

    Ok(
        Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
            Raw::Text(s) => DeclaredStatus::Text(s),
            Raw::Flag(flag) => DeclaredStatus::Flag(flag),
            Raw::Other(_) => DeclaredStatus::Unrecognized,
        }),
    )
}

// ---------------------------------------------------------------------------
// Derived state
// ---------------------------------------------------------------------------

/// Effective status after merging declared metadata with existence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Published,
    Draft,
    /// No declared status and the content file is confirmed missing.
    AutoDraft,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published => write!(f, "published"),
            Self::Draft => write!(f, "draft"),
            Self::AutoDraft => write!(f, "auto-draft"),
        }
    }
}

/// Tri-state result of probing a tutorial's content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Present,
    Missing,
    /// Not probed, or the probe hit a network error / unexpected status.
    #[default]
    Unknown,
}

/// A catalog record plus its derived status and availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveTutorial {
    pub record: TutorialRecord,
    pub status: Status,
    pub availability: Availability,
    /// Position in the catalog, used as a stable tie-break.
    pub index: usize,
}

impl EffectiveTutorial {
    pub fn slug(&self) -> &str {
        &self.record.slug
    }

    /// Visible in lists given the current drafts toggle.
    ///
    /// Published entries are always visible, even when their file is missing.
    pub fn is_visible(&self, show_drafts: bool) -> bool {
        match self.status {
            Status::Published => true,
            Status::Draft | Status::AutoDraft => show_drafts,
        }
    }

    /// Listed as published but the content file is confirmed missing.
    pub fn is_coming_soon(&self) -> bool {
        self.status == Status::Published && self.availability == Availability::Missing
    }

    /// Short status badges shown next to a list row.
    pub fn badges(&self) -> Vec<&'static str> {
        let mut badges = Vec::new();
        if self.status == Status::Draft {
            badges.push("Draft");
        }
        if self.is_coming_soon() {
            badges.push("Coming soon");
        }
        badges
    }

    /// One-line summary: `"difficulty • 12m • Draft"`.
    pub fn meta_line(&self) -> String {
        let mut bits = vec![
            self.record.difficulty_label().to_string(),
            self.record.minutes_label("m"),
        ];
        bits.extend(self.badges().into_iter().map(String::from));
        bits.join(" • ")
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Completed tutorials, keyed by slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressMap(BTreeMap<String, bool>);

impl ProgressMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self, slug: &str) -> bool {
        self.0.get(slug).copied().unwrap_or(false)
    }

    /// Mark `slug` complete. Returns `true` if this changed the map.
    pub fn mark_complete(&mut self, slug: &str) -> bool {
        if self.is_complete(slug) {
            return false;
        }
        self.0.insert(slug.to_string(), true);
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn completed_slugs(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, done)| **done).map(|(s, _)| s.as_str())
    }
}

// ---------------------------------------------------------------------------
// SortMode
// ---------------------------------------------------------------------------

/// Ordering applied to the browse list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Catalog order with completed tutorials pushed to the end.
    #[default]
    Recommended,
    Title,
    Time,
    Difficulty,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Recommended,
        SortMode::Title,
        SortMode::Time,
        SortMode::Difficulty,
    ];

    /// The next mode in display order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Recommended => "Recommended",
            Self::Title => "Title (A→Z)",
            Self::Time => "Time (short→long)",
            Self::Difficulty => "Difficulty",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Recommended => "recommended",
            Self::Title => "title",
            Self::Time => "time",
            Self::Difficulty => "difficulty",
        };
        f.write_str(s)
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "title" => Ok(Self::Title),
            "time" => Ok(Self::Time),
            "difficulty" => Ok(Self::Difficulty),
            other => Err(format!(
                "unknown sort mode '{other}': expected recommended, title, time, or difficulty"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> TutorialRecord {
        serde_json::from_str(json).expect("parse record")
    }

    #[test]
    fn declared_status_variants() {
        assert_eq!(
            record(r#"{"slug":"a","status":" Draft "}"#).declared_status(),
            Some(Status::Draft)
        );
        assert_eq!(
            record(r#"{"slug":"a","status":"hidden"}"#).declared_status(),
            Some(Status::Draft)
        );
        assert_eq!(
            record(r#"{"slug":"a","status":"public"}"#).declared_status(),
            Some(Status::Published)
        );
        assert_eq!(
            record(r#"{"slug":"a","status":true}"#).declared_status(),
            Some(Status::Published)
        );
        assert_eq!(
            record(r#"{"slug":"a","published":false}"#).declared_status(),
            Some(Status::Draft)
        );
        assert_eq!(record(r#"{"slug":"a"}"#).declared_status(), None);
    }

    #[test]
    fn unrecognized_status_does_not_fall_back_to_published_flag() {
        let r = record(r#"{"slug":"a","status":"wip","published":true}"#);
        assert_eq!(r.declared_status(), None);
    }

    #[test]
    fn catalog_ignores_unknown_fields() {
        let catalog: Catalog = serde_json::from_str(
            r#"{"tutorials":[{"slug":"x","title":"X","minutes":12,"extra":{"a":1}}],"version":3}"#,
        )
        .expect("parse catalog");
        assert_eq!(catalog.tutorials.len(), 1);
        assert_eq!(catalog.tutorials[0].minutes_label("m"), "12m");
    }

    #[test]
    fn wrongly_typed_fields_read_as_defaults() {
        let r = record(r#"{"slug":"a","title":"A","minutes":"10","tags":"gpu","featured":"yes"}"#);
        assert_eq!(r.slug, "a");
        assert_eq!(r.minutes, None);
        assert!(r.tags.is_empty());
        assert!(!r.featured);

        let r = record(r#"{"slug":"b","tags":["gpu",3],"order":"7"}"#);
        assert!(r.tags.is_empty());
        assert_eq!(r.order, None);
    }

    #[test]
    fn unrecognized_status_shape_is_undeclared() {
        let r = record(r#"{"slug":"a","status":1,"published":true}"#);
        assert_eq!(r.status, Some(DeclaredStatus::Unrecognized));
        assert_eq!(r.declared_status(), None);

        let r = record(r#"{"slug":"a","status":null,"published":false}"#);
        assert_eq!(r.declared_status(), Some(Status::Draft));
    }

    #[test]
    fn labels_fall_back() {
        let r = record(r#"{"slug":"no-title"}"#);
        assert_eq!(r.display_title(), "no-title");
        assert_eq!(r.category_label(), UNCATEGORIZED);
        assert_eq!(r.difficulty_label(), "—");
        assert_eq!(r.minutes_label(" min"), "—");
    }

    #[test]
    fn published_missing_is_visible_and_coming_soon() {
        let t = EffectiveTutorial {
            record: record(r#"{"slug":"a","status":"published"}"#),
            status: Status::Published,
            availability: Availability::Missing,
            index: 0,
        };
        assert!(t.is_visible(false));
        assert!(t.is_coming_soon());
        assert_eq!(t.badges(), vec!["Coming soon"]);
    }

    #[test]
    fn drafts_hidden_unless_toggled() {
        for status in [Status::Draft, Status::AutoDraft] {
            let t = EffectiveTutorial {
                record: record(r#"{"slug":"a"}"#),
                status,
                availability: Availability::Missing,
                index: 0,
            };
            assert!(!t.is_visible(false));
            assert!(t.is_visible(true));
        }
    }

    #[test]
    fn progress_mark_is_idempotent() {
        let mut progress = ProgressMap::new();
        assert!(progress.mark_complete("intro"));
        assert!(!progress.mark_complete("intro"));
        assert!(progress.is_complete("intro"));
        assert_eq!(progress.completed_slugs().count(), 1);
    }

    #[test]
    fn progress_tolerates_false_entries() {
        let progress: ProgressMap =
            serde_json::from_str(r#"{"a":true,"b":false}"#).expect("parse progress");
        assert!(progress.is_complete("a"));
        assert!(!progress.is_complete("b"));
        assert_eq!(progress.completed_slugs().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn sort_mode_parse_and_cycle() {
        assert_eq!("Time".parse::<SortMode>(), Ok(SortMode::Time));
        assert!("newest".parse::<SortMode>().is_err());
        assert_eq!(SortMode::Difficulty.next(), SortMode::Recommended);
        let json = serde_json::to_string(&SortMode::Title).expect("serialize");
        assert_eq!(json, "\"title\"");
    }
}
