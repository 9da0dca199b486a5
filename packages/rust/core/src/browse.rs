//! Browse list: visibility, search, category filter, sorting, and counts.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use lessonhub_shared::{EffectiveTutorial, ProgressMap, SortMode, TutorialRecord};
use serde::Serialize;

/// Category selection meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// Normalize text for search: lowercase, non-breaking/figure/en/em dashes
/// become `-`, and any run of characters that are neither letters nor
/// digits collapses to one space.
pub fn normalize_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;

    for c in s.chars().flat_map(char::to_lowercase) {
        let c = match c {
            '\u{2011}'..='\u{2014}' => '-',
            other => other,
        };
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Whether `record` matches an already-normalized search term.
pub fn matches_search(record: &TutorialRecord, normalized_term: &str) -> bool {
    if normalized_term.is_empty() {
        return true;
    }
    let haystack = [
        record.title.as_str(),
        record.description.as_str(),
        record.category.as_str(),
        &record.tags.join(" "),
        record.slug.as_str(),
    ]
    .join(" ");
    normalize_str(&haystack).contains(normalized_term)
}

/// Whether `record` belongs to `category` (`"All"` matches everything).
pub fn matches_category(record: &TutorialRecord, category: &str) -> bool {
    category.is_empty() || category == ALL_CATEGORIES || record.category_label() == category
}

/// Sort rank for a difficulty label.
pub fn difficulty_rank(difficulty: &str) -> u8 {
    let d = difficulty.to_lowercase();
    if d.contains("beginner") {
        1
    } else if d.contains("intermediate") {
        2
    } else if d.contains("advanced") {
        3
    } else {
        9
    }
}

fn by_title(a: &EffectiveTutorial, b: &EffectiveTutorial) -> Ordering {
    a.record.title.to_lowercase().cmp(&b.record.title.to_lowercase())
}

fn by_minutes(a: &EffectiveTutorial, b: &EffectiveTutorial) -> Ordering {
    a.record
        .minutes_or_zero()
        .total_cmp(&b.record.minutes_or_zero())
}

/// Stable sort of `list` by `mode`.
pub fn sort_tutorials(list: &mut [&EffectiveTutorial], mode: SortMode, progress: &ProgressMap) {
    match mode {
        SortMode::Title => list.sort_by(|a, b| by_title(a, b)),
        SortMode::Time => list.sort_by(|a, b| by_minutes(a, b).then_with(|| by_title(a, b))),
        SortMode::Difficulty => list.sort_by(|a, b| {
            difficulty_rank(&a.record.difficulty)
                .cmp(&difficulty_rank(&b.record.difficulty))
                .then_with(|| by_minutes(a, b))
        }),
        SortMode::Recommended => list.sort_by_key(|t| (progress.is_complete(t.slug()), t.index)),
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Inputs that shape the browse list.
#[derive(Debug, Clone, Copy)]
pub struct BrowseQuery<'a> {
    pub search: &'a str,
    pub category: &'a str,
    pub show_drafts: bool,
    pub sort: SortMode,
}

/// Visible tutorials matching the category and search, sorted.
pub fn browse_list<'a>(
    tutorials: &'a [EffectiveTutorial],
    query: &BrowseQuery<'_>,
    progress: &ProgressMap,
) -> Vec<&'a EffectiveTutorial> {
    let term = normalize_str(query.search);
    let mut list: Vec<&EffectiveTutorial> = tutorials
        .iter()
        .filter(|t| t.is_visible(query.show_drafts))
        .filter(|t| matches_category(&t.record, query.category))
        .filter(|t| matches_search(&t.record, &term))
        .collect();
    sort_tutorials(&mut list, query.sort, progress);
    list
}

/// Per-category counts over visible tutorials matching the search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub total: usize,
    /// Category label to count, sorted by label.
    pub by_category: BTreeMap<String, usize>,
}

impl CategoryCounts {
    /// Whether `category` is a valid selection under these counts.
    pub fn allows(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.by_category.contains_key(category)
    }
}

pub fn category_counts(
    tutorials: &[EffectiveTutorial],
    search: &str,
    show_drafts: bool,
) -> CategoryCounts {
    let term = normalize_str(search);
    let mut counts = CategoryCounts::default();
    for t in tutorials
        .iter()
        .filter(|t| t.is_visible(show_drafts))
        .filter(|t| matches_search(&t.record, &term))
    {
        counts.total += 1;
        *counts
            .by_category
            .entry(t.record.category_label().to_string())
            .or_default() += 1;
    }
    counts
}

/// Completion over visible tutorials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub done: usize,
    pub total: usize,
    pub percent: u32,
}

pub fn progress_stats(
    tutorials: &[EffectiveTutorial],
    show_drafts: bool,
    progress: &ProgressMap,
) -> ProgressStats {
    let visible: Vec<_> = tutorials.iter().filter(|t| t.is_visible(show_drafts)).collect();
    let total = visible.len();
    let done = visible
        .iter()
        .filter(|t| progress.is_complete(t.slug()))
        .count();
    let percent = if total == 0 {
        0
    } else {
        (done as f64 / total as f64 * 100.0).round() as u32
    };
    ProgressStats {
        done,
        total,
        percent,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use lessonhub_shared::{Availability, Status};

    use super::*;

    pub(crate) fn tutorial(index: usize, json: &str, status: Status) -> EffectiveTutorial {
        EffectiveTutorial {
            record: serde_json::from_str(json).expect("record"),
            status,
            availability: Availability::Unknown,
            index,
        }
    }

    fn sample() -> Vec<EffectiveTutorial> {
        vec![
            tutorial(
                0,
                r#"{"slug":"ai-101","title":"AI 101","category":"Basics","difficulty":"Beginner","minutes":10,"tags":["intro"]}"#,
                Status::Published,
            ),
            tutorial(
                1,
                r#"{"slug":"vram-vs-ram","title":"VRAM vs RAM","category":"Hardware","difficulty":"Intermediate","minutes":8}"#,
                Status::Published,
            ),
            tutorial(
                2,
                r#"{"slug":"quant","title":"Quantization explained","category":"Hardware","difficulty":"Advanced","minutes":15}"#,
                Status::Published,
            ),
            tutorial(
                3,
                r#"{"slug":"agents","title":"agents and tools","difficulty":"beginner-friendly"}"#,
                Status::Draft,
            ),
            tutorial(4, r#"{"slug":"ghost","title":"Ghost"}"#, Status::AutoDraft),
        ]
    }

    fn query<'a>(search: &'a str, category: &'a str, show_drafts: bool, sort: SortMode) -> BrowseQuery<'a> {
        BrowseQuery {
            search,
            category,
            show_drafts,
            sort,
        }
    }

    fn slugs(list: &[&EffectiveTutorial]) -> Vec<String> {
        list.iter().map(|t| t.slug().to_string()).collect()
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_str("  VRAM\u{2013}vs—RAM!! "), "vram vs ram");
        assert_eq!(normalize_str("Ollama: local_AI (basics)"), "ollama local ai basics");
        assert_eq!(normalize_str("Größe 12"), "größe 12");
        assert_eq!(normalize_str("---"), "");
    }

    #[test]
    fn search_covers_tags_and_slug() {
        let list = sample();
        let found = browse_list(&list, &query("INTRO", ALL_CATEGORIES, false, SortMode::Recommended), &ProgressMap::new());
        assert_eq!(slugs(&found), vec!["ai-101"]);

        let found = browse_list(&list, &query("vram vs", ALL_CATEGORIES, false, SortMode::Recommended), &ProgressMap::new());
        assert_eq!(slugs(&found), vec!["vram-vs-ram"]);
    }

    #[test]
    fn drafts_and_category() {
        let list = sample();
        let progress = ProgressMap::new();
        let hidden = browse_list(&list, &query("", ALL_CATEGORIES, false, SortMode::Recommended), &progress);
        assert_eq!(slugs(&hidden), vec!["ai-101", "vram-vs-ram", "quant"]);

        let shown = browse_list(&list, &query("", ALL_CATEGORIES, true, SortMode::Recommended), &progress);
        assert_eq!(shown.len(), 5);

        let hardware = browse_list(&list, &query("", "Hardware", false, SortMode::Recommended), &progress);
        assert_eq!(slugs(&hardware), vec!["vram-vs-ram", "quant"]);

        let uncategorized = browse_list(&list, &query("", "Uncategorized", true, SortMode::Recommended), &progress);
        assert_eq!(slugs(&uncategorized), vec!["agents", "ghost"]);
    }

    #[test]
    fn sort_modes() {
        let list = sample();
        let mut progress = ProgressMap::new();
        progress.mark_complete("ai-101");

        let rec = browse_list(&list, &query("", ALL_CATEGORIES, true, SortMode::Recommended), &progress);
        assert_eq!(slugs(&rec), vec!["vram-vs-ram", "quant", "agents", "ghost", "ai-101"]);

        let title = browse_list(&list, &query("", ALL_CATEGORIES, true, SortMode::Title), &progress);
        assert_eq!(slugs(&title), vec!["agents", "ai-101", "ghost", "quant", "vram-vs-ram"]);

        let time = browse_list(&list, &query("", ALL_CATEGORIES, true, SortMode::Time), &progress);
        assert_eq!(slugs(&time), vec!["agents", "ghost", "vram-vs-ram", "ai-101", "quant"]);

        let diff = browse_list(&list, &query("", ALL_CATEGORIES, true, SortMode::Difficulty), &progress);
        assert_eq!(slugs(&diff), vec!["agents", "ai-101", "vram-vs-ram", "quant", "ghost"]);
    }

    #[test]
    fn counts_ignore_category_but_follow_search() {
        let list = sample();
        let counts = category_counts(&list, "", false);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.by_category.get("Hardware"), Some(&2));
        assert!(counts.allows("Basics"));
        assert!(!counts.allows("Uncategorized"));

        let counts = category_counts(&list, "quant", true);
        assert_eq!(counts.total, 1);
        assert!(!counts.allows("Basics"));
        assert!(counts.allows(ALL_CATEGORIES));
    }

    #[test]
    fn stats_over_visible() {
        let list = sample();
        let mut progress = ProgressMap::new();
        progress.mark_complete("ai-101");
        progress.mark_complete("ghost");

        assert_eq!(
            progress_stats(&list, false, &progress),
            ProgressStats {
                done: 1,
                total: 3,
                percent: 33
            }
        );
        assert_eq!(progress_stats(&list, true, &progress).percent, 40);
        assert_eq!(progress_stats(&[], true, &progress).percent, 0);
    }
}
