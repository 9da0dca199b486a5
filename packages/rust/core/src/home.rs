//! Curated home views: continue learning, featured, newest, learning paths.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lessonhub_catalog::PathOutline;
use lessonhub_shared::{
    Availability, EffectiveTutorial, HomeConfig, LearningPathConfig, ProgressMap, Status,
};
use serde::Serialize;

use crate::browse::normalize_str;

/// Minimum number of explicitly featured entries before they alone fill
/// the featured list.
const MIN_EXPLICIT_FEATURED: usize = 4;

/// Inputs shared by the home views.
#[derive(Debug, Clone, Copy)]
pub struct HomeContext<'a> {
    pub tutorials: &'a [EffectiveTutorial],
    pub progress: &'a ProgressMap,
    pub show_drafts: bool,
    pub config: &'a HomeConfig,
}

impl<'a> HomeContext<'a> {
    fn visible(&self) -> impl Iterator<Item = &'a EffectiveTutorial> + '_ {
        let show_drafts = self.show_drafts;
        self.tutorials.iter().filter(move |t| t.is_visible(show_drafts))
    }

    fn limit(&self) -> usize {
        self.config.featured_limit
    }
}

// ---------------------------------------------------------------------------
// Continue learning
// ---------------------------------------------------------------------------

/// Slug suggested by "continue learning".
pub fn continue_slug(ctx: &HomeContext<'_>, last_slug: Option<&str>) -> String {
    if let Some(last) = last_slug.filter(|s| !s.is_empty()) {
        if ctx.visible().any(|t| t.slug() == last) {
            return last.to_string();
        }
    }

    let unfinished = |t: &&EffectiveTutorial| !ctx.progress.is_complete(t.slug());

    ctx.visible()
        .filter(unfinished)
        .find(|t| t.status != Status::Draft && t.availability != Availability::Missing)
        .or_else(|| ctx.visible().find(unfinished))
        .or_else(|| ctx.visible().next())
        .map(|t| t.slug().to_string())
        .unwrap_or_else(|| ctx.config.default_slug.clone())
}

// ---------------------------------------------------------------------------
// Featured
// ---------------------------------------------------------------------------

/// Up to `featured_limit` highlighted tutorials.
pub fn featured<'a>(ctx: &HomeContext<'a>) -> Vec<&'a EffectiveTutorial> {
    let limit = ctx.limit();
    let list: Vec<_> = ctx.visible().collect();
    let explicit: Vec<_> = list
        .iter()
        .copied()
        .filter(|t| t.record.featured || t.record.pinned)
        .collect();

    if explicit.len() >= MIN_EXPLICIT_FEATURED {
        return explicit.into_iter().take(limit).collect();
    }

    let mut picked: Vec<&EffectiveTutorial> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut push = |t: &'a EffectiveTutorial, picked: &mut Vec<&'a EffectiveTutorial>| {
        if picked.len() < limit && seen.insert(t.slug()) {
            picked.push(t);
        }
    };

    for slug in &ctx.config.featured_slugs {
        if let Some(t) = list.iter().find(|t| t.slug() == slug) {
            push(*t, &mut picked);
        }
    }
    for t in &explicit {
        push(*t, &mut picked);
    }
    for t in list.iter().filter(|t| t.status != Status::Draft) {
        push(*t, &mut picked);
    }
    picked
}

// ---------------------------------------------------------------------------
// Newest
// ---------------------------------------------------------------------------

/// Parse a catalog date into epoch milliseconds. Accepts RFC 3339,
/// `YYYY-MM-DDTHH:MM:SS`, and `YYYY-MM-DD` (taken as UTC midnight).
pub fn parse_date_ms(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn has_recency(t: &EffectiveTutorial) -> bool {
    let r = &t.record;
    r.order.is_some() || r.added_at.is_some() || r.updated_at.is_some() || r.created_at.is_some()
}

/// Recency score: explicit `order`, else the first date present among
/// updated, added, created, else 0.
fn recency_score(t: &EffectiveTutorial) -> f64 {
    let r = &t.record;
    if let Some(order) = r.order.filter(|o| o.is_finite()) {
        return order;
    }
    [&r.updated_at, &r.added_at, &r.created_at]
        .into_iter()
        .find_map(|d| d.as_deref())
        .and_then(parse_date_ms)
        .map_or(0.0, |ms| ms as f64)
}

/// Up to `featured_limit` recent tutorials.
pub fn newest<'a>(ctx: &HomeContext<'a>) -> Vec<&'a EffectiveTutorial> {
    let limit = ctx.limit();
    let list: Vec<_> = ctx.visible().filter(|t| t.status != Status::Draft).collect();

    if list.iter().any(|t| has_recency(t)) {
        let mut sorted = list;
        sorted.sort_by(|a, b| recency_score(b).total_cmp(&recency_score(a)));
        sorted.truncate(limit);
        return sorted;
    }

    let featured: HashSet<&str> = featured(ctx).iter().map(|t| t.slug()).collect();
    let picked: Vec<_> = list
        .iter()
        .copied()
        .filter(|t| !featured.contains(t.slug()) && t.availability != Availability::Missing)
        .take(limit)
        .collect();
    if !picked.is_empty() {
        return picked;
    }
    list.into_iter().take(limit).collect()
}

// ---------------------------------------------------------------------------
// Learning paths
// ---------------------------------------------------------------------------

/// A learning path ready to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningPath {
    pub name: String,
    /// Visible steps, in path order.
    pub slugs: Vec<String>,
    /// First visible step.
    pub start_slug: String,
    pub start_title: String,
}

impl LearningPath {
    pub fn step_count(&self) -> usize {
        self.slugs.len()
    }
}

/// Resolve parsed outlines to slugs by normalized title. Titles that match
/// nothing are dropped, as are paths left with no steps.
pub fn resolve_outlines(
    outlines: &[PathOutline],
    tutorials: &[EffectiveTutorial],
) -> Vec<LearningPathConfig> {
    let by_title: HashMap<String, &str> = tutorials
        .iter()
        .map(|t| (normalize_str(&t.record.title), t.slug()))
        .collect();

    outlines
        .iter()
        .filter_map(|outline| {
            let slugs: Vec<String> = outline
                .titles
                .iter()
                .filter_map(|title| by_title.get(&normalize_str(title)))
                .map(|s| s.to_string())
                .collect();
            (!slugs.is_empty()).then(|| LearningPathConfig {
                name: outline.name.clone(),
                slugs,
            })
        })
        .collect()
}

/// Paths to show: resolved outlines, or the configured fallback when none
/// resolve. Only paths whose first step is visible are kept.
pub fn learning_paths(ctx: &HomeContext<'_>, outlines: Option<&[PathOutline]>) -> Vec<LearningPath> {
    let mut paths = outlines
        .map(|o| resolve_outlines(o, ctx.tutorials))
        .unwrap_or_default();
    if paths.is_empty() {
        paths = ctx.config.fallback_paths.clone();
    }

    let visible: HashMap<&str, &EffectiveTutorial> =
        ctx.visible().map(|t| (t.slug(), t)).collect();

    paths
        .into_iter()
        .filter_map(|path| {
            let steps: Vec<&EffectiveTutorial> = path
                .slugs
                .iter()
                .filter_map(|s| visible.get(s.as_str()).copied())
                .collect();
            let first = *steps.first()?;
            Some(LearningPath {
                name: path.name,
                slugs: steps.iter().map(|t| t.slug().to_string()).collect(),
                start_slug: first.slug().to_string(),
                start_title: first.record.display_title().to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Home view
// ---------------------------------------------------------------------------

/// Everything the home screen shows, as slugs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub continue_slug: String,
    pub featured: Vec<String>,
    pub newest: Vec<String>,
    pub paths: Vec<LearningPath>,
}

impl HomeView {
    pub fn build(
        ctx: &HomeContext<'_>,
        last_slug: Option<&str>,
        outlines: Option<&[PathOutline]>,
    ) -> Self {
        let slugs = |list: Vec<&EffectiveTutorial>| -> Vec<String> {
            list.into_iter().map(|t| t.slug().to_string()).collect()
        };
        Self {
            continue_slug: continue_slug(ctx, last_slug),
            featured: slugs(featured(ctx)),
            newest: slugs(newest(ctx)),
            paths: learning_paths(ctx, outlines),
        }
    }
}
