//! Catalog enrichment: probe content files, then derive effective status.

use std::collections::{HashMap, HashSet};

use lessonhub_shared::{Availability, EffectiveTutorial, Status, TutorialRecord};
use tracing::{info, instrument};

use crate::client::SiteClient;
use crate::probe::probe_pool;

/// Progress callback for enrichment.
pub trait ProbeProgress: Send + Sync {
    /// Called before probing starts with the number of files to check.
    fn probing(&self, total: usize);
    /// Called after each probe finishes.
    fn probed(&self, current: usize, total: usize);
}

/// No-op probe progress.
pub struct SilentProbeProgress;

impl ProbeProgress for SilentProbeProgress {
    fn probing(&self, _total: usize) {}
    fn probed(&self, _current: usize, _total: usize) {}
}

/// Slugs whose content file must be checked: no recognized declared status,
/// or declared Draft. Empty slugs are skipped; duplicates keep the first
/// occurrence.
pub fn slugs_to_probe(records: &[TutorialRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| !r.slug.is_empty())
        .filter(|r| matches!(r.declared_status(), None | Some(Status::Draft)))
        .filter(|r| seen.insert(r.slug.as_str()))
        .map(|r| r.slug.clone())
        .collect()
}

/// Merge declared status with probe results.
///
/// A declared status always wins. Otherwise a confirmed-missing file makes
/// the record an auto-draft; present or unknown files count as published.
/// Slugs absent from `availability` are [`Availability::Unknown`].
pub fn derive(
    records: Vec<TutorialRecord>,
    availability: &HashMap<String, Availability>,
) -> Vec<EffectiveTutorial> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let availability = availability
                .get(&record.slug)
                .copied()
                .unwrap_or_default();
            let status = match record.declared_status() {
                Some(declared) => declared,
                None if availability == Availability::Missing => Status::AutoDraft,
                None => Status::Published,
            };
            EffectiveTutorial {
                record,
                status,
                availability,
                index,
            }
        })
        .collect()
}

/// Probe every candidate slug through `client`, then [`derive`].
#[instrument(skip_all, fields(records = records.len(), concurrency = concurrency))]
pub async fn enrich_catalog(
    client: &SiteClient,
    records: Vec<TutorialRecord>,
    concurrency: usize,
    progress: &dyn ProbeProgress,
) -> Vec<EffectiveTutorial> {
    let slugs = slugs_to_probe(&records);
    progress.probing(slugs.len());

    let results = probe_pool(
        slugs.clone(),
        concurrency,
        |slug| {
            let client = client.clone();
            async move { client.probe_exists(&slug).await }
        },
        |done, total| progress.probed(done, total),
    )
    .await;

    let availability: HashMap<String, Availability> = slugs.into_iter().zip(results).collect();
    let missing = availability
        .values()
        .filter(|a| **a == Availability::Missing)
        .count();

    let tutorials = derive(records, &availability);
    let auto_drafts = tutorials
        .iter()
        .filter(|t| t.status == Status::AutoDraft)
        .count();

    info!(
        probed = availability.len(),
        missing,
        auto_drafts,
        "catalog enriched"
    );
    tutorials
}
