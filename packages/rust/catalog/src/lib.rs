//! Site access and catalog enrichment for LessonHub.
//!
//! [`SiteClient`] fetches the catalog, tutorial fragments, quiz files and
//! the learning paths document from a static site. [`enrich_catalog`]
//! probes content files through a bounded worker pool and derives each
//! tutorial's effective status.

mod client;
mod enrich;
mod paths;
mod probe;

pub use client::{SiteClient, parse_catalog};
pub use enrich::{ProbeProgress, SilentProbeProgress, derive, enrich_catalog, slugs_to_probe};
pub use paths::{PathOutline, parse_learning_paths};
pub use probe::probe_pool;
