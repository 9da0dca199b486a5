//! Startup pipeline: config → catalog → probes → state.

use std::time::Instant;

use lessonhub_catalog::{PathOutline, ProbeProgress, SiteClient, enrich_catalog, parse_learning_paths};
use lessonhub_shared::{AppConfig, Result};
use lessonhub_storage::Storage;
use tracing::{info, instrument, warn};

use crate::command::Hub;
use crate::state::{AppState, Preferences, load_progress};

/// Summary of a completed load.
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub tutorials: usize,
    pub visible: usize,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting load status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each content file probe.
    fn probed(&self, current: usize, total: usize);
    /// Called when loading completes.
    fn done(&self, summary: &LoadSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn probed(&self, _current: usize, _total: usize) {}
    fn done(&self, _summary: &LoadSummary) {}
}

struct ProbeBridge<'a>(&'a dyn ProgressReporter);

impl ProbeProgress for ProbeBridge<'_> {
    fn probing(&self, total: usize) {
        if total > 0 {
            self.0.phase(&format!("Checking {total} tutorial files"));
        }
    }

    fn probed(&self, current: usize, total: usize) {
        self.0.probed(current, total);
    }
}

/// A loaded hub plus what the views need alongside it.
pub struct LoadedHub {
    pub hub: Hub,
    pub client: SiteClient,
    /// Parsed learning paths document, if the site has one.
    pub outlines: Option<Vec<PathOutline>>,
}

/// Fetch and enrich the catalog, then restore persisted state.
#[instrument(skip_all, fields(base = %config.site.base_url))]
pub async fn load_hub(
    config: &AppConfig,
    storage: Storage,
    progress: &dyn ProgressReporter,
) -> Result<LoadedHub> {
    let start = Instant::now();
    let client = SiteClient::new(&config.site)?;

    progress.phase("Loading catalog");
    let catalog = client.fetch_catalog().await?;

    let tutorials = enrich_catalog(
        &client,
        catalog.tutorials,
        config.probe.effective_concurrency(),
        &ProbeBridge(progress),
    )
    .await;

    progress.phase("Loading learning paths");
    let outlines = match client.fetch_learning_paths().await {
        Ok(doc) => doc.map(|text| parse_learning_paths(&text)),
        Err(e) => {
            warn!(error = %e, "learning paths unavailable");
            None
        }
    };

    progress.phase("Restoring progress");
    let prefs = Preferences::load(&storage).await?;
    let done = load_progress(&storage).await?;
    let state = AppState::new(tutorials, done, prefs);

    let summary = LoadSummary {
        tutorials: state.tutorials.len(),
        visible: state
            .tutorials
            .iter()
            .filter(|t| t.is_visible(state.prefs.show_drafts))
            .count(),
        elapsed: start.elapsed(),
    };
    info!(
        tutorials = summary.tutorials,
        visible = summary.visible,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "hub loaded"
    );
    progress.done(&summary);

    Ok(LoadedHub {
        hub: Hub::new(state, storage),
        client,
        outlines,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use lessonhub_shared::{LessonHubError, SiteConfig, Status};
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::state::keys;

    #[derive(Default)]
    struct Recorder {
        phases: Mutex<Vec<String>>,
        probes: Mutex<usize>,
    }

    impl ProgressReporter for Recorder {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn probed(&self, _current: usize, _total: usize) {
            *self.probes.lock().unwrap() += 1;
        }
        fn done(&self, _summary: &LoadSummary) {}
    }

    async fn storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("lh_core_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn config(server: &MockServer) -> AppConfig {
        AppConfig {
            site: SiteConfig {
                base_url: server.uri(),
                timeout_secs: 5,
                ..SiteConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn loads_enriches_and_restores() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tutorials.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"tutorials":[
                    {"slug":"shipped","title":"Shipped","status":"published"},
                    {"slug":"written","title":"Written"},
                    {"slug":"planned","title":"Planned"}
                ]}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/tutorials/written.html"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/tutorials/planned.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/learning-paths.md"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("## Start\n1. Written\n2. Shipped\n"),
            )
            .mount(&server)
            .await;

        let storage = storage().await;
        storage
            .set_json(keys::PROGRESS, &serde_json::json!({"written": true}))
            .await
            .unwrap();

        let recorder = Recorder::default();
        let loaded = load_hub(&config(&server), storage, &recorder).await.unwrap();
        let state = &loaded.hub.state;

        assert_eq!(state.tutorials.len(), 3);
        assert_eq!(state.find("planned").unwrap().status, Status::AutoDraft);
        assert_eq!(state.find("shipped").unwrap().status, Status::Published);
        assert_eq!(state.browse().len(), 2);
        assert!(state.progress.is_complete("written"));
        assert_eq!(loaded.outlines.as_ref().map(Vec::len), Some(1));
        assert_eq!(*recorder.probes.lock().unwrap(), 2);
        assert_eq!(recorder.phases.lock().unwrap()[0], "Loading catalog");
    }

    #[tokio::test]
    async fn catalog_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tutorials.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = load_hub(&config(&server), storage().await, &SilentProgress)
            .await
            .err()
            .expect("load should fail");
        assert!(matches!(err, LessonHubError::Network(_)));
        assert!(err.user_message().starts_with("Could not load tutorials.json"));
    }
}
