//! HTTP access to the static site: catalog, tutorial fragments, quizzes,
//! and the learning paths document.

use std::time::Duration;

use lessonhub_shared::{Availability, Catalog, LessonHubError, Result, SiteConfig, TutorialRecord};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// User-Agent string for site requests.
const USER_AGENT: &str = concat!("LessonHub/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Client bound to one site layout. Cheap to clone (the inner
/// `reqwest::Client` is reference counted).
#[derive(Debug, Clone)]
pub struct SiteClient {
    client: Client,
    base: Url,
    site: SiteConfig,
}

impl SiteClient {
    /// Build a client for `site`. Fails if `base_url` is not http(s).
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let base = site.base()?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(site.timeout_secs))
            .build()
            .map_err(|e| LessonHubError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            site: site.clone(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Site-relative path of a tutorial fragment, e.g. `tutorials/intro.html`.
    pub fn tutorial_path(&self, slug: &str) -> String {
        format!(
            "{}{slug}{}",
            dir_with_slash(&self.site.tutorials_dir),
            self.site.tutorial_ext
        )
    }

    /// Absolute URL of a tutorial fragment. The slug is percent-encoded as
    /// a single path segment.
    pub fn tutorial_url(&self, slug: &str) -> Result<Url> {
        let dir = self.join(&dir_with_slash(&self.site.tutorials_dir))?;
        let mut url = dir.clone();
        url.path_segments_mut()
            .map_err(|_| LessonHubError::config(format!("cannot build a path under {dir}")))?
            .pop_if_empty()
            .push(&format!("{slug}{}", self.site.tutorial_ext));
        Ok(url)
    }

    /// Absolute URL of a quiz file, relative to the quizzes directory.
    pub fn quiz_url(&self, file: &str) -> Result<Url> {
        let dir = self.join(&dir_with_slash(&self.site.quizzes_dir))?;
        dir.join(file.trim_start_matches('/'))
            .map_err(|e| LessonHubError::config(format!("invalid quiz file '{file}': {e}")))
    }

    fn join(&self, relative: &str) -> Result<Url> {
        self.base
            .join(relative)
            .map_err(|e| LessonHubError::config(format!("invalid site path '{relative}': {e}")))
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    /// Fetch and parse the catalog.
    ///
    /// Records that fail to deserialize are skipped with a warning; a
    /// document without a `tutorials` array is an invalid-format error.
    #[instrument(skip_all, fields(base = %self.base))]
    pub async fn fetch_catalog(&self) -> Result<Catalog> {
        let file = &self.site.catalog_file;
        let url = self.join(file)?;

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            LessonHubError::Network(format!("Could not load {file}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LessonHubError::Network(format!(
                "Could not load {file} (HTTP {})",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LessonHubError::Network(format!("Could not load {file}: {e}")))?;

        let catalog = parse_catalog(&body, file)?;
        info!(%url, tutorials = catalog.tutorials.len(), "catalog loaded");
        Ok(catalog)
    }

    // -----------------------------------------------------------------------
    // Existence probe
    // -----------------------------------------------------------------------

    /// Check whether a tutorial's content file exists.
    ///
    /// Tries `HEAD` first; a non-decisive answer (anything but 2xx or 404,
    /// including a transport error) falls back to `GET`. Never fails: an
    /// undecidable probe is [`Availability::Unknown`].
    pub async fn probe_exists(&self, slug: &str) -> Availability {
        let url = match self.tutorial_url(slug) {
            Ok(url) => url,
            Err(e) => {
                warn!(slug, error = %e, "cannot build tutorial URL");
                return Availability::Unknown;
            }
        };

        match self.client.head(url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => return Availability::Present,
            Ok(resp) if resp.status() == StatusCode::NOT_FOUND => return Availability::Missing,
            Ok(resp) => debug!(slug, status = %resp.status(), "HEAD inconclusive, trying GET"),
            Err(e) => debug!(slug, error = %e, "HEAD failed, trying GET"),
        }

        match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => Availability::Present,
            Ok(resp) if resp.status() == StatusCode::NOT_FOUND => Availability::Missing,
            Ok(resp) => {
                debug!(slug, status = %resp.status(), "probe inconclusive");
                Availability::Unknown
            }
            Err(e) => {
                debug!(slug, error = %e, "probe failed");
                Availability::Unknown
            }
        }
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Fetch a tutorial's HTML fragment. `Ok(None)` means the server
    /// answered with a non-2xx status; transport failures are errors.
    #[instrument(skip(self))]
    pub async fn fetch_tutorial_html(&self, slug: &str) -> Result<Option<String>> {
        let url = self.tutorial_url(slug)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LessonHubError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "tutorial file unavailable");
            return Ok(None);
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| LessonHubError::Network(format!("{url}: failed to read body: {e}")))
    }

    /// Fetch the raw text of a quiz file.
    ///
    /// 404 is [`LessonHubError::NotFound`]; any other non-2xx status is a
    /// network error carrying the status code.
    #[instrument(skip(self))]
    pub async fn fetch_quiz_text(&self, file: &str) -> Result<String> {
        let url = self.quiz_url(file)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LessonHubError::Network(format!("Failed to load quiz: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LessonHubError::not_found("Quiz"));
        }
        if !status.is_success() {
            return Err(LessonHubError::Network(format!(
                "Failed to load ({}).",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| LessonHubError::Network(format!("Failed to load quiz: {e}")))
    }

    /// Fetch the learning paths document. Absence (any non-2xx status) is
    /// `Ok(None)`.
    pub async fn fetch_learning_paths(&self) -> Result<Option<String>> {
        let url = self.join(&self.site.learning_paths_file)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LessonHubError::Network(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            debug!(%url, status = %response.status(), "no learning paths document");
            return Ok(None);
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| LessonHubError::Network(format!("{url}: failed to read body: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dir_with_slash(dir: &str) -> String {
    let dir = dir.trim_start_matches('/');
    if dir.is_empty() || dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

/// Parse catalog JSON, skipping entries that are not objects.
pub fn parse_catalog(body: &str, file: &str) -> Result<Catalog> {
    let invalid = || LessonHubError::parse(format!("Invalid {file} format"));

    let doc: Value = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "catalog is not valid JSON");
        invalid()
    })?;

    let Some(items) = doc.get("tutorials").and_then(Value::as_array) else {
        return Err(invalid());
    };

    let tutorials = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            if !item.is_object() {
                warn!(index = i, "skipping catalog entry that is not an object");
                return None;
            }
            match serde_json::from_value::<TutorialRecord>(item.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index = i, error = %e, "skipping malformed catalog record");
                    None
                }
            }
        })
        .collect();

    Ok(Catalog { tutorials })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SiteClient {
        let site = SiteConfig {
            base_url: server.uri(),
            timeout_secs: 5,
            ..SiteConfig::default()
        };
        SiteClient::new(&site).expect("client")
    }

    #[test]
    fn tutorial_paths_and_urls() {
        let site = SiteConfig {
            base_url: "https://learn.example.com/hub".into(),
            tutorials_dir: "lessons".into(),
            ..SiteConfig::default()
        };
        let client = SiteClient::new(&site).expect("client");
        assert_eq!(client.tutorial_path("intro"), "lessons/intro.html");
        assert_eq!(
            client.tutorial_url("a b?c").expect("url").as_str(),
            "https://learn.example.com/hub/lessons/a%20b%3Fc.html"
        );
        assert_eq!(
            client.quiz_url("vram.json").expect("url").as_str(),
            "https://learn.example.com/hub/quizzes/vram.json"
        );
    }

    #[test]
    fn parse_catalog_skips_non_objects() {
        let catalog = parse_catalog(
            r#"{"tutorials":[{"slug":"a"},"junk",[1,2],null,{"slug":"c"}]}"#,
            "tutorials.json",
        )
        .expect("parse");
        let slugs: Vec<_> = catalog.tutorials.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "c"]);
    }

    #[test]
    fn parse_catalog_keeps_records_with_odd_fields() {
        let catalog = parse_catalog(
            r#"{"tutorials":[
                {"slug":"a","minutes":"10"},
                {"slug":"b","status":1},
                {"slug":"c","tags":"gpu"}
            ]}"#,
            "tutorials.json",
        )
        .expect("parse");
        let slugs: Vec<_> = catalog.tutorials.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
        assert_eq!(catalog.tutorials[0].minutes, None);
        assert_eq!(catalog.tutorials[1].declared_status(), None);
        assert!(catalog.tutorials[2].tags.is_empty());
    }

    #[test]
    fn parse_catalog_rejects_wrong_shape() {
        for body in ["[]", r#"{"tutorials":{}}"#, "not json"] {
            let err = parse_catalog(body, "tutorials.json").unwrap_err();
            assert_eq!(err.user_message(), "Invalid tutorials.json format");
        }
    }

    #[tokio::test]
    async fn fetch_catalog_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tutorials.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"tutorials":[{"slug":"vram-vs-ram","title":"VRAM vs RAM","minutes":8}]}"#,
            ))
            .mount(&server)
            .await;

        let catalog = client_for(&server).fetch_catalog().await.expect("catalog");
        assert_eq!(catalog.tutorials.len(), 1);
        assert_eq!(catalog.tutorials[0].title, "VRAM vs RAM");
    }

    #[tokio::test]
    async fn fetch_catalog_http_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tutorials.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_catalog().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Could not load tutorials.json"));
    }

    #[tokio::test]
    async fn probe_head_decides() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/tutorials/present.html"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/tutorials/gone.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        // GET must not be needed for either slug.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.probe_exists("present").await, Availability::Present);
        assert_eq!(client.probe_exists("gone").await, Availability::Missing);
    }

    #[tokio::test]
    async fn probe_falls_back_to_get() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tutorials/ok.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tutorials/missing.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tutorials/broken.html"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.probe_exists("ok").await, Availability::Present);
        assert_eq!(client.probe_exists("missing").await, Availability::Missing);
        assert_eq!(client.probe_exists("broken").await, Availability::Unknown);
    }

    #[tokio::test]
    async fn probe_unreachable_is_unknown() {
        let site = SiteConfig {
            base_url: "http://127.0.0.1:9/".into(),
            timeout_secs: 2,
            ..SiteConfig::default()
        };
        let client = SiteClient::new(&site).expect("client");
        assert_eq!(client.probe_exists("x").await, Availability::Unknown);
    }

    #[tokio::test]
    async fn tutorial_html_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tutorials/intro.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Intro</h1>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(
            client.fetch_tutorial_html("intro").await.expect("fetch").as_deref(),
            Some("<h1>Intro</h1>")
        );
        assert_eq!(client.fetch_tutorial_html("nope").await.expect("fetch"), None);
    }

    #[tokio::test]
    async fn quiz_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quizzes/ok.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quizzes/boom.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.fetch_quiz_text("ok.json").await.expect("quiz"), "{}");

        let missing = client.fetch_quiz_text("none.json").await.unwrap_err();
        assert_eq!(missing.user_message(), "Quiz not available (404).");

        let boom = client.fetch_quiz_text("boom.json").await.unwrap_err();
        assert_eq!(boom.user_message(), "Failed to load (500).");
    }

    #[tokio::test]
    async fn learning_paths_absent_is_none() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        assert_eq!(client.fetch_learning_paths().await.expect("fetch"), None);
    }
}
