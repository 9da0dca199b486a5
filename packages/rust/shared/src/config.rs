//! Application configuration for LessonHub.
//!
//! User config lives at `~/.lessonhub/lessonhub.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LessonHubError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lessonhub.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lessonhub";

/// Default state database file name (inside the config directory).
const STATE_DB_NAME: &str = "state.db";

/// Upper bound for the probe worker pool.
pub const MAX_PROBE_CONCURRENCY: usize = 16;

// ---------------------------------------------------------------------------
// Config structs (matching lessonhub.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the static site lives and how it is laid out.
    #[serde(default)]
    pub site: SiteConfig,

    /// Existence probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Home view curation.
    #[serde(default)]
    pub home: HomeConfig,

    /// Local state database.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the static site (must be http or https).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Catalog file, relative to `base_url`.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// Directory holding tutorial HTML fragments.
    #[serde(default = "default_tutorials_dir")]
    pub tutorials_dir: String,

    /// Extension appended to a slug to form its file name.
    #[serde(default = "default_tutorial_ext")]
    pub tutorial_ext: String,

    /// Directory holding quiz JSON files.
    #[serde(default = "default_quizzes_dir")]
    pub quizzes_dir: String,

    /// Optional learning paths document.
    #[serde(default = "default_learning_paths_file")]
    pub learning_paths_file: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            catalog_file: default_catalog_file(),
            tutorials_dir: default_tutorials_dir(),
            tutorial_ext: default_tutorial_ext(),
            quizzes_dir: default_quizzes_dir(),
            learning_paths_file: default_learning_paths_file(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/".into()
}
fn default_catalog_file() -> String {
    "tutorials.json".into()
}
fn default_tutorials_dir() -> String {
    "tutorials/".into()
}
fn default_tutorial_ext() -> String {
    ".html".into()
}
fn default_quizzes_dir() -> String {
    "quizzes/".into()
}
fn default_learning_paths_file() -> String {
    "learning-paths.md".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl SiteConfig {
    /// Parse and check `base_url`, normalizing it to end with `/`.
    ///
    /// A `file://` base is rejected with instructions for serving the
    /// folder over HTTP instead.
    pub fn base(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| {
            LessonHubError::config(format!("invalid site.base_url '{}': {e}", self.base_url))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            "file" => Err(LessonHubError::config(
                "site.base_url points at a local file (file://), which cannot be fetched.\n\
                 Serve the site folder over HTTP instead, e.g.:\n  \
                 python -m http.server 8000\n\
                 then set base_url = \"http://localhost:8000/\"",
            )),
            other => Err(LessonHubError::config(format!(
                "site.base_url must use http or https, got '{other}'"
            ))),
        }
    }
}

/// `[probe]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum concurrent existence probes (clamped to 1..=16).
    #[serde(default = "default_probe_concurrency")]
    pub concurrency: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: default_probe_concurrency(),
        }
    }
}

fn default_probe_concurrency() -> usize {
    8
}

impl ProbeConfig {
    /// Concurrency after clamping into the supported range.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_PROBE_CONCURRENCY)
    }
}

/// `[home]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    /// Slug suggested by "continue" when nothing else is visible.
    #[serde(default = "default_slug")]
    pub default_slug: String,

    /// Slugs preferred for the featured list, in order.
    #[serde(default = "default_featured_slugs")]
    pub featured_slugs: Vec<String>,

    /// Maximum entries in the featured and newest lists.
    #[serde(default = "default_featured_limit")]
    pub featured_limit: usize,

    /// Paths used when `learning-paths.md` is absent or yields nothing.
    #[serde(default = "default_fallback_paths")]
    pub fallback_paths: Vec<LearningPathConfig>,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            default_slug: default_slug(),
            featured_slugs: default_featured_slugs(),
            featured_limit: default_featured_limit(),
            fallback_paths: default_fallback_paths(),
        }
    }
}

/// `[[home.fallback_paths]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPathConfig {
    pub name: String,
    pub slugs: Vec<String>,
}

fn default_slug() -> String {
    "ai-101-what-models-do".into()
}
fn default_featured_slugs() -> Vec<String> {
    [
        "ai-101-what-models-do",
        "cpu-vs-gpu-vs-npu",
        "vram-vs-ram",
        "quantization-explained",
        "local-ai-ollama-basics",
        "prompting-structure",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_featured_limit() -> usize {
    6
}
fn default_fallback_paths() -> Vec<LearningPathConfig> {
    let path = |name: &str, slugs: [&str; 3]| LearningPathConfig {
        name: name.into(),
        slugs: slugs.into_iter().map(String::from).collect(),
    };
    vec![
        path(
            "Beginner (No Coding)",
            [
                "ai-101-what-models-do",
                "tokens-context-temperature",
                "hallucinations-and-reliability",
            ],
        ),
        path(
            "Local Power User",
            ["cpu-vs-gpu-vs-npu", "vram-vs-ram", "quantization-explained"],
        ),
        path(
            "Builder Track",
            ["ai-coding-workflow", "debugging-with-ai", "testing-with-ai"],
        ),
    ]
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// State database path. Defaults to `~/.lessonhub/state.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_db: Option<String>,
}

impl StorageConfig {
    /// Resolve the state database path.
    pub fn state_db_path(&self) -> Result<PathBuf> {
        match &self.state_db {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(config_dir()?.join(STATE_DB_NAME)),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lessonhub/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LessonHubError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lessonhub/lessonhub.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LessonHubError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LessonHubError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LessonHubError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LessonHubError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LessonHubError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("tutorials.json"));
        assert!(toml_str.contains("Builder Track"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[site]
base_url = "https://learn.example.com/hub"

[probe]
concurrency = 64

[[home.fallback_paths]]
name = "Only path"
slugs = ["a", "b"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.site.catalog_file, "tutorials.json");
        assert_eq!(config.site.timeout_secs, 30);
        assert_eq!(config.probe.effective_concurrency(), MAX_PROBE_CONCURRENCY);
        assert_eq!(config.home.fallback_paths.len(), 1);
        assert_eq!(config.home.featured_limit, 6);
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let site = SiteConfig {
            base_url: "https://learn.example.com/hub".into(),
            ..SiteConfig::default()
        };
        let base = site.base().expect("valid base");
        assert_eq!(base.as_str(), "https://learn.example.com/hub/");
        assert_eq!(
            base.join("tutorials.json").expect("join").as_str(),
            "https://learn.example.com/hub/tutorials.json"
        );
    }

    #[test]
    fn file_base_url_is_rejected_with_hint() {
        let site = SiteConfig {
            base_url: "file:///home/me/site/".into(),
            ..SiteConfig::default()
        };
        let err = site.base().unwrap_err();
        assert!(err.to_string().contains("http.server"));
    }

    #[test]
    fn zero_concurrency_is_clamped_up() {
        let probe = ProbeConfig { concurrency: 0 };
        assert_eq!(probe.effective_concurrency(), 1);
    }

    #[test]
    fn explicit_state_db_path() {
        let storage = StorageConfig {
            state_db: Some("/tmp/hub-state.db".into()),
        };
        assert_eq!(
            storage.state_db_path().expect("path"),
            PathBuf::from("/tmp/hub-state.db")
        );
    }
}
