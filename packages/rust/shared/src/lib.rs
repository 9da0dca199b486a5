//! Shared types, error model, and configuration for LessonHub.
//!
//! This crate is the foundation depended on by all other LessonHub crates.
//! It provides:
//! - The unified error type ([`LessonHubError`])
//! - Domain types ([`TutorialRecord`], [`EffectiveTutorial`], [`Status`], [`Availability`])
//! - Configuration ([`AppConfig`], [`SiteConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, HomeConfig, LearningPathConfig, ProbeConfig, SiteConfig, StorageConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{LessonHubError, Result};
pub use types::{
    Availability, Catalog, DeclaredStatus, EffectiveTutorial, ProgressMap, SortMode, Status,
    TutorialRecord, UNCATEGORIZED,
};
