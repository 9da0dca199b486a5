//! Error types for LessonHub.
//!
//! Library crates use [`LessonHubError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.
//!
//! Nothing here is fatal to a front-end: every variant maps to a visible,
//! retryable state through [`LessonHubError::user_message`].

use std::path::PathBuf;

/// Top-level error type for all LessonHub operations.
#[derive(Debug, thiserror::Error)]
pub enum LessonHubError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP transport failure (or an unexpected non-404 status).
    #[error("network error: {0}")]
    Network(String),

    /// Malformed JSON or an unexpected document shape. The message is
    /// shown to users as-is.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A resource that may legitimately be absent (HTTP 404).
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (quiz structure, out-of-range values, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// HTML-to-Markdown conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LessonHubError>;

impl LessonHubError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error naming the missing resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the same operation could succeed.
    ///
    /// Transport failures and missing resources are worth a retry
    /// affordance; malformed data and bad config are not until fixed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::NotFound { .. } | Self::Storage(_))
    }

    /// Short message suitable for a status line or error panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(msg) => msg.clone(),
            Self::Parse { message } => message.clone(),
            Self::NotFound { resource } => format!("{resource} not available (404)."),
            Self::Validation { message } => message.clone(),
            Self::Config { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LessonHubError::config("base_url must be http or https");
        assert_eq!(err.to_string(), "config error: base_url must be http or https");

        let err = LessonHubError::validation("question 2: answer must be a boolean");
        assert!(err.to_string().contains("question 2"));
    }

    #[test]
    fn retryable_taxonomy() {
        assert!(LessonHubError::Network("timeout".into()).is_retryable());
        assert!(LessonHubError::not_found("Quiz").is_retryable());
        assert!(!LessonHubError::parse("expected value").is_retryable());
        assert!(!LessonHubError::validation("No questions").is_retryable());
    }

    #[test]
    fn user_messages() {
        assert_eq!(
            LessonHubError::not_found("Quiz").user_message(),
            "Quiz not available (404)."
        );
        assert_eq!(
            LessonHubError::parse("Invalid tutorials.json format").user_message(),
            "Invalid tutorials.json format"
        );
        assert_eq!(
            LessonHubError::validation("No questions").user_message(),
            "No questions"
        );
    }
}
