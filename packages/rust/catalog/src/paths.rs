//! `learning-paths.md` parser.
//!
//! The document is a list of `## Path Name` headings, each followed by a
//! numbered list of tutorial titles:
//!
//! ```text
//! ## Local Power User
//! 1. CPU vs GPU vs NPU
//! 2. VRAM vs RAM
//! ```
//!
//! Titles are resolved to slugs by the caller.

use std::sync::LazyLock;

use regex::Regex;

/// A path as written in the document: a name and ordered step titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOutline {
    pub name: String,
    pub titles: Vec<String>,
}

/// Matches `## Path Name`.
static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+(.+?)\s*$").expect("H2 regex"));

/// Matches `1. Title` (leading whitespace allowed).
static STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.+?)\s*$").expect("step regex"));

/// Parse the document. Steps before the first heading are ignored; a
/// heading with no steps is kept with an empty list.
pub fn parse_learning_paths(content: &str) -> Vec<PathOutline> {
    let mut paths: Vec<PathOutline> = Vec::new();

    for line in content.lines() {
        if let Some(caps) = H2_RE.captures(line) {
            paths.push(PathOutline {
                name: caps[1].to_string(),
                titles: Vec::new(),
            });
            continue;
        }
        if let (Some(caps), Some(current)) = (STEP_RE.captures(line), paths.last_mut()) {
            current.titles.push(caps[1].to_string());
        }
    }

    tracing::debug!(paths = paths.len(), "learning paths parsed");
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headings_and_steps() {
        let md = "# Learning paths\r\n\
                  1. orphan step\r\n\
                  ## Beginner (No Coding)\r\n\
                  Intro text.\r\n\
                  1. AI 101: What models do\r\n\
                  2. Tokens, context & temperature  \r\n\
                  \r\n\
                  ## Builder Track\n\
                  \x20\x201. AI coding workflow\n\
                  - not a step\n\
                  ## Empty\n";

        let paths = parse_learning_paths(md);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0].name, "Beginner (No Coding)");
        assert_eq!(
            paths[0].titles,
            vec!["AI 101: What models do", "Tokens, context & temperature"]
        );
        assert_eq!(paths[1].titles, vec!["AI coding workflow"]);
        assert!(paths[2].titles.is_empty());
    }

    #[test]
    fn h3_is_not_a_path() {
        let paths = parse_learning_paths("### Not a path\n1. Step\n");
        assert!(paths.is_empty());
    }

    #[test]
    fn empty_document() {
        assert!(parse_learning_paths("").is_empty());
    }
}
