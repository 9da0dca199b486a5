//! Markdown cleanup passes applied after `htmd` conversion.
//!
//! Each pass is `&str -> String`; [`run_pipeline`] applies them in order.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

/// Run every cleanup pass over converted tutorial Markdown.
pub(crate) fn run_pipeline(md: &str, base_url: Option<&Url>) -> String {
    let md = demote_extra_h1(md);
    let md = collapse_blank_lines(&md);
    let md = strip_fence_prefixes(&md);
    let md = strip_wrapper_tags(&md);
    let md = resolve_links(&md, base_url);
    finish(&md)
}

// ---------------------------------------------------------------------------
// Headings
// ---------------------------------------------------------------------------

/// Keep the first `# ` heading; later ones become `## `.
fn demote_extra_h1(md: &str) -> String {
    let mut seen_h1 = false;
    let mut in_fence = false;

    md.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
            }
            match line.strip_prefix("# ") {
                Some(text) if !in_fence => {
                    if seen_h1 {
                        return format!("## {text}");
                    }
                    seen_h1 = true;
                    line.to_string()
                }
                _ => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Blank lines
// ---------------------------------------------------------------------------

/// At most one blank line between blocks.
fn collapse_blank_lines(md: &str) -> String {
    static BLANK_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").expect("blank run regex"));

    BLANK_RUN_RE.replace_all(md, "\n\n").into_owned()
}

// ---------------------------------------------------------------------------
// Code fences
// ---------------------------------------------------------------------------

/// Turn class-style fence hints (`language-js`, `lang-py`) into plain ones.
fn strip_fence_prefixes(md: &str) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^(\s*```)(?:language-|lang-)([\w+-]+)").expect("fence regex"));

    FENCE_RE.replace_all(md, "$1$2").into_owned()
}

// ---------------------------------------------------------------------------
// Leftover HTML
// ---------------------------------------------------------------------------

/// Drop layout tags `htmd` passes through, keeping their text. Code
/// fences are left alone.
fn strip_wrapper_tags(md: &str) -> String {
    static WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"</?(?:div|span|section|article|header|footer|aside|figure|figcaption|details|summary|button)(?:\s[^>]*)?>",
        )
        .expect("wrapper tag regex")
    });

    let mut in_fence = false;
    md.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                line.to_string()
            } else {
                WRAPPER_RE.replace_all(line, "").into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Make relative link targets absolute against the tutorial's URL.
/// Images, anchors, and absolute or `mailto:` targets are unchanged.
fn resolve_links(md: &str, base_url: Option<&Url>) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)\s]+)\)").expect("link regex"));

    let Some(base) = base_url else {
        return md.to_string();
    };

    LINK_RE
        .replace_all(md, |caps: &Captures| {
            let (bang, text, href) = (&caps[1], &caps[2], &caps[3]);
            let keep = !bang.is_empty()
                || href.starts_with('#')
                || href.starts_with("mailto:")
                || Url::parse(href).is_ok();
            if keep {
                return caps[0].to_string();
            }
            match base.join(href) {
                Ok(resolved) => format!("[{text}]({resolved})"),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Whitespace
// ---------------------------------------------------------------------------

/// Trim trailing whitespace per line and end with a single newline.
fn finish(md: &str) -> String {
    let body = md
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n", body.trim_matches('\n'))
}
