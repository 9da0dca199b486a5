//! "Coming soon" page for tutorials without a content file.

use lessonhub_shared::{TutorialRecord, UNCATEGORIZED};

const DEFAULT_DESCRIPTION: &str =
    "This tutorial is listed in the catalog but the page isn't published yet.";

/// Escape text for inclusion in HTML (text or attribute values).
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the placeholder page for `meta`.
///
/// `expected_path` is the site-relative file the tutorial should live at;
/// `reason`, when non-blank, is shown as a note above the instructions.
pub fn coming_soon_html(meta: &TutorialRecord, expected_path: &str, reason: Option<&str>) -> String {
    let title = if meta.title.is_empty() {
        "Coming soon"
    } else {
        &meta.title
    };
    let description = if meta.description.is_empty() {
        DEFAULT_DESCRIPTION
    } else {
        &meta.description
    };
    let category = if meta.category.is_empty() {
        UNCATEGORIZED
    } else {
        &meta.category
    };

    let note = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!("<p><strong>Note:</strong> {}</p>\n", escape_html(r)))
        .unwrap_or_default();

    format!(
        r#"<article data-tutorial>
<header>
<p><span data-field="category">{category}</span> • <span data-field="difficulty">{difficulty}</span> • <span data-field="minutes">{minutes}</span></p>
<h1 data-field="title">{title}</h1>
<p data-field="description">{description}</p>
</header>
{note}<section>
<h2>Coming soon</h2>
<p>This page isn't published yet. If you're building the site, either:</p>
<ul>
<li>Create <code>{path}</code></li>
<li>Or mark this tutorial as <code>status: "draft"</code> in <code>tutorials.json</code> to hide it by default.</li>
</ul>
<p><strong>Tip:</strong> Run with drafts shown while you build.</p>
</section>
</article>"#,
        category = escape_html(category),
        difficulty = escape_html(meta.difficulty_label()),
        minutes = escape_html(&meta.minutes_label(" min")),
        title = escape_html(title),
        description = escape_html(description),
        path = escape_html(expected_path),
    )
}
