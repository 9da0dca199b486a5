//! Tutorial rendering for terminal front-ends.
//!
//! Tutorial pages are HTML fragments. [`render_tutorial`] fills their
//! metadata placeholders from the catalog, collects quiz mounts and
//! internal links, and converts the result to Markdown via `htmd` and a
//! cleanup pipeline. [`coming_soon_html`] builds the placeholder page shown
//! for tutorials whose file is missing.

mod cleanup;
mod placeholder;

use std::collections::HashSet;
use std::sync::LazyLock;

use lessonhub_shared::{LessonHubError, Result, TutorialRecord, UNCATEGORIZED};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

pub use placeholder::{coming_soon_html, escape_html};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A quiz embedded in a tutorial page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizMount {
    /// Quiz file name, relative to the quizzes directory.
    pub file: String,
    /// Slug that a passing attempt completes.
    pub slug: String,
}

/// A tutorial converted for display.
#[derive(Debug, Clone)]
pub struct RenderedTutorial {
    /// Heading shown above the body.
    pub title: String,
    pub markdown: String,
    /// Quiz mounts in document order.
    pub quizzes: Vec<QuizMount>,
    /// Slugs of other tutorials linked from this page, deduplicated.
    pub links: Vec<String>,
}

/// Inputs for [`render_tutorial`].
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    /// Slug of the tutorial being rendered.
    pub slug: &'a str,
    /// Catalog metadata used to fill `data-field` placeholders. `None`
    /// leaves the page as fetched.
    pub meta: Option<&'a TutorialRecord>,
    /// URL the fragment was fetched from, for resolving relative links.
    pub page_url: Option<&'a Url>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

static FIELD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-field]").expect("field selector"));
static QUIZ_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-quiz]").expect("quiz selector"));
static NAV_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-nav]").expect("nav selector"));
static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("h1 selector"));

/// Render a tutorial fragment to Markdown.
#[instrument(skip(html, opts), fields(slug = %opts.slug))]
pub fn render_tutorial(html: &str, opts: &RenderOptions<'_>) -> Result<RenderedTutorial> {
    // Work on the parser's own serialization so element HTML can be
    // located by substring.
    let mut page = Html::parse_fragment(html).root_element().inner_html();

    if let Some(meta) = opts.meta {
        page = fill_fields(&page, meta);
    }

    let doc = Html::parse_fragment(&page);
    let page = doc.root_element().inner_html();
    let quizzes = collect_quizzes(&doc, opts.slug);
    let links = collect_links(&doc);
    let title = opts
        .meta
        .map(|m| m.display_title().to_string())
        .or_else(|| first_heading(&doc))
        .unwrap_or_else(|| opts.slug.to_string());

    let page = replace_quiz_mounts(&page, &doc);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript", "iframe", "svg", "button", "textarea"])
        .build();
    let raw = converter
        .convert(&page)
        .map_err(|e| LessonHubError::Conversion(format!("htmd conversion failed: {e}")))?;

    let markdown = cleanup::run_pipeline(&raw, opts.page_url);
    debug!(
        len = markdown.len(),
        quizzes = quizzes.len(),
        links = links.len(),
        "tutorial rendered"
    );

    Ok(RenderedTutorial {
        title,
        markdown,
        quizzes,
        links,
    })
}

/// Display values for the `data-field` placeholders.
fn field_value(meta: &TutorialRecord, name: &str) -> Option<String> {
    let value = match name {
        "title" => meta.display_title().to_string(),
        "description" => meta.description.clone(),
        "category" => {
            if meta.category.is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                meta.category.clone()
            }
        }
        "difficulty" => meta.difficulty_label().to_string(),
        "minutes" => meta.minutes_label(" min"),
        _ => return None,
    };
    Some(value)
}

/// Replace the text of the first element carrying each known
/// `data-field` name.
fn fill_fields(page: &str, meta: &TutorialRecord) -> String {
    let doc = Html::parse_fragment(page);
    let mut filled = HashSet::new();
    let mut out = page.to_string();

    for el in doc.select(&FIELD_SEL) {
        let Some(name) = el.value().attr("data-field") else {
            continue;
        };
        let Some(value) = field_value(meta, name) else {
            continue;
        };
        if !filled.insert(name.to_string()) {
            continue;
        }
        let replacement = with_text(&el, &escape_html(&value));
        out = out.replacen(&el.html(), &replacement, 1);
    }
    out
}

/// Serialize `el` with its children replaced by `inner`.
fn with_text(el: &ElementRef<'_>, inner: &str) -> String {
    let tag = el.value().name();
    let attrs: String = el
        .value()
        .attrs()
        .map(|(k, v)| format!(" {k}=\"{}\"", escape_html(v)))
        .collect();
    format!("<{tag}{attrs}>{inner}</{tag}>")
}

fn collect_quizzes(doc: &Html, slug: &str) -> Vec<QuizMount> {
    doc.select(&QUIZ_SEL)
        .filter_map(|el| {
            let file = el.value().attr("data-quiz")?.trim();
            if file.is_empty() {
                return None;
            }
            let slug = el
                .value()
                .attr("data-quiz-slug")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(slug);
            Some(QuizMount {
                file: file.to_string(),
                slug: slug.to_string(),
            })
        })
        .collect()
}

fn collect_links(doc: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    doc.select(&NAV_SEL)
        .filter_map(|el| el.value().attr("data-nav"))
        .map(str::trim)
        .filter(|s| !s.is_empty() && seen.insert(s.to_string()))
        .map(String::from)
        .collect()
}

fn first_heading(doc: &Html) -> Option<String> {
    doc.select(&H1_SEL)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Swap each quiz mount for a short note naming the quiz file.
fn replace_quiz_mounts(page: &str, doc: &Html) -> String {
    let mut out = page.to_string();
    for el in doc.select(&QUIZ_SEL) {
        let file = el.value().attr("data-quiz").unwrap_or_default().trim();
        let note = format!(
            "<blockquote><p><strong>Quiz:</strong> {}</p></blockquote>",
            escape_html(file)
        );
        out = out.replacen(&el.html(), &note, 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<article class="tutorial" data-tutorial>
  <header>
    <span class="pill" data-field="category">placeholder</span>
    <span class="pill" data-field="minutes">?</span>
    <h1 data-field="title">Template title</h1>
    <p data-field="description"></p>
  </header>
  <section>
    <h2>Why VRAM matters</h2>
    <p>See <a href="?t=quantization-explained" data-nav="quantization-explained">quantization</a>
       and <a href="?t=cpu-vs-gpu-vs-npu" data-nav="cpu-vs-gpu-vs-npu">chips</a>
       and <a href="?t=quantization-explained" data-nav="quantization-explained">again</a>.</p>
    <pre><code class="language-bash">ollama run llama3</code></pre>
    <button data-copy-selector="pre">Copy</button>
  </section>
  <div data-quiz="vram-vs-ram.json"></div>
  <div data-quiz="bonus.json" data-quiz-slug="vram-bonus"></div>
</article>
"#;

    fn meta() -> TutorialRecord {
        serde_json::from_str(
            r#"{"slug":"vram-vs-ram","title":"VRAM vs RAM","description":"Memory <basics>","category":"Hardware","minutes":8}"#,
        )
        .expect("meta")
    }

    #[test]
    fn fills_fields_and_converts() {
        let meta = meta();
        let out = render_tutorial(
            PAGE,
            &RenderOptions {
                slug: "vram-vs-ram",
                meta: Some(&meta),
                page_url: None,
            },
        )
        .expect("render");

        assert_eq!(out.title, "VRAM vs RAM");
        assert!(out.markdown.contains("# VRAM vs RAM"));
        assert!(out.markdown.contains("Hardware"));
        assert!(out.markdown.contains("8 min"));
        assert!(out.markdown.contains("Memory"));
        assert!(!out.markdown.contains("Template title"));
        assert!(out.markdown.contains("```bash"));
        assert!(!out.markdown.contains("Copy"));
    }

    #[test]
    fn collects_quizzes_and_links() {
        let out = render_tutorial(
            PAGE,
            &RenderOptions {
                slug: "vram-vs-ram",
                meta: None,
                page_url: None,
            },
        )
        .expect("render");

        assert_eq!(
            out.quizzes,
            vec![
                QuizMount {
                    file: "vram-vs-ram.json".into(),
                    slug: "vram-vs-ram".into()
                },
                QuizMount {
                    file: "bonus.json".into(),
                    slug: "vram-bonus".into()
                },
            ]
        );
        assert_eq!(out.links, vec!["quantization-explained", "cpu-vs-gpu-vs-npu"]);
        assert!(out.markdown.contains("**Quiz:** vram-vs-ram.json"));
        // Without metadata the page keeps its own heading.
        assert_eq!(out.title, "Template title");
    }

    #[test]
    fn missing_placeholders_are_fine() {
        let meta = meta();
        let out = render_tutorial(
            "<p>Plain body.</p>",
            &RenderOptions {
                slug: "vram-vs-ram",
                meta: Some(&meta),
                page_url: None,
            },
        )
        .expect("render");
        assert_eq!(out.markdown, "Plain body.\n");
        assert!(out.quizzes.is_empty());
    }

    #[test]
    fn field_values_fall_back() {
        let bare: TutorialRecord = serde_json::from_str(r#"{"slug":"x"}"#).expect("record");
        assert_eq!(field_value(&bare, "title").as_deref(), Some("x"));
        assert_eq!(field_value(&bare, "category").as_deref(), Some(UNCATEGORIZED));
        assert_eq!(field_value(&bare, "difficulty").as_deref(), Some("—"));
        assert_eq!(field_value(&bare, "minutes").as_deref(), Some("—"));
        assert_eq!(field_value(&bare, "author"), None);
    }
}
