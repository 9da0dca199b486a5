//! Loaders behind the reader and quiz views.

use lessonhub_catalog::SiteClient;
use lessonhub_content::{RenderOptions, RenderedTutorial, coming_soon_html, render_tutorial};
use lessonhub_quiz::{Quiz, parse_quiz};
use lessonhub_shared::{EffectiveTutorial, Result, TutorialRecord};
use tracing::{info, instrument};

/// Breadcrumb category for slugs the catalog does not know.
pub const MISSING_CATEGORY: &str = "Missing";

/// A tutorial ready for the reader.
#[derive(Debug, Clone)]
pub struct OpenedTutorial {
    pub slug: String,
    /// Category shown in the breadcrumb.
    pub category: String,
    pub rendered: RenderedTutorial,
    /// The page is a placeholder rather than the tutorial itself.
    pub placeholder: bool,
}

/// Fetch and render `slug`.
///
/// Unknown slugs and missing content files become a "coming soon" page.
/// Transport failures are returned as retryable network errors.
#[instrument(skip(client, tutorials))]
pub async fn open_tutorial(
    client: &SiteClient,
    tutorials: &[EffectiveTutorial],
    slug: &str,
) -> Result<OpenedTutorial> {
    let path = client.tutorial_path(slug);

    let Some(entry) = tutorials.iter().find(|t| t.slug() == slug) else {
        info!(slug, "slug not in catalog");
        let meta = TutorialRecord {
            slug: slug.to_string(),
            ..TutorialRecord::default()
        };
        let reason = format!("Tutorial not found in tutorials.json: {slug}");
        let html = coming_soon_html(&meta, &path, Some(&reason));
        let rendered = render_tutorial(
            &html,
            &RenderOptions {
                slug,
                meta: None,
                page_url: None,
            },
        )?;
        return Ok(OpenedTutorial {
            slug: slug.to_string(),
            category: MISSING_CATEGORY.to_string(),
            rendered,
            placeholder: true,
        });
    };

    let meta = &entry.record;
    let page_url = client.tutorial_url(slug)?;
    let fetched = client.fetch_tutorial_html(slug).await?;
    let placeholder = fetched.is_none();
    let html = fetched.unwrap_or_else(|| {
        coming_soon_html(meta, &path, Some(&format!("Missing file: {path}")))
    });

    let rendered = render_tutorial(
        &html,
        &RenderOptions {
            slug,
            meta: Some(meta),
            page_url: (!placeholder).then_some(&page_url),
        },
    )?;

    Ok(OpenedTutorial {
        slug: slug.to_string(),
        category: meta.category_label().to_string(),
        rendered,
        placeholder,
    })
}

/// Fetch, parse and validate a quiz file.
#[instrument(skip(client))]
pub async fn load_quiz(client: &SiteClient, file: &str) -> Result<Quiz> {
    let text = client.fetch_quiz_text(file).await?;
    let quiz = parse_quiz(&text)?;
    info!(title = %quiz.title, questions = quiz.questions.len(), "quiz loaded");
    Ok(quiz)
}
