//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use lessonhub_core::browse::{self, BrowseQuery};
use lessonhub_core::{
    ALL_CATEGORIES, Command as HubCommand, Event, HomeContext, HomeView, LoadSummary, LoadedHub,
    ProgressReporter, load_hub, load_quiz, open_tutorial,
};
use lessonhub_quiz::{AnswerSet, Question, QuestionKind, Quiz, Response, score};
use lessonhub_shared::{AppConfig, EffectiveTutorial, SortMode, init_config, load_config};
use lessonhub_storage::Storage;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LessonHub: browse tutorials and take quizzes from a static tutorial site.
#[derive(Parser)]
#[command(
    name = "lessonhub",
    version,
    about = "Browse a static tutorial site, read tutorials, and take their quizzes.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Site base URL, overriding `site.base_url` from the config file.
    #[arg(long, env = "LESSONHUB_SITE", global = true)]
    pub site: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List tutorials.
    List {
        /// Search title, description, category, tags and slug.
        #[arg(short, long)]
        search: Option<String>,

        /// Only show this category.
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order: recommended, title, time, or difficulty.
        #[arg(long)]
        sort: Option<SortMode>,

        /// Include drafts and tutorials whose file is missing.
        #[arg(long)]
        drafts: bool,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Render a tutorial as Markdown.
    Show {
        /// Tutorial slug.
        slug: String,
    },

    /// Take a tutorial's quiz.
    Quiz {
        /// Tutorial slug.
        slug: String,

        /// Quiz file, relative to the quizzes directory. Defaults to the
        /// first quiz embedded in the tutorial.
        #[arg(short, long)]
        file: Option<String>,

        /// JSON file with answers keyed by question index, e.g.
        /// `{"0": "GPU", "1": ["A", "B"], "2": true}`. Prompts on stdin
        /// when omitted.
        #[arg(short, long)]
        answers: Option<PathBuf>,
    },

    /// Show continue learning, featured, newest, and learning paths.
    Home {
        /// Include drafts.
        #[arg(long)]
        drafts: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show completion progress.
    Progress {
        /// Clear all progress.
        #[arg(long)]
        reset: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lessonhub=info",
        1 => "lessonhub=debug",
        _ => "lessonhub=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let site = cli.site.as_deref();
    match cli.command {
        Command::List {
            search,
            category,
            sort,
            drafts,
            json,
        } => {
            let opts = ListOptions {
                search: search.as_deref().unwrap_or_default(),
                category: category.as_deref(),
                sort,
                drafts,
                json,
            };
            cmd_list(site, &opts).await
        }
        Command::Show { slug } => cmd_show(site, &slug).await,
        Command::Quiz {
            slug,
            file,
            answers,
        } => cmd_quiz(site, &slug, file.as_deref(), answers.as_deref()).await,
        Command::Home { drafts, json } => cmd_home(site, drafts, json).await,
        Command::Progress { reset } => cmd_progress(site, reset).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(site).await,
        },
    }
}

/// Load the config file and apply command-line overrides.
fn resolve_config(site: Option<&str>) -> Result<AppConfig> {
    let mut config = load_config()?;
    if let Some(url) = site {
        config.site.base_url = url.to_string();
    }
    Ok(config)
}

/// Load the hub. Read-only loads leave an existing state database untouched.
async fn load(site: Option<&str>, readonly: bool) -> Result<(AppConfig, LoadedHub)> {
    let config = resolve_config(site)?;
    let path = config.storage.state_db_path()?;
    let storage = if readonly && path.exists() {
        Storage::open_readonly(&path).await?
    } else {
        Storage::open(&path).await?
    };
    let reporter = CliProgress::new();
    let loaded = load_hub(&config, storage, &reporter).await;
    reporter.spinner.finish_and_clear();
    Ok((config, loaded?))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn probed(&self, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Checking tutorial files [{current}/{total}]"));
    }

    fn done(&self, summary: &LoadSummary) {
        debug!(elapsed_ms = summary.elapsed.as_millis() as u64, "load finished");
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

struct ListOptions<'a> {
    search: &'a str,
    category: Option<&'a str>,
    sort: Option<SortMode>,
    drafts: bool,
    json: bool,
}

async fn cmd_list(site: Option<&str>, opts: &ListOptions<'_>) -> Result<()> {
    let (_config, loaded) = load(site, true).await?;
    let state = &loaded.hub.state;

    let show_drafts = opts.drafts || state.prefs.show_drafts;
    let counts = browse::category_counts(&state.tutorials, opts.search, show_drafts);
    let category = opts.category.unwrap_or(ALL_CATEGORIES);
    if !counts.allows(category) {
        let known: Vec<&str> = counts.by_category.keys().map(String::as_str).collect();
        return Err(eyre!(
            "no visible tutorials in category '{category}' (available: {})",
            known.join(", ")
        ));
    }

    let query = BrowseQuery {
        search: opts.search,
        category,
        show_drafts,
        sort: opts.sort.unwrap_or(state.prefs.sort_mode),
    };
    let list = browse::browse_list(&state.tutorials, &query, &state.progress);
    info!(count = list.len(), sort = %query.sort, "listing tutorials");

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if list.is_empty() {
        println!("No tutorials match.");
        return Ok(());
    }

    let width = list.iter().map(|t| t.slug().len()).max().unwrap_or(0);
    println!();
    for t in &list {
        let mark = if state.progress.is_complete(t.slug()) {
            "✓"
        } else {
            " "
        };
        println!(
            "  {mark} {:width$}  {}  [{}]  {}",
            t.slug(),
            t.record.display_title(),
            t.record.category_label(),
            t.meta_line(),
        );
    }
    let stats = state.stats();
    println!();
    println!(
        "  {} shown · {}/{} complete ({}%) · sorted by {}",
        list.len(),
        stats.done,
        stats.total,
        stats.percent,
        query.sort.label()
    );
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

async fn cmd_show(site: Option<&str>, slug: &str) -> Result<()> {
    let (_config, mut loaded) = load(site, false).await?;
    let opened = open_tutorial(&loaded.client, &loaded.hub.state.tutorials, slug).await?;
    loaded
        .hub
        .dispatch(HubCommand::OpenTutorial {
            slug: slug.to_string(),
            previous_scroll: None,
        })
        .await?;

    println!("{} › {}", opened.category, opened.rendered.title);
    println!();
    println!("{}", opened.rendered.markdown.trim_end());

    if !opened.rendered.quizzes.is_empty() {
        println!();
        for quiz in &opened.rendered.quizzes {
            println!("Quiz: lessonhub quiz {} --file {}", quiz.slug, quiz.file);
        }
    }
    if !opened.rendered.links.is_empty() {
        println!();
        println!("See also: {}", opened.rendered.links.join(", "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// quiz
// ---------------------------------------------------------------------------

async fn cmd_quiz(
    site: Option<&str>,
    slug: &str,
    file: Option<&str>,
    answers_path: Option<&Path>,
) -> Result<()> {
    let (_config, mut loaded) = load(site, false).await?;

    let (file, target) = match file {
        Some(f) => (f.to_string(), slug.to_string()),
        None => {
            let opened = open_tutorial(&loaded.client, &loaded.hub.state.tutorials, slug).await?;
            let mount = opened
                .rendered
                .quizzes
                .into_iter()
                .next()
                .ok_or_else(|| eyre!("tutorial '{slug}' has no quiz"))?;
            (mount.file, mount.slug)
        }
    };

    let quiz = load_quiz(&loaded.client, &file)
        .await
        .map_err(|e| eyre!("{}", e.user_message()))?;

    let answers = match answers_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str::<AnswerSet>(&text)
                .map_err(|e| eyre!("invalid answers file {}: {e}", path.display()))?
        }
        None => prompt_answers(&quiz)?,
    };

    let outcome = score(&quiz, &answers);

    println!();
    for (result, question) in outcome.results.iter().zip(&quiz.questions) {
        let mark = if result.correct { "✓" } else { "✗" };
        println!("  {mark} {}. {}", result.index + 1, question.prompt);
        if !result.explanation.is_empty() {
            println!("      {}", result.explanation);
        }
    }
    println!();
    println!(
        "  Score: {}/{} ({}%), {} (passing score {}%)",
        outcome.correct,
        outcome.total,
        outcome.percent,
        if outcome.passed { "passed" } else { "not passed" },
        quiz.passing_score
    );

    let events = loaded
        .hub
        .dispatch(HubCommand::RecordQuiz {
            slug: target.clone(),
            outcome,
        })
        .await?;
    if events.contains(&Event::TutorialCompleted {
        slug: target.clone(),
    }) {
        println!("  Marked '{target}' complete.");
    }
    println!();
    Ok(())
}

/// Ask each question on stdin. A blank line skips the question.
fn prompt_answers(quiz: &Quiz) -> Result<AnswerSet> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = AnswerSet::new();

    println!();
    println!("{}", quiz.title);

    for (index, question) in quiz.questions.iter().enumerate() {
        println!();
        println!("{}. {} ({})", index + 1, question.prompt, question.kind.label());
        for (i, option) in question.kind.options().iter().enumerate() {
            println!("   {}) {option}", i + 1);
        }

        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next().transpose()? else {
                return Ok(answers);
            };
            if line.trim().is_empty() {
                break;
            }
            match parse_choice(question, &line) {
                Some(response) => {
                    answers.insert(index, response);
                    break;
                }
                None => println!("   Enter option numbers, e.g. 2 or 1,3"),
            }
        }
    }
    Ok(answers)
}

/// Turn typed option numbers (1-based, comma-separated) into a response.
fn parse_choice(question: &Question, input: &str) -> Option<Response> {
    let indices = input
        .split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok()?.checked_sub(1))
        .collect::<Option<Vec<_>>>()?;

    match (&question.kind, indices.as_slice()) {
        (QuestionKind::MultiSelect { .. }, [_, ..]) => question.response_for_options(&indices),
        (_, [single]) => question.response_for_option(*single),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// home
// ---------------------------------------------------------------------------

async fn cmd_home(site: Option<&str>, drafts: bool, json: bool) -> Result<()> {
    let (config, loaded) = load(site, true).await?;
    let state = &loaded.hub.state;

    let ctx = HomeContext {
        tutorials: &state.tutorials,
        progress: &state.progress,
        show_drafts: drafts || state.prefs.show_drafts,
        config: &config.home,
    };
    let view = HomeView::build(
        &ctx,
        state.prefs.last_slug.as_deref(),
        loaded.outlines.as_deref(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let title = |slug: &str| -> String {
        state
            .find(slug)
            .map(|t| t.record.display_title().to_string())
            .unwrap_or_else(|| slug.to_string())
    };
    let section = |name: &str, slugs: &[String]| {
        println!();
        println!("{name}");
        if slugs.is_empty() {
            println!("  (none)");
        }
        for slug in slugs {
            println!("  {:28} {}", slug, title(slug));
        }
    };

    println!();
    println!(
        "Continue learning: {} ({})",
        title(&view.continue_slug),
        view.continue_slug
    );
    section("Featured", &view.featured);
    section("Newest", &view.newest);

    println!();
    println!("Learning paths");
    if view.paths.is_empty() {
        println!("  (none)");
    }
    for path in &view.paths {
        println!(
            "  {} ({} steps), start with {}",
            path.name,
            path.step_count(),
            path.start_title
        );
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// progress
// ---------------------------------------------------------------------------

async fn cmd_progress(site: Option<&str>, reset: bool) -> Result<()> {
    let (_config, mut loaded) = load(site, !reset).await?;

    if reset {
        loaded.hub.dispatch(HubCommand::ResetProgress).await?;
        println!("Progress cleared.");
        return Ok(());
    }

    let state = &loaded.hub.state;
    let stats = state.stats();
    println!();
    println!(
        "  {}/{} tutorials complete ({}%)",
        stats.done, stats.total, stats.percent
    );

    let done: Vec<&EffectiveTutorial> = state
        .progress
        .completed_slugs()
        .filter_map(|slug| state.find(slug))
        .collect();
    for t in done {
        println!("  ✓ {:28} {}", t.slug(), t.record.display_title());
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(site: Option<&str>) -> Result<()> {
    let config = resolve_config(site)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use lessonhub_quiz::parse_quiz;

    use super::*;

    fn quiz() -> Quiz {
        parse_quiz(
            r#"{"title":"T","questions":[
                {"type":"multiple-choice","question":"Pick","options":["A","B","C"],"answer":"B","explanation":"."},
                {"type":"multi-select","question":"Both","options":["A","B","C"],"answer":["A","C"],"explanation":"."},
                {"type":"true-false","question":"Yes?","answer":true,"explanation":"."}
            ]}"#,
        )
        .expect("quiz")
    }

    #[test]
    fn typed_choices_become_responses() {
        let quiz = quiz();
        let q = &quiz.questions;
        assert_eq!(parse_choice(&q[0], "2"), Some(Response::Choice("B".into())));
        assert_eq!(parse_choice(&q[0], "1,2"), None);
        assert_eq!(parse_choice(&q[0], "9"), None);
        assert_eq!(
            parse_choice(&q[1], "3, 1"),
            Some(Response::Choices(vec!["C".into(), "A".into()]))
        );
        assert_eq!(parse_choice(&q[2], "1"), Some(Response::Flag(true)));
        assert_eq!(parse_choice(&q[2], "0"), None);
        assert_eq!(parse_choice(&q[2], "yes"), None);
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "lessonhub",
            "--site",
            "http://localhost:8000",
            "list",
            "--sort",
            "title",
            "--drafts",
        ])
        .expect("parse");
        assert_eq!(cli.site.as_deref(), Some("http://localhost:8000"));
        assert!(matches!(
            cli.command,
            Command::List {
                sort: Some(SortMode::Title),
                drafts: true,
                ..
            }
        ));
    }
}
