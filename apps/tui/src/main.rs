//! LessonHub TUI: browse tutorials, read them, and take quizzes.
//!
//! Provides Home, Browse, Reader and Quiz screens built with
//! `ratatui` + `crossterm`. Logs go to a file under the config directory
//! so they never mix with the terminal UI.

mod app;
mod screens;
mod widgets;

use std::fs::{self, File};
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use lessonhub_core::{SilentProgress, load_hub};
use lessonhub_shared::{config_dir, load_config};
use lessonhub_storage::Storage;

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let mut config = load_config()?;
    if let Ok(site) = std::env::var("LESSONHUB_SITE") {
        config.site.base_url = site;
    }

    let rt = tokio::runtime::Runtime::new()?;
    println!("Loading tutorials from {} …", config.site.base_url);
    let loaded = rt.block_on(async {
        let storage = Storage::open(&config.storage.state_db_path()?).await?;
        load_hub(&config, storage, &SilentProgress).await
    });
    let loaded = loaded.map_err(|e| eyre!("{}", e.user_message()))?;

    app::run(app::App::new(rt, config, loaded))
}

/// Log to `<config dir>/logs/lessonhub-tui.log`, filtered by `RUST_LOG`
/// (default `lessonhub=info`).
fn init_tracing() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let dir = config_dir()?.join("logs");
    fs::create_dir_all(&dir)?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(dir.join("lessonhub-tui.log"))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lessonhub=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
