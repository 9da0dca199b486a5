//! LessonHub CLI: browse a static tutorial site from the terminal.
//!
//! Lists and searches the catalog, renders tutorials as Markdown, runs
//! quizzes, and tracks completion progress locally.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
