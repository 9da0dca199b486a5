//! Core TUI application state and event loop.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use lessonhub_content::QuizMount;
use lessonhub_core::{
    Command, Event as HubEvent, HomeContext, HomeView, LoadedHub, load_quiz, open_tutorial,
};
use lessonhub_shared::AppConfig;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::screens::{Action, ScreenId, Screens};
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    rt: Runtime,
    config: AppConfig,
    loaded: LoadedHub,
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    pub screens: Screens,
}

impl App {
    pub(crate) fn new(rt: Runtime, config: AppConfig, loaded: LoadedHub) -> Self {
        let mut app = Self {
            rt,
            config,
            loaded,
            active_tab: 0,
            should_quit: false,
            status: "Ready · press ? for help".to_string(),
            show_help: false,
            screens: Screens::new(),
        };
        app.refresh_home();
        app
    }

    fn current_screen(&self) -> ScreenId {
        ScreenId::ALL[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        self.screens.is_editing(self.current_screen())
    }

    fn switch_to(&mut self, id: ScreenId) {
        if let Some(idx) = ScreenId::ALL.iter().position(|s| *s == id) {
            self.active_tab = idx;
        }
    }

    fn refresh_home(&mut self) {
        let state = &self.loaded.hub.state;
        let ctx = HomeContext {
            tutorials: &state.tutorials,
            progress: &state.progress,
            show_drafts: state.prefs.show_drafts,
            config: &self.config.home,
        };
        let view = HomeView::build(
            &ctx,
            state.prefs.last_slug.as_deref(),
            self.loaded.outlines.as_deref(),
        );
        self.screens.home.refresh(&view);
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    fn perform(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Status(msg) => self.status = msg,
            Action::Dispatch(command) => self.dispatch(command),
            Action::Open(slug) => self.open(&slug),
            Action::StartQuiz(mount) => self.start_quiz(mount),
        }
    }

    fn dispatch(&mut self, command: Command) {
        let result = self.rt.block_on(self.loaded.hub.dispatch(command));
        match result {
            Ok(events) => self.apply(events),
            Err(e) => {
                warn!(error = %e, "command failed");
                self.status = e.user_message();
            }
        }
    }

    fn apply(&mut self, events: Vec<HubEvent>) {
        for event in events {
            match event {
                HubEvent::ListChanged => {
                    self.screens.browse.reset_selection();
                    self.refresh_home();
                }
                HubEvent::ProgressChanged => self.refresh_home(),
                HubEvent::TutorialOpened { scroll, .. } => {
                    self.screens.reader.restore_scroll(scroll);
                }
                HubEvent::TutorialCompleted { slug } => {
                    let title = self
                        .loaded
                        .hub
                        .state
                        .find(&slug)
                        .map(|t| t.record.display_title().to_string())
                        .unwrap_or(slug);
                    self.status = format!("Completed: {title} ✓");
                }
            }
        }
    }

    fn open(&mut self, slug: &str) {
        self.status = format!("Loading {slug}…");
        let previous_scroll = self
            .screens
            .reader
            .current_slug()
            .map(|_| i64::from(self.screens.reader.scroll()));

        let result = self.rt.block_on(open_tutorial(
            &self.loaded.client,
            &self.loaded.hub.state.tutorials,
            slug,
        ));
        self.switch_to(ScreenId::Reader);

        match result {
            Ok(opened) => {
                self.status = if opened.placeholder {
                    format!("{} is not published yet", opened.rendered.title)
                } else {
                    opened.rendered.title.clone()
                };
                self.screens.reader.show(opened);
                self.dispatch(Command::OpenTutorial {
                    slug: slug.to_string(),
                    previous_scroll,
                });
            }
            Err(e) => {
                warn!(slug, error = %e, "open failed");
                self.status = e.user_message();
                self.screens.reader.fail(slug, e.user_message());
            }
        }
    }

    fn start_quiz(&mut self, mount: QuizMount) {
        let result = self.rt.block_on(load_quiz(&self.loaded.client, &mount.file));
        self.switch_to(ScreenId::Quiz);
        match result {
            Ok(quiz) => {
                self.status = format!("{} · {} questions", quiz.title, quiz.questions.len());
                self.screens.quiz.start(mount, quiz);
            }
            Err(e) => {
                warn!(file = %mount.file, error = %e, "quiz load failed");
                self.status = e.user_message();
                self.screens.quiz.fail(mount, e.user_message());
            }
        }
    }

    /// Persist the reader position before exit.
    fn save_scroll(&mut self) {
        if let Some(slug) = self.screens.reader.current_slug().map(String::from) {
            let offset = i64::from(self.screens.reader.scroll());
            self.dispatch(Command::SaveScroll { slug, offset });
        }
    }
}

/// Entry point: sets up the terminal, runs the event loop, restores the terminal.
pub(crate) fn run(mut app: App) -> Result<()> {
    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);
    app.save_scroll();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("tui closed");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key.code, key.modifiers);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        // Tab navigation with number keys
        KeyCode::Char(c @ '1'..='4') if !app.is_editing() => {
            let idx = (c as usize) - ('1' as usize);
            app.active_tab = idx;
            app.status = format!("{}", ScreenId::ALL[idx]);
            return;
        }
        KeyCode::Tab if !app.is_editing() => {
            app.active_tab = (app.active_tab + 1) % ScreenId::ALL.len();
            app.status = format!("{}", app.current_screen());
            return;
        }
        KeyCode::BackTab if !app.is_editing() => {
            app.active_tab = if app.active_tab == 0 {
                ScreenId::ALL.len() - 1
            } else {
                app.active_tab - 1
            };
            app.status = format!("{}", app.current_screen());
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Delegate to current screen
    let id = app.current_screen();
    let action = app
        .screens
        .handle_key(id, code, modifiers, &app.loaded.hub.state);
    app.perform(action);
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = ScreenId::ALL
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" LessonHub "))
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area, delegated to the screen
    app.screens
        .draw(app.current_screen(), f, chunks[1], &app.loaded.hub.state);

    // Status bar
    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-4          Switch to screen"),
        Line::from("  Tab/S-Tab    Next/previous screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Browse:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  /            Search (Esc clears)"),
        Line::from("  c / C        Next/previous category"),
        Line::from("  s            Cycle sort order"),
        Line::from("  d            Show/hide drafts"),
        Line::from("  R            Reset progress"),
        Line::from(""),
        Line::from("Reader:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓ PgUp/PgDn  Scroll"),
        Line::from("  t            Take the quiz"),
        Line::from(""),
        Line::from("Quiz:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Space        Choose option"),
        Line::from("  ←/→          Previous/next question"),
        Line::from("  s            Submit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help · press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
