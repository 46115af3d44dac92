mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;
use typespark::{
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, FileConfigStore},
    coordinator::{Coordinator, CoordinatorEvent},
    error::{InputError, StorageError},
    practice_text::{self, choose_practice_text},
    provider::StatsProvider,
    remote::HttpStatsApi,
    runtime::{AppEvent, EventSource, Runner},
    stats::{export_history_csv, StatsEngine, StatsSnapshot},
    storage::SqliteStore,
    theme::Theme,
};

/// Environment variable holding the tracing filter
pub const LOG_ENV: &str = "TYPESPARK_LOG";

/// timed multi-phase typing practice with streaks and progress stats
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Practice typing on your own study material. Each session runs six timed phases, scores every phase, and keeps your averages and daily streaks."
)]
pub struct Cli {
    /// custom text to practice with
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// .txt or .pdf file to practice with (ignored when --prompt is given)
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// open on the statistics screen
    #[clap(short = 's', long)]
    stats: bool,

    /// write the session history as csv to PATH and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// sync sessions with the remote API, falling back to local storage
    #[clap(long)]
    use_api: bool,
}

pub type Provider = StatsProvider<SqliteStore, SystemClock, HttpStatsApi>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Session,
    Completed,
    Stats,
}

pub struct App {
    pub coordinator: Coordinator<SystemClock>,
    /// Contents of the input box for the active phase
    pub typed: String,
    pub state: AppState,
    pub provider: Provider,
    pub snapshot: StatsSnapshot,
    pub theme: Theme,
}

impl App {
    pub fn new(provider: Provider, open_stats: bool) -> Self {
        let snapshot = provider.load();
        let theme = Theme::load(provider.engine().store());

        let mut app = Self {
            coordinator: Coordinator::new(SystemClock),
            typed: String::new(),
            state: AppState::Stats,
            provider,
            snapshot,
            theme,
        };
        if !open_stats {
            app.start_session();
        }
        app
    }

    /// Throw away the current coordinator and start over on the queued text
    pub fn start_session(&mut self) {
        let text = practice_text::load_pending(self.provider.engine().store());
        self.coordinator = Coordinator::new(SystemClock);
        self.coordinator.start(&text);
        self.typed.clear();
        self.state = AppState::Session;
    }

    pub fn on_tick(&mut self) {
        let event = self.coordinator.on_tick();
        self.apply(event);
    }

    /// Returns false when the app should exit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }

        match self.state {
            AppState::Session => match key.code {
                KeyCode::Esc => {
                    if !self.coordinator.is_in_progress() {
                        return false;
                    }
                    let event = self.coordinator.finish();
                    self.apply(event);
                }
                KeyCode::Tab => {
                    if self.coordinator.retry_phase() {
                        self.typed.clear();
                    }
                }
                KeyCode::Backspace => self.backspace(),
                KeyCode::Char(c) => self.type_char(c),
                _ => {}
            },
            AppState::Completed => match key.code {
                KeyCode::Char('n') => self.start_session(),
                KeyCode::Char('s') => self.state = AppState::Stats,
                KeyCode::Char('t') => self.cycle_theme(),
                KeyCode::Char('q') | KeyCode::Esc => return false,
                _ => {}
            },
            AppState::Stats => match key.code {
                KeyCode::Char('n') => self.start_session(),
                KeyCode::Char('b') | KeyCode::Backspace => self.leave_stats(),
                KeyCode::Char('t') => self.cycle_theme(),
                KeyCode::Char('q') | KeyCode::Esc => return false,
                _ => {}
            },
        }
        true
    }

    fn accepts_input(&self) -> bool {
        self.coordinator.is_in_progress() && !self.coordinator.awaiting_advance()
    }

    fn type_char(&mut self, c: char) {
        if !self.accepts_input() {
            return;
        }
        let limit = self.coordinator.attempt().map_or(0, |a| a.prompt().len());
        if self.typed.chars().count() >= limit {
            return;
        }

        self.typed.push(c);
        let event = self.coordinator.on_input(&self.typed);
        self.apply(event);
    }

    fn backspace(&mut self) {
        if !self.accepts_input() || self.typed.pop().is_none() {
            return;
        }
        let event = self.coordinator.on_input(&self.typed);
        self.apply(event);
    }

    fn leave_stats(&mut self) {
        if self.coordinator.is_completed() {
            self.state = AppState::Completed;
        } else if self.coordinator.is_in_progress() {
            self.state = AppState::Session;
        } else {
            self.start_session();
        }
    }

    fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        if let Err(e) = self.theme.save(self.provider.engine().store()) {
            tracing::warn!("failed to save theme preference: {}", e);
        }
    }

    fn apply(&mut self, event: Option<CoordinatorEvent>) {
        match event {
            Some(CoordinatorEvent::PhaseAdvanced { .. }) => self.typed.clear(),
            Some(CoordinatorEvent::SessionCompleted(record)) => {
                self.snapshot = self.provider.save(record, &self.snapshot);
                self.typed.clear();
                self.state = AppState::Completed;
            }
            Some(CoordinatorEvent::PhaseCompleted(_)) | None => {}
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = FileConfigStore::new().load_or_init();
    init_logging(&config);

    let store = open_store()?;
    if let Err(e) = queue_practice_text(&cli, &store) {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
    }
    let provider = build_provider(store, &config, cli.use_api);

    if let Some(path) = &cli.export_csv {
        let snapshot = provider.load();
        export_history_csv(&snapshot.session_history, File::create(path)?)?;
        println!(
            "exported {} sessions to {}",
            snapshot.total_sessions(),
            path.display()
        );
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(provider, cli.stats);
    let runner = Runner::terminal();
    let result = run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to a file in the state dir; the terminal belongs to the TUI
fn init_logging(config: &Config) {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn open_store() -> Result<SqliteStore, StorageError> {
    SqliteStore::open_default().or_else(|e| {
        tracing::warn!("failed to open store, sessions will not be kept: {}", e);
        SqliteStore::open_in_memory()
    })
}

/// Store text from the command line as the text for the next session
fn queue_practice_text(cli: &Cli, store: &SqliteStore) -> Result<(), InputError> {
    if cli.prompt.is_none() && cli.file.is_none() {
        return Ok(());
    }
    let text = choose_practice_text(cli.prompt.as_deref(), cli.file.as_deref())?;
    if let Err(e) = practice_text::save_pending(store, &text) {
        tracing::warn!("failed to queue practice text: {}", e);
    }
    Ok(())
}

fn build_provider(store: SqliteStore, config: &Config, use_api: bool) -> Provider {
    let engine = StatsEngine::new(store, SystemClock);
    if !(use_api || config.use_api) {
        return StatsProvider::local(engine);
    }

    match HttpStatsApi::new(config.resolved_api_base_url(), config.user_id.clone()) {
        Ok(api) => StatsProvider::with_api(engine, api),
        Err(e) => {
            tracing::warn!("failed to build API client, using local store: {}", e);
            StatsProvider::local(engine)
        }
    }
}

fn run<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
        }
    }

    Ok(())
}
