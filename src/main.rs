use std::{
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use whackavo::{
    app::{App, Flow},
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    engine::{Engine, NoopReporter, ScoreReporter},
    highscore::HighScoreClient,
    runtime::{CrosstermEventSource, FixedTicker, GameEventSource, Runner, Ticker},
    spawner::Spawner,
};

/// whack the avocados before they sink
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal whack-a-mole: letters pop up in seven holes, type them before they vanish. One wrong key or one missed avocado ends the round."
)]
pub struct Cli {
    /// milliseconds between redraws
    #[clap(short = 't', long)]
    tick_rate_ms: Option<u64>,

    /// full URL of the shared high-score endpoint
    #[clap(short = 'u', long)]
    highscore_url: Option<String>,

    /// seconds between world best refreshes
    #[clap(long)]
    poll_secs: Option<u64>,

    /// how long an avocado stays up, in milliseconds
    #[clap(short = 'l', long)]
    lifetime_ms: Option<u64>,

    /// starting gap between spawns, in milliseconds
    #[clap(short = 'i', long)]
    spawn_interval_ms: Option<u64>,

    /// seed for a repeatable letter sequence
    #[clap(long)]
    seed: Option<u64>,

    /// play without contacting the high-score service
    #[clap(long)]
    offline: bool,
}

impl Cli {
    /// Layer the flags over the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(ms) = self.tick_rate_ms {
            config.tick_rate_ms = ms;
        }
        if let Some(url) = &self.highscore_url {
            config.highscore_url = Some(url.clone());
        }
        if let Some(secs) = self.poll_secs {
            config.highscore_poll_secs = secs;
        }
        if let Some(ms) = self.lifetime_ms {
            config.difficulty.target_lifetime_ms = ms;
        }
        if let Some(ms) = self.spawn_interval_ms {
            config.difficulty.initial_spawn_interval_ms = ms;
        }
        if self.offline {
            config.highscore_url = None;
        }
        config
    }

    fn spawner(&self) -> Spawner {
        match self.seed {
            Some(seed) => Spawner::seeded(seed),
            None => Spawner::new(),
        }
    }
}

/// Log to a file, the terminal belongs to the game
fn init_logging() {
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

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    info!(config = ?config, "starting");

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_rate()),
    );

    let reporter: Box<dyn ScoreReporter> = match &config.highscore_url {
        Some(url) => {
            match HighScoreClient::spawn(url.clone(), config.poll_interval(), runner.sender()) {
                Ok(client) => Box::new(client),
                Err(e) => {
                    warn!("high score client unavailable: {}", e);
                    Box::new(NoopReporter)
                }
            }
        }
        None => Box::new(NoopReporter),
    };

    let engine = Engine::new(
        config.difficulty,
        SystemClock::new(),
        cli.spawner(),
        reporter,
    );
    let mut app = App::new(engine);

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn run_app<B, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App<SystemClock>,
    runner: &Runner<E, T>,
) -> Result<()>
where
    B: Backend,
    E: GameEventSource,
    T: Ticker,
{
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step_within(app.time_to_next_job());
        if app.handle_event(event) == Flow::Quit {
            info!(best = app.personal_best, "quitting");
            return Ok(());
        }
    }
}
