mod clock;
mod notifier;
mod reminder;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use serde::Deserialize;
use std::{fs, io, path::{Path, PathBuf}, time::Instant};
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use notifier::DesktopNotifier;
use reminder::{Reminder, MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};
use ui::App;

// ============================================================================
// Type Aliases & Constants
// ============================================================================

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
const DATA_DIR: &str = "posture-check";
const LOG_FILE: &str = "posture-check.log";
const DEFAULT_INTERVAL_MINUTES: u32 = 20;
const DEFAULT_TICK_SECONDS: u64 = 5;
const MAX_TICK_SECONDS: u64 = MAX_INTERVAL_MINUTES as u64 * 60;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Clone)]
#[command(author, version, about = "posture-check - a status-bar reminder to check your posture")]
struct Args {
    /// Reminder interval in minutes (1-120)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=120))]
    interval: Option<u32>,
    /// Seconds between accumulation ticks (at most the interval)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=MAX_TICK_SECONDS))]
    tick: Option<u64>,
    /// Keep the interval fixed; hides "Set Interval..."
    #[arg(long)]
    fixed: bool,
    #[arg(long)]
    no_sound: bool,
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
struct Config {
    interval_minutes: u32,
    tick_seconds: u64,
    fixed_interval: bool,
    sound_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            tick_seconds: DEFAULT_TICK_SECONDS,
            fixed_interval: false,
            sound_enabled: true,
        }
    }
}

impl Config {
    fn apply_args(mut self, args: &Args) -> Self {
        if let Some(i) = args.interval { self.interval_minutes = i; }
        if let Some(t) = args.tick { self.tick_seconds = t; }
        if args.fixed { self.fixed_interval = true; }
        if args.no_sound { self.sound_enabled = false; }
        self
    }

    /// Replaces out-of-range values with defaults.
    fn validated(mut self) -> Self {
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&i64::from(self.interval_minutes)) {
            warn!(
                "interval_minutes={} outside {}-{}, using {}",
                self.interval_minutes, MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES, DEFAULT_INTERVAL_MINUTES
            );
            self.interval_minutes = DEFAULT_INTERVAL_MINUTES;
        }
        if !(1..=self.interval_secs()).contains(&self.tick_seconds) {
            warn!(
                "tick_seconds={} outside 1-{}, using {}",
                self.tick_seconds, self.interval_secs(), DEFAULT_TICK_SECONDS
            );
            self.tick_seconds = DEFAULT_TICK_SECONDS;
        }
        self
    }

    fn interval_secs(&self) -> u64 {
        u64::from(self.interval_minutes) * 60
    }
}

fn get_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(".");
    path.push(DATA_DIR);
    path.push(filename);
    path
}

fn load_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> T {
    let Ok(s) = fs::read_to_string(path) else {
        return T::default();
    };
    serde_json::from_str(&s).unwrap_or_else(|e| {
        warn!("Ignoring malformed {}: {}", path.display(), e);
        T::default()
    })
}

// ============================================================================
// Main
// ============================================================================

fn init_logging(args: &Args) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = PathBuf::from(".").join(DATA_DIR);
    fs::create_dir_all(&dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(&dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("posture_check={}", args.log_level()))),
        )
        .init();

    Ok(guard)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(&args)?;

    let config_path = args.config.clone().unwrap_or_else(|| get_path("config.json"));
    let config = load_json::<Config>(&config_path).apply_args(&args).validated();

    info!(
        "Starting posture-check at {}: interval={}min, tick={}s, fixed={}, sound={}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        config.interval_minutes, config.tick_seconds, config.fixed_interval, config.sound_enabled
    );

    let notifier = DesktopNotifier::new(config.sound_enabled);
    notifier.probe();

    let reminder = Reminder::new(config.interval_secs(), config.tick_seconds);
    let mut app = App::new(reminder, Box::new(notifier), config.fixed_interval, Instant::now());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("posture-check stopped after {} cycles", app.reminder().cycles());
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render_ui(f, app))?;

        let timeout = app.poll_timeout(Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key, Instant::now()) {
                    return Ok(());
                }
            }
        }

        app.on_clock(Instant::now());
    }
}
