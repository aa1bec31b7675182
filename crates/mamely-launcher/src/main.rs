//! MAMEly Launcher
//!
//! A TUI launcher for MAME-style ROM collections: browse a platform's
//! catalog by category, keep favorites and an ignore list, and run games.

mod app;
mod input;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::App;
use input::action_for;
use mamely_config::{CONFIG_FILE, LauncherConfig};
use mamely_emulator::LaunchRequest;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// `--config=<path>` (or `-config=<path>`), defaulting to `mamely.toml`
fn config_path(args: impl IntoIterator<Item = String>) -> PathBuf {
    args.into_iter()
        .find_map(|arg| {
            arg.strip_prefix("--config=")
                .or_else(|| arg.strip_prefix("-config="))
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Cannot create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Hand the terminal to the emulator, then take it back
fn run_suspended(terminal: &mut Tui, app: &mut App, request: &LaunchRequest) -> Result<()> {
    restore_terminal(terminal)?;
    app.run_game(request);

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    // Keys pressed while the game ran belong to the game
    while event::poll(Duration::ZERO)? {
        event::read()?;
    }
    Ok(())
}

fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw_ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(request) = action_for(key.code).and_then(|a| app.handle_action(a)) {
                        // Show "Launching..." before the screen goes away
                        terminal.draw(|f| ui::draw_ui(f, app))?;
                        run_suspended(terminal, app, &request)?;
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    let config_path = config_path(std::env::args().skip(1));
    let config = LauncherConfig::load_or_default(&config_path)
        .with_context(|| format!("Cannot load {}", config_path.display()))?;

    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    init_logging(&base_dir.join(&config.log_file))?;

    info!("MAMEly starting with {} platform(s)", config.platforms.len());

    let mut app = App::new(base_dir, config);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        error!("Launcher failed: {:#}", e);
    }
    info!("MAMEly exiting");
    result
}
