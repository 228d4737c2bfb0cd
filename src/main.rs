mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use pausa::{
    app_dirs::AppDirs,
    engine::{TimerEngine, MAX_WORK_MINUTES},
    history::SessionLog,
    notifier::DesktopNotifier,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    store::FileSessionStore,
    TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, SystemTime},
};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How many ticks the in-app toast stays visible after the break signal.
const TOAST_TICKS: u8 = 8;

/// work/break interval timer that survives restarts
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A work/break interval timer for the terminal. Start a session, keep working, \
and get a desktop notification, a bell, and an on-screen nudge once your configured work \
duration is up. A running session survives quitting and restarting the app."
)]
pub struct Cli {
    /// work duration in minutes; persists, same as changing it in the app
    #[clap(short = 'w', long, value_parser = clap::value_parser!(u64).range(1..=MAX_WORK_MINUTES))]
    work: Option<u64>,

    /// don't ring the terminal bell when a break is due
    #[clap(long)]
    no_sound: bool,

    /// discard any persisted session and come up stopped
    #[clap(long)]
    fresh: bool,
}

pub struct App {
    pub engine: TimerEngine<FileSessionStore, DesktopNotifier>,
    pub history: SessionLog,
    pub now: SystemTime,
    pub work_input: String,
    pub toast_ticks: u8,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let store = FileSessionStore::new();
        let notifier = DesktopNotifier::new(!cli.no_sound);

        let mut engine = if cli.fresh {
            TimerEngine::fresh(store, notifier)
        } else {
            TimerEngine::load(store, notifier)
        };

        if let Some(minutes) = cli.work {
            engine.set_work_minutes(minutes);
        }

        Self {
            engine,
            history: SessionLog::new(),
            now: SystemTime::now(),
            work_input: String::new(),
            toast_ticks: 0,
        }
    }

    /// Start/stop toggle; a stop logs the finished session.
    pub fn toggle(&mut self) {
        if self.engine.is_running() {
            if let Some(summary) = self.engine.stop() {
                if let Err(err) = self.history.append(&summary) {
                    warn!(error = %err, "failed to append session history");
                }
            }
            self.toast_ticks = 0;
        } else {
            self.work_input.clear();
            self.engine.start();
        }
    }

    pub fn on_tick(&mut self) {
        self.now = SystemTime::now();
        if self.engine.tick_at(self.now) {
            self.toast_ticks = TOAST_TICKS;
        } else {
            self.toast_ticks = self.toast_ticks.saturating_sub(1);
        }
    }

    pub fn apply_work_input(&mut self) {
        // Rejected input is a silent no-op; the field resets either way.
        let input = std::mem::take(&mut self.work_input);
        self.engine.set_work_duration_input(&input);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli);
    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        app.now = SystemTime::now();
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => match key.code {
                KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('q') => break,
                KeyCode::Char('s') => app.toggle(),
                KeyCode::Char(c @ '0'..='9') if !app.engine.is_running() => {
                    app.work_input.push(c);
                }
                KeyCode::Backspace if !app.engine.is_running() => {
                    app.work_input.pop();
                }
                KeyCode::Enter if !app.engine.is_running() => app.apply_work_input(),
                _ => {}
            },
        }
    }

    Ok(())
}

/// Route tracing to a file under the state dir; the TUI owns the terminal.
fn init_tracing() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
    else {
        return;
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pausa=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(file)),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use tempfile::tempdir;

    fn test_app(dir: &std::path::Path) -> App {
        App {
            engine: TimerEngine::load(
                pausa::store::FileSessionStore::with_path(dir.join("session.json")),
                DesktopNotifier::new(false),
            ),
            history: SessionLog::with_path(dir.join("history.csv")),
            now: SystemTime::now(),
            work_input: String::new(),
            toast_ticks: 0,
        }
    }

    fn rendered_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| f.render_widget(app, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn hints_list_every_bound_quit_key() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        // Stopped, running and overdue all advertise the quit keys the
        // event loop actually handles.
        assert!(rendered_text(&app).contains("q/esc quit"));

        app.engine.start_at(app.now);
        assert!(rendered_text(&app).contains("q/esc quit"));

        app.engine.set_work_minutes(1);
        app.now += Duration::from_secs(120);
        assert!(rendered_text(&app).contains("q/esc quit"));
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["pausa"]).unwrap();
        assert_eq!(cli.work, None);
        assert!(!cli.no_sound);
        assert!(!cli.fresh);
    }

    #[test]
    fn cli_accepts_work_minutes() {
        let cli = Cli::try_parse_from(["pausa", "--work", "45"]).unwrap();
        assert_eq!(cli.work, Some(45));
    }

    #[test]
    fn cli_rejects_zero_work_minutes() {
        assert!(Cli::try_parse_from(["pausa", "--work", "0"]).is_err());
    }

    #[test]
    fn cli_rejects_unrepresentable_work_minutes() {
        assert!(Cli::try_parse_from(["pausa", "--work", "9999999999999999999"]).is_err());
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::try_parse_from(["pausa", "--no-sound", "--fresh"]).unwrap();
        assert!(cli.no_sound);
        assert!(cli.fresh);
    }
}
