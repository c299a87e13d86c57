use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    style::Print,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use stackr::{
    app::App,
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{ConfigStore, FileConfigStore},
    export, logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner, StackrEvent},
    solve::{Event, Scope, SolveHistory},
    store::SolveStore,
    ui,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

/// hold-to-start speed stacking timer with rolling averages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Hold space (or the left mouse button) until the timer turns green, release to start, press anything to stop. Solves are kept per event and session with mo3, ao5 and ao12."
)]
pub struct Cli {
    /// event to time
    #[clap(short = 'e', long, value_enum)]
    event: Option<Event>,

    /// session number within the event
    #[clap(short = 's', long, default_value_t = 1)]
    session: u32,

    /// path of the solve database
    #[clap(long)]
    db: Option<PathBuf>,

    /// keep solves in memory only
    #[clap(long)]
    no_save: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// print the statistics of a session
    Stats,
    /// write a session as csv
    Export {
        /// output file, stdout when omitted
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn open_store(&self) -> stackr::Result<Option<SolveStore>> {
        if self.no_save {
            return Ok(None);
        }
        let store = match &self.db {
            Some(path) => SolveStore::open(path)?,
            None => SolveStore::open_default()?,
        };
        Ok(Some(store))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        logging::init(&path)?;
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    let scope = Scope::new(cli.event.unwrap_or(config.event), cli.session);
    let store = cli.open_store()?;

    match &cli.command {
        Some(Command::Stats) => {
            let history = load(&store, scope)?;
            let mut out = io::stdout().lock();
            export::write_summary(scope, &history, &mut out)?;
            if let Some(store) = &store {
                let sessions = store
                    .sessions(scope.event)?
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>();
                if !sessions.is_empty() {
                    writeln!(out, "sessions {}", sessions.join(" "))?;
                }
            }
            return Ok(());
        }
        Some(Command::Export { output }) => {
            let history = load(&store, scope)?;
            match output {
                Some(path) => export::write_csv(&history, File::create(path)?)?,
                None => export::write_csv(&history, io::stdout().lock())?,
            }
            return Ok(());
        }
        None => {}
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(&config, scope, store, SystemClock)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        warn!("terminal does not report key releases, space toggles instead of hold");
    }
    app.set_key_release_supported(enhanced);

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(event = %scope.event, session = scope.session, "starting timer");
    let result = start_tui(
        &mut terminal,
        &mut app,
        Duration::from_millis(config.tick_rate_ms.max(1)),
    );

    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    config.event = app.scope.event;
    if let Err(err) = config_store.save(&config) {
        warn!(%err, "failed to save config");
    }

    result
}

fn load(store: &Option<SolveStore>, scope: Scope) -> stackr::Result<SolveHistory> {
    match store {
        Some(store) => store.load_history(scope),
        None => Ok(SolveHistory::new()),
    }
}

fn start_tui<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app: &mut App<SystemClock>,
    tick: Duration,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(tick));

    while !app.should_quit() {
        let size = terminal.size()?;
        app.set_screen_width(size.width);
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            StackrEvent::Tick => app.on_tick(),
            StackrEvent::Resize => {}
            StackrEvent::Key(key) => app.on_key(key),
            StackrEvent::Mouse(mouse) => app.on_mouse(mouse),
        }

        if app.take_bell() {
            execute!(terminal.backend_mut(), Print("\x07"))?;
        }
    }

    Ok(())
}
