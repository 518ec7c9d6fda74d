mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use dalgona::{
    autoplay::{self, AutoplayPlan},
    config::{Config, ConfigStore, FileConfigStore},
    flow::{FlowStage, SessionFlow},
    runtime::{Clock, CrosstermEventSource, KioskEvent, KioskEventSource, Runner, WallClock},
    scene::Scene,
    variant::{PointId, Variant},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 50;

/// dalgona candy-carving kiosk: hold the needle on every point before the clock runs out
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// config file to use instead of the per-user one
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// seconds the needle must rest on a point
    #[clap(long)]
    hold_secs: Option<f64>,

    /// seconds before the challenge fails
    #[clap(short = 't', long = "time-limit")]
    time_limit: Option<f64>,

    /// variant picked by the headless run (0-3)
    #[clap(short = 'v', long, default_value_t = 0)]
    variant: i64,

    /// play one scripted session without a terminal UI and print what happened
    #[clap(long)]
    headless: bool,

    /// in headless mode, never touch a point so the challenge times out
    #[clap(long, requires = "headless")]
    fail: bool,

    /// write log output to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// store the effective config back to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    fn load_config(&self) -> Result<Config, Box<dyn Error>> {
        let store = self.store();
        // an explicitly named file must exist and parse
        let config = if self.config.is_some() {
            store.try_load()?
        } else {
            store.load()
        };
        Ok(self.apply_overrides(config).sanitized())
    }

    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(hold) = self.hold_secs {
            config.hold_secs = hold;
        }
        if let Some(limit) = self.time_limit {
            config.time_limit_secs = limit;
        }
        config
    }

    fn log_filter(&self) -> &'static str {
        if self.log_file.is_some() {
            "info"
        } else if self.headless {
            "warn"
        } else {
            // stderr belongs to the alternate screen
            "off"
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_filter()),
    );
    if let Some(path) = &cli.log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

pub struct App {
    pub flow: SessionFlow<Scene>,
    pub config: Config,
    /// Index into the active point set the needle is pressed on
    pub needle: Option<usize>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let scene = Scene::new(config.video_secs);
        Self {
            flow: SessionFlow::new(&config, scene),
            config,
            needle: None,
        }
    }

    fn targets(&self) -> &[PointId] {
        self.flow.challenge().tracker().targets()
    }

    pub fn needle_point(&self) -> Option<PointId> {
        self.needle.and_then(|i| self.targets().get(i).copied())
    }

    fn move_needle(&mut self, step: isize) {
        if self.flow.stage() != FlowStage::Challenge || self.targets().is_empty() {
            return;
        }
        let last = self.targets().len() - 1;
        let next = match self.needle {
            None => 0,
            Some(i) => i.saturating_add_signed(step).min(last),
        };
        if self.needle == Some(next) {
            return;
        }
        self.lift_needle();
        if let Some(&point) = self.targets().get(next) {
            self.needle = Some(next);
            self.flow.on_probe_enter(point);
        }
    }

    fn lift_needle(&mut self) {
        if let Some(point) = self.needle_point() {
            self.flow.on_probe_exit(point);
        }
        self.needle = None;
    }

    pub fn on_key(&mut self, key: KeyEvent) -> KeyAction {
        match key.code {
            KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return KeyAction::Quit
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.flow.advance_stage();
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as i64 - '1' as i64;
                self.flow.select_index(index);
            }
            KeyCode::Left => self.move_needle(-1),
            KeyCode::Right => self.move_needle(1),
            KeyCode::Up => self.lift_needle(),
            KeyCode::Char('r') => {
                self.needle = None;
                self.flow.full_reset();
            }
            _ => {}
        }
        KeyAction::Continue
    }

    /// Advances the flow and the scene by one frame. `dt` comes from the
    /// runner's clock, which has already applied `config.time_scale`.
    pub fn on_frame(&mut self, dt: f64) {
        self.flow.frame(dt);
        if self.flow.stage() != FlowStage::Challenge {
            self.needle = None;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = cli.load_config()?;
    if cli.save_config {
        let store = cli.store();
        store.save(&config)?;
        log::info!("config saved to {}", store.path().display());
    }

    if cli.headless {
        let plan = AutoplayPlan {
            variant: Variant::new(cli.variant),
            fail: cli.fail,
            ..AutoplayPlan::default()
        };
        let transcript = autoplay::run(&config, &plan);
        for line in &transcript.lines {
            println!("{line}");
        }
        match transcript.outcome {
            Some(outcome) => println!("outcome: {outcome}"),
            None => println!("outcome: none"),
        }
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

    let mut app = App::new(config);
    let mut runner = Runner::new(
        CrosstermEventSource,
        WallClock::new(app.config.time_scale),
        Duration::from_millis(TICK_RATE_MS),
    );
    let result = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: KioskEventSource, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, C>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let frame = runner.step()?;
        if let Some(KioskEvent::Key(key)) = frame.event {
            if app.on_key(key) == KeyAction::Quit {
                break;
            }
        }

        app.on_frame(frame.dt);
    }

    Ok(())
}
