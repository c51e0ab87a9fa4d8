mod ui;

use boxclick::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    placement::Position,
    round::{ClickOutcome, Difficulty, RoundMachine},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner, Ticker},
    surface::{CellGrid, PlayArea},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};

use crate::ui::{layout_buttons, Button, ScreenLayout};

const TICK_RATE_MS: u64 = 10;

/// click the right box as fast as you can
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reaction time test: start a round, wait for the boxes to appear, and click the green one before anything else. Decoys end the round without a time."
)]
pub struct Cli {
    /// difficulty level; level n shows n+1 boxes
    #[clap(short = 'd', long, value_parser = clap::value_parser!(u8).range(1..=4))]
    difficulty: Option<u8>,

    /// seed for box placement and reveal delays (random when omitted)
    #[clap(long)]
    seed: Option<u64>,

    /// shortest wait before the boxes appear, in milliseconds
    #[clap(long)]
    min_delay_ms: Option<u64>,

    /// longest wait before the boxes appear, in milliseconds (exclusive)
    #[clap(long)]
    max_delay_ms: Option<u64>,

    /// config file to read settings from
    #[clap(long)]
    config: Option<PathBuf>,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,

    /// file to write logs to (filter with BOXCLICK_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply_to(&self, config: &mut Config) {
        if let Some(level) = self.difficulty {
            config.difficulty = level;
        }
        if let Some(ms) = self.min_delay_ms {
            config.timing.min_delay_ms = ms;
        }
        if let Some(ms) = self.max_delay_ms {
            config.timing.max_delay_ms = ms;
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Something the user can trigger with a button or a shortcut
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Start,
    TryAgain,
    ResetStats,
    SetDifficulty(Difficulty),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopControl {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub machine: RoundMachine,
    pub cells: CellGrid,
    /// Regions from the last drawn frame, `None` until the first draw
    pub layout: Option<ScreenLayout>,
}

impl App {
    pub fn new(config: &Config, rng: StdRng) -> Self {
        Self {
            machine: RoundMachine::new(config, rng),
            cells: config.cells,
            layout: None,
        }
    }

    pub fn surface(&self) -> Option<PlayArea> {
        self.layout.map(|l| self.cells.play_area(l.play))
    }

    pub fn selector_buttons(&self) -> Vec<Button> {
        let current = self.machine.difficulty();
        Difficulty::all()
            .map(|d| Button {
                label: format!(" {} ({} boxes) ", d.level(), d.box_count()),
                action: Action::SetDifficulty(d),
                active: d == current,
            })
            .collect()
    }

    pub fn action_buttons(&self) -> Vec<Button> {
        let view = self.machine.view();
        let mut buttons = Vec::new();
        if view.show_start {
            buttons.push(Button::new(" Start ", Action::Start));
        }
        if view.show_try_again {
            buttons.push(Button::new(" Try again ", Action::TryAgain));
        }
        buttons.push(Button::new(" Reset stats ", Action::ResetStats));
        buttons
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::Start => self.machine.start(now),
            Action::TryAgain => self.machine.try_again(now),
            Action::ResetStats => self.machine.reset_stats(),
            Action::SetDifficulty(d) => self.machine.set_difficulty(d),
        }
    }

    /// Returns true when the screen needs redrawing
    pub fn on_tick(&mut self, now: Instant) -> bool {
        let surface = self.surface();
        self.machine.tick(now, surface).changed()
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> LoopControl {
        if key.kind != KeyEventKind::Press {
            return LoopControl::Continue;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return LoopControl::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return LoopControl::Quit
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.machine.game_started() {
                    self.apply(Action::TryAgain, now);
                } else {
                    self.apply(Action::Start, now);
                }
            }
            KeyCode::Char('r') => self.apply(Action::ResetStats, now),
            KeyCode::Char(c) => {
                if let Some(d) = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(Difficulty::new)
                {
                    self.apply(Action::SetDifficulty(d), now);
                }
            }
            _ => {}
        }
        LoopControl::Continue
    }

    /// Returns true when the click changed anything
    pub fn on_mouse(&mut self, mouse: MouseEvent, now: Instant) -> bool {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return false;
        }
        let Some(layout) = self.layout else {
            return false;
        };

        let positions: Vec<Position> = self.machine.boxes().iter().map(|b| b.position()).collect();
        let box_size = self.machine.geometry().box_size;
        if let Some(idx) =
            self.cells
                .hit_test(layout.play, mouse.column, mouse.row, &positions, box_size)
        {
            let id = self.machine.boxes()[idx].id.clone();
            return self.machine.click(&id, now) != ClickOutcome::Ignored;
        }

        let hit = layout_buttons(layout.selector, &self.selector_buttons())
            .into_iter()
            .chain(layout_buttons(layout.buttons, &self.action_buttons()))
            .find(|(rect, _)| rect.contains((mouse.column, mouse.row).into()));

        match hit {
            Some((_, action)) => {
                self.apply(action, now);
                true
            }
            None => false,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(err) = logging::init(&path) {
            eprintln!("boxclick: logging disabled ({}): {err}", path.display());
        }
    }

    let store = cli.config_store();
    let mut config = store.load();
    cli.apply_to(&mut config);
    if let Err(reason) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, reason).exit();
    }
    if cli.save_config {
        store.save(&config)?;
        log::info!("saved config to {}", store.path().display());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, cli.rng());
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    log::info!("boxclick started at difficulty {}", config.difficulty);
    let result = start_tui(&mut terminal, &mut app, &runner);
    app.machine.shutdown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: GameEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let mut redraw = match runner.step() {
            GameEvent::Tick => false,
            GameEvent::Resize => true,
            GameEvent::Key(key) => match app.on_key(key, Instant::now()) {
                LoopControl::Quit => break,
                LoopControl::Continue => true,
            },
            GameEvent::Mouse(mouse) => app.on_mouse(mouse, Instant::now()),
        };
        // A steady stream of input never times out into a Tick, so timers
        // are polled after every step.
        redraw |= app.on_tick(Instant::now());

        if redraw {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}
