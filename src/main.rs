mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;

use space_invaders::input::{InputSource, InputState, Key, MouseButton};
use space_invaders::timer::SystemClock;
use space_invaders::{Game, GameConfig, Result};

use display::{GlyphSheet, TerminalRenderer};

/// A key with no fresh press/repeat for this long counts as released.
/// Only used on terminals that never report key releases.  Must outlast the
/// OS initial repeat delay (commonly 250-600ms), otherwise the first repeat of
/// a held key reads as a new keystroke and types it a second time.
const HOLD_WINDOW: Duration = Duration::from_millis(650);

#[derive(Parser)]
#[command(name = "space_invaders")]
#[command(about = "Space Invaders in the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML file overriding the default game constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level to start on (number of aliens in the first wave)
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Where to write the log; the terminal itself is taken by the game
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Feeds crossterm events from the reader thread into the game's input state.
///
/// A fresh press produces key-down followed by key-typed; a release produces
/// key-up.  Terminals without release events get a synthetic key-up once a
/// key has been quiet for `HOLD_WINDOW`.
struct TerminalInput {
    rx: mpsc::Receiver<Event>,
    held: HashMap<Key, Instant>,
    reports_release: bool,
}

impl TerminalInput {
    fn new(rx: mpsc::Receiver<Event>, reports_release: bool) -> Self {
        Self {
            rx,
            held: HashMap::new(),
            reports_release,
        }
    }

    fn on_key(&mut self, event: KeyEvent, input: &mut InputState) {
        let KeyEvent { code, kind, modifiers, .. } = event;
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            input.request_quit();
            return;
        }
        let key = intent_key(code);
        match kind {
            KeyEventKind::Press => {
                let fresh = self.held.insert(key, Instant::now()).is_none();
                input.key_down(key);
                if fresh {
                    if let Some(typed) = typed_key(code) {
                        input.key_typed(typed);
                    }
                }
            }
            KeyEventKind::Repeat => {
                self.held.insert(key, Instant::now());
                input.key_down(key);
            }
            KeyEventKind::Release => {
                self.reports_release = true;
                self.held.remove(&key);
                input.key_up(key);
            }
        }
    }

    fn on_mouse(&mut self, event: MouseEvent, input: &mut InputState) {
        match event.kind {
            MouseEventKind::Down(button) => input.mouse_down(mouse_button(button)),
            MouseEventKind::Up(button) => input.mouse_up(mouse_button(button)),
            _ => {}
        }
    }

    fn expire_stale_keys(&mut self, input: &mut InputState, now: Instant) {
        let stale: Vec<Key> = self
            .held
            .iter()
            .filter(|(_, &seen)| now.duration_since(seen) > HOLD_WINDOW)
            .map(|(&key, _)| key)
            .collect();
        for key in stale {
            self.held.remove(&key);
            input.key_up(key);
        }
    }
}

impl InputSource for TerminalInput {
    fn pump(&mut self, input: &mut InputState) -> Result<()> {
        loop {
            match self.rx.try_recv() {
                Ok(Event::Key(key)) => self.on_key(key, input),
                Ok(Event::Mouse(mouse)) => self.on_mouse(mouse, input),
                Ok(_) => {}
                Err(mpsc::TryRecvError::Empty) => break,
                // Reader thread gone: the terminal is no longer readable.
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::warn!("input stream closed");
                    input.request_quit();
                    break;
                }
            }
        }
        if !self.reports_release {
            self.expire_stale_keys(input, Instant::now());
        }
        Ok(())
    }
}

/// Key as far as held intents are concerned.  Arrows and A/D/W/S both steer.
fn intent_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Key::Left,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Key::Right,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Key::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Key::Down,
        KeyCode::Char(' ') => Key::Fire,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

/// Key as far as "typed" is concerned: characters, space, enter and escape.
/// Arrows and other non-character keys never type anything.
fn typed_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(' ') => Some(Key::Fire),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Char('\n')),
        KeyCode::Esc => Some(Key::Escape),
        _ => None,
    }
}

fn mouse_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| std::env::temp_dir().join("space_invaders.log"));
    let file = std::fs::File::create(&path)?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.clone())?;

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Ask for key-release events.  Terminals that ignore the request fall back
    // to the hold-window heuristic in `TerminalInput`.
    let reports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
    let keyboard_enhanced = reports_release
        && out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();

    // Blocking reads happen on their own thread so the loop never waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, rx, config, cli.level, keyboard_enhanced);
    if let Err(err) = &result {
        log::error!("game aborted: {err}");
    }

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: mpsc::Receiver<Event>,
    config: GameConfig,
    level: u32,
    reports_release: bool,
) -> Result<()> {
    let (width, height) = (config.window.width, config.window.height);
    let mut sheet = GlyphSheet::new();
    let mut game = Game::new(config, &mut sheet, SystemClock::new(), thread_rng(), level)?;

    let mut renderer = TerminalRenderer::new(out, sheet, width, height);
    let mut input = TerminalInput::new(rx, reports_release);
    game.run(&mut input, &mut renderer)
}
