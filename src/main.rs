/// Entry point and game loop.

mod config;
mod domain;
mod puzzle;
mod sim;
mod ui;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::GameConfig;
use domain::entity::MoveDir;
use puzzle::PuzzleInput;
use sim::step;
use sim::world::{Mode, Session};
use ui::gamepad::GamepadState;
use ui::input::{command_for_key, Command, InputState};
use ui::renderer::{format_clock, Renderer};
use ui::sound::{Sfx, SoundEngine};

const LOG_FILE: &str = "stemlocked.log";

fn main() {
    init_tracing();

    let config = GameConfig::load();
    let mut session = Session::new(&config);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut kb = InputState::new();
    let enhanced = enable_key_release();
    kb.honor_release = enhanced;

    let sound = SoundEngine::new();
    if sound.is_none() {
        warn!("no audio output; playing silently");
    }

    let result = game_loop(&mut session, &mut renderer, &mut kb, sound.as_ref(), &config);

    if enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    let snap = session.snapshot();
    println!();
    println!("Thanks for playing STEMLocked!");
    println!("Locks opened: {}/{}", snap.sequence_index, snap.sequence_len);
    println!("Total Time: {}", format_clock(snap.elapsed));
}

// ── Logging ──

/// Log to a file; the terminal is in raw alternate-screen mode while playing.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some((path, file)) = open_log_file() else {
        // No writable log file: logging stays off.
        return;
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();
    info!(path = %path.display(), "logging initialized");
}

fn open_log_file() -> Option<(PathBuf, File)> {
    let mut candidates = Vec::new();
    if let Some(home) = config::data_home() {
        candidates.push(home.join(LOG_FILE));
    }
    candidates.push(PathBuf::from(LOG_FILE));

    candidates.into_iter().find_map(|path| {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
                return None;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
        Some((path, file))
    })
}

/// Ask the terminal for key release events. Returns true if it accepted.
fn enable_key_release() -> bool {
    if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
        info!("keyboard enhancement unavailable; releases detected by timeout");
        return false;
    }
    let mut out = io::stdout();
    let pushed = execute!(
        out,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    );
    let _ = out.flush();
    pushed.is_ok()
}

// ── Loop ──

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    kb: &mut InputState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> io::Result<()> {
    let mut gp = GamepadState::new();
    if gp.connected {
        info!("gamepad connected");
    }
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        // Keys are dispatched one at a time; each may change the mode
        // the next one sees.
        for key in kb.presses() {
            let modal_open = session.mode() == Mode::PuzzleOpen;
            let Some(cmd) = command_for_key(key, modal_open) else { continue };
            if dispatch(session, cmd) {
                return Ok(());
            }
            process_events(session, sound);
        }

        if gp.quit_pressed() {
            return Ok(());
        }
        if gp.pause_pressed() {
            dispatch(session, Command::TogglePause);
        }
        for dir in gp.move_presses() {
            let cmd = if session.mode() == Mode::PuzzleOpen {
                Command::Puzzle(arrow_input(dir))
            } else {
                Command::Move(dir)
            };
            dispatch(session, cmd);
            process_events(session, sound);
        }
        if gp.confirm_pressed() && session.mode() == Mode::PuzzleOpen {
            dispatch(session, Command::Puzzle(PuzzleInput::Enter));
        }

        let kb_released = kb.take_release();
        let gp_released = gp.take_release();
        if kb_released || gp_released {
            step::release_move(session);
        }

        let now = Instant::now();
        step::advance(session, now.duration_since(last_tick));
        last_tick = now;
        process_events(session, sound);

        renderer.render(session)?;
        std::thread::sleep(config.timing.frame());
    }
}

/// Apply one command to the session. Returns true on quit.
fn dispatch(session: &mut Session, cmd: Command) -> bool {
    match cmd {
        Command::Quit        => return true,
        Command::TogglePause => {
            let paused = !session.is_paused();
            step::set_paused(session, paused);
        }
        Command::Move(dir)   => { step::handle_move(session, dir); }
        Command::Puzzle(inp) => { step::handle_puzzle_input(session, inp); }
    }
    false
}

fn arrow_input(dir: MoveDir) -> PuzzleInput {
    match dir {
        MoveDir::Up    => PuzzleInput::Up,
        MoveDir::Down  => PuzzleInput::Down,
        MoveDir::Left  => PuzzleInput::Left,
        MoveDir::Right => PuzzleInput::Right,
    }
}

fn process_events(session: &mut Session, sound: Option<&SoundEngine>) {
    for event in session.drain_events() {
        debug!(?event, "session event");
        if let (Some(sfx), Some(engine)) = (Sfx::for_event(&event), sound) {
            engine.play(sfx);
        }
    }
}
