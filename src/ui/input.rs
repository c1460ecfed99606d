/// Keyboard input: drains terminal events and maps keys to commands.
///
/// Press and Repeat events are kept in arrival order so every key reaches
/// the session as its own event. Movement keys are additionally tracked as
/// "held" so that letting go of all of them can be reported once.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::MoveDir;
use crate::puzzle::PuzzleInput;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
/// Longer than the usual auto-repeat delay.
const HOLD_TIMEOUT: Duration = Duration::from_millis(550);

/// What a single key press asks for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Quit,
    TogglePause,
    Move(MoveDir),
    Puzzle(PuzzleInput),
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each held movement key.
    held: HashMap<KeyCode, Instant>,

    /// A movement key was held at the last release check.
    moving: bool,

    /// Press/Repeat events from the most recent drain, in order.
    presses: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held: HashMap::with_capacity(8),
            moving: false,
            presses: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before dispatching.
    pub fn drain_events(&mut self) {
        self.presses.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    /// Press/Repeat events of this frame.
    pub fn presses(&self) -> &[KeyEvent] {
        &self.presses
    }

    /// True once when the last held movement key has been let go.
    pub fn take_release(&mut self) -> bool {
        if self.moving && self.held.is_empty() {
            self.moving = false;
            return true;
        }
        false
    }

    // ── Internal ──

    fn record(&mut self, key: KeyEvent, now: Instant) {
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.held.remove(&code);
            }
            KeyEventKind::Release => {
                // Ignore release when enhancement not confirmed;
                // rely on timeout-based expiry instead
            }
            _ => {
                if movement_for_key(code).is_some() {
                    self.held.insert(code, now);
                    self.moving = true;
                }
                self.presses.push(key);
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.held.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Arrow keys and WASD (either case).
pub fn movement_for_key(code: KeyCode) -> Option<MoveDir> {
    match normalize(code) {
        KeyCode::Up    | KeyCode::Char('w') => Some(MoveDir::Up),
        KeyCode::Down  | KeyCode::Char('s') => Some(MoveDir::Down),
        KeyCode::Left  | KeyCode::Char('a') => Some(MoveDir::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(MoveDir::Right),
        _ => None,
    }
}

pub fn puzzle_input_for_key(code: KeyCode) -> Option<PuzzleInput> {
    match code {
        KeyCode::Char(c)   => Some(PuzzleInput::Char(c)),
        KeyCode::Backspace => Some(PuzzleInput::Backspace),
        KeyCode::Enter     => Some(PuzzleInput::Enter),
        KeyCode::Tab       => Some(PuzzleInput::Tab),
        KeyCode::Up        => Some(PuzzleInput::Up),
        KeyCode::Down      => Some(PuzzleInput::Down),
        KeyCode::Left      => Some(PuzzleInput::Left),
        KeyCode::Right     => Some(PuzzleInput::Right),
        _ => None,
    }
}

/// Map one key press to a command. While the puzzle modal is open, keys
/// other than the meta keys belong to the puzzle.
pub fn command_for_key(key: &KeyEvent, modal_open: bool) -> Option<Command> {
    if is_ctrl_c(key) { return Some(Command::Quit); }

    match normalize(key.code) {
        KeyCode::Esc       => return Some(Command::Quit),
        KeyCode::F(1)      => return Some(Command::TogglePause),
        KeyCode::Char('p') => return Some(Command::TogglePause),
        _ => {}
    }

    if modal_open {
        return puzzle_input_for_key(key.code).map(Command::Puzzle);
    }
    if normalize(key.code) == KeyCode::Char('q') {
        return Some(Command::Quit);
    }
    movement_for_key(key.code).map(Command::Move)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn wasd_is_case_insensitive() {
        for (lower, upper, dir) in [
            ('w', 'W', MoveDir::Up),
            ('a', 'A', MoveDir::Left),
            ('s', 'S', MoveDir::Down),
            ('d', 'D', MoveDir::Right),
        ] {
            assert_eq!(movement_for_key(KeyCode::Char(lower)), Some(dir));
            assert_eq!(movement_for_key(KeyCode::Char(upper)), Some(dir));
        }
        assert_eq!(movement_for_key(KeyCode::Left), Some(MoveDir::Left));
        assert_eq!(movement_for_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn commands_outside_modal() {
        assert_eq!(command_for_key(&press(KeyCode::Char('D')), false), Some(Command::Move(MoveDir::Right)));
        assert_eq!(command_for_key(&press(KeyCode::Char('q')), false), Some(Command::Quit));
        assert_eq!(command_for_key(&press(KeyCode::Esc), false), Some(Command::Quit));
        assert_eq!(command_for_key(&press(KeyCode::F(1)), false), Some(Command::TogglePause));
        assert_eq!(command_for_key(&press(KeyCode::Char('P')), false), Some(Command::TogglePause));
        assert_eq!(command_for_key(&press(KeyCode::Enter), false), None);
    }

    #[test]
    fn modal_routes_keys_to_puzzle() {
        assert_eq!(command_for_key(&press(KeyCode::Char('7')), true), Some(Command::Puzzle(PuzzleInput::Char('7'))));
        assert_eq!(command_for_key(&press(KeyCode::Char('w')), true), Some(Command::Puzzle(PuzzleInput::Char('w'))));
        assert_eq!(command_for_key(&press(KeyCode::Char('q')), true), Some(Command::Puzzle(PuzzleInput::Char('q'))));
        assert_eq!(command_for_key(&press(KeyCode::Left), true), Some(Command::Puzzle(PuzzleInput::Left)));
        assert_eq!(command_for_key(&press(KeyCode::Esc), true), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for_key(&ctrl_c, true), Some(Command::Quit));
    }

    #[test]
    fn repeats_are_kept_in_order() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.record(press(KeyCode::Right), now);
        input.record(press(KeyCode::Right), now);
        input.record(press(KeyCode::Down), now);
        let codes: Vec<KeyCode> = input.presses().iter().map(|k| k.code).collect();
        assert_eq!(codes, vec![KeyCode::Right, KeyCode::Right, KeyCode::Down]);
    }

    #[test]
    fn release_event_reported_once() {
        let mut input = InputState::new();
        input.honor_release = true;
        let now = Instant::now();
        input.record(press(KeyCode::Char('W')), now);
        assert!(!input.take_release());
        input.record(release(KeyCode::Char('w')), now);
        assert!(input.take_release());
        assert!(!input.take_release());
    }

    #[test]
    fn release_waits_for_every_movement_key() {
        let mut input = InputState::new();
        input.honor_release = true;
        let now = Instant::now();
        input.record(press(KeyCode::Left), now);
        input.record(press(KeyCode::Up), now);
        input.record(release(KeyCode::Left), now);
        assert!(!input.take_release());
        input.record(release(KeyCode::Up), now);
        assert!(input.take_release());
    }

    #[test]
    fn hold_timeout_releases_without_events() {
        let mut input = InputState::new();
        let start = Instant::now();
        input.record(press(KeyCode::Right), start);
        input.record(release(KeyCode::Right), start);
        input.expire(start + Duration::from_millis(100));
        assert!(!input.take_release());
        input.expire(start + HOLD_TIMEOUT);
        assert!(input.take_release());
    }

    #[test]
    fn non_movement_keys_do_not_hold() {
        let mut input = InputState::new();
        input.record(press(KeyCode::Char('7')), Instant::now());
        assert!(!input.take_release());
        assert_eq!(input.presses().len(), 1);
    }
}
