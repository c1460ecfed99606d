/// Session transitions: every mutation of a `Session` goes through here.
///
/// Flow:
///   Playing ──(reach puzzle tile)──▶ PuzzleOpen
///   PuzzleOpen ──(solved)──▶ Loading ──(delay)──▶ Playing (next) | Won
///   PuzzleOpen ──(time up)──▶ Failed ──(delay)──▶ Playing (same puzzle)
///
/// Events are processed one at a time to completion. Operations that
/// arrive in the wrong mode are ignored and logged at debug level.

use std::time::Duration;

use tracing::{debug, info};

use crate::domain::entity::{Direction, MoveDir};
use crate::puzzle::PuzzleInput;
use super::event::SessionEvent;
use super::world::{Mode, Session};

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

/// Apply one movement key press. Returns true if the player moved.
///
/// Facing changes even when the grid edge blocks the move.
pub fn handle_move(session: &mut Session, dir: MoveDir) -> bool {
    if session.mode != Mode::Playing || session.paused {
        debug!(?dir, mode = ?session.mode, paused = session.paused, "move ignored");
        return false;
    }

    let facing = Direction::from(dir);
    session.player.direction = facing;
    session.animation.select(facing);

    match session.player.pos.step(dir, session.grid_size) {
        Some(pos) => {
            session.player.pos = pos;
            session.events.push(SessionEvent::PlayerMoved { x: pos.x, y: pos.y });
            check_puzzle_entry(session);
            true
        }
        None => {
            session.events.push(SessionEvent::Bumped { direction: facing });
            false
        }
    }
}

/// All movement keys released: face Idle again. Ignored while paused.
pub fn release_move(session: &mut Session) {
    if session.mode != Mode::Playing || session.paused {
        debug!(mode = ?session.mode, paused = session.paused, "release ignored");
        return;
    }
    session.player.direction = Direction::Idle;
    session.animation.select(Direction::Idle);
}

/// Open the current puzzle if the player stands on the puzzle tile.
pub fn check_puzzle_entry(session: &mut Session) {
    if session.mode != Mode::Playing || session.puzzle_solved { return; }
    if session.player.pos != session.puzzle_tile { return; }

    let Some(entry) = session.sequence.get(session.index) else { return };

    session.slot.activate(entry.id, &mut session.rng);
    session.countdown.start(entry.seconds);
    info!(puzzle = entry.id.name(), seconds = entry.seconds, index = session.index, "puzzle opened");
    session.events.push(SessionEvent::PuzzleOpened { id: entry.id, seconds: entry.seconds });
    set_mode(session, Mode::PuzzleOpen);
}

// ══════════════════════════════════════════════════════════════
// Puzzle outcome
// ══════════════════════════════════════════════════════════════

/// Route one key to the open puzzle. Returns true if it was delivered.
pub fn handle_puzzle_input(session: &mut Session, input: PuzzleInput) -> bool {
    if session.mode != Mode::PuzzleOpen || session.paused {
        debug!(?input, mode = ?session.mode, paused = session.paused, "puzzle input ignored");
        return false;
    }
    if session.slot.forward(input) {
        on_puzzle_complete(session);
    }
    true
}

pub fn on_puzzle_complete(session: &mut Session) {
    if session.mode != Mode::PuzzleOpen {
        debug!(mode = ?session.mode, "stale puzzle completion ignored");
        return;
    }
    let id = session.slot.active_id();
    close_puzzle(session);
    session.puzzle_solved = true;

    if let Some(id) = id {
        info!(puzzle = id.name(), "puzzle solved");
        session.events.push(SessionEvent::PuzzleSolved { id });
    }
    session.transition.start(session.transition_ticks);
    set_mode(session, Mode::Loading);
}

pub fn on_time_up(session: &mut Session) {
    if session.mode != Mode::PuzzleOpen {
        debug!(mode = ?session.mode, "stale time-up ignored");
        return;
    }
    let id = session.slot.active_id();
    close_puzzle(session);

    if let Some(id) = id {
        info!(puzzle = id.name(), "time ran out");
        session.events.push(SessionEvent::TimeUp { id });
    }
    session.transition.start(session.transition_ticks);
    set_mode(session, Mode::Failed);
}

/// Tear down the activation and its countdown.
fn close_puzzle(session: &mut Session) {
    session.countdown.stop();
    session.slot.clear();
}

/// End of the Loading / Failed delay.
fn finish_transition(session: &mut Session) {
    session.player.reset();
    session.animation.select(Direction::Idle);

    match session.mode {
        Mode::Loading => {
            session.puzzle_solved = false;
            session.index += 1;
            if session.index >= session.sequence.len() {
                let elapsed = session.elapsed.elapsed();
                info!(elapsed, "all puzzles solved");
                session.events.push(SessionEvent::GameWon { elapsed });
                set_mode(session, Mode::Won);
            } else {
                session.events.push(SessionEvent::Advanced { index: session.index });
                set_mode(session, Mode::Playing);
            }
        }
        Mode::Failed => {
            session.events.push(SessionEvent::RetryReady);
            set_mode(session, Mode::Playing);
        }
        _ => {}
    }
    // Entry is re-checked after every position change.
    check_puzzle_entry(session);
}

// ══════════════════════════════════════════════════════════════
// Pause / time
// ══════════════════════════════════════════════════════════════

/// Set the cross-cutting pause flag. Allowed in every mode, `Won` included,
/// and never changes the mode. Repeating the current value is a no-op.
pub fn set_paused(session: &mut Session, paused: bool) {
    if session.paused == paused { return; }
    session.paused = paused;
    info!(paused, mode = ?session.mode, "pause toggled");
    session.events.push(if paused { SessionEvent::Paused } else { SessionEvent::Resumed });
    session.sync_run_flags();
}

/// Feed wall-clock time into every timer.
pub fn advance(session: &mut Session, dt: Duration) {
    if session.mode == Mode::Won { return; }

    session.elapsed.advance(dt);
    session.animation.advance(dt);

    if matches!(session.mode, Mode::Loading | Mode::Failed) && session.transition.advance(dt) {
        finish_transition(session);
    }

    if session.countdown.advance(dt) {
        on_time_up(session);
    }
}

fn set_mode(session: &mut Session, mode: Mode) {
    if session.mode != mode {
        info!(from = ?session.mode, to = ?mode, "mode change");
        session.mode = mode;
    }
    session.sync_run_flags();
}
