/// Session: the complete state of a running escape attempt.
///
/// ## Modes
///
/// Exactly one mode is active at a time:
///   - `Playing`: player walks the grid
///   - `PuzzleOpen`: a puzzle modal is up, its countdown running
///   - `Loading`: short delay after a solve, before the next puzzle
///   - `Failed`: short delay after time ran out, before the retry
///   - `Won`: terminal; nothing changes any more
///
/// Pause is orthogonal to the mode. The SessionState booleans exposed to the
/// presentation layer are all derived from `mode`, so contradictory
/// combinations (loading while the modal is visible, won while failed) cannot
/// be represented.
///
/// ## Timers
///
/// Every timer is driven by `step::advance(dt)`; nothing runs on its own.
/// Run flags are recomputed from `(mode, paused)` after each transition
/// in `sync_run_flags`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::domain::animation::{AnimationSelector, FrameRef};
use crate::domain::entity::{Direction, Player, Position};
use crate::domain::timer::{CountdownTimer, ElapsedTimer};
use crate::puzzle::{PuzzleId, PuzzleSlot, PuzzleView};
use super::event::SessionEvent;
use super::sequence::PuzzleSequence;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Playing,
    PuzzleOpen,
    Loading,
    Failed,
    Won,
}

/// Read-only view handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub position: Position,
    pub direction: Direction,
    pub paused: bool,
    pub puzzle_visible: bool,
    pub puzzle_solved: bool,
    pub is_loading: bool,
    pub show_fail_message: bool,
    pub game_won: bool,
    pub puzzle: Option<PuzzleId>,
    pub sequence_index: usize,
    pub sequence_len: usize,
    /// Countdown remaining; only while the modal is open.
    pub time_left: Option<u32>,
    pub elapsed: u64,
}

pub struct Session {
    // ── Board ──
    pub(super) grid_size: usize,
    pub(super) puzzle_tile: Position,
    pub(super) player: Player,

    // ── Flow ──
    pub(super) mode: Mode,
    pub(super) paused: bool,
    /// Set between a solve and the end of the Loading delay.
    pub(super) puzzle_solved: bool,
    pub(super) sequence: PuzzleSequence,
    /// Position in `sequence`; equals its length once the game is won.
    pub(super) index: usize,
    pub(super) slot: PuzzleSlot,

    // ── Timers ──
    pub(super) countdown: CountdownTimer,
    pub(super) elapsed: ElapsedTimer,
    /// Loading / Failed delay. Runs through pause.
    pub(super) transition: CountdownTimer,
    pub(super) transition_ticks: u32,
    pub(super) animation: AnimationSelector,

    pub(super) rng: StdRng,
    pub(super) events: Vec<SessionEvent>,
}

// ── Construction ──

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        let tick = config.timing.tick();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut session = Session {
            grid_size: config.board.grid_size,
            puzzle_tile: config.board.puzzle_tile,
            player: Player::new(Position::ORIGIN),
            mode: Mode::Playing,
            paused: false,
            puzzle_solved: false,
            sequence: config.sequence.clone(),
            index: 0,
            slot: PuzzleSlot::new(),
            countdown: CountdownTimer::new(tick),
            elapsed: ElapsedTimer::new(tick),
            transition: CountdownTimer::new(tick),
            transition_ticks: config.timing.transition_ticks,
            animation: AnimationSelector::new(
                config.animations.clone(),
                config.timing.animation_interval(),
            ),
            rng,
            events: Vec::new(),
        };
        session.sync_run_flags();
        session
    }
}

// ── Queries ──

impl Session {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn position(&self) -> Position {
        self.player.pos
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn puzzle_tile(&self) -> Position {
        self.puzzle_tile
    }

    pub fn sprite(&self) -> FrameRef<'_> {
        self.animation.frame()
    }

    /// Title of the open puzzle, if the modal is up.
    pub fn puzzle_title(&self) -> Option<&str> {
        if self.mode != Mode::PuzzleOpen { return None; }
        self.slot.title()
    }

    pub fn puzzle_view(&self) -> Option<PuzzleView> {
        if self.mode != Mode::PuzzleOpen { return None; }
        self.slot.view()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let open = self.mode == Mode::PuzzleOpen;
        SessionSnapshot {
            mode: self.mode,
            position: self.player.pos,
            direction: self.player.direction,
            paused: self.paused,
            puzzle_visible: open,
            puzzle_solved: self.puzzle_solved,
            is_loading: self.mode == Mode::Loading,
            show_fail_message: self.mode == Mode::Failed,
            game_won: self.mode == Mode::Won,
            puzzle: if open { self.slot.active_id() } else { None },
            sequence_index: self.index,
            sequence_len: self.sequence.len(),
            time_left: if open { Some(self.countdown.remaining()) } else { None },
            elapsed: self.elapsed.elapsed(),
        }
    }

    /// Take the events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
impl Session {
    pub(crate) fn direction(&self) -> Direction {
        self.player.direction
    }
}

// ── Timer wiring ──

impl Session {
    /// Recompute every run flag from `(mode, paused)`.
    ///   - countdown: modal open and not paused
    ///   - elapsed:   not won and not paused
    ///   - animation: playing and not paused
    /// The transition delay is left alone: it runs through pause.
    pub(super) fn sync_run_flags(&mut self) {
        let live = !self.paused;
        self.countdown.set_running(live && self.mode == Mode::PuzzleOpen);
        self.elapsed.set_running(live && self.mode != Mode::Won);
        self.animation.set_playing(live && self.mode == Mode::Playing);
    }
}
