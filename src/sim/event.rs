/// Events emitted by session transitions.
/// The presentation layer consumes these for sound and logging; they never
/// feed back into the session.

use crate::domain::entity::Direction;
use crate::puzzle::PuzzleId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    PlayerMoved { x: usize, y: usize },
    /// Move rejected by the grid edge; facing still changed.
    Bumped { direction: Direction },
    PuzzleOpened { id: PuzzleId, seconds: u32 },
    PuzzleSolved { id: PuzzleId },
    TimeUp { id: PuzzleId },
    /// Loading finished and the next puzzle in the sequence is armed.
    Advanced { index: usize },
    /// Failure delay finished; the same puzzle is armed again.
    RetryReady,
    GameWon { elapsed: u64 },
    Paused,
    Resumed,
}
