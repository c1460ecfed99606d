/// Puzzle slot: hosts the single active puzzle activation.
///
/// The slot knows nothing about sequencing. It builds a fresh puzzle for
/// every `activate`, forwards keys, and reports the puzzle's completion
/// upward exactly once per activation.

use rand::rngs::StdRng;
use tracing::debug;

use super::{construct, Completion, Puzzle, PuzzleId, PuzzleInput, PuzzleView};

struct Activation {
    id: PuzzleId,
    puzzle: Box<dyn Puzzle>,
    completion: Completion,
    reported: bool,
}

#[derive(Default)]
pub struct PuzzleSlot {
    active: Option<Activation>,
}

impl PuzzleSlot {
    pub fn new() -> Self {
        PuzzleSlot { active: None }
    }

    /// Discard any current activation and build a new one for `id`.
    pub fn activate(&mut self, id: PuzzleId, rng: &mut StdRng) {
        debug!(puzzle = id.name(), "puzzle activation created");
        self.active = Some(Activation {
            id,
            puzzle: construct(id, rng),
            completion: Completion::new(),
            reported: false,
        });
    }

    /// Destroy the current activation, if any.
    pub fn clear(&mut self) {
        if let Some(a) = self.active.take() {
            debug!(puzzle = a.id.name(), "puzzle activation discarded");
        }
    }

    pub fn active_id(&self) -> Option<PuzzleId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn title(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.puzzle.title())
    }

    /// Forward one key to the active puzzle. Returns true on the input that
    /// completed the activation; never again afterwards.
    pub fn forward(&mut self, input: PuzzleInput) -> bool {
        let Some(a) = self.active.as_mut() else { return false };
        if a.reported { return false; }

        a.puzzle.handle_input(input, &mut a.completion);
        if a.completion.is_notified() {
            a.reported = true;
            return true;
        }
        false
    }

    pub fn view(&self) -> Option<PuzzleView> {
        self.active.as_ref().map(|a| a.puzzle.view())
    }
}
