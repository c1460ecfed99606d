/// Puzzle capabilities and the slot that hosts the active one.
///
/// Every puzzle sits behind the `Puzzle` trait: it draws itself as text,
/// consumes discrete key input, and reports success by calling
/// `Completion::notify`. Nothing else crosses the boundary; the session
/// never looks inside a puzzle.
///
/// Adding a puzzle = one `PuzzleId` variant + one arm in `constructor`.

pub mod battery_table;
pub mod classic_print;
pub mod cross_math;
pub mod dissolve;
pub mod emoji;
pub mod expr;
pub mod slot;

use rand::rngs::StdRng;
use serde::Deserialize;
use tracing::debug;

pub use slot::PuzzleSlot;

/// Puzzle identifiers, named as they appear in `[[puzzles]]` config.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
pub enum PuzzleId {
    #[serde(rename = "crossMath")]
    CrossMath,
    #[serde(rename = "emoji")]
    Emoji,
    #[serde(rename = "classicPrint")]
    ClassicPrint,
    #[serde(rename = "batteryTable")]
    BatteryTable,
    #[serde(rename = "disolvePuzzle")]
    Dissolve,
}

impl PuzzleId {
    pub fn name(self) -> &'static str {
        match self {
            PuzzleId::CrossMath    => "crossMath",
            PuzzleId::Emoji        => "emoji",
            PuzzleId::ClassicPrint => "classicPrint",
            PuzzleId::BatteryTable => "batteryTable",
            PuzzleId::Dissolve     => "disolvePuzzle",
        }
    }
}

/// Key input routed to the open puzzle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PuzzleInput {
    Char(char),
    Backspace,
    Enter,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

/// Completion callback handed to the puzzle on every input.
/// Only the first `notify` of an activation counts.
#[derive(Debug, Default)]
pub struct Completion {
    notified: bool,
}

impl Completion {
    pub fn new() -> Self {
        Completion { notified: false }
    }

    pub fn notify(&mut self) {
        if self.notified {
            debug!("duplicate puzzle completion ignored");
            return;
        }
        self.notified = true;
    }

    pub fn is_notified(&self) -> bool {
        self.notified
    }
}

/// Text rendition of a puzzle for the modal.
#[derive(Clone, Debug, Default)]
pub struct PuzzleView {
    pub lines: Vec<String>,
    /// Local feedback ("Wrong! Try again.", "Row 2 incomplete!", ...).
    pub feedback: Option<String>,
    /// One-line control help.
    pub controls: &'static str,
}

pub trait Puzzle {
    fn title(&self) -> &str;

    /// Process one key. Call `done.notify()` when the win condition is met.
    fn handle_input(&mut self, input: PuzzleInput, done: &mut Completion);

    fn view(&self) -> PuzzleView;
}

type Constructor = fn(&mut StdRng) -> Box<dyn Puzzle>;

/// Id → constructor table. Each call builds a fresh activation.
fn constructor(id: PuzzleId) -> Constructor {
    match id {
        PuzzleId::CrossMath    => cross_math::build,
        PuzzleId::Emoji        => emoji::build,
        PuzzleId::ClassicPrint => classic_print::build,
        PuzzleId::BatteryTable => battery_table::build,
        PuzzleId::Dissolve     => dissolve::build,
    }
}

pub fn construct(id: PuzzleId, rng: &mut StdRng) -> Box<dyn Puzzle> {
    constructor(id)(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn every_id_constructs() {
        let mut rng = StdRng::seed_from_u64(7);
        for id in [
            PuzzleId::CrossMath,
            PuzzleId::Emoji,
            PuzzleId::ClassicPrint,
            PuzzleId::BatteryTable,
            PuzzleId::Dissolve,
        ] {
            let p = construct(id, &mut rng);
            assert!(!p.title().is_empty());
            assert!(!p.view().lines.is_empty(), "{} renders", id.name());
        }
    }

    #[test]
    fn completion_counts_once() {
        let mut c = Completion::new();
        assert!(!c.is_notified());
        c.notify();
        c.notify();
        assert!(c.is_notified());
    }

    #[test]
    fn ids_deserialize_from_config_names() {
        #[derive(Deserialize)]
        struct Wrap { id: PuzzleId }
        let w: Wrap = toml::from_str("id = \"disolvePuzzle\"").unwrap();
        assert_eq!(w.id, PuzzleId::Dissolve);
        let w: Wrap = toml::from_str("id = \"crossMath\"").unwrap();
        assert_eq!(w.id, PuzzleId::CrossMath);
        assert!(toml::from_str::<Wrap>("id = \"chess\"").is_err());
    }
}
