/// The fixed, ordered list of puzzles for a session and their time budgets.

use thiserror::Error;

use crate::puzzle::PuzzleId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PuzzleEntry {
    pub id: PuzzleId,
    /// Countdown budget in ticks (seconds with the default tick).
    pub seconds: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("puzzle sequence is empty")]
    Empty,
    #[error("puzzle `{0}` has a zero time budget")]
    ZeroBudget(&'static str),
}

/// Immutable once built; progress lives in the session as an index.
#[derive(Clone, Debug)]
pub struct PuzzleSequence {
    entries: Vec<PuzzleEntry>,
}

impl PuzzleSequence {
    pub fn new(entries: Vec<PuzzleEntry>) -> Result<Self, SequenceError> {
        if entries.is_empty() {
            return Err(SequenceError::Empty);
        }
        if let Some(e) = entries.iter().find(|e| e.seconds == 0) {
            return Err(SequenceError::ZeroBudget(e.id.name()));
        }
        Ok(PuzzleSequence { entries })
    }

    pub fn get(&self, index: usize) -> Option<PuzzleEntry> {
        self.entries.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[PuzzleEntry] {
        &self.entries
    }
}

impl Default for PuzzleSequence {
    fn default() -> Self {
        let entries = [
            (PuzzleId::CrossMath, 15),
            (PuzzleId::Emoji, 60),
            (PuzzleId::ClassicPrint, 30),
            (PuzzleId::BatteryTable, 45),
            (PuzzleId::Dissolve, 20),
        ]
        .into_iter()
        .map(|(id, seconds)| PuzzleEntry { id, seconds })
        .collect();
        PuzzleSequence { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_and_budgets() {
        let seq = PuzzleSequence::default();
        let ids: Vec<&str> = seq.entries().iter().map(|e| e.id.name()).collect();
        assert_eq!(ids, ["crossMath", "emoji", "classicPrint", "batteryTable", "disolvePuzzle"]);
        assert_eq!(seq.get(0).map(|e| e.seconds), Some(15));
        assert_eq!(seq.get(1).map(|e| e.seconds), Some(60));
        assert_eq!(seq.get(5), None);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(PuzzleSequence::new(vec![]).unwrap_err(), SequenceError::Empty);
    }

    #[test]
    fn rejects_zero_budget() {
        let err = PuzzleSequence::new(vec![
            PuzzleEntry { id: PuzzleId::Emoji, seconds: 10 },
            PuzzleEntry { id: PuzzleId::Dissolve, seconds: 0 },
        ])
        .unwrap_err();
        assert_eq!(err, SequenceError::ZeroBudget("disolvePuzzle"));
    }
}
