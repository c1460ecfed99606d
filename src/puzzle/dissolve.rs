/// Dissolve: zap a block to flip it and its orthogonal neighbours.
/// The lock opens once every block has dissolved.
///
/// Boards are scrambled from the cleared state with distinct presses.
/// On a 3x3 board the press matrix is invertible, so a scramble is never
/// accidentally already solved.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;

use super::{Completion, Puzzle, PuzzleInput, PuzzleView};

const SIDE: usize = 3;
const CELLS: usize = SIDE * SIDE;

pub struct Dissolve {
    solid: [bool; CELLS],
    cursor: (usize, usize),
    moves: u32,
    feedback: Option<String>,
}

pub fn build(rng: &mut StdRng) -> Box<dyn Puzzle> {
    Box::new(Dissolve::generate(rng))
}

impl Dissolve {
    pub fn generate(rng: &mut StdRng) -> Self {
        let mut board = Dissolve {
            solid: [false; CELLS],
            cursor: (1, 1),
            moves: 0,
            feedback: None,
        };
        let presses = rng.gen_range(2..=4);
        for i in index::sample(rng, CELLS, presses) {
            board.zap(i % SIDE, i / SIDE);
        }
        board
    }

    fn zap(&mut self, x: usize, y: usize) {
        let mut flip = |cx: usize, cy: usize| {
            if cx < SIDE && cy < SIDE {
                self.solid[cy * SIDE + cx] ^= true;
            }
        };
        flip(x, y);
        flip(x + 1, y);
        flip(x, y + 1);
        if x > 0 { flip(x - 1, y); }
        if y > 0 { flip(x, y - 1); }
    }

    fn cleared(&self) -> bool {
        self.solid.iter().all(|&s| !s)
    }
}

impl Puzzle for Dissolve {
    fn title(&self) -> &str {
        "Dissolve"
    }

    fn handle_input(&mut self, input: PuzzleInput, done: &mut Completion) {
        let (x, y) = self.cursor;
        match input {
            PuzzleInput::Up    => self.cursor.1 = y.saturating_sub(1),
            PuzzleInput::Down  => self.cursor.1 = (y + 1).min(SIDE - 1),
            PuzzleInput::Left  => self.cursor.0 = x.saturating_sub(1),
            PuzzleInput::Right => self.cursor.0 = (x + 1).min(SIDE - 1),
            PuzzleInput::Enter | PuzzleInput::Char(' ') => {
                self.zap(x, y);
                self.moves += 1;
                if self.cleared() {
                    self.feedback = Some("All blocks dissolved!".to_string());
                    done.notify();
                }
            }
            _ => {}
        }
    }

    fn view(&self) -> PuzzleView {
        let mut lines: Vec<String> = (0..SIDE)
            .map(|y| {
                (0..SIDE)
                    .map(|x| {
                        let block = if self.solid[y * SIDE + x] { '#' } else { ' ' };
                        if self.cursor == (x, y) { format!(">{block}<") } else { format!("[{block}]") }
                    })
                    .collect()
            })
            .collect();
        lines.push(String::new());
        lines.push(format!("Zaps: {}", self.moves));
        PuzzleView {
            lines,
            feedback: self.feedback.clone(),
            controls: "Arrows:Move  Enter/Space:Zap",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn puzzle(seed: u64) -> Dissolve {
        Dissolve::generate(&mut StdRng::seed_from_u64(seed))
    }

    fn move_to(p: &mut Dissolve, x: usize, y: usize, done: &mut Completion) {
        while p.cursor.0 > x { p.handle_input(PuzzleInput::Left, done); }
        while p.cursor.0 < x { p.handle_input(PuzzleInput::Right, done); }
        while p.cursor.1 > y { p.handle_input(PuzzleInput::Up, done); }
        while p.cursor.1 < y { p.handle_input(PuzzleInput::Down, done); }
    }

    #[test]
    fn scramble_is_never_solved() {
        for seed in 0..60 {
            assert!(!puzzle(seed).cleared(), "seed {seed}");
        }
    }

    #[test]
    fn zap_flips_cross() {
        let mut p = Dissolve { solid: [false; CELLS], cursor: (1, 1), moves: 0, feedback: None };
        p.zap(0, 0);
        assert_eq!(p.solid, [true, true, false, true, false, false, false, false, false]);
        p.zap(1, 1);
        assert_eq!(p.solid, [true, false, false, false, true, true, false, true, false]);
    }

    #[test]
    fn replaying_scramble_solves() {
        // Zaps are self-inverse: repeating the scramble presses clears the board.
        let seed = 11;
        let mut rng = StdRng::seed_from_u64(seed);
        let presses = rng.gen_range(2..=4);
        let cells: Vec<usize> = index::sample(&mut rng, CELLS, presses).into_vec();

        let mut p = puzzle(seed);
        let mut done = Completion::new();
        for i in cells {
            move_to(&mut p, i % SIDE, i / SIDE, &mut done);
            p.handle_input(PuzzleInput::Enter, &mut done);
        }
        assert!(p.cleared());
        assert!(done.is_notified());
    }
}
