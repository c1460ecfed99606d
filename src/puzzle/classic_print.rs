/// Classic Print: find the print that matches the target exactly.
/// Decoys differ from the target in one or two cells.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;

use super::{Completion, Puzzle, PuzzleInput, PuzzleView};

const SIDE: usize = 3;
const CELLS: usize = SIDE * SIDE;
const CANDIDATES: usize = 4;

type Print = [bool; CELLS];

pub struct ClassicPrint {
    target: Print,
    candidates: [Print; CANDIDATES],
    correct: usize,
    selected: usize,
    feedback: Option<String>,
}

pub fn build(rng: &mut StdRng) -> Box<dyn Puzzle> {
    Box::new(ClassicPrint::generate(rng))
}

impl ClassicPrint {
    pub fn generate(rng: &mut StdRng) -> Self {
        let mut target = [false; CELLS];
        for cell in target.iter_mut() {
            *cell = rng.gen_bool(0.5);
        }

        let correct = rng.gen_range(0..CANDIDATES);
        let mut candidates = [target; CANDIDATES];
        for i in 0..CANDIDATES {
            if i == correct { continue; }
            candidates[i] = loop {
                let decoy = Self::decoy(&target, rng);
                if !candidates[..i].contains(&decoy) {
                    break decoy;
                }
            };
        }

        ClassicPrint { target, candidates, correct, selected: 0, feedback: None }
    }

    fn decoy(target: &Print, rng: &mut StdRng) -> Print {
        let flips = rng.gen_range(1..=2);
        let mut print = *target;
        for i in index::sample(rng, CELLS, flips) {
            print[i] = !print[i];
        }
        print
    }

    fn row(print: &Print, r: usize) -> String {
        print[r * SIDE..(r + 1) * SIDE]
            .iter()
            .map(|&on| if on { '#' } else { '.' })
            .collect()
    }
}

impl Puzzle for ClassicPrint {
    fn title(&self) -> &str {
        "Classic Print"
    }

    fn handle_input(&mut self, input: PuzzleInput, done: &mut Completion) {
        match input {
            PuzzleInput::Left | PuzzleInput::Up => {
                self.selected = (self.selected + CANDIDATES - 1) % CANDIDATES;
            }
            PuzzleInput::Right | PuzzleInput::Down | PuzzleInput::Tab => {
                self.selected = (self.selected + 1) % CANDIDATES;
            }
            PuzzleInput::Char(ch) => match ch.to_digit(10) {
                Some(d) if (1..=CANDIDATES as u32).contains(&d) => self.selected = d as usize - 1,
                _ => self.feedback = Some(format!("Choose 1-{CANDIDATES}")),
            },
            PuzzleInput::Enter => {
                if self.selected == self.correct {
                    self.feedback = Some("Match confirmed!".to_string());
                    done.notify();
                } else {
                    self.feedback = Some("Not a match!".to_string());
                }
            }
            PuzzleInput::Backspace => {}
        }
    }

    fn view(&self) -> PuzzleView {
        let mut lines = vec!["Target:".to_string()];
        for r in 0..SIDE {
            lines.push(format!("  {}", Self::row(&self.target, r)));
        }
        lines.push(String::new());

        let header: String = (0..CANDIDATES)
            .map(|i| if i == self.selected { format!(" >{}<  ", i + 1) } else { format!("  {}   ", i + 1) })
            .collect();
        lines.push(header);
        for r in 0..SIDE {
            let row: String = self.candidates.iter()
                .map(|c| format!(" {}  ", Self::row(c, r)))
                .collect();
            lines.push(row);
        }

        PuzzleView {
            lines,
            feedback: self.feedback.clone(),
            controls: "Left/Right or 1-4:Select  Enter:Confirm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn puzzle(seed: u64) -> ClassicPrint {
        ClassicPrint::generate(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn exactly_one_candidate_matches() {
        for seed in 0..40 {
            let p = puzzle(seed);
            let matches: Vec<usize> = (0..CANDIDATES)
                .filter(|&i| p.candidates[i] == p.target)
                .collect();
            assert_eq!(matches, vec![p.correct], "seed {seed}");
        }
    }

    #[test]
    fn decoys_differ_by_one_or_two_cells() {
        for seed in 0..40 {
            let p = puzzle(seed);
            for (i, c) in p.candidates.iter().enumerate() {
                if i == p.correct { continue; }
                let diff = c.iter().zip(p.target.iter()).filter(|(a, b)| a != b).count();
                assert!((1..=2).contains(&diff), "seed {seed}, candidate {i}: {diff}");
            }
        }
    }

    #[test]
    fn selecting_the_match_completes() {
        let mut p = puzzle(5);
        let mut done = Completion::new();
        let key = char::from_digit(p.correct as u32 + 1, 10).unwrap();
        p.handle_input(PuzzleInput::Char(key), &mut done);
        p.handle_input(PuzzleInput::Enter, &mut done);
        assert!(done.is_notified());
    }

    #[test]
    fn selecting_a_decoy_does_not_complete() {
        let mut p = puzzle(5);
        let mut done = Completion::new();
        let wrong = (p.correct + 1) % CANDIDATES;
        while p.selected != wrong {
            p.handle_input(PuzzleInput::Right, &mut done);
        }
        p.handle_input(PuzzleInput::Enter, &mut done);
        assert!(!done.is_notified());
        assert_eq!(p.view().feedback.as_deref(), Some("Not a match!"));
    }
}
