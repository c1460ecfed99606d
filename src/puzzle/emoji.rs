/// Emoji Algebra: three emojis stand for small numbers; deduce the last
/// one from three equations. A new puzzle is drawn for every activation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{Completion, Puzzle, PuzzleInput, PuzzleView};

const EMOJIS: [&str; 14] = [
    "🍎", "🍌", "🍇", "🍓", "🍉", "🍪", "🍩", "🍕", "🐶", "🐱", "🐸", "🐢", "🐘", "🦒",
];

/// Max characters accepted in the answer field.
const ANSWER_MAX: usize = 4;

pub struct EmojiAlgebra {
    equations: Vec<String>,
    question: String,
    answer: i64,
    input: String,
    feedback: Option<String>,
}

pub fn build(rng: &mut StdRng) -> Box<dyn Puzzle> {
    Box::new(EmojiAlgebra::generate(rng))
}

impl EmojiAlgebra {
    pub fn generate(rng: &mut StdRng) -> Self {
        let picked: Vec<&str> = EMOJIS.choose_multiple(rng, 3).copied().collect();
        let (a, b, c) = (picked[0], picked[1], picked[2]);
        let va: i64 = rng.gen_range(2..=6);
        let vb: i64 = rng.gen_range(2..=6);
        let vc: i64 = rng.gen_range(2..=6);

        let mut equations = vec![
            format!("{a} + {a} = {}", va + va),
            format!("{a} + {b} = {}", va + vb),
            format!("{b} + {c} = {}", vb + vc),
        ];
        equations.shuffle(rng);

        EmojiAlgebra {
            equations,
            question: format!("{c} + {c} = ?"),
            answer: vc + vc,
            input: String::new(),
            feedback: None,
        }
    }

    fn submit(&mut self, done: &mut Completion) {
        match self.input.parse::<i64>() {
            Ok(v) if v == self.answer => {
                self.feedback = Some("Correct!".to_string());
                done.notify();
            }
            Ok(_) => self.feedback = Some("Wrong! Try again.".to_string()),
            Err(_) => self.feedback = Some("Enter a number".to_string()),
        }
    }
}

impl Puzzle for EmojiAlgebra {
    fn title(&self) -> &str {
        "Emoji Algebra"
    }

    fn handle_input(&mut self, input: PuzzleInput, done: &mut Completion) {
        match input {
            PuzzleInput::Char(ch) if ch.is_ascii_digit() || (ch == '-' && self.input.is_empty()) => {
                if self.input.len() < ANSWER_MAX {
                    self.input.push(ch);
                }
            }
            PuzzleInput::Char(_) => self.feedback = Some("Enter a number".to_string()),
            PuzzleInput::Backspace => {
                self.input.pop();
            }
            PuzzleInput::Enter => self.submit(done),
            _ => {}
        }
    }

    fn view(&self) -> PuzzleView {
        let mut lines = self.equations.clone();
        lines.push(String::new());
        lines.push(self.question.clone());
        lines.push(format!("Answer: {}_", self.input));
        PuzzleView {
            lines,
            feedback: self.feedback.clone(),
            controls: "0-9:Type  Backspace:Erase  Enter:Submit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn puzzle(seed: u64) -> EmojiAlgebra {
        EmojiAlgebra::generate(&mut StdRng::seed_from_u64(seed))
    }

    fn type_str(p: &mut EmojiAlgebra, s: &str, done: &mut Completion) {
        for ch in s.chars() {
            p.handle_input(PuzzleInput::Char(ch), done);
        }
    }

    #[test]
    fn generated_values_in_range() {
        for seed in 0..50 {
            let p = puzzle(seed);
            assert!((4..=12).contains(&p.answer), "seed {seed}: {}", p.answer);
            assert_eq!(p.equations.len(), 3);
            assert!(p.question.ends_with("= ?"));
        }
    }

    #[test]
    fn emojis_are_distinct() {
        for seed in 0..50 {
            let p = puzzle(seed);
            let first = p.equations.iter().find(|e| {
                let parts: Vec<&str> = e.split(' ').collect();
                parts[0] == parts[2]
            });
            // Exactly one equation doubles an emoji (A + A)
            assert!(first.is_some(), "seed {seed}");
            let c = p.question.split(' ').next().unwrap();
            assert!(!first.unwrap().starts_with(c), "C differs from A (seed {seed})");
        }
    }

    #[test]
    fn correct_answer_completes() {
        let mut p = puzzle(3);
        let mut done = Completion::new();
        let answer = p.answer.to_string();
        type_str(&mut p, &answer, &mut done);
        p.handle_input(PuzzleInput::Enter, &mut done);
        assert!(done.is_notified());
        assert_eq!(p.view().feedback.as_deref(), Some("Correct!"));
    }

    #[test]
    fn wrong_answer_keeps_puzzle_open() {
        let mut p = puzzle(3);
        let mut done = Completion::new();
        let wrong = (p.answer + 1).to_string();
        type_str(&mut p, &wrong, &mut done);
        p.handle_input(PuzzleInput::Enter, &mut done);
        assert!(!done.is_notified());
        assert_eq!(p.view().feedback.as_deref(), Some("Wrong! Try again."));
    }

    #[test]
    fn non_numeric_input_flagged() {
        let mut p = puzzle(1);
        let mut done = Completion::new();
        type_str(&mut p, "x", &mut done);
        assert_eq!(p.view().feedback.as_deref(), Some("Enter a number"));
        p.handle_input(PuzzleInput::Enter, &mut done);
        assert!(!done.is_notified());
    }

    #[test]
    fn same_seed_same_puzzle() {
        assert_eq!(puzzle(42).equations, puzzle(42).equations);
    }
}
