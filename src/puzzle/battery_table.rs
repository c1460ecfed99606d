/// Battery Table: switch batteries on until their voltages add up to the
/// lock's target voltage. Any subset with the right total unlocks it.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;

use super::{Completion, Puzzle, PuzzleInput, PuzzleView};

const BATTERIES: usize = 6;

pub struct BatteryTable {
    volts: [u32; BATTERIES],
    on: [bool; BATTERIES],
    target: u32,
    cursor: usize,
    feedback: Option<String>,
}

pub fn build(rng: &mut StdRng) -> Box<dyn Puzzle> {
    Box::new(BatteryTable::generate(rng))
}

impl BatteryTable {
    pub fn generate(rng: &mut StdRng) -> Self {
        let mut volts = [0u32; BATTERIES];
        for v in volts.iter_mut() {
            *v = rng.gen_range(1..=9);
        }
        let picks = rng.gen_range(2..=3);
        let target: u32 = index::sample(rng, BATTERIES, picks)
            .into_iter()
            .map(|i| volts[i])
            .sum();

        BatteryTable { volts, on: [false; BATTERIES], target, cursor: 0, feedback: None }
    }

    fn total(&self) -> u32 {
        self.volts.iter().zip(self.on.iter())
            .filter(|(_, &on)| on)
            .map(|(v, _)| v)
            .sum()
    }

    fn toggle(&mut self, i: usize) {
        if let Some(slot) = self.on.get_mut(i) {
            *slot = !*slot;
            self.feedback = None;
        }
    }
}

impl Puzzle for BatteryTable {
    fn title(&self) -> &str {
        "Battery Table"
    }

    fn handle_input(&mut self, input: PuzzleInput, done: &mut Completion) {
        match input {
            PuzzleInput::Up | PuzzleInput::Left => {
                self.cursor = (self.cursor + BATTERIES - 1) % BATTERIES;
            }
            PuzzleInput::Down | PuzzleInput::Right | PuzzleInput::Tab => {
                self.cursor = (self.cursor + 1) % BATTERIES;
            }
            PuzzleInput::Char(' ') => self.toggle(self.cursor),
            PuzzleInput::Char(ch) => match ch.to_digit(10) {
                Some(d) if (1..=BATTERIES as u32).contains(&d) => {
                    self.cursor = d as usize - 1;
                    self.toggle(self.cursor);
                }
                _ => self.feedback = Some(format!("Use 1-{BATTERIES} or Space")),
            },
            PuzzleInput::Backspace => {
                self.on = [false; BATTERIES];
            }
            PuzzleInput::Enter => {
                let total = self.total();
                if total == self.target {
                    self.feedback = Some("Circuit balanced!".to_string());
                    done.notify();
                } else {
                    self.feedback = Some(format!("{total}V is not {}V", self.target));
                }
            }
        }
    }

    fn view(&self) -> PuzzleView {
        let mut lines = vec![format!("Target voltage: {}V", self.target), String::new()];
        for i in 0..BATTERIES {
            let mark = if self.on[i] { 'x' } else { ' ' };
            let cursor = if i == self.cursor { '>' } else { ' ' };
            lines.push(format!("{cursor} {} [{mark}] Cell {}  {}V", i + 1, (b'A' + i as u8) as char, self.volts[i]));
        }
        lines.push(String::new());
        lines.push(format!("Selected: {}V", self.total()));
        PuzzleView {
            lines,
            feedback: self.feedback.clone(),
            controls: "1-6/Space:Toggle  Backspace:Clear  Enter:Connect",
        }
    }
}
