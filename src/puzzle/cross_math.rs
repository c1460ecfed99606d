/// Cross Math: fill the blanks so every row's equation holds.
///
///   _ + 3 = 5
///   2 - _ = 1
///   2 + _ = 4
///
/// Each blank takes one digit. Rows are checked with the restricted
/// evaluator in `expr`, never by executing text.

use rand::rngs::StdRng;

use super::expr;
use super::{Completion, Puzzle, PuzzleInput, PuzzleView};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Cell {
    Given(u8),
    Op(char),
    Equals,
    Blank(Option<u8>),
}

const LAYOUT: [[Cell; 5]; 3] = [
    [Cell::Blank(None), Cell::Op('+'), Cell::Given(3), Cell::Equals, Cell::Given(5)],
    [Cell::Given(2), Cell::Op('-'), Cell::Blank(None), Cell::Equals, Cell::Given(1)],
    [Cell::Given(2), Cell::Op('+'), Cell::Blank(None), Cell::Equals, Cell::Given(4)],
];

pub struct CrossMath {
    grid: [[Cell; 5]; 3],
    /// (row, col) of every blank, in reading order.
    blanks: Vec<(usize, usize)>,
    cursor: usize,
    feedback: Option<String>,
}

pub fn build(_rng: &mut StdRng) -> Box<dyn Puzzle> {
    Box::new(CrossMath::new())
}

impl CrossMath {
    pub fn new() -> Self {
        let grid = LAYOUT;
        let blanks = grid.iter().enumerate()
            .flat_map(|(r, row)| {
                row.iter().enumerate()
                    .filter(|(_, c)| matches!(c, Cell::Blank(_)))
                    .map(move |(c, _)| (r, c))
            })
            .collect();
        CrossMath { grid, blanks, cursor: 0, feedback: None }
    }

    fn set_current(&mut self, value: Option<u8>) {
        if let Some(&(r, c)) = self.blanks.get(self.cursor) {
            self.grid[r][c] = Cell::Blank(value);
        }
    }

    fn move_cursor(&mut self, forward: bool) {
        let n = self.blanks.len();
        if n == 0 { return; }
        self.cursor = if forward { (self.cursor + 1) % n } else { (self.cursor + n - 1) % n };
    }

    /// Check every row; the first failing row is reported.
    fn check(&self) -> Result<(), String> {
        for (i, row) in self.grid.iter().enumerate() {
            let mut src = String::new();
            let mut target = None;
            for (j, cell) in row.iter().enumerate() {
                match *cell {
                    Cell::Equals => {
                        target = match row.get(j + 1) {
                            Some(Cell::Given(v)) | Some(Cell::Blank(Some(v))) => Some(*v as i64),
                            _ => None,
                        };
                        break;
                    }
                    Cell::Blank(None) => return Err(format!("Row {} incomplete!", i + 1)),
                    Cell::Blank(Some(d)) | Cell::Given(d) => src.push(char::from(b'0' + d)),
                    Cell::Op(op) => src.push(op),
                }
            }
            match (expr::evaluate(&src), target) {
                (Ok(v), Some(t)) if v == t => {}
                _ => return Err(format!("Row {} is incorrect!", i + 1)),
            }
        }
        Ok(())
    }

    fn render_cell(&self, r: usize, c: usize) -> String {
        let selected = self.blanks.get(self.cursor) == Some(&(r, c));
        match self.grid[r][c] {
            Cell::Given(v) => format!(" {v} "),
            Cell::Op(op) => format!(" {op} "),
            Cell::Equals => " = ".to_string(),
            Cell::Blank(v) => {
                let inner = v.map(|d| char::from(b'0' + d)).unwrap_or('_');
                if selected { format!(">{inner}<") } else { format!("[{inner}]") }
            }
        }
    }
}

impl Puzzle for CrossMath {
    fn title(&self) -> &str {
        "Cross Math"
    }

    fn handle_input(&mut self, input: PuzzleInput, done: &mut Completion) {
        match input {
            PuzzleInput::Char(ch) => match ch.to_digit(10) {
                Some(d) => {
                    self.set_current(Some(d as u8));
                    self.feedback = None;
                }
                None => self.feedback = Some("Digits only".to_string()),
            },
            PuzzleInput::Backspace => self.set_current(None),
            PuzzleInput::Tab | PuzzleInput::Right | PuzzleInput::Down => self.move_cursor(true),
            PuzzleInput::Left | PuzzleInput::Up => self.move_cursor(false),
            PuzzleInput::Enter => match self.check() {
                Ok(()) => {
                    self.feedback = Some("Correct! Puzzle solved!".to_string());
                    done.notify();
                }
                Err(msg) => self.feedback = Some(msg),
            },
        }
    }

    fn view(&self) -> PuzzleView {
        let lines = (0..self.grid.len())
            .map(|r| (0..5).map(|c| self.render_cell(r, c)).collect::<String>())
            .collect();
        PuzzleView {
            lines,
            feedback: self.feedback.clone(),
            controls: "0-9:Fill  Tab/Arrows:Next blank  Enter:Unlock",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(p: &mut CrossMath, inputs: &[PuzzleInput], done: &mut Completion) {
        for &i in inputs {
            p.handle_input(i, done);
        }
    }

    #[test]
    fn three_blanks_in_reading_order() {
        let p = CrossMath::new();
        assert_eq!(p.blanks, vec![(0, 0), (1, 2), (2, 2)]);
    }

    #[test]
    fn correct_answers_complete() {
        let mut p = CrossMath::new();
        let mut done = Completion::new();
        press(&mut p, &[
            PuzzleInput::Char('2'), PuzzleInput::Tab,
            PuzzleInput::Char('1'), PuzzleInput::Tab,
            PuzzleInput::Char('2'), PuzzleInput::Enter,
        ], &mut done);
        assert!(done.is_notified());
    }

    #[test]
    fn incomplete_row_is_reported() {
        let mut p = CrossMath::new();
        let mut done = Completion::new();
        press(&mut p, &[PuzzleInput::Char('2'), PuzzleInput::Enter], &mut done);
        assert!(!done.is_notified());
        assert_eq!(p.view().feedback.as_deref(), Some("Row 2 incomplete!"));
    }

    #[test]
    fn wrong_row_is_reported() {
        let mut p = CrossMath::new();
        let mut done = Completion::new();
        press(&mut p, &[
            PuzzleInput::Char('2'), PuzzleInput::Tab,
            PuzzleInput::Char('3'), PuzzleInput::Tab,
            PuzzleInput::Char('2'), PuzzleInput::Enter,
        ], &mut done);
        assert!(!done.is_notified());
        assert_eq!(p.view().feedback.as_deref(), Some("Row 2 is incorrect!"));
    }

    #[test]
    fn non_digit_is_flagged_locally() {
        let mut p = CrossMath::new();
        let mut done = Completion::new();
        press(&mut p, &[PuzzleInput::Char('x')], &mut done);
        assert_eq!(p.view().feedback.as_deref(), Some("Digits only"));
        assert_eq!(p.grid[0][0], Cell::Blank(None));
    }

    #[test]
    fn typing_replaces_and_backspace_clears() {
        let mut p = CrossMath::new();
        let mut done = Completion::new();
        press(&mut p, &[PuzzleInput::Char('7'), PuzzleInput::Char('2')], &mut done);
        assert_eq!(p.grid[0][0], Cell::Blank(Some(2)));
        press(&mut p, &[PuzzleInput::Backspace], &mut done);
        assert_eq!(p.grid[0][0], Cell::Blank(None));
    }

    #[test]
    fn cursor_wraps_backwards() {
        let mut p = CrossMath::new();
        let mut done = Completion::new();
        press(&mut p, &[PuzzleInput::Left, PuzzleInput::Char('2')], &mut done);
        assert_eq!(p.grid[2][2], Cell::Blank(Some(2)));
        assert!(p.view().lines[2].contains(">2<"));
    }
}
