/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the session; it never mutates it.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::entity::Position;
use crate::puzzle::PuzzleView;
use crate::sim::world::{Mode, Session, SessionSnapshot};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 16],  // up to 16 bytes (supports ZWJ emoji sequences)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, shared with
    /// `Clear(ClearType::All)` so row gaps match on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn glyph(c: char, fg: Color, bg: Color, wide: bool) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell.wide = wide;
        cell
    }

    /// Right half of a wide glyph; carries the background only.
    fn continuation(bg: Color) -> Self {
        Cell { ch: [0; 16], ch_len: 0, bg: Self::norm_bg(bg), cont: true, ..Self::BLANK }
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::glyph(' ', Color::White, bg, false));
            }
        }
    }

    /// Write a string at (x, y). Double-width glyphs take two columns;
    /// zero-width code points (variation selectors, joiners) are dropped.
    /// Returns the column after the last glyph.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            let w = ch.width().unwrap_or(0);
            if w == 0 { continue; }
            if cx + w > self.width { break; }
            if w >= 2 {
                self.set(cx, y, Cell::glyph(ch, fg, bg, true));
                self.set(cx + 1, y, Cell::continuation(bg));
                cx += 2;
            } else {
                self.set(cx, y, Cell::glyph(ch, fg, bg, false));
                cx += 1;
            }
        }
        cx
    }

    /// Center `s` horizontally inside `[x, x + w)`.
    fn put_centered(&mut self, x: usize, w: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let pad = w.saturating_sub(s.width()) / 2;
        self.put_str(x + pad, y, s, fg, bg);
    }
}

// ── Layout ──

/// Each grid tile is TILE_W columns by TILE_H rows.
const TILE_W: usize = 4;
const TILE_H: usize = 2;

const HEADER_ROW: usize = 0;
const HELP_ROW: usize = 1;
const GRID_ROW: usize = 3;
const GRID_COL: usize = 2;

const MODAL_MIN_W: usize = 38;

// ── Palette ──

const TITLE_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const DIM_FG: Color = Color::Rgb { r: 120, g: 120, b: 140 };
const TILE_A: Color = Color::Rgb { r: 44, g: 52, b: 70 };
const TILE_B: Color = Color::Rgb { r: 36, g: 42, b: 58 };
const LOCK_BG: Color = Color::Rgb { r: 150, g: 110, b: 20 };
const PLAYER_FG: Color = Color::Rgb { r: 120, g: 255, b: 160 };
const MODAL_BG: Color = Color::Rgb { r: 30, g: 30, b: 48 };
const MODAL_EDGE: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const WARN_FG: Color = Color::Rgb { r: 255, g: 90, b: 90 };
const OK_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };

/// MM:SS, minutes unbounded.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_mode: Option<Mode>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_mode: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Mode change → clear for clean transition
        let mode = session.mode();
        if self.last_mode != Some(mode) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_mode = Some(mode);
        }

        self.compose(session);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide glyph)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, session: &Session) {
        self.front.clear();
        let snap = session.snapshot();

        self.compose_header(&snap);

        match snap.mode {
            Mode::Playing => self.compose_grid(session),
            Mode::PuzzleOpen => {
                self.compose_grid(session);
                if let Some(view) = session.puzzle_view() {
                    let title = session.puzzle_title().unwrap_or("Puzzle");
                    self.compose_modal(title, snap.time_left.unwrap_or(0), &view);
                }
            }
            Mode::Loading => {
                self.compose_grid(session);
                self.compose_banner(&["Loading..."], OK_FG);
            }
            Mode::Failed => self.compose_banner(&["Too Late! Try again!"], WARN_FG),
            Mode::Won => {
                let total = format!("Total Time {}", format_clock(snap.elapsed));
                self.compose_banner(&["You Win!", "", &total, "", "Esc: Quit"], TITLE_FG);
            }
        }

        if snap.paused {
            self.compose_pause_overlay();
        }
    }

    fn compose_header(&mut self, snap: &SessionSnapshot) {
        let step = (snap.sequence_index + 1).min(snap.sequence_len);
        let status = format!(
            "Total Time {}   Lock {}/{}",
            format_clock(snap.elapsed), step, snap.sequence_len,
        );
        let end = self.front.put_str(1, HEADER_ROW, "STEMLocked", TITLE_FG, Color::Reset);
        self.front.put_str(end + 3, HEADER_ROW, &status, Color::White, Color::Reset);

        let help = match snap.mode {
            Mode::PuzzleOpen => "Keys go to the puzzle   F1/P: Pause   Esc: Quit",
            _ => "Arrows/WASD: Move   F1/P: Pause   Q/Esc: Quit",
        };
        self.front.put_str(1, HELP_ROW, help, DIM_FG, Color::Reset);
    }

    fn compose_grid(&mut self, session: &Session) {
        let n = session.grid_size();
        let lock = session.puzzle_tile();
        let player = session.position();
        let sprite = session.sprite().glyph();

        for gy in 0..n {
            for gx in 0..n {
                let here = Position::new(gx, gy);
                let bg = if here == lock {
                    LOCK_BG
                } else if (gx + gy) % 2 == 0 {
                    TILE_A
                } else {
                    TILE_B
                };
                let col = GRID_COL + gx * TILE_W;
                let row = GRID_ROW + gy * TILE_H;
                self.front.fill_rect(col, row, TILE_W, TILE_H, bg);

                if here == player {
                    self.front.put_str(col + 1, row, sprite, PLAYER_FG, bg);
                } else if here == lock {
                    self.front.put_str(col + 1, row, "[]", Color::Black, bg);
                }
            }
        }
    }

    fn compose_modal(&mut self, title: &str, time_left: u32, view: &PuzzleView) {
        let content_w = view.lines.iter()
            .map(|l| l.width())
            .chain([title.width(), view.controls.width()])
            .chain(view.feedback.iter().map(|f| f.width()))
            .max()
            .unwrap_or(0);
        let box_w = (content_w + 4).max(MODAL_MIN_W).min(self.front.width.saturating_sub(2));
        let box_h = view.lines.len() + 8;
        let box_x = self.front.width.saturating_sub(box_w) / 2;
        let box_y = GRID_ROW;

        self.front.fill_rect(box_x, box_y, box_w, box_h, MODAL_BG);
        self.draw_frame(box_x, box_y, box_w, box_h, MODAL_EDGE, MODAL_BG);

        self.front.put_centered(box_x, box_w, box_y + 1, title, TITLE_FG, MODAL_BG);
        let clock = format!("Time Left: {time_left}s");
        let clock_fg = if time_left <= 5 { WARN_FG } else { Color::White };
        self.front.put_centered(box_x, box_w, box_y + 2, &clock, clock_fg, MODAL_BG);

        let mut y = box_y + 4;
        for line in &view.lines {
            self.front.put_str(box_x + 2, y, line, Color::White, MODAL_BG);
            y += 1;
        }
        y += 1;
        if let Some(fb) = &view.feedback {
            self.front.put_str(box_x + 2, y, fb, TITLE_FG, MODAL_BG);
        }
        self.front.put_str(box_x + 2, y + 1, view.controls, DIM_FG, MODAL_BG);
    }

    /// Centered message lines under the header; the first line is highlighted.
    fn compose_banner(&mut self, lines: &[&str], fg: Color) {
        let w = self.front.width;
        let top = GRID_ROW + 2;
        for (i, line) in lines.iter().enumerate() {
            let color = if i == 0 { fg } else { Color::White };
            self.front.put_centered(0, w, top + i, line, color, Color::Reset);
        }
    }

    fn compose_pause_overlay(&mut self) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let box_w = 30_usize.min(self.front.width);
        let box_h = 7;
        let box_x = self.front.width.saturating_sub(box_w) / 2;
        let box_y = GRID_ROW + 4;

        self.front.fill_rect(box_x, box_y, box_w, box_h, dim);
        self.draw_frame(box_x, box_y, box_w, box_h, TITLE_FG, dim);
        self.front.put_centered(box_x, box_w, box_y + 2, "PAUSED", TITLE_FG, dim);
        self.front.put_centered(box_x, box_w, box_y + 4, "F1/P: Resume   Esc: Quit", DIM_FG, dim);
    }

    fn draw_frame(&mut self, x: usize, y: usize, w: usize, h: usize, fg: Color, bg: Color) {
        if w < 2 || h < 2 { return; }
        let horiz = "─".repeat(w - 2);
        self.front.put_str(x, y, &format!("┌{horiz}┐"), fg, bg);
        self.front.put_str(x, y + h - 1, &format!("└{horiz}┘"), fg, bg);
        for row in y + 1..y + h - 1 {
            self.front.put_str(x, row, "│", fg, bg);
            self.front.put_str(x + w - 1, row, "│", fg, bg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::MoveDir;
    use crate::sim::step;
    use std::time::Duration;

    fn session() -> Session {
        let mut cfg = GameConfig::default();
        cfg.seed = Some(3);
        Session::new(&cfg)
    }

    fn composed(session: &Session) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(80, 30);
        r.compose(session);
        r
    }

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width)
            .map(|x| buf.get(x, y))
            .filter(|c| !c.cont)
            .map(|c| c.as_str().to_string())
            .collect()
    }

    fn screen(r: &Renderer) -> String {
        (0..r.front.height).map(|y| row_text(&r.front, y)).collect::<Vec<_>>().join("\n")
    }

    fn open_puzzle(s: &mut Session) {
        for d in [MoveDir::Right, MoveDir::Right, MoveDir::Down, MoveDir::Down] {
            step::handle_move(s, d);
        }
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        let mut buf = FrameBuffer::new(10, 1);
        let end = buf.put_str(0, 0, "a🍎b", Color::White, Color::Reset);
        assert_eq!(end, 4);
        assert!(buf.get(1, 0).wide);
        assert!(buf.get(2, 0).cont);
        assert_eq!(buf.get(3, 0).as_str(), "b");
    }

    #[test]
    fn wide_glyph_not_split_at_edge() {
        let mut buf = FrameBuffer::new(3, 1);
        buf.put_str(0, 0, "ab🍎", Color::White, Color::Reset);
        assert_eq!(buf.get(2, 0).as_str(), " ");
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(3600), "60:00");
    }

    #[test]
    fn playing_screen_shows_grid_and_sprite() {
        let s = session();
        let r = composed(&s);
        let text = screen(&r);
        assert!(text.contains("STEMLocked"));
        assert!(text.contains("Total Time 00:00"));
        assert!(text.contains("Lock 1/5"));
        assert!(row_text(&r.front, GRID_ROW).contains("@@"));
        assert_eq!(r.front.get(GRID_COL + 2 * TILE_W, GRID_ROW + 2 * TILE_H).bg, LOCK_BG);
    }

    #[test]
    fn modal_shows_time_left_and_puzzle() {
        let mut s = session();
        open_puzzle(&mut s);
        step::advance(&mut s, Duration::from_secs(4));
        let text = screen(&composed(&s));
        assert!(text.contains("Cross Math"));
        assert!(text.contains("Time Left: 11s"));
        assert!(text.contains("Enter:Unlock"));
    }

    #[test]
    fn failure_hides_grid() {
        let mut s = session();
        open_puzzle(&mut s);
        step::on_time_up(&mut s);
        let r = composed(&s);
        assert!(screen(&r).contains("Too Late! Try again!"));
        assert_eq!(r.front.get(GRID_COL, GRID_ROW).bg, Cell::BASE_BG);
    }

    #[test]
    fn loading_and_pause_overlays() {
        let mut s = session();
        open_puzzle(&mut s);
        step::on_puzzle_complete(&mut s);
        step::set_paused(&mut s, true);
        let text = screen(&composed(&s));
        assert!(text.contains("Loading..."));
        assert!(text.contains("PAUSED"));
    }
}
