/// Sprite animation: picks the frame to draw for the player's current
/// direction and cycles multi-frame sequences on a fixed cadence.
///
/// Frame references are terminal glyphs (one or two columns wide).
/// A direction with no registered frames resolves to `FrameRef::Fallback`;
/// the miss is logged once per direction and never aborts anything.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::warn;

use super::entity::Direction;
use super::timer::Cadence;

/// Placeholder drawn when a direction has no frames.
pub const FALLBACK_GLYPH: &str = "??";

/// Direction → ordered frame sequence.
#[derive(Clone, Debug, Default)]
pub struct AnimationSet {
    frames: HashMap<Direction, Vec<String>>,
}

impl AnimationSet {
    pub fn new() -> Self {
        AnimationSet { frames: HashMap::new() }
    }

    /// Register (or replace) the sequence for `dir`. Empty sequences are
    /// kept as-is so lookups for that direction report the miss.
    pub fn insert(&mut self, dir: Direction, frames: Vec<String>) {
        self.frames.insert(dir, frames);
    }

    pub fn frames(&self, dir: Direction) -> &[String] {
        self.frames.get(&dir).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// What the presentation layer should draw.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameRef<'a> {
    Sprite(&'a str),
    Fallback,
}

impl<'a> FrameRef<'a> {
    pub fn glyph(self) -> &'a str {
        match self {
            FrameRef::Sprite(s) => s,
            FrameRef::Fallback => FALLBACK_GLYPH,
        }
    }
}

pub struct AnimationSelector {
    set: AnimationSet,
    current: Direction,
    index: usize,
    cadence: Cadence,
    playing: bool,
    /// Directions whose missing frames were already reported.
    reported: HashSet<Direction>,
}

impl AnimationSelector {
    pub fn new(set: AnimationSet, frame_interval: Duration) -> Self {
        let mut sel = AnimationSelector {
            set,
            current: Direction::Idle,
            index: 0,
            cadence: Cadence::new(frame_interval),
            playing: false,
            reported: HashSet::new(),
        };
        sel.check_frames();
        sel
    }

    /// Select a direction. A different direction restarts at its first
    /// frame with a fresh cadence; re-selecting the same one is a no-op.
    pub fn select(&mut self, dir: Direction) {
        if dir == self.current { return; }
        self.current = dir;
        self.index = 0;
        self.cadence.reset();
        self.check_frames();
    }

    /// Start or suspend cycling. Suspending freezes both the current frame
    /// and the partial interval; resuming continues where it stopped.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn advance(&mut self, dt: Duration) {
        if !self.playing { return; }
        let len = self.set.frames(self.current).len();
        if len <= 1 { return; } // static frame or fallback: nothing to cycle

        let steps = self.cadence.advance(dt) as usize;
        self.index = (self.index + steps) % len;
    }

    pub fn frame(&self) -> FrameRef<'_> {
        match self.set.frames(self.current).get(self.index) {
            Some(f) => FrameRef::Sprite(f.as_str()),
            None => FrameRef::Fallback,
        }
    }

    fn check_frames(&mut self) {
        let dir = self.current;
        if self.set.frames(dir).is_empty() && self.reported.insert(dir) {
            warn!(direction = dir.name(), "no animation frames registered; using fallback sprite");
        }
    }
}

#[cfg(test)]
impl AnimationSelector {
    pub(crate) fn current(&self) -> Direction {
        self.current
    }

    fn frame_index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(200);

    fn frames(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn selector() -> AnimationSelector {
        let mut set = AnimationSet::new();
        set.insert(Direction::Idle, frames(&["id"]));
        set.insert(Direction::Left, frames(&["l0", "l1", "l2", "l3"]));
        set.insert(Direction::Up, frames(&["u0", "u1"]));
        let mut sel = AnimationSelector::new(set, STEP);
        sel.set_playing(true);
        sel
    }

    #[test]
    fn cycles_in_order_and_wraps() {
        let mut sel = selector();
        sel.select(Direction::Left);
        let mut seen = vec![sel.frame_index()];
        for _ in 0..9 {
            sel.advance(STEP);
            seen.push(sel.frame_index());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
        assert_eq!(sel.frame(), FrameRef::Sprite("l1"));
    }

    #[test]
    fn direction_change_restarts_at_first_frame() {
        let mut sel = selector();
        sel.select(Direction::Left);
        sel.advance(STEP);
        sel.advance(STEP);
        sel.advance(Duration::from_millis(150));
        assert_eq!(sel.frame_index(), 2);

        sel.select(Direction::Up);
        assert_eq!(sel.frame_index(), 0);
        assert_eq!(sel.frame(), FrameRef::Sprite("u0"));

        // The 150ms carried by the old cycle must not leak into the new one.
        sel.advance(Duration::from_millis(100));
        assert_eq!(sel.frame_index(), 0);
        sel.advance(Duration::from_millis(100));
        assert_eq!(sel.frame_index(), 1);
    }

    #[test]
    fn reselecting_same_direction_keeps_phase() {
        let mut sel = selector();
        sel.select(Direction::Left);
        sel.advance(STEP);
        sel.select(Direction::Left);
        assert_eq!(sel.frame_index(), 1);
    }

    #[test]
    fn single_frame_is_static() {
        let mut sel = selector();
        for _ in 0..5 { sel.advance(STEP); }
        assert_eq!(sel.frame(), FrameRef::Sprite("id"));
        assert_eq!(sel.frame_index(), 0);
    }

    #[test]
    fn missing_frames_fall_back() {
        let mut sel = selector();
        sel.select(Direction::Down);
        assert_eq!(sel.frame(), FrameRef::Fallback);
        assert_eq!(sel.frame().glyph(), FALLBACK_GLYPH);
        sel.advance(STEP);
        assert_eq!(sel.frame(), FrameRef::Fallback);
        assert!(sel.reported.contains(&Direction::Down));
    }

    #[test]
    fn suspended_selector_holds_frame() {
        let mut sel = selector();
        sel.select(Direction::Left);
        sel.advance(STEP);
        sel.set_playing(false);
        for _ in 0..3 { sel.advance(STEP); }
        assert_eq!(sel.frame_index(), 1);
        sel.set_playing(true);
        sel.advance(STEP);
        assert_eq!(sel.frame_index(), 2);
    }

    #[test]
    fn suspending_keeps_partial_interval() {
        let mut sel = selector();
        sel.select(Direction::Left);
        sel.advance(Duration::from_millis(150));
        assert_eq!(sel.frame_index(), 0);

        sel.set_playing(false);
        sel.advance(Duration::from_millis(500));
        sel.set_playing(true);

        // 150ms were already spent; 50ms more completes the interval.
        sel.advance(Duration::from_millis(50));
        assert_eq!(sel.frame_index(), 1);
    }
}
