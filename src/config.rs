/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete; a file that
/// fails to parse or validate is logged and replaced by defaults as a whole.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::animation::AnimationSet;
use crate::domain::entity::{Direction, Position};
use crate::puzzle::PuzzleId;
use crate::sim::sequence::{PuzzleEntry, PuzzleSequence, SequenceError};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub timing: TimingConfig,
    pub sequence: PuzzleSequence,
    pub animations: AnimationSet,
    /// Fixed seed for puzzle generation; entropy when absent.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct BoardConfig {
    pub grid_size: usize,
    pub puzzle_tile: Position,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_ms: u64,           // countdown / elapsed tick
    pub animation_ms: u64,      // sprite frame cadence
    pub transition_ticks: u32,  // Loading / Failed delay
    pub frame_ms: u64,          // main loop sleep
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("grid_size must be at least 2 (got {0})")]
    GridTooSmall(usize),
    #[error("puzzle_tile ({x}, {y}) lies outside a {size}x{size} grid")]
    TileOutside { x: usize, y: usize, size: usize },
    #[error("puzzle_tile must not be the starting tile (0, 0)")]
    TileAtOrigin,
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug)]
struct TomlConfig {
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default = "default_puzzles")]
    puzzles: Vec<TomlPuzzle>,
    #[serde(default)]
    animation: TomlAnimation,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_grid_size")]
    grid_size: usize,
    #[serde(default = "default_puzzle_tile")]
    puzzle_tile: [usize; 2],
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
    #[serde(default = "default_animation_ms")]
    animation_ms: u64,
    #[serde(default = "default_transition_ticks")]
    transition_ticks: u32,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPuzzle {
    id: PuzzleId,
    seconds: u32,
}

#[derive(Deserialize, Debug)]
struct TomlAnimation {
    #[serde(default = "default_idle_frames")]
    idle: Vec<String>,
    #[serde(default = "default_up_frames")]
    up: Vec<String>,
    #[serde(default = "default_down_frames")]
    down: Vec<String>,
    #[serde(default = "default_left_frames")]
    left: Vec<String>,
    #[serde(default = "default_right_frames")]
    right: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_grid_size() -> usize { 5 }
fn default_puzzle_tile() -> [usize; 2] { [2, 2] }
fn default_tick_ms() -> u64 { 1000 }
fn default_animation_ms() -> u64 { 200 }
fn default_transition_ticks() -> u32 { 2 }
fn default_frame_ms() -> u64 { 16 }   // ~60 fps redraw

fn default_puzzles() -> Vec<TomlPuzzle> {
    PuzzleSequence::default()
        .entries()
        .iter()
        .map(|e| TomlPuzzle { id: e.id, seconds: e.seconds })
        .collect()
}

fn frames(glyphs: &[&str]) -> Vec<String> {
    glyphs.iter().map(|g| g.to_string()).collect()
}

fn default_idle_frames() -> Vec<String> { frames(&["@@"]) }
fn default_up_frames() -> Vec<String> { frames(&["/\\", "||"]) }
fn default_down_frames() -> Vec<String> { frames(&["\\/", "||"]) }
fn default_left_frames() -> Vec<String> { frames(&["<=", "<-", "<~", "<-"]) }
fn default_right_frames() -> Vec<String> { frames(&["=>", "->", "~>", "->"]) }

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard {
            grid_size: default_grid_size(),
            puzzle_tile: default_puzzle_tile(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_ms: default_tick_ms(),
            animation_ms: default_animation_ms(),
            transition_ticks: default_transition_ticks(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for TomlAnimation {
    fn default() -> Self {
        TomlAnimation {
            idle: default_idle_frames(),
            up: default_up_frames(),
            down: default_down_frames(),
            left: default_left_frames(),
            right: default_right_frames(),
        }
    }
}

// ── Conversion / validation ──

impl TryFrom<TomlConfig> for GameConfig {
    type Error = ConfigError;

    fn try_from(cfg: TomlConfig) -> Result<Self, ConfigError> {
        let grid_size = cfg.board.grid_size;
        if grid_size < 2 {
            return Err(ConfigError::GridTooSmall(grid_size));
        }
        let [x, y] = cfg.board.puzzle_tile;
        let puzzle_tile = Position::new(x, y);
        if !puzzle_tile.in_grid(grid_size) {
            return Err(ConfigError::TileOutside { x, y, size: grid_size });
        }
        if puzzle_tile == Position::ORIGIN {
            return Err(ConfigError::TileAtOrigin);
        }

        let t = &cfg.timing;
        for (name, value) in [
            ("timing.tick_ms", t.tick_ms),
            ("timing.animation_ms", t.animation_ms),
            ("timing.transition_ticks", u64::from(t.transition_ticks)),
            ("timing.frame_ms", t.frame_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval(name));
            }
        }

        let sequence = PuzzleSequence::new(
            cfg.puzzles.iter()
                .map(|p| PuzzleEntry { id: p.id, seconds: p.seconds })
                .collect(),
        )?;

        Ok(GameConfig::assemble(cfg, sequence))
    }
}

impl GameConfig {
    fn assemble(cfg: TomlConfig, sequence: PuzzleSequence) -> Self {
        let mut animations = AnimationSet::new();
        let a = cfg.animation;
        for (dir, list) in [
            (Direction::Idle, a.idle),
            (Direction::Up, a.up),
            (Direction::Down, a.down),
            (Direction::Left, a.left),
            (Direction::Right, a.right),
        ] {
            animations.insert(dir, list);
        }
        for dir in Direction::ALL {
            if animations.frames(dir).is_empty() {
                warn!(direction = dir.name(), "no animation frames; fallback glyph will be drawn");
            }
        }

        let [x, y] = cfg.board.puzzle_tile;
        let t = cfg.timing;
        GameConfig {
            board: BoardConfig {
                grid_size: cfg.board.grid_size,
                puzzle_tile: Position::new(x, y),
            },
            timing: TimingConfig {
                tick_ms: t.tick_ms,
                animation_ms: t.animation_ms,
                transition_ticks: t.transition_ticks,
                frame_ms: t.frame_ms,
            },
            sequence,
            animations,
            seed: cfg.general.seed,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let cfg = TomlConfig {
            board: TomlBoard::default(),
            timing: TomlTiming::default(),
            puzzles: vec![],
            animation: TomlAnimation::default(),
            general: TomlGeneral::default(),
        };
        GameConfig::assemble(cfg, PuzzleSequence::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/stemlocked, (4) /usr/share/stemlocked.
    /// Any failure is logged and the built-in defaults are used.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }

            return match std::fs::read_to_string(&path) {
                Ok(text) => match GameConfig::from_toml_str(&text) {
                    Ok(cfg) => {
                        info!(path = %path.display(), "loaded configuration");
                        cfg
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "invalid configuration; using defaults");
                        GameConfig::default()
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read configuration; using defaults");
                    GameConfig::default()
                }
            };
        }
        info!("no config.toml found; using defaults");
        GameConfig::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: TomlConfig = toml::from_str(text)?;
        GameConfig::try_from(raw)
    }
}

/// Per-user data directory (~/.local/share/stemlocked), if HOME is set.
pub fn data_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/share/stemlocked"))
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Some(xdg) = data_home() {
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/stemlocked");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.board.grid_size, 5);
        assert_eq!(cfg.board.puzzle_tile, Position::new(2, 2));
        assert_eq!(cfg.timing.tick(), Duration::from_secs(1));
        assert_eq!(cfg.timing.transition_ticks, 2);
        assert_eq!(cfg.sequence.len(), 5);
        assert_eq!(cfg.animations.frames(Direction::Left).len(), 4);
        assert_eq!(cfg.animations.frames(Direction::Idle).len(), 1);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[board]\ngrid_size = 7\n\n[timing]\ntick_ms = 500\n\n[general]\nseed = 42\n",
        )
        .unwrap();
        assert_eq!(cfg.board.grid_size, 7);
        assert_eq!(cfg.board.puzzle_tile, Position::new(2, 2));
        assert_eq!(cfg.timing.tick_ms, 500);
        assert_eq!(cfg.timing.animation_ms, 200);
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn custom_sequence() {
        let cfg = GameConfig::from_toml_str(
            "[[puzzles]]\nid = \"disolvePuzzle\"\nseconds = 5\n\n[[puzzles]]\nid = \"crossMath\"\nseconds = 9\n",
        )
        .unwrap();
        let ids: Vec<PuzzleId> = cfg.sequence.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![PuzzleId::Dissolve, PuzzleId::CrossMath]);
        assert_eq!(cfg.sequence.get(1).map(|e| e.seconds), Some(9));
    }

    #[test]
    fn rejects_invalid_board() {
        assert!(matches!(
            GameConfig::from_toml_str("[board]\ngrid_size = 1\n"),
            Err(ConfigError::GridTooSmall(1))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[board]\npuzzle_tile = [5, 1]\n"),
            Err(ConfigError::TileOutside { x: 5, y: 1, size: 5 })
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[board]\npuzzle_tile = [0, 0]\n"),
            Err(ConfigError::TileAtOrigin)
        ));
    }

    #[test]
    fn rejects_zero_values() {
        assert!(matches!(
            GameConfig::from_toml_str("[timing]\ntick_ms = 0\n"),
            Err(ConfigError::ZeroInterval("timing.tick_ms"))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[[puzzles]]\nid = \"emoji\"\nseconds = 0\n"),
            Err(ConfigError::Sequence(SequenceError::ZeroBudget("emoji")))
        ));
    }

    #[test]
    fn rejects_unknown_puzzle_and_bad_syntax() {
        assert!(matches!(
            GameConfig::from_toml_str("[[puzzles]]\nid = \"sudoku\"\nseconds = 3\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[board\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn empty_frame_list_is_accepted() {
        let cfg = GameConfig::from_toml_str("[animation]\ndown = []\n").unwrap();
        assert!(cfg.animations.frames(Direction::Down).is_empty());
        assert_eq!(cfg.animations.frames(Direction::Up).len(), 2);
    }
}
