/// Gamepad input tracker using gilrs.
///
/// Fixed mapping:
///   D-pad / Left Stick    →  Movement (arrows inside a puzzle)
///   A (South)             →  Enter inside a puzzle
///   Start                 →  Pause / Resume
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::domain::entity::MoveDir;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held { self.just_pressed = true; }
        self.held = held;
    }
}

/// Up, Down, Left, Right.
const DIRS: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

fn dir_index(dir: MoveDir) -> usize {
    match dir {
        MoveDir::Up    => 0,
        MoveDir::Down  => 1,
        MoveDir::Left  => 2,
        MoveDir::Right => 3,
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    south: BtnState,
    start: BtnState,
    select: BtnState,

    /// A direction was held at the last release check.
    moving: bool,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(_) => (None, false),
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            south: BtnState::default(),
            start: BtnState::default(),
            select: BtnState::default(),
            moving: false,
            connected,
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.update_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let state = match btn {
            Button::DPadUp    => &mut self.dpad[dir_index(MoveDir::Up)],
            Button::DPadDown  => &mut self.dpad[dir_index(MoveDir::Down)],
            Button::DPadLeft  => &mut self.dpad[dir_index(MoveDir::Left)],
            Button::DPadRight => &mut self.dpad[dir_index(MoveDir::Right)],
            Button::South     => &mut self.south,
            Button::Start     => &mut self.start,
            Button::Select    => &mut self.select,
            _ => return,
        };
        state.set(held);
    }

    /// Derive digital stick directions from the analog axes.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn update_stick(&mut self) {
        self.stick[dir_index(MoveDir::Up)].set(self.stick_y > STICK_DEADZONE);
        self.stick[dir_index(MoveDir::Down)].set(self.stick_y < -STICK_DEADZONE);
        self.stick[dir_index(MoveDir::Left)].set(self.stick_x < -STICK_DEADZONE);
        self.stick[dir_index(MoveDir::Right)].set(self.stick_x > STICK_DEADZONE);
    }

    // ── Queries ──

    /// Directions newly pressed this frame (D-pad or stick), in Up/Down/Left/Right order.
    pub fn move_presses(&self) -> Vec<MoveDir> {
        DIRS.iter()
            .copied()
            .filter(|&d| {
                let i = dir_index(d);
                self.dpad[i].just_pressed || self.stick[i].just_pressed
            })
            .collect()
    }

    /// True once when the last held direction has been let go.
    pub fn take_release(&mut self) -> bool {
        let held = self.dpad.iter().chain(self.stick.iter()).any(|b| b.held);
        if held {
            self.moving = true;
            return false;
        }
        let released = self.moving;
        self.moving = false;
        released
    }

    pub fn confirm_pressed(&self) -> bool {
        self.south.just_pressed
    }

    pub fn pause_pressed(&self) -> bool {
        self.start.just_pressed
    }

    pub fn quit_pressed(&self) -> bool {
        self.select.just_pressed
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.dpad.iter_mut().chain(self.stick.iter_mut()) {
            b.just_pressed = false;
        }
        self.south.just_pressed = false;
        self.start.just_pressed = false;
        self.select.just_pressed = false;
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.dpad = [BtnState::default(); 4];
        self.stick = [BtnState::default(); 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
        self.south = BtnState::default();
        self.start = BtnState::default();
        self.select = BtnState::default();
    }
}
