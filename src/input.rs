//! Player intents, decoupled from raw platform events.
//!
//! The platform shell calls the `key_*` / `mouse_*` handlers as events arrive;
//! the game loop reads the booleans once per frame.  Handlers never touch the
//! world: requests that need it (start a game, quit) are latched here and
//! consumed by the loop.

use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Escape,
    Char(char),
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Anything that can feed platform events into an [`InputState`].
pub trait InputSource {
    /// Deliver every event that arrived since the last call.  Must not block.
    fn pump(&mut self, input: &mut InputState) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputState {
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
    pub fire_pressed: bool,
    pub fire2_pressed: bool,
    pub pause_pressed: bool,
    waiting_for_key_press: bool,
    /// A key went down after waiting began.  Typed events without one belong
    /// to a keystroke that was already in progress and do not count.
    armed: bool,
    /// The fire key has been released since it last fired.
    fire_key_released: bool,
    start_requested: bool,
    quit_requested: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            left_pressed: false,
            right_pressed: false,
            up_pressed: false,
            down_pressed: false,
            fire_pressed: false,
            fire2_pressed: false,
            pause_pressed: false,
            waiting_for_key_press: false,
            armed: false,
            fire_key_released: true,
            start_requested: false,
            quit_requested: false,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_waiting_for_key_press(&self) -> bool {
        self.waiting_for_key_press
    }

    pub fn enter_waiting(&mut self) {
        self.waiting_for_key_press = true;
        self.armed = false;
    }

    /// Clear the movement and fire intents.  `fire2` and pause survive, as
    /// they always have across a restart.
    pub fn reset_intents(&mut self) {
        self.left_pressed = false;
        self.right_pressed = false;
        self.up_pressed = false;
        self.down_pressed = false;
        self.fire_pressed = false;
    }

    /// Returns true once per "any key" that ended a waiting period.
    pub fn take_start_request(&mut self) -> bool {
        std::mem::take(&mut self.start_requested)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    // ── Keyboard ─────────────────────────────────────────────────────────────

    /// Directions are level-triggered; fire only activates on the
    /// released→pressed edge, so holding the key does not re-trigger it.
    /// While waiting, a press only arms the "any key" start; intents stay put.
    pub fn key_down(&mut self, key: Key) {
        if self.waiting_for_key_press {
            self.armed = true;
            return;
        }
        match key {
            Key::Left => self.left_pressed = true,
            Key::Right => self.right_pressed = true,
            Key::Up => self.up_pressed = true,
            Key::Down => self.down_pressed = true,
            Key::Fire => {
                if self.fire_key_released {
                    self.fire_pressed = true;
                }
                self.fire_key_released = false;
            }
            Key::Escape | Key::Char(_) | Key::Other => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.waiting_for_key_press {
            // Letting go of fire on the waiting screen still counts, or the
            // first press after the restart would be swallowed.
            if key == Key::Fire {
                self.fire_key_released = true;
            }
            return;
        }
        match key {
            Key::Left => self.left_pressed = false,
            Key::Right => self.right_pressed = false,
            Key::Up => self.up_pressed = false,
            Key::Down => self.down_pressed = false,
            Key::Fire => {
                self.fire_pressed = false;
                self.fire_key_released = true;
            }
            Key::Escape | Key::Char(_) | Key::Other => {}
        }
    }

    /// A complete press+release.  Drives pause, quit, and "press any key".
    pub fn key_typed(&mut self, key: Key) {
        if let Key::Char(c) = key {
            if c.eq_ignore_ascii_case(&'p') {
                self.pause_pressed = !self.pause_pressed;
                log::info!("pause {}", if self.pause_pressed { "on" } else { "off" });
            }
        }

        if self.waiting_for_key_press && self.armed {
            self.armed = false;
            self.waiting_for_key_press = false;
            self.start_requested = true;
        }

        if key == Key::Escape {
            log::info!("quit requested");
            self.quit_requested = true;
        }
    }

    // ── Mouse ────────────────────────────────────────────────────────────────

    pub fn mouse_down(&mut self, button: MouseButton) {
        if self.waiting_for_key_press {
            return;
        }
        match button {
            MouseButton::Left => self.fire_pressed = true,
            MouseButton::Right => self.fire2_pressed = true,
            MouseButton::Middle => {}
        }
    }

    /// Any button release cancels a pending primary shot.
    pub fn mouse_up(&mut self, _button: MouseButton) {
        if self.waiting_for_key_press {
            return;
        }
        self.fire_pressed = false;
    }
}
