//! Narrow interfaces to the platform shell.
//!
//! The core never touches a terminal or a window directly.  It asks a
//! [`Renderer`] for a frame, draws through the [`Surface`] it gets back, and
//! resolves sprite names through a [`SpriteLoader`].

use crate::error::Result;

pub const SHIP_SPRITE: &str = "sprites/ship.gif";
pub const ALIEN_SPRITE: &str = "sprites/alien.gif";
pub const SHOT_SPRITE: &str = "sprites/shot.gif";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
    Green,
    Red,
    Cyan,
    Yellow,
}

/// Opaque token the shell uses to find the pixels (or glyphs) of a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub usize);

/// A drawable handle plus the dimensions that define an entity's bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub handle: SpriteHandle,
    pub width: f32,
    pub height: f32,
}

pub trait SpriteLoader {
    /// Resolve `name` to a sprite.  Unknown names are an error, never a blank sprite.
    fn load(&mut self, name: &str) -> Result<Sprite>;
}

/// Drawing context for a single frame.
///
/// Implementations release the underlying context when dropped, so a frame
/// abandoned half-way through (an `?` on a failed draw) still cleans up.
pub trait Surface {
    fn clear(&mut self, color: Color) -> Result<()>;
    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32) -> Result<()>;
    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color) -> Result<()>;
    /// Width of `text` in world units.
    fn measure_text_width(&self, text: &str) -> f32;
    /// Flip the finished frame onto the screen.
    fn present(self) -> Result<()>
    where
        Self: Sized;
}

pub trait Renderer {
    type Frame<'a>: Surface
    where
        Self: 'a;

    fn begin_frame(&mut self) -> Result<Self::Frame<'_>>;
    fn set_title(&mut self, title: &str) -> Result<()>;
}

/// The three sprites the game needs, resolved once at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteSet {
    pub ship: Sprite,
    pub alien: Sprite,
    pub shot: Sprite,
}

impl SpriteSet {
    pub fn load(loader: &mut impl SpriteLoader) -> Result<Self> {
        Ok(Self {
            ship: loader.load(SHIP_SPRITE)?,
            alien: loader.load(ALIEN_SPRITE)?,
            shot: loader.load(SHOT_SPRITE)?,
        })
    }
}
