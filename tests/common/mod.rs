//! Test doubles for the platform collaborators.
#![allow(dead_code)]

use std::collections::VecDeque;

use space_invaders::config::GameConfig;
use space_invaders::error::{GameError, Result};
use space_invaders::input::{InputSource, InputState, Key, MouseButton};
use space_invaders::render::{
    Color, Renderer, Sprite, SpriteHandle, SpriteLoader, SpriteSet, Surface, ALIEN_SPRITE,
    SHIP_SPRITE, SHOT_SPRITE,
};
use space_invaders::world::World;

pub const SHIP: Sprite = Sprite { handle: SpriteHandle(0), width: 30.0, height: 22.0 };
pub const ALIEN: Sprite = Sprite { handle: SpriteHandle(1), width: 36.0, height: 26.0 };
pub const SHOT: Sprite = Sprite { handle: SpriteHandle(2), width: 8.0, height: 16.0 };

/// Width of one character as reported by `RecordingSurface::measure_text_width`.
pub const CHAR_WIDTH: f32 = 8.0;

// ── Sprites ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FixedSprites {
    /// Name that fails to load, to exercise startup failure.
    pub missing: Option<&'static str>,
}

impl SpriteLoader for FixedSprites {
    fn load(&mut self, name: &str) -> Result<Sprite> {
        if self.missing == Some(name) {
            return Err(GameError::MissingSprite(name.to_string()));
        }
        match name {
            SHIP_SPRITE => Ok(SHIP),
            ALIEN_SPRITE => Ok(ALIEN),
            SHOT_SPRITE => Ok(SHOT),
            other => Err(GameError::MissingSprite(other.to_string())),
        }
    }
}

pub fn sprites() -> SpriteSet {
    SpriteSet { ship: SHIP, alien: ALIEN, shot: SHOT }
}

pub fn world(level: u32) -> World {
    World::new(GameConfig::default(), sprites(), level)
}

pub fn world_with(config: GameConfig, level: u32) -> World {
    World::new(config, sprites(), level)
}

// ── Renderer ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    Sprite(SpriteHandle, f32, f32),
    Text(String, f32, f32, Color),
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Vec<DrawOp>>,
    pub titles: Vec<String>,
    pub presented: usize,
    pub released: usize,
}

impl RecordingRenderer {
    pub fn last_frame(&self) -> &[DrawOp] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_texts(&self) -> Vec<String> {
        self.last_frame()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(text, ..) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct RecordingSurface<'a> {
    renderer: &'a mut RecordingRenderer,
    ops: Vec<DrawOp>,
}

impl Surface for RecordingSurface<'_> {
    fn clear(&mut self, color: Color) -> Result<()> {
        self.ops.push(DrawOp::Clear(color));
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32) -> Result<()> {
        self.ops.push(DrawOp::Sprite(sprite.handle, x, y));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color) -> Result<()> {
        self.ops.push(DrawOp::Text(text.to_string(), x, y, color));
        Ok(())
    }

    fn measure_text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * CHAR_WIDTH
    }

    fn present(mut self) -> Result<()> {
        self.renderer.presented += 1;
        Ok(())
    }
}

impl Drop for RecordingSurface<'_> {
    fn drop(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.renderer.frames.push(ops);
        self.renderer.released += 1;
    }
}

impl Renderer for RecordingRenderer {
    type Frame<'a> = RecordingSurface<'a>;

    fn begin_frame(&mut self) -> Result<Self::Frame<'_>> {
        Ok(RecordingSurface { renderer: self, ops: Vec::new() })
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.titles.push(title.to_string());
        Ok(())
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
pub enum Ev {
    Down(Key),
    Up(Key),
    Typed(Key),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
}

/// Replays one batch of events per frame; frames with no batch get nothing.
#[derive(Default)]
pub struct ScriptedInput {
    batches: VecDeque<Vec<Ev>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, events: &[Ev]) -> Self {
        self.batches.push_back(events.to_vec());
        self
    }

    pub fn push(&mut self, events: &[Ev]) {
        self.batches.push_back(events.to_vec());
    }
}

impl InputSource for ScriptedInput {
    fn pump(&mut self, input: &mut InputState) -> Result<()> {
        for ev in self.batches.pop_front().unwrap_or_default() {
            match ev {
                Ev::Down(key) => input.key_down(key),
                Ev::Up(key) => input.key_up(key),
                Ev::Typed(key) => input.key_typed(key),
                Ev::MouseDown(button) => input.mouse_down(button),
                Ev::MouseUp(button) => input.mouse_up(button),
            }
        }
        Ok(())
    }
}
