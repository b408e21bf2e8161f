//! Terminal rendering — all terminal output lives here.
//!
//! The core draws in an 800×600 world; this module scales that onto whatever
//! size the terminal currently is and stands in glyphs for sprites.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Print},
    terminal, QueueableCommand,
};
use space_invaders::error::{GameError, Result};
use space_invaders::render::{
    Color, Renderer, Sprite, SpriteHandle, SpriteLoader, Surface, ALIEN_SPRITE, SHIP_SPRITE,
    SHOT_SPRITE,
};

// ── Glyph sprites ────────────────────────────────────────────────────────────

struct Glyph {
    text: &'static str,
    color: style::Color,
}

/// Built-in sprite table.  Sizes are in world units and define hit boxes.
const GLYPHS: &[(&str, &str, style::Color, f32, f32)] = &[
    (SHIP_SPRITE, "/▲\\", style::Color::White, 30.0, 22.0),
    (ALIEN_SPRITE, "«▼»", style::Color::Green, 36.0, 26.0),
    (SHOT_SPRITE, "║", style::Color::Cyan, 8.0, 16.0),
];

/// Resolves sprite names to glyphs.  Handed to the renderer once loading is done.
#[derive(Default)]
pub struct GlyphSheet {
    glyphs: Vec<Glyph>,
}

impl GlyphSheet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpriteLoader for GlyphSheet {
    fn load(&mut self, name: &str) -> Result<Sprite> {
        let &(_, text, color, width, height) = GLYPHS
            .iter()
            .find(|(n, ..)| *n == name)
            .ok_or_else(|| GameError::MissingSprite(name.to_string()))?;
        let handle = SpriteHandle(self.glyphs.len());
        self.glyphs.push(Glyph { text, color });
        Ok(Sprite { handle, width, height })
    }
}

fn term_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::White => style::Color::White,
        Color::Green => style::Color::Green,
        Color::Red => style::Color::Red,
        Color::Cyan => style::Color::Cyan,
        Color::Yellow => style::Color::Yellow,
    }
}

// ── Renderer ─────────────────────────────────────────────────────────────────

pub struct TerminalRenderer<W: Write> {
    out: W,
    sheet: GlyphSheet,
    world_width: f32,
    world_height: f32,
    cols: u16,
    rows: u16,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, sheet: GlyphSheet, world_width: f32, world_height: f32) -> Self {
        Self {
            out,
            sheet,
            world_width,
            world_height,
            cols: 80,
            rows: 24,
        }
    }

    /// World coordinates → terminal cell, or `None` when off screen.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = (x * self.cols as f32 / self.world_width).floor();
        let row = (y * self.rows as f32 / self.world_height).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            None
        } else {
            Some((col as u16, row as u16))
        }
    }

    fn print_at(&mut self, x: f32, y: f32, text: &str, color: style::Color) -> Result<()> {
        if let Some((col, row)) = self.cell(x, y) {
            self.out.queue(cursor::MoveTo(col, row))?;
            self.out.queue(style::SetForegroundColor(color))?;
            self.out.queue(Print(text))?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    type Frame<'a> = TerminalFrame<'a, W> where Self: 'a;

    fn begin_frame(&mut self) -> Result<Self::Frame<'_>> {
        let (cols, rows) = terminal::size()?;
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        Ok(TerminalFrame {
            renderer: self,
            presented: false,
        })
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.out.queue(terminal::SetTitle(title))?;
        Ok(())
    }
}

// ── Frame ────────────────────────────────────────────────────────────────────

/// One frame's drawing context.  Dropping it without presenting still resets
/// the terminal colours and flushes whatever was queued.
pub struct TerminalFrame<'a, W: Write> {
    renderer: &'a mut TerminalRenderer<W>,
    presented: bool,
}

impl<W: Write> Surface for TerminalFrame<'_, W> {
    fn clear(&mut self, color: Color) -> Result<()> {
        let out = &mut self.renderer.out;
        out.queue(style::SetBackgroundColor(term_color(color)))?;
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32) -> Result<()> {
        let glyph = self
            .renderer
            .sheet
            .glyphs
            .get(sprite.handle.0)
            .map(|g| (g.text, g.color))
            .ok_or_else(|| GameError::Render(format!("unknown sprite handle {}", sprite.handle.0)))?;
        self.renderer.print_at(x, y, glyph.0, glyph.1)
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color) -> Result<()> {
        self.renderer.print_at(x, y, text, term_color(color))
    }

    fn measure_text_width(&self, text: &str) -> f32 {
        let cell_width = self.renderer.world_width / self.renderer.cols as f32;
        text.chars().count() as f32 * cell_width
    }

    fn present(mut self) -> Result<()> {
        let park_row = self.renderer.rows.saturating_sub(1);
        let out = &mut self.renderer.out;
        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, park_row))?;
        out.flush()?;
        self.presented = true;
        Ok(())
    }
}

impl<W: Write> Drop for TerminalFrame<'_, W> {
    fn drop(&mut self) {
        if !self.presented {
            let _ = self.renderer.out.queue(style::ResetColor);
            let _ = self.renderer.out.flush();
        }
    }
}
