//! The frame loop.
//!
//! One iteration runs a fixed pipeline: pump input, time the frame, move,
//! draw, collide, purge, logic, overlays, present, steer the ship, fire,
//! sleep.  Everything happens on the calling thread.

use rand::Rng;

use crate::config::GameConfig;
use crate::error::Result;
use crate::input::{InputSource, InputState};
use crate::render::{Color, Renderer, SpriteLoader, SpriteSet, Surface};
use crate::timer::{Clock, FrameTimer};
use crate::world::{World, WorldEvent};

pub const DEATH_MESSAGE: &str = "Oh no! They got you, try again?";
pub const PRESS_ANY_KEY: &str = "Press any key";
pub const PAUSE_TEXT: &str = "Pause";

const MESSAGE_Y: f32 = 250.0;
const PROMPT_Y: f32 = 300.0;
const LEVEL_Y: f32 = 20.0;

// ── Game state ───────────────────────────────────────────────────────────────

/// Everything the loop mutates, gathered in one place and handed to the
/// subsystems by reference.
#[derive(Clone, Debug)]
pub struct GameState {
    pub world: World,
    pub input: InputState,
    /// Shown above "Press any key" while waiting.
    pub message: String,
}

impl GameState {
    pub fn new(world: World) -> Self {
        Self {
            world,
            input: InputState::new(),
            message: String::new(),
        }
    }

    pub fn start_game(&mut self) {
        self.world.start_game();
        self.input.reset_intents();
    }

    pub fn notify_death(&mut self) {
        log::info!("player died on level {}", self.world.level());
        self.message = DEATH_MESSAGE.to_string();
        self.input.enter_waiting();
    }

    /// Apply world events in order.  A level-up resets the world, so anything
    /// reported after it in the same batch refers to entities that are gone.
    pub fn handle_events(&mut self, events: &[WorldEvent]) {
        for event in events {
            match event {
                WorldEvent::AlienKilled => {}
                WorldEvent::LevelUp(_) => {
                    self.start_game();
                    break;
                }
                WorldEvent::PlayerDied => self.notify_death(),
            }
        }
    }

    /// Act on the fire intents.  A successful shot consumes its intent, so the
    /// player has to press again; a rate-limited attempt leaves it set.
    pub fn fire(&mut self, now: u64) {
        if self.input.fire_pressed && self.world.try_to_fire(now) {
            self.input.fire_pressed = false;
        }
        if self.input.fire2_pressed && self.world.try_to_fire_dual(now) {
            self.input.fire2_pressed = false;
        }
    }

    fn is_active(&self) -> bool {
        !self.input.is_waiting_for_key_press() && !self.input.pause_pressed
    }
}

// ── Loop driver ──────────────────────────────────────────────────────────────

pub struct Game<C: Clock, R: Rng> {
    state: GameState,
    clock: C,
    rng: R,
    timer: FrameTimer,
    running: bool,
    title: String,
    frame_ms: u64,
    width: f32,
}

impl<C: Clock, R: Rng> Game<C, R> {
    /// Resolve sprites and lay out the first level.  The game opens on the
    /// "press any key" screen.
    pub fn new(
        config: GameConfig,
        loader: &mut impl SpriteLoader,
        clock: C,
        rng: R,
        start_level: u32,
    ) -> Result<Self> {
        config.validate()?;
        let sprites = SpriteSet::load(loader)?;
        let timer = FrameTimer::new(clock.now_ms(), config.timing.fps_window_ms);
        let title = config.window.title.clone();
        let frame_ms = config.timing.frame_ms;
        let width = config.window.width;

        let mut state = GameState::new(World::new(config, sprites, start_level));
        state.input.enter_waiting();

        Ok(Self {
            state,
            clock,
            rng,
            timer,
            running: true,
            title,
            frame_ms,
            width,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn run(&mut self, input: &mut impl InputSource, renderer: &mut impl Renderer) -> Result<()> {
        log::info!("game loop started");
        while self.running {
            self.frame(input, renderer)?;
        }
        log::info!("game loop stopped");
        Ok(())
    }

    /// One loop iteration.
    pub fn frame(&mut self, input: &mut impl InputSource, renderer: &mut impl Renderer) -> Result<()> {
        input.pump(&mut self.state.input)?;
        if self.state.input.quit_requested() {
            self.running = false;
            return Ok(());
        }
        if self.state.input.take_start_request() {
            log::info!("starting level {}", self.state.world.level());
            self.state.start_game();
        }

        let delta = self.timer.begin(self.clock.now_ms());
        if let Some(fps) = self.timer.record_frame(delta) {
            log::debug!("fps: {fps}");
            renderer.set_title(&format!("{} (FPS: {})", self.title, fps))?;
        }

        self.update_and_draw(renderer, delta)?;

        self.state.world.resolve_ship_velocity(&self.state.input);
        self.state.fire(self.clock.now_ms());

        self.timer.pace(&self.clock, self.frame_ms);
        Ok(())
    }

    /// Everything between acquiring and presenting the frame.  The surface is
    /// dropped on every path out of here, presented or not.
    fn update_and_draw(&mut self, renderer: &mut impl Renderer, delta: u64) -> Result<()> {
        let mut surface = renderer.begin_frame()?;
        surface.clear(Color::Black)?;

        if self.state.is_active() {
            self.state.world.move_entities(delta);
            self.state.world.spawn_alien_fire(delta, &mut self.rng);
        }

        self.state.world.draw(&mut surface)?;

        let events = self.state.world.check_collisions();
        self.state.handle_events(&events);
        self.state.world.purge_removed();

        let events = self.state.world.run_logic();
        self.state.handle_events(&events);

        self.draw_overlays(&mut surface)?;
        surface.present()
    }

    fn draw_overlays(&self, surface: &mut impl Surface) -> Result<()> {
        if self.state.input.is_waiting_for_key_press() {
            if !self.state.message.is_empty() {
                self.draw_centered(surface, &self.state.message, MESSAGE_Y)?;
            }
            self.draw_centered(surface, PRESS_ANY_KEY, PROMPT_Y)?;
        }
        if self.state.input.pause_pressed {
            self.draw_centered(surface, PAUSE_TEXT, PROMPT_Y)?;
        }
        let level = format!("Level {}", self.state.world.level());
        self.draw_centered(surface, &level, LEVEL_Y)
    }

    fn draw_centered(&self, surface: &mut impl Surface, text: &str, y: f32) -> Result<()> {
        let x = (self.width - surface.measure_text_width(text)) / 2.0;
        surface.draw_text(text, x, y, Color::White)
    }
}
