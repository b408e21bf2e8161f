//! The live entity set and the level lifecycle.
//!
//! Entities are never removed while the entity list is being walked.  Anything
//! that dies is put in the pending-removal set and purged at one point in the
//! frame, [`World::purge_removed`].

use std::collections::HashSet;

use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Entity, EntityId, EntityKind, LogicOutcome, MoveOutcome, Reaction, ShotOwner};
use crate::error::Result;
use crate::input::InputState;
use crate::render::{SpriteSet, Surface};

/// Something the loop has to react to beyond the world itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    AlienKilled,
    /// The last alien died; carries the new level.  The world still holds the
    /// old entities until it is reset.
    LevelUp(u32),
    PlayerDied,
}

#[derive(Clone, Debug)]
pub struct World {
    config: GameConfig,
    sprites: SpriteSet,
    entities: Vec<Entity>,
    pending_removal: HashSet<EntityId>,
    next_id: u64,
    ship: Option<EntityId>,
    alien_count: u32,
    level: u32,
    last_fire: Option<u64>,
    logic_required: bool,
}

impl World {
    /// Build a world already populated for `level` (at least 1).
    pub fn new(config: GameConfig, sprites: SpriteSet, level: u32) -> Self {
        let mut world = Self {
            config,
            sprites,
            entities: Vec::new(),
            pending_removal: HashSet::new(),
            next_id: 0,
            ship: None,
            alien_count: 0,
            level: level.max(1),
            last_fire: None,
            logic_required: false,
        };
        world.start_game();
        world
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn ship(&self) -> Option<&Entity> {
        let id = self.ship?;
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn alien_count(&self) -> u32 {
        self.alien_count
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn pending_removal(&self) -> &HashSet<EntityId> {
        &self.pending_removal
    }

    pub fn logic_required(&self) -> bool {
        self.logic_required
    }

    pub fn last_fire(&self) -> Option<u64> {
        self.last_fire
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Throw away every entity and lay out a fresh ship plus `level` aliens.
    pub fn start_game(&mut self) {
        self.entities.clear();
        self.pending_removal.clear();
        self.logic_required = false;

        let id = self.alloc_id();
        let ship_cfg = &self.config.ship;
        let ship = Entity::ship(id, self.sprites.ship, ship_cfg.start_x, ship_cfg.start_y);
        self.ship = Some(id);
        self.entities.push(ship);

        self.alien_count = 0;
        for i in 0..self.level {
            let id = self.alloc_id();
            let aliens = &self.config.aliens;
            let x = aliens.first_x + i as f32 * aliens.spacing;
            let alien = Entity::alien(id, self.sprites.alien, x, aliens.row_y, aliens.move_speed);
            self.entities.push(alien);
            self.alien_count += 1;
        }
        log::info!("level {} started with {} aliens", self.level, self.alien_count);
    }

    /// Count one dead alien.  Returns true when that was the last one, in
    /// which case the level has already been bumped and the caller must reset.
    pub fn notify_alien_killed(&mut self) -> bool {
        self.alien_count = self.alien_count.saturating_sub(1);
        log::debug!("alien killed, {} left", self.alien_count);
        if self.alien_count == 0 {
            self.level += 1;
            log::info!("level up: {}", self.level);
            true
        } else {
            false
        }
    }

    /// Mark an entity for removal at the end of the collision pass.  Returns
    /// false if it was already marked.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        self.pending_removal.insert(id)
    }

    pub fn purge_removed(&mut self) {
        if self.pending_removal.is_empty() {
            return;
        }
        let pending = &self.pending_removal;
        self.entities.retain(|e| !pending.contains(&e.id()));
        if let Some(id) = self.ship {
            if pending.contains(&id) {
                self.ship = None;
            }
        }
        self.pending_removal.clear();
    }

    pub fn spawn_shot(&mut self, owner: ShotOwner, x: f32, y: f32) -> EntityId {
        let id = self.alloc_id();
        let shot = Entity::shot(id, owner, self.sprites.shot, x, y, self.config.shots.speed);
        self.entities.push(shot);
        id
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    // ── Firing ───────────────────────────────────────────────────────────────

    fn fire_ready(&self, now: u64) -> bool {
        match self.last_fire {
            Some(last) => now.saturating_sub(last) >= self.config.firing.interval_ms,
            None => true,
        }
    }

    /// Single shot from the ship's nose.  Rate limited by the firing interval.
    pub fn try_to_fire(&mut self, now: u64) -> bool {
        let Some((sx, sy)) = self.ship().map(|s| (s.x(), s.y())) else {
            return false;
        };
        if !self.fire_ready(now) {
            return false;
        }
        self.last_fire = Some(now);
        let (ox, oy) = self.config.shots.single_offset;
        self.spawn_shot(ShotOwner::Player, sx + ox, sy + oy);
        true
    }

    /// Two shots side by side.  Shares the rate limit with [`World::try_to_fire`].
    pub fn try_to_fire_dual(&mut self, now: u64) -> bool {
        let Some((sx, sy)) = self.ship().map(|s| (s.x(), s.y())) else {
            return false;
        };
        if !self.fire_ready(now) {
            return false;
        }
        self.last_fire = Some(now);
        let (left, right) = self.config.shots.dual_offsets_x;
        let oy = self.config.shots.dual_offset_y;
        self.spawn_shot(ShotOwner::Player, sx + left, sy + oy);
        self.spawn_shot(ShotOwner::Player, sx + right, sy + oy);
        true
    }

    /// Random return fire, scaled by elapsed time.  Returns the number of shots.
    pub fn spawn_alien_fire(&mut self, delta_ms: u64, rng: &mut impl Rng) -> usize {
        let rate = self.config.aliens.fire_rate;
        if rate <= 0.0 || delta_ms == 0 {
            return 0;
        }
        let chance = (rate * delta_ms as f64 / 1000.0).clamp(0.0, 1.0);
        let shot_width = self.sprites.shot.width;
        let muzzles: Vec<(f32, f32)> = self
            .entities
            .iter()
            .filter(|e| e.is_alien())
            .filter(|_| rng.gen_bool(chance))
            .map(|e| (e.x() + (e.sprite().width - shot_width) / 2.0, e.y() + e.sprite().height))
            .collect();
        for &(x, y) in &muzzles {
            self.spawn_shot(ShotOwner::Alien, x, y);
        }
        muzzles.len()
    }

    // ── Per-frame passes ─────────────────────────────────────────────────────

    pub fn move_entities(&mut self, delta_ms: u64) {
        let mut left_playfield = Vec::new();
        for entity in &mut self.entities {
            match entity.step(delta_ms, &self.config) {
                MoveOutcome::Moved => {}
                MoveOutcome::ReachedWall => self.logic_required = true,
                MoveOutcome::LeftPlayfield => left_playfield.push(entity.id()),
            }
        }
        for id in left_playfield {
            self.remove_entity(id);
        }
    }

    pub fn draw(&self, surface: &mut impl Surface) -> Result<()> {
        for entity in &self.entities {
            entity.draw(surface)?;
        }
        Ok(())
    }

    /// Brute-force all-pairs test over the current entity list.  Entities
    /// marked for removal earlier in the pass are still compared.
    pub fn check_collisions(&mut self) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        let n = self.entities.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.entities.split_at_mut(j);
                let (me, him) = (&mut head[i], &mut tail[0]);
                if !me.collides_with(him) {
                    continue;
                }
                let mine = me.collided_with(him);
                let his = him.collided_with(me);
                let (me_id, him_id) = (me.id(), him.id());
                self.apply_reaction(me_id, him_id, mine, &mut events);
                self.apply_reaction(him_id, me_id, his, &mut events);
            }
        }
        events
    }

    fn apply_reaction(&mut self, me: EntityId, other: EntityId, reaction: Reaction, events: &mut Vec<WorldEvent>) {
        match reaction {
            Reaction::None => {}
            Reaction::ShipDestroyed => {
                if self.remove_entity(me) {
                    events.push(WorldEvent::PlayerDied);
                }
            }
            Reaction::AlienShot => {
                self.remove_entity(me);
                // A second hit on an already-dead alien does not count again.
                if self.remove_entity(other) {
                    events.push(WorldEvent::AlienKilled);
                    if self.notify_alien_killed() {
                        events.push(WorldEvent::LevelUp(self.level));
                    }
                }
            }
        }
    }

    /// Run every entity's throttled logic if something asked for it this frame.
    pub fn run_logic(&mut self) -> Vec<WorldEvent> {
        if !self.logic_required {
            return Vec::new();
        }
        let mut events = Vec::new();
        for entity in &mut self.entities {
            if entity.do_logic(&self.config.aliens) == LogicOutcome::ReachedBottom
                && !events.contains(&WorldEvent::PlayerDied)
            {
                events.push(WorldEvent::PlayerDied);
            }
        }
        self.logic_required = false;
        events
    }

    /// Turn the held direction intents into ship velocity.  Opposing keys cancel.
    pub fn resolve_ship_velocity(&mut self, input: &InputState) {
        let speed = self.config.ship.move_speed;
        let Some(id) = self.ship else {
            return;
        };
        let Some(ship) = self.entities.iter_mut().find(|e| e.id() == id) else {
            return;
        };
        ship.dx = axis(input.left_pressed, input.right_pressed, speed);
        ship.dy = axis(input.up_pressed, input.down_pressed, speed);
    }

    pub fn aliens(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.kind() == EntityKind::Alien)
    }

    pub fn shots(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_shot())
    }
}

fn axis(negative: bool, positive: bool, speed: f32) -> f32 {
    match (negative, positive) {
        (true, false) => -speed,
        (false, true) => speed,
        _ => 0.0,
    }
}
