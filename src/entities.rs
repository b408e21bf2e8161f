//! Game entities: the ship, the aliens and the shots.
//!
//! All three share one struct; the variant lives in [`EntityKind`].  Collision
//! reactions are a single table keyed on the pair of kinds (see [`reaction`]).

use crate::config::{AlienConfig, GameConfig};
use crate::error::Result;
use crate::render::{Sprite, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotOwner {
    Player,
    Alien,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Ship,
    Alien,
    /// `spent` is set once the shot has killed something; a spent shot is
    /// inert for the rest of the frame even though it has not been purged yet.
    Shot { owner: ShotOwner, spent: bool },
}

// ── Bounding boxes ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Closed-interval overlap test: boxes that only share an edge intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}

// ── Per-variant results ──────────────────────────────────────────────────────

/// What happened to an entity during its per-frame move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// An alien touched a lateral bound; the wave must turn on the next logic pass.
    ReachedWall,
    /// A shot flew out of the playfield and should be removed.
    LeftPlayfield,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicOutcome {
    Nothing,
    /// An alien descended past the bottom limit.
    ReachedBottom,
}

/// Effect of `me` colliding with `other`, seen from `me`'s side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    None,
    /// The ship was struck by an alien or an alien shot.
    ShipDestroyed,
    /// A live player shot hit an alien: both go, and the kill is counted.
    AlienShot,
}

/// The collision table.  Every pair of kinds is spelled out so that adding a
/// variant forces a decision here.
pub fn reaction(me: &Entity, other: &Entity) -> Reaction {
    use EntityKind::{Alien, Ship, Shot};

    match (me.kind, other.kind) {
        (Ship, Alien) => Reaction::ShipDestroyed,
        (Ship, Shot { owner: ShotOwner::Alien, .. }) => Reaction::ShipDestroyed,
        (Ship, Shot { owner: ShotOwner::Player, .. }) => Reaction::None,
        (Ship, Ship) => Reaction::None,

        (Alien, _) => Reaction::None,

        (Shot { owner: ShotOwner::Player, spent: false }, Alien) => Reaction::AlienShot,
        (Shot { owner: ShotOwner::Player, spent: true }, Alien) => Reaction::None,
        (Shot { owner: ShotOwner::Alien, .. }, Alien) => Reaction::None,
        (Shot { .. }, Ship) => Reaction::None,
        (Shot { .. }, Shot { .. }) => Reaction::None,
    }
}

// ── Entity ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    x: f32,
    y: f32,
    /// Horizontal velocity in units per second.
    pub dx: f32,
    /// Vertical velocity in units per second.
    pub dy: f32,
    sprite: Sprite,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, sprite: Sprite, x: f32, y: f32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            sprite,
        }
    }

    pub fn ship(id: EntityId, sprite: Sprite, x: f32, y: f32) -> Self {
        Self::new(id, EntityKind::Ship, sprite, x, y)
    }

    /// Aliens start off drifting left.
    pub fn alien(id: EntityId, sprite: Sprite, x: f32, y: f32, speed: f32) -> Self {
        Self {
            dx: -speed,
            ..Self::new(id, EntityKind::Alien, sprite, x, y)
        }
    }

    /// Player shots travel up, alien shots travel down.
    pub fn shot(id: EntityId, owner: ShotOwner, sprite: Sprite, x: f32, y: f32, speed: f32) -> Self {
        let dy = match owner {
            ShotOwner::Player => -speed,
            ShotOwner::Alien => speed,
        };
        Self {
            dy,
            ..Self::new(id, EntityKind::Shot { owner, spent: false }, sprite, x, y)
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn is_alien(&self) -> bool {
        self.kind == EntityKind::Alien
    }

    pub fn is_shot(&self) -> bool {
        matches!(self.kind, EntityKind::Shot { .. })
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.sprite.width,
            height: self.sprite.height,
        }
    }

    /// Base movement: `position += velocity * delta / 1000`.
    pub fn advance(&mut self, delta_ms: u64) {
        let secs = delta_ms as f32 / 1000.0;
        self.x += self.dx * secs;
        self.y += self.dy * secs;
    }

    /// Variant-aware movement for one frame.
    pub fn step(&mut self, delta_ms: u64, config: &GameConfig) -> MoveOutcome {
        match self.kind {
            EntityKind::Ship => {
                let ship = &config.ship;
                let (dx, dy) = (self.dx, self.dy);
                // Pushing against a bound stops that axis only.
                if (dx < 0.0 && self.x < ship.left_bound) || (dx > 0.0 && self.x > ship.right_bound) {
                    self.dx = 0.0;
                }
                if (dy < 0.0 && self.y < ship.top_bound) || (dy > 0.0 && self.y > ship.bottom_bound) {
                    self.dy = 0.0;
                }
                self.advance(delta_ms);
                self.dx = dx;
                self.dy = dy;
                MoveOutcome::Moved
            }
            EntityKind::Alien => {
                let aliens = &config.aliens;
                let at_wall = (self.dx < 0.0 && self.x < aliens.left_bound)
                    || (self.dx > 0.0 && self.x > aliens.right_bound);
                self.advance(delta_ms);
                if at_wall {
                    MoveOutcome::ReachedWall
                } else {
                    MoveOutcome::Moved
                }
            }
            EntityKind::Shot { owner, .. } => {
                self.advance(delta_ms);
                let margin = config.shots.despawn_margin;
                let gone = match owner {
                    ShotOwner::Player => self.y < -margin,
                    ShotOwner::Alien => self.y > config.window.height + margin,
                };
                if gone {
                    MoveOutcome::LeftPlayfield
                } else {
                    MoveOutcome::Moved
                }
            }
        }
    }

    /// Throttled behaviour.  Only aliens have any: turn around and drop a row.
    pub fn do_logic(&mut self, aliens: &AlienConfig) -> LogicOutcome {
        if self.kind != EntityKind::Alien {
            return LogicOutcome::Nothing;
        }
        self.dx = -self.dx;
        self.y += aliens.descent_step;
        if self.y > aliens.bottom_limit {
            LogicOutcome::ReachedBottom
        } else {
            LogicOutcome::Nothing
        }
    }

    /// Bounding boxes overlap and `other` is a different entity.
    pub fn collides_with(&self, other: &Entity) -> bool {
        self.id != other.id && self.bounds().intersects(&other.bounds())
    }

    /// React to a collision with `other`.  Local state (a shot becoming spent)
    /// is updated here; world-level effects are left to the caller.
    pub fn collided_with(&mut self, other: &Entity) -> Reaction {
        let r = reaction(self, other);
        if r == Reaction::AlienShot {
            if let EntityKind::Shot { owner, .. } = self.kind {
                self.kind = EntityKind::Shot { owner, spent: true };
            }
        }
        r
    }

    pub fn draw(&self, surface: &mut impl Surface) -> Result<()> {
        surface.draw_sprite(&self.sprite, self.x, self.y)
    }
}
