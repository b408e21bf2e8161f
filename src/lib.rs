//! Space Invaders core: entities, input intents, the world and the frame loop.
//!
//! Rendering, sprite loading, input delivery and time are supplied by the
//! caller through the traits in [`render`], [`input`] and [`timer`]; the
//! terminal front-end in `main.rs` is one such caller.

pub mod config;
pub mod entities;
pub mod error;
pub mod game;
pub mod input;
pub mod render;
pub mod timer;
pub mod world;

pub use config::GameConfig;
pub use error::{GameError, Result};
pub use game::{Game, GameState};
