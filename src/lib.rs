//! azoth-engine - a rules engine for the KONIVRER trading card game
//!
//! Cards are played by spending Azoth, elemental resources produced by
//! cards placed in the Azoth row. The engine validates and resolves every
//! play (Summon, Tribute, Azoth, Spell, Burst), the eight keywords, the
//! phase cycle and combat, and ships a rule-based decision engine that
//! can play either seat.

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod tournament;
pub mod zones;

pub use error::{EngineError, Result};
