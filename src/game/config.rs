//! Rule knobs for a game
//!
//! Defaults match the standard KONIVRER rules. A config can be loaded from
//! JSON; missing fields fall back to the defaults.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fewest cards a deck list may hold when a game is built from it
    pub min_deck_size: usize,
    /// Cards set aside as life at game start
    pub life_cards: usize,
    /// Cards each player draws when the game starts
    pub opening_draw: usize,
    /// Azoth placements allowed per player per turn
    pub azoth_per_turn: u8,
    /// Familiars a player may have on the field
    pub max_field_size: usize,
    /// Hand size enforced during Refresh (excess is discarded)
    pub max_hand_size: usize,
    /// Drawing from an empty deck loses the game
    pub deck_out_loses: bool,
    /// Turn cap used by the game loop before declaring a draw
    pub max_turns: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            min_deck_size: 40,
            life_cards: 4,
            opening_draw: 2,
            azoth_per_turn: 1,
            max_field_size: 5,
            max_hand_size: 7,
            deck_out_loses: true,
            max_turns: 200,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "life_cards": 6 }"#).unwrap();
        assert_eq!(config.life_cards, 6);
        assert_eq!(config.opening_draw, 2);
        assert_eq!(config.azoth_per_turn, 1);
        assert_eq!(config.min_deck_size, 40);
        assert!(config.deck_out_loses);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(GameConfig::from_json("{ life_cards: }").is_err());
    }
}
