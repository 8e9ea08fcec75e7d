//! Player representation

use crate::core::{CardId, EntityId, GameEntity, PlayerId, PlayerName};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Represents a player in the game
///
/// Zones live in `GameState::player_zones`; life is the size of the
/// LifeCards zone and the element pool is derived from the Azoth row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,

    /// Azoth placements made this turn
    pub azoth_played_this_turn: u8,

    /// Exactly one player is active at a time
    pub is_active: bool,

    /// Life cards revealed since the last phase advance; each may be played
    /// through Burst while it stays in the discard pile.
    pub burst_window: SmallVec<[CardId; 4]>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>) -> Self {
        Player {
            id,
            name: name.into(),
            azoth_played_this_turn: 0,
            is_active: false,
            burst_window: SmallVec::new(),
        }
    }

    pub fn has_played_azoth(&self) -> bool {
        self.azoth_played_this_turn > 0
    }

    pub fn can_place_azoth(&self, per_turn: u8) -> bool {
        self.azoth_played_this_turn < per_turn
    }

    pub fn record_azoth(&mut self) {
        self.azoth_played_this_turn += 1;
    }

    pub fn reset_azoth(&mut self) {
        self.azoth_played_this_turn = 0;
    }

    pub fn can_burst(&self, card_id: CardId) -> bool {
        self.burst_window.contains(&card_id)
    }
}

impl GameEntity for Player {
    fn id(&self) -> EntityId<Player> {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azoth_limit() {
        let mut player = Player::new(PlayerId::new(0), "Alice");
        assert!(!player.has_played_azoth());
        assert!(player.can_place_azoth(1));
        player.record_azoth();
        assert!(player.has_played_azoth());
        assert!(!player.can_place_azoth(1));
        player.reset_azoth();
        assert!(player.can_place_azoth(1));
    }
}
