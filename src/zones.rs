//! Game zones (Deck, Hand, Field, Azoth row, Life cards, etc.)

use crate::core::{CardId, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Different zones where cards can exist
///
/// Every zone is per-player. `Flag` holds the Flag card revealed at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Deck,
    Hand,
    Field,
    CombatRow,
    AzothRow,
    LifeCards,
    Discard,
    RemovedFromPlay,
    Flag,
}

impl Zone {
    pub const ALL: [Zone; 9] = [
        Zone::Deck,
        Zone::Hand,
        Zone::Field,
        Zone::CombatRow,
        Zone::AzothRow,
        Zone::LifeCards,
        Zone::Discard,
        Zone::RemovedFromPlay,
        Zone::Flag,
    ];

    /// Zones whose cards are "in play" and keep runtime state
    pub fn is_in_play(&self) -> bool {
        matches!(self, Zone::Field | Zone::CombatRow | Zone::AzothRow)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Deck => "deck",
            Zone::Hand => "hand",
            Zone::Field => "field",
            Zone::CombatRow => "combat row",
            Zone::AzothRow => "azoth row",
            Zone::LifeCards => "life cards",
            Zone::Discard => "discard",
            Zone::RemovedFromPlay => "removed from play",
            Zone::Flag => "flag zone",
        };
        f.write_str(name)
    }
}

/// Where a card lands in an ordered zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Top,
    Bottom,
    SecondFromTop,
}

/// A zone containing cards (order matters for Deck and LifeCards)
///
/// The top of the zone is the end of the vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardZone {
    pub zone_type: Zone,
    pub owner: PlayerId,
    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(zone_type: Zone, owner: PlayerId) -> Self {
        CardZone {
            zone_type,
            owner,
            cards: Vec::new(),
        }
    }

    pub fn add(&mut self, card_id: CardId) {
        self.cards.push(card_id);
    }

    pub fn place(&mut self, card_id: CardId, placement: Placement) {
        match placement {
            Placement::Top => self.add(card_id),
            Placement::Bottom => self.add_to_bottom(card_id),
            Placement::SecondFromTop => self.add_second_from_top(card_id),
        }
    }

    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.cards.iter().position(|&id| id == card_id) {
            // remove() rather than swap_remove(): iteration order feeds the
            // decision engine and must stay stable for determinism.
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.iter().copied()
    }

    /// Take the top card
    pub fn draw_top(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    pub fn add_to_bottom(&mut self, card_id: CardId) {
        self.cards.insert(0, card_id);
    }

    /// Directly below the current top card (top if the zone is empty)
    pub fn add_second_from_top(&mut self, card_id: CardId) {
        let idx = self.cards.len().saturating_sub(1);
        self.cards.insert(idx, card_id);
    }

    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }
}

/// Collection of all zones for a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerZones {
    pub deck: CardZone,
    pub hand: CardZone,
    pub field: CardZone,
    pub combat_row: CardZone,
    pub azoth_row: CardZone,
    pub life_cards: CardZone,
    pub discard: CardZone,
    pub removed_from_play: CardZone,
    pub flag: CardZone,
}

impl PlayerZones {
    pub fn new(player_id: PlayerId) -> Self {
        PlayerZones {
            deck: CardZone::new(Zone::Deck, player_id),
            hand: CardZone::new(Zone::Hand, player_id),
            field: CardZone::new(Zone::Field, player_id),
            combat_row: CardZone::new(Zone::CombatRow, player_id),
            azoth_row: CardZone::new(Zone::AzothRow, player_id),
            life_cards: CardZone::new(Zone::LifeCards, player_id),
            discard: CardZone::new(Zone::Discard, player_id),
            removed_from_play: CardZone::new(Zone::RemovedFromPlay, player_id),
            flag: CardZone::new(Zone::Flag, player_id),
        }
    }

    pub fn get_zone(&self, zone: Zone) -> &CardZone {
        match zone {
            Zone::Deck => &self.deck,
            Zone::Hand => &self.hand,
            Zone::Field => &self.field,
            Zone::CombatRow => &self.combat_row,
            Zone::AzothRow => &self.azoth_row,
            Zone::LifeCards => &self.life_cards,
            Zone::Discard => &self.discard,
            Zone::RemovedFromPlay => &self.removed_from_play,
            Zone::Flag => &self.flag,
        }
    }

    pub fn get_zone_mut(&mut self, zone: Zone) -> &mut CardZone {
        match zone {
            Zone::Deck => &mut self.deck,
            Zone::Hand => &mut self.hand,
            Zone::Field => &mut self.field,
            Zone::CombatRow => &mut self.combat_row,
            Zone::AzothRow => &mut self.azoth_row,
            Zone::LifeCards => &mut self.life_cards,
            Zone::Discard => &mut self.discard,
            Zone::RemovedFromPlay => &mut self.removed_from_play,
            Zone::Flag => &mut self.flag,
        }
    }

    /// Which of this player's zones holds the card, if any
    pub fn locate(&self, card_id: CardId) -> Option<Zone> {
        Zone::ALL
            .into_iter()
            .find(|zone| self.get_zone(*zone).contains(card_id))
    }
}
