//! Main game state structure

use crate::core::{Card, CardId, EntityId, EntityStore, Player, PlayerId};
use crate::game::{CombatState, GameConfig, GameLogger, PendingSelection, Phase, TurnStructure};
use crate::zones::{CardZone, Placement, PlayerZones, Zone};
use crate::{EngineError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEndReason {
    /// The loser took damage with no life cards left
    LifeCardsExhausted(PlayerId),
    /// The loser had to draw from an empty deck
    DeckedOut(PlayerId),
    /// The loser conceded
    Conceded(PlayerId),
    /// The game loop hit its turn cap with no winner
    TurnLimit,
}

/// Complete game state
///
/// This is the central value every command reads and mutates. It is
/// cloned to checkpoint a command, so a rejected command restores it exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// All cards in the game; cards are never removed
    pub cards: EntityStore<Card>,

    /// The two players, in turn order
    pub players: Vec<Player>,

    /// Zones for each player
    pub player_zones: Vec<(PlayerId, PlayerZones)>,

    pub turn: TurnStructure,

    /// Combat state (active during the combat phase)
    pub combat: CombatState,

    /// Keyword selection waiting for the caller
    pub pending: Option<PendingSelection>,

    pub game_over: bool,
    pub winner: Option<PlayerId>,
    pub end_reason: Option<GameEndReason>,

    pub config: GameConfig,

    /// Random number generator for shuffles (serializable for deterministic replay)
    pub rng: ChaCha12Rng,

    /// Unified entity ID generator (shared across all entity types)
    next_entity_id: u32,

    /// Counter for pending-selection tokens
    next_token: u32,

    /// The game log
    pub logger: GameLogger,
}

impl GameState {
    /// Create a new game with two players and default rules
    pub fn new_two_player(player1_name: String, player2_name: String) -> Self {
        Self::with_config(player1_name, player2_name, GameConfig::default())
    }

    pub fn with_config(player1_name: String, player2_name: String, config: GameConfig) -> Self {
        let p1_id = PlayerId::new(0);
        let p2_id = PlayerId::new(1);

        let mut player1 = Player::new(p1_id, player1_name);
        player1.is_active = true;
        let player2 = Player::new(p2_id, player2_name);

        GameState {
            cards: EntityStore::new(),
            players: vec![player1, player2],
            player_zones: vec![(p1_id, PlayerZones::new(p1_id)), (p2_id, PlayerZones::new(p2_id))],
            turn: TurnStructure::new(p1_id),
            combat: CombatState::new(),
            pending: None,
            game_over: false,
            winner: None,
            end_reason: None,
            config,
            rng: ChaCha12Rng::seed_from_u64(0),
            next_entity_id: 2,
            next_token: 1,
            logger: GameLogger::new(),
        }
    }

    /// Set the RNG seed for deterministic gameplay
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    /// Get next entity ID (unified across all entity types)
    pub fn next_id<T>(&mut self) -> EntityId<T> {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn next_card_id(&mut self) -> CardId {
        self.next_id()
    }

    pub(crate) fn next_token(&mut self) -> u32 {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    /// Register a card and put it on top of one of its owner's zones
    pub fn add_card(&mut self, card: Card, zone: Zone) -> Result<CardId> {
        let id = card.id;
        let owner = card.owner;
        self.cards.insert(id, card);
        self.get_player_zones_mut(owner)?.get_zone_mut(zone).add(id);
        Ok(id)
    }

    /// An owned copy of the whole state for callers that render it
    pub fn snapshot(&self) -> GameState {
        self.clone()
    }

    /// The append-only game log
    pub fn game_log(&self) -> impl Iterator<Item = &str> {
        self.logger.messages()
    }

    pub(crate) fn log(&mut self, message: impl Into<String>) {
        self.logger.normal(message);
    }

    // ----- players -----

    pub fn get_player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(EngineError::EntityNotFound(id.as_u32()))
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::EntityNotFound(id.as_u32()))
    }

    pub fn get_player_idx(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    /// The other player of a two-player game
    pub fn opponent_of(&self, player_id: PlayerId) -> Result<PlayerId> {
        self.players
            .iter()
            .find(|p| p.id != player_id)
            .map(|p| p.id)
            .ok_or(EngineError::EntityNotFound(player_id.as_u32()))
    }

    pub fn player_name(&self, id: PlayerId) -> String {
        self.get_player(id)
            .map(|p| p.name.to_string())
            .unwrap_or_else(|_| format!("player {id}"))
    }

    pub fn card_name(&self, id: CardId) -> String {
        self.cards
            .get(id)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|_| format!("card {id}"))
    }

    /// Life total: the number of life cards left
    pub fn life_points(&self, player_id: PlayerId) -> usize {
        self.get_player_zones(player_id)
            .map(|z| z.life_cards.len())
            .unwrap_or(0)
    }

    // ----- zones -----

    pub fn get_player_zones(&self, player_id: PlayerId) -> Result<&PlayerZones> {
        self.player_zones
            .iter()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
            .ok_or(EngineError::EntityNotFound(player_id.as_u32()))
    }

    pub fn get_player_zones_mut(&mut self, player_id: PlayerId) -> Result<&mut PlayerZones> {
        self.player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
            .ok_or(EngineError::EntityNotFound(player_id.as_u32()))
    }

    pub fn zone(&self, player_id: PlayerId, zone: Zone) -> Result<&CardZone> {
        Ok(self.get_player_zones(player_id)?.get_zone(zone))
    }

    /// Ordered copy of a zone's cards, for iterating while mutating state
    pub fn zone_cards(&self, player_id: PlayerId, zone: Zone) -> Vec<CardId> {
        self.zone(player_id, zone)
            .map(|z| z.cards.clone())
            .unwrap_or_default()
    }

    /// Owner and zone currently holding a card
    pub fn locate_card(&self, card_id: CardId) -> Option<(PlayerId, Zone)> {
        let owner = self.cards.get(card_id).ok()?.owner;
        let zone = self.get_player_zones(owner).ok()?.locate(card_id)?;
        Some((owner, zone))
    }

    pub fn is_in_zone(&self, card_id: CardId, player_id: PlayerId, zone: Zone) -> bool {
        self.zone(player_id, zone)
            .map(|z| z.contains(card_id))
            .unwrap_or(false)
    }

    /// Move a card between two of its owner's zones, onto the top
    pub fn move_card(&mut self, card_id: CardId, from: Zone, to: Zone, owner: PlayerId) -> Result<()> {
        self.move_card_to(card_id, from, to, owner, Placement::Top)
    }

    /// Move a card between two of its owner's zones
    ///
    /// This is the only way zone membership changes. Leaving play clears
    /// the card's runtime state.
    pub fn move_card_to(
        &mut self,
        card_id: CardId,
        from: Zone,
        to: Zone,
        owner: PlayerId,
        placement: Placement,
    ) -> Result<()> {
        let zones = self.get_player_zones_mut(owner)?;
        if !zones.get_zone_mut(from).remove(card_id) {
            return Err(EngineError::CardNotFound(format!(
                "card {card_id} is not in {from}"
            )));
        }
        zones.get_zone_mut(to).place(card_id, placement);

        if from.is_in_play() && !to.is_in_play() {
            self.cards.get_mut(card_id)?.reset_runtime();
        }
        Ok(())
    }

    /// Draw the top card of a player's deck into their hand
    ///
    /// Returns `None` when the deck is empty; deck-out is decided by the caller.
    pub fn draw_card(&mut self, player_id: PlayerId) -> Result<Option<CardId>> {
        let zones = self.get_player_zones_mut(player_id)?;
        let Some(card_id) = zones.deck.draw_top() else {
            return Ok(None);
        };
        zones.hand.add(card_id);
        let message = format!(
            "{} draws {}",
            self.player_name(player_id),
            self.card_name(card_id)
        );
        self.log(message);
        Ok(Some(card_id))
    }

    // ----- life -----

    /// Deal damage to a player: one life card revealed per point
    ///
    /// Revealed cards go to the discard pile and become Burst-eligible, so
    /// a player knocked down to zero life cards can still Burst the last
    /// one. The player loses only when damage arrives with no life cards
    /// left. Returns the number of life cards lost.
    pub fn damage_player(&mut self, player_id: PlayerId, amount: u32) -> Result<u32> {
        if amount == 0 {
            return Ok(0);
        }
        if self.life_points(player_id) == 0 {
            if self.turn.phase != Phase::PreGame {
                let message = format!(
                    "{} takes {} damage with no life cards left",
                    self.player_name(player_id),
                    amount
                );
                self.log(message);
                self.end_game(player_id, GameEndReason::LifeCardsExhausted(player_id))?;
            }
            return Ok(0);
        }

        let mut revealed = 0;
        for _ in 0..amount {
            let Some(card_id) = self.get_player_zones_mut(player_id)?.life_cards.draw_top() else {
                break;
            };
            self.get_player_zones_mut(player_id)?.discard.add(card_id);
            self.get_player_mut(player_id)?.burst_window.push(card_id);
            revealed += 1;
            let message = format!(
                "{} reveals {} from life cards",
                self.player_name(player_id),
                self.card_name(card_id)
            );
            self.log(message);
        }
        let message = format!(
            "{} takes {} damage ({} life cards left)",
            self.player_name(player_id),
            revealed,
            self.life_points(player_id)
        );
        self.log(message);
        Ok(revealed)
    }

    /// Heal a player: move cards from the top of the deck onto the life cards
    pub fn heal_player(&mut self, player_id: PlayerId, amount: u32) -> Result<u32> {
        let mut healed = 0;
        for _ in 0..amount {
            let zones = self.get_player_zones_mut(player_id)?;
            let Some(card_id) = zones.deck.draw_top() else {
                break;
            };
            zones.life_cards.add(card_id);
            healed += 1;
        }
        if healed > 0 {
            let message = format!(
                "{} heals {} ({} life cards)",
                self.player_name(player_id),
                healed,
                self.life_points(player_id)
            );
            self.log(message);
        }
        Ok(healed)
    }

    // ----- win condition -----

    /// Record a loss and end the game; later losses are ignored
    pub fn end_game(&mut self, loser: PlayerId, reason: GameEndReason) -> Result<()> {
        if self.game_over {
            return Ok(());
        }
        let winner = self.opponent_of(loser)?;
        self.game_over = true;
        self.winner = Some(winner);
        self.end_reason = Some(reason);
        self.pending = None;
        let message = format!("{} wins the game", self.player_name(winner));
        self.logger.minimal(message);
        Ok(())
    }
}
