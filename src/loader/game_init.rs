//! Game initialization from decks
//!
//! Creates games from deck lists and the card catalog

use crate::core::PlayerId;
use crate::game::{GameConfig, GameState};
use crate::loader::{CardCatalog, DeckList};
use crate::zones::Zone;
use crate::{EngineError, Result};

/// Game builder for initializing games from decks
pub struct GameInitializer<'a> {
    catalog: &'a CardCatalog,
}

impl<'a> GameInitializer<'a> {
    /// Create a new game initializer with a card catalog
    pub fn new(catalog: &'a CardCatalog) -> Self {
        GameInitializer { catalog }
    }

    /// Initialize a two-player game from two decks
    ///
    /// Every card starts in its owner's deck in list order; shuffling
    /// happens when the game leaves PreGame, after the caller seeds it.
    /// A main deck shorter than `config.min_deck_size` is rejected.
    pub fn init_game(
        &self,
        player1_name: String,
        player1_deck: &DeckList,
        player2_name: String,
        player2_deck: &DeckList,
        config: GameConfig,
    ) -> Result<GameState> {
        let mut game = GameState::with_config(player1_name, player2_name, config);

        let player1_id = game.players[0].id;
        let player2_id = game.players[1].id;

        self.load_deck_into_game(&mut game, player1_id, player1_deck)?;
        self.load_deck_into_game(&mut game, player2_id, player2_deck)?;

        Ok(game)
    }

    /// Load a deck into a player's deck zone
    fn load_deck_into_game(
        &self,
        game: &mut GameState,
        player_id: PlayerId,
        deck: &DeckList,
    ) -> Result<()> {
        let min = game.config.min_deck_size;
        for entry in &deck.main_deck {
            let card_def = self.catalog.get_card(&entry.card_name).ok_or_else(|| {
                EngineError::CardNotFound(format!(
                    "{} is not in the card catalog",
                    entry.card_name
                ))
            })?;

            for _ in 0..entry.count {
                let card_id = game.next_card_id();
                let card = card_def.instantiate(card_id, player_id);
                game.add_card(card, Zone::Deck)?;
            }
        }

        let total = deck.total_cards();
        if total < min {
            return Err(EngineError::InvalidDeckFormat(format!(
                "{}'s deck has {} cards; at least {} are required",
                game.player_name(player_id),
                total,
                min
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{DeckEntry, DeckLoader};

    const CARDS: &str = r#"[
        { "name": "Banner of Embers", "type": "flag", "cost": ["fire"] },
        { "name": "Ember Hound", "type": "familiar", "cost": ["fire", "1"], "strength": 2, "health": 2 },
        { "name": "Ember Lance", "type": "spell", "cost": ["fire"],
          "abilities": [{ "effect": "Deal X damage to opponent" }] }
    ]"#;

    #[test]
    fn test_init_simple_game() {
        let catalog = CardCatalog::from_json(CARDS).unwrap();
        let deck = DeckLoader::parse("1 Banner of Embers\n24 Ember Hound\n15 Ember Lance\n").unwrap();

        let initializer = GameInitializer::new(&catalog);
        let game = initializer
            .init_game(
                "Alice".to_string(),
                &deck,
                "Bob".to_string(),
                &deck,
                GameConfig::default(),
            )
            .unwrap();

        assert_eq!(game.players.len(), 2);
        for player in &game.players {
            assert_eq!(game.zone(player.id, Zone::Deck).unwrap().len(), 40);
        }
        assert_eq!(game.cards.len(), 80);
    }

    #[test]
    fn test_short_deck_is_rejected() {
        let catalog = CardCatalog::from_json(CARDS).unwrap();
        let short = DeckLoader::parse("1 Banner of Embers\n24 Ember Hound\n14 Ember Lance\n").unwrap();
        let full = DeckLoader::parse("1 Banner of Embers\n24 Ember Hound\n15 Ember Lance\n").unwrap();

        let result = GameInitializer::new(&catalog).init_game(
            "Alice".to_string(),
            &full,
            "Bob".to_string(),
            &short,
            GameConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidDeckFormat(ref msg)) if msg.contains("Bob's deck has 39 cards")));

        let relaxed = GameConfig {
            min_deck_size: 39,
            ..GameConfig::default()
        };
        assert!(GameInitializer::new(&catalog)
            .init_game("Alice".to_string(), &full, "Bob".to_string(), &short, relaxed)
            .is_ok());
    }

    #[test]
    fn test_missing_card_error() {
        let catalog = CardCatalog::new();
        let deck = DeckList {
            name: None,
            main_deck: vec![DeckEntry {
                card_name: "Nonexistent Card".to_string(),
                count: 1,
            }],
            sideboard: vec![],
        };

        let result = GameInitializer::new(&catalog).init_game(
            "Alice".to_string(),
            &deck,
            "Bob".to_string(),
            &deck,
            GameConfig::default(),
        );

        assert!(matches!(result, Err(EngineError::CardNotFound(_))));
    }
}
