//! Phase cycle tests: game setup, turn rotation, Start and Refresh

mod common;

use azoth_engine::core::{Card, CardKind, CombatAbility, Element, PlayerId};
use azoth_engine::game::{GameEndReason, GameState, Phase};
use azoth_engine::zones::Zone;
use azoth_engine::EngineError;
use common::{cost, Table};
use similar_asserts::assert_eq;

/// A game still in PRE_GAME with `cards_each` Familiars and one Flag per deck
fn pregame(cards_each: usize) -> GameState {
    let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
    game.seed_rng(11);
    for idx in 0..2 {
        let owner = game.players[idx].id;
        let id = game.next_card_id();
        game.add_card(Card::new(id, format!("Banner {idx}"), CardKind::Flag, owner), Zone::Deck)
            .unwrap();
        for n in 0..cards_each {
            let id = game.next_card_id();
            let kind = CardKind::Familiar {
                base_strength: 1,
                base_health: 1,
            };
            game.add_card(Card::new(id, format!("Sprite {n}"), kind, owner), Zone::Deck)
                .unwrap();
        }
    }
    game
}

fn advance_through(game: &mut GameState, player: PlayerId, phases: &[Phase]) {
    for phase in phases {
        game.advance_phase(player, *phase).unwrap();
    }
}

#[test]
fn test_leaving_pregame_sets_up_both_players() {
    let mut game = pregame(12);
    let p1 = game.players[0].id;
    let p2 = game.players[1].id;

    game.advance_phase(p1, Phase::Start).unwrap();

    for player in [p1, p2] {
        assert_eq!(game.life_points(player), 4);
        assert_eq!(game.zone(player, Zone::Flag).unwrap().len(), 1);
    }
    // The first player skips the turn 1 draw
    assert_eq!(game.zone(p1, Zone::Hand).unwrap().len(), 2);
    assert_eq!(game.zone(p2, Zone::Hand).unwrap().len(), 2);
    assert_eq!(game.zone(p1, Zone::Deck).unwrap().len(), 13 - 1 - 4 - 2);
    assert!(game.game_log().any(|line| line == "Game started: Alice vs Bob"));
    assert!(game.game_log().any(|line| line == "Turn 1, Alice: START"));
    assert!(game.game_log().any(|line| line == "Alice reveals Banner 0 as their Flag"));
}

#[test]
fn test_setup_is_deterministic_for_a_seed() {
    let mut first = pregame(12);
    let mut second = pregame(12);
    let p1 = first.players[0].id;
    first.advance_phase(p1, Phase::Start).unwrap();
    second.advance_phase(p1, Phase::Start).unwrap();

    let log_a: Vec<&str> = first.game_log().collect();
    let log_b: Vec<&str> = second.game_log().collect();
    assert_eq!(log_a, log_b);
    assert_eq!(
        first.zone(p1, Zone::LifeCards).unwrap().cards,
        second.zone(p1, Zone::LifeCards).unwrap().cards
    );
}

#[test]
fn test_only_active_player_advances_to_successor() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);

    let err = t.game.advance_phase(p1, Phase::Refresh).unwrap_err();
    assert!(matches!(err, EngineError::InvalidPhase(_)));
    assert!(t
        .last_log()
        .starts_with("Alice: Invalid phase: cannot go from MAIN to REFRESH"));

    assert!(matches!(
        t.game.advance_phase(p2, Phase::Combat),
        Err(EngineError::InvalidPhase(_))
    ));
    assert_eq!(t.game.turn.phase, Phase::Main);
}

#[test]
fn test_turn_passes_after_refresh() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);

    advance_through(
        &mut t.game,
        p1,
        &[Phase::Combat, Phase::PostCombatMain, Phase::Refresh],
    );
    assert_eq!(t.game.active_player(), p1);

    let outcome = t.game.advance_phase(p1, Phase::Start).unwrap();
    assert_eq!(t.game.active_player(), p2);
    assert_eq!(t.game.turn.turn_number, 1);
    assert_eq!(
        outcome.log,
        vec![
            "Turn 1, Bob: START".to_string(),
            "Bob draws Deck Sprite 5".to_string(),
        ]
    );
    assert!(t.game.players[1].is_active);
    assert!(!t.game.players[0].is_active);

    // Bob's rotation wraps back to Alice on turn 2
    advance_through(
        &mut t.game,
        p2,
        &[
            Phase::Main,
            Phase::Combat,
            Phase::PostCombatMain,
            Phase::Refresh,
            Phase::Start,
        ],
    );
    assert_eq!(t.game.active_player(), p1);
    assert_eq!(t.game.turn.turn_number, 2);
}

#[test]
fn test_start_clears_sickness_and_azoth_limit() {
    let mut t = Table::new();
    let p1 = t.p1;
    let hound = t.familiar(p1, "Ember Hound", 2, 2, cost(&[]), Zone::Hand);
    let stone = t.familiar(p1, "Fire Azoth", 0, 1, cost(&[(Element::Fire, 1)]), Zone::Hand);
    t.game.play_summon(p1, hound, 0).unwrap();
    t.game.play_azoth(p1, stone, Element::Fire).unwrap();
    assert!(t.game.cards.get(hound).unwrap().summoning_sick);
    assert!(t.game.players[0].has_played_azoth());

    t.game.turn.phase = Phase::Refresh;
    t.game.turn.active_player_idx = 1;
    t.game.turn.active_player = t.p2;
    // Bob's Refresh hands the turn back to Alice
    t.game.advance_phase(t.p2, Phase::Start).unwrap();

    assert_eq!(t.game.active_player(), p1);
    assert!(!t.game.cards.get(hound).unwrap().summoning_sick);
    assert!(!t.game.players[0].has_played_azoth());
}

#[test]
fn test_refresh_readies_active_player_and_clears_damage() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);
    let mine = t.familiar_with(p1, "Tide Warden", (1, 3), cost(&[]), &[], &[CombatAbility::Shield], Zone::Field);
    let theirs = t.familiar(p2, "Reef Leech", 1, 3, cost(&[]), Zone::Field);
    let stone = t.azoth(p1, Element::Water);
    {
        let card = t.game.cards.get_mut(mine).unwrap();
        card.tapped = true;
        card.damage = 2;
        card.shield_up = false;
        card.strength_modifier = 2;
    }
    t.game.cards.get_mut(stone).unwrap().rest();
    {
        let card = t.game.cards.get_mut(theirs).unwrap();
        card.tapped = true;
        card.damage = 1;
    }

    advance_through(
        &mut t.game,
        p1,
        &[Phase::Combat, Phase::PostCombatMain, Phase::Refresh],
    );

    let card = t.game.cards.get(mine).unwrap();
    assert!(!card.tapped);
    assert_eq!(card.damage, 0);
    assert_eq!(card.strength(), 1);
    assert!(card.shield_up);
    assert!(!t.game.cards.get(stone).unwrap().rested);

    // The other player's cards lose damage but stay tapped
    let card = t.game.cards.get(theirs).unwrap();
    assert!(card.tapped);
    assert_eq!(card.damage, 0);
}

#[test]
fn test_refresh_enforces_hand_limit() {
    let mut t = Table::new();
    let p1 = t.p1;
    t.game.config.max_hand_size = 2;
    let hand: Vec<_> = (0..4)
        .map(|n| t.familiar(p1, &format!("Held {n}"), 1, 1, cost(&[]), Zone::Hand))
        .collect();

    advance_through(&mut t.game, p1, &[Phase::Combat, Phase::PostCombatMain]);
    let outcome = t.game.advance_phase(p1, Phase::Refresh).unwrap();

    assert!(outcome
        .log
        .contains(&"Alice discards Held 0 (hand limit 2)".to_string()));
    assert_eq!(t.zone_of(hand[0]), Some(Zone::Discard));
    assert_eq!(t.zone_of(hand[1]), Some(Zone::Discard));
    assert_eq!(t.zone_of(hand[3]), Some(Zone::Hand));
    assert_eq!(t.hand_len(p1), 2);
}

#[test]
fn test_empty_deck_at_start_loses() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);
    for card in t.game.zone_cards(p2, Zone::Deck) {
        t.game.move_card(card, Zone::Deck, Zone::RemovedFromPlay, p2).unwrap();
    }

    advance_through(
        &mut t.game,
        p1,
        &[Phase::Combat, Phase::PostCombatMain, Phase::Refresh, Phase::Start],
    );

    assert!(t.game.game_over);
    assert_eq!(t.game.winner, Some(p1));
    assert_eq!(t.game.end_reason, Some(GameEndReason::DeckedOut(p2)));
    assert!(t.log_contains("Bob cannot draw from an empty deck"));
}

#[test]
fn test_empty_deck_is_harmless_when_deck_out_disabled() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);
    t.game.config.deck_out_loses = false;
    for card in t.game.zone_cards(p2, Zone::Deck) {
        t.game.move_card(card, Zone::Deck, Zone::RemovedFromPlay, p2).unwrap();
    }

    advance_through(
        &mut t.game,
        p1,
        &[Phase::Combat, Phase::PostCombatMain, Phase::Refresh, Phase::Start],
    );

    assert!(!t.game.game_over);
    assert_eq!(t.game.active_player(), p2);
}
