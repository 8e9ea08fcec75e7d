//! Keyword resolution through real plays
//!
//! Targeting keywords suspend the play as a pending selection; these tests
//! answer the selection and check where the target ends up.

mod common;

use azoth_engine::core::{AmalgamOption, AzothSource, Element, Keyword};
use azoth_engine::game::{GameEndReason, Phase, SelectionRequest};
use azoth_engine::zones::Zone;
use azoth_engine::EngineError;
use common::{cost, Table, LIFE_CARDS};
use similar_asserts::assert_eq;

fn air_elemental(t: &mut Table) -> azoth_engine::core::CardId {
    let p1 = t.p1;
    t.familiar_with(
        p1,
        "Air Elemental",
        (2, 2),
        cost(&[(Element::Air, 1), (Element::Generic, 1)]),
        &[Keyword::Gust],
        &[],
        Zone::Hand,
    )
}

/// An enemy Familiar carrying one counter, so it can be targeted
fn countered_enemy(t: &mut Table, name: &str, card_cost: azoth_engine::core::ElementCost) -> azoth_engine::core::CardId {
    let p2 = t.p2;
    let id = t.familiar(p2, name, 2, 2, card_cost, Zone::Field);
    t.game.cards.get_mut(id).unwrap().counters = 1;
    id
}

#[test]
fn test_gust_returns_target_to_owners_hand() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);
    let elemental = air_elemental(&mut t);
    let enemy = countered_enemy(&mut t, "Tide Warden", cost(&[(Element::Water, 1)]));
    t.azoth_n(p1, Element::Air, 2);

    let outcome = t.game.play_summon(p1, elemental, 1).unwrap();
    let pending = outcome.pending.expect("Gust should ask for a target");
    assert_eq!(pending.keyword, Keyword::Gust);
    assert_eq!(pending.player, p1);
    match &pending.request {
        SelectionRequest::Target { valid_targets, .. } => {
            assert_eq!(valid_targets.as_slice(), &[enemy]);
        }
        other => panic!("expected a target request, got {other:?}"),
    }
    assert!(outcome.log.contains(
        &"Air Elemental triggers Gust - choose a target to return to owner's hand".to_string()
    ));

    let outcome = t.game.resolve_keyword_target(pending.token, enemy).unwrap();
    assert!(outcome.pending.is_none());
    assert!(outcome.log.contains(
        &"Tide Warden is returned to its owner's hand by Air Elemental".to_string()
    ));
    assert_eq!(t.game.locate_card(enemy), Some((p2, Zone::Hand)));
    assert_eq!(t.game.cards.get(enemy).unwrap().counters, 0);
    assert!(t.game.pending.is_none());
}

#[test]
fn test_pending_selection_blocks_other_commands() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);
    let elemental = air_elemental(&mut t);
    let enemy = countered_enemy(&mut t, "Tide Warden", cost(&[(Element::Water, 1)]));
    t.azoth_n(p1, Element::Air, 2);

    let token = t.game.play_summon(p1, elemental, 1).unwrap().pending.unwrap().token;

    assert!(matches!(
        t.game.advance_phase(p1, Phase::Combat),
        Err(EngineError::AwaitingSelection(open)) if open == token
    ));
    let bystander = t.familiar(p2, "Reef Leech", 1, 2, cost(&[]), Zone::Field);
    assert!(matches!(
        t.game.declare_attacker(bystander, None),
        Err(EngineError::AwaitingSelection(_))
    ));
    assert_eq!(t.game.turn.phase, Phase::Main);

    // A wrong token or an invalid target leaves the selection open
    assert!(matches!(
        t.game.resolve_keyword_target(token + 5, enemy),
        Err(EngineError::InvalidTarget(_))
    ));
    assert!(matches!(
        t.game.resolve_keyword_target(token, bystander),
        Err(EngineError::InvalidTarget(_))
    ));
    assert_eq!(t.game.pending.as_ref().map(|p| p.token), Some(token));

    t.game.resolve_keyword_target(token, enemy).unwrap();
    t.game.advance_phase(p1, Phase::Combat).unwrap();
    assert_eq!(t.game.turn.phase, Phase::Combat);
}

#[test]
fn test_concede_is_accepted_mid_selection() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);
    let elemental = air_elemental(&mut t);
    let enemy = countered_enemy(&mut t, "Tide Warden", cost(&[(Element::Water, 1)]));
    t.azoth_n(p1, Element::Air, 2);
    let token = t.game.play_summon(p1, elemental, 1).unwrap().pending.unwrap().token;

    let outcome = t.game.concede(p2).unwrap();

    assert_eq!(
        outcome.log,
        vec!["Bob concedes".to_string(), "Alice wins the game".to_string()]
    );
    assert!(outcome.pending.is_none());
    assert!(t.game.pending.is_none());
    assert_eq!(t.game.winner, Some(p1));
    assert_eq!(t.game.end_reason, Some(GameEndReason::Conceded(p2)));
    assert!(matches!(
        t.game.resolve_keyword_target(token, enemy),
        Err(EngineError::GameOver)
    ));
}

#[test]
fn test_gust_skips_fire_cards() {
    let mut t = Table::new();
    let p1 = t.p1;
    let elemental = air_elemental(&mut t);
    let hound = countered_enemy(&mut t, "Ember Hound", cost(&[(Element::Fire, 1)]));
    t.azoth_n(p1, Element::Air, 2);

    let outcome = t.game.play_summon(p1, elemental, 1).unwrap();
    assert!(outcome.pending.is_none());
    assert!(outcome
        .log
        .contains(&"Air Elemental's Gust has no valid targets".to_string()));
    assert_eq!(t.zone_of(hound), Some(Zone::Field));
}

#[test]
fn test_brilliance_sends_target_under_life_cards() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);
    let wisp = t.familiar_with(
        p1,
        "Aether Wisp",
        (1, 1),
        cost(&[(Element::Aether, 1)]),
        &[Keyword::Brilliance],
        &[],
        Zone::Hand,
    );
    let enemy = countered_enemy(&mut t, "Reef Leech", cost(&[(Element::Water, 1)]));
    t.azoth(p1, Element::Aether);

    let pending = t.game.play_summon(p1, wisp, 0).unwrap().pending.unwrap();
    t.game.resolve_keyword_target(pending.token, enemy).unwrap();

    let life = t.game.zone(p2, Zone::LifeCards).unwrap();
    assert_eq!(life.len(), LIFE_CARDS + 1);
    assert_eq!(life.cards[0], enemy);
    assert!(t.log_contains("Reef Leech is placed on the bottom of its owner's life cards by Aether Wisp"));
}

#[test]
fn test_submerged_tucks_target_below_top_of_deck() {
    let mut t = Table::new();
    let (p1, p2) = (t.p1, t.p2);
    let warden = t.familiar_with(
        p1,
        "Tide Warden",
        (1, 3),
        cost(&[(Element::Water, 1)]),
        &[Keyword::Submerged],
        &[],
        Zone::Hand,
    );
    let enemy = countered_enemy(&mut t, "Cinder Duelist", cost(&[(Element::Fire, 1)]));
    t.azoth(p1, Element::Water);

    let pending = t.game.play_summon(p1, warden, 0).unwrap().pending.unwrap();
    t.game.resolve_keyword_target(pending.token, enemy).unwrap();

    let deck = &t.game.zone(p2, Zone::Deck).unwrap().cards;
    assert_eq!(deck[deck.len() - 2], enemy);
    assert_eq!(t.game.card_name(deck[deck.len() - 1]).as_str(), "Deck Sprite 5");
}

#[test]
fn test_void_removes_any_non_aether_field_card() {
    let mut t = Table::new();
    let p1 = t.p1;
    let p2 = t.p2;
    let maw = t.familiar_with(
        p1,
        "Nether Maw",
        (3, 2),
        cost(&[(Element::Nether, 1)]),
        &[Keyword::Void],
        &[],
        Zone::Hand,
    );
    // No counters needed for Void
    let plain = t.familiar(p2, "Tide Warden", 1, 3, cost(&[(Element::Water, 1)]), Zone::Field);
    let aether = t.familiar(p2, "Aether Wisp", 1, 1, cost(&[(Element::Aether, 1)]), Zone::Field);
    t.azoth(p1, Element::Nether);

    let pending = t.game.play_summon(p1, maw, 0).unwrap().pending.unwrap();
    match &pending.request {
        SelectionRequest::Target { valid_targets, .. } => {
            assert!(valid_targets.contains(&plain));
            assert!(!valid_targets.contains(&aether));
        }
        other => panic!("expected a target request, got {other:?}"),
    }

    t.game.resolve_keyword_target(pending.token, plain).unwrap();
    assert_eq!(t.zone_of(plain), Some(Zone::RemovedFromPlay));
    assert!(t.log_contains("Tide Warden is removed from the game by Nether Maw"));
}

#[test]
fn test_inferno_and_steadfast_scale_with_spent_element() {
    let mut t = Table::new();
    let p1 = t.p1;
    let hound = t.familiar_with(
        p1,
        "Ember Hound",
        (2, 2),
        cost(&[(Element::Fire, 1), (Element::Generic, 1)]),
        &[Keyword::Inferno],
        &[],
        Zone::Hand,
    );
    t.azoth_n(p1, Element::Fire, 2);

    let outcome = t.game.play_summon(p1, hound, 1).unwrap();
    assert!(outcome.log.contains(
        &"Ember Hound triggers Inferno - will add 2 additional damage when damage is dealt"
            .to_string()
    ));
    assert_eq!(t.game.cards.get(hound).unwrap().inferno_bonus, 2);

    let sentinel = t.familiar_with(
        p1,
        "Stoneback Sentinel",
        (1, 3),
        cost(&[(Element::Earth, 1)]),
        &[Keyword::Steadfast],
        &[],
        Zone::Hand,
    );
    t.azoth_n(p1, Element::Earth, 2);

    t.game.play_summon(p1, sentinel, 1).unwrap();
    let card = t.game.cards.get(sentinel).unwrap();
    assert_eq!(card.steadfast_remaining, 2);
    assert_eq!(card.counters, 1);
}

#[test]
fn test_amalgam_pair_grants_keyword_and_resolves_it() {
    let mut t = Table::new();
    let p1 = t.p1;
    let mut seed = t.blank(
        p1,
        "Prism Seed",
        azoth_engine::core::CardKind::Familiar {
            base_strength: 1,
            base_health: 2,
        },
        cost(&[(Element::Generic, 1)]),
    );
    seed.keywords.insert(Keyword::Amalgam);
    seed.amalgam_options.push(AmalgamOption {
        keyword: Keyword::Gust,
        element: Element::Air,
    });
    seed.amalgam_options.push(AmalgamOption {
        keyword: Keyword::Inferno,
        element: Element::Fire,
    });
    let seed = t.add(seed, Zone::Hand);
    let enemy = countered_enemy(&mut t, "Tide Warden", cost(&[(Element::Water, 1)]));
    t.azoth(p1, Element::Earth);

    let pending = t.game.play_summon(p1, seed, 1).unwrap().pending.unwrap();
    assert!(matches!(pending.request, SelectionRequest::AmalgamPair { ref options } if options.len() == 2));

    assert!(matches!(
        t.game.resolve_amalgam_choice(pending.token, 5),
        Err(EngineError::InvalidTarget(_))
    ));

    let outcome = t.game.resolve_amalgam_choice(pending.token, 0).unwrap();
    assert!(outcome.log.contains(&"Prism Seed gains Gust (air)".to_string()));
    let card = t.game.cards.get(seed).unwrap();
    assert!(card.has_keyword(Keyword::Gust));
    assert!(card.has_element(Element::Air));

    // The chosen keyword resolves right away
    let gust = outcome.pending.expect("the chosen Gust should ask for a target");
    assert_eq!(gust.keyword, Keyword::Gust);
    t.game.resolve_keyword_target(gust.token, enemy).unwrap();
    assert_eq!(t.zone_of(enemy), Some(Zone::Hand));
}

#[test]
fn test_amalgam_azoth_chooses_produced_element() {
    let mut t = Table::new();
    let p1 = t.p1;
    let mut seed = t.blank(
        p1,
        "Prism Seed",
        azoth_engine::core::CardKind::Azoth,
        cost(&[]),
    );
    seed.keywords.insert(Keyword::Amalgam);
    seed.amalgam_elements.push(Element::Water);
    seed.amalgam_elements.push(Element::Fire);
    let seed = t.add(seed, Zone::Hand);

    let outcome = t.game.play_azoth(p1, seed, Element::Generic).unwrap();
    assert!(outcome.log.contains(&"Alice placed Prism Seed as Azoth".to_string()));
    let pending = outcome.pending.unwrap();
    assert!(matches!(pending.request, SelectionRequest::AmalgamElement { .. }));
    assert_eq!(t.game.cards.get(seed).unwrap().azoth_source, None);

    let outcome = t.game.resolve_amalgam_choice(pending.token, 1).unwrap();
    assert!(outcome.log.contains(&"Prism Seed will produce fire Azoth".to_string()));
    assert_eq!(
        t.game.cards.get(seed).unwrap().azoth_source,
        Some(AzothSource::Element(Element::Fire))
    );
    assert_eq!(t.game.element_pool(p1).fire, 1);
}

#[test]
fn test_azoth_play_ignores_targeting_keywords() {
    let mut t = Table::new();
    let p1 = t.p1;
    let elemental = air_elemental(&mut t);
    countered_enemy(&mut t, "Tide Warden", cost(&[(Element::Water, 1)]));

    let outcome = t.game.play_azoth(p1, elemental, Element::Air).unwrap();
    assert!(outcome.pending.is_none());
    assert!(!outcome.log.iter().any(|line| line.contains("triggers Gust")));
}

#[test]
fn test_shared_keywords_log_synergy() {
    let mut t = Table::new();
    let p1 = t.p1;
    for n in 0..2 {
        t.familiar_with(
            p1,
            &format!("Gale Sprite {n}"),
            (1, 1),
            cost(&[(Element::Air, 1)]),
            &[Keyword::Gust],
            &[],
            Zone::Field,
        );
    }
    let elemental = air_elemental(&mut t);
    t.azoth_n(p1, Element::Air, 2);

    let outcome = t.game.play_summon(p1, elemental, 1).unwrap();
    assert!(outcome.pending.is_none());
    assert_eq!(
        outcome.log.last().map(String::as_str),
        Some("3 Gust cards on field - wind storm active")
    );
}
