//! Shared fixtures for the integration tests
//!
//! `Table` builds a game already in Alice's MAIN phase, with four life
//! cards and a small deck per player, so tests only add the cards they
//! care about.

#![allow(dead_code)]

use azoth_engine::core::{
    Ability, AzothSource, Card, CardId, CardKind, CombatAbility, Element, ElementCost, Keyword,
    PlayerId,
};
use azoth_engine::game::{GameState, Phase};
use azoth_engine::zones::Zone;

pub const LIFE_CARDS: usize = 4;
pub const DECK_CARDS: usize = 6;

pub struct Table {
    pub game: GameState,
    pub p1: PlayerId,
    pub p2: PlayerId,
}

impl Table {
    pub fn new() -> Self {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        game.seed_rng(1);
        let p1 = game.players[0].id;
        let p2 = game.players[1].id;
        let mut table = Table { game, p1, p2 };
        for player in [p1, p2] {
            for n in 0..DECK_CARDS {
                table.familiar(player, &format!("Deck Sprite {n}"), 1, 1, ElementCost::new(), Zone::Deck);
            }
            for n in 0..LIFE_CARDS {
                table.familiar(player, &format!("Reserve Sprite {n}"), 1, 1, ElementCost::new(), Zone::LifeCards);
            }
        }
        table.game.turn.phase = Phase::Main;
        table
    }

    pub fn add(&mut self, card: Card, zone: Zone) -> CardId {
        self.game.add_card(card, zone).unwrap()
    }

    pub fn blank(&mut self, owner: PlayerId, name: &str, kind: CardKind, cost: ElementCost) -> Card {
        let id = self.game.next_card_id();
        let mut card = Card::new(id, name, kind, owner);
        card.cost = cost;
        card
    }

    pub fn familiar(
        &mut self,
        owner: PlayerId,
        name: &str,
        strength: u32,
        health: u32,
        cost: ElementCost,
        zone: Zone,
    ) -> CardId {
        let kind = CardKind::Familiar {
            base_strength: strength,
            base_health: health,
        };
        let card = self.blank(owner, name, kind, cost);
        self.add(card, zone)
    }

    pub fn familiar_with(
        &mut self,
        owner: PlayerId,
        name: &str,
        stats: (u32, u32),
        cost: ElementCost,
        keywords: &[Keyword],
        combat: &[CombatAbility],
        zone: Zone,
    ) -> CardId {
        let kind = CardKind::Familiar {
            base_strength: stats.0,
            base_health: stats.1,
        };
        let mut card = self.blank(owner, name, kind, cost);
        for keyword in keywords {
            card.keywords.insert(*keyword);
        }
        card.combat.extend(combat.iter().copied());
        card.shield_up = zone == Zone::Field && combat.contains(&CombatAbility::Shield);
        self.add(card, zone)
    }

    pub fn spell(
        &mut self,
        owner: PlayerId,
        name: &str,
        strength: u32,
        cost: ElementCost,
        text: &str,
        zone: Zone,
    ) -> CardId {
        let mut card = self.blank(owner, name, CardKind::Spell { strength }, cost);
        card.abilities.push(Ability::new(text));
        self.add(card, zone)
    }

    /// Give an existing card one more ability
    pub fn grant(&mut self, card: CardId, ability: Ability) {
        self.game.cards.get_mut(card).unwrap().abilities.push(ability);
    }

    /// A Familiar whose only ability fires on `trigger`
    pub fn listener(
        &mut self,
        owner: PlayerId,
        name: &str,
        stats: (u32, u32),
        text: &str,
        trigger: &str,
        zone: Zone,
    ) -> CardId {
        let card = self.familiar_with(owner, name, stats, ElementCost::new(), &[], &[], zone);
        self.grant(card, Ability::new(text).with_trigger(trigger));
        card
    }

    /// A ready Azoth-row card producing `element`
    pub fn azoth(&mut self, owner: PlayerId, element: Element) -> CardId {
        let cost = ElementCost::new().with(element, 1);
        let mut card = self.blank(owner, &format!("{element} Stone"), CardKind::Azoth, cost);
        card.azoth_source = Some(AzothSource::Element(element));
        self.add(card, Zone::AzothRow)
    }

    pub fn azoth_n(&mut self, owner: PlayerId, element: Element, count: usize) -> Vec<CardId> {
        (0..count).map(|_| self.azoth(owner, element)).collect()
    }

    pub fn zone_of(&self, card: CardId) -> Option<Zone> {
        self.game.locate_card(card).map(|(_, zone)| zone)
    }

    pub fn hand_len(&self, player: PlayerId) -> usize {
        self.game.zone(player, Zone::Hand).unwrap().len()
    }

    pub fn last_log(&self) -> String {
        self.game.game_log().last().unwrap_or_default().to_string()
    }

    pub fn log_contains(&self, needle: &str) -> bool {
        self.game.game_log().any(|line| line.contains(needle))
    }
}

pub fn cost(parts: &[(Element, u32)]) -> ElementCost {
    parts
        .iter()
        .fold(ElementCost::new(), |cost, (element, amount)| cost.with(*element, *amount))
}
