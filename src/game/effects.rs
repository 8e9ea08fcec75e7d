//! Execution of parsed ability effects
//!
//! Spells, Burst Spells, activated and triggered abilities all funnel
//! through [`GameState::execute_ability_effect`], with the play parameter
//! standing in for `X`. Triggered abilities resolve with `X = 0`.

use crate::core::{AbilityEffect, CardId, EnemyScope, PlayerId, SearchFilter, TriggerEvent};
use crate::game::{GameState, Relocation};
use crate::zones::Zone;
use crate::{EngineError, Result};
use std::cmp::Reverse;

impl GameState {
    pub(crate) fn execute_ability_effect(
        &mut self,
        player_id: PlayerId,
        source: CardId,
        effect: &AbilityEffect,
        x: u32,
    ) -> Result<()> {
        match effect {
            AbilityEffect::DamageOpponent(amount) => {
                let opponent = self.opponent_of(player_id)?;
                self.damage_player(opponent, amount.resolve(x))?;
            }
            AbilityEffect::DamageEnemyFamiliars(amount) => {
                let opponent = self.opponent_of(player_id)?;
                let amount = amount.resolve(x);
                for target in self.familiars_in_play(opponent) {
                    self.deal_damage_to_familiar(target, amount, Some(source))?;
                    self.destroy_if_lethal(target)?;
                }
            }
            AbilityEffect::DrawCards(amount) => {
                for _ in 0..amount.resolve(x) {
                    if self.draw_card(player_id)?.is_none() {
                        break;
                    }
                }
            }
            AbilityEffect::AddCounters(amount) => {
                let amount = amount.resolve(x);
                for card_id in self.familiars_in_play(player_id) {
                    self.cards.get_mut(card_id)?.counters += amount;
                }
                let message = format!(
                    "{} puts {} +1 counters on each of their Familiars",
                    self.player_name(player_id),
                    amount
                );
                self.log(message);
            }
            AbilityEffect::EmpowerFamiliars(amount) => {
                let amount = amount.resolve(x) as i32;
                for card_id in self.familiars_in_play(player_id) {
                    self.cards.get_mut(card_id)?.strength_modifier += amount;
                }
                let message = format!(
                    "{}'s Familiars get +{} strength until end of turn",
                    self.player_name(player_id),
                    amount
                );
                self.log(message);
            }
            AbilityEffect::Heal(amount) => {
                self.heal_player(player_id, amount.resolve(x))?;
            }
            AbilityEffect::Destroy(scope) => {
                for target in self.enemy_targets(player_id, *scope)? {
                    self.destroy_card(target)?;
                }
            }
            AbilityEffect::ReturnToHand(scope) => {
                for target in self.enemy_targets(player_id, *scope)? {
                    self.relocate_card(target, Relocation::OwnerHand, source)?;
                }
            }
            AbilityEffect::Banish(scope) => {
                for target in self.enemy_targets(player_id, *scope)? {
                    self.relocate_card(target, Relocation::RemovedFromPlay, source)?;
                }
            }
            AbilityEffect::Search(filter) => self.search_deck(player_id, *filter)?,
            AbilityEffect::Unparsed(text) => {
                let message = format!("{} resolves: {}", self.card_name(source), text);
                self.log(message);
            }
        }
        Ok(())
    }

    /// Enemy Familiars a removal effect hits, in zone order
    fn enemy_targets(&self, player_id: PlayerId, scope: EnemyScope) -> Result<Vec<CardId>> {
        let enemies = self.familiars_in_play(self.opponent_of(player_id)?);
        let pick = match scope {
            EnemyScope::Each => return Ok(enemies),
            EnemyScope::Weakest => enemies.iter().copied().min_by_key(|id| {
                self.cards.get(*id).map(|c| c.remaining_health()).unwrap_or(u32::MAX)
            }),
            EnemyScope::Strongest => enemies.iter().copied().min_by_key(|id| {
                Reverse(self.cards.get(*id).map(|c| c.strength()).unwrap_or(0))
            }),
        };
        Ok(pick.into_iter().collect())
    }

    /// Put the topmost deck card matching `filter` into hand, then shuffle
    fn search_deck(&mut self, player_id: PlayerId, filter: SearchFilter) -> Result<()> {
        let found = self
            .zone_cards(player_id, Zone::Deck)
            .into_iter()
            .rev()
            .find(|id| self.cards.get(*id).is_ok_and(|c| filter.matches(&c.kind)));
        let message = match found {
            Some(card_id) => {
                self.move_card(card_id, Zone::Deck, Zone::Hand, player_id)?;
                format!(
                    "{} searches their deck and takes {}",
                    self.player_name(player_id),
                    self.card_name(card_id)
                )
            }
            None => format!(
                "{} searches their deck and finds no {}",
                self.player_name(player_id),
                filter
            ),
        };
        self.log(message);

        let zones = self
            .player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
            .ok_or(EngineError::EntityNotFound(player_id.as_u32()))?;
        zones.deck.shuffle(&mut self.rng);
        Ok(())
    }

    /// Resolve a phase event for every card on either player's field and
    /// for both Flags, first player first
    pub(crate) fn fire_triggers(&mut self, event: TriggerEvent) -> Result<()> {
        let player_ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        for player_id in player_ids {
            let listeners: Vec<CardId> = [Zone::Field, Zone::Flag]
                .into_iter()
                .flat_map(|zone| self.zone_cards(player_id, zone))
                .collect();
            for card_id in listeners {
                self.fire_card_triggers(card_id, event)?;
            }
        }
        Ok(())
    }

    /// Resolve one card's abilities that listen for `event`, on behalf of
    /// the card's controller
    pub(crate) fn fire_card_triggers(&mut self, card_id: CardId, event: TriggerEvent) -> Result<()> {
        let card = self.cards.get(card_id)?;
        let controller = card.controller;
        let abilities: Vec<_> = card
            .abilities
            .iter()
            .filter(|a| a.listens_for(event))
            .cloned()
            .collect();

        for ability in abilities {
            if self.game_over {
                break;
            }
            let message = format!(
                "{} triggers ({}): {}",
                self.card_name(card_id),
                event,
                ability.describe(0)
            );
            self.log(message);
            self.execute_ability_effect(controller, card_id, &ability.effect, 0)?;
        }
        Ok(())
    }

    /// Familiars on a player's field and combat row, in zone order
    pub fn familiars_in_play(&self, player_id: PlayerId) -> Vec<CardId> {
        [Zone::Field, Zone::CombatRow]
            .into_iter()
            .flat_map(|zone| self.zone_cards(player_id, zone))
            .filter(|id| self.cards.get(*id).is_ok_and(|c| c.is_familiar()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{AbilityEffect, Amount, Card, CardKind};
    use crate::game::{GameState, Phase};
    use crate::zones::Zone;

    fn familiar(game: &mut GameState, owner_idx: usize, strength: u32, health: u32) -> crate::core::CardId {
        let owner = game.players[owner_idx].id;
        let id = game.next_card_id();
        let kind = CardKind::Familiar {
            base_strength: strength,
            base_health: health,
        };
        game.add_card(Card::new(id, "Test Familiar", kind, owner), Zone::Field)
            .unwrap()
    }

    #[test]
    fn test_damage_enemy_familiars_destroys() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        game.turn.phase = Phase::Main;
        let p1 = game.players[0].id;
        let p2 = game.players[1].id;
        let source = familiar(&mut game, 0, 1, 1);
        let weak = familiar(&mut game, 1, 1, 2);
        let tough = familiar(&mut game, 1, 1, 5);

        let effect = AbilityEffect::DamageEnemyFamiliars(Amount::X);
        game.execute_ability_effect(p1, source, &effect, 3).unwrap();

        assert!(game.is_in_zone(weak, p2, Zone::Discard));
        assert!(game.is_in_zone(tough, p2, Zone::Field));
        assert_eq!(game.cards.get(tough).unwrap().damage, 3);
    }

    #[test]
    fn test_counters_and_empower() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string());
        let p1 = game.players[0].id;
        let ally = familiar(&mut game, 0, 2, 2);

        game.execute_ability_effect(p1, ally, &AbilityEffect::AddCounters(Amount::Fixed(1)), 0)
            .unwrap();
        game.execute_ability_effect(p1, ally, &AbilityEffect::EmpowerFamiliars(Amount::X), 2)
            .unwrap();

        let card = game.cards.get(ally).unwrap();
        assert_eq!(card.counters, 1);
        assert_eq!(card.strength(), 5);
        assert_eq!(card.health(), 3);
    }
}
