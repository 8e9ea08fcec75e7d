//! Combat system
//!
//! Attacks are declared one at a time during the Combat phase. An attack
//! aimed at an enemy Familiar resolves immediately; a direct attack waits
//! for the defender to block and otherwise hits the defender when combat
//! ends.

use crate::core::{CardId, CombatAbility, PlayerId, TriggerEvent};
use crate::game::{GameState, Phase};
use crate::zones::Zone;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What an attacker was sent at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackTarget {
    Player(PlayerId),
    Familiar(CardId),
}

impl fmt::Display for AttackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackTarget::Player(p) => write!(f, "player {p}"),
            AttackTarget::Familiar(c) => write!(f, "card {c}"),
        }
    }
}

/// Combat state for the current combat phase
///
/// Reset whenever a Combat phase starts or ends.
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CombatState {
    /// Attacking Familiars and what each attacks
    pub attackers: BTreeMap<CardId, AttackTarget>,

    /// Blocker -> the attacker it blocks
    pub blockers: BTreeMap<CardId, CardId>,

    /// Reverse mapping: attacker -> its blocker
    pub attacker_blockers: BTreeMap<CardId, CardId>,

    /// Whether any attack was declared this combat
    pub combat_active: bool,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_attacker(&mut self, attacker: CardId, target: AttackTarget) {
        self.attackers.insert(attacker, target);
        self.combat_active = true;
    }

    pub fn declare_blocker(&mut self, blocker: CardId, attacker: CardId) {
        self.blockers.insert(blocker, attacker);
        self.attacker_blockers.insert(attacker, blocker);
    }

    pub fn is_attacking(&self, card_id: CardId) -> bool {
        self.attackers.contains_key(&card_id)
    }

    pub fn is_blocking(&self, card_id: CardId) -> bool {
        self.blockers.contains_key(&card_id)
    }

    pub fn is_blocked(&self, attacker: CardId) -> bool {
        self.attacker_blockers.contains_key(&attacker)
    }

    pub fn get_target(&self, attacker: CardId) -> Option<AttackTarget> {
        self.attackers.get(&attacker).copied()
    }

    /// Direct attackers still waiting for a block decision
    pub fn unblocked_direct_attackers(&self) -> Vec<CardId> {
        self.attackers
            .iter()
            .filter(|(id, target)| {
                matches!(target, AttackTarget::Player(_)) && !self.is_blocked(**id)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn clear(&mut self) {
        self.attackers.clear();
        self.blockers.clear();
        self.attacker_blockers.clear();
        self.combat_active = false;
    }
}

impl GameState {
    /// Declare an attacker, optionally aimed at an enemy Familiar
    pub(crate) fn declare_attacker_internal(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
        target: Option<CardId>,
    ) -> Result<()> {
        if self.turn.phase != Phase::Combat {
            return Err(EngineError::InvalidPhase(format!(
                "attacks are declared in COMBAT, not {}",
                self.turn.phase
            )));
        }
        if player_id != self.active_player() {
            return Err(EngineError::InvalidPlay(format!(
                "{} is not the active player",
                self.player_name(player_id)
            )));
        }
        if !self.is_in_zone(card_id, player_id, Zone::Field) {
            return Err(EngineError::CardNotFound(format!(
                "{} is not on {}'s field",
                self.card_name(card_id),
                self.player_name(player_id)
            )));
        }
        let card = self.cards.get(card_id)?;
        if !card.can_attack() {
            return Err(EngineError::InvalidPlay(format!(
                "{} cannot attack (tapped, summoning sick or not a Familiar)",
                card.name
            )));
        }

        let defender = self.opponent_of(player_id)?;
        let attack_target = match target {
            Some(target_id) => {
                let is_enemy_familiar = self.is_in_zone(target_id, defender, Zone::Field)
                    && self.cards.get(target_id)?.is_familiar();
                if !is_enemy_familiar {
                    return Err(EngineError::InvalidTarget(format!(
                        "{} is not an enemy Familiar on the field",
                        self.card_name(target_id)
                    )));
                }
                AttackTarget::Familiar(target_id)
            }
            None => AttackTarget::Player(defender),
        };

        self.cards.get_mut(card_id)?.tap();
        self.move_card(card_id, Zone::Field, Zone::CombatRow, player_id)?;
        self.combat.declare_attacker(card_id, attack_target);

        match attack_target {
            AttackTarget::Familiar(target_id) => {
                let message = format!(
                    "{} attacks {} with {}",
                    self.player_name(player_id),
                    self.card_name(target_id),
                    self.card_name(card_id)
                );
                self.log(message);
                self.fire_card_triggers(card_id, TriggerEvent::OnAttack)?;
                self.resolve_fight(card_id, target_id)?;
            }
            AttackTarget::Player(_) => {
                let message = format!(
                    "{} attacks {} directly",
                    self.card_name(card_id),
                    self.player_name(defender)
                );
                self.log(message);
                self.fire_card_triggers(card_id, TriggerEvent::OnAttack)?;
            }
        }
        Ok(())
    }

    /// The defender blocks a direct attacker
    pub(crate) fn declare_blocker_internal(
        &mut self,
        player_id: PlayerId,
        blocker: CardId,
        attacker: CardId,
    ) -> Result<()> {
        if self.turn.phase != Phase::Combat {
            return Err(EngineError::InvalidPhase(format!(
                "blocks are declared in COMBAT, not {}",
                self.turn.phase
            )));
        }
        if player_id == self.active_player() {
            return Err(EngineError::InvalidPlay(
                "the attacking player cannot block".to_string(),
            ));
        }
        let blockable = matches!(
            self.combat.get_target(attacker),
            Some(AttackTarget::Player(p)) if p == player_id
        ) && !self.combat.is_blocked(attacker);
        let attacker_owner = self.cards.get(attacker)?.owner;
        if !blockable || !self.is_in_zone(attacker, attacker_owner, Zone::CombatRow) {
            return Err(EngineError::InvalidTarget(format!(
                "{} is not an unblocked direct attacker",
                self.card_name(attacker)
            )));
        }
        if !self.is_in_zone(blocker, player_id, Zone::Field) {
            return Err(EngineError::CardNotFound(format!(
                "{} is not on {}'s field",
                self.card_name(blocker),
                self.player_name(player_id)
            )));
        }
        let card = self.cards.get(blocker)?;
        if !card.is_familiar() || card.tapped {
            return Err(EngineError::InvalidPlay(format!(
                "{} cannot block",
                card.name
            )));
        }

        self.move_card(blocker, Zone::Field, Zone::CombatRow, player_id)?;
        self.combat.declare_blocker(blocker, attacker);
        let message = format!(
            "{} blocks {}",
            self.card_name(blocker),
            self.card_name(attacker)
        );
        self.log(message);
        self.fire_card_triggers(blocker, TriggerEvent::OnBlock)?;
        self.resolve_fight(attacker, blocker)
    }

    /// Exchange damage between two Familiars
    ///
    /// A lone FirstStrike side deals its damage first and the other side
    /// strikes back only if it survives. Otherwise both deal damage at once,
    /// using the strength each had before any damage. Both sides'
    /// beforeDamage abilities resolve first; if either side leaves play
    /// there is no fight.
    fn resolve_fight(&mut self, attacker: CardId, defender: CardId) -> Result<()> {
        self.fire_card_triggers(attacker, TriggerEvent::BeforeDamage)?;
        self.fire_card_triggers(defender, TriggerEvent::BeforeDamage)?;
        if self.game_over || !self.is_in_play(attacker) || !self.is_in_play(defender) {
            return Ok(());
        }

        let attacker_first = self.cards.get(attacker)?.has_combat(CombatAbility::FirstStrike);
        let defender_first = self.cards.get(defender)?.has_combat(CombatAbility::FirstStrike);

        if attacker_first != defender_first {
            let (first, second) = if attacker_first {
                (attacker, defender)
            } else {
                (defender, attacker)
            };
            let message = format!("{} strikes first", self.card_name(first));
            self.log(message);

            let amount = self.cards.get(first)?.strength();
            self.strike(first, second, amount)?;
            if !self.destroy_if_lethal(second)? {
                let amount = self.cards.get(second)?.strength();
                self.strike(second, first, amount)?;
                self.destroy_if_lethal(first)?;
            }
        } else {
            let attacker_strength = self.cards.get(attacker)?.strength();
            let defender_strength = self.cards.get(defender)?.strength();
            self.strike(attacker, defender, attacker_strength)?;
            self.strike(defender, attacker, defender_strength)?;
            self.destroy_if_lethal(defender)?;
            self.destroy_if_lethal(attacker)?;
        }
        Ok(())
    }

    /// One combat damage instance, with Trample and Drain applied
    fn strike(&mut self, source: CardId, target: CardId, amount: u32) -> Result<u32> {
        let remaining_before = self.cards.get(target)?.remaining_health();
        let dealt = self.deal_damage_to_familiar(target, amount, Some(source))?;

        let source_card = self.cards.get(source)?;
        let controller = source_card.controller;
        let trample = source_card.has_combat(CombatAbility::Trample);
        let drain = source_card.has_combat(CombatAbility::Drain);

        if trample && dealt > remaining_before {
            let excess = dealt - remaining_before;
            let defending_player = self.cards.get(target)?.controller;
            let message = format!(
                "{} tramples over for {} damage",
                self.card_name(source),
                excess
            );
            self.log(message);
            self.damage_player(defending_player, excess)?;
        }
        if drain && dealt > 0 {
            self.heal_player(controller, dealt)?;
        }
        Ok(dealt)
    }

    /// Mark damage on a Familiar
    ///
    /// A raised Shield absorbs the whole instance. Otherwise the source's
    /// Inferno bonus is added and a friendly Steadfast card soaks up what it
    /// can. Returns the damage actually marked.
    pub(crate) fn deal_damage_to_familiar(
        &mut self,
        target: CardId,
        amount: u32,
        source: Option<CardId>,
    ) -> Result<u32> {
        if amount == 0 {
            return Ok(0);
        }
        let source_name = source
            .map(|id| self.card_name(id))
            .unwrap_or_else(|| "An effect".to_string());

        let target_card = self.cards.get_mut(target)?;
        let controller = target_card.controller;
        if target_card.shield_up {
            target_card.shield_up = false;
            let message = format!(
                "{}'s shield absorbs {} damage from {}",
                target_card.name, amount, source_name
            );
            self.log(message);
            return Ok(0);
        }

        let mut amount = amount;
        if let Some(source_id) = source {
            let bonus = self.cards.get(source_id)?.inferno_bonus;
            if bonus > 0 {
                amount += bonus;
                let message = format!("{source_name}'s Inferno adds {bonus} damage");
                self.log(message);
            }
        }

        let steadfast = [Zone::Field, Zone::CombatRow]
            .into_iter()
            .flat_map(|zone| self.zone_cards(controller, zone))
            .find(|id| {
                *id != target
                    && self
                        .cards
                        .get(*id)
                        .is_ok_and(|c| c.steadfast_remaining > 0)
            });
        if let Some(guard) = steadfast {
            let guard_card = self.cards.get_mut(guard)?;
            let redirected = amount.min(guard_card.steadfast_remaining);
            guard_card.steadfast_remaining -= redirected;
            guard_card.strength_penalty += redirected;
            amount -= redirected;
            let message = format!(
                "{} redirects {} damage away from {}",
                self.card_name(guard),
                redirected,
                self.card_name(target)
            );
            self.log(message);
        }

        if amount > 0 {
            self.cards.get_mut(target)?.damage += amount;
            let message = format!(
                "{} deals {} damage to {}",
                source_name,
                amount,
                self.card_name(target)
            );
            self.log(message);
        }
        Ok(amount)
    }

    /// Destroy a Familiar with lethal damage
    pub(crate) fn destroy_if_lethal(&mut self, card_id: CardId) -> Result<bool> {
        if !self.cards.get(card_id)?.is_destroyed() {
            return Ok(false);
        }
        self.destroy_card(card_id)
    }

    /// Resolve the card's onDestroy abilities, then move it to its owner's
    /// discard pile. Cards not in play are left alone.
    pub(crate) fn destroy_card(&mut self, card_id: CardId) -> Result<bool> {
        if !self.is_in_play(card_id) {
            return Ok(false);
        }
        self.fire_card_triggers(card_id, TriggerEvent::OnDestroy)?;
        let Some((owner, zone)) = self.locate_card(card_id) else {
            return Ok(false);
        };
        if !zone.is_in_play() {
            return Ok(false);
        }
        self.move_card(card_id, zone, Zone::Discard, owner)?;
        let message = format!("{} is destroyed", self.card_name(card_id));
        self.log(message);
        Ok(true)
    }

    fn is_in_play(&self, card_id: CardId) -> bool {
        self.locate_card(card_id)
            .is_some_and(|(_, zone)| zone.is_in_play())
    }

    /// Close out combat: unblocked direct attackers hit the defender and
    /// every surviving combatant returns to its field.
    pub(crate) fn end_combat(&mut self) -> Result<()> {
        let direct: Vec<(CardId, PlayerId)> = self
            .combat
            .attackers
            .iter()
            .filter_map(|(id, target)| match target {
                AttackTarget::Player(p) if !self.combat.is_blocked(*id) => Some((*id, *p)),
                _ => None,
            })
            .collect();

        for (attacker, defender) in direct {
            let card = self.cards.get(attacker)?;
            let (owner, controller) = (card.owner, card.controller);
            let amount = card.strength();
            let drain = card.has_combat(CombatAbility::Drain);
            if amount == 0 || !self.is_in_zone(attacker, owner, Zone::CombatRow) {
                continue;
            }
            let message = format!(
                "{} deals {} damage to {}",
                self.card_name(attacker),
                amount,
                self.player_name(defender)
            );
            self.log(message);
            let dealt = self.damage_player(defender, amount)?;
            if drain && dealt > 0 {
                self.heal_player(controller, dealt)?;
            }
        }

        let player_ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        for player_id in player_ids {
            for card_id in self.zone_cards(player_id, Zone::CombatRow) {
                self.move_card(card_id, Zone::CombatRow, Zone::Field, player_id)?;
            }
        }
        self.combat.clear();
        Ok(())
    }
}
