//! Decision engine for computer-controlled players
//!
//! Scores candidate actions for one player from the current state and its
//! play style. There is no hidden state: the same `GameState` and style
//! always produce the same ranked list.

/// Append a decision line to the game log
///
/// Compiles to nothing without the `verbose-logging` feature, skipping the
/// `format!` allocations on hot simulation paths.
macro_rules! log_decision {
    ($state:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            let message = format!($($arg)*);
            $state.logger.decision(message);
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$state;
        }
    };
}

use crate::core::{AbilityEffect, Card, CardId, Element, Keyword, PlayerId};
use crate::game::{GameCommand, GameState, SelectionRequest};
use crate::zones::Zone;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a computer player leans when scoring plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayStyle {
    #[default]
    Balanced,
    /// Favors high-strength Familiars and attacking
    Aggressive,
    /// Favors high-health Familiars
    Defensive,
    /// Favors Spells
    Control,
}

impl fmt::Display for PlayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayStyle::Balanced => "balanced",
            PlayStyle::Aggressive => "aggressive",
            PlayStyle::Defensive => "defensive",
            PlayStyle::Control => "control",
        };
        f.write_str(name)
    }
}

impl FromStr for PlayStyle {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(PlayStyle::Balanced),
            "aggressive" => Ok(PlayStyle::Aggressive),
            "defensive" => Ok(PlayStyle::Defensive),
            "control" => Ok(PlayStyle::Control),
            other => Err(EngineError::ParseError(format!("unknown play style '{other}'"))),
        }
    }
}

/// One scored candidate action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: GameCommand,
    pub priority: i32,
    pub reasoning: String,
}

impl Decision {
    fn new(action: GameCommand, priority: i32, reasoning: impl Into<String>) -> Self {
        Decision {
            action,
            priority,
            reasoning: reasoning.into(),
        }
    }
}

const PRIORITY_SELECTION: i32 = 100;
const PRIORITY_AZOTH: i32 = 90;
const PRIORITY_BURST: i32 = 85;
const PRIORITY_FAMILIAR: i32 = 80;
const PRIORITY_BLOCK: i32 = 80;
const PRIORITY_SPELL: i32 = 70;
const PRIORITY_ATTACK: i32 = 70;
const PRIORITY_FLAG: i32 = 60;
const PRIORITY_ABILITY: i32 = 50;
const STYLE_BONUS: i32 = 10;

/// Scores and executes actions for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionEngine {
    pub player: PlayerId,
    pub style: PlayStyle,
}

impl DecisionEngine {
    pub fn new(player: PlayerId, style: PlayStyle) -> Self {
        DecisionEngine { player, style }
    }

    /// Every candidate action for this player right now, best first
    pub fn decisions(&self, state: &GameState) -> Vec<Decision> {
        if state.game_over {
            return Vec::new();
        }
        if let Some(pending) = &state.pending {
            if pending.player != self.player {
                return Vec::new();
            }
            return self.selection_decisions(state);
        }

        let mut decisions = self.burst_decisions(state);
        let active = state.active_player() == self.player;
        if active && state.turn.phase.allows_card_play() {
            decisions.extend(self.main_phase_decisions(state));
        }
        if state.turn.phase == crate::game::Phase::Combat {
            if active {
                decisions.extend(self.attack_decisions(state));
            } else {
                decisions.extend(self.block_decisions(state));
            }
        }
        // Stable: equal priorities keep generation order
        decisions.sort_by(|a, b| b.priority.cmp(&a.priority));
        decisions
    }

    /// Candidate plays from hand and field during a main phase
    pub fn main_phase_decisions(&self, state: &GameState) -> Vec<Decision> {
        let mut decisions = Vec::new();
        let Ok(player) = state.get_player(self.player) else {
            return decisions;
        };
        let hand = state.zone_cards(self.player, Zone::Hand);
        let pool = state.element_pool(self.player);
        let field_room = state
            .zone(self.player, Zone::Field)
            .map(|z| z.len() < state.config.max_field_size)
            .unwrap_or(false);

        if player.can_place_azoth(state.config.azoth_per_turn) {
            if let Some(decision) = self.azoth_decision(state, &hand) {
                decisions.push(decision);
            }
        }

        for card_id in &hand {
            let Ok(card) = state.cards.get(*card_id) else {
                continue;
            };
            if card.is_familiar() {
                if !field_room || card.keywords.contains(Keyword::Quintessence) {
                    continue;
                }
                let spare = pool.total().saturating_sub(card.cost.specific_total());
                let azoth_spent = match self.style {
                    PlayStyle::Aggressive => spare.max(card.cost.generic),
                    _ => card.cost.generic,
                };
                if !pool.can_pay(&card.cost.with_generic(azoth_spent)) {
                    continue;
                }
                let mut priority = PRIORITY_FAMILIAR - 5 * card.cost.generic as i32;
                if self.style == PlayStyle::Aggressive && card.base_strength() > 2 {
                    priority += STYLE_BONUS;
                }
                if self.style == PlayStyle::Defensive && card.base_health() > 2 {
                    priority += STYLE_BONUS;
                }
                decisions.push(Decision::new(
                    GameCommand::PlaySummon {
                        card: *card_id,
                        azoth_spent,
                    },
                    priority,
                    format!("Summon {} ({}/{})", card.name, card.base_strength(), card.base_health()),
                ));
            } else if card.is_spell() {
                let Some(ability) = card.abilities.first() else {
                    continue;
                };
                if !self.spell_is_useful(state, &ability.effect) {
                    continue;
                }
                let azoth_spent = if ability.effect.uses_placeholder() {
                    pool.total()
                        .saturating_sub(card.cost.specific_total())
                        .max(card.cost.generic)
                } else {
                    card.cost.generic
                };
                if !pool.can_pay(&card.cost.with_generic(azoth_spent)) {
                    continue;
                }
                let mut priority = PRIORITY_SPELL;
                if self.style == PlayStyle::Control {
                    priority += STYLE_BONUS;
                }
                decisions.push(Decision::new(
                    GameCommand::PlaySpell {
                        card: *card_id,
                        azoth_spent,
                        ability_index: 0,
                    },
                    priority,
                    format!(
                        "Cast {}: {}",
                        card.name,
                        ability.describe(azoth_spent - card.cost.generic)
                    ),
                ));
            } else if card.is_flag() {
                let flag_open = state
                    .zone(self.player, Zone::Flag)
                    .map(|z| z.is_empty())
                    .unwrap_or(false);
                if flag_open {
                    decisions.push(Decision::new(
                        GameCommand::PlayFlag { card: *card_id },
                        PRIORITY_FLAG,
                        format!("Reveal {} as Flag", card.name),
                    ));
                }
            }
        }

        for card_id in state.zone_cards(self.player, Zone::Field) {
            let Ok(card) = state.cards.get(card_id) else {
                continue;
            };
            if card.tapped || card.rested {
                continue;
            }
            for (index, ability) in card.abilities.iter().enumerate() {
                let affordable = ability.cost.as_ref().is_some_and(|cost| pool.can_pay(cost));
                if ability.is_activated() && affordable && self.spell_is_useful(state, &ability.effect) {
                    decisions.push(Decision::new(
                        GameCommand::ActivateAbility {
                            card: card_id,
                            ability_index: index,
                        },
                        PRIORITY_ABILITY,
                        format!("Activate {}: {}", card.name, ability.describe(0)),
                    ));
                    break;
                }
            }
        }

        decisions
    }

    /// Azoth placement: prefer cards that are poor Familiars
    fn azoth_decision(&self, state: &GameState, hand: &[CardId]) -> Option<Decision> {
        let cards: Vec<&Card> = hand
            .iter()
            .filter_map(|id| state.cards.get(*id).ok())
            .filter(|c| !c.is_flag())
            .collect();
        let preferred = cards
            .iter()
            .find(|c| !c.is_familiar() || c.keywords.contains(Keyword::Quintessence))
            .or_else(|| cards.last())?;

        let element = preferred.cost.primary_element().unwrap_or(Element::Generic);
        Some(Decision::new(
            GameCommand::PlayAzoth {
                card: preferred.id,
                element,
            },
            PRIORITY_AZOTH,
            format!(
                "Play Azoth to increase resources ({} as {})",
                preferred.name, element
            ),
        ))
    }

    /// Skip effects with nothing to hit
    fn spell_is_useful(&self, state: &GameState, effect: &AbilityEffect) -> bool {
        let opponent = match state.opponent_of(self.player) {
            Ok(p) => p,
            Err(_) => return false,
        };
        match effect {
            AbilityEffect::DamageEnemyFamiliars(_)
            | AbilityEffect::Destroy(_)
            | AbilityEffect::ReturnToHand(_)
            | AbilityEffect::Banish(_) => !state.familiars_in_play(opponent).is_empty(),
            AbilityEffect::AddCounters(_) | AbilityEffect::EmpowerFamiliars(_) => {
                !state.familiars_in_play(self.player).is_empty()
            }
            _ => true,
        }
    }

    /// Free plays for cards just revealed from life cards
    pub fn burst_decisions(&self, state: &GameState) -> Vec<Decision> {
        let Ok(player) = state.get_player(self.player) else {
            return Vec::new();
        };
        let field_room = state
            .zone(self.player, Zone::Field)
            .map(|z| z.len() < state.config.max_field_size)
            .unwrap_or(false);

        player
            .burst_window
            .iter()
            .filter(|id| state.is_in_zone(**id, self.player, Zone::Discard))
            .filter_map(|id| state.cards.get(*id).ok())
            .filter(|card| !card.is_flag() && (field_room || !card.is_familiar()))
            .map(|card| {
                Decision::new(
                    GameCommand::PlayBurst { card: card.id },
                    PRIORITY_BURST,
                    format!("Burst {} for free", card.name),
                )
            })
            .collect()
    }

    /// Attacks for every ready Familiar
    ///
    /// Target the weakest enemy Familiar this attacker kills. With no enemy
    /// Familiars attack directly. Otherwise hold back unless no enemy could
    /// kill the attacker on a block.
    pub fn attack_decisions(&self, state: &GameState) -> Vec<Decision> {
        let Ok(opponent) = state.opponent_of(self.player) else {
            return Vec::new();
        };
        let enemies: Vec<&Card> = state
            .zone_cards(opponent, Zone::Field)
            .into_iter()
            .filter_map(|id| state.cards.get(id).ok())
            .filter(|c| c.is_familiar())
            .collect();

        let mut decisions = Vec::new();
        for card_id in state.zone_cards(self.player, Zone::Field) {
            let Ok(attacker) = state.cards.get(card_id) else {
                continue;
            };
            if !attacker.can_attack() || attacker.strength() == 0 {
                continue;
            }

            let kill = enemies
                .iter()
                .filter(|e| e.remaining_health() < attacker.strength() && !e.shield_up)
                .min_by_key(|e| e.remaining_health());
            if let Some(target) = kill {
                decisions.push(Decision::new(
                    GameCommand::DeclareAttacker {
                        card: card_id,
                        target: Some(target.id),
                    },
                    PRIORITY_ATTACK,
                    format!(
                        "Attack {} with {}: {} strength beats {} health",
                        target.name,
                        attacker.name,
                        attacker.strength(),
                        target.remaining_health()
                    ),
                ));
                continue;
            }

            let threatened = enemies
                .iter()
                .any(|e| !e.tapped && e.strength() >= attacker.remaining_health());
            if enemies.is_empty() || !threatened || self.style == PlayStyle::Aggressive {
                decisions.push(Decision::new(
                    GameCommand::DeclareAttacker {
                        card: card_id,
                        target: None,
                    },
                    PRIORITY_ATTACK,
                    format!("Attack directly with {}", attacker.name),
                ));
            }
        }
        decisions
    }

    /// One block per unblocked direct attacker, when it pays off
    pub fn block_decisions(&self, state: &GameState) -> Vec<Decision> {
        let mut decisions = Vec::new();
        let mut used: Vec<CardId> = Vec::new();
        let blockers: Vec<&Card> = state
            .zone_cards(self.player, Zone::Field)
            .into_iter()
            .filter_map(|id| state.cards.get(id).ok())
            .filter(|c| c.is_familiar() && !c.tapped)
            .collect();

        for attacker_id in state.combat.unblocked_direct_attackers() {
            let Ok(attacker) = state.cards.get(attacker_id) else {
                continue;
            };
            if !state.is_in_zone(attacker_id, attacker.owner, Zone::CombatRow) {
                continue;
            }

            let score = |b: &&Card| -> Option<(u8, String)> {
                let kills = !attacker.shield_up && b.strength() >= attacker.remaining_health();
                let survives = b.shield_up || attacker.strength() < b.remaining_health();
                let trade_value = attacker.strength() + attacker.health() >= b.strength() + b.health();
                match (kills, survives) {
                    (true, true) => Some((3, format!("{} blocks and kills {} safely", b.name, attacker.name))),
                    (true, false) if trade_value => {
                        Some((2, format!("{} trades with {}", b.name, attacker.name)))
                    }
                    (false, true) => Some((1, format!("{} absorbs {}", b.name, attacker.name))),
                    _ => None,
                }
            };

            let best = blockers
                .iter()
                .filter(|b| !used.contains(&b.id))
                .filter_map(|b| score(b).map(|(rank, why)| (rank, b.id, why)))
                .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

            if let Some((_, blocker, reasoning)) = best {
                used.push(blocker);
                decisions.push(Decision::new(
                    GameCommand::DeclareBlocker {
                        card: blocker,
                        attacker: attacker_id,
                    },
                    PRIORITY_BLOCK,
                    reasoning,
                ));
            }
        }
        decisions
    }

    /// Answer this player's open selection
    ///
    /// Targets: the first enemy card, else the first valid target.
    /// Amalgam: the first option.
    pub fn selection_decisions(&self, state: &GameState) -> Vec<Decision> {
        let Some(pending) = &state.pending else {
            return Vec::new();
        };
        let action = match &pending.request {
            SelectionRequest::Target { valid_targets, .. } => {
                let enemy = valid_targets
                    .iter()
                    .find(|id| state.cards.get(**id).is_ok_and(|c| c.controller != self.player));
                let Some(target) = enemy.or_else(|| valid_targets.first()) else {
                    return Vec::new();
                };
                GameCommand::ResolveKeywordTarget {
                    token: pending.token,
                    target: *target,
                }
            }
            SelectionRequest::AmalgamPair { .. } | SelectionRequest::AmalgamElement { .. } => {
                GameCommand::ResolveAmalgamChoice {
                    token: pending.token,
                    choice: 0,
                }
            }
        };
        vec![Decision::new(
            action,
            PRIORITY_SELECTION,
            format!("Answer {} for {}", pending.keyword, state.card_name(pending.source)),
        )]
    }

    /// Best candidate, if any
    pub fn best_decision(&self, state: &GameState) -> Option<Decision> {
        self.decisions(state).into_iter().next()
    }

    /// Execute a decision through the regular command path
    pub fn execute_decision(&self, state: &mut GameState, decision: &Decision) -> Result<()> {
        log_decision!(
            state,
            "{} decides: {} (priority {})",
            state.player_name(self.player),
            decision.reasoning,
            decision.priority
        );
        state.execute(self.player, decision.action.clone())?;
        Ok(())
    }

    /// Execute the best candidate that succeeds; false when none did
    pub fn act(&self, state: &mut GameState) -> Result<bool> {
        for decision in self.decisions(state) {
            match self.execute_decision(state, &decision) {
                Ok(()) => return Ok(true),
                Err(EngineError::GameOver) => return Ok(false),
                Err(err) if err.is_rule_violation() => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(false)
    }

    /// Act once, or advance the phase when this player is active and has
    /// nothing left to do. Returns false when nothing happened.
    pub fn take_turn_step(&self, state: &mut GameState) -> Result<bool> {
        if self.act(state)? {
            return Ok(true);
        }
        if state.game_over || state.pending.is_some() || state.active_player() != self.player {
            return Ok(false);
        }
        state.advance_to_next_phase()?;
        Ok(true)
    }
}
