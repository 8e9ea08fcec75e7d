//! Game commands and the card action resolver
//!
//! Every inbound command goes through [`GameState::execute`], which makes
//! the command transactional: a rejected command leaves the state exactly
//! as it was and appends one line describing the rejection to the log.

use crate::core::{AzothSource, CardId, CardKind, Element, Keyword, PlayerId, TriggerEvent};
use crate::game::keywords::{KeywordContext, PendingSelection, PlayMethod};
use crate::game::{GameEndReason, GameState, Phase};
use crate::zones::{Placement, Zone};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Types of game commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCommand {
    /// Summon a Familiar, committing `azoth_spent` units to its generic cost
    PlaySummon { card: CardId, azoth_spent: u32 },

    /// Summon a Familiar by sacrificing field cards for a discount
    PlayTribute {
        card: CardId,
        tributes: SmallVec<[CardId; 4]>,
    },

    /// Place a card in the Azoth row producing `element`
    PlayAzoth { card: CardId, element: Element },

    /// Cast a Spell; the surplus over its generic cost becomes `X`
    PlaySpell {
        card: CardId,
        azoth_spent: u32,
        ability_index: usize,
    },

    /// Play a card just revealed from life cards
    PlayBurst { card: CardId },

    /// Reveal a Flag into the flag zone
    PlayFlag { card: CardId },

    ActivateAbility { card: CardId, ability_index: usize },

    AdvancePhase { requested: Phase },

    DeclareAttacker {
        card: CardId,
        target: Option<CardId>,
    },

    DeclareBlocker { card: CardId, attacker: CardId },

    ResolveKeywordTarget { token: u32, target: CardId },

    ResolveAmalgamChoice { token: u32, choice: usize },

    /// Give up; the other player wins
    Concede,
}

impl GameCommand {
    /// Commands that answer a pending selection
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            GameCommand::ResolveKeywordTarget { .. } | GameCommand::ResolveAmalgamChoice { .. }
        )
    }

    /// Commands accepted while a selection is open
    pub fn allowed_while_pending(&self) -> bool {
        self.is_selection() || matches!(self, GameCommand::Concede)
    }
}

impl fmt::Display for GameCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameCommand::PlaySummon { card, azoth_spent } => {
                write!(f, "summon {card} spending {azoth_spent}")
            }
            GameCommand::PlayTribute { card, tributes } => {
                write!(f, "tribute {tributes:?} for {card}")
            }
            GameCommand::PlayAzoth { card, element } => write!(f, "azoth {card} as {element}"),
            GameCommand::PlaySpell {
                card,
                azoth_spent,
                ability_index,
            } => write!(f, "spell {card} ability {ability_index} spending {azoth_spent}"),
            GameCommand::PlayBurst { card } => write!(f, "burst {card}"),
            GameCommand::PlayFlag { card } => write!(f, "flag {card}"),
            GameCommand::ActivateAbility {
                card,
                ability_index,
            } => write!(f, "activate {card} ability {ability_index}"),
            GameCommand::AdvancePhase { requested } => write!(f, "advance to {requested}"),
            GameCommand::DeclareAttacker { card, target } => match target {
                Some(t) => write!(f, "attack {t} with {card}"),
                None => write!(f, "attack directly with {card}"),
            },
            GameCommand::DeclareBlocker { card, attacker } => {
                write!(f, "block {attacker} with {card}")
            }
            GameCommand::ResolveKeywordTarget { token, target } => {
                write!(f, "target {target} for selection {token}")
            }
            GameCommand::ResolveAmalgamChoice { token, choice } => {
                write!(f, "choose option {choice} for selection {token}")
            }
            GameCommand::Concede => write!(f, "concede"),
        }
    }
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Log lines appended by the command
    pub log: Vec<String>,
    /// Selection the caller must answer before anything else happens
    pub pending: Option<PendingSelection>,
}

impl GameState {
    /// Run one command as a transaction
    pub fn execute(&mut self, player_id: PlayerId, command: GameCommand) -> Result<CommandOutcome> {
        if self.game_over {
            return Err(self.reject(player_id, EngineError::GameOver));
        }
        if let Some(pending) = &self.pending {
            if !command.allowed_while_pending() {
                let token = pending.token;
                return Err(self.reject(player_id, EngineError::AwaitingSelection(token)));
            }
        }

        let mark = self.logger.len();
        let log = std::mem::take(&mut self.logger);
        let checkpoint = self.clone();
        self.logger = log;

        match self.dispatch(player_id, &command) {
            Ok(pending) => {
                let pending = if self.game_over { None } else { pending };
                Ok(CommandOutcome {
                    log: self.logger.messages_since(mark),
                    pending,
                })
            }
            Err(err) => {
                let log = std::mem::take(&mut self.logger);
                *self = checkpoint;
                self.logger = log;
                self.logger.truncate(mark);
                Err(self.reject(player_id, err))
            }
        }
    }

    fn reject(&mut self, player_id: PlayerId, err: EngineError) -> EngineError {
        let message = format!("{}: {}", self.player_name(player_id), err);
        self.log(message);
        err
    }

    fn dispatch(
        &mut self,
        player_id: PlayerId,
        command: &GameCommand,
    ) -> Result<Option<PendingSelection>> {
        match command {
            GameCommand::PlaySummon { card, azoth_spent } => {
                self.summon_internal(player_id, *card, *azoth_spent)
            }
            GameCommand::PlayTribute { card, tributes } => {
                self.tribute_internal(player_id, *card, tributes)
            }
            GameCommand::PlayAzoth { card, element } => {
                self.azoth_internal(player_id, *card, *element)
            }
            GameCommand::PlaySpell {
                card,
                azoth_spent,
                ability_index,
            } => self.spell_internal(player_id, *card, *azoth_spent, *ability_index),
            GameCommand::PlayBurst { card } => self.burst_internal(player_id, *card).map(|_| None),
            GameCommand::PlayFlag { card } => self.flag_internal(player_id, *card).map(|_| None),
            GameCommand::ActivateAbility {
                card,
                ability_index,
            } => self
                .activate_internal(player_id, *card, *ability_index)
                .map(|_| None),
            GameCommand::AdvancePhase { requested } => self
                .advance_phase_internal(player_id, *requested)
                .map(|_| None),
            GameCommand::DeclareAttacker { card, target } => self
                .declare_attacker_internal(player_id, *card, *target)
                .map(|_| None),
            GameCommand::DeclareBlocker { card, attacker } => self
                .declare_blocker_internal(player_id, *card, *attacker)
                .map(|_| None),
            GameCommand::ResolveKeywordTarget { token, target } => {
                self.resolve_keyword_target_internal(player_id, *token, *target)
            }
            GameCommand::ResolveAmalgamChoice { token, choice } => {
                self.resolve_amalgam_choice_internal(player_id, *token, *choice)
            }
            GameCommand::Concede => self.concede_internal(player_id).map(|_| None),
        }
    }

    // ----- public command surface -----

    pub fn play_summon(
        &mut self,
        player_id: PlayerId,
        card: CardId,
        azoth_spent: u32,
    ) -> Result<CommandOutcome> {
        self.execute(player_id, GameCommand::PlaySummon { card, azoth_spent })
    }

    pub fn play_tribute(
        &mut self,
        player_id: PlayerId,
        card: CardId,
        tributes: &[CardId],
    ) -> Result<CommandOutcome> {
        let tributes = tributes.iter().copied().collect();
        self.execute(player_id, GameCommand::PlayTribute { card, tributes })
    }

    pub fn play_azoth(
        &mut self,
        player_id: PlayerId,
        card: CardId,
        element: Element,
    ) -> Result<CommandOutcome> {
        self.execute(player_id, GameCommand::PlayAzoth { card, element })
    }

    pub fn play_spell(
        &mut self,
        player_id: PlayerId,
        card: CardId,
        azoth_spent: u32,
        ability_index: usize,
    ) -> Result<CommandOutcome> {
        self.execute(
            player_id,
            GameCommand::PlaySpell {
                card,
                azoth_spent,
                ability_index,
            },
        )
    }

    pub fn play_burst(&mut self, player_id: PlayerId, card: CardId) -> Result<CommandOutcome> {
        self.execute(player_id, GameCommand::PlayBurst { card })
    }

    pub fn play_flag(&mut self, player_id: PlayerId, card: CardId) -> Result<CommandOutcome> {
        self.execute(player_id, GameCommand::PlayFlag { card })
    }

    pub fn activate_ability(
        &mut self,
        player_id: PlayerId,
        card: CardId,
        ability_index: usize,
    ) -> Result<CommandOutcome> {
        self.execute(
            player_id,
            GameCommand::ActivateAbility {
                card,
                ability_index,
            },
        )
    }

    /// Request the next phase; only the fixed successor is accepted
    pub fn advance_phase(&mut self, player_id: PlayerId, requested: Phase) -> Result<CommandOutcome> {
        self.execute(player_id, GameCommand::AdvancePhase { requested })
    }

    /// Advance the active player to the successor of the current phase
    pub fn advance_to_next_phase(&mut self) -> Result<CommandOutcome> {
        let requested = self.turn.phase.successor();
        self.advance_phase(self.active_player(), requested)
    }

    /// Attack with a card on behalf of its controller
    pub fn declare_attacker(&mut self, card: CardId, target: Option<CardId>) -> Result<CommandOutcome> {
        let player_id = self.cards.get(card)?.controller;
        self.execute(player_id, GameCommand::DeclareAttacker { card, target })
    }

    /// Block with a card on behalf of its controller
    pub fn declare_blocker(&mut self, card: CardId, attacker: CardId) -> Result<CommandOutcome> {
        let player_id = self.cards.get(card)?.controller;
        self.execute(player_id, GameCommand::DeclareBlocker { card, attacker })
    }

    /// Answer the open targeting selection on behalf of its player
    pub fn resolve_keyword_target(&mut self, token: u32, target: CardId) -> Result<CommandOutcome> {
        let player_id = self.selection_player();
        self.execute(player_id, GameCommand::ResolveKeywordTarget { token, target })
    }

    /// Answer the open Amalgam choice on behalf of its player
    pub fn resolve_amalgam_choice(&mut self, token: u32, choice: usize) -> Result<CommandOutcome> {
        let player_id = self.selection_player();
        self.execute(player_id, GameCommand::ResolveAmalgamChoice { token, choice })
    }

    /// Either player may concede at any time, even mid-selection
    pub fn concede(&mut self, player_id: PlayerId) -> Result<CommandOutcome> {
        self.execute(player_id, GameCommand::Concede)
    }

    fn selection_player(&self) -> PlayerId {
        self.pending
            .as_ref()
            .map(|p| p.player)
            .unwrap_or_else(|| self.active_player())
    }

    // ----- card action resolver -----

    /// Common checks for a card played from hand
    fn check_hand_play(&self, player_id: PlayerId, card_id: CardId) -> Result<()> {
        if !self.is_in_zone(card_id, player_id, Zone::Hand) {
            return Err(EngineError::CardNotFound(format!(
                "{} is not in {}'s hand",
                self.card_name(card_id),
                self.player_name(player_id)
            )));
        }
        if player_id != self.active_player() {
            return Err(EngineError::InvalidPlay(format!(
                "{} is not the active player",
                self.player_name(player_id)
            )));
        }
        if !self.turn.phase.allows_card_play() {
            return Err(EngineError::InvalidPhase(format!(
                "cards cannot be played during {}",
                self.turn.phase
            )));
        }
        Ok(())
    }

    fn check_field_room(&self, player_id: PlayerId) -> Result<()> {
        let occupied = self.zone(player_id, Zone::Field)?.len();
        if occupied >= self.config.max_field_size {
            return Err(EngineError::InvalidPlay(format!(
                "{}'s field is full ({} cards)",
                self.player_name(player_id),
                occupied
            )));
        }
        Ok(())
    }

    /// Draw the card that replaces one played from hand
    fn draw_replacement(&mut self, player_id: PlayerId) -> Result<()> {
        self.draw_card(player_id)?;
        Ok(())
    }

    fn summon_internal(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
        azoth_spent: u32,
    ) -> Result<Option<PendingSelection>> {
        self.check_hand_play(player_id, card_id)?;
        let card = self.cards.get(card_id)?;
        if !card.is_familiar() {
            return Err(EngineError::InvalidPlay(format!(
                "{} is a {}, not a Familiar",
                card.name, card.kind
            )));
        }
        if card.keywords.contains(Keyword::Quintessence) {
            return Err(EngineError::InvalidPlay(format!(
                "{} with Quintessence cannot be played as a Familiar",
                card.name
            )));
        }
        let cost = card.cost;
        if azoth_spent < cost.generic {
            return Err(EngineError::InsufficientResources(format!(
                "{} needs at least {} generic Azoth, {} committed",
                card.name, cost.generic, azoth_spent
            )));
        }
        self.check_field_room(player_id)?;

        let payment = self.pay_from_azoth_row(player_id, &cost.with_generic(azoth_spent))?;
        let counters = azoth_spent - cost.generic;

        self.move_card(card_id, Zone::Hand, Zone::Field, player_id)?;
        self.cards.get_mut(card_id)?.enter_field(counters);
        let message = format!(
            "{} summoned {} with {} +1 counters",
            self.player_name(player_id),
            self.card_name(card_id),
            counters
        );
        self.log(message);

        self.draw_replacement(player_id)?;
        self.fire_card_triggers(card_id, TriggerEvent::OnSummon)?;
        self.resolve_play_keywords(KeywordContext {
            source: card_id,
            player: player_id,
            method: PlayMethod::Summon,
            spent: payment.spent,
        })
    }

    fn tribute_internal(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
        tributes: &[CardId],
    ) -> Result<Option<PendingSelection>> {
        self.check_hand_play(player_id, card_id)?;
        let card = self.cards.get(card_id)?;
        if !card.is_familiar() {
            return Err(EngineError::InvalidPlay(format!(
                "{} is a {}, not a Familiar",
                card.name, card.kind
            )));
        }
        if card.keywords.contains(Keyword::Quintessence) {
            return Err(EngineError::InvalidPlay(format!(
                "{} with Quintessence cannot be played as a Familiar",
                card.name
            )));
        }
        let cost = card.cost;
        if tributes.is_empty() {
            return Err(EngineError::InvalidPlay(
                "a tribute needs at least one card to sacrifice".to_string(),
            ));
        }

        let mut reduction = 0;
        for (i, tribute) in tributes.iter().enumerate() {
            if tributes[..i].contains(tribute) {
                return Err(EngineError::InvalidPlay(format!(
                    "{} is tributed twice",
                    self.card_name(*tribute)
                )));
            }
            if !self.is_in_zone(*tribute, player_id, Zone::Field) {
                return Err(EngineError::CardNotFound(format!(
                    "{} is not on {}'s field",
                    self.card_name(*tribute),
                    self.player_name(player_id)
                )));
            }
            let tribute_card = self.cards.get(*tribute)?;
            reduction += tribute_card.cost.total() + tribute_card.counters;
        }

        let reduced = cost.reduced_by(reduction);
        let payment = self.pay_from_azoth_row(player_id, &reduced)?;

        for tribute in tributes {
            self.move_card(*tribute, Zone::Field, Zone::RemovedFromPlay, player_id)?;
            let message = format!("{} is tributed", self.card_name(*tribute));
            self.log(message);
        }
        self.move_card(card_id, Zone::Hand, Zone::Field, player_id)?;
        self.cards.get_mut(card_id)?.enter_field(0);
        let message = format!(
            "{} tributed {} card(s) to summon {} for {}",
            self.player_name(player_id),
            tributes.len(),
            self.card_name(card_id),
            reduced
        );
        self.log(message);

        self.draw_replacement(player_id)?;
        self.fire_card_triggers(card_id, TriggerEvent::OnSummon)?;
        self.resolve_play_keywords(KeywordContext {
            source: card_id,
            player: player_id,
            method: PlayMethod::Tribute,
            spent: payment.spent,
        })
    }

    fn azoth_internal(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
        element: Element,
    ) -> Result<Option<PendingSelection>> {
        self.check_hand_play(player_id, card_id)?;
        let card = self.cards.get(card_id)?;
        if card.is_flag() {
            return Err(EngineError::InvalidPlay(format!(
                "{} is a Flag and cannot be placed as Azoth",
                card.name
            )));
        }
        let quintessence = card.keywords.contains(Keyword::Quintessence);
        let amalgam = card.keywords.contains(Keyword::Amalgam) && !card.amalgam_elements.is_empty();
        if !self.get_player(player_id)?.can_place_azoth(self.config.azoth_per_turn) {
            return Err(EngineError::InvalidPlay(format!(
                "{} has already placed Azoth this turn",
                self.player_name(player_id)
            )));
        }

        self.move_card(card_id, Zone::Hand, Zone::AzothRow, player_id)?;
        self.get_player_mut(player_id)?.record_azoth();

        let source = if quintessence {
            AzothSource::Wildcard
        } else {
            AzothSource::Element(element)
        };
        if !amalgam {
            self.cards.get_mut(card_id)?.azoth_source = Some(source);
        }
        let message = if amalgam {
            format!(
                "{} placed {} as Azoth",
                self.player_name(player_id),
                self.card_name(card_id)
            )
        } else {
            format!(
                "{} placed {} as {} Azoth",
                self.player_name(player_id),
                self.card_name(card_id),
                source
            )
        };
        self.log(message);

        self.draw_replacement(player_id)?;
        self.resolve_play_keywords(KeywordContext {
            source: card_id,
            player: player_id,
            method: PlayMethod::Azoth,
            spent: Default::default(),
        })
    }

    fn spell_internal(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
        azoth_spent: u32,
        ability_index: usize,
    ) -> Result<Option<PendingSelection>> {
        self.check_hand_play(player_id, card_id)?;
        let card = self.cards.get(card_id)?;
        if !card.is_spell() {
            return Err(EngineError::InvalidPlay(format!(
                "{} is a {}, not a Spell",
                card.name, card.kind
            )));
        }
        let Some(ability) = card.abilities.get(ability_index).cloned() else {
            return Err(EngineError::InvalidPlay(format!(
                "{} has no ability {}",
                card.name, ability_index
            )));
        };
        let cost = card.cost;
        if azoth_spent < cost.generic {
            return Err(EngineError::InsufficientResources(format!(
                "{} needs at least {} generic Azoth, {} committed",
                card.name, cost.generic, azoth_spent
            )));
        }

        let payment = self.pay_from_azoth_row(player_id, &cost.with_generic(azoth_spent))?;
        let x = azoth_spent - cost.generic;
        let message = format!(
            "{} cast {}: {}",
            self.player_name(player_id),
            self.card_name(card_id),
            ability.describe(x)
        );
        self.log(message);

        self.execute_ability_effect(player_id, card_id, &ability.effect, x)?;
        self.move_card_to(card_id, Zone::Hand, Zone::Deck, player_id, Placement::Bottom)?;

        self.draw_replacement(player_id)?;
        self.resolve_play_keywords(KeywordContext {
            source: card_id,
            player: player_id,
            method: PlayMethod::Spell,
            spent: payment.spent,
        })
    }

    fn burst_internal(&mut self, player_id: PlayerId, card_id: CardId) -> Result<()> {
        if !self.get_player(player_id)?.can_burst(card_id)
            || !self.is_in_zone(card_id, player_id, Zone::Discard)
        {
            return Err(EngineError::CardNotFound(format!(
                "{} was not just revealed from {}'s life cards",
                self.card_name(card_id),
                self.player_name(player_id)
            )));
        }
        let card = self.cards.get(card_id)?;
        let kind = card.kind;
        let name = card.name.to_string();
        let quintessence = card.keywords.contains(Keyword::Quintessence);
        let primary = card.cost.primary_element();
        let first_ability = card.abilities.first().cloned();
        let x = self.life_points(player_id) as u32;

        match kind {
            CardKind::Familiar { .. } => {
                self.check_field_room(player_id)?;
                self.move_card(card_id, Zone::Discard, Zone::Field, player_id)?;
                self.cards.get_mut(card_id)?.enter_field(0);
                let message = format!("{} burst {} onto the field", self.player_name(player_id), name);
                self.log(message);
            }
            CardKind::Spell { .. } => {
                let message = match &first_ability {
                    Some(ability) => format!(
                        "{} burst {}: {}",
                        self.player_name(player_id),
                        name,
                        ability.describe(x)
                    ),
                    None => format!("{} burst {}", self.player_name(player_id), name),
                };
                self.log(message);
                if let Some(ability) = first_ability {
                    self.execute_ability_effect(player_id, card_id, &ability.effect, x)?;
                }
                self.move_card_to(card_id, Zone::Discard, Zone::Deck, player_id, Placement::Bottom)?;
            }
            CardKind::Azoth => {
                let source = if quintessence {
                    AzothSource::Wildcard
                } else {
                    AzothSource::Element(primary.unwrap_or(Element::Generic))
                };
                self.move_card(card_id, Zone::Discard, Zone::AzothRow, player_id)?;
                self.cards.get_mut(card_id)?.azoth_source = Some(source);
                let message = format!(
                    "{} burst {} as {} Azoth",
                    self.player_name(player_id),
                    name,
                    source
                );
                self.log(message);
            }
            CardKind::Flag => {
                return Err(EngineError::InvalidPlay(format!(
                    "{name} is a Flag and cannot be played through Burst"
                )));
            }
        }

        self.get_player_mut(player_id)?
            .burst_window
            .retain(|id| *id != card_id);
        Ok(())
    }

    fn flag_internal(&mut self, player_id: PlayerId, card_id: CardId) -> Result<()> {
        self.check_hand_play(player_id, card_id)?;
        let card = self.cards.get(card_id)?;
        if !card.is_flag() {
            return Err(EngineError::InvalidPlay(format!(
                "{} is a {}, not a Flag",
                card.name, card.kind
            )));
        }
        if !self.zone(player_id, Zone::Flag)?.is_empty() {
            return Err(EngineError::InvalidPlay(format!(
                "{} already has a Flag",
                self.player_name(player_id)
            )));
        }
        self.move_card(card_id, Zone::Hand, Zone::Flag, player_id)?;
        let message = format!(
            "{} revealed {} as their Flag",
            self.player_name(player_id),
            self.card_name(card_id)
        );
        self.log(message);
        Ok(())
    }

    fn concede_internal(&mut self, player_id: PlayerId) -> Result<()> {
        self.get_player(player_id)?;
        let message = format!("{} concedes", self.player_name(player_id));
        self.log(message);
        self.end_game(player_id, GameEndReason::Conceded(player_id))
    }

    fn activate_internal(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
        ability_index: usize,
    ) -> Result<()> {
        if !self.is_in_zone(card_id, player_id, Zone::Field) {
            return Err(EngineError::CardNotFound(format!(
                "{} is not on {}'s field",
                self.card_name(card_id),
                self.player_name(player_id)
            )));
        }
        if player_id != self.active_player() {
            return Err(EngineError::InvalidPlay(format!(
                "{} is not the active player",
                self.player_name(player_id)
            )));
        }
        if !self.turn.phase.allows_card_play() {
            return Err(EngineError::InvalidPhase(format!(
                "abilities cannot be activated during {}",
                self.turn.phase
            )));
        }
        let card = self.cards.get(card_id)?;
        if card.tapped || card.rested {
            return Err(EngineError::InvalidPlay(format!(
                "{} has already acted this turn",
                card.name
            )));
        }
        let ability = match card.abilities.get(ability_index) {
            Some(ability) if ability.is_activated() => ability.clone(),
            _ => {
                return Err(EngineError::InvalidPlay(format!(
                    "{} has no activated ability {}",
                    card.name, ability_index
                )))
            }
        };

        if let Some(cost) = &ability.cost {
            self.pay_from_azoth_row(player_id, cost)?;
        }
        self.cards.get_mut(card_id)?.rest();
        let message = format!(
            "{} activated {}: {}",
            self.player_name(player_id),
            self.card_name(card_id),
            ability.describe(0)
        );
        self.log(message);
        self.execute_ability_effect(player_id, card_id, &ability.effect, 0)
    }
}
