//! Keyword effect engine
//!
//! Each keyword maps to one `KeywordEffect` through [`resolve`]. Effects
//! that need a choice (a target or an Amalgam option) suspend the play as a
//! `PendingSelection`; the remaining keywords of that play resume once the
//! selection is answered.

use crate::core::{
    AmalgamOption, AzothSource, CardId, Element, ElementCost, Keyword, PlayerId,
};
use crate::game::GameState;
use crate::zones::{Placement, Zone};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// How the card carrying the keywords was played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMethod {
    Summon,
    Tribute,
    Spell,
    Azoth,
    Burst,
}

/// Everything a keyword needs to know about the play that triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordContext {
    pub source: CardId,
    pub player: PlayerId,
    pub method: PlayMethod,
    /// Units spent per element on the play
    pub spent: ElementCost,
}

/// Which field cards a targeting keyword may pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRule {
    /// Familiars with counters, or Spells with strength up to `max_strength`
    CountersOrSpell { max_strength: u32, excluded: Element },
    /// Any card on a field
    AnyFieldCard { excluded: Element },
}

impl TargetRule {
    fn excluded(&self) -> Element {
        match self {
            TargetRule::CountersOrSpell { excluded, .. } | TargetRule::AnyFieldCard { excluded } => {
                *excluded
            }
        }
    }
}

/// Where a targeted card is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relocation {
    LifeCardsBottom,
    OwnerHand,
    SecondFromTop,
    RemovedFromPlay,
}

impl Relocation {
    fn destination(&self) -> (Zone, Placement) {
        match self {
            Relocation::LifeCardsBottom => (Zone::LifeCards, Placement::Bottom),
            Relocation::OwnerHand => (Zone::Hand, Placement::Top),
            Relocation::SecondFromTop => (Zone::Deck, Placement::SecondFromTop),
            Relocation::RemovedFromPlay => (Zone::RemovedFromPlay, Placement::Top),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Relocation::LifeCardsBottom => "placed on the bottom of its owner's life cards",
            Relocation::OwnerHand => "returned to its owner's hand",
            Relocation::SecondFromTop => "placed below the top card of its owner's deck",
            Relocation::RemovedFromPlay => "removed from the game",
        }
    }
}

/// What a keyword does for one particular play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordEffect {
    /// Pick one keyword+element pair (Familiar plays)
    ChooseAmalgamPair,
    /// Pick the element this card produces (Azoth plays)
    ChooseAmalgamElement,
    Relocate {
        keyword: Keyword,
        rule: TargetRule,
        destination: Relocation,
    },
    /// Extra damage whenever this card damages a Familiar
    InfernoBonus(u32),
    /// Damage this card can take over from other friendly Familiars
    SteadfastShield(u32),
    QuintessenceWildcard,
    None,
}

/// Map a keyword and its play context to an effect
pub fn resolve(keyword: Keyword, ctx: &KeywordContext) -> KeywordEffect {
    match keyword {
        Keyword::Amalgam if ctx.method == PlayMethod::Azoth => KeywordEffect::ChooseAmalgamElement,
        Keyword::Amalgam => KeywordEffect::ChooseAmalgamPair,
        Keyword::Brilliance => KeywordEffect::Relocate {
            keyword,
            rule: TargetRule::CountersOrSpell {
                max_strength: ctx.spent.aether,
                excluded: Element::Nether,
            },
            destination: Relocation::LifeCardsBottom,
        },
        Keyword::Gust => KeywordEffect::Relocate {
            keyword,
            rule: TargetRule::CountersOrSpell {
                max_strength: ctx.spent.air,
                excluded: Element::Fire,
            },
            destination: Relocation::OwnerHand,
        },
        Keyword::Inferno => KeywordEffect::InfernoBonus(ctx.spent.fire),
        Keyword::Steadfast => KeywordEffect::SteadfastShield(ctx.spent.earth),
        Keyword::Submerged => KeywordEffect::Relocate {
            keyword,
            rule: TargetRule::CountersOrSpell {
                max_strength: ctx.spent.water,
                excluded: Element::Water,
            },
            destination: Relocation::SecondFromTop,
        },
        Keyword::Quintessence if ctx.method == PlayMethod::Azoth => {
            KeywordEffect::QuintessenceWildcard
        }
        Keyword::Quintessence => KeywordEffect::None,
        Keyword::Void => KeywordEffect::Relocate {
            keyword,
            rule: TargetRule::AnyFieldCard {
                excluded: Element::Aether,
            },
            destination: Relocation::RemovedFromPlay,
        },
    }
}

/// The question a pending selection asks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionRequest {
    Target {
        valid_targets: SmallVec<[CardId; 8]>,
        destination: Relocation,
    },
    AmalgamPair {
        options: SmallVec<[AmalgamOption; 2]>,
    },
    AmalgamElement {
        options: SmallVec<[Element; 2]>,
    },
}

/// Keywords of a play still to resolve after the current selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordContinuation {
    pub context: KeywordContext,
    pub remaining: SmallVec<[Keyword; 8]>,
}

/// A keyword waiting for its controller to choose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSelection {
    pub token: u32,
    pub player: PlayerId,
    pub source: CardId,
    pub keyword: Keyword,
    pub request: SelectionRequest,
    pub continuation: KeywordContinuation,
}

impl PendingSelection {
    /// Number of answers the request accepts
    pub fn option_count(&self) -> usize {
        match &self.request {
            SelectionRequest::Target { valid_targets, .. } => valid_targets.len(),
            SelectionRequest::AmalgamPair { options } => options.len(),
            SelectionRequest::AmalgamElement { options } => options.len(),
        }
    }
}

impl fmt::Display for PendingSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "selection #{} for {} ({} options)",
            self.token,
            self.keyword,
            self.option_count()
        )
    }
}

impl GameState {
    /// Resolve a card's keywords for a play
    ///
    /// Azoth plays only resolve Amalgam and Quintessence; Burst plays never
    /// resolve keywords. Returns the selection that suspended resolution,
    /// if any.
    pub(crate) fn resolve_play_keywords(
        &mut self,
        context: KeywordContext,
    ) -> Result<Option<PendingSelection>> {
        if context.method == PlayMethod::Burst {
            return Ok(None);
        }
        let card = self.cards.get(context.source)?;
        let remaining: SmallVec<[Keyword; 8]> = card
            .keywords
            .iter()
            .filter(|k| {
                context.method != PlayMethod::Azoth
                    || matches!(k, Keyword::Amalgam | Keyword::Quintessence)
            })
            .collect();

        self.run_keyword_queue(KeywordContinuation { context, remaining })
    }

    fn run_keyword_queue(
        &mut self,
        mut continuation: KeywordContinuation,
    ) -> Result<Option<PendingSelection>> {
        while !continuation.remaining.is_empty() {
            let keyword = continuation.remaining.remove(0);
            let effect = resolve(keyword, &continuation.context);
            if let Some(request) = self.apply_keyword_effect(effect, &continuation.context)? {
                let pending = PendingSelection {
                    token: self.next_token(),
                    player: continuation.context.player,
                    source: continuation.context.source,
                    keyword,
                    request,
                    continuation,
                };
                self.pending = Some(pending.clone());
                return Ok(Some(pending));
            }
        }

        if continuation.context.method != PlayMethod::Azoth {
            self.log_keyword_synergies(continuation.context.player);
        }
        Ok(None)
    }

    /// Apply an effect; returns a request when the effect needs a choice
    fn apply_keyword_effect(
        &mut self,
        effect: KeywordEffect,
        ctx: &KeywordContext,
    ) -> Result<Option<SelectionRequest>> {
        let name = self.card_name(ctx.source);
        let on_field = matches!(self.locate_card(ctx.source), Some((_, zone)) if zone.is_in_play());

        match effect {
            KeywordEffect::ChooseAmalgamPair => {
                self.log(format!(
                    "{name} triggers Amalgam - choose a keyword and element"
                ));
                let options = self.cards.get(ctx.source)?.amalgam_options.clone();
                if options.is_empty() || !on_field {
                    self.log(format!("{name} has no Amalgam options"));
                    return Ok(None);
                }
                Ok(Some(SelectionRequest::AmalgamPair { options }))
            }
            KeywordEffect::ChooseAmalgamElement => {
                self.log(format!(
                    "{name} triggers Amalgam - choose an element type for Azoth"
                ));
                let options = self.cards.get(ctx.source)?.amalgam_elements.clone();
                if options.is_empty() {
                    self.log(format!("{name} has no Amalgam elements"));
                    return Ok(None);
                }
                Ok(Some(SelectionRequest::AmalgamElement { options }))
            }
            KeywordEffect::Relocate {
                keyword,
                rule,
                destination,
            } => {
                let prompt = match keyword {
                    Keyword::Brilliance => "choose a target to place on bottom of life cards",
                    Keyword::Gust => "choose a target to return to owner's hand",
                    Keyword::Submerged => "choose a target to place below top of owner's deck",
                    _ => "choose a target to remove from the game",
                };
                self.log(format!("{name} triggers {keyword} - {prompt}"));
                let valid_targets = self.keyword_targets(ctx.source, rule);
                if valid_targets.is_empty() {
                    self.log(format!("{name}'s {keyword} has no valid targets"));
                    return Ok(None);
                }
                Ok(Some(SelectionRequest::Target {
                    valid_targets,
                    destination,
                }))
            }
            KeywordEffect::InfernoBonus(bonus) => {
                self.log(format!(
                    "{name} triggers Inferno - will add {bonus} additional damage when damage is dealt"
                ));
                if on_field {
                    self.cards.get_mut(ctx.source)?.inferno_bonus = bonus;
                }
                Ok(None)
            }
            KeywordEffect::SteadfastShield(amount) => {
                self.log(format!(
                    "{name} triggers Steadfast - can redirect up to {amount} damage"
                ));
                if on_field {
                    self.cards.get_mut(ctx.source)?.steadfast_remaining = amount;
                }
                Ok(None)
            }
            KeywordEffect::QuintessenceWildcard => {
                self.cards.get_mut(ctx.source)?.azoth_source = Some(AzothSource::Wildcard);
                self.log(format!(
                    "{name} with Quintessence can produce any Azoth type"
                ));
                Ok(None)
            }
            KeywordEffect::None => Ok(None),
        }
    }

    /// Field cards a targeting keyword may choose, in turn order
    pub fn keyword_targets(&self, source: CardId, rule: TargetRule) -> SmallVec<[CardId; 8]> {
        let excluded = rule.excluded();
        self.players
            .iter()
            .flat_map(|p| self.zone_cards(p.id, Zone::Field))
            .filter(|id| *id != source)
            .filter(|id| {
                let Ok(card) = self.cards.get(*id) else {
                    return false;
                };
                if card.has_element(excluded) {
                    return false;
                }
                match rule {
                    TargetRule::CountersOrSpell { max_strength, .. } => {
                        (card.is_familiar() && card.counters > 0)
                            || (card.is_spell() && card.base_strength() <= max_strength)
                    }
                    TargetRule::AnyFieldCard { .. } => true,
                }
            })
            .collect()
    }

    /// Log a flavor line for every keyword shared by two or more field cards
    pub(crate) fn log_keyword_synergies(&mut self, player_id: PlayerId) {
        let field = self.zone_cards(player_id, Zone::Field);
        for keyword in Keyword::ALL {
            let count = field
                .iter()
                .filter(|id| self.cards.get(**id).is_ok_and(|c| c.has_keyword(keyword)))
                .count();
            if count > 1 {
                self.log(format!(
                    "{count} {keyword} cards on field - {}",
                    keyword.synergy_text()
                ));
            }
        }
    }

    fn take_pending(&mut self, player_id: PlayerId, token: u32) -> Result<PendingSelection> {
        match self.pending.take() {
            Some(pending) if pending.token == token && pending.player == player_id => Ok(pending),
            Some(pending) => {
                let message = format!(
                    "{} is not the open selection for {}",
                    token,
                    self.player_name(player_id)
                );
                self.pending = Some(pending);
                Err(EngineError::InvalidTarget(message))
            }
            None => Err(EngineError::InvalidTarget(format!(
                "no selection is pending (token {token})"
            ))),
        }
    }

    /// Answer a targeting keyword and continue the play's keywords
    pub(crate) fn resolve_keyword_target_internal(
        &mut self,
        player_id: PlayerId,
        token: u32,
        target: CardId,
    ) -> Result<Option<PendingSelection>> {
        let pending = self.take_pending(player_id, token)?;
        let SelectionRequest::Target {
            valid_targets,
            destination,
        } = pending.request.clone()
        else {
            self.pending = Some(pending);
            return Err(EngineError::InvalidTarget(
                "the open selection is not a target choice".to_string(),
            ));
        };
        if !valid_targets.contains(&target) {
            let message = format!(
                "{} is not a valid target for {}",
                self.card_name(target),
                pending.keyword
            );
            self.pending = Some(pending);
            return Err(EngineError::InvalidTarget(message));
        }

        self.relocate_card(target, destination, pending.source)?;
        self.run_keyword_queue(pending.continuation)
    }

    /// Move a card wherever it is to `destination` on `source`'s behalf
    pub(crate) fn relocate_card(
        &mut self,
        target: CardId,
        destination: Relocation,
        source: CardId,
    ) -> Result<()> {
        let (owner, from) = self
            .locate_card(target)
            .ok_or_else(|| EngineError::CardNotFound(format!("card {target}")))?;
        let (to, placement) = destination.destination();
        self.move_card_to(target, from, to, owner, placement)?;
        self.log(format!(
            "{} is {} by {}",
            self.card_name(target),
            destination.describe(),
            self.card_name(source)
        ));
        Ok(())
    }

    /// Answer an Amalgam choice and continue the play's keywords
    pub(crate) fn resolve_amalgam_choice_internal(
        &mut self,
        player_id: PlayerId,
        token: u32,
        choice: usize,
    ) -> Result<Option<PendingSelection>> {
        let mut pending = self.take_pending(player_id, token)?;
        let name = self.card_name(pending.source);

        match pending.request.clone() {
            SelectionRequest::AmalgamPair { options } => {
                let Some(option) = options.get(choice).copied() else {
                    self.pending = Some(pending);
                    return Err(EngineError::InvalidTarget(format!(
                        "Amalgam option {choice} does not exist"
                    )));
                };
                self.cards.get_mut(pending.source)?.amalgam_choice = Some(option);
                self.log(format!("{name} gains {}", option));

                let queued = pending.continuation.remaining.contains(&option.keyword);
                if !queued && !matches!(option.keyword, Keyword::Amalgam | Keyword::Quintessence) {
                    pending.continuation.remaining.insert(0, option.keyword);
                }
            }
            SelectionRequest::AmalgamElement { options } => {
                let Some(element) = options.get(choice).copied() else {
                    self.pending = Some(pending);
                    return Err(EngineError::InvalidTarget(format!(
                        "Amalgam element {choice} does not exist"
                    )));
                };
                self.cards.get_mut(pending.source)?.azoth_source =
                    Some(AzothSource::Element(element));
                self.log(format!("{name} will produce {element} Azoth"));
            }
            SelectionRequest::Target { .. } => {
                self.pending = Some(pending);
                return Err(EngineError::InvalidTarget(
                    "the open selection is a target choice".to_string(),
                ));
            }
        }

        self.run_keyword_queue(pending.continuation)
    }
}
