//! Card types and runtime card state

use crate::core::{
    Ability, AzothSource, CardId, CardName, CombatAbility, Element, ElementCost, EntityId,
    GameEntity, Keyword, KeywordSet, PlayerId,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// The four card types, each carrying only the stats meaningful to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    Familiar { base_strength: u32, base_health: u32 },
    Spell { strength: u32 },
    Flag,
    Azoth,
}

impl CardKind {
    pub fn label(&self) -> &'static str {
        match self {
            CardKind::Familiar { .. } => "Familiar",
            CardKind::Spell { .. } => "Spell",
            CardKind::Flag => "Flag",
            CardKind::Azoth => "Azoth",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One Amalgam choice when summoned: gain a keyword and its linked element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmalgamOption {
    pub keyword: Keyword,
    pub element: Element,
}

impl fmt::Display for AmalgamOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.keyword, self.element)
    }
}

/// Represents a card in the game
///
/// Many cards can share one catalog definition; this struct is the instance.
/// Runtime fields are reset whenever the card leaves the field or Azoth row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: CardName,
    pub kind: CardKind,
    pub cost: ElementCost,

    /// Ordered ability list; Spell plays choose by index
    pub abilities: SmallVec<[Ability; 2]>,
    pub keywords: KeywordSet,
    pub combat: SmallVec<[CombatAbility; 2]>,

    /// Choices offered by Amalgam when summoned
    pub amalgam_options: SmallVec<[AmalgamOption; 2]>,
    /// Choices offered by Amalgam when placed as Azoth
    pub amalgam_elements: SmallVec<[Element; 2]>,

    pub rarity: Option<String>,

    pub owner: PlayerId,
    pub controller: PlayerId,

    /// Used this turn (paid for something, activated)
    pub rested: bool,
    /// Attacked this turn
    pub tapped: bool,
    pub summoning_sick: bool,
    /// +1/+1 style counters
    pub counters: u32,
    /// Damage marked this turn
    pub damage: u32,
    /// Until-end-of-turn modifiers
    pub strength_modifier: i32,
    pub health_modifier: i32,
    /// Strength lost to Steadfast redirection (persists while on field)
    pub strength_penalty: u32,

    /// What this card produces while in the Azoth row
    pub azoth_source: Option<AzothSource>,
    /// Amalgam choice made when summoned
    pub amalgam_choice: Option<AmalgamOption>,
    /// Bonus damage from Inferno
    pub inferno_bonus: u32,
    /// Damage Steadfast can still redirect
    pub steadfast_remaining: u32,
    pub shield_up: bool,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<CardName>, kind: CardKind, owner: PlayerId) -> Self {
        Card {
            id,
            name: name.into(),
            kind,
            cost: ElementCost::new(),
            abilities: SmallVec::new(),
            keywords: KeywordSet::new(),
            combat: SmallVec::new(),
            amalgam_options: SmallVec::new(),
            amalgam_elements: SmallVec::new(),
            rarity: None,
            owner,
            controller: owner,
            rested: false,
            tapped: false,
            summoning_sick: false,
            counters: 0,
            damage: 0,
            strength_modifier: 0,
            health_modifier: 0,
            strength_penalty: 0,
            azoth_source: None,
            amalgam_choice: None,
            inferno_bonus: 0,
            steadfast_remaining: 0,
            shield_up: false,
        }
    }

    pub fn is_familiar(&self) -> bool {
        matches!(self.kind, CardKind::Familiar { .. })
    }

    pub fn is_spell(&self) -> bool {
        matches!(self.kind, CardKind::Spell { .. })
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, CardKind::Flag)
    }

    pub fn base_strength(&self) -> u32 {
        match self.kind {
            CardKind::Familiar { base_strength, .. } => base_strength,
            CardKind::Spell { strength } => strength,
            CardKind::Flag | CardKind::Azoth => 0,
        }
    }

    pub fn base_health(&self) -> u32 {
        match self.kind {
            CardKind::Familiar { base_health, .. } => base_health,
            _ => 0,
        }
    }

    /// Current strength: base + counters + modifiers - Steadfast losses
    pub fn strength(&self) -> u32 {
        let value = self.base_strength() as i64 + self.counters as i64
            + self.strength_modifier as i64
            - self.strength_penalty as i64;
        value.max(0) as u32
    }

    /// Current health: base + counters + modifiers
    pub fn health(&self) -> u32 {
        if !self.is_familiar() {
            return 0;
        }
        let value = self.base_health() as i64 + self.counters as i64 + self.health_modifier as i64;
        value.max(0) as u32
    }

    /// Damage still needed to destroy this card
    pub fn remaining_health(&self) -> u32 {
        self.health().saturating_sub(self.damage)
    }

    pub fn is_destroyed(&self) -> bool {
        self.is_familiar() && self.damage >= self.health()
    }

    /// Printed keywords plus a keyword gained through Amalgam
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(keyword)
            || self.amalgam_choice.is_some_and(|choice| choice.keyword == keyword)
    }

    pub fn has_combat(&self, ability: CombatAbility) -> bool {
        self.combat.contains(&ability)
    }

    /// Whether the card is aligned with an element (cost or Amalgam choice)
    pub fn has_element(&self, element: Element) -> bool {
        self.cost.has_component(element)
            || self.amalgam_choice.is_some_and(|choice| choice.element == element)
    }

    pub fn can_attack(&self) -> bool {
        self.is_familiar() && !self.tapped && !self.summoning_sick
    }

    pub fn tap(&mut self) {
        self.tapped = true;
    }

    pub fn untap(&mut self) {
        self.tapped = false;
    }

    pub fn rest(&mut self) {
        self.rested = true;
    }

    /// Prepare a card that just entered the field
    pub fn enter_field(&mut self, counters: u32) {
        self.reset_runtime();
        self.counters = counters;
        self.summoning_sick = true;
        self.shield_up = self.has_combat(CombatAbility::Shield);
    }

    /// Clear everything that only exists while the card is in play
    pub fn reset_runtime(&mut self) {
        self.rested = false;
        self.tapped = false;
        self.summoning_sick = false;
        self.counters = 0;
        self.damage = 0;
        self.strength_modifier = 0;
        self.health_modifier = 0;
        self.strength_penalty = 0;
        self.azoth_source = None;
        self.amalgam_choice = None;
        self.inferno_bonus = 0;
        self.steadfast_remaining = 0;
        self.shield_up = false;
        self.controller = self.owner;
    }

    /// Refresh-phase cleanup of until-end-of-turn state
    pub fn refresh(&mut self) {
        self.rested = false;
        self.tapped = false;
        self.damage = 0;
        self.strength_modifier = 0;
        self.health_modifier = 0;
        self.shield_up = self.has_combat(CombatAbility::Shield);
    }
}

impl GameEntity for Card {
    fn id(&self) -> EntityId<Card> {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
