//! Card catalog: raw JSON card records and the definitions built from them
//!
//! Records come from the card data file in their loose external shape
//! (strings for elements and keywords, mixed cost entries). They are
//! validated once here; the engine only ever sees `CardDefinition`s.

use crate::core::{
    Ability, AmalgamOption, Card, CardId, CardKind, CombatAbility, Element, ElementCost, Keyword,
    KeywordSet, PlayerId,
};
use crate::{EngineError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;

/// One cost entry: an element name (one unit) or a generic amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostEntry {
    Generic(u32),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRecord {
    pub effect: String,
    #[serde(default)]
    pub cost: Vec<CostEntry>,
    #[serde(default)]
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmalgamRecord {
    pub keyword: String,
    pub element: String,
}

/// A card as it appears in the data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default)]
    pub cost: Vec<CostEntry>,
    #[serde(default)]
    pub strength: Option<u32>,
    #[serde(default)]
    pub health: Option<u32>,
    #[serde(default)]
    pub abilities: Vec<AbilityRecord>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub combat: Vec<String>,
    #[serde(default)]
    pub amalgam_options: Vec<AmalgamRecord>,
    #[serde(default)]
    pub amalgam_elements: Vec<String>,
    #[serde(default)]
    pub rarity: Option<String>,
}

/// Validated card definition (not yet instantiated in a game)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDefinition {
    pub name: String,
    pub kind: CardKind,
    pub cost: ElementCost,
    pub abilities: Vec<Ability>,
    pub keywords: KeywordSet,
    pub combat: Vec<CombatAbility>,
    pub amalgam_options: Vec<AmalgamOption>,
    pub amalgam_elements: Vec<Element>,
    pub rarity: Option<String>,
}

impl CardDefinition {
    /// Create a Card instance from this definition
    pub fn instantiate(&self, id: CardId, owner: PlayerId) -> Card {
        let mut card = Card::new(id, self.name.clone(), self.kind, owner);
        card.cost = self.cost;
        card.abilities = SmallVec::from_vec(self.abilities.clone());
        card.keywords = self.keywords;
        card.combat = SmallVec::from_slice(&self.combat);
        card.amalgam_options = SmallVec::from_slice(&self.amalgam_options);
        card.amalgam_elements = SmallVec::from_slice(&self.amalgam_elements);
        card.rarity = self.rarity.clone();
        card
    }
}

impl TryFrom<&CardRecord> for CardDefinition {
    type Error = EngineError;

    fn try_from(record: &CardRecord) -> Result<Self> {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidCardRecord(
                "card record without a name".to_string(),
            ));
        }
        let invalid = |what: String| EngineError::InvalidCardRecord(format!("{name}: {what}"));

        let kind = match record.card_type.trim().to_ascii_lowercase().as_str() {
            "familiar" => {
                let base_health = record.health.unwrap_or(0);
                if base_health == 0 {
                    return Err(invalid("a Familiar needs health above 0".to_string()));
                }
                CardKind::Familiar {
                    base_strength: record.strength.unwrap_or(0),
                    base_health,
                }
            }
            "spell" | "burst" => CardKind::Spell {
                strength: record.strength.unwrap_or(0),
            },
            "flag" => CardKind::Flag,
            "azoth" => CardKind::Azoth,
            other => return Err(invalid(format!("unknown card type '{other}'"))),
        };

        let cost = parse_cost(&record.cost).map_err(|e| invalid(e.to_string()))?;

        let mut abilities = Vec::with_capacity(record.abilities.len());
        for entry in &record.abilities {
            let mut ability = Ability::new(entry.effect.trim());
            if !entry.cost.is_empty() {
                let cost = parse_cost(&entry.cost).map_err(|e| invalid(e.to_string()))?;
                ability = ability.with_cost(cost);
            }
            if let Some(trigger) = &entry.trigger {
                ability = ability.with_trigger(trigger.trim());
            }
            abilities.push(ability);
        }

        let keywords = record
            .keywords
            .iter()
            .map(|k| k.parse::<Keyword>())
            .collect::<Result<KeywordSet>>()
            .map_err(|e| invalid(e.to_string()))?;

        let combat = record
            .combat
            .iter()
            .map(|c| c.parse::<CombatAbility>())
            .collect::<Result<Vec<_>>>()
            .map_err(|e| invalid(e.to_string()))?;

        let amalgam_options = record
            .amalgam_options
            .iter()
            .map(|opt| {
                Ok(AmalgamOption {
                    keyword: opt.keyword.parse()?,
                    element: specific_element(&opt.element)?,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| invalid(e.to_string()))?;

        let amalgam_elements = record
            .amalgam_elements
            .iter()
            .map(|e| specific_element(e))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(CardDefinition {
            name: name.to_string(),
            kind,
            cost,
            abilities,
            keywords,
            combat,
            amalgam_options,
            amalgam_elements,
            rarity: record.rarity.clone(),
        })
    }
}

fn specific_element(text: &str) -> Result<Element> {
    let element: Element = text.parse()?;
    if element.is_generic() {
        return Err(EngineError::ParseError(
            "generic is not a choosable element".to_string(),
        ));
    }
    Ok(element)
}

/// Build an `ElementCost` from mixed entries such as `["fire", "fire", "2"]`
pub fn parse_cost(entries: &[CostEntry]) -> Result<ElementCost> {
    let mut cost = ElementCost::new();
    for entry in entries {
        match entry {
            CostEntry::Generic(n) => cost.add(Element::Generic, *n),
            CostEntry::Text(text) => match text.trim().parse::<u32>() {
                Ok(n) => cost.add(Element::Generic, n),
                Err(_) => cost.add(text.parse()?, 1),
            },
        }
    }
    Ok(cost)
}

/// Lookup key: ASCII-folded, lowercased, single-spaced
pub fn normalize_name(name: &str) -> String {
    deunicode::deunicode(name)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Catalog of card definitions keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: FxHashMap<String, CardDefinition>,
    /// Keys in load order, for deterministic iteration
    order: Vec<String>,
}

impl CardCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate an ordered list of records
    pub fn from_records(records: &[CardRecord]) -> Result<Self> {
        let mut catalog = CardCatalog::new();
        for record in records {
            catalog.add_card(CardDefinition::try_from(record)?);
        }
        Ok(catalog)
    }

    /// Parse a JSON array of card records
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<CardRecord> = serde_json::from_str(json)?;
        Self::from_records(&records)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add a definition; a later definition with the same name replaces the earlier one
    pub fn add_card(&mut self, definition: CardDefinition) {
        let key = normalize_name(&definition.name);
        if self.cards.insert(key.clone(), definition).is_none() {
            self.order.push(key);
        }
    }

    /// Look up a card by name (case- and accent-insensitive)
    pub fn get_card(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(&normalize_name(name))
    }

    /// Definitions in load order
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.order.iter().filter_map(|key| self.cards.get(key))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
