//! Elemental resource system: element costs, Azoth pools, and cost payment
//!
//! Every card cost is an amount per element. A player's pool is produced
//! by the cards in their Azoth row, one unit per untapped card. Specific
//! elements must be paid in kind (or by a Quintessence wildcard); generic
//! may be paid by anything left over.

use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six elements plus generic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
    Aether,
    Nether,
    Generic,
}

impl Element {
    /// Specific elements in the fixed order used for payment and spreading
    pub const SPECIFIC: [Element; 6] = [
        Element::Fire,
        Element::Water,
        Element::Earth,
        Element::Air,
        Element::Aether,
        Element::Nether,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Aether => "aether",
            Element::Nether => "nether",
            Element::Generic => "generic",
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Element::Generic)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Element {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire" => Ok(Element::Fire),
            "water" => Ok(Element::Water),
            "earth" => Ok(Element::Earth),
            "air" => Ok(Element::Air),
            "aether" | "æther" => Ok(Element::Aether),
            "nether" => Ok(Element::Nether),
            "generic" => Ok(Element::Generic),
            other => Err(EngineError::ParseError(format!("unknown element '{other}'"))),
        }
    }
}

/// An amount per element, used for card costs and for "what was spent"
///
/// Copy-eligible since it's just 7 u32 fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementCost {
    pub fire: u32,
    pub water: u32,
    pub earth: u32,
    pub air: u32,
    pub aether: u32,
    pub nether: u32,
    pub generic: u32,
}

impl ElementCost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, handy in tests and catalogs
    pub fn with(mut self, element: Element, amount: u32) -> Self {
        *self.slot_mut(element) = amount;
        self
    }

    pub fn get(&self, element: Element) -> u32 {
        match element {
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Earth => self.earth,
            Element::Air => self.air,
            Element::Aether => self.aether,
            Element::Nether => self.nether,
            Element::Generic => self.generic,
        }
    }

    fn slot_mut(&mut self, element: Element) -> &mut u32 {
        match element {
            Element::Fire => &mut self.fire,
            Element::Water => &mut self.water,
            Element::Earth => &mut self.earth,
            Element::Air => &mut self.air,
            Element::Aether => &mut self.aether,
            Element::Nether => &mut self.nether,
            Element::Generic => &mut self.generic,
        }
    }

    pub fn add(&mut self, element: Element, amount: u32) {
        let slot = self.slot_mut(element);
        *slot = slot.saturating_add(amount);
    }

    /// Sum over every element, generic included
    pub fn total(&self) -> u32 {
        self.specific_total() + self.generic
    }

    pub fn specific_total(&self) -> u32 {
        Element::SPECIFIC.iter().map(|e| self.get(*e)).sum()
    }

    /// Whether the cost has a non-zero component of this element
    pub fn has_component(&self, element: Element) -> bool {
        self.get(element) > 0
    }

    /// First specific element with a non-zero amount, in fixed order
    pub fn primary_element(&self) -> Option<Element> {
        Element::SPECIFIC
            .iter()
            .copied()
            .find(|e| self.has_component(*e))
    }

    /// Copy of this cost with the generic portion replaced
    pub fn with_generic(mut self, generic: u32) -> Self {
        self.generic = generic;
        self
    }

    /// Apply a flat reduction: generic first, then spread one unit at a
    /// time across the remaining elements in fixed order.
    ///
    /// Never reduces any element below zero; any reduction beyond the total
    /// is discarded.
    pub fn reduced_by(&self, amount: u32) -> ElementCost {
        let mut reduced = *self;
        let from_generic = amount.min(reduced.generic);
        reduced.generic -= from_generic;
        let mut remaining = amount - from_generic;

        while remaining > 0 && reduced.specific_total() > 0 {
            for element in Element::SPECIFIC {
                if remaining == 0 {
                    break;
                }
                let slot = reduced.slot_mut(element);
                if *slot > 0 {
                    *slot -= 1;
                    remaining -= 1;
                }
            }
        }
        reduced
    }
}

impl fmt::Display for ElementCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for element in Element::SPECIFIC {
            let amount = self.get(element);
            if amount > 0 {
                parts.push(format!("{element}:{amount}"));
            }
        }
        if self.generic > 0 {
            parts.push(format!("generic:{}", self.generic));
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// What an Azoth-row card produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AzothSource {
    /// One unit of a fixed element
    Element(Element),
    /// Quintessence: one unit of any element, chosen when paying
    Wildcard,
}

impl fmt::Display for AzothSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AzothSource::Element(e) => write!(f, "{e}"),
            AzothSource::Wildcard => write!(f, "any element"),
        }
    }
}

/// Resources available to a player
///
/// `any` counts Quintessence wildcards, which can stand in for every element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementPool {
    pub fire: u32,
    pub water: u32,
    pub earth: u32,
    pub air: u32,
    pub aether: u32,
    pub nether: u32,
    pub generic: u32,
    pub any: u32,
}

impl ElementPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, source: AzothSource) {
        match source {
            AzothSource::Element(e) => *self.slot_mut(e) += 1,
            AzothSource::Wildcard => self.any += 1,
        }
    }

    pub fn with(mut self, element: Element, amount: u32) -> Self {
        *self.slot_mut(element) = amount;
        self
    }

    /// Consume one unit from the bucket a source feeds, if any is left
    pub fn take_source(&mut self, source: AzothSource) -> bool {
        let slot = match source {
            AzothSource::Element(e) => self.slot_mut(e),
            AzothSource::Wildcard => &mut self.any,
        };
        if *slot > 0 {
            *slot -= 1;
            true
        } else {
            false
        }
    }

    pub fn with_any(mut self, amount: u32) -> Self {
        self.any = amount;
        self
    }

    pub fn get(&self, element: Element) -> u32 {
        match element {
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Earth => self.earth,
            Element::Air => self.air,
            Element::Aether => self.aether,
            Element::Nether => self.nether,
            Element::Generic => self.generic,
        }
    }

    fn slot_mut(&mut self, element: Element) -> &mut u32 {
        match element {
            Element::Fire => &mut self.fire,
            Element::Water => &mut self.water,
            Element::Earth => &mut self.earth,
            Element::Air => &mut self.air,
            Element::Aether => &mut self.aether,
            Element::Nether => &mut self.nether,
            Element::Generic => &mut self.generic,
        }
    }

    /// Total units available, wildcards included
    pub fn total(&self) -> u32 {
        Element::SPECIFIC.iter().map(|e| self.get(*e)).sum::<u32>() + self.generic + self.any
    }

    /// Check if we can pay the given cost
    ///
    /// Specific elements are checked first (falling back to wildcards),
    /// then generic against everything that is left.
    pub fn can_pay(&self, cost: &ElementCost) -> bool {
        self.pay(cost).is_ok()
    }

    /// Pay a cost, returning the remaining pool and what was drawn
    ///
    /// This does not mutate `self`; on failure the caller's pool is unchanged.
    /// Generic is paid from the generic bucket, then leftover specific
    /// elements in fixed order, then wildcards.
    pub fn pay(&self, cost: &ElementCost) -> Result<(ElementPool, Payment)> {
        let mut rest = *self;
        let mut payment = Payment::default();

        for element in Element::SPECIFIC {
            let need = cost.get(element);
            let direct = need.min(rest.get(element));
            *rest.slot_mut(element) -= direct;
            *payment.drawn.slot_mut(element) += direct;

            let short = need - direct;
            if short > rest.any {
                return Err(EngineError::InsufficientResources(format!(
                    "need {need} {element}, have {} (+{} wildcard)",
                    self.get(element),
                    self.any
                )));
            }
            rest.any -= short;
            payment.drawn.any += short;
            payment.spent.add(element, need);
        }

        let mut need = cost.generic;
        for element in std::iter::once(Element::Generic).chain(Element::SPECIFIC) {
            if need == 0 {
                break;
            }
            let take = need.min(rest.get(element));
            *rest.slot_mut(element) -= take;
            *payment.drawn.slot_mut(element) += take;
            payment.spent.add(element, take);
            need -= take;
        }
        let wild = need.min(rest.any);
        rest.any -= wild;
        payment.drawn.any += wild;
        payment.spent.add(Element::Generic, wild);
        need -= wild;

        if need > 0 {
            return Err(EngineError::InsufficientResources(format!(
                "cost {cost} exceeds available resources ({} total)",
                self.total()
            )));
        }

        Ok((rest, payment))
    }
}

impl fmt::Display for ElementPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for element in Element::SPECIFIC.iter().chain(std::iter::once(&Element::Generic)) {
            let amount = self.get(*element);
            if amount > 0 {
                parts.push(format!("{element}:{amount}"));
            }
        }
        if self.any > 0 {
            parts.push(format!("any:{}", self.any));
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Breakdown of a successful payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Payment {
    /// Units taken from each pool bucket (decides which Azoth cards rest)
    pub drawn: ElementPool,
    /// Units credited per element. Wildcards paying a specific element count
    /// as that element; anything paying generic counts as its source element,
    /// wildcards and the generic bucket as generic.
    pub spent: ElementCost,
}

impl Payment {
    /// How much of an element went into this payment
    pub fn spent(&self, element: Element) -> u32 {
        self.spent.get(element)
    }

    /// Number of resource units consumed
    pub fn units(&self) -> u32 {
        self.drawn.total()
    }
}

/// True iff `pool` can cover `cost` with generic substitution
pub fn can_pay_cost(pool: &ElementPool, cost: &ElementCost) -> bool {
    pool.can_pay(cost)
}

/// Deduct `cost` from `pool`, returning the new pool
pub fn pay_cost(pool: &ElementPool, cost: &ElementCost) -> Result<ElementPool> {
    pool.pay(cost).map(|(rest, _)| rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_parsing() {
        assert_eq!("Fire".parse::<Element>().unwrap(), Element::Fire);
        assert_eq!(" aether ".parse::<Element>().unwrap(), Element::Aether);
        assert!("plasma".parse::<Element>().is_err());
    }

    #[test]
    fn test_generic_paid_by_leftover_fire() {
        // {fire:2, generic:1} against {fire:1, generic:2}: the second fire
        // substitutes for the missing generic unit.
        let pool = ElementPool::new()
            .with(Element::Fire, 2)
            .with(Element::Generic, 1);
        let cost = ElementCost::new()
            .with(Element::Fire, 1)
            .with(Element::Generic, 2);

        assert!(can_pay_cost(&pool, &cost));
        let (rest, payment) = pool.pay(&cost).unwrap();
        assert_eq!(rest, ElementPool::new());
        assert_eq!(payment.spent(Element::Fire), 2);
        assert_eq!(payment.spent(Element::Generic), 1);
        assert_eq!(payment.units(), 3);
    }

    #[test]
    fn test_insufficient_when_generic_exceeds_pool() {
        let pool = ElementPool::new()
            .with(Element::Fire, 2)
            .with(Element::Generic, 1);
        let cost = ElementCost::new()
            .with(Element::Fire, 1)
            .with(Element::Generic, 4);

        assert!(!can_pay_cost(&pool, &cost));
        assert!(matches!(
            pay_cost(&pool, &cost),
            Err(EngineError::InsufficientResources(_))
        ));
    }

    #[test]
    fn test_specific_never_paid_by_other_specific() {
        let pool = ElementPool::new().with(Element::Water, 5);
        let cost = ElementCost::new().with(Element::Fire, 1);
        assert!(!pool.can_pay(&cost));
    }

    #[test]
    fn test_wildcard_covers_specific_and_generic() {
        let pool = ElementPool::new().with(Element::Earth, 1).with_any(2);
        let cost = ElementCost::new()
            .with(Element::Nether, 1)
            .with(Element::Generic, 2);

        let (rest, payment) = pool.pay(&cost).unwrap();
        assert_eq!(rest.total(), 0);
        assert_eq!(payment.spent(Element::Nether), 1);
        assert_eq!(payment.spent(Element::Earth), 1);
        assert_eq!(payment.spent(Element::Generic), 1);
        assert_eq!(payment.drawn.any, 2);
    }

    #[test]
    fn test_payment_never_goes_negative() {
        // Exhaustive over small pools and costs
        for fire in 0..3 {
            for generic in 0..3 {
                for any in 0..2 {
                    let pool = ElementPool::new()
                        .with(Element::Fire, fire)
                        .with(Element::Generic, generic)
                        .with_any(any);
                    for cf in 0..3 {
                        for cg in 0..4 {
                            let cost = ElementCost::new()
                                .with(Element::Fire, cf)
                                .with(Element::Generic, cg);
                            if can_pay_cost(&pool, &cost) {
                                let rest = pay_cost(&pool, &cost).unwrap();
                                assert_eq!(rest.total() + cost.total(), pool.total());
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_reduction_generic_first_then_spread() {
        let cost = ElementCost::new()
            .with(Element::Fire, 2)
            .with(Element::Water, 1)
            .with(Element::Generic, 2);

        let reduced = cost.reduced_by(4);
        assert_eq!(reduced.generic, 0);
        assert_eq!(reduced.fire, 1);
        assert_eq!(reduced.water, 0);

        let cleared = cost.reduced_by(50);
        assert_eq!(cleared.total(), 0);
        assert_eq!(cost.reduced_by(0), cost);
    }

    #[test]
    fn test_cost_display() {
        let cost = ElementCost::new()
            .with(Element::Air, 1)
            .with(Element::Generic, 3);
        assert_eq!(cost.to_string(), "{air:1, generic:3}");
        assert_eq!(cost.primary_element(), Some(Element::Air));
    }
}
