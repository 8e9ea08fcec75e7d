//! Keyword and combat-ability vocabularies

use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight rules-defined keywords
///
/// Declaration order is resolution order when a card carries several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Keyword {
    Amalgam,
    Brilliance,
    Gust,
    Inferno,
    Steadfast,
    Submerged,
    Quintessence,
    Void,
}

impl Keyword {
    pub const ALL: [Keyword; 8] = [
        Keyword::Amalgam,
        Keyword::Brilliance,
        Keyword::Gust,
        Keyword::Inferno,
        Keyword::Steadfast,
        Keyword::Submerged,
        Keyword::Quintessence,
        Keyword::Void,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Amalgam => "Amalgam",
            Keyword::Brilliance => "Brilliance",
            Keyword::Gust => "Gust",
            Keyword::Inferno => "Inferno",
            Keyword::Steadfast => "Steadfast",
            Keyword::Submerged => "Submerged",
            Keyword::Quintessence => "Quintessence",
            Keyword::Void => "Void",
        }
    }

    /// Flavor line logged when two or more copies share a field
    pub fn synergy_text(&self) -> &'static str {
        match self {
            Keyword::Amalgam => "increased element choices",
            Keyword::Brilliance => "enhanced Aether effects",
            Keyword::Gust => "wind storm active",
            Keyword::Inferno => "fire spread active",
            Keyword::Steadfast => "fortress effect active",
            Keyword::Submerged => "deep waters active",
            Keyword::Quintessence => "pure energy active",
            Keyword::Void => "enhanced removal active",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Keyword::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::ParseError(format!("unknown keyword '{wanted}'")))
    }
}

/// Small set of keywords backed by a bitmask
///
/// Iteration follows `Keyword` declaration order, which keeps keyword
/// resolution deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeywordSet(u8);

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, keyword: Keyword) {
        self.0 |= keyword.bit();
    }

    pub fn contains(&self, keyword: Keyword) -> bool {
        self.0 & keyword.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Keyword> + '_ {
        Keyword::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<Keyword> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = Keyword>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for keyword in iter {
            set.insert(keyword);
        }
        set
    }
}

/// Combat abilities consulted by the combat resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatAbility {
    FirstStrike,
    Trample,
    Drain,
    Shield,
}

impl FromStr for CombatAbility {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "firststrike" => Ok(CombatAbility::FirstStrike),
            "trample" => Ok(CombatAbility::Trample),
            "drain" => Ok(CombatAbility::Drain),
            "shield" => Ok(CombatAbility::Shield),
            _ => Err(EngineError::ParseError(format!(
                "unknown combat ability '{s}'"
            ))),
        }
    }
}

impl fmt::Display for CombatAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatAbility::FirstStrike => write!(f, "First Strike"),
            CombatAbility::Trample => write!(f, "Trample"),
            CombatAbility::Drain => write!(f, "Drain"),
            CombatAbility::Shield => write!(f, "Shield"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_set_iterates_in_declaration_order() {
        let set: KeywordSet = [Keyword::Void, Keyword::Gust, Keyword::Amalgam]
            .into_iter()
            .collect();
        let order: Vec<_> = set.iter().collect();
        assert_eq!(order, vec![Keyword::Amalgam, Keyword::Gust, Keyword::Void]);
        assert_eq!(set.len(), 3);
        assert!(!set.contains(Keyword::Inferno));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("brilliance".parse::<Keyword>().unwrap(), Keyword::Brilliance);
        assert_eq!(
            "first_strike".parse::<CombatAbility>().unwrap(),
            CombatAbility::FirstStrike
        );
        assert_eq!(
            "First Strike".parse::<CombatAbility>().unwrap(),
            CombatAbility::FirstStrike
        );
        assert!("flying".parse::<Keyword>().is_err());
    }
}
