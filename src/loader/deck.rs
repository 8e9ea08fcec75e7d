//! Deck list loader (.deck format)
//!
//! ```text
//! [metadata]
//! Name=Cinder Rush
//!
//! [Main]
//! 1 Banner of Embers
//! 4 Ember Hound
//!
//! [Sideboard]
//! 2 Tidecaller
//! ```

use crate::{EngineError, Result};
use std::fs;
use std::path::Path;

/// Deck loader for .deck files
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a .deck file
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a deck from its text content
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut name = None;
        let mut main_deck = Vec::new();
        let mut sideboard = Vec::new();
        let mut in_sideboard = false;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_sideboard = line.eq_ignore_ascii_case("[sideboard]");
                continue;
            }
            if let Some(value) = line.strip_prefix("Name=") {
                name = Some(value.trim().to_string());
                continue;
            }

            // Format: "4 Card Name"
            let entry = line
                .split_once(' ')
                .and_then(|(count, rest)| {
                    let count = count.parse::<u8>().ok()?;
                    let card_name = rest.trim();
                    (count > 0 && !card_name.is_empty()).then(|| DeckEntry {
                        card_name: card_name.to_string(),
                        count,
                    })
                })
                .ok_or_else(|| {
                    EngineError::InvalidDeckFormat(format!(
                        "line {}: expected '<count> <card name>', got '{}'",
                        line_no + 1,
                        line
                    ))
                })?;

            if in_sideboard {
                sideboard.push(entry);
            } else {
                main_deck.push(entry);
            }
        }

        if main_deck.is_empty() {
            return Err(EngineError::InvalidDeckFormat("Empty deck".to_string()));
        }

        Ok(DeckList {
            name,
            main_deck,
            sideboard,
        })
    }
}

/// Represents a deck entry (card name and count)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card_name: String,
    pub count: u8,
}

/// Represents a complete deck list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckList {
    pub name: Option<String>,
    pub main_deck: Vec<DeckEntry>,
    pub sideboard: Vec<DeckEntry>,
}

impl DeckList {
    /// Total cards in main deck
    pub fn total_cards(&self) -> usize {
        self.main_deck.iter().map(|e| e.count as usize).sum()
    }

    /// Total cards in sideboard
    pub fn sideboard_size(&self) -> usize {
        self.sideboard.iter().map(|e| e.count as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_deck() {
        let content = r#"
[metadata]
Name=Cinder Rush

[Main]
# the Flag goes first
1 Banner of Embers
12 Ember Hound
7 Ember Lance

[Sideboard]
3 Tidecaller
"#;

        let deck = DeckLoader::parse(content).unwrap();
        assert_eq!(deck.name.as_deref(), Some("Cinder Rush"));
        assert_eq!(deck.main_deck.len(), 3);
        assert_eq!(deck.total_cards(), 20);

        assert_eq!(deck.main_deck[1].card_name, "Ember Hound");
        assert_eq!(deck.main_deck[1].count, 12);

        assert_eq!(deck.sideboard.len(), 1);
        assert_eq!(deck.sideboard_size(), 3);
    }

    #[test]
    fn test_malformed_line_rejected() {
        let err = DeckLoader::parse("4 Ember Hound\nEmber Lance\n").unwrap_err();
        assert!(matches!(err, EngineError::InvalidDeckFormat(ref m) if m.starts_with("line 2")));
    }

    #[test]
    fn test_empty_deck_rejected() {
        assert!(matches!(
            DeckLoader::parse("[Main]\n# nothing here\n"),
            Err(EngineError::InvalidDeckFormat(_))
        ));
    }
}
