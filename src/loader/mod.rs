//! Card catalog and deck loaders
//!
//! JSON card records and the plain-text deck format

pub mod catalog;
pub mod deck;
pub mod game_init;

pub use catalog::{
    normalize_name, parse_cost, AbilityRecord, AmalgamRecord, CardCatalog, CardDefinition,
    CardRecord, CostEntry,
};
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use game_init::GameInitializer;
