//! Core game types and entities

pub mod ability;
pub mod card;
pub mod element;
pub mod entity;
pub mod keyword;
pub mod player;
pub mod types;

pub use ability::{
    parse_effect, substitute_placeholder, Ability, AbilityEffect, Amount, EnemyScope, SearchFilter,
    TriggerEvent,
};
pub use card::{AmalgamOption, Card, CardKind};
pub use element::{can_pay_cost, pay_cost, AzothSource, Element, ElementCost, ElementPool, Payment};
pub use entity::{EntityId, EntityStore, GameEntity};
pub use keyword::{CombatAbility, Keyword, KeywordSet};
pub use player::Player;
pub use types::{CardName, PlayerName};

pub type CardId = EntityId<Card>;
pub type PlayerId = EntityId<Player>;
