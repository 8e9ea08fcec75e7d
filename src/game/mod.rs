//! Game state, turn structure and rules resolution

pub mod actions;
pub mod combat;
pub mod config;
pub mod decision;
pub mod effects;
pub mod game_loop;
pub mod keywords;
pub mod logger;
pub mod phase;
pub mod resources;
pub mod state;
pub mod turn;

pub use actions::{CommandOutcome, GameCommand};
pub use combat::{AttackTarget, CombatState};
pub use config::GameConfig;
pub use decision::{Decision, DecisionEngine, PlayStyle};
pub use game_loop::{GameLoop, GameResult};
pub use keywords::{
    resolve as resolve_keyword, KeywordContext, KeywordContinuation, KeywordEffect,
    PendingSelection, PlayMethod, Relocation, SelectionRequest, TargetRule,
};
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use phase::{Phase, TurnStructure};
pub use resources::AzothSourceCard;
pub use state::{GameEndReason, GameState};
