//! Error types for the KONIVRER rules engine

use thiserror::Error;

/// Every way a command or a loader can fail.
///
/// The first six variants are rule rejections: the engine restores the
/// state it had before the command and appends the message to the game log.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid play: {0}")]
    InvalidPlay(String),

    #[error("Insufficient resources: {0}")]
    InsufficientResources(String),

    #[error("Invalid phase: {0}")]
    InvalidPhase(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Awaiting selection for token {0}")]
    AwaitingSelection(u32),

    #[error("The game is over")]
    GameOver,

    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Invalid card record: {0}")]
    InvalidCardRecord(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl EngineError {
    /// True for the rule rejections a command can produce during play.
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            EngineError::CardNotFound(_)
                | EngineError::InvalidPlay(_)
                | EngineError::InsufficientResources(_)
                | EngineError::InvalidPhase(_)
                | EngineError::InvalidTarget(_)
                | EngineError::AwaitingSelection(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
