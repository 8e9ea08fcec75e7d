//! Turn phases and the turn structure

use crate::core::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a turn, in fixed cyclic order
///
/// `PreGame` occurs once; afterwards `Refresh` wraps to the next player's `Start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    PreGame,
    Start,
    Main,
    Combat,
    PostCombatMain,
    Refresh,
}

impl Phase {
    /// The only phase that may follow this one
    pub fn successor(&self) -> Phase {
        match self {
            Phase::PreGame => Phase::Start,
            Phase::Start => Phase::Main,
            Phase::Main => Phase::Combat,
            Phase::Combat => Phase::PostCombatMain,
            Phase::PostCombatMain => Phase::Refresh,
            Phase::Refresh => Phase::Start,
        }
    }

    /// Can cards be played from hand in this phase?
    pub fn allows_card_play(&self) -> bool {
        matches!(self, Phase::Main | Phase::PostCombatMain)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreGame => "PRE_GAME",
            Phase::Start => "START",
            Phase::Main => "MAIN",
            Phase::Combat => "COMBAT",
            Phase::PostCombatMain => "POST_COMBAT_MAIN",
            Phase::Refresh => "REFRESH",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the current turn structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnStructure {
    /// Current turn number (starts at 1, increments once per full rotation)
    pub turn_number: u32,

    pub phase: Phase,

    /// Active player (whose turn it is)
    pub active_player: PlayerId,

    /// Active player's index in GameState::players Vec (for O(1) next player lookup)
    pub active_player_idx: usize,
}

impl TurnStructure {
    pub fn new(starting_player: PlayerId) -> Self {
        TurnStructure {
            turn_number: 1,
            phase: Phase::PreGame,
            active_player: starting_player,
            active_player_idx: 0,
        }
    }

    /// Hand the turn to the next player; returns true when the rotation wrapped
    pub fn pass_to(&mut self, next_player: PlayerId, next_idx: usize) -> bool {
        let wrapped = next_idx == 0;
        if wrapped {
            self.turn_number += 1;
        }
        self.active_player = next_player;
        self.active_player_idx = next_idx;
        wrapped
    }
}
