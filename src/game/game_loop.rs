//! Game loop implementation
//!
//! Drives a full game between two decision engines, phase by phase, until
//! the win check ends it or the turn cap is reached.

use crate::core::PlayerId;
use crate::game::{DecisionEngine, GameEndReason, GameState, Phase, VerbosityLevel};
use crate::{EngineError, Result};

/// Result of running a game to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Winner of the game (None if the turn cap was hit)
    pub winner: Option<PlayerId>,
    /// Full turn rotations played
    pub turns_played: u32,
    pub end_reason: GameEndReason,
}

/// Game loop manager
pub struct GameLoop<'a> {
    pub game: &'a mut GameState,
    /// Maximum turns before forcing a draw
    max_turns: u32,
    /// Safety valve against a decision engine that never yields
    max_steps: u64,
}

impl<'a> GameLoop<'a> {
    pub fn new(game: &'a mut GameState) -> Self {
        let max_turns = game.config.max_turns;
        GameLoop {
            game,
            max_turns,
            max_steps: 100_000,
        }
    }

    /// Set maximum turns before forcing a draw
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set verbosity on the game's logger
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.game.logger.set_verbosity(verbosity);
        self
    }

    /// Run the game with one decision engine per player
    pub fn run_game(
        &mut self,
        engine1: &DecisionEngine,
        engine2: &DecisionEngine,
    ) -> Result<GameResult> {
        let engines = [*engine1, *engine2];
        let mut steps = 0u64;

        while !self.game.game_over {
            if self.game.turn.turn_number > self.max_turns {
                break;
            }
            steps += 1;
            if steps > self.max_steps {
                return Err(EngineError::InvalidPlay(format!(
                    "game made no progress after {} steps",
                    self.max_steps
                )));
            }
            self.step(&engines)?;
        }

        let turns_played = self.game.turn.turn_number.min(self.max_turns);
        let result = if self.game.game_over {
            GameResult {
                winner: self.game.winner,
                turns_played,
                end_reason: self.game.end_reason.unwrap_or(GameEndReason::TurnLimit),
            }
        } else {
            self.game.end_reason = Some(GameEndReason::TurnLimit);
            self.game
                .logger
                .minimal(format!("Game drawn after {} turns", self.max_turns));
            GameResult {
                winner: None,
                turns_played,
                end_reason: GameEndReason::TurnLimit,
            }
        };
        Ok(result)
    }

    /// One unit of progress: a selection answer, a burst, an action or a
    /// phase advance.
    fn step(&mut self, engines: &[DecisionEngine; 2]) -> Result<()> {
        let engine_for = |player: PlayerId| {
            engines
                .iter()
                .find(|e| e.player == player)
                .copied()
                .ok_or(EngineError::EntityNotFound(player.as_u32()))
        };

        if let Some(pending) = &self.game.pending {
            let engine = engine_for(pending.player)?;
            if !engine.act(self.game)? {
                return Err(EngineError::InvalidTarget(format!(
                    "{} could not answer {}",
                    self.game.player_name(engine.player),
                    pending_label(self.game)
                )));
            }
            return Ok(());
        }

        // Revealed life cards must be offered before the next advance clears them
        for engine in engines {
            let has_window = self
                .game
                .get_player(engine.player)
                .is_ok_and(|p| !p.burst_window.is_empty());
            if has_window {
                for decision in engine.burst_decisions(self.game) {
                    if engine.execute_decision(self.game, &decision).is_ok() {
                        return Ok(());
                    }
                }
            }
        }

        let active = engine_for(self.game.active_player())?;
        match self.game.turn.phase {
            Phase::PreGame | Phase::Start | Phase::Refresh => {
                self.game.advance_to_next_phase()?;
            }
            Phase::Main | Phase::PostCombatMain => {
                active.take_turn_step(self.game)?;
            }
            Phase::Combat => {
                let defender = engine_for(self.game.opponent_of(active.player)?)?;
                if !active.act(self.game)? && !defender.act(self.game)? {
                    self.game.advance_to_next_phase()?;
                }
            }
        }
        Ok(())
    }
}

fn pending_label(game: &GameState) -> String {
    game.pending
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_default()
}
