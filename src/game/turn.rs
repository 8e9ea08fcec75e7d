//! Phase advancement and start/refresh bookkeeping

use crate::core::{PlayerId, TriggerEvent};
use crate::game::{GameEndReason, GameState, Phase};
use crate::zones::Zone;
use crate::{EngineError, Result};

impl GameState {
    /// Move to `requested`, which must be the fixed successor of the
    /// current phase, on behalf of the active player.
    pub(crate) fn advance_phase_internal(
        &mut self,
        player_id: PlayerId,
        requested: Phase,
    ) -> Result<()> {
        let current = self.turn.phase;
        if player_id != self.active_player() {
            return Err(EngineError::InvalidPhase(format!(
                "{} cannot advance the phase on {}'s turn",
                self.player_name(player_id),
                self.player_name(self.active_player())
            )));
        }
        if requested != current.successor() {
            return Err(EngineError::InvalidPhase(format!(
                "cannot go from {} to {}; next phase is {}",
                current,
                requested,
                current.successor()
            )));
        }

        for player in &mut self.players {
            player.burst_window.clear();
        }

        match current {
            Phase::PreGame => self.setup_game()?,
            Phase::Combat => {
                self.end_combat()?;
                self.fire_triggers(TriggerEvent::AfterCombat)?;
            }
            Phase::Refresh => self.pass_turn()?,
            _ => {}
        }

        self.turn.phase = requested;
        let message = format!(
            "Turn {}, {}: {}",
            self.turn.turn_number,
            self.player_name(self.active_player()),
            requested
        );
        self.log(message);

        match requested {
            Phase::Start => {
                self.begin_turn()?;
                self.fire_triggers(TriggerEvent::TurnStart)?;
            }
            Phase::Main => self.fire_triggers(TriggerEvent::MainPhaseStart)?,
            Phase::Combat => {
                self.combat.clear();
                self.fire_triggers(TriggerEvent::CombatPhaseStart)?;
            }
            Phase::PostCombatMain => self.fire_triggers(TriggerEvent::PostCombatPhaseStart)?,
            // End-of-turn abilities see the turn's modifiers before cleanup
            Phase::Refresh => {
                self.fire_triggers(TriggerEvent::TurnEnd)?;
                self.refresh_active_player()?;
            }
            Phase::PreGame => {}
        }
        Ok(())
    }

    /// One-time setup when leaving PreGame
    ///
    /// Shuffle, reveal Flags, set aside life cards, then the opening draw.
    fn setup_game(&mut self) -> Result<()> {
        let player_ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        let life_cards = self.config.life_cards;

        for &player_id in &player_ids {
            let zones = self
                .player_zones
                .iter_mut()
                .find(|(id, _)| *id == player_id)
                .map(|(_, zones)| zones)
                .ok_or(EngineError::EntityNotFound(player_id.as_u32()))?;
            zones.deck.shuffle(&mut self.rng);

            self.reveal_flag(player_id)?;

            for _ in 0..life_cards {
                let zones = self.get_player_zones_mut(player_id)?;
                let Some(card_id) = zones.deck.draw_top() else {
                    break;
                };
                zones.life_cards.add(card_id);
            }
        }

        for _ in 0..self.config.opening_draw {
            for &player_id in &player_ids {
                self.draw_card(player_id)?;
            }
        }

        let names: Vec<String> = player_ids.iter().map(|id| self.player_name(*id)).collect();
        self.logger.minimal(format!("Game started: {}", names.join(" vs ")));
        Ok(())
    }

    /// Put the first Flag found in hand, then deck, into the flag zone
    fn reveal_flag(&mut self, player_id: PlayerId) -> Result<()> {
        if !self.zone(player_id, Zone::Flag)?.is_empty() {
            return Ok(());
        }
        for zone in [Zone::Hand, Zone::Deck] {
            let flag = self
                .zone_cards(player_id, zone)
                .into_iter()
                .find(|id| self.cards.get(*id).is_ok_and(|c| c.is_flag()));
            if let Some(flag) = flag {
                self.move_card(flag, zone, Zone::Flag, player_id)?;
                let message = format!(
                    "{} reveals {} as their Flag",
                    self.player_name(player_id),
                    self.card_name(flag)
                );
                self.log(message);
                return Ok(());
            }
        }
        Ok(())
    }

    /// Hand control to the next player
    fn pass_turn(&mut self) -> Result<()> {
        let next_idx = (self.turn.active_player_idx + 1) % self.players.len();
        let next_player = self.players[next_idx].id;
        self.turn.pass_to(next_player, next_idx);
        for player in &mut self.players {
            player.is_active = player.id == next_player;
        }
        Ok(())
    }

    /// Start-phase bookkeeping for the active player
    fn begin_turn(&mut self) -> Result<()> {
        let player_id = self.active_player();
        self.get_player_mut(player_id)?.reset_azoth();

        for card_id in self.zone_cards(player_id, Zone::Field) {
            self.cards.get_mut(card_id)?.summoning_sick = false;
        }

        // The first player skips the draw on turn 1
        let skips_draw = self.turn.turn_number == 1 && self.turn.active_player_idx == 0;
        if skips_draw {
            return Ok(());
        }
        if self.draw_card(player_id)?.is_none() {
            let message = format!("{} cannot draw from an empty deck", self.player_name(player_id));
            self.log(message);
            if self.config.deck_out_loses {
                self.end_game(player_id, GameEndReason::DeckedOut(player_id))?;
            }
        }
        Ok(())
    }

    /// Refresh-phase cleanup
    ///
    /// The active player's cards untap and unrest. Damage and
    /// until-end-of-turn modifiers clear on every card in play.
    fn refresh_active_player(&mut self) -> Result<()> {
        let active = self.active_player();
        let player_ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();

        for player_id in player_ids {
            for zone in [Zone::Field, Zone::CombatRow, Zone::AzothRow] {
                for card_id in self.zone_cards(player_id, zone) {
                    let card = self.cards.get_mut(card_id)?;
                    if player_id == active {
                        card.refresh();
                    } else {
                        card.damage = 0;
                        card.strength_modifier = 0;
                        card.health_modifier = 0;
                    }
                }
            }
        }

        let max_hand = self.config.max_hand_size;
        while self.zone(active, Zone::Hand)?.len() > max_hand {
            let Some(oldest) = self.zone(active, Zone::Hand)?.iter().next() else {
                break;
            };
            self.move_card(oldest, Zone::Hand, Zone::Discard, active)?;
            let message = format!(
                "{} discards {} (hand limit {})",
                self.player_name(active),
                self.card_name(oldest),
                max_hand
            );
            self.log(message);
        }
        Ok(())
    }
}
