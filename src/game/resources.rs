//! Azoth row resources: pool computation and cost payment against real cards
//!
//! The element pool is never stored. It is derived on demand from the
//! player's Azoth row, one unit per ready card, and paying a cost rests the
//! cards that produced the consumed units.

use crate::core::{AzothSource, CardId, ElementCost, ElementPool, Payment, PlayerId};
use crate::game::GameState;
use crate::zones::Zone;
use crate::Result;

/// A single Azoth-row card able to produce a unit right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AzothSourceCard {
    pub card_id: CardId,
    pub production: AzothSource,
}

impl GameState {
    /// Azoth-row cards able to produce right now, in row order
    pub fn available_azoth(&self, player_id: PlayerId) -> Vec<AzothSourceCard> {
        self.zone_cards(player_id, Zone::AzothRow)
            .into_iter()
            .filter_map(|card_id| {
                let card = self.cards.get(card_id).ok()?;
                if card.tapped || card.rested {
                    return None;
                }
                card.azoth_source.map(|production| AzothSourceCard {
                    card_id,
                    production,
                })
            })
            .collect()
    }

    /// The player's current element pool
    pub fn element_pool(&self, player_id: PlayerId) -> ElementPool {
        let mut pool = ElementPool::new();
        for source in self.available_azoth(player_id) {
            pool.add_source(source.production);
        }
        pool
    }

    pub fn can_afford(&self, player_id: PlayerId, cost: &ElementCost) -> bool {
        self.element_pool(player_id).can_pay(cost)
    }

    /// Cards to rest for a payment, earliest in the row first
    pub fn compute_rest_order(&self, player_id: PlayerId, payment: &Payment) -> Vec<CardId> {
        let mut remaining = payment.drawn;
        self.available_azoth(player_id)
            .into_iter()
            .filter(|source| remaining.take_source(source.production))
            .map(|source| source.card_id)
            .collect()
    }

    /// Pay a cost from the Azoth row, resting the cards that produced it
    ///
    /// Fails with `InsufficientResources` without touching any card. The
    /// log line names the units the rested cards produced.
    pub fn pay_from_azoth_row(&mut self, player_id: PlayerId, cost: &ElementCost) -> Result<Payment> {
        let (_, payment) = self.element_pool(player_id).pay(cost)?;
        for card_id in self.compute_rest_order(player_id, &payment) {
            self.cards.get_mut(card_id)?.rest();
        }
        if payment.units() > 0 {
            let message = format!(
                "{} pays {} from the Azoth row",
                self.player_name(player_id),
                payment.drawn
            );
            self.logger.verbose(message);
        }
        Ok(payment)
    }
}
