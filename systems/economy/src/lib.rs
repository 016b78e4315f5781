#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Gold accounting rules: rewards for cleared levels and power-up prices.

use number_rush_core::{Gold, PowerUp, BASE_REWARD, HINT_COST, TIME_COST};
use thiserror::Error;

/// Price of the hint power-up.
pub const HINT_PRICE: Gold = Gold::new(HINT_COST);
/// Price of the extend-timer power-up.
pub const TIME_PRICE: Gold = Gold::new(TIME_COST);

/// A purchase the balance could not cover. Nothing was deducted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("balance of {balance} gold cannot cover a cost of {cost}")]
pub struct AffordabilityDenied {
    /// Balance before the attempted purchase, left unchanged.
    pub balance: Gold,
    /// Price that was requested.
    pub cost: Gold,
}

/// Price of the provided power-up.
#[must_use]
pub const fn cost_of(kind: PowerUp) -> Gold {
    match kind {
        PowerUp::Hint => HINT_PRICE,
        PowerUp::ExtendTime => TIME_PRICE,
    }
}

/// Reports whether `balance` covers `cost`.
#[must_use]
pub fn can_afford(balance: Gold, cost: Gold) -> bool {
    balance >= cost
}

/// Deducts `cost` from `balance`, or reports the unchanged balance when it falls short.
pub fn spend(balance: Gold, cost: Gold) -> Result<Gold, AffordabilityDenied> {
    balance
        .checked_sub(cost)
        .ok_or(AffordabilityDenied { balance, cost })
}

/// Gold credited for clearing a level with `remaining_seconds` left on the clock.
#[must_use]
pub const fn compute_reward(remaining_seconds: u32) -> Gold {
    Gold::new(BASE_REWARD.saturating_add(remaining_seconds / 2))
}
