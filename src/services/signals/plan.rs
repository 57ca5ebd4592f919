//! Suggested stop-loss / take-profit levels for the current price.

use crate::types::{TradePlan, TradePlans};

const CONSERVATIVE_SL: f64 = 0.96;
const CONSERVATIVE_TP: f64 = 1.08;
const AGGRESSIVE_SL: f64 = 0.95;
const AGGRESSIVE_TP: f64 = 1.15;

/// Round to the nearest multiple of 5, the IDX tick-size presentation
/// convention. Applied after the percentage math, never before.
fn round_to_tick(value: f64) -> f64 {
    (value / 5.0).round() * 5.0
}

/// Build both exit plans for the current price: conservative swing
/// (risk 4%, reward 8%) and aggressive trend (risk 5%, reward 15%).
pub fn trade_plans(price: f64) -> TradePlans {
    TradePlans {
        conservative: TradePlan {
            stop_loss: round_to_tick(price * CONSERVATIVE_SL),
            take_profit: round_to_tick(price * CONSERVATIVE_TP),
        },
        aggressive: TradePlan {
            stop_loss: round_to_tick(price * AGGRESSIVE_SL),
            take_profit: round_to_tick(price * AGGRESSIVE_TP),
        },
    }
}
