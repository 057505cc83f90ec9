// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Surcharges layered on the base fee: unit rate (EHS) and party surcharge.

use crate::types::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UnitRateSchedule
// ---------------------------------------------------------------------------

/// Unit-rate percentage banded by disputed amount.
///
/// The band follows the disputed amount, not the fee, so crossing the
/// threshold can lower the net total while the table step stays the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRateSchedule {
    /// Highest disputed amount that still receives `lower_rate`.
    pub threshold: Money,
    /// Rate up to and including `threshold` (default 0.50).
    pub lower_rate: Decimal,
    /// Rate above `threshold` (default 0.40).
    pub upper_rate: Decimal,
}

impl Default for UnitRateSchedule {
    fn default() -> Self {
        Self {
            threshold: Money(dec!(15000)),
            lower_rate: dec!(0.50),
            upper_rate: dec!(0.40),
        }
    }
}

impl UnitRateSchedule {
    pub fn rate_for(&self, value: Money) -> Decimal {
        if value <= self.threshold {
            self.lower_rate
        } else {
            self.upper_rate
        }
    }

    /// Unit-rate amount on `base_fee`, zero when the flag is off.
    pub fn amount(&self, base_fee: Money, value: Money, enabled: bool) -> Money {
        if !enabled {
            return Money::zero();
        }
        base_fee * self.rate_for(value)
    }
}

// ---------------------------------------------------------------------------
// PartySurchargePolicy
// ---------------------------------------------------------------------------

/// Surcharge for representing additional co-parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PartySurchargePolicy {
    /// Fixed rate as soon as there is at least one additional party.
    Flat { rate: Decimal },
    /// `base_rate` for the first additional party, `step_rate` for each
    /// further one, never above `max_rate`.
    Graduated {
        base_rate: Decimal,
        step_rate: Decimal,
        max_rate: Decimal,
    },
}

impl Default for PartySurchargePolicy {
    fn default() -> Self {
        Self::graduated()
    }
}

impl PartySurchargePolicy {
    /// 10% flat.
    pub fn flat() -> Self {
        Self::Flat { rate: dec!(0.10) }
    }

    /// 10% plus 5% per further party, at most 50%.
    pub fn graduated() -> Self {
        Self::Graduated {
            base_rate: dec!(0.10),
            step_rate: dec!(0.05),
            max_rate: dec!(0.50),
        }
    }

    /// Surcharge rate for `additional_parties` beyond the first client.
    pub fn percent(&self, additional_parties: u32) -> Decimal {
        if additional_parties == 0 {
            return Decimal::ZERO;
        }
        match self {
            Self::Flat { rate } => *rate,
            Self::Graduated { base_rate, step_rate, max_rate } => {
                let further = Decimal::from(additional_parties - 1);
                (*base_rate + further * *step_rate).min(*max_rate)
            }
        }
    }

    /// Surcharge on the base fee plus unit rate.
    pub fn amount(&self, subtotal: Money, additional_parties: u32) -> Money {
        subtotal * self.percent(additional_parties)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
