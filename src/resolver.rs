// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Base-fee resolvers -- disputed amount to single-unit attorney fee.
//!
//! Four shapes exist in the tariff:
//!
//! ```text
//! standard : table -> +step per started 20k (to 500k) -> tier1 % (to 5M) -> tier2 % -> cap
//! scaled   : table -> +step per started 20k, unbounded -> cap
//! derived  : min(scaled_uncapped(baseline) * multiplier, own cap)
//! session  : standard fee for the first hour + follow-up rate per further started hour
//! ```
//!
//! Results are unrounded; the aggregator rounds once the multiplier is applied.

use crate::tariff::TariffDefinition;
use crate::types::{bracket_index, Money};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Width of one linear step block above the table.
pub const STEP_BLOCK: Decimal = dec!(20000);
/// Upper end of the linear-step regime.
pub const LINEAR_CEILING: Decimal = dec!(500000);
/// Boundary between the two percentage tiers.
pub const TIER2_FLOOR: Decimal = dec!(5000000);

/// Which rule of the standard chain produced a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeRegime {
    Table,
    LinearStep,
    PercentTier1,
    PercentTier2,
}

fn table_fee(value: Money, def: &TariffDefinition) -> Option<Money> {
    bracket_index(&def.table, value, |s| s.limit).map(|i| def.table[i].fee)
}

/// Last table fee plus one increment per started block beyond the table.
fn linear_fee(value: Money, def: &TariffDefinition) -> Money {
    let last = def.last_step();
    let excess = (value.0 - last.limit.0).max(Decimal::ZERO);
    let blocks = (excess / STEP_BLOCK).ceil();
    last.fee + def.step_increment * blocks
}

/// Regime the standard chain selects for `value`.
pub fn standard_regime(value: Money, def: &TariffDefinition) -> FeeRegime {
    if value <= def.last_step().limit {
        FeeRegime::Table
    } else if value.0 <= LINEAR_CEILING {
        FeeRegime::LinearStep
    } else if value.0 <= TIER2_FLOOR {
        FeeRegime::PercentTier1
    } else {
        FeeRegime::PercentTier2
    }
}

fn standard_fee_uncapped(value: Money, def: &TariffDefinition) -> Money {
    if let Some(fee) = table_fee(value, def) {
        return fee;
    }
    if value.0 <= LINEAR_CEILING {
        return linear_fee(value, def);
    }

    let at_500k = linear_fee(Money(LINEAR_CEILING), def);
    if value.0 <= TIER2_FLOOR {
        return at_500k + Money(value.0 - LINEAR_CEILING) * def.pct_tier1;
    }

    let at_5m = at_500k + Money(TIER2_FLOOR - LINEAR_CEILING) * def.pct_tier1;
    at_5m + Money(value.0 - TIER2_FLOOR) * def.pct_tier2
}

/// Standard chain for TP1, TP2 and TP3A-C, clamped to the post's cap.
pub fn standard_fee(value: Money, def: &TariffDefinition) -> Money {
    let raw = standard_fee_uncapped(value, def);
    let fee = raw.min(def.cap);
    debug!(
        "standard fee: value={} regime={:?} raw={} capped={}",
        value,
        standard_regime(value, def),
        raw,
        fee != raw
    );
    fee
}

/// Table and linear steps without the cap.
pub fn scaled_fee_uncapped(value: Money, def: &TariffDefinition) -> Money {
    table_fee(value, def).unwrap_or_else(|| linear_fee(value, def))
}

/// Scaled chain for TP5 and TP8: no percentage tiers, clamped to the cap.
pub fn scaled_fee(value: Money, def: &TariffDefinition) -> Money {
    scaled_fee_uncapped(value, def).min(def.cap)
}

/// Multiple of the baseline's uncapped fee, then the derived post's own cap.
pub fn derived_fee(value: Money, baseline: &TariffDefinition, multiplier: Decimal, cap: Money) -> Money {
    let base = scaled_fee_uncapped(value, baseline);
    let fee = (base * multiplier).min(cap);
    debug!("derived fee: value={} baseline={} x{} -> {}", value, base, multiplier, fee);
    fee
}

/// Session fee: first started hour in full, each further started hour at
/// `follow_up_rate` of the single-hour fee. `None` if the duration is too
/// large to represent the fee.
pub fn session_fee(value: Money, def: &TariffDefinition, hours: Decimal, follow_up_rate: Decimal) -> Option<Money> {
    if hours <= Decimal::ZERO {
        return Some(Money::zero());
    }
    let further = hours.ceil() - Decimal::ONE;
    let single = standard_fee(value, def);
    let follow_up = single.checked_mul(follow_up_rate)?.checked_mul(further)?;
    single.checked_add(follow_up)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
