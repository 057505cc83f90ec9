// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Court fees (GGG annex) -- bracket lookup plus appeal multiplier.
//!
//! Court fees are owed to the court, not the attorney: they are VAT-exempt and
//! never enter the unit-rate or party-surcharge base.

use crate::tariff::CatalogError;
use crate::types::{bracket_index, GkgColumn, GkgRow, Money};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GkgTable
// ---------------------------------------------------------------------------

const fn row(limit: Decimal, civil: Decimal, debt: Decimal, non_contentious: Decimal, enforcement: Decimal, security: Decimal) -> GkgRow {
    GkgRow {
        limit: Money(limit),
        civil: Money(civil),
        debt: Money(debt),
        non_contentious: Money(non_contentious),
        enforcement: Money(enforcement),
        security: Money(security),
    }
}

const ROWS_2025: [GkgRow; 10] = [
    row(dec!(100), dec!(120), dec!(10), dec!(10), dec!(10), dec!(30)),
    row(dec!(500), dec!(120), dec!(20), dec!(20), dec!(20), dec!(30)),
    row(dec!(1000), dec!(120), dec!(30), dec!(30), dec!(30), dec!(30)),
    row(dec!(5000), dec!(300), dec!(50), dec!(100), dec!(50), dec!(50)),
    row(dec!(10000), dec!(500), dec!(50), dec!(100), dec!(50), dec!(100)),
    row(dec!(50000), dec!(850), dec!(90), dec!(210), dec!(90), dec!(200)),
    row(dec!(100000), dec!(2000), dec!(90), dec!(510), dec!(170), dec!(400)),
    row(dec!(500000), dec!(4000), dec!(170), dec!(1000), dec!(850), dec!(900)),
    row(dec!(1000000), dec!(5000), dec!(340), dec!(1900), dec!(1700), dec!(1700)),
    row(dec!(2000000), dec!(7200), dec!(850), dec!(4500), dec!(4000), dec!(4000)),
];

/// Court-fee brackets with one fee per procedure type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GkgTable {
    pub name: String,
    pub rows: Vec<GkgRow>,
}

impl Default for GkgTable {
    fn default() -> Self {
        Self::rev_2025()
    }
}

impl GkgTable {
    pub fn rev_2025() -> Self {
        Self { name: "GGG 2025".to_string(), rows: ROWS_2025.to_vec() }
    }

    /// Load from JSON, rejecting empty or unsorted bracket lists.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        use crate::types::TariffPost;

        if self.rows.is_empty() {
            return Err(CatalogError::EmptyTable(TariffPost::CourtFee));
        }
        for (index, pair) in self.rows.windows(2).enumerate() {
            if pair[1].limit <= pair[0].limit {
                return Err(CatalogError::UnsortedTable { post: TariffPost::CourtFee, index: index + 1 });
            }
        }
        Ok(())
    }

    /// Fee of the bracket containing `value`; values beyond the last
    /// bracket use the last row.
    pub fn lookup(&self, value: Money, column: GkgColumn) -> Money {
        let index = bracket_index(&self.rows, value, |r| r.limit)
            .unwrap_or_else(|| self.rows.len().saturating_sub(1));
        self.rows.get(index).map(|r| r.fee(column)).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// CourtFeePolicy
// ---------------------------------------------------------------------------

/// Appeal factor applying up to and including `up_to` (open-ended if `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppealTier {
    pub up_to: Option<Money>,
    pub factor: Decimal,
}

/// Multipliers for appeal proceedings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtFeePolicy {
    /// Columns whose appeal factor depends on the disputed amount.
    pub tiered_columns: Vec<GkgColumn>,
    /// Tiers for `tiered_columns`, ascending; the last should be open-ended.
    pub tiers: Vec<AppealTier>,
    /// Factor for every other column.
    pub flat_factor: Decimal,
}

impl Default for CourtFeePolicy {
    fn default() -> Self {
        Self {
            tiered_columns: vec![GkgColumn::Debt, GkgColumn::Enforcement],
            tiers: vec![
                AppealTier { up_to: Some(Money(dec!(5000))), factor: dec!(1) },
                AppealTier { up_to: Some(Money(dec!(50000))), factor: dec!(2.5) },
                AppealTier { up_to: None, factor: dec!(6) },
            ],
            flat_factor: dec!(2),
        }
    }
}

impl CourtFeePolicy {
    /// Factor applied to the bracket fee. Non-appeal proceedings use 1.
    pub fn factor(&self, value: Money, column: GkgColumn, is_appeal: bool) -> Decimal {
        if !is_appeal {
            return Decimal::ONE;
        }
        if !self.tiered_columns.contains(&column) {
            return self.flat_factor;
        }
        self.tiers
            .iter()
            .find(|t| t.up_to.map_or(true, |limit| value <= limit))
            .map(|t| t.factor)
            .unwrap_or(self.flat_factor)
    }
}

// ---------------------------------------------------------------------------
// CourtFeeResolver
// ---------------------------------------------------------------------------

/// Table plus appeal policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourtFeeResolver {
    pub table: GkgTable,
    pub policy: CourtFeePolicy,
}

impl CourtFeeResolver {
    pub fn new(table: GkgTable, policy: CourtFeePolicy) -> Self {
        Self { table, policy }
    }

    /// Court fee in cents precision.
    pub fn resolve(&self, value: Money, column: GkgColumn, is_appeal: bool) -> Money {
        let base = self.table.lookup(value, column);
        let factor = self.policy.factor(value, column, is_appeal);
        let fee = (base * factor).round_cents();
        debug!("court fee: value={} column={:?} base={} x{} -> {}", value, column, base, factor, fee);
        fee
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
