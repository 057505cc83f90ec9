// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Accounting identities and cost statements.
//!
//! Every breakdown must satisfy
//!
//! ```text
//! net   = base + unit rate + surcharge
//! gross = net + vat + court fee
//! ```
//!
//! within one cent. A [`CostStatement`] collects line items and only accepts
//! breakdowns that pass this check.

use crate::aggregator::CalculationResult;
use crate::types::{Money, TariffPost};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Raised when a breakdown does not add up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountingError {
    #[error("net total imbalance: expected {expected}, got {actual}")]
    NetMismatch { expected: Money, actual: Money },

    #[error("gross total imbalance: expected {expected}, got {actual}")]
    GrossMismatch { expected: Money, actual: Money },
}

/// Largest tolerated difference between a total and the sum of its parts.
pub const ACCOUNTING_TOLERANCE: Decimal = dec!(0.01);

impl CalculationResult {
    /// Check both accounting identities.
    pub fn verify(&self) -> Result<(), AccountingError> {
        let expected = self.base_fee + self.unit_rate_amount + self.surcharge_amount;
        if (expected.0 - self.net_total.0).abs() > ACCOUNTING_TOLERANCE {
            return Err(AccountingError::NetMismatch { expected, actual: self.net_total });
        }

        let expected = self.net_total + self.vat_amount + self.court_fee;
        if (expected.0 - self.gross_total.0).abs() > ACCOUNTING_TOLERANCE {
            return Err(AccountingError::GrossMismatch { expected, actual: self.gross_total });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Position / CostStatement
// ---------------------------------------------------------------------------

/// One line of a cost statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub label: String,
    pub value: Money,
    pub multiplier: Decimal,
    pub post: TariffPost,
    pub details: CalculationResult,
}

/// Column sums over all positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementTotals {
    pub base_fee: Money,
    pub unit_rate_amount: Money,
    pub surcharge_amount: Money,
    pub court_fee: Money,
    pub net_total: Money,
    pub vat_amount: Money,
    pub gross_total: Money,
}

/// Ordered list of positions for one matter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostStatement {
    positions: Vec<Position>,
}

impl CostStatement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position after checking its breakdown.
    pub fn push(&mut self, position: Position) -> Result<(), AccountingError> {
        position.details.verify()?;
        self.positions.push(position);
        Ok(())
    }

    /// Remove and return the position at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<Position> {
        (index < self.positions.len()).then(|| self.positions.remove(index))
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn totals(&self) -> StatementTotals {
        let sum = |f: fn(&CalculationResult) -> Money| -> Money {
            self.positions.iter().map(|p| f(&p.details)).sum()
        };
        StatementTotals {
            base_fee: sum(|d| d.base_fee),
            unit_rate_amount: sum(|d| d.unit_rate_amount),
            surcharge_amount: sum(|d| d.surcharge_amount),
            court_fee: sum(|d| d.court_fee),
            net_total: sum(|d| d.net_total),
            vat_amount: sum(|d| d.vat_amount),
            gross_total: sum(|d| d.gross_total),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
