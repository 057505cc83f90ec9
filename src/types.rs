// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Shared value types: money, tariff posts, GKG columns and table rows.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from parsing caller-supplied selectors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown tariff post: {0:?}")]
    UnknownTariffPost(String),

    #[error("unknown GKG column: {0:?}")]
    UnknownGkgColumn(String),
}

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// Amount in Swiss francs backed by `rust_decimal::Decimal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    /// Zero value
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Whether the value is exactly zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round to whole cents, half away from zero.
    pub fn round_cents(&self) -> Self {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// `None` when the sum leaves the `Decimal` range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: Decimal) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;
    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, m| acc + m)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round_cents().0)
    }
}

// ---------------------------------------------------------------------------
// TariffPost
// ---------------------------------------------------------------------------

/// Tariff post selector, including the two non-fee pseudo-posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TariffPost {
    /// Simple filings, insolvency claims
    #[serde(rename = "TP1")]
    Tp1,
    /// Payment order, divorce, enforcement
    #[serde(rename = "TP2")]
    Tp2,
    /// General civil lawsuit
    #[serde(rename = "TP3A")]
    Tp3a,
    /// In-court session billed by the started hour
    #[serde(rename = "TP3A_SESSION")]
    Tp3aSession,
    /// Appeal
    #[serde(rename = "TP3B")]
    Tp3b,
    /// Revision to the supreme court
    #[serde(rename = "TP3C")]
    Tp3c,
    /// Simple letter
    #[serde(rename = "TP5")]
    Tp5,
    /// Complex letter
    #[serde(rename = "TP6")]
    Tp6,
    /// Off-premises business
    #[serde(rename = "TP7")]
    Tp7,
    /// Conference / phone call per 30 minutes
    #[serde(rename = "TP8")]
    Tp8,
    /// Travel time per hour
    #[serde(rename = "TP9")]
    Tp9,
    /// Court fee only (GKG), no attorney fee
    #[serde(rename = "COURT_FEE")]
    CourtFee,
    /// Manually entered cash outlay
    #[serde(rename = "DISBURSEMENT")]
    Disbursement,
}

impl TariffPost {
    pub const ALL: [TariffPost; 13] = [
        Self::Tp1,
        Self::Tp2,
        Self::Tp3a,
        Self::Tp3aSession,
        Self::Tp3b,
        Self::Tp3c,
        Self::Tp5,
        Self::Tp6,
        Self::Tp7,
        Self::Tp8,
        Self::Tp9,
        Self::CourtFee,
        Self::Disbursement,
    ];

    /// Canonical identifier, identical to the serde name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tp1 => "TP1",
            Self::Tp2 => "TP2",
            Self::Tp3a => "TP3A",
            Self::Tp3aSession => "TP3A_SESSION",
            Self::Tp3b => "TP3B",
            Self::Tp3c => "TP3C",
            Self::Tp5 => "TP5",
            Self::Tp6 => "TP6",
            Self::Tp7 => "TP7",
            Self::Tp8 => "TP8",
            Self::Tp9 => "TP9",
            Self::CourtFee => "COURT_FEE",
            Self::Disbursement => "DISBURSEMENT",
        }
    }

    /// Short label for statements and pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tp1 => "TP 1 (Eingabe)",
            Self::Tp2 => "TP 2 (Mahn/Exekution)",
            Self::Tp3a => "TP 3A (Klage)",
            Self::Tp3aSession => "TP 3A (Tagsatzung)",
            Self::Tp3b => "TP 3B (Berufung)",
            Self::Tp3c => "TP 3C (Revision)",
            Self::Tp5 => "TP 5 (Brief einfach)",
            Self::Tp6 => "TP 6 (Brief komplex)",
            Self::Tp7 => "TP 7 (Auswärts)",
            Self::Tp8 => "TP 8 (Konferenz)",
            Self::Tp9 => "TP 9 (Reisezeit)",
            Self::CourtFee => "Gerichtsgebühr (GGG)",
            Self::Disbursement => "Barauslagen",
        }
    }

    /// Posts billed per time unit rather than per act.
    pub fn is_time_based(&self) -> bool {
        matches!(self, Self::Tp3aSession | Self::Tp7 | Self::Tp8 | Self::Tp9)
    }

    /// Whether the post runs through the attorney-fee pipeline.
    pub fn is_attorney_fee(&self) -> bool {
        !matches!(self, Self::CourtFee | Self::Disbursement)
    }
}

impl fmt::Display for TariffPost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TariffPost {
    type Err = ParseError;

    /// Accepts `TP3A`, `tp 3a`, `TP3A_Session`, `court-fee`, `GKG`, `Barauslagen`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() })
            .collect();
        let post = match norm.as_str() {
            "TP1" => Self::Tp1,
            "TP2" => Self::Tp2,
            "TP3A" => Self::Tp3a,
            "TP3A_SESSION" => Self::Tp3aSession,
            "TP3B" => Self::Tp3b,
            "TP3C" => Self::Tp3c,
            "TP5" => Self::Tp5,
            "TP6" => Self::Tp6,
            "TP7" => Self::Tp7,
            "TP8" => Self::Tp8,
            "TP9" => Self::Tp9,
            "COURT_FEE" | "GKG" => Self::CourtFee,
            "DISBURSEMENT" | "BARAUSLAGEN" => Self::Disbursement,
            _ => return Err(ParseError::UnknownTariffPost(s.to_string())),
        };
        Ok(post)
    }
}

// ---------------------------------------------------------------------------
// GkgColumn
// ---------------------------------------------------------------------------

/// Procedure type selecting a column of the court-fee table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GkgColumn {
    /// Contentious civil proceedings
    Civil,
    /// Debt collection (payment order)
    Debt,
    /// Non-contentious proceedings
    NonContentious,
    /// Enforcement
    Enforcement,
    /// Security and registration proceedings
    Security,
}

impl GkgColumn {
    pub const ALL: [GkgColumn; 5] = [
        Self::Civil,
        Self::Debt,
        Self::NonContentious,
        Self::Enforcement,
        Self::Security,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Civil => "Zivilprozess (Streitig)",
            Self::Debt => "Schuldentrieb (Mahn)",
            Self::NonContentious => "Ausserstreit",
            Self::Enforcement => "Exekution",
            Self::Security => "Rechtssicherung/Rechtsöffnung",
        }
    }
}

impl FromStr for GkgColumn {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column = match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "civil" | "zivil" => Self::Civil,
            "debt" | "schuld" => Self::Debt,
            "non_contentious" | "noncontentious" | "ausserstreit" => Self::NonContentious,
            "enforcement" | "exekution" => Self::Enforcement,
            "security" | "sicherung" => Self::Security,
            _ => return Err(ParseError::UnknownGkgColumn(s.to_string())),
        };
        Ok(column)
    }
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

/// Fee applicable up to and including `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStep {
    pub limit: Money,
    pub fee: Money,
}

impl FeeStep {
    pub const fn new(limit: Decimal, fee: Decimal) -> Self {
        Self { limit: Money(limit), fee: Money(fee) }
    }
}

/// One GKG bracket with the five procedure-type fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GkgRow {
    pub limit: Money,
    pub civil: Money,
    pub debt: Money,
    pub non_contentious: Money,
    pub enforcement: Money,
    pub security: Money,
}

impl GkgRow {
    /// Fee in the given column.
    pub fn fee(&self, column: GkgColumn) -> Money {
        match column {
            GkgColumn::Civil => self.civil,
            GkgColumn::Debt => self.debt,
            GkgColumn::NonContentious => self.non_contentious,
            GkgColumn::Enforcement => self.enforcement,
            GkgColumn::Security => self.security,
        }
    }
}

/// Index of the first step whose limit is at or above `value`.
pub(crate) fn bracket_index<T>(rows: &[T], value: Money, limit: impl Fn(&T) -> Money) -> Option<usize> {
    rows.iter().position(|row| value <= limit(row))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
