// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Tariff catalog -- immutable fee definitions per tariff post.
//!
//! The catalog is an arena of [`TariffEntry`] values keyed by [`TariffPost`].
//! Derived and session posts refer to their baseline by key, never by copy,
//! so a catalog for another tariff year is simply another instance.

use crate::types::{FeeStep, Money, TariffPost};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building or loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}: fee table is empty")]
    EmptyTable(TariffPost),

    #[error("{post}: step {index} does not have a strictly ascending limit")]
    UnsortedTable { post: TariffPost, index: usize },

    #[error("{post}: baseline {baseline} is missing or has the wrong kind")]
    InvalidBaseline { post: TariffPost, baseline: TariffPost },

    #[error("{0} is defined more than once")]
    DuplicatePost(TariffPost),

    #[error("{0} is a pseudo-post and cannot carry a fee definition")]
    PseudoPost(TariffPost),
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Table steps plus overflow rules for one tariff post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffDefinition {
    /// Steps sorted ascending by limit.
    pub table: Vec<FeeStep>,
    /// Added for every started 20,000 block beyond the last table limit.
    pub step_increment: Money,
    /// Rate on the excess over 500,000 up to 5,000,000.
    #[serde(default)]
    pub pct_tier1: Decimal,
    /// Rate on the excess over 5,000,000.
    #[serde(default)]
    pub pct_tier2: Decimal,
    /// Absolute ceiling.
    pub cap: Money,
}

impl TariffDefinition {
    fn from_steps(
        steps: &[FeeStep],
        step_increment: Decimal,
        pct_tier1: Decimal,
        pct_tier2: Decimal,
        cap: Decimal,
    ) -> Self {
        Self {
            table: steps.to_vec(),
            step_increment: Money(step_increment),
            pct_tier1,
            pct_tier2,
            cap: Money(cap),
        }
    }

    /// Last (highest) table step.
    ///
    /// Catalog validation guarantees the table is non-empty.
    pub fn last_step(&self) -> FeeStep {
        self.table
            .last()
            .copied()
            .unwrap_or(FeeStep { limit: Money::zero(), fee: Money::zero() })
    }

    fn validate(&self, post: TariffPost) -> Result<(), CatalogError> {
        if self.table.is_empty() {
            return Err(CatalogError::EmptyTable(post));
        }
        for (index, pair) in self.table.windows(2).enumerate() {
            if pair[1].limit <= pair[0].limit {
                return Err(CatalogError::UnsortedTable { post, index: index + 1 });
            }
        }
        Ok(())
    }
}

/// A post defined as a multiple of another post's uncapped fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedDefinition {
    pub baseline: TariffPost,
    pub multiplier: Decimal,
    pub cap: Money,
}

/// How a tariff post computes its single-unit fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TariffEntry {
    /// Table, linear steps, two percentage tiers, cap.
    Standard(TariffDefinition),
    /// Table and linear steps only, cap.
    Scaled(TariffDefinition),
    /// Multiple of a scaled baseline, own cap.
    Derived(DerivedDefinition),
    /// Hourly escalation over a standard baseline.
    Session { baseline: TariffPost },
    /// Fixed fee per unit.
    Flat { fee: Money },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostEntry {
    post: TariffPost,
    tariff: TariffEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    name: String,
    posts: Vec<PostEntry>,
}

// ---------------------------------------------------------------------------
// Rev. 2025 data
// ---------------------------------------------------------------------------

const TABLE_TP1: [FeeStep; 12] = [
    FeeStep::new(dec!(500), dec!(17)),
    FeeStep::new(dec!(1000), dec!(25)),
    FeeStep::new(dec!(1500), dec!(32)),
    FeeStep::new(dec!(2500), dec!(37)),
    FeeStep::new(dec!(5000), dec!(40)),
    FeeStep::new(dec!(10000), dec!(49)),
    FeeStep::new(dec!(15000), dec!(64)),
    FeeStep::new(dec!(25000), dec!(72)),
    FeeStep::new(dec!(50000), dec!(80)),
    FeeStep::new(dec!(75000), dec!(96)),
    FeeStep::new(dec!(100000), dec!(119)),
    FeeStep::new(dec!(140000), dec!(159)),
];

const TABLE_TP2: [FeeStep; 12] = [
    FeeStep::new(dec!(500), dec!(80)),
    FeeStep::new(dec!(1000), dec!(119)),
    FeeStep::new(dec!(1500), dec!(159)),
    FeeStep::new(dec!(2500), dec!(175)),
    FeeStep::new(dec!(5000), dec!(198)),
    FeeStep::new(dec!(10000), dec!(238)),
    FeeStep::new(dec!(15000), dec!(317)),
    FeeStep::new(dec!(25000), dec!(357)),
    FeeStep::new(dec!(50000), dec!(396)),
    FeeStep::new(dec!(75000), dec!(476)),
    FeeStep::new(dec!(100000), dec!(594)),
    FeeStep::new(dec!(140000), dec!(792)),
];

const TABLE_TP3A: [FeeStep; 12] = [
    FeeStep::new(dec!(500), dec!(159)),
    FeeStep::new(dec!(1000), dec!(238)),
    FeeStep::new(dec!(1500), dec!(317)),
    FeeStep::new(dec!(2500), dec!(349)),
    FeeStep::new(dec!(5000), dec!(396)),
    FeeStep::new(dec!(10000), dec!(476)),
    FeeStep::new(dec!(15000), dec!(634)),
    FeeStep::new(dec!(25000), dec!(713)),
    FeeStep::new(dec!(50000), dec!(792)),
    FeeStep::new(dec!(75000), dec!(951)),
    FeeStep::new(dec!(100000), dec!(1188)),
    FeeStep::new(dec!(140000), dec!(1584)),
];

const TABLE_TP3B: [FeeStep; 12] = [
    FeeStep::new(dec!(500), dec!(198)),
    FeeStep::new(dec!(1000), dec!(297)),
    FeeStep::new(dec!(1500), dec!(396)),
    FeeStep::new(dec!(2500), dec!(436)),
    FeeStep::new(dec!(5000), dec!(495)),
    FeeStep::new(dec!(10000), dec!(594)),
    FeeStep::new(dec!(15000), dec!(792)),
    FeeStep::new(dec!(25000), dec!(891)),
    FeeStep::new(dec!(50000), dec!(990)),
    FeeStep::new(dec!(75000), dec!(1188)),
    FeeStep::new(dec!(100000), dec!(1485)),
    FeeStep::new(dec!(140000), dec!(1980)),
];

const TABLE_TP3C: [FeeStep; 12] = [
    FeeStep::new(dec!(500), dec!(238)),
    FeeStep::new(dec!(1000), dec!(357)),
    FeeStep::new(dec!(1500), dec!(476)),
    FeeStep::new(dec!(2500), dec!(524)),
    FeeStep::new(dec!(5000), dec!(594)),
    FeeStep::new(dec!(10000), dec!(713)),
    FeeStep::new(dec!(15000), dec!(951)),
    FeeStep::new(dec!(25000), dec!(1070)),
    FeeStep::new(dec!(50000), dec!(1188)),
    FeeStep::new(dec!(75000), dec!(1426)),
    FeeStep::new(dec!(100000), dec!(1782)),
    FeeStep::new(dec!(140000), dec!(2376)),
];

const TABLE_TP5: [FeeStep; 6] = [
    FeeStep::new(dec!(1000), dec!(8)),
    FeeStep::new(dec!(2500), dec!(10)),
    FeeStep::new(dec!(5000), dec!(12)),
    FeeStep::new(dec!(10000), dec!(17)),
    FeeStep::new(dec!(25000), dec!(33)),
    FeeStep::new(dec!(50000), dec!(50)),
];

const TABLE_TP8: [FeeStep; 5] = [
    FeeStep::new(dec!(1000), dec!(30)),
    FeeStep::new(dec!(2500), dec!(45)),
    FeeStep::new(dec!(5000), dec!(53)),
    FeeStep::new(dec!(10000), dec!(75)),
    FeeStep::new(dec!(25000), dec!(135)),
];

// ---------------------------------------------------------------------------
// TariffCatalog
// ---------------------------------------------------------------------------

/// Immutable set of fee definitions for one tariff revision.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffCatalog {
    name: String,
    entries: BTreeMap<TariffPost, TariffEntry>,
}

impl Default for TariffCatalog {
    fn default() -> Self {
        Self::rev_2025()
    }
}

impl TariffCatalog {
    /// Lawyer tariff as in force from 2025.
    pub fn rev_2025() -> Self {
        use TariffEntry::*;

        let mut entries = BTreeMap::new();
        entries.insert(
            TariffPost::Tp1,
            Standard(TariffDefinition::from_steps(
                &TABLE_TP1, dec!(17), dec!(0.0001), dec!(0.00005), dec!(1426),
            )),
        );
        entries.insert(
            TariffPost::Tp2,
            Standard(TariffDefinition::from_steps(
                &TABLE_TP2, dec!(80), dec!(0.0005), dec!(0.00025), dec!(7128),
            )),
        );
        entries.insert(
            TariffPost::Tp3a,
            Standard(TariffDefinition::from_steps(
                &TABLE_TP3A, dec!(159), dec!(0.001), dec!(0.0005), dec!(43200),
            )),
        );
        entries.insert(TariffPost::Tp3aSession, Session { baseline: TariffPost::Tp3a });
        entries.insert(
            TariffPost::Tp3b,
            Standard(TariffDefinition::from_steps(
                &TABLE_TP3B, dec!(198), dec!(0.00125), dec!(0.000625), dec!(54000),
            )),
        );
        entries.insert(
            TariffPost::Tp3c,
            Standard(TariffDefinition::from_steps(
                &TABLE_TP3C, dec!(238), dec!(0.0015), dec!(0.00075), dec!(64800),
            )),
        );
        entries.insert(
            TariffPost::Tp5,
            Scaled(TariffDefinition::from_steps(
                &TABLE_TP5, dec!(17), Decimal::ZERO, Decimal::ZERO, dec!(100),
            )),
        );
        entries.insert(
            TariffPost::Tp6,
            Derived(DerivedDefinition {
                baseline: TariffPost::Tp5,
                multiplier: dec!(2),
                cap: Money(dec!(330)),
            }),
        );
        entries.insert(
            TariffPost::Tp7,
            Derived(DerivedDefinition {
                baseline: TariffPost::Tp5,
                multiplier: dec!(4),
                cap: Money(dec!(440)),
            }),
        );
        entries.insert(
            TariffPost::Tp8,
            Scaled(TariffDefinition::from_steps(
                &TABLE_TP8, dec!(15), Decimal::ZERO, Decimal::ZERO, dec!(600),
            )),
        );
        entries.insert(TariffPost::Tp9, Flat { fee: Money(dec!(75)) });

        Self { name: "RATV 2025".to_string(), entries }
    }

    /// Build a catalog from entries, validating tables and baselines.
    pub fn new(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (TariffPost, TariffEntry)>,
    ) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for (post, entry) in entries {
            if !post.is_attorney_fee() {
                return Err(CatalogError::PseudoPost(post));
            }
            if map.insert(post, entry).is_some() {
                return Err(CatalogError::DuplicatePost(post));
            }
        }
        let catalog = Self { name: name.into(), entries: map };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.name, file.posts.into_iter().map(|e| (e.post, e.tariff)))
    }

    /// Serialize to the JSON form read by [`from_json`](Self::from_json).
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            name: self.name.clone(),
            posts: self
                .entries
                .iter()
                .map(|(post, tariff)| PostEntry { post: *post, tariff: tariff.clone() })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, post: TariffPost) -> Option<&TariffEntry> {
        self.entries.get(&post)
    }

    /// Posts defined in this catalog, in canonical order.
    pub fn posts(&self) -> impl Iterator<Item = TariffPost> + '_ {
        self.entries.keys().copied()
    }

    /// Table definition of a standard or scaled post.
    pub fn definition(&self, post: TariffPost) -> Option<&TariffDefinition> {
        match self.entries.get(&post)? {
            TariffEntry::Standard(def) | TariffEntry::Scaled(def) => Some(def),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (post, entry) in &self.entries {
            let post = *post;
            match entry {
                TariffEntry::Standard(def) | TariffEntry::Scaled(def) => def.validate(post)?,
                TariffEntry::Derived(derived) => {
                    if !matches!(self.entries.get(&derived.baseline), Some(TariffEntry::Scaled(_))) {
                        return Err(CatalogError::InvalidBaseline { post, baseline: derived.baseline });
                    }
                }
                TariffEntry::Session { baseline } => {
                    if !matches!(self.entries.get(baseline), Some(TariffEntry::Standard(_))) {
                        return Err(CatalogError::InvalidBaseline { post, baseline: *baseline });
                    }
                }
                TariffEntry::Flat { .. } => {}
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rev_2025_defines_every_attorney_post() {
        let catalog = TariffCatalog::rev_2025();
        for post in TariffPost::ALL.iter().filter(|p| p.is_attorney_fee()) {
            assert!(catalog.get(*post).is_some(), "{post} missing from catalog");
        }
        assert!(catalog.get(TariffPost::CourtFee).is_none());
        catalog.validate().expect("test: built-in catalog must validate");
    }

    #[test]
    fn standard_tables_end_at_140k() {
        let catalog = TariffCatalog::rev_2025();
        for post in [TariffPost::Tp1, TariffPost::Tp2, TariffPost::Tp3a, TariffPost::Tp3b, TariffPost::Tp3c] {
            let def = catalog.definition(post).expect("test: standard definition");
            assert_eq!(def.last_step().limit, Money(dec!(140000)), "{post}");
        }
    }

    #[test]
    fn appeal_rates_are_per_mille() {
        let catalog = TariffCatalog::rev_2025();
        let tp3b = catalog.definition(TariffPost::Tp3b).expect("test: TP3B");
        let tp3c = catalog.definition(TariffPost::Tp3c).expect("test: TP3C");
        assert_eq!(tp3b.pct_tier1, dec!(0.00125));
        assert_eq!(tp3b.pct_tier2, dec!(0.000625));
        assert_eq!(tp3c.pct_tier1, dec!(0.0015));
        assert_eq!(tp3c.pct_tier2, dec!(0.00075));
    }

    #[test]
    fn json_round_trip_preserves_catalog() {
        let catalog = TariffCatalog::rev_2025();
        let json = catalog.to_json().expect("test: serialize catalog");
        let loaded = TariffCatalog::from_json(&json).expect("test: reload catalog");
        assert_eq!(loaded, catalog);
        assert_eq!(loaded.name(), "RATV 2025");
    }

    #[test]
    fn unsorted_table_rejected() {
        let def = TariffDefinition::from_steps(
            &[FeeStep::new(dec!(1000), dec!(10)), FeeStep::new(dec!(1000), dec!(12))],
            dec!(5),
            Decimal::ZERO,
            Decimal::ZERO,
            dec!(100),
        );
        let err = TariffCatalog::new("bad", [(TariffPost::Tp5, TariffEntry::Scaled(def))]);
        assert!(
            matches!(err, Err(CatalogError::UnsortedTable { post: TariffPost::Tp5, index: 1 })),
            "expected UnsortedTable, got {err:?}"
        );
    }

    #[test]
    fn empty_table_rejected() {
        let def = TariffDefinition::from_steps(&[], dec!(5), Decimal::ZERO, Decimal::ZERO, dec!(100));
        let err = TariffCatalog::new("bad", [(TariffPost::Tp8, TariffEntry::Scaled(def))]);
        assert!(matches!(err, Err(CatalogError::EmptyTable(TariffPost::Tp8))));
    }

    #[test]
    fn derived_without_baseline_rejected() {
        let err = TariffCatalog::new(
            "bad",
            [(
                TariffPost::Tp6,
                TariffEntry::Derived(DerivedDefinition {
                    baseline: TariffPost::Tp5,
                    multiplier: dec!(2),
                    cap: Money(dec!(330)),
                }),
            )],
        );
        assert!(matches!(
            err,
            Err(CatalogError::InvalidBaseline { post: TariffPost::Tp6, baseline: TariffPost::Tp5 })
        ));
    }

    #[test]
    fn pseudo_posts_cannot_be_defined() {
        let err = TariffCatalog::new(
            "bad",
            [(TariffPost::Disbursement, TariffEntry::Flat { fee: Money(dec!(1)) })],
        );
        assert!(matches!(err, Err(CatalogError::PseudoPost(TariffPost::Disbursement))));
    }

    #[test]
    fn malformed_json_reports_json_error() {
        let err = TariffCatalog::from_json("{\"name\": 3}");
        assert!(matches!(err, Err(CatalogError::Json(_))));
    }
}
