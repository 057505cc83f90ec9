// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Fee aggregation -- from disputed amount to an itemized fee breakdown.
//!
//! Pipeline, each stage rounded to cents when it is computed:
//!
//! ```text
//! base      = resolver(value) * multiplier
//! unit rate = base * band(value)
//! surcharge = (base + unit rate) * party percent
//! net       = base + unit rate + surcharge
//! vat       = net * vat_rate            (0 for foreign clients)
//! gross     = net + vat + court fee     (court fee is VAT-exempt)
//! ```

use crate::gkg::{CourtFeeResolver, GkgTable};
use crate::resolver::{derived_fee, scaled_fee, session_fee, standard_fee};
use crate::settings::CalculatorSettings;
use crate::tariff::{TariffCatalog, TariffEntry};
use crate::types::{GkgColumn, Money, TariffPost};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by [`FeeAggregator::try_calculate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeError {
    #[error("no fee definition for {0} in this catalog")]
    MissingDefinition(TariffPost),

    #[error("{0}: amount exceeds the representable range")]
    Overflow(TariffPost),
}

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// Per-call modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    /// Court-fee column; required for court fees.
    pub gkg_column: Option<GkgColumn>,
    /// Second- or third-instance proceeding.
    pub is_appeal: bool,
    /// Units billed (documents, half hours); session hours for TP3A_SESSION.
    pub multiplier: Decimal,
    pub has_unit_rate: bool,
    /// Represented parties beyond the first.
    pub additional_parties: u32,
    /// Foreign clients pay no VAT.
    pub is_foreign_client: bool,
    pub include_court_fee: bool,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            gkg_column: None,
            is_appeal: false,
            multiplier: Decimal::ONE,
            has_unit_rate: false,
            additional_parties: 0,
            is_foreign_client: false,
            include_court_fee: false,
        }
    }
}

/// Inputs echoed back with the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEcho {
    pub post: TariffPost,
    pub gkg_column: Option<GkgColumn>,
    pub multiplier: Decimal,
    pub has_unit_rate: bool,
    pub additional_parties: u32,
    pub is_foreign_client: bool,
    pub is_appeal: bool,
    pub include_court_fee: bool,
    pub is_time_based: bool,
}

impl ConfigEcho {
    fn new(post: TariffPost, config: &CalculationConfig) -> Self {
        Self {
            post,
            gkg_column: config.gkg_column,
            multiplier: config.multiplier,
            has_unit_rate: config.has_unit_rate,
            additional_parties: config.additional_parties,
            is_foreign_client: config.is_foreign_client,
            is_appeal: config.is_appeal,
            include_court_fee: config.include_court_fee,
            is_time_based: post.is_time_based(),
        }
    }
}

/// Itemized fee breakdown. All amounts are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub base_fee: Money,
    pub unit_rate_amount: Money,
    pub surcharge_amount: Money,
    pub court_fee: Money,
    pub net_total: Money,
    pub vat_amount: Money,
    pub gross_total: Money,
    pub config: ConfigEcho,
}

impl CalculationResult {
    /// All-zero breakdown.
    pub fn zero(post: TariffPost, config: &CalculationConfig) -> Self {
        Self {
            base_fee: Money::zero(),
            unit_rate_amount: Money::zero(),
            surcharge_amount: Money::zero(),
            court_fee: Money::zero(),
            net_total: Money::zero(),
            vat_amount: Money::zero(),
            gross_total: Money::zero(),
            config: ConfigEcho::new(post, config),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.gross_total.is_zero() && self.net_total.is_zero() && self.court_fee.is_zero()
    }
}

// ---------------------------------------------------------------------------
// FeeAggregator
// ---------------------------------------------------------------------------

/// Catalog, court-fee table and settings bound together.
///
/// Holds only immutable data; share one instance freely.
#[derive(Debug, Clone, Default)]
pub struct FeeAggregator {
    catalog: TariffCatalog,
    court: CourtFeeResolver,
    settings: CalculatorSettings,
}

impl FeeAggregator {
    pub fn new(catalog: TariffCatalog, gkg: GkgTable, settings: CalculatorSettings) -> Self {
        let court = CourtFeeResolver::new(gkg, settings.court_fee.clone());
        Self { catalog, court, settings }
    }

    /// Process-wide instance over the built-in 2025 data.
    pub fn standard() -> &'static FeeAggregator {
        static STANDARD: OnceLock<FeeAggregator> = OnceLock::new();
        STANDARD.get_or_init(FeeAggregator::default)
    }

    pub fn catalog(&self) -> &TariffCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    /// Calculate, reporting a missing definition as an error.
    pub fn try_calculate(
        &self,
        value: Money,
        post: TariffPost,
        config: &CalculationConfig,
    ) -> Result<CalculationResult, FeeError> {
        if value <= Money::zero() {
            debug!("non-positive disputed amount {} for {}: zero result", value, post);
            return Ok(CalculationResult::zero(post, config));
        }

        match post {
            TariffPost::Disbursement => self.disbursement(value, config),
            TariffPost::CourtFee => Ok(self.court_fee_only(value, config)),
            _ => {
                let base_fee = self.base_fee(value, post, config)?;
                self.finish(value, post, base_fee, config)
            }
        }
    }

    /// Calculate with the silent defaults: an undefined post gets a zero base
    /// fee, an out-of-range amount a zero result.
    pub fn calculate(&self, value: Money, post: TariffPost, config: &CalculationConfig) -> CalculationResult {
        match self.try_calculate(value, post, config) {
            Ok(result) => result,
            Err(err @ FeeError::MissingDefinition(_)) => {
                warn!("{err}; using zero base fee");
                self.finish(value, post, Money::zero(), config)
                    .unwrap_or_else(|_| CalculationResult::zero(post, config))
            }
            Err(err @ FeeError::Overflow(_)) => {
                warn!("{err}; returning zero result");
                CalculationResult::zero(post, config)
            }
        }
    }

    /// Base fee for an attorney post, multiplier applied, rounded to cents.
    fn base_fee(&self, value: Money, post: TariffPost, config: &CalculationConfig) -> Result<Money, FeeError> {
        let entry = self.catalog.get(post).ok_or(FeeError::MissingDefinition(post))?;
        let multiplier = config.multiplier.max(Decimal::ZERO);

        let fee = match entry {
            TariffEntry::Standard(def) => standard_fee(value, def).checked_mul(multiplier),
            TariffEntry::Scaled(def) => scaled_fee(value, def).checked_mul(multiplier),
            TariffEntry::Derived(derived) => {
                let baseline = self
                    .catalog
                    .definition(derived.baseline)
                    .ok_or(FeeError::MissingDefinition(derived.baseline))?;
                derived_fee(value, baseline, derived.multiplier, derived.cap).checked_mul(multiplier)
            }
            // the multiplier is the session duration and is consumed here
            TariffEntry::Session { baseline } => {
                let def = self
                    .catalog
                    .definition(*baseline)
                    .ok_or(FeeError::MissingDefinition(*baseline))?;
                session_fee(value, def, config.multiplier, self.settings.session_follow_up_rate)
            }
            TariffEntry::Flat { fee } => fee.checked_mul(multiplier),
        };
        fee.map(|f| f.round_cents()).ok_or(FeeError::Overflow(post))
    }

    fn finish(
        &self,
        value: Money,
        post: TariffPost,
        base_fee: Money,
        config: &CalculationConfig,
    ) -> Result<CalculationResult, FeeError> {
        let overflow = || FeeError::Overflow(post);
        let unit_rate_amount = self
            .settings
            .unit_rate
            .amount(base_fee, value, config.has_unit_rate)
            .round_cents();
        let subtotal = base_fee.checked_add(unit_rate_amount).ok_or_else(overflow)?;
        let surcharge_amount = self
            .settings
            .party_surcharge
            .amount(subtotal, config.additional_parties)
            .round_cents();
        let net_total = subtotal.checked_add(surcharge_amount).ok_or_else(overflow)?.round_cents();
        let vat_amount = if config.is_foreign_client {
            Money::zero()
        } else {
            net_total.checked_mul(self.settings.vat_rate).ok_or_else(overflow)?.round_cents()
        };
        let court_fee = if config.include_court_fee {
            self.court_fee(value, config)
        } else {
            Money::zero()
        };
        let gross_total = net_total
            .checked_add(vat_amount)
            .and_then(|t| t.checked_add(court_fee))
            .ok_or_else(overflow)?
            .round_cents();

        debug!(
            "{}: value={} base={} unit_rate={} surcharge={} net={} vat={} court={} gross={}",
            post, value, base_fee, unit_rate_amount, surcharge_amount, net_total, vat_amount, court_fee, gross_total
        );

        Ok(CalculationResult {
            base_fee,
            unit_rate_amount,
            surcharge_amount,
            court_fee,
            net_total,
            vat_amount,
            gross_total,
            config: ConfigEcho::new(post, config),
        })
    }

    fn court_fee(&self, value: Money, config: &CalculationConfig) -> Money {
        match config.gkg_column {
            Some(column) => self.court.resolve(value, column, config.is_appeal),
            None => {
                warn!("court fee requested without a GKG column; treating as none");
                Money::zero()
            }
        }
    }

    /// Cash outlay: amount times multiplier, nothing else.
    fn disbursement(&self, value: Money, config: &CalculationConfig) -> Result<CalculationResult, FeeError> {
        let base_fee = value
            .checked_mul(config.multiplier.max(Decimal::ZERO))
            .ok_or(FeeError::Overflow(TariffPost::Disbursement))?
            .round_cents();
        Ok(CalculationResult {
            base_fee,
            net_total: base_fee,
            gross_total: base_fee,
            ..CalculationResult::zero(TariffPost::Disbursement, config)
        })
    }

    /// Court fee as its own line item.
    fn court_fee_only(&self, value: Money, config: &CalculationConfig) -> CalculationResult {
        let court_fee = self.court_fee(value, config);
        CalculationResult {
            court_fee,
            gross_total: court_fee,
            ..CalculationResult::zero(TariffPost::CourtFee, config)
        }
    }
}

/// Fee breakdown over the built-in 2025 tariff and default settings.
#[allow(clippy::too_many_arguments)]
pub fn calculate_fees(
    value: Money,
    post: TariffPost,
    gkg_column: Option<GkgColumn>,
    is_appeal: bool,
    multiplier: Decimal,
    has_unit_rate: bool,
    additional_parties: u32,
    is_foreign_client: bool,
    include_court_fee: bool,
) -> CalculationResult {
    let config = CalculationConfig {
        gkg_column,
        is_appeal,
        multiplier,
        has_unit_rate,
        additional_parties,
        is_foreign_client,
        include_court_fee,
    };
    FeeAggregator::standard().calculate(value, post, &config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surcharge::PartySurchargePolicy;
    use rust_decimal_macros::dec;

    fn m(d: Decimal) -> Money {
        Money(d)
    }

    fn with_unit_rate() -> CalculationConfig {
        CalculationConfig { has_unit_rate: true, ..Default::default() }
    }

    #[test]
    fn unit_rate_at_threshold() {
        let agg = FeeAggregator::default();
        let r = agg.calculate(m(dec!(15000)), TariffPost::Tp3a, &with_unit_rate());
        assert_eq!(r.base_fee, m(dec!(634)));
        assert_eq!(r.unit_rate_amount, m(dec!(317)));
        assert_eq!(r.net_total, m(dec!(951)));
        assert_eq!(r.vat_amount, m(dec!(77.03)));
        assert_eq!(r.gross_total, m(dec!(1028.03)));
    }

    #[test]
    fn unit_rate_above_threshold() {
        let agg = FeeAggregator::default();
        let r = agg.calculate(m(dec!(15001)), TariffPost::Tp3a, &with_unit_rate());
        assert_eq!(r.base_fee, m(dec!(713)));
        assert_eq!(r.unit_rate_amount, m(dec!(285.20)));
        assert_eq!(r.net_total, m(dec!(998.20)));
    }

    #[test]
    fn surcharge_on_rounded_subtotal() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig {
            has_unit_rate: true,
            additional_parties: 2,
            ..Default::default()
        };
        let r = agg.calculate(m(dec!(100000)), TariffPost::Tp3a, &config);
        assert_eq!(r.base_fee, m(dec!(1188)));
        assert_eq!(r.unit_rate_amount, m(dec!(475.20)));
        // (1188 + 475.20) * 0.15
        assert_eq!(r.surcharge_amount, m(dec!(249.48)));
        assert_eq!(r.net_total, m(dec!(1912.68)));
    }

    #[test]
    fn flat_policy_surcharge() {
        let agg = FeeAggregator::new(
            TariffCatalog::rev_2025(),
            GkgTable::rev_2025(),
            CalculatorSettings::default().with_party_surcharge(PartySurchargePolicy::flat()),
        );
        let config = CalculationConfig { additional_parties: 3, ..Default::default() };
        let r = agg.calculate(m(dec!(100000)), TariffPost::Tp3a, &config);
        assert_eq!(r.surcharge_amount, m(dec!(118.80)));
    }

    #[test]
    fn non_positive_value_yields_zero() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig {
            has_unit_rate: true,
            include_court_fee: true,
            gkg_column: Some(GkgColumn::Civil),
            ..Default::default()
        };
        for value in [dec!(0), dec!(-1), dec!(-1000000)] {
            for post in TariffPost::ALL {
                let r = agg.calculate(m(value), post, &config);
                assert!(r.is_zero(), "{post} at {value}: {r:?}");
                assert_eq!(r.base_fee, Money::zero());
            }
        }
    }

    #[test]
    fn foreign_client_pays_no_vat() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig {
            is_foreign_client: true,
            include_court_fee: true,
            gkg_column: Some(GkgColumn::Civil),
            ..Default::default()
        };
        let r = agg.calculate(m(dec!(20000)), TariffPost::Tp3a, &config);
        assert_eq!(r.vat_amount, Money::zero());
        assert_eq!(r.court_fee, m(dec!(850)));
        assert_eq!(r.gross_total, r.net_total + r.court_fee);
    }

    #[test]
    fn court_fee_is_outside_vat_and_surcharges() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig {
            include_court_fee: true,
            gkg_column: Some(GkgColumn::Civil),
            has_unit_rate: true,
            additional_parties: 1,
            ..Default::default()
        };
        let with_court = agg.calculate(m(dec!(20000)), TariffPost::Tp3a, &config);
        let without = agg.calculate(
            m(dec!(20000)),
            TariffPost::Tp3a,
            &CalculationConfig { include_court_fee: false, ..config.clone() },
        );
        assert_eq!(with_court.net_total, without.net_total);
        assert_eq!(with_court.vat_amount, without.vat_amount);
        assert_eq!(with_court.gross_total - without.gross_total, m(dec!(850)));
    }

    #[test]
    fn missing_column_means_no_court_fee() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig { include_court_fee: true, ..Default::default() };
        let r = agg.calculate(m(dec!(20000)), TariffPost::Tp3a, &config);
        assert_eq!(r.court_fee, Money::zero());
        let only = agg.calculate(m(dec!(20000)), TariffPost::CourtFee, &config);
        assert!(only.is_zero());
    }

    #[test]
    fn court_fee_pseudo_post() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig {
            gkg_column: Some(GkgColumn::Debt),
            is_appeal: true,
            has_unit_rate: true,
            ..Default::default()
        };
        let r = agg.calculate(m(dec!(10000)), TariffPost::CourtFee, &config);
        assert_eq!(r.court_fee, m(dec!(125)));
        assert_eq!(r.gross_total, m(dec!(125)));
        assert_eq!(r.base_fee, Money::zero());
        assert_eq!(r.unit_rate_amount, Money::zero());
        assert_eq!(r.vat_amount, Money::zero());
    }

    #[test]
    fn disbursement_bypasses_pipeline() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig {
            multiplier: dec!(3),
            has_unit_rate: true,
            additional_parties: 4,
            include_court_fee: true,
            gkg_column: Some(GkgColumn::Civil),
            ..Default::default()
        };
        let r = agg.calculate(m(dec!(12.35)), TariffPost::Disbursement, &config);
        assert_eq!(r.base_fee, m(dec!(37.05)));
        assert_eq!(r.net_total, m(dec!(37.05)));
        assert_eq!(r.gross_total, m(dec!(37.05)));
        assert_eq!(r.vat_amount, Money::zero());
        assert_eq!(r.court_fee, Money::zero());
    }

    #[test]
    fn multiplier_scales_base_fee() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig { multiplier: dec!(3), ..Default::default() };
        let r = agg.calculate(m(dec!(20000)), TariffPost::Tp8, &config);
        assert_eq!(r.base_fee, m(dec!(405)));
        assert!(r.config.is_time_based);
    }

    #[test]
    fn tp9_flat_per_hour() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig { multiplier: dec!(2.5), ..Default::default() };
        let r = agg.calculate(m(dec!(1)), TariffPost::Tp9, &config);
        assert_eq!(r.base_fee, m(dec!(187.50)));
    }

    #[test]
    fn session_uses_multiplier_as_hours() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig { multiplier: dec!(3), ..Default::default() };
        let r = agg.calculate(m(dec!(15000)), TariffPost::Tp3aSession, &config);
        // 634 + 2 * 317
        assert_eq!(r.base_fee, m(dec!(1268)));
    }

    #[test]
    fn negative_multiplier_yields_zero_base() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig { multiplier: dec!(-2), ..Default::default() };
        let r = agg.calculate(m(dec!(20000)), TariffPost::Tp3a, &config);
        assert_eq!(r.base_fee, Money::zero());
        assert_eq!(r.gross_total, Money::zero());
    }

    #[test]
    fn missing_definition_is_error_or_zero() {
        let catalog = TariffCatalog::new(
            "TP9 only",
            [(TariffPost::Tp9, TariffEntry::Flat { fee: m(dec!(75)) })],
        )
        .expect("test: small catalog");
        let agg = FeeAggregator::new(catalog, GkgTable::rev_2025(), CalculatorSettings::default());
        let config = CalculationConfig {
            include_court_fee: true,
            gkg_column: Some(GkgColumn::Civil),
            ..Default::default()
        };

        let err = agg.try_calculate(m(dec!(20000)), TariffPost::Tp3a, &config);
        assert_eq!(err, Err(FeeError::MissingDefinition(TariffPost::Tp3a)));

        let r = agg.calculate(m(dec!(20000)), TariffPost::Tp3a, &config);
        assert_eq!(r.base_fee, Money::zero());
        assert_eq!(r.court_fee, m(dec!(850)));
        assert_eq!(r.gross_total, m(dec!(850)));
    }

    #[test]
    fn huge_multiplier_yields_zero_result() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig {
            multiplier: Decimal::MAX,
            include_court_fee: true,
            gkg_column: Some(GkgColumn::Civil),
            ..Default::default()
        };
        for post in [TariffPost::Tp3a, TariffPost::Tp5, TariffPost::Tp6, TariffPost::Tp9, TariffPost::Tp3aSession] {
            assert_eq!(
                agg.try_calculate(m(dec!(1)), post, &config),
                Err(FeeError::Overflow(post))
            );
            let r = agg.calculate(m(dec!(1)), post, &config);
            assert!(r.is_zero(), "{post}: {r:?}");
            assert_eq!(r.config.post, post);
        }
    }

    #[test]
    fn disbursement_overflow_yields_zero_result() {
        let agg = FeeAggregator::default();
        let config = CalculationConfig { multiplier: dec!(10000000000), ..Default::default() };
        let value = m(dec!(100000000000000000000));
        assert_eq!(
            agg.try_calculate(value, TariffPost::Disbursement, &config),
            Err(FeeError::Overflow(TariffPost::Disbursement))
        );
        assert!(agg.calculate(value, TariffPost::Disbursement, &config).is_zero());
    }

    #[test]
    fn overflow_in_totals_yields_zero_result() {
        // 75 * 1e27 still fits, adding VAT does not
        let agg = FeeAggregator::default();
        let config = CalculationConfig { multiplier: dec!(1000000000000000000000000000), ..Default::default() };
        assert_eq!(
            agg.try_calculate(m(dec!(1)), TariffPost::Tp9, &config),
            Err(FeeError::Overflow(TariffPost::Tp9))
        );
        assert!(agg.calculate(m(dec!(1)), TariffPost::Tp9, &config).is_zero());
    }

    #[test]
    fn free_function_matches_standard_aggregator() {
        let r = calculate_fees(
            m(dec!(15001)),
            TariffPost::Tp3a,
            Some(GkgColumn::Civil),
            false,
            Decimal::ONE,
            true,
            0,
            false,
            true,
        );
        assert_eq!(r.net_total, m(dec!(998.20)));
        assert_eq!(r.court_fee, m(dec!(850)));
        assert_eq!(r.config.gkg_column, Some(GkgColumn::Civil));
    }
}
