// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Calculator settings -- rates and policies that vary by legal revision.
//!
//! Everything here has a `Default` matching the law in force; a JSON file may
//! override any subset of fields.

use crate::gkg::CourtFeePolicy;
use crate::surcharge::{PartySurchargePolicy, UnitRateSchedule};
use crate::types::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Errors from loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate out of range: {name} = {value}")]
    RateOutOfRange { name: &'static str, value: Decimal },

    #[error("negative court-fee factor: {name} = {value}")]
    NegativeFactor { name: &'static str, value: Decimal },

    #[error("appeal tier {index} does not ascend")]
    UnsortedAppealTiers { index: usize },
}

fn check_rate(name: &'static str, value: Decimal) -> Result<(), SettingsError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(SettingsError::RateOutOfRange { name, value });
    }
    Ok(())
}

/// Rates and policies applied after the base fee is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// VAT on the attorney net total (8.1%).
    pub vat_rate: Decimal,
    /// Unit-rate band.
    pub unit_rate: UnitRateSchedule,
    /// Party surcharge policy.
    pub party_surcharge: PartySurchargePolicy,
    /// Share of the single-hour fee for each further session hour.
    pub session_follow_up_rate: Decimal,
    /// Court-fee appeal multipliers.
    pub court_fee: CourtFeePolicy,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            vat_rate: dec!(0.081),
            unit_rate: UnitRateSchedule::default(),
            party_surcharge: PartySurchargePolicy::default(),
            session_follow_up_rate: dec!(0.5),
            court_fee: CourtFeePolicy::default(),
        }
    }
}

impl CalculatorSettings {
    /// Parse settings; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Same settings with another party-surcharge policy.
    pub fn with_party_surcharge(self, party_surcharge: PartySurchargePolicy) -> Self {
        Self { party_surcharge, ..self }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        check_rate("vat_rate", self.vat_rate)?;
        check_rate("unit_rate.lower_rate", self.unit_rate.lower_rate)?;
        check_rate("unit_rate.upper_rate", self.unit_rate.upper_rate)?;
        check_rate("session_follow_up_rate", self.session_follow_up_rate)?;

        match &self.party_surcharge {
            PartySurchargePolicy::Flat { rate } => check_rate("party_surcharge.rate", *rate)?,
            PartySurchargePolicy::Graduated { base_rate, step_rate, max_rate } => {
                check_rate("party_surcharge.base_rate", *base_rate)?;
                check_rate("party_surcharge.step_rate", *step_rate)?;
                check_rate("party_surcharge.max_rate", *max_rate)?;
            }
        }

        let policy = &self.court_fee;
        if policy.flat_factor < Decimal::ZERO {
            return Err(SettingsError::NegativeFactor { name: "court_fee.flat_factor", value: policy.flat_factor });
        }
        if let Some(tier) = policy.tiers.iter().find(|t| t.factor < Decimal::ZERO) {
            return Err(SettingsError::NegativeFactor { name: "court_fee.tiers.factor", value: tier.factor });
        }
        // bounded tiers strictly ascending, an open-ended tier only last
        let mut previous: Option<Money> = None;
        for (index, tier) in policy.tiers.iter().enumerate() {
            if index > 0 && previous.is_none() {
                return Err(SettingsError::UnsortedAppealTiers { index });
            }
            if let (Some(prev), Some(up_to)) = (previous, tier.up_to) {
                if up_to <= prev {
                    return Err(SettingsError::UnsortedAppealTiers { index });
                }
            }
            previous = tier.up_to;
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = CalculatorSettings::default();
        assert_eq!(settings.vat_rate, dec!(0.081));
        assert_eq!(settings.session_follow_up_rate, dec!(0.5));
        assert_eq!(settings.party_surcharge, PartySurchargePolicy::graduated());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = CalculatorSettings::from_json(r#"{ "vat_rate": "0.077" }"#)
            .expect("test: partial settings should parse");
        assert_eq!(settings.vat_rate, dec!(0.077));
        assert_eq!(settings.unit_rate, UnitRateSchedule::default());
        assert_eq!(settings.court_fee, CourtFeePolicy::default());
    }

    #[test]
    fn flat_policy_from_json() {
        let settings = CalculatorSettings::from_json(
            r#"{ "party_surcharge": { "policy": "flat", "rate": "0.10" } }"#,
        )
        .expect("test: flat policy should parse");
        assert_eq!(settings.party_surcharge, PartySurchargePolicy::flat());
    }

    #[test]
    fn out_of_range_rate_rejected() {
        let err = CalculatorSettings::from_json(r#"{ "vat_rate": "8.1" }"#);
        assert!(
            matches!(err, Err(SettingsError::RateOutOfRange { name: "vat_rate", .. })),
            "expected RateOutOfRange, got {err:?}"
        );
    }

    #[test]
    fn negative_flat_surcharge_rejected() {
        let err = CalculatorSettings::from_json(
            r#"{ "party_surcharge": { "policy": "flat", "rate": "-0.5" } }"#,
        );
        assert!(
            matches!(err, Err(SettingsError::RateOutOfRange { name: "party_surcharge.rate", .. })),
            "got {err:?}"
        );
    }

    #[test]
    fn graduated_rates_checked() {
        let cases = [
            (r#""base_rate": "-0.1", "step_rate": "0.05", "max_rate": "0.5""#, "party_surcharge.base_rate"),
            (r#""base_rate": "0.1", "step_rate": "-0.05", "max_rate": "0.5""#, "party_surcharge.step_rate"),
            (r#""base_rate": "0.1", "step_rate": "0.05", "max_rate": "1.5""#, "party_surcharge.max_rate"),
        ];
        for (rates, field) in cases {
            let json = format!(r#"{{ "party_surcharge": {{ "policy": "graduated", {rates} }} }}"#);
            let err = CalculatorSettings::from_json(&json);
            assert!(
                matches!(err, Err(SettingsError::RateOutOfRange { name, .. }) if name == field),
                "{field}: got {err:?}"
            );
        }
    }

    #[test]
    fn negative_court_fee_factors_rejected() {
        let flat = CalculatorSettings::from_json(
            r#"{ "court_fee": { "tiered_columns": [], "tiers": [], "flat_factor": "-2" } }"#,
        );
        assert!(
            matches!(flat, Err(SettingsError::NegativeFactor { name: "court_fee.flat_factor", .. })),
            "got {flat:?}"
        );

        let tier = CalculatorSettings::from_json(
            r#"{ "court_fee": { "tiered_columns": ["debt"],
                 "tiers": [{ "up_to": null, "factor": "-1" }], "flat_factor": "2" } }"#,
        );
        assert!(
            matches!(tier, Err(SettingsError::NegativeFactor { name: "court_fee.tiers.factor", .. })),
            "got {tier:?}"
        );
    }

    #[test]
    fn appeal_tiers_must_ascend() {
        let descending = CalculatorSettings::from_json(
            r#"{ "court_fee": { "tiered_columns": ["debt"], "flat_factor": "2", "tiers": [
                 { "up_to": "50000", "factor": "2.5" },
                 { "up_to": "5000", "factor": "1" },
                 { "up_to": null, "factor": "6" } ] } }"#,
        );
        assert!(
            matches!(descending, Err(SettingsError::UnsortedAppealTiers { index: 1 })),
            "got {descending:?}"
        );

        let open_ended_first = CalculatorSettings::from_json(
            r#"{ "court_fee": { "tiered_columns": ["debt"], "flat_factor": "2", "tiers": [
                 { "up_to": null, "factor": "6" },
                 { "up_to": "5000", "factor": "1" } ] } }"#,
        );
        assert!(
            matches!(open_ended_first, Err(SettingsError::UnsortedAppealTiers { index: 1 })),
            "got {open_ended_first:?}"
        );
    }

    #[test]
    fn default_court_fee_policy_validates() {
        let json = serde_json::to_string(&CalculatorSettings::default()).expect("test: serialize");
        let settings = CalculatorSettings::from_json(&json).expect("test: defaults round-trip");
        assert_eq!(settings, CalculatorSettings::default());
    }

    #[test]
    fn with_party_surcharge_replaces_policy_only() {
        let settings = CalculatorSettings::default().with_party_surcharge(PartySurchargePolicy::flat());
        assert_eq!(settings.party_surcharge, PartySurchargePolicy::flat());
        assert_eq!(settings.vat_rate, dec!(0.081));
    }
}
