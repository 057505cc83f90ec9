// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Statutory attorney fee engine (RATG/RATV tariff, GGG court fees)

pub mod types;
pub mod tariff;
pub mod resolver;
pub mod surcharge;
pub mod gkg;
pub mod settings;
pub mod aggregator;
pub mod ledger;
pub mod adapter;

pub use aggregator::{
    calculate_fees, CalculationConfig, CalculationResult, ConfigEcho, FeeAggregator, FeeError,
};
pub use gkg::{CourtFeePolicy, CourtFeeResolver, GkgTable};
pub use ledger::{AccountingError, CostStatement, Position, StatementTotals};
pub use settings::{CalculatorSettings, SettingsError};
pub use surcharge::{PartySurchargePolicy, UnitRateSchedule};
pub use tariff::{CatalogError, TariffCatalog, TariffDefinition, TariffEntry};
pub use types::{FeeStep, GkgColumn, GkgRow, Money, ParseError, TariffPost};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Install the panic hook. Call once after loading the module.
#[wasm_bindgen]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
}

/// Itemized fee breakdown for the browser UI.
///
/// An unknown post yields an all-zero breakdown; an unknown column means no
/// court fee.
#[wasm_bindgen(js_name = calculateFees)]
#[allow(clippy::too_many_arguments)]
pub fn calculate_fees_js(
    value: f64,
    post: &str,
    gkg_column: Option<String>,
    is_appeal: bool,
    multiplier: f64,
    has_unit_rate: bool,
    additional_parties: u32,
    is_foreign: bool,
    include_court_fee: bool,
) -> JsValue {
    let view = breakdown_view(
        value,
        post,
        gkg_column.as_deref(),
        is_appeal,
        multiplier,
        has_unit_rate,
        additional_parties,
        is_foreign,
        include_court_fee,
    );
    serde_wasm_bindgen::to_value(&view).unwrap_or(JsValue::NULL)
}

#[allow(clippy::too_many_arguments)]
fn breakdown_view(
    value: f64,
    post: &str,
    gkg_column: Option<&str>,
    is_appeal: bool,
    multiplier: f64,
    has_unit_rate: bool,
    additional_parties: u32,
    is_foreign: bool,
    include_court_fee: bool,
) -> adapter::FeeBreakdownView {
    let column = gkg_column.and_then(|c| c.parse::<GkgColumn>().ok());
    let config = CalculationConfig {
        gkg_column: column,
        is_appeal,
        multiplier: adapter::to_decimal(multiplier),
        has_unit_rate,
        additional_parties,
        is_foreign_client: is_foreign,
        include_court_fee,
    };
    match post.parse::<TariffPost>() {
        Ok(post) => {
            let result = FeeAggregator::standard().calculate(adapter::to_money(value), post, &config);
            adapter::FeeBreakdownView::from(&result)
        }
        Err(err) => {
            log::warn!("{err}; returning zero breakdown");
            let mut view = adapter::FeeBreakdownView::from(&CalculationResult::zero(TariffPost::Disbursement, &config));
            view.config.post = None;
            view.config.is_time_based = false;
            view
        }
    }
}

/// Selectable tariff posts with labels.
#[wasm_bindgen(js_name = tariffPosts)]
pub fn tariff_posts() -> JsValue {
    serde_wasm_bindgen::to_value(&adapter::post_infos()).unwrap_or(JsValue::NULL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_post_breakdown() {
        let view = breakdown_view(15001.0, "TP3A", Some("civil"), false, 1.0, true, 0, false, true);
        assert_eq!(view.base_fee, 713.0);
        assert_eq!(view.net_total, 998.2);
        assert_eq!(view.court_fee, 850.0);
        assert_eq!(view.config.post, Some(TariffPost::Tp3a));
        assert_eq!(view.config.gkg_column, Some(GkgColumn::Civil));
    }

    #[test]
    fn unknown_post_gives_zero_breakdown_without_post() {
        let view = breakdown_view(15000.0, "TP4", Some("civil"), false, 1.0, true, 2, false, true);
        assert_eq!(view.gross_total, 0.0);
        assert_eq!(view.court_fee, 0.0);
        assert_eq!(view.config.post, None);
        assert!(!view.config.is_time_based);
    }

    #[test]
    fn unknown_column_means_no_court_fee() {
        let view = breakdown_view(20000.0, "TP3A", Some("tax"), false, 1.0, false, 0, false, true);
        assert_eq!(view.court_fee, 0.0);
        assert_eq!(view.config.gkg_column, None);
        assert!(view.net_total > 0.0);
    }

    #[test]
    fn huge_multiplier_gives_zero_breakdown() {
        let view = breakdown_view(1.0, "TP3A", None, false, 1e28, false, 0, false, false);
        assert_eq!(view.gross_total, 0.0);
        assert_eq!(view.config.post, Some(TariffPost::Tp3a));
    }
}
