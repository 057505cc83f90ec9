//! Adapter layer: converts between the f64 world of JS callers and the engine's Decimal types.

use crate::aggregator::CalculationResult;
use crate::types::{GkgColumn, Money, TariffPost};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;

/// Convert f64 to Decimal; NaN and infinities become zero.
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

pub fn to_money(v: f64) -> Money {
    Money(to_decimal(v))
}

pub fn from_money(m: Money) -> f64 {
    from_decimal(m.0)
}

/// Breakdown with plain numbers, as the browser UI consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdownView {
    pub base_fee: f64,
    pub unit_rate_amount: f64,
    pub surcharge_amount: f64,
    pub court_fee: f64,
    pub net_total: f64,
    pub vat_amount: f64,
    pub gross_total: f64,
    pub config: ConfigView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    /// `None` when the caller's post string was not recognized.
    pub post: Option<TariffPost>,
    pub gkg_column: Option<GkgColumn>,
    pub multiplier: f64,
    pub has_unit_rate: bool,
    pub additional_parties: u32,
    pub is_foreign: bool,
    pub is_appeal: bool,
    pub include_court_fee: bool,
    pub is_time_based: bool,
}

impl From<&CalculationResult> for FeeBreakdownView {
    fn from(r: &CalculationResult) -> Self {
        Self {
            base_fee: from_money(r.base_fee),
            unit_rate_amount: from_money(r.unit_rate_amount),
            surcharge_amount: from_money(r.surcharge_amount),
            court_fee: from_money(r.court_fee),
            net_total: from_money(r.net_total),
            vat_amount: from_money(r.vat_amount),
            gross_total: from_money(r.gross_total),
            config: ConfigView {
                post: Some(r.config.post),
                gkg_column: r.config.gkg_column,
                multiplier: from_decimal(r.config.multiplier),
                has_unit_rate: r.config.has_unit_rate,
                additional_parties: r.config.additional_parties,
                is_foreign: r.config.is_foreign_client,
                is_appeal: r.config.is_appeal,
                include_court_fee: r.config.include_court_fee,
                is_time_based: r.config.is_time_based,
            },
        }
    }
}

/// Entry for the post picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    pub id: TariffPost,
    pub label: &'static str,
    pub is_time_based: bool,
}

/// All selectable posts, pseudo-posts included.
pub fn post_infos() -> Vec<PostInfo> {
    TariffPost::ALL
        .iter()
        .map(|post| PostInfo {
            id: *post,
            label: post.label(),
            is_time_based: post.is_time_based(),
        })
        .collect()
}
