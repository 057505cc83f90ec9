// Plain-text rendering of a fee breakdown

use ratg_engine::{CalculationResult, FeeAggregator, Money, TariffPost};
use rust_decimal::Decimal;
use std::fmt::Write;

const WIDTH: usize = 44;

fn line(out: &mut String, label: &str, amount: Money) {
    let _ = writeln!(out, "  {:<28} {:>12}", label, amount.to_string());
}

/// Itemized table; zero surcharge and court-fee lines are left out.
pub fn render(value: Money, r: &CalculationResult, aggregator: &FeeAggregator) -> String {
    let mut out = String::new();
    let c = &r.config;

    let _ = writeln!(out, "\n  {} -- Streitwert CHF {}", c.post.label(), value);
    let _ = writeln!(out, "  Tarif: {}", aggregator.catalog().name());
    if c.is_time_based || c.multiplier != Decimal::ONE {
        let _ = writeln!(out, "  Multiplikator: {}", c.multiplier.normalize());
    }
    let _ = writeln!(out, "  {}", "-".repeat(WIDTH));

    line(&mut out, "Grundgebühr", r.base_fee);
    if !r.unit_rate_amount.is_zero() {
        line(&mut out, "Einheitssatz", r.unit_rate_amount);
    }
    if !r.surcharge_amount.is_zero() {
        let label = format!("Streitgenossenzuschlag ({})", c.additional_parties);
        line(&mut out, &label, r.surcharge_amount);
    }
    line(&mut out, "Netto", r.net_total);
    let vat_label = if c.is_foreign_client {
        "MwSt (Ausland, befreit)".to_string()
    } else {
        format!("MwSt {}%", (aggregator.settings().vat_rate * Decimal::ONE_HUNDRED).normalize())
    };
    line(&mut out, &vat_label, r.vat_amount);
    if !r.court_fee.is_zero() {
        let label = match c.gkg_column {
            Some(column) if c.is_appeal => format!("GGG {} (Rechtsmittel)", column.label()),
            Some(column) => format!("GGG {}", column.label()),
            None => "GGG".to_string(),
        };
        line(&mut out, &label, r.court_fee);
    }
    let _ = writeln!(out, "  {}", "=".repeat(WIDTH));
    line(&mut out, "Total CHF", r.gross_total);
    out.push('\n');
    out
}

/// Posts defined by the loaded catalog, one per line.
pub fn render_posts(aggregator: &FeeAggregator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", aggregator.catalog().name());
    for post in aggregator.catalog().posts() {
        let hint = if post.is_time_based() { " (je Einheit)" } else { "" };
        let _ = writeln!(out, "  {:<14} {}{}", post.as_str(), post.label(), hint);
    }
    for post in [TariffPost::CourtFee, TariffPost::Disbursement] {
        let _ = writeln!(out, "  {:<14} {}", post.as_str(), post.label());
    }
    out
}
