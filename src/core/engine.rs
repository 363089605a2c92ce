use crate::domain::model::{AgeBracket, PricingTable, QuoteError, QuoteInput, QuoteOutcome, QuoteResult};
use crate::domain::ports::MoneyFormatter;
use regex::Regex;
use std::sync::OnceLock;

/// Payroll factors applied to the raw contribution.
pub const CONTRIBUTION_FACTOR: f64 = 33.33;
pub const CONTRIBUTION_RATE: f64 = 7.65;

pub const FULLY_COVERED_MESSAGE: &str = "INGRESA SOLO CON APORTES";

fn leading_float() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid float pattern")
    })
}

fn leading_int() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?)([0-9]+)").expect("valid integer pattern"))
}

/// Leading decimal number of `text`, ignoring anything after it.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let matched = leading_float().find(text)?;
    matched.as_str().trim().parse::<f64>().ok()
}

/// Leading ASCII integer of `text`; `"35.9"` reads as 35. Oversized values saturate.
pub fn parse_age(text: &str) -> Option<i64> {
    let caps = leading_int().captures(text)?;
    let negative = &caps[1] == "-";
    let digits = &caps[2];
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Contribution total derived from the raw payroll figure.
/// Unparsable or non-positive input yields 0.
pub fn contribution_total(raw_contribution: &str) -> f64 {
    match parse_leading_number(raw_contribution) {
        Some(value) if value > 0.0 => value * CONTRIBUTION_FACTOR * CONTRIBUTION_RATE / 100.0,
        _ => 0.0,
    }
}

pub fn classify_age(age: i64) -> Option<AgeBracket> {
    AgeBracket::ALL
        .iter()
        .copied()
        .find(|bracket| bracket.contains(age))
}

fn settle(price: f64, total: f64) -> QuoteOutcome {
    if total >= price {
        QuoteOutcome::FullyCovered
    } else {
        QuoteOutcome::AmountToPay(price - total)
    }
}

/// Quote for `input` against `table`. Pure: no state is read besides the arguments.
pub fn compute_quote(input: &QuoteInput, table: &PricingTable) -> QuoteResult {
    let age = match parse_age(&input.raw_age) {
        Some(age) if age > 0 => age,
        _ => return Err(QuoteError::InvalidAge),
    };

    let total = contribution_total(&input.raw_contribution);

    // 依提撥計價的方案不分年齡，沒有價格時視為 0
    if input.plan.is_by_contribution() {
        let price = table.by_contribution_price().unwrap_or(0.0);
        return Ok(settle(price, total));
    }

    let bracket = classify_age(age).ok_or(QuoteError::AgeOutOfRange)?;
    let price = table
        .price(input.plan, bracket)
        .ok_or(QuoteError::PriceNotFound)?;

    Ok(settle(price, total))
}

/// Text shown in the result card.
pub fn result_message(result: &QuoteResult, formatter: &dyn MoneyFormatter) -> String {
    match result {
        Ok(QuoteOutcome::FullyCovered) => FULLY_COVERED_MESSAGE.to_string(),
        Ok(QuoteOutcome::AmountToPay(amount)) => {
            format!("A ABONAR: {}", formatter.format(*amount))
        }
        Err(err) => err.to_string(),
    }
}
