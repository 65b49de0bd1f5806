//! Fixed-point money helpers.
//!
//! Amounts are `rust_decimal::Decimal` values with two fractional digits.
//! Every figure that is persisted or printed passes through [`to_money`].

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits carried by every amount.
pub const MONEY_SCALE: u32 = 2;

/// Round to two decimals (half away from zero) and fix the scale at two.
pub fn to_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// `unit_price × quantity`, as money.
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    to_money(unit_price * Decimal::from(quantity))
}

/// Sum of amounts, as money. An empty input is `0.00`.
pub fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    to_money(amounts.into_iter().fold(Decimal::ZERO, |acc, amount| acc + amount))
}

/// Human-readable amount, e.g. `62.40 DKK`.
pub fn format_money(amount: Decimal, currency: &str) -> String {
    format!("{} {}", to_money(amount), currency)
}
