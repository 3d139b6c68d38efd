//! Plain-text rendering of brokerage data for chat replies.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::domain::{Funds, Position};

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "EUR" => Some("€"),
        "USD" => Some("$"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// `€1,234.50` style amount with two decimals and thousands separators.
pub fn money(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{grouped}.{frac}"),
        None => format!("{sign}{grouped}.{frac} {currency}"),
    }
}

/// Multi-line portfolio summary.
pub fn portfolio(positions: &[Position], currency: &str) -> String {
    if positions.is_empty() {
        return "Your portfolio is empty.".to_string();
    }
    let mut out = String::from("Portfolio:\n");
    let mut total = Decimal::ZERO;
    for p in positions {
        total += p.total_value;
        let _ = writeln!(
            out,
            "{} ({}): {} @ {} = {}",
            p.symbol,
            p.name,
            p.quantity.normalize(),
            money(p.price, currency),
            money(p.total_value, currency)
        );
    }
    let _ = write!(out, "Total: {}", money(total, currency));
    out
}

/// Two-line cash summary.
pub fn funds(funds: &Funds) -> String {
    format!(
        "Available: {}\nTotal: {}",
        money(funds.available, &funds.currency),
        money(funds.total, &funds.currency)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(dec!(12503.75), "EUR"), "€12,503.75");
        assert_eq!(money(dec!(5000), "USD"), "$5,000.00");
        assert_eq!(money(dec!(150.25), "GBP"), "£150.25");
    }

    #[test]
    fn unknown_currency_is_suffixed() {
        assert_eq!(money(dec!(99.9), "CHF"), "99.90 CHF");
    }

    #[test]
    fn negative_amounts_keep_sign() {
        assert_eq!(money(dec!(-1234.56), "EUR"), "-€1,234.56");
    }

    #[test]
    fn portfolio_lists_positions_and_total() {
        let positions = vec![
            Position {
                product_id: "1".into(),
                symbol: "AAPL".into(),
                name: "Apple Inc.".into(),
                quantity: dec!(10),
                price: dec!(150.25),
                total_value: dec!(1502.50),
            },
            Position {
                product_id: "2".into(),
                symbol: "GOOGL".into(),
                name: "Alphabet Inc.".into(),
                quantity: dec!(5),
                price: dec!(2500.75),
                total_value: dec!(12503.75),
            },
        ];
        let text = portfolio(&positions, "EUR");
        assert!(text.contains("AAPL (Apple Inc.): 10 @ €150.25 = €1,502.50"));
        assert!(text.ends_with("Total: €14,006.25"));
    }

    #[test]
    fn empty_portfolio_has_message() {
        assert_eq!(portfolio(&[], "EUR"), "Your portfolio is empty.");
    }
}
