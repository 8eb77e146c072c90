//! Prices and Brazilian Real display formatting.
//!
//! Amounts travel as [`Decimal`] so cart and order totals never pick up
//! binary floating point drift. Formatting follows the `pt-BR` locale:
//! `R$`, a non-breaking space, `.` between thousands and `,` before the
//! centavos.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Separator the `pt-BR` locale places between the symbol and the amount.
const NBSP: char = '\u{a0}';

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Brazilian reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BRL)
    }

    /// Create a price from an integer amount of centavos.
    #[must_use]
    pub fn from_centavos(centavos: i64) -> Self {
        Self::brl(Decimal::new(centavos, 2))
    }

    /// Format for display (e.g., `R$ 1.234,56`).
    #[must_use]
    pub fn display(&self) -> String {
        match self.currency_code {
            CurrencyCode::BRL => format_currency(self.amount),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes the store transacts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Brazilian Real.
    #[default]
    BRL,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BRL => "BRL",
        }
    }
}

/// Format an amount as Brazilian Real display text.
///
/// Rounds half away from zero to two decimal places. Display only: never
/// feed the output back into arithmetic.
///
/// ```
/// use autopecas_core::format_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_currency(Decimal::new(123_456, 2)), "R$\u{a0}1.234,56");
/// ```
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!(
        "{sign}{}{NBSP}{},{cents}",
        CurrencyCode::BRL.symbol(),
        group_thousands(whole)
    )
}

/// Insert `.` between groups of three digits, counting from the right.
fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
