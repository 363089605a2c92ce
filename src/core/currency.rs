use crate::domain::ports::MoneyFormatter;
use crate::utils::error::{QuoterError, Result};

pub const DEFAULT_LOCALE: &str = "es-AR";

/// Fixed-point currency rendering with two fraction digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub symbol_separator: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl CurrencyFormat {
    /// Argentine pesos as rendered by the es-AR locale: `$ 24.502,55`.
    pub fn es_ar() -> Self {
        Self {
            symbol: "$".to_string(),
            symbol_separator: "\u{a0}".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }

    /// `$24,502.55`
    pub fn en_us() -> Self {
        Self {
            symbol: "$".to_string(),
            symbol_separator: String::new(),
            thousands_separator: ',',
            decimal_separator: '.',
        }
    }

    pub fn for_locale(locale: &str) -> Result<Self> {
        match locale.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "es-ar" => Ok(Self::es_ar()),
            "en-us" => Ok(Self::en_us()),
            _ => Err(QuoterError::InvalidConfigValueError {
                field: "display.locale".to_string(),
                value: locale.to_string(),
                reason: "Supported locales: es-AR, en-US".to_string(),
            }),
        }
    }

    fn group_thousands(&self, digits: &str) -> String {
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(ch);
        }
        grouped
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::es_ar()
    }
}

impl MoneyFormatter for CurrencyFormat {
    fn format(&self, amount: f64) -> String {
        if !amount.is_finite() {
            let (sign, digits) = match amount {
                a if a.is_nan() => ("", "NaN"),
                a if a < 0.0 => ("-", "∞"),
                _ => ("", "∞"),
            };
            return format!("{}{}{}{}", sign, self.symbol, self.symbol_separator, digits);
        }

        let cents = (amount.abs() * 100.0).round() as u64;
        let units = self.group_thousands(&(cents / 100).to_string());
        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

        format!(
            "{}{}{}{}{}{:02}",
            sign,
            self.symbol,
            self.symbol_separator,
            units,
            self.decimal_separator,
            cents % 100
        )
    }
}
