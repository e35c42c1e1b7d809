use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Currencies the app knows symbols and built-in exchange rates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Cny,
    Usd,
    Gbp,
    Jpy,
    Eur,
    Hkd,
}

impl Currency {
    pub const ALL: [Currency; 6] = [
        Currency::Cny,
        Currency::Usd,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Eur,
        Currency::Hkd,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Cny => "CNY",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Eur => "EUR",
            Currency::Hkd => "HKD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Cny | Currency::Jpy => "¥",
            Currency::Usd => "$",
            Currency::Gbp => "£",
            Currency::Eur => "€",
            Currency::Hkd => "HK$",
        }
    }

    /// Currencies displayed without a fractional part.
    pub fn is_zero_decimal(&self) -> bool {
        matches!(self, Currency::Jpy)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Cny
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(CoreError::UnknownCurrency(s.to_string()))
    }
}

/// Zero-decimal check for raw codes, including ones outside [`Currency`].
pub fn is_zero_decimal_code(code: &str) -> bool {
    code.parse::<Currency>()
        .map(|c| c.is_zero_decimal())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" HKD ".parse::<Currency>().unwrap(), Currency::Hkd);
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(CoreError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn symbols_match_codes() {
        assert_eq!(Currency::Cny.symbol(), "¥");
        assert_eq!(Currency::Jpy.symbol(), "¥");
        assert_eq!(Currency::Hkd.symbol(), "HK$");
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }

    #[test]
    fn only_yen_is_zero_decimal() {
        let zero: Vec<_> = Currency::ALL
            .into_iter()
            .filter(|c| c.is_zero_decimal())
            .collect();
        assert_eq!(zero, vec![Currency::Jpy]);
        assert!(is_zero_decimal_code("jpy"));
        assert!(!is_zero_decimal_code("BTC"));
    }

    #[test]
    fn serializes_as_uppercase_code() {
        assert_eq!(serde_json::to_string(&Currency::Gbp).unwrap(), "\"GBP\"");
        let parsed: Currency = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(parsed, Currency::Eur);
    }
}
