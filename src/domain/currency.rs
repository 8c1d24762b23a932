use crate::error::PaymentError;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;

/// An ISO 4217 currency, validated against the built-in registry.
///
/// Instances can only be obtained from the registry, so the symbol always
/// agrees with the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct Currency {
    code: &'static str,
    symbol: &'static str,
}

const fn entry(code: &'static str, symbol: &'static str) -> Currency {
    Currency { code, symbol }
}

static REGISTRY: &[Currency] = &[
    entry("AED", "د.إ"),
    entry("AUD", "A$"),
    entry("BRL", "R$"),
    entry("CAD", "CA$"),
    entry("CHF", "CHF"),
    entry("CNY", "CN¥"),
    entry("CZK", "Kč"),
    entry("DKK", "kr"),
    entry("EUR", "€"),
    entry("GBP", "£"),
    entry("HKD", "HK$"),
    entry("HUF", "Ft"),
    entry("IDR", "Rp"),
    entry("ILS", "₪"),
    entry("INR", "₹"),
    entry("JPY", "¥"),
    entry("KRW", "₩"),
    entry("MXN", "MX$"),
    entry("NOK", "kr"),
    entry("NZD", "NZ$"),
    entry("PHP", "₱"),
    entry("PLN", "zł"),
    entry("SAR", "SAR"),
    entry("SEK", "kr"),
    entry("SGD", "S$"),
    entry("THB", "฿"),
    entry("TRY", "₺"),
    entry("TWD", "NT$"),
    entry("USD", "$"),
    entry("ZAR", "R"),
];

impl Currency {
    pub const EUR: Self = entry("EUR", "€");
    pub const GBP: Self = entry("GBP", "£");
    pub const INR: Self = entry("INR", "₹");
    pub const JPY: Self = entry("JPY", "¥");
    pub const USD: Self = entry("USD", "$");

    /// Currency carried by [`Money::ZERO`](crate::domain::money::Money::ZERO).
    pub const DEFAULT: Self = Self::USD;

    /// Looks up a code in the registry. Input is case-insensitive.
    pub fn from_code(code: &str) -> Result<Self, PaymentError> {
        let wanted = code.trim();
        REGISTRY
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| PaymentError::UnknownCurrency(code.to_string()))
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_code(&code).map_err(de::Error::custom)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code.to_string()
    }
}
