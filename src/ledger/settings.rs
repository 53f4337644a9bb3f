use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// User preferences, stored as a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub personal_details: PersonalDetails,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            currency: Currency::Usd,
            personal_details: PersonalDetails::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Default for PersonalDetails {
    fn default() -> Self {
        Self {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john.doe@example.com".into(),
        }
    }
}

impl PersonalDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

/// Currencies the display layer knows how to format. No conversion happens
/// between them; switching only changes presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cad,
    Aud,
}

impl Currency {
    pub const SUPPORTED: [Currency; 6] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Cad,
        Currency::Aud,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
        }
    }

    pub fn minor_digits(self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|currency| currency.code().eq_ignore_ascii_case(code))
    }

    /// Renders `amount` as `-$1,234.50` style text.
    pub fn format(self, amount: Decimal) -> String {
        let rounded =
            amount.round_dp_with_strategy(self.minor_digits(), RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let mut digits = rounded.abs();
        digits.rescale(self.minor_digits());
        let text = digits.to_string();
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (text.as_str(), None),
        };
        let mut formatted = format!("{sign}{}{}", self.symbol(), group_thousands(whole));
        if let Some(fraction) = fraction {
            formatted.push('.');
            formatted.push_str(fraction);
        }
        formatted
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Partial settings update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub currency: Option<Currency>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl SettingsPatch {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(currency) = self.currency {
            settings.currency = currency;
        }
        let details = &mut settings.personal_details;
        if let Some(first_name) = &self.first_name {
            details.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            details.last_name = last_name.clone();
        }
        if let Some(email) = &self.email {
            details.email = email.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run_values() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.currency, Currency::Usd);
        assert_eq!(settings.personal_details.full_name(), "John Doe");
        assert_eq!(settings.personal_details.email, "john.doe@example.com");
    }

    #[test]
    fn formats_money_per_currency() {
        assert_eq!(Currency::Usd.format(Decimal::new(123450, 2)), "$1,234.50");
        assert_eq!(Currency::Eur.format(Decimal::new(-5, 0)), "-€5.00");
        assert_eq!(Currency::Jpy.format(Decimal::new(1999, 1)), "¥200");
        assert_eq!(Currency::Usd.format(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn parses_supported_codes_only() {
        assert_eq!(Currency::parse("gbp"), Some(Currency::Gbp));
        assert_eq!(Currency::parse("CHF"), None);
    }

    #[test]
    fn serializes_currency_as_iso_code() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["theme"], "light");
        assert_eq!(json["personalDetails"]["firstName"], "John");
    }
}
