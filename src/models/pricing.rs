//! Markup pricing over the supplier's wholesale catalog.
//!
//! Resale price = ceil_to_baht(cost + markup), where markup is either a
//! fixed satang surcharge or a percentage of the cost.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::money::{ceil_to_baht, Satang};

/// How a markup value is applied to a wholesale cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupType {
    Fixed,
    Percent,
}

impl Default for MarkupType {
    fn default() -> Self {
        Self::Fixed
    }
}

impl MarkupType {
    /// Parse from the stored column value; unknown values fall back to fixed,
    /// matching the storefront's `markup_type || 'fixed'` behavior.
    pub fn from_column(s: &str) -> Self {
        match s {
            "percent" => Self::Percent,
            _ => Self::Fixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Percent => "percent",
        }
    }
}

/// Per-game catalog overrides: hide a whole game, flag it popular, or
/// replace the supplier's display name and image
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductSetting {
    /// Supplier's game name; also how markup settings are keyed
    pub game_id: String,
    pub custom_name: Option<String>,
    pub custom_image: Option<String>,
    pub is_active: bool,
    pub is_popular: bool,
}

/// Per-package markup configuration row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PackageSetting {
    pub game_id: String,
    pub package_id: String,
    pub markup_type: String,
    /// Satang for fixed markup, whole percent for percent markup
    pub markup_value: i64,
    /// Inactive packages are hidden from the public catalog
    pub active: bool,
}

/// Compute the resale price for a package.
///
/// Percent markup is floor(cost * pct / 100) before the final ceil, which
/// only ever rounds the total up to a whole baht.
pub fn resale_price(cost: Satang, markup_type: MarkupType, markup_value: i64) -> Satang {
    let marked = match markup_type {
        MarkupType::Fixed => cost.saturating_add(markup_value),
        MarkupType::Percent => cost.saturating_add(cost.saturating_mul(markup_value) / 100),
    };
    ceil_to_baht(marked)
}

impl PackageSetting {
    pub fn apply(&self, cost: Satang) -> Satang {
        resale_price(cost, MarkupType::from_column(&self.markup_type), self.markup_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_markup() {
        // 45.00 cost + 5.00 fixed = 50.00
        assert_eq!(resale_price(4500, MarkupType::Fixed, 500), 5000);
        // Sub-baht markup still rounds up to a whole baht
        assert_eq!(resale_price(4500, MarkupType::Fixed, 50), 4600);
    }

    #[test]
    fn test_percent_markup() {
        // 100.00 cost + 10% = 110.00
        assert_eq!(resale_price(10000, MarkupType::Percent, 10), 11000);
        // 19.00 cost + 5% = 19.95 -> 20.00
        assert_eq!(resale_price(1900, MarkupType::Percent, 5), 2000);
    }

    #[test]
    fn test_zero_markup_still_ceils() {
        assert_eq!(resale_price(1950, MarkupType::Fixed, 0), 2000);
        assert_eq!(resale_price(1900, MarkupType::Fixed, 0), 1900);
    }

    #[test]
    fn test_markup_type_from_column() {
        assert_eq!(MarkupType::from_column("percent"), MarkupType::Percent);
        assert_eq!(MarkupType::from_column("fixed"), MarkupType::Fixed);
        assert_eq!(MarkupType::from_column("garbage"), MarkupType::Fixed);
    }

    #[test]
    fn test_package_setting_apply() {
        let setting = PackageSetting {
            game_id: "genshin".to_string(),
            package_id: "60-crystals".to_string(),
            markup_type: "percent".to_string(),
            markup_value: 10,
            active: true,
        };
        // 45.00 + 10% = 49.50 -> 50.00
        assert_eq!(setting.apply(4500), 5000);
    }
}
