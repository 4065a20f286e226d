//! Currency lookup by ticker suffix.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
}

pub const BASE_CURRENCY: Currency = Currency { code: "USD", symbol: "$" };

/// Exchange suffix -> quote currency. Add a market by adding a row.
const SUFFIX_TABLE: &[(&str, Currency)] = &[
    (".BK", Currency { code: "THB", symbol: "฿" }),
    (".T", Currency { code: "JPY", symbol: "¥" }),
    (".HK", Currency { code: "HKD", symbol: "HK$" }),
    (".TO", Currency { code: "CAD", symbol: "C$" }),
    (".DE", Currency { code: "EUR", symbol: "€" }),
    (".PA", Currency { code: "EUR", symbol: "€" }),
    (".AS", Currency { code: "EUR", symbol: "€" }),
    (".L", Currency { code: "GBP", symbol: "£" }),
];

pub fn for_asset(asset_name: &str) -> Currency {
    let upper = asset_name.to_uppercase();
    SUFFIX_TABLE
        .iter()
        .find(|(suffix, _)| upper.ends_with(suffix))
        .map(|(_, currency)| *currency)
        .unwrap_or(BASE_CURRENCY)
}

impl Currency {
    pub fn format(&self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol, amount)
    }
}
