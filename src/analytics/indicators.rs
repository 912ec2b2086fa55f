//! Financial indicator assembly
//!
//! Picks named metrics out of upstream's `metric=all` payload and renders
//! each as a display string. The rendering is chosen from the output field
//! name; a metric upstream omits is left out of the set.

use crate::models::IndicatorSet;
use crate::scrapers::finnhub_rest::BasicFinancials;

/// (output name, upstream metric key)
pub const INDICATOR_FIELDS: &[(&str, &str)] = &[
    ("marketCap", "marketCapitalization"),
    ("enterpriseValue", "enterpriseValue"),
    ("peRatio", "peTTM"),
    ("pbRatio", "pbQuarterly"),
    ("psRatio", "psTTM"),
    ("pfcfRatio", "pfcfShareTTM"),
    ("eps", "epsTTM"),
    ("epsGrowth", "epsGrowthTTMYoy"),
    ("revenueGrowth", "revenueGrowthTTMYoy"),
    ("revenuePerShare", "revenuePerShareTTM"),
    ("bookValuePerShare", "bookValuePerShareQuarterly"),
    ("cashPerShare", "cashPerSharePerShareQuarterly"),
    ("dividendPerShare", "dividendPerShareAnnual"),
    ("dividendYield", "dividendYieldIndicatedAnnual"),
    ("payoutRatio", "payoutRatioTTM"),
    ("beta", "beta"),
    ("week52High", "52WeekHigh"),
    ("week52Low", "52WeekLow"),
    ("week52Return", "52WeekPriceReturnDaily"),
    ("roe", "roeTTM"),
    ("roa", "roaTTM"),
    ("roi", "roiTTM"),
    ("grossMargin", "grossMarginTTM"),
    ("operatingMargin", "operatingMarginTTM"),
    ("netMargin", "netProfitMarginTTM"),
    ("currentRatio", "currentRatioQuarterly"),
    ("quickRatio", "quickRatioQuarterly"),
    ("debtToEquity", "totalDebt/totalEquityQuarterly"),
    ("avgVolume10Day", "10DayAverageTradingVolume"),
    ("avgVolume3Month", "3MonthAverageTradingVolume"),
];

const HIGH_52W: &str = "52WeekHigh";
const LOW_52W: &str = "52WeekLow";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFormat {
    /// Upstream millions of dollars → `$1.23B`
    MoneyMillions,
    /// Upstream millions of shares → `45.60M`
    VolumeMillions,
    Percent,
    Price,
    Ratio,
}

impl MetricFormat {
    pub fn for_field(name: &str) -> Self {
        const PERCENT_WORDS: [&str; 4] = ["Margin", "Growth", "Yield", "Return"];
        const PERCENT_FIELDS: [&str; 4] = ["roe", "roa", "roi", "payoutRatio"];

        if name == "marketCap" || name == "enterpriseValue" {
            MetricFormat::MoneyMillions
        } else if name.starts_with("avgVolume") {
            MetricFormat::VolumeMillions
        } else if PERCENT_FIELDS.contains(&name) || PERCENT_WORDS.iter().any(|w| name.contains(w)) {
            MetricFormat::Percent
        } else if name == "eps"
            || name.starts_with("sma")
            || name.ends_with("PerShare")
            || name == "week52High"
            || name == "week52Low"
        {
            MetricFormat::Price
        } else {
            MetricFormat::Ratio
        }
    }

    pub fn render(self, value: f64) -> String {
        match self {
            MetricFormat::MoneyMillions => format!("${}", scaled(value * 1_000_000.0)),
            MetricFormat::VolumeMillions => scaled(value * 1_000_000.0),
            MetricFormat::Percent => format!("{:.2}%", value),
            MetricFormat::Price => format!("${:.2}", value),
            MetricFormat::Ratio => format!("{:.2}", value),
        }
    }
}

/// Abbreviate with T/B/M/K suffixes.
fn scaled(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_metric(name: &str, value: f64) -> String {
    MetricFormat::for_field(name).render(value)
}

pub fn build_indicator_set(financials: &BasicFinancials) -> IndicatorSet {
    let mut set = IndicatorSet::new();

    for (name, key) in INDICATOR_FIELDS {
        if let Some(v) = financials.metric(key).filter(|v| v.is_finite()) {
            set.insert((*name).to_string(), format_metric(name, v));
        }
    }

    // Labelled as moving averages for the UI; upstream has no such series, so
    // these are positions inside the 52-week range.
    if let (Some(high), Some(low)) = (financials.metric(HIGH_52W), financials.metric(LOW_52W)) {
        let sma50 = (high + low) / 2.0;
        let sma200 = (high + 2.0 * low) / 3.0;
        set.insert("sma50".to_string(), format_metric("sma50", sma50));
        set.insert("sma200".to_string(), format_metric("sma200", sma200));
    }

    set
}
