//! Price Series Analytics
//!
//! Derived statistics computed by the factor fetchers. All percentages are
//! expressed as `0..=100` values, not fractions.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Percent return between each pair of consecutive samples
///
/// `(p[i] - p[i-1]) / p[i-1] * 100`; pairs starting at zero are skipped.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0] * 100.0)
        .collect()
}

/// Population standard deviation; `0.0` for an empty series
#[allow(clippy::cast_precision_loss)]
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Volatility of a price series: std dev of its daily returns
pub fn volatility(prices: &[f64]) -> f64 {
    population_std_dev(&daily_returns(prices))
}

/// Largest percent decline from a running maximum, scanning left to right
pub fn max_drawdown(prices: &[f64]) -> f64 {
    let Some(&first) = prices.first() else {
        return 0.0;
    };

    let mut running_max = first;
    let mut worst = 0.0_f64;
    for &price in prices {
        if price > running_max {
            running_max = price;
        }
        if running_max > 0.0 {
            worst = worst.max((running_max - price) / running_max * 100.0);
        }
    }
    worst
}

/// Percent change from `from` to `to`; `None` when `from` is zero
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    (from != 0.0).then(|| (to - from) / from * 100.0)
}

/// Percent change between two money amounts; `None` when `from` is zero
pub fn decimal_growth(from: Decimal, to: Decimal) -> Option<f64> {
    if from.is_zero() {
        return None;
    }
    ((to - from) / from * Decimal::ONE_HUNDRED).round_dp(2).to_f64()
}

/// Share of everything except the dominant asset: `100 - dominance`
pub fn complement_share(dominance_pct: f64) -> f64 {
    100.0 - dominance_pct
}

/// Percent of `total` not accounted for by `part`; `None` for a zero total
pub fn remainder_share(total: Decimal, part: Decimal) -> Option<f64> {
    if total.is_zero() {
        return None;
    }
    ((total - part) / total * Decimal::ONE_HUNDRED).round_dp(2).to_f64()
}
