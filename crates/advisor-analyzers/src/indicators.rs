//! Indicator helpers over closing-price series

use advisor_core::{AdvisorError, Result};
use ta::{
    Next,
    indicators::{RelativeStrengthIndex, SimpleMovingAverage, StandardDeviation},
};

/// Trading sessions per year, used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

fn indicator_error(e: impl std::fmt::Display) -> AdvisorError {
    AdvisorError::Indicator(e.to_string())
}

/// Latest RSI value, `None` when there are not more than `period` closes
pub fn rsi(closes: &[f64], period: usize) -> Result<Option<f64>> {
    if closes.len() <= period {
        return Ok(None);
    }
    let mut rsi = RelativeStrengthIndex::new(period).map_err(indicator_error)?;
    Ok(closes.iter().map(|&close| rsi.next(close)).last())
}

/// Simple moving average at every bar from the first full window onwards
pub fn sma_series(closes: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(period).map_err(indicator_error)?;
    let values: Vec<f64> = closes.iter().map(|&close| sma.next(close)).collect();
    Ok(values
        .into_iter()
        .skip(period.saturating_sub(1))
        .collect())
}

/// Latest simple moving average, `None` when the window is not full
pub fn sma(closes: &[f64], period: usize) -> Result<Option<f64>> {
    Ok(sma_series(closes, period)?.last().copied())
}

/// Population standard deviation of `values`
pub fn std_dev(values: &[f64]) -> Result<Option<f64>> {
    if values.len() < 2 {
        return Ok(None);
    }
    let mut sd = StandardDeviation::new(values.len()).map_err(indicator_error)?;
    Ok(values.iter().map(|&v| sd.next(v)).last())
}

/// Simple bar-to-bar returns; pairs with a non-positive base are skipped
pub fn returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Annualized volatility of daily returns, `None` with fewer than two returns
pub fn annualized_volatility(closes: &[f64]) -> Result<Option<f64>> {
    Ok(std_dev(&returns(closes))?.map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt()))
}

/// Percent change from `from` to `to`
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    (from > 0.0 && from.is_finite() && to.is_finite()).then(|| (to - from) / from * 100.0)
}

/// Percent return over the last `bars` bars
pub fn trailing_return(closes: &[f64], bars: usize) -> Option<f64> {
    if closes.len() <= bars {
        return None;
    }
    let last = closes[closes.len() - 1];
    let base = closes[closes.len() - 1 - bars];
    percent_change(base, last)
}
