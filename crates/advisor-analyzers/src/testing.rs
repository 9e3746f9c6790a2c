//! Snapshot fixtures shared by unit tests

use advisor_core::{NewsItem, PricePoint, StockSnapshot, VolumeMetrics};
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap()
}

/// Daily bars, one per calendar day from [`start`]
pub fn daily_history(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            timestamp: start() + Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000,
        })
        .collect()
}

/// Snapshot whose price fields follow the last two closes
pub fn snapshot_with_closes(closes: &[f64]) -> StockSnapshot {
    let history = daily_history(closes);
    let current = closes.last().copied().unwrap_or(100.0);
    let previous = if closes.len() >= 2 {
        closes[closes.len() - 2]
    } else {
        current
    };
    let as_of = history.last().map_or_else(start, |p| p.timestamp);
    StockSnapshot::new("TEST", current, previous)
        .with_history(history)
        .with_volume(VolumeMetrics {
            current: 1_000_000,
            average: Some(1_000_000.0),
        })
        .with_as_of(as_of)
}

/// Linear series from `from` to `to` over `len` bars
pub fn linear(from: f64, to: f64, len: usize) -> Vec<f64> {
    if len < 2 {
        return vec![from; len];
    }
    let step = (to - from) / (len - 1) as f64;
    (0..len).map(|i| from + step * i as f64).collect()
}

/// Series oscillating around `center` with the given amplitude and period
pub fn wave(center: f64, amplitude: f64, period: usize, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let phase = (i % period) as f64 / period as f64 * std::f64::consts::TAU;
            center + amplitude * phase.sin()
        })
        .collect()
}

pub fn news(headline: &str, source: &str, published_at: DateTime<Utc>) -> NewsItem {
    NewsItem {
        headline: headline.to_string(),
        summary: None,
        source: source.to_string(),
        url: None,
        published_at,
        sentiment: None,
    }
}
