use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV candle. `time` is unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A non-empty, time-ordered run of candles.
///
/// Ordering is assumed, never re-sorted; OHLC relationships are the caller's
/// responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        if candles.is_empty() {
            return Err(EngineError::InvalidInput(
                "candle series must not be empty".to_string(),
            ));
        }
        Ok(Self { candles })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Timestamp of the candle at `index`.
    pub fn time_at(&self, index: usize) -> Option<i64> {
        self.candles.get(index).map(|c| c.time)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: i64, close: f64) -> Candle {
        Candle {
            time,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn empty_series_rejected() {
        let err = CandleSeries::new(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn column_views_preserve_order() {
        let series = CandleSeries::new(vec![candle(1, 10.0), candle(2, 12.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 12.0]);
        assert_eq!(series.highs(), vec![11.0, 13.0]);
        assert_eq!(series.lows(), vec![9.0, 11.0]);
        assert_eq!(series.time_at(1), Some(2));
        assert_eq!(series.time_at(2), None);
    }
}
