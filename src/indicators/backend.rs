// =============================================================================
// Numeric backends
// =============================================================================
//
// Two interchangeable implementations of the same algorithm set:
//
//   Primary:  O(n) running-sum / deque routines, used when the optimized
//             backend is reported available.
//   Fallback: the literal windowed formulas; the normative reference.
//
// Both must agree within 1e-9 relative tolerance on identical input. The
// choice is made once, from an injected `BackendCapability`.
// =============================================================================

use serde::Serialize;
use tracing::info;

use super::series::{BandSeries, MacdSeries, Series, StochasticSeries};
use super::{atr, bollinger, ema, macd, rsi, sma, stochastic};

/// Which algorithm set a dispatcher is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Primary,
    Fallback,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Capability signal supplied at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendCapability {
    /// Whether the optimized routine set may be used.
    pub native_available: bool,
}

impl BackendCapability {
    pub fn native() -> Self {
        Self {
            native_available: true,
        }
    }

    pub fn fallback_only() -> Self {
        Self {
            native_available: false,
        }
    }
}

/// One interface per indicator. All outputs are aligned to the input length
/// with `None` over the warm-up prefix; no method ever fails.
pub trait NumericBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn sma(&self, values: &[f64], period: usize) -> Series;

    fn ema(&self, values: &[f64], period: usize) -> Series;

    fn rsi(&self, close: &[f64], period: usize) -> Series;

    fn macd(&self, close: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries;

    fn bbands(&self, close: &[f64], period: usize, nbdev_up: f64, nbdev_down: f64) -> BandSeries;

    fn atr(&self, high: &[f64], low: &[f64], close: &[f64], period: usize) -> Series;

    fn stochastic(&self, high: &[f64], low: &[f64], close: &[f64], period: usize)
        -> StochasticSeries;
}

/// Optimized routines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimaryBackend;

impl NumericBackend for PrimaryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Primary
    }

    fn sma(&self, values: &[f64], period: usize) -> Series {
        sma::optimized(values, period)
    }

    fn ema(&self, values: &[f64], period: usize) -> Series {
        ema::optimized(values, period)
    }

    fn rsi(&self, close: &[f64], period: usize) -> Series {
        rsi::optimized(close, period)
    }

    fn macd(&self, close: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
        macd::optimized(close, fast, slow, signal)
    }

    fn bbands(&self, close: &[f64], period: usize, nbdev_up: f64, nbdev_down: f64) -> BandSeries {
        bollinger::optimized(close, period, nbdev_up, nbdev_down)
    }

    fn atr(&self, high: &[f64], low: &[f64], close: &[f64], period: usize) -> Series {
        atr::optimized(high, low, close, period)
    }

    fn stochastic(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> StochasticSeries {
        stochastic::optimized(high, low, close, period)
    }
}

/// Reference routines.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackBackend;

impl NumericBackend for FallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn sma(&self, values: &[f64], period: usize) -> Series {
        sma::reference(values, period)
    }

    fn ema(&self, values: &[f64], period: usize) -> Series {
        ema::reference(values, period)
    }

    fn rsi(&self, close: &[f64], period: usize) -> Series {
        rsi::reference(close, period)
    }

    fn macd(&self, close: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
        macd::reference(close, fast, slow, signal)
    }

    fn bbands(&self, close: &[f64], period: usize, nbdev_up: f64, nbdev_down: f64) -> BandSeries {
        bollinger::reference(close, period, nbdev_up, nbdev_down)
    }

    fn atr(&self, high: &[f64], low: &[f64], close: &[f64], period: usize) -> Series {
        atr::reference(high, low, close, period)
    }

    fn stochastic(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> StochasticSeries {
        stochastic::reference(high, low, close, period)
    }
}

/// Resolve the backend for a capability. Called once per dispatcher.
pub fn select_backend(capability: BackendCapability) -> Box<dyn NumericBackend> {
    let backend: Box<dyn NumericBackend> = if capability.native_available {
        Box::new(PrimaryBackend)
    } else {
        Box::new(FallbackBackend)
    };
    info!(backend = %backend.kind(), "numeric backend selected");
    backend
}
