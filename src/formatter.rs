// =============================================================================
// Result Formatter — chart-ready envelopes
// =============================================================================
//
// Converts the aligned backend series into the output contract. Undefined
// warm-up entries are dropped and every remaining value keeps the `time` of
// the candle at the same index. The layout depends on the indicator's display
// type:
//
//   single-line  -> `values` + `lineConfig`
//   multi-line   -> `lines[]`, each with its own `config`
//   band         -> `lines[]` named Upper / Middle / Lower
//
// Colors and line widths are copied from the resolved parameters verbatim.
// =============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{EngineError, ErrorKind};
use crate::indicators::series::defined_count;
use crate::indicators::{BandSeries, MacdSeries, Series, StochasticSeries};
use crate::market_data::CandleSeries;
use crate::registry::{IndicatorKind, IndicatorSpec};
use crate::types::{DisplayType, ParamValue, TimedValue};
use crate::validation::ResolvedParams;

/// Fixed interpretation cut points. The plotted `overbought`/`oversold`
/// levels are configurable and do not move these.
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;

const LEVEL_HIGH_COLOR: &str = "#ef5350";
const LEVEL_MID_COLOR: &str = "#666";
const LEVEL_LOW_COLOR: &str = "#66BB6A";

/// Raw backend output for one calculation, together with the validated
/// parameters it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub enum Computed {
    Sma { period: usize, series: Series },
    Ema { period: usize, series: Series },
    Rsi { period: usize, series: Series },
    Atr { period: usize, series: Series },
    Macd(MacdSeries),
    Bollinger { period: usize, series: BandSeries },
    Stochastic { period: usize, series: StochasticSeries },
}

impl Computed {
    pub fn kind(&self) -> IndicatorKind {
        match self {
            Self::Sma { .. } => IndicatorKind::Sma,
            Self::Ema { .. } => IndicatorKind::Ema,
            Self::Rsi { .. } => IndicatorKind::Rsi,
            Self::Atr { .. } => IndicatorKind::Atr,
            Self::Macd(_) => IndicatorKind::Macd,
            Self::Bollinger { .. } => IndicatorKind::Bollinger,
            Self::Stochastic { .. } => IndicatorKind::Stochastic,
        }
    }
}

/// Successful calculation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub success: bool,
    pub display_type: DisplayType,
    #[serde(flatten)]
    pub plot: Plot,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<Level>,
    pub metadata: Metadata,
}

impl ResultEnvelope {
    /// Every plotted line in display order; single-line results yield one.
    pub fn line_values(&self) -> Vec<&[TimedValue]> {
        match &self.plot {
            Plot::Single { values, .. } => vec![values.as_slice()],
            Plot::Lines { lines } => lines.iter().map(|l| l.values.as_slice()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Plot {
    Single {
        values: Vec<TimedValue>,
        #[serde(rename = "lineConfig")]
        line_config: LineConfig,
    },
    Lines {
        lines: Vec<Line>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub name: &'static str,
    pub values: Vec<TimedValue>,
    pub config: LineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    pub color: ParamValue,
    pub line_width: ParamValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<&'static str>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<&'static str>,
}

/// Horizontal reference line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub value: ParamValue,
    pub color: &'static str,
    pub style: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub indicator: &'static str,
    pub version: &'static str,
    /// Computational and level parameters after defaulting.
    #[serde(flatten)]
    pub parameters: BTreeMap<&'static str, ParamValue>,
    pub calculated_points: usize,
    pub data_points: usize,
    #[serde(flatten)]
    pub reading: Option<Reading>,
}

/// Latest value and its categorical reading (RSI only).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub current_value: Option<f64>,
    pub interpretation: Option<Interpretation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Interpretation {
    Overbought,
    Oversold,
    Neutral,
}

impl Interpretation {
    pub fn of_rsi(value: f64) -> Self {
        if value > RSI_OVERBOUGHT {
            Self::Overbought
        } else if value < RSI_OVERSOLD {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

/// Structured failure, never a crash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
}

impl FailureEnvelope {
    pub fn from_error(err: &EngineError, indicator: Option<&str>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
                indicator: indicator.map(str::to_string),
            },
        }
    }
}

/// Either outcome of a request, serialised without a wrapper tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorResponse {
    Success(ResultEnvelope),
    Failure(FailureEnvelope),
}

impl IndicatorResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(f.error.kind),
        }
    }
}

/// Keep defined entries, paired with the candle time at the same index.
pub fn timed_values(candles: &CandleSeries, series: &[Option<f64>]) -> Vec<TimedValue> {
    series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let value = (*v)?;
            let time = candles.time_at(i)?;
            Some(TimedValue { time, value })
        })
        .collect()
}

/// Assemble the envelope for one finished calculation.
pub fn format(
    resolved: &ResolvedParams,
    candles: &CandleSeries,
    computed: Computed,
) -> ResultEnvelope {
    let spec = computed.kind().spec();
    let line_width = resolved.value("lineWidth");

    match computed {
        Computed::Sma { period, series } => {
            let title = format!("SMA({period})");
            let (plot, calculated) = single_line(resolved, candles, &series, title);
            envelope(spec, plot, Vec::new(), resolved, calculated, candles, None)
        }

        Computed::Ema { period, series } => {
            let title = format!("EMA({period})");
            let (plot, calculated) = single_line(resolved, candles, &series, title);
            envelope(spec, plot, Vec::new(), resolved, calculated, candles, None)
        }

        Computed::Atr { period, series } => {
            let title = format!("ATR({period})");
            let (plot, calculated) = single_line(resolved, candles, &series, title);
            envelope(spec, plot, Vec::new(), resolved, calculated, candles, None)
        }

        Computed::Rsi { period, series } => {
            let title = format!("RSI({period})");
            let (plot, calculated) = single_line(resolved, candles, &series, title);
            let levels = vec![
                dashed(resolved.value("overbought"), LEVEL_HIGH_COLOR),
                Level {
                    value: ParamValue::Int(50),
                    color: LEVEL_MID_COLOR,
                    style: "solid",
                },
                dashed(resolved.value("oversold"), LEVEL_LOW_COLOR),
            ];
            let current = series.last().copied().flatten();
            let reading = Reading {
                current_value: current,
                // A reading of exactly zero carries no interpretation.
                interpretation: current.filter(|v| *v != 0.0).map(Interpretation::of_rsi),
            };
            envelope(spec, plot, levels, resolved, calculated, candles, Some(reading))
        }

        Computed::Macd(series) => {
            let calculated = defined_count(&series.macd);
            let lines = vec![
                Line {
                    name: "MACD",
                    values: timed_values(candles, &series.macd),
                    config: plain(resolved.value("macdColor"), line_width.clone(), "MACD".into()),
                },
                Line {
                    name: "Signal",
                    values: timed_values(candles, &series.signal),
                    config: plain(
                        resolved.value("signalColor"),
                        line_width,
                        "Signal".into(),
                    ),
                },
                Line {
                    name: "Histogram",
                    values: timed_values(candles, &series.histogram),
                    config: LineConfig {
                        color: resolved.value("histogramColor"),
                        line_width: ParamValue::Int(1),
                        line_style: None,
                        title: "Histogram".into(),
                        style: Some("histogram"),
                    },
                },
            ];
            envelope(spec, Plot::Lines { lines }, Vec::new(), resolved, calculated, candles, None)
        }

        Computed::Bollinger { period, series } => {
            let std_dev = resolved.value("stdDev");
            let calculated = defined_count(&series.middle);
            let lines = vec![
                Line {
                    name: "Upper",
                    values: timed_values(candles, &series.upper),
                    config: plain(
                        resolved.value("upperColor"),
                        line_width.clone(),
                        format!("BB Upper({period},{std_dev})"),
                    ),
                },
                Line {
                    name: "Middle",
                    values: timed_values(candles, &series.middle),
                    config: plain(
                        resolved.value("middleColor"),
                        line_width.clone(),
                        format!("BB Middle({period})"),
                    ),
                },
                Line {
                    name: "Lower",
                    values: timed_values(candles, &series.lower),
                    config: plain(
                        resolved.value("lowerColor"),
                        line_width,
                        format!("BB Lower({period},{std_dev})"),
                    ),
                },
            ];
            envelope(spec, Plot::Lines { lines }, Vec::new(), resolved, calculated, candles, None)
        }

        Computed::Stochastic { period, series } => {
            let calculated = defined_count(&series.k);
            let lines = vec![
                Line {
                    name: "%K",
                    values: timed_values(candles, &series.k),
                    config: plain(
                        resolved.value("kColor"),
                        line_width.clone(),
                        format!("%K({period})"),
                    ),
                },
                Line {
                    name: "%D",
                    values: timed_values(candles, &series.d),
                    config: plain(
                        resolved.value("dColor"),
                        line_width,
                        format!("%D({})", crate::indicators::stochastic::SMOOTHING),
                    ),
                },
            ];
            let levels = vec![
                dashed(resolved.value("overbought"), LEVEL_HIGH_COLOR),
                dashed(resolved.value("oversold"), LEVEL_LOW_COLOR),
            ];
            envelope(spec, Plot::Lines { lines }, levels, resolved, calculated, candles, None)
        }
    }
}

/// Solid single-line plot and its defined point count.
fn single_line(
    resolved: &ResolvedParams,
    candles: &CandleSeries,
    series: &[Option<f64>],
    title: String,
) -> (Plot, usize) {
    let values = timed_values(candles, series);
    let calculated = values.len();
    let line_config = LineConfig {
        color: resolved.value("color"),
        line_width: resolved.value("lineWidth"),
        line_style: Some("solid"),
        title,
        style: None,
    };
    (
        Plot::Single {
            values,
            line_config,
        },
        calculated,
    )
}

fn plain(color: ParamValue, line_width: ParamValue, title: String) -> LineConfig {
    LineConfig {
        color,
        line_width,
        line_style: None,
        title,
        style: None,
    }
}

fn dashed(value: ParamValue, color: &'static str) -> Level {
    Level {
        value,
        color,
        style: "dashed",
    }
}

fn envelope(
    spec: &'static IndicatorSpec,
    plot: Plot,
    levels: Vec<Level>,
    resolved: &ResolvedParams,
    calculated_points: usize,
    candles: &CandleSeries,
    reading: Option<Reading>,
) -> ResultEnvelope {
    ResultEnvelope {
        success: true,
        display_type: spec.display_type,
        plot,
        levels,
        metadata: Metadata {
            indicator: spec.name,
            version: spec.version,
            parameters: resolved.reported(),
            calculated_points,
            data_points: candles.len(),
            reading,
        },
    }
}
