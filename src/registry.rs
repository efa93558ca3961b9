// =============================================================================
// Indicator Registry
// =============================================================================
//
// The closed set of indicator kinds and their immutable specifications: how
// each one is displayed, which parameters it takes, and their defaults. The
// specs double as the catalog served to chart front-ends, so `min`/`max`/
// `step` are UI hints only and are never enforced.
// =============================================================================

use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::types::{ChartType, DisplayType, ParamValue};

/// Version reported in every result's metadata.
pub const INDICATOR_VERSION: &str = "1.0.0";

/// Every indicator the engine can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Bollinger,
    Atr,
    Stochastic,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 7] = [
        Self::Sma,
        Self::Ema,
        Self::Rsi,
        Self::Macd,
        Self::Bollinger,
        Self::Atr,
        Self::Stochastic,
    ];

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look an indicator up by name (case-insensitive, surrounding whitespace
    /// ignored).
    pub fn lookup(name: &str) -> Result<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| EngineError::UnknownIndicator(name.to_string()))
    }

    pub fn spec(self) -> &'static IndicatorSpec {
        match self {
            Self::Sma => &SMA,
            Self::Ema => &EMA,
            Self::Rsi => &RSI,
            Self::Macd => &MACD,
            Self::Bollinger => &BOLLINGER,
            Self::Atr => &ATR,
            Self::Stochastic => &STOCHASTIC,
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Static description of one indicator kind.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub display_name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub display_type: DisplayType,
    pub chart_type: ChartType,
    pub parameters: &'static [ParamDef],
}

/// UI type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Number,
    Color,
}

/// What a parameter is for. Computational and level parameters are echoed in
/// result metadata; style parameters are only passed through to line config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    Compute,
    Level,
    Style,
}

/// Compile-time default for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamDefault {
    Int(i64),
    Float(f64),
    Text(&'static str),
}

impl ParamDefault {
    pub fn to_value(self) -> ParamValue {
        match self {
            Self::Int(i) => ParamValue::Int(i),
            Self::Float(f) => ParamValue::Float(f),
            Self::Text(s) => ParamValue::Text(s.to_string()),
        }
    }
}

/// One entry of an indicator's parameter schema.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDef {
    pub name: &'static str,
    pub display_name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub default: ParamDefault,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    pub description: &'static str,
    #[serde(skip)]
    pub role: ParamRole,
}

impl ParamDef {
    const fn number(
        name: &'static str,
        display_name: &'static str,
        default: ParamDefault,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self {
            name,
            display_name,
            kind: ParamType::Number,
            default,
            min: Some(range.0),
            max: Some(range.1),
            step: Some(range.2),
            description,
            role: ParamRole::Compute,
        }
    }

    const fn color(
        name: &'static str,
        display_name: &'static str,
        default: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            display_name,
            kind: ParamType::Color,
            default: ParamDefault::Text(default),
            min: None,
            max: None,
            step: None,
            description,
            role: ParamRole::Style,
        }
    }

    const fn with_role(self, role: ParamRole) -> Self {
        Self { role, ..self }
    }
}

const LINE_WIDTH: ParamDef = ParamDef::number(
    "lineWidth",
    "Line Width",
    ParamDefault::Int(2),
    (1.0, 5.0, 1.0),
    "Line thickness",
)
.with_role(ParamRole::Style);

// =============================================================================
// Specs
// =============================================================================

static SMA: IndicatorSpec = IndicatorSpec {
    name: "sma",
    display_name: "Simple Moving Average (SMA)",
    version: INDICATOR_VERSION,
    description: "Calculate simple moving average of closing prices",
    display_type: DisplayType::SingleLine,
    chart_type: ChartType::Main,
    parameters: &[
        ParamDef::number(
            "period",
            "Period",
            ParamDefault::Int(20),
            (1.0, 200.0, 1.0),
            "Number of periods for moving average",
        ),
        ParamDef::color("color", "Line Color", "#2196F3", "Line color on chart"),
        LINE_WIDTH,
    ],
};

static EMA: IndicatorSpec = IndicatorSpec {
    name: "ema",
    display_name: "Exponential Moving Average (EMA)",
    version: INDICATOR_VERSION,
    description: "Moving average that weights recent closing prices more heavily",
    display_type: DisplayType::SingleLine,
    chart_type: ChartType::Main,
    parameters: &[
        ParamDef::number(
            "period",
            "Period",
            ParamDefault::Int(20),
            (1.0, 200.0, 1.0),
            "Number of periods for moving average",
        ),
        ParamDef::color("color", "Line Color", "#FF6B35", "Line color on chart"),
        LINE_WIDTH,
    ],
};

static RSI: IndicatorSpec = IndicatorSpec {
    name: "rsi",
    display_name: "Relative Strength Index (RSI)",
    version: INDICATOR_VERSION,
    description: "Momentum oscillator measuring speed and magnitude of price changes",
    display_type: DisplayType::SingleLine,
    chart_type: ChartType::Sub,
    parameters: &[
        ParamDef::number(
            "period",
            "Period",
            ParamDefault::Int(14),
            (2.0, 50.0, 1.0),
            "Number of periods for RSI calculation",
        ),
        ParamDef::color("color", "Line Color", "#9C27B0", "RSI line color"),
        LINE_WIDTH,
        ParamDef::number(
            "overbought",
            "Overbought Level",
            ParamDefault::Int(70),
            (50.0, 90.0, 5.0),
            "Overbought threshold line",
        )
        .with_role(ParamRole::Level),
        ParamDef::number(
            "oversold",
            "Oversold Level",
            ParamDefault::Int(30),
            (10.0, 50.0, 5.0),
            "Oversold threshold line",
        )
        .with_role(ParamRole::Level),
    ],
};

static MACD: IndicatorSpec = IndicatorSpec {
    name: "macd",
    display_name: "MACD",
    version: INDICATOR_VERSION,
    description: "Moving Average Convergence Divergence - trend-following momentum indicator",
    display_type: DisplayType::MultiLine,
    chart_type: ChartType::Sub,
    parameters: &[
        ParamDef::number(
            "fastPeriod",
            "Fast Period",
            ParamDefault::Int(12),
            (5.0, 50.0, 1.0),
            "Fast EMA period",
        ),
        ParamDef::number(
            "slowPeriod",
            "Slow Period",
            ParamDefault::Int(26),
            (10.0, 100.0, 1.0),
            "Slow EMA period",
        ),
        ParamDef::number(
            "signalPeriod",
            "Signal Period",
            ParamDefault::Int(9),
            (2.0, 50.0, 1.0),
            "Signal line period",
        ),
        ParamDef::color("macdColor", "MACD Line Color", "#2196F3", "MACD line color"),
        ParamDef::color("signalColor", "Signal Line Color", "#FF6B35", "Signal line color"),
        ParamDef::color("histogramColor", "Histogram Color", "#9C27B0", "Histogram color"),
        LINE_WIDTH,
    ],
};

static BOLLINGER: IndicatorSpec = IndicatorSpec {
    name: "bollinger",
    display_name: "Bollinger Bands",
    version: INDICATOR_VERSION,
    description: "Volatility bands placed above and below a moving average",
    display_type: DisplayType::Band,
    chart_type: ChartType::Main,
    parameters: &[
        ParamDef::number(
            "period",
            "Period",
            ParamDefault::Int(20),
            (5.0, 50.0, 1.0),
            "Number of periods for moving average",
        ),
        ParamDef::number(
            "stdDev",
            "Standard Deviation",
            ParamDefault::Int(2),
            (1.0, 3.0, 0.1),
            "Number of standard deviations",
        ),
        ParamDef::color("upperColor", "Upper Band Color", "#FF5252", "Upper band color"),
        ParamDef::color("middleColor", "Middle Band Color", "#2196F3", "Middle band (MA) color"),
        ParamDef::color("lowerColor", "Lower Band Color", "#66BB6A", "Lower band color"),
        LINE_WIDTH,
    ],
};

static ATR: IndicatorSpec = IndicatorSpec {
    name: "atr",
    display_name: "Average True Range (ATR)",
    version: INDICATOR_VERSION,
    description: "Volatility measured as the average true range of recent bars",
    display_type: DisplayType::SingleLine,
    chart_type: ChartType::Sub,
    parameters: &[
        ParamDef::number(
            "period",
            "Period",
            ParamDefault::Int(14),
            (1.0, 100.0, 1.0),
            "Number of periods for the true range average",
        ),
        ParamDef::color("color", "Line Color", "#FF9800", "ATR line color"),
        LINE_WIDTH,
    ],
};

static STOCHASTIC: IndicatorSpec = IndicatorSpec {
    name: "stochastic",
    display_name: "Stochastic Oscillator",
    version: INDICATOR_VERSION,
    description: "Position of the close within the recent high-low range, with a 3-bar %D",
    display_type: DisplayType::MultiLine,
    chart_type: ChartType::Sub,
    parameters: &[
        ParamDef::number(
            "period",
            "%K Period",
            ParamDefault::Int(14),
            (1.0, 100.0, 1.0),
            "Lookback for the highest high and lowest low",
        ),
        ParamDef::color("kColor", "%K Color", "#2196F3", "%K line color"),
        ParamDef::color("dColor", "%D Color", "#FF6B35", "%D line color"),
        LINE_WIDTH,
        ParamDef::number(
            "overbought",
            "Overbought Level",
            ParamDefault::Int(80),
            (50.0, 95.0, 5.0),
            "Overbought threshold line",
        )
        .with_role(ParamRole::Level),
        ParamDef::number(
            "oversold",
            "Oversold Level",
            ParamDefault::Int(20),
            (5.0, 50.0, 5.0),
            "Oversold threshold line",
        )
        .with_role(ParamRole::Level),
    ],
};
