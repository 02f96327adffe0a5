use std::{collections::BTreeMap, fmt::Display};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::{Error, Price, PriceSeries, Signal, Timestamp};

/// Identifies one indicator reading inside an [`IndicatorBundle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Rsi,
    MacdLine,
    SignalLine,
    Histogram,
    UpperBand,
    MiddleBand,
    LowerBand,
}

impl IndicatorKind {
    /// Display name, e.g. `"SMA 20"` or `"MACD Histogram"`.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Sma(period) => format!("SMA {period}"),
            Self::Ema(period) => format!("EMA {period}"),
            Self::Rsi => "RSI".into(),
            Self::MacdLine => "MACD Line".into(),
            Self::SignalLine => "Signal Line".into(),
            Self::Histogram => "MACD Histogram".into(),
            Self::UpperBand => "Upper Band".into(),
            Self::MiddleBand => "Middle Band".into(),
            Self::LowerBand => "Lower Band".into(),
        }
    }

    /// Chart color hint.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Sma(_) => "#2196F3",
            Self::Ema(_) => "#4CAF50",
            Self::Rsi => "#FF9800",
            Self::MacdLine => "#E91E63",
            Self::SignalLine => "#9C27B0",
            Self::Histogram => "#673AB7",
            Self::UpperBand => "#F44336",
            Self::MiddleBand => "#3F51B5",
            Self::LowerBand => "#009688",
        }
    }
}

impl Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// A requested indicator family, as named in [`Omission`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorGroup {
    Sma(usize),
    Ema(usize),
    Rsi,
    Macd,
    BollingerBands,
}

impl Display for IndicatorGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sma(period) => write!(f, "SMA {period}"),
            Self::Ema(period) => write!(f, "EMA {period}"),
            Self::Rsi => f.write_str("RSI"),
            Self::Macd => f.write_str("MACD"),
            Self::BollingerBands => f.write_str("Bollinger Bands"),
        }
    }
}

impl Serialize for IndicatorGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One point of an indicator's computed series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

/// Latest reading of one indicator, its signal, and the series behind it.
///
/// `history` starts at the first bar for which the indicator's window is
/// fully populated and ends at the last bar of the series; `value` is the
/// last history point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    #[serde(skip)]
    kind: IndicatorKind,
    name: String,
    value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<Signal>,
    color: &'static str,
    history: Vec<HistoryPoint>,
}

impl Indicator {
    pub(crate) fn new(
        kind: IndicatorKind,
        value: f64,
        signal: Option<Signal>,
        history: Vec<HistoryPoint>,
    ) -> Self {
        Self {
            kind,
            name: kind.name(),
            value,
            signal,
            color: kind.color(),
            history,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> IndicatorKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest reading.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// `None` only for the Bollinger middle band.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Option<Signal> {
        self.signal
    }

    #[inline]
    #[must_use]
    pub fn color(&self) -> &'static str {
        self.color
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &[HistoryPoint] {
        &self.history
    }
}

/// MACD line, signal line and histogram, with histories aligned on the same
/// bars.
///
/// All three histories start at the first bar where the signal line exists
/// (index `slow + signal − 2`). The `signal − 1` MACD line values computed
/// before that bar are not charted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdIndicators {
    pub macd_line: Indicator,
    pub signal_line: Indicator,
    pub histogram: Indicator,
}

/// Upper, middle and lower Bollinger bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerIndicators {
    pub upper: Indicator,
    pub middle: Indicator,
    pub lower: Indicator,
}

/// A requested indicator that could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Omission {
    pub indicator: IndicatorGroup,
    pub error: Error,
}

/// Everything the dashboard renders for one symbol: the input bars, every
/// indicator that could be computed, and the ones that could not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorBundle {
    pub(crate) prices: PriceSeries,
    pub(crate) sma: BTreeMap<usize, Indicator>,
    pub(crate) ema: Option<Indicator>,
    pub(crate) rsi: Option<Indicator>,
    pub(crate) macd: Option<MacdIndicators>,
    pub(crate) bollinger_bands: Option<BollingerIndicators>,
    pub(crate) omitted: Vec<Omission>,
    pub(crate) last_updated: DateTime<Utc>,
}

impl IndicatorBundle {
    /// The input series, unchanged.
    #[must_use]
    pub fn prices(&self) -> &PriceSeries {
        &self.prices
    }

    /// Close of the last bar.
    #[must_use]
    pub fn latest_close(&self) -> Option<Price> {
        self.prices.last().map(|bar| bar.close)
    }

    #[must_use]
    pub fn sma(&self, period: usize) -> Option<&Indicator> {
        self.sma.get(&period)
    }

    /// Computed SMAs in ascending period order.
    pub fn smas(&self) -> impl Iterator<Item = &Indicator> {
        self.sma.values()
    }

    #[must_use]
    pub fn ema(&self) -> Option<&Indicator> {
        self.ema.as_ref()
    }

    #[must_use]
    pub fn rsi(&self) -> Option<&Indicator> {
        self.rsi.as_ref()
    }

    #[must_use]
    pub fn macd(&self) -> Option<&MacdIndicators> {
        self.macd.as_ref()
    }

    #[must_use]
    pub fn bollinger_bands(&self) -> Option<&BollingerIndicators> {
        self.bollinger_bands.as_ref()
    }

    #[must_use]
    pub fn omitted(&self) -> &[Omission] {
        &self.omitted
    }

    /// Error recorded for `group`, if it was omitted.
    #[must_use]
    pub fn omission(&self, group: IndicatorGroup) -> Option<&Error> {
        self.omitted
            .iter()
            .find(|omission| omission.indicator == group)
            .map(|omission| &omission.error)
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Every present indicator in dashboard order: SMAs, EMA, RSI, MACD,
    /// then Bollinger bands.
    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> {
        let macd = self
            .macd
            .iter()
            .flat_map(|m| [&m.macd_line, &m.signal_line, &m.histogram]);
        let bands = self
            .bollinger_bands
            .iter()
            .flat_map(|b| [&b.upper, &b.middle, &b.lower]);

        self.sma
            .values()
            .chain(self.ema.iter())
            .chain(self.rsi.iter())
            .chain(macd)
            .chain(bands)
    }
}
