//! Plain-text rendering of an [`IndicatorBundle`].

use std::fmt::{self, Display};

use crate::{Indicator, IndicatorBundle, IndicatorKind, Signal};

impl IndicatorKind {
    /// One-sentence description of the indicator, as shown on its card.
    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::Sma(_) => format!(
                "Simple Moving Average ({self}): the arithmetic mean of closing prices over the \
                 period. Used to identify trend direction and support or resistance levels."
            ),
            Self::Ema(_) => format!(
                "Exponential Moving Average ({self}): like the SMA but weighted towards recent \
                 prices, so it reacts faster to price changes."
            ),
            Self::Rsi => "Relative Strength Index: measures the speed and magnitude of recent \
                          price changes to flag overbought (>70) or oversold (<30) conditions."
                .into(),
            Self::MacdLine => "MACD Line: the difference between a fast and a slow exponential \
                               moving average. Used to spot momentum changes."
                .into(),
            Self::SignalLine => "MACD Signal Line: a moving average of the MACD line. Crossings \
                                 between the two may mark buy or sell opportunities."
                .into(),
            Self::Histogram => "MACD Histogram: the MACD line minus its signal line. Its size \
                                and direction indicate momentum strength."
                .into(),
            Self::UpperBand => "Bollinger Upper Band: standard deviations above the middle band. \
                                Price reaching it may indicate overbought conditions."
                .into(),
            Self::MiddleBand => "Bollinger Middle Band: the simple moving average the upper and \
                                 lower bands are built around."
                .into(),
            Self::LowerBand => "Bollinger Lower Band: standard deviations below the middle band. \
                                Price reaching it may indicate oversold conditions."
                .into(),
        }
    }

    /// What `signal` means for this indicator family.
    #[must_use]
    pub fn explain(self, signal: Signal) -> &'static str {
        match (self, signal) {
            (Self::Rsi, Signal::Buy) => "RSI below 30 indicates oversold conditions",
            (Self::Rsi, Signal::Sell) => "RSI above 70 indicates overbought conditions",
            (Self::Rsi, Signal::Neutral) => "RSI between 30 and 70 indicates neutral conditions",

            (Self::UpperBand | Self::MiddleBand | Self::LowerBand, Signal::Buy) => {
                "Price at or below the lower band suggests oversold conditions"
            }
            (Self::UpperBand | Self::MiddleBand | Self::LowerBand, Signal::Sell) => {
                "Price at or above the upper band suggests overbought conditions"
            }
            (Self::UpperBand | Self::MiddleBand | Self::LowerBand, Signal::Neutral) => {
                "Price within the bands suggests normal trading conditions"
            }

            (Self::MacdLine | Self::SignalLine | Self::Histogram, Signal::Buy) => {
                "MACD above its signal line suggests bullish momentum"
            }
            (Self::MacdLine | Self::SignalLine | Self::Histogram, Signal::Sell) => {
                "MACD below its signal line suggests bearish momentum"
            }
            (Self::MacdLine | Self::SignalLine | Self::Histogram, Signal::Neutral) => {
                "No clear momentum direction"
            }

            (Self::Sma(_) | Self::Ema(_), Signal::Buy) => {
                "Price above the moving average suggests an upward trend"
            }
            (Self::Sma(_) | Self::Ema(_), Signal::Sell) => {
                "Price below the moving average suggests a downward trend"
            }
            (Self::Sma(_) | Self::Ema(_), Signal::Neutral) => "No clear trend direction",
        }
    }
}

impl Indicator {
    /// Explanation of this indicator's current signal, if it has one.
    #[must_use]
    pub fn explanation(&self) -> Option<&'static str> {
        self.signal().map(|signal| self.kind().explain(signal))
    }
}

/// Indicator context handed to the summarizer, one line per reading.
///
/// ```text
/// - SMA 20: 119.50 (Signal: buy)
/// - RSI: 100.00 (Signal: sell)
/// - MACD: Line=0.42, Signal=0.40, Histogram=0.02 (Signal: buy)
/// - Middle Band: 119.50
/// - SMA 200: unavailable (insufficient data: 200 bars required, 30 available)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContextReport<'a> {
    bundle: &'a IndicatorBundle,
}

impl<'a> ContextReport<'a> {
    #[must_use]
    pub fn new(bundle: &'a IndicatorBundle) -> Self {
        Self { bundle }
    }
}

impl IndicatorBundle {
    /// Plain-text view of this bundle, see [`ContextReport`].
    #[must_use]
    pub fn context_report(&self) -> ContextReport<'_> {
        ContextReport::new(self)
    }
}

fn reading(f: &mut fmt::Formatter<'_>, indicator: &Indicator) -> fmt::Result {
    write!(f, "- {}: {:.2}", indicator.name(), indicator.value())?;
    if let Some(signal) = indicator.signal() {
        write!(f, " (Signal: {signal})")?;
    }
    writeln!(f)
}

impl Display for ContextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bundle = self.bundle;

        for indicator in bundle.smas().chain(bundle.ema()).chain(bundle.rsi()) {
            reading(f, indicator)?;
        }

        if let Some(macd) = bundle.macd() {
            write!(
                f,
                "- MACD: Line={:.2}, Signal={:.2}, Histogram={:.2}",
                macd.macd_line.value(),
                macd.signal_line.value(),
                macd.histogram.value(),
            )?;
            if let Some(signal) = macd.macd_line.signal() {
                write!(f, " (Signal: {signal})")?;
            }
            writeln!(f)?;
        }

        if let Some(bands) = bundle.bollinger_bands() {
            for band in [&bands.upper, &bands.middle, &bands.lower] {
                reading(f, band)?;
            }
        }

        for omission in bundle.omitted() {
            writeln!(f, "- {}: unavailable ({})", omission.indicator, omission.error)?;
        }

        Ok(())
    }
}
