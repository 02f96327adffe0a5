use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar timestamp in milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// OHLCV bar data.
///
/// Implement this on your own kline/candle type and convert with
/// [`PriceSeries::from_ohlcv`].
///
/// # Example
///
/// ```
/// use tickerlens_ta::{Ohlcv, Price, Timestamp};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64, v: f64,
///     ts: u64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn volume(&self) -> f64 { self.v }
///     fn timestamp(&self) -> Timestamp { self.ts }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing price of the bar.
    fn close(&self) -> Price;

    /// Trade volume during the bar.
    fn volume(&self) -> f64;

    /// Bar timestamp, milliseconds since epoch. Must strictly increase across
    /// a series.
    fn timestamp(&self) -> Timestamp;
}

/// One historical trading period, in the shape the price-history endpoint
/// returns it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f64,
}

impl PriceBar {
    /// Copies any [`Ohlcv`] bar into a `PriceBar`.
    #[must_use]
    pub fn from_ohlcv(bar: &impl Ohlcv) -> Self {
        Self {
            timestamp: bar.timestamp(),
            open: bar.open(),
            high: bar.high(),
            low: bar.low(),
            close: bar.close(),
            volume: bar.volume(),
        }
    }

    fn has_finite_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl Ohlcv for PriceBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Time-ordered sequence of [`PriceBar`]s, oldest first.
///
/// Ascending timestamps and OHLC consistency are the loader's responsibility
/// and are not checked. [`validate`](Self::validate) only rejects series no
/// indicator can be computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    #[must_use]
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    /// Builds a series from any [`Ohlcv`] bars.
    pub fn from_ohlcv<'a, B>(bars: impl IntoIterator<Item = &'a B>) -> Self
    where
        B: Ohlcv + 'a,
    {
        Self {
            bars: bars.into_iter().map(PriceBar::from_ohlcv).collect(),
        }
    }

    #[must_use]
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices, in series order.
    #[must_use]
    pub fn closes(&self) -> Vec<Price> {
        self.bars.iter().map(|b| b.close).collect()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Checks the series can be fed to the calculators.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSeries`] if the series is empty or any bar carries a
    /// NaN or infinite price. Volume is not read by any indicator and is not
    /// checked.
    pub fn validate(&self) -> Result<()> {
        if self.bars.is_empty() {
            return Err(Error::InvalidSeries("series is empty".into()));
        }

        if let Some((idx, bar)) = self
            .bars
            .iter()
            .enumerate()
            .find(|(_, b)| !b.has_finite_prices())
        {
            return Err(Error::InvalidSeries(format!(
                "non-finite price in bar {idx} (t={})",
                bar.timestamp
            )));
        }

        Ok(())
    }
}

impl From<Vec<PriceBar>> for PriceSeries {
    fn from(bars: Vec<PriceBar>) -> Self {
        Self::new(bars)
    }
}

impl FromIterator<PriceBar> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PriceBar>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
