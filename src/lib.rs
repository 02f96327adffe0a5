//! Technical indicator engine for stock dashboards.
//!
//! Given a time-ordered OHLCV series, [`Engine`] computes simple and
//! exponential moving averages, RSI, MACD and Bollinger Bands over the close
//! prices, classifies each into a buy/sell/neutral [`Signal`] and returns
//! everything as one serializable [`IndicatorBundle`].
//!
//! ```
//! use tickerlens_ta::{Engine, EngineConfig, PriceSeries};
//!
//! let json = r#"[
//!     {"timestamp": 1, "open": 10.0, "high": 11.0, "low": 9.5, "close": 10.5, "volume": 1200},
//!     {"timestamp": 2, "open": 10.5, "high": 11.5, "low": 10.0, "close": 11.0, "volume": 900},
//!     {"timestamp": 3, "open": 11.0, "high": 12.0, "low": 10.8, "close": 11.5, "volume": 1500}
//! ]"#;
//! let series: PriceSeries = serde_json::from_str(json).unwrap();
//!
//! let engine = Engine::new(EngineConfig::builder().periods([2]).build());
//! let bundle = engine.compute(&series).unwrap();
//!
//! assert_eq!(bundle.sma(2).unwrap().value(), 11.25);
//! assert!(bundle.rsi().is_none()); // RSI(14) needs 15 bars
//! ```
//!
//! The calculators are usable on their own. Each type ([`Sma`], [`Ema`],
//! [`Rsi`], [`Macd`], [`Bb`]) exposes [`new`](Sma::new),
//! [`compute`](Sma::compute), and [`value`](Sma::value) as inherent methods,
//! no trait import needed. Import [`Calculator`] for generic code and for
//! [`Calculator::calculate`] over a whole slice.

mod bb;
mod bundle;
mod calculator;
mod ema;
mod engine;
mod error;
mod macd;
mod ohlcv;
mod price_window;
mod report;
mod rsi;
pub mod signal;
mod sma;

pub use crate::calculator::{Calculator, CalculatorConfig};
pub use crate::error::{Error, Result};
pub use crate::ohlcv::{Ohlcv, Price, PriceBar, PriceSeries, Timestamp};
pub use crate::signal::Signal;

pub use crate::bb::{Bb, BbConfig, BbValue, StdDev};
pub use crate::ema::{Ema, EmaConfig};
pub use crate::macd::{Macd, MacdConfig, MacdValue};
pub use crate::rsi::{Rsi, RsiConfig};
pub use crate::sma::{Sma, SmaConfig};

pub use crate::bundle::{
    BollingerIndicators, HistoryPoint, Indicator, IndicatorBundle, IndicatorGroup, IndicatorKind,
    MacdIndicators, Omission,
};
pub use crate::engine::{BollingerParams, Engine, EngineConfig, EngineConfigBuilder, MacdParams};
pub use crate::report::ContextReport;

macro_rules! impl_calculator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Calculator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Calculator>::new(config)
            }

            /// See [`Calculator::compute`].
            #[inline]
            pub fn compute(&mut self, price: Price) -> Option<$output> {
                <Self as Calculator>::compute(self, price)
            }

            /// See [`Calculator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<$output> {
                <Self as Calculator>::value(self)
            }
        }
    };
}

impl_calculator_methods!(Sma, SmaConfig, Price);
impl_calculator_methods!(Ema, EmaConfig, Price);
impl_calculator_methods!(Rsi, RsiConfig, Price);
impl_calculator_methods!(Macd, MacdConfig, MacdValue);
impl_calculator_methods!(Bb, BbConfig, BbValue);

#[cfg(test)]
mod test_util;

#[cfg(test)]
mod inherent_methods {
    use super::{
        Bb, BbConfig, BbValue, Ema, EmaConfig, Macd, MacdConfig, Rsi, RsiConfig, Sma, SmaConfig,
    };
    use std::num::NonZero;

    fn nz(n: usize) -> NonZero<usize> {
        NonZero::new(n).unwrap()
    }

    #[test]
    fn sma_without_calculator_import() {
        let mut sma = Sma::new(SmaConfig::new(nz(2)));
        assert_eq!(sma.compute(10.0), None);
        assert_eq!(sma.compute(20.0), Some(15.0));
        assert_eq!(sma.value(), Some(15.0));
    }

    #[test]
    fn ema_without_calculator_import() {
        let mut ema = Ema::new(EmaConfig::new(nz(2)));
        assert_eq!(ema.compute(10.0), None);
        assert!(ema.compute(20.0).is_some());
        assert!(ema.value().is_some());
    }

    #[test]
    fn rsi_without_calculator_import() {
        let mut rsi = Rsi::new(RsiConfig::new(nz(1)));
        assert_eq!(rsi.compute(10.0), None);
        assert_eq!(rsi.compute(11.0), Some(100.0));
        assert_eq!(rsi.value(), Some(100.0));
    }

    #[test]
    fn macd_without_calculator_import() {
        let mut macd = Macd::new(MacdConfig::new(1, 2, 1).unwrap());
        assert_eq!(macd.compute(10.0), None);
        assert!(macd.compute(11.0).is_some());
        assert!(macd.value().is_some());
    }

    #[test]
    fn bb_without_calculator_import() {
        let mut bb = Bb::new(BbConfig::close(nz(2)));
        assert!(bb.compute(10.0).is_none());
        let v: Option<BbValue> = bb.compute(20.0);
        assert!(v.is_some());
        assert!(bb.value().is_some());
    }
}
