use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    Bb, BbConfig, BollingerIndicators, Calculator, CalculatorConfig, Ema, EmaConfig, Error,
    HistoryPoint, Indicator, IndicatorBundle, IndicatorGroup, IndicatorKind, Macd, MacdConfig,
    MacdIndicators, Omission, Price, PriceBar, PriceSeries, Result, Rsi, RsiConfig, Signal, Sma,
    SmaConfig, StdDev, signal,
};

/// MACD periods as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// Bollinger Bands parameters as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BollingerParams {
    pub period: usize,
    pub std_dev_multiplier: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// Which indicators the [`Engine`] computes, and with what parameters.
///
/// Values are kept raw: an out-of-range period is not rejected here but
/// surfaces as an [`Omission`] for that indicator only.
///
/// # Example
///
/// ```
/// use tickerlens_ta::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "emaPeriod": 50 }"#).unwrap();
/// assert_eq!(config.ema_period, 50);
/// assert_eq!(config.rsi_period, 14);
///
/// let config = EngineConfig::builder().periods([20]).rsi_period(7).build();
/// assert_eq!(config.periods.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// SMA periods; one SMA indicator per entry.
    pub periods: BTreeSet<usize>,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub macd: MacdParams,
    pub bollinger: BollingerParams,
}

impl EngineConfig {
    /// Returns a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            periods: BTreeSet::from([20, 50, 150, 200]),
            ema_period: 20,
            rsi_period: 14,
            macd: MacdParams::default(),
            bollinger: BollingerParams::default(),
        }
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Replaces the SMA periods.
    #[must_use]
    pub fn periods(mut self, periods: impl IntoIterator<Item = usize>) -> Self {
        self.config.periods = periods.into_iter().collect();
        self
    }

    #[must_use]
    pub fn ema_period(mut self, period: usize) -> Self {
        self.config.ema_period = period;
        self
    }

    #[must_use]
    pub fn rsi_period(mut self, period: usize) -> Self {
        self.config.rsi_period = period;
        self
    }

    #[must_use]
    pub fn macd(mut self, fast: usize, slow: usize, signal: usize) -> Self {
        self.config.macd = MacdParams { fast, slow, signal };
        self
    }

    #[must_use]
    pub fn bollinger(mut self, period: usize, std_dev_multiplier: f64) -> Self {
        self.config.bollinger = BollingerParams {
            period,
            std_dev_multiplier,
        };
        self
    }

    #[must_use]
    pub fn build(self) -> EngineConfig {
        self.config
    }
}

/// Computes an [`IndicatorBundle`] from a price series.
///
/// Each indicator is computed independently from the close prices. An
/// indicator that cannot be computed (series too short, bad parameter) is
/// recorded in [`IndicatorBundle::omitted`] and the rest are still returned.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{Engine, EngineConfig, PriceBar, PriceSeries, Signal};
///
/// let series: PriceSeries = (0..30u32)
///     .map(|i| {
///         let close = 100.0 + f64::from(i);
///         PriceBar { timestamp: u64::from(i), open: close, high: close, low: close, close, volume: 1.0 }
///     })
///     .collect();
///
/// let engine = Engine::new(EngineConfig::builder().periods([20]).build());
/// let bundle = engine.compute(&series).unwrap();
///
/// assert_eq!(bundle.sma(20).unwrap().signal(), Some(Signal::Buy));
/// assert!(bundle.macd().is_none()); // needs 35 bars
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes every configured indicator, stamped with the current time.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSeries`] if the series is empty or holds a non-finite
    /// value. Per-indicator failures are not errors, see
    /// [`IndicatorBundle::omitted`].
    pub fn compute(&self, series: &PriceSeries) -> Result<IndicatorBundle> {
        self.compute_at(series, Utc::now())
    }

    /// Same as [`compute`](Self::compute) with a caller-supplied
    /// `last_updated`. Equal inputs give equal bundles.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSeries`], as for [`compute`](Self::compute).
    #[instrument(skip(self, series), fields(bars = series.len()), name = "engine::compute")]
    pub fn compute_at(
        &self,
        series: &PriceSeries,
        as_of: DateTime<Utc>,
    ) -> Result<IndicatorBundle> {
        if let Err(err) = series.validate() {
            warn!(%err, "rejecting price series");
            return Err(err);
        }

        let inputs = Inputs::new(series)?;
        let mut omitted = Omissions::default();

        let sma: BTreeMap<_, _> = self
            .config
            .periods
            .iter()
            .filter_map(|&period| {
                let group = IndicatorGroup::Sma(period);
                omitted
                    .keep(group, inputs.sma(period))
                    .map(|indicator| (period, indicator))
            })
            .collect();

        let ema_period = self.config.ema_period;
        let ema = omitted.keep(IndicatorGroup::Ema(ema_period), inputs.ema(ema_period));
        let rsi = omitted.keep(IndicatorGroup::Rsi, inputs.rsi(self.config.rsi_period));
        let macd = omitted.keep(IndicatorGroup::Macd, inputs.macd(self.config.macd));
        let bollinger_bands = omitted.keep(
            IndicatorGroup::BollingerBands,
            inputs.bollinger(self.config.bollinger),
        );

        Ok(IndicatorBundle {
            prices: series.clone(),
            sma,
            ema,
            rsi,
            macd,
            bollinger_bands,
            omitted: omitted.0,
            last_updated: as_of,
        })
    }
}

#[derive(Default)]
struct Omissions(Vec<Omission>);

impl Omissions {
    fn keep<T>(&mut self, indicator: IndicatorGroup, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                debug!(%indicator, %error, "indicator omitted");
                self.0.push(Omission { indicator, error });
                None
            }
        }
    }
}

/// Validated series viewed as close prices.
struct Inputs<'a> {
    bars: &'a [PriceBar],
    closes: Vec<Price>,
    price: Price,
}

impl<'a> Inputs<'a> {
    fn new(series: &'a PriceSeries) -> Result<Self> {
        let price = series
            .last()
            .map(|bar| bar.close)
            .ok_or_else(|| Error::InvalidSeries("series is empty".into()))?;

        Ok(Self {
            bars: series.bars(),
            closes: series.closes(),
            price,
        })
    }

    fn sma(&self, period: usize) -> Result<Indicator> {
        let config = SmaConfig::try_from(period)?;
        self.single::<Sma>(config, IndicatorKind::Sma(period), |price, average| {
            Some(signal::moving_average(price, average))
        })
    }

    fn ema(&self, period: usize) -> Result<Indicator> {
        let config = EmaConfig::try_from(period)?;
        self.single::<Ema>(config, IndicatorKind::Ema(period), |price, average| {
            Some(signal::moving_average(price, average))
        })
    }

    fn rsi(&self, period: usize) -> Result<Indicator> {
        let config = RsiConfig::try_from(period)?;
        self.single::<Rsi>(config, IndicatorKind::Rsi, |_, value| {
            Some(signal::rsi(value))
        })
    }

    fn macd(&self, params: MacdParams) -> Result<MacdIndicators> {
        let config = MacdConfig::new(params.fast, params.slow, params.signal)?;
        let values = Macd::calculate(config, &self.closes)?;
        let latest = self.latest(&values, config)?;

        let line_signal = signal::macd(latest.macd(), latest.signal());
        let indicators = MacdIndicators {
            macd_line: Indicator::new(
                IndicatorKind::MacdLine,
                latest.macd(),
                Some(line_signal),
                self.history(config, &values, |v| v.macd()),
            ),
            signal_line: Indicator::new(
                IndicatorKind::SignalLine,
                latest.signal(),
                Some(line_signal),
                self.history(config, &values, |v| v.signal()),
            ),
            histogram: Indicator::new(
                IndicatorKind::Histogram,
                latest.histogram(),
                Some(signal::histogram(latest.histogram())),
                self.history(config, &values, |v| v.histogram()),
            ),
        };

        debug!(%config, value = %latest, "indicator computed");
        Ok(indicators)
    }

    fn bollinger(&self, params: BollingerParams) -> Result<BollingerIndicators> {
        let length = std::num::NonZero::new(params.period).ok_or_else(|| {
            Error::InvalidConfiguration("Bollinger period must be positive".into())
        })?;
        let config = BbConfig::new(length, StdDev::new(params.std_dev_multiplier)?);
        let values = Bb::calculate(config, &self.closes)?;
        let latest = self.latest(&values, config)?;

        let indicators = BollingerIndicators {
            upper: Indicator::new(
                IndicatorKind::UpperBand,
                latest.upper(),
                Some(signal::upper_band(self.price, latest.upper())),
                self.history(config, &values, |v| v.upper()),
            ),
            middle: Indicator::new(
                IndicatorKind::MiddleBand,
                latest.middle(),
                None,
                self.history(config, &values, |v| v.middle()),
            ),
            lower: Indicator::new(
                IndicatorKind::LowerBand,
                latest.lower(),
                Some(signal::lower_band(self.price, latest.lower())),
                self.history(config, &values, |v| v.lower()),
            ),
        };

        debug!(%config, value = %latest, "indicator computed");
        Ok(indicators)
    }

    /// Runs a single-valued calculator and classifies its latest reading
    /// against the latest close.
    fn single<C>(
        &self,
        config: C::Config,
        kind: IndicatorKind,
        classify: impl Fn(Price, f64) -> Option<Signal>,
    ) -> Result<Indicator>
    where
        C: Calculator<Output = Price>,
    {
        let values = C::calculate(config, &self.closes)?;
        let value = self.latest(&values, config)?;

        debug!(indicator = %kind, value, "indicator computed");
        Ok(Indicator::new(
            kind,
            value,
            classify(self.price, value),
            self.history(config, &values, |&v| v),
        ))
    }

    fn latest<T: Copy>(&self, values: &[T], config: impl CalculatorConfig) -> Result<T> {
        values
            .last()
            .copied()
            .ok_or_else(|| Error::insufficient(config.required_bars(), self.closes.len()))
    }

    /// Pairs each output with the timestamp of the bar that completed it.
    fn history<T>(
        &self,
        config: impl CalculatorConfig,
        values: &[T],
        value: impl Fn(&T) -> f64,
    ) -> Vec<HistoryPoint> {
        self.bars
            .iter()
            .skip(config.warm_up() - 1)
            .zip(values)
            .map(|(bar, output)| HistoryPoint {
                timestamp: bar.timestamp,
                value: value(output),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{rising, series_from_closes};
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config)
    }

    mod config {
        use super::*;

        #[test]
        fn defaults() {
            let config = EngineConfig::default();
            assert_eq!(config.periods, BTreeSet::from([20, 50, 150, 200]));
            assert_eq!(config.ema_period, 20);
            assert_eq!(config.rsi_period, 14);
            assert_eq!(config.macd, MacdParams::default());
            assert_eq!(config.bollinger.period, 20);
            assert_eq!(config.bollinger.std_dev_multiplier, 2.0);
        }

        #[test]
        fn deserializes_camel_case_with_defaults() {
            let config: EngineConfig = serde_json::from_str(
                r#"{
                    "periods": [10, 10, 30],
                    "rsiPeriod": 7,
                    "macd": { "fast": 5 },
                    "bollinger": { "stdDevMultiplier": 2.5 }
                }"#,
            )
            .unwrap();

            assert_eq!(config.periods, BTreeSet::from([10, 30]));
            assert_eq!(config.rsi_period, 7);
            assert_eq!(config.ema_period, 20);
            assert_eq!(
                config.macd,
                MacdParams {
                    fast: 5,
                    slow: 26,
                    signal: 9
                }
            );
            assert_eq!(config.bollinger.period, 20);
            assert_eq!(config.bollinger.std_dev_multiplier, 2.5);
        }

        #[test]
        fn empty_object_is_default() {
            let config: EngineConfig = serde_json::from_str("{}").unwrap();
            assert_eq!(config, EngineConfig::default());
        }

        #[test]
        fn builder_overrides() {
            let config = EngineConfig::builder()
                .periods([5, 10])
                .ema_period(9)
                .rsi_period(21)
                .macd(3, 10, 16)
                .bollinger(10, 1.5)
                .build();

            assert_eq!(config.periods, BTreeSet::from([5, 10]));
            assert_eq!(config.ema_period, 9);
            assert_eq!(config.rsi_period, 21);
            assert_eq!(config.macd.slow, 10);
            assert_eq!(config.bollinger.std_dev_multiplier, 1.5);
        }
    }

    mod scenario {
        use super::*;

        fn bundle() -> IndicatorBundle {
            let series = series_from_closes(&rising(100.0, 30));
            engine(EngineConfig::builder().periods([20]).build())
                .compute_at(&series, as_of())
                .unwrap()
        }

        #[test]
        fn sma_20_is_mean_of_last_20_closes() {
            let bundle = bundle();
            let sma = bundle.sma(20).unwrap();
            assert_eq!(sma.value(), 119.5);
            assert_eq!(sma.signal(), Some(Signal::Buy));
        }

        #[test]
        fn rsi_saturates_and_sells() {
            let bundle = bundle();
            let rsi = bundle.rsi().unwrap();
            assert_eq!(rsi.value(), 100.0);
            assert_eq!(rsi.signal(), Some(Signal::Sell));
        }

        #[test]
        fn macd_omitted_below_35_bars() {
            let bundle = bundle();
            assert!(bundle.macd().is_none());
            assert_eq!(
                bundle.omission(IndicatorGroup::Macd),
                Some(&Error::insufficient(35, 30))
            );
        }

        #[test]
        fn stamps_supplied_time() {
            assert_eq!(bundle().last_updated(), as_of());
        }
    }

    mod history {
        use super::*;

        #[test]
        fn starts_at_first_full_window() {
            let series = series_from_closes(&rising(1.0, 10));
            let bundle = engine(EngineConfig::builder().periods([4]).build())
                .compute_at(&series, as_of())
                .unwrap();

            let history = bundle.sma(4).unwrap().history();
            assert_eq!(history.len(), 7);
            assert_eq!(history[0].timestamp, 3);
            assert_eq!(history[0].value, 2.5);
            assert_eq!(history.last().unwrap().timestamp, 9);
        }

        #[test]
        fn value_is_last_history_point() {
            let series = series_from_closes(&rising(1.0, 40));
            let bundle = engine(EngineConfig::default())
                .compute_at(&series, as_of())
                .unwrap();

            for indicator in bundle.indicators() {
                assert_eq!(
                    indicator.history().last().map(|p| p.value),
                    Some(indicator.value()),
                    "{}",
                    indicator.name()
                );
            }
        }

        #[test]
        fn macd_histories_are_aligned() {
            let series = series_from_closes(&rising(1.0, 40));
            let bundle = engine(EngineConfig::default())
                .compute_at(&series, as_of())
                .unwrap();
            let macd = bundle.macd().unwrap();

            assert_eq!(macd.macd_line.history().len(), 7);
            assert_eq!(macd.macd_line.history()[0].timestamp, 33);
            assert_eq!(
                macd.signal_line.history()[0].timestamp,
                macd.histogram.history()[0].timestamp
            );
        }
    }

    mod omissions {
        use super::*;

        #[test]
        fn short_series_omits_only_long_windows() {
            let series = series_from_closes(&rising(1.0, 90));
            let bundle = engine(EngineConfig::default())
                .compute_at(&series, as_of())
                .unwrap();

            assert!(bundle.sma(20).is_some());
            assert!(bundle.sma(50).is_some());
            assert!(bundle.sma(150).is_none());
            assert!(bundle.sma(200).is_none());
            assert_eq!(
                bundle.omission(IndicatorGroup::Sma(200)),
                Some(&Error::insufficient(200, 90))
            );
            assert!(bundle.ema().is_some());
            assert!(bundle.rsi().is_some());
            assert!(bundle.macd().is_some());
            assert!(bundle.bollinger_bands().is_some());
            assert_eq!(bundle.omitted().len(), 2);
        }

        #[test]
        fn invalid_parameters_are_per_indicator() {
            let series = series_from_closes(&rising(1.0, 60));
            let config = EngineConfig::builder()
                .periods([0, 10])
                .macd(26, 12, 9)
                .bollinger(20, -1.0)
                .build();
            let bundle = engine(config).compute_at(&series, as_of()).unwrap();

            assert!(bundle.sma(10).is_some());
            assert!(matches!(
                bundle.omission(IndicatorGroup::Sma(0)),
                Some(Error::InvalidConfiguration(_))
            ));
            assert!(matches!(
                bundle.omission(IndicatorGroup::Macd),
                Some(Error::InvalidConfiguration(_))
            ));
            assert!(matches!(
                bundle.omission(IndicatorGroup::BollingerBands),
                Some(Error::InvalidConfiguration(_))
            ));
            assert!(bundle.rsi().is_some());
        }

        #[test]
        fn single_bar_still_returns_bundle() {
            let series = series_from_closes(&[42.0]);
            let bundle = engine(EngineConfig::builder().periods([1]).build())
                .compute_at(&series, as_of())
                .unwrap();

            assert_eq!(bundle.sma(1).unwrap().value(), 42.0);
            assert!(bundle.rsi().is_none());
        }
    }

    mod series_errors {
        use super::*;

        #[test]
        fn empty_series_fails() {
            let err = Engine::default()
                .compute_at(&PriceSeries::default(), as_of())
                .unwrap_err();
            assert!(matches!(err, Error::InvalidSeries(_)));
        }

        #[test]
        fn non_finite_close_fails() {
            let err = Engine::default()
                .compute(&series_from_closes(&[1.0, f64::NAN, 3.0]))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidSeries(_)));
        }
    }

    mod signals {
        use super::*;

        #[test]
        fn downtrend_signals() {
            let closes: Vec<f64> = rising(1.0, 60).into_iter().rev().collect();
            let bundle = engine(EngineConfig::default())
                .compute_at(&series_from_closes(&closes), as_of())
                .unwrap();

            assert_eq!(bundle.sma(20).unwrap().signal(), Some(Signal::Sell));
            assert_eq!(bundle.rsi().unwrap().signal(), Some(Signal::Buy));
            let bands = bundle.bollinger_bands().unwrap();
            assert_eq!(bands.middle.signal(), None);
            assert_eq!(bands.upper.signal(), Some(Signal::Neutral));
        }

        #[test]
        fn flat_series_touches_both_bands() {
            let bundle = engine(EngineConfig::builder().periods([20]).build())
                .compute_at(&series_from_closes(&[50.0; 25]), as_of())
                .unwrap();

            let bands = bundle.bollinger_bands().unwrap();
            assert_eq!(bands.upper.signal(), Some(Signal::Sell));
            assert_eq!(bands.lower.signal(), Some(Signal::Buy));
            assert_eq!(bundle.sma(20).unwrap().signal(), Some(Signal::Sell));
        }

        #[test]
        fn inexact_flat_series_touches_both_bands() {
            for price in [100.1, 0.1, 33.33] {
                let bundle = engine(EngineConfig::builder().periods([20]).build())
                    .compute_at(&series_from_closes(&[price; 40]), as_of())
                    .unwrap();

                let bands = bundle.bollinger_bands().unwrap();
                assert_eq!(bands.upper.value(), price);
                assert_eq!(bands.lower.value(), price);
                assert_eq!(bands.upper.signal(), Some(Signal::Sell), "{price}");
                assert_eq!(bands.lower.signal(), Some(Signal::Buy), "{price}");
            }
        }
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let closes: Vec<f64> = (0..250)
            .map(|i| 100.0 + (f64::from(i) * 0.37).sin() * 8.0 + f64::from(i) * 0.05)
            .collect();
        let series = series_from_closes(&closes);
        let engine = Engine::default();

        assert_eq!(
            engine.compute_at(&series, as_of()).unwrap(),
            engine.compute_at(&series, as_of()).unwrap()
        );
    }

    #[test]
    fn does_not_mutate_input() {
        let series = series_from_closes(&rising(10.0, 50));
        let before = series.clone();
        let bundle = Engine::default().compute_at(&series, as_of()).unwrap();
        assert_eq!(series, before);
        assert_eq!(bundle.prices(), &before);
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
        assert_send_sync::<EngineConfig>();
    }
}
