use std::{fmt::Display, num::NonZero};

use crate::{Calculator, CalculatorConfig, Ema, EmaConfig, Error, Price, Result};

const DEFAULT_FAST: NonZero<usize> = NonZero::new(12).unwrap();
const DEFAULT_SLOW: NonZero<usize> = NonZero::new(26).unwrap();
const DEFAULT_SIGNAL: NonZero<usize> = NonZero::new(9).unwrap();

/// Configuration for the Moving Average Convergence/Divergence
/// ([`Macd`]) calculator.
///
/// The fast period must be shorter than the slow one. This is stricter than
/// the formula needs (`fast == slow` gives a flat zero line): the warm-up and
/// the required bar count are both taken from the slow EMA, which only holds
/// while it is the longer of the two.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{CalculatorConfig, MacdConfig};
///
/// let config = MacdConfig::default();
/// assert_eq!((config.fast(), config.slow(), config.signal()), (12, 26, 9));
/// assert_eq!(config.warm_up(), 34);
///
/// assert!(MacdConfig::new(26, 12, 9).is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MacdConfig {
    fast: NonZero<usize>,
    slow: NonZero<usize>,
    signal: NonZero<usize>,
}

impl CalculatorConfig for MacdConfig {
    /// Slow EMA seed plus the signal EMA seed over the MACD line.
    #[inline]
    fn warm_up(&self) -> usize {
        self.slow.get() + self.signal.get() - 1
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.slow.get() + self.signal.get()
    }
}

impl MacdConfig {
    /// Builds a MACD config from raw periods.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if any period is zero or
    /// `fast >= slow`.
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self> {
        let period = |value: usize, name: &str| {
            NonZero::new(value).ok_or_else(|| {
                Error::InvalidConfiguration(format!("MACD {name} period must be positive"))
            })
        };

        let (fast, slow, signal) = (
            period(fast, "fast")?,
            period(slow, "slow")?,
            period(signal, "signal")?,
        );

        if fast >= slow {
            return Err(Error::InvalidConfiguration(format!(
                "MACD fast period ({fast}) must be shorter than slow period ({slow})"
            )));
        }

        Ok(Self { fast, slow, signal })
    }

    #[inline]
    #[must_use]
    pub fn fast(&self) -> usize {
        self.fast.get()
    }

    #[inline]
    #[must_use]
    pub fn slow(&self) -> usize {
        self.slow.get()
    }

    #[inline]
    #[must_use]
    pub fn signal(&self) -> usize {
        self.signal.get()
    }
}

/// MACD(12, 26, 9).
impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
        }
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdConfig({}, {}, {})",
            self.fast, self.slow, self.signal
        )
    }
}

/// MACD output: the MACD line, its signal line, and the histogram.
///
/// ```text
/// macd      = EMA(fast) − EMA(slow)
/// signal    = EMA(signal) of macd
/// histogram = macd − signal
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    macd: Price,
    signal: Price,
    histogram: Price,
}

impl MacdValue {
    /// Fast EMA minus slow EMA.
    #[inline]
    #[must_use]
    pub fn macd(&self) -> Price {
        self.macd
    }

    /// EMA of the MACD line.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Price {
        self.signal
    }

    /// `macd − signal`.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> Price {
        self.histogram
    }
}

impl Display for MacdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD(m: {}, s: {}, h: {})",
            self.macd, self.signal, self.histogram
        )
    }
}

/// Moving Average Convergence/Divergence (MACD).
///
/// Runs a fast and a slow [`Ema`] over the same prices; once the slow EMA
/// is seeded their spread forms the MACD line, which feeds a third EMA (the
/// signal line). Output starts when the signal line is seeded, so all three
/// values of every [`MacdValue`] are defined.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{Calculator, Macd, MacdConfig};
///
/// let mut macd = Macd::new(MacdConfig::new(2, 3, 2).unwrap());
///
/// assert_eq!(macd.compute(1.0), None);
/// assert_eq!(macd.compute(2.0), None); // fast seeded
/// assert_eq!(macd.compute(3.0), None); // slow seeded, first MACD line value
///
/// let value = macd.compute(4.0).unwrap(); // signal seeded
/// assert!((value.histogram() - (value.macd() - value.signal())).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
    fast: Ema,
    slow: Ema,
    signal: Ema,
    current: Option<MacdValue>,
}

impl Calculator for Macd {
    type Config = MacdConfig;
    type Output = MacdValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            fast: Ema::new(EmaConfig::new(config.fast)),
            slow: Ema::new(EmaConfig::new(config.slow)),
            signal: Ema::new(EmaConfig::new(config.signal)),
            current: None,
        }
    }

    #[inline]
    fn config(&self) -> &MacdConfig {
        &self.config
    }

    #[inline]
    fn compute(&mut self, price: Price) -> Option<Self::Output> {
        let fast = self.fast.compute(price);
        let slow = self.slow.compute(price);

        self.current = match (fast, slow) {
            (Some(fast), Some(slow)) => {
                let macd = fast - slow;

                self.signal.compute(macd).map(|signal| MacdValue {
                    macd,
                    signal,
                    histogram: macd - signal,
                })
            }
            _ => None,
        };

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({}, {}, {})",
            self.config.fast, self.config.slow, self.config.signal
        )
    }
}
