use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{Calculator, CalculatorConfig, Error, Price, Sma, SmaConfig};

/// Configuration for the Exponential Moving Average ([`Ema`])
/// calculator.
///
/// # Example
///
/// ```
/// use tickerlens_ta::EmaConfig;
/// use std::num::NonZero;
///
/// let config = EmaConfig::new(NonZero::new(20).unwrap());
///
/// assert_eq!(config.length(), 20);
/// assert!((config.alpha() - 2.0 / 21.0).abs() < f64::EPSILON);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    length: NonZero<usize>,
}

impl CalculatorConfig for EmaConfig {
    #[inline]
    fn warm_up(&self) -> usize {
        self.length.get()
    }
}

impl EmaConfig {
    /// EMA over closing prices with the given length.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self { length }
    }

    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }

    /// Smoothing factor `2 / (length + 1)`.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let length = self.length.get() as f64;
        2.0 / (length + 1.0)
    }
}

impl TryFrom<usize> for EmaConfig {
    type Error = Error;

    fn try_from(length: usize) -> Result<Self, Self::Error> {
        NonZero::new(length)
            .map(Self::new)
            .ok_or_else(|| Error::InvalidConfiguration("EMA period must be positive".into()))
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmaConfig({})", self.length)
    }
}

/// Exponential Moving Average (EMA).
///
/// A weighted moving average that gives more weight to recent
/// prices. Uses the standard smoothing factor
/// `α = 2 / (length + 1)`. Each value is computed as:
///
/// ```text
/// EMA = α × price + (1 − α) × prev_EMA
/// ```
///
/// The first `length` prices are collected to compute an SMA
/// seed value, which is also the first output. After seeding
/// each update is a single fused multiply-add.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{Ema, EmaConfig};
/// use std::num::NonZero;
///
/// let mut ema = Ema::new(EmaConfig::new(NonZero::new(3).unwrap()));
///
/// // Seeding phase: collecting SMA
/// assert_eq!(ema.compute(2.0), None);
/// assert_eq!(ema.compute(4.0), None);
///
/// // SMA seed = (2 + 4 + 6) / 3 = 4.0
/// assert_eq!(ema.compute(6.0), Some(4.0));
///
/// // EMA(3) α = 0.5: 8 × 0.5 + 4 × 0.5 = 6.0
/// assert_eq!(ema.compute(8.0), Some(6.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    seed: Sma,
    alpha: f64,
    current: Option<Price>,
}

impl Calculator for Ema {
    type Config = EmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            seed: Sma::new(SmaConfig::new(config.length)),
            alpha: config.alpha(),
            current: None,
        }
    }

    #[inline]
    fn config(&self) -> &EmaConfig {
        &self.config
    }

    #[inline]
    fn compute(&mut self, price: Price) -> Option<Price> {
        self.current = match self.current {
            Some(previous) => Some(self.alpha.mul_add(price - previous, previous)),
            None => self.seed.compute(price),
        };

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({})", self.config.length)
    }
}
