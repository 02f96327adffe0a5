use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{Calculator, CalculatorConfig, Error, Price, price_window::PriceWindow};

/// Configuration for the Simple Moving Average ([`Sma`]) calculator.
///
/// # Example
///
/// ```rust
/// use tickerlens_ta::SmaConfig;
/// use std::num::NonZero;
///
/// let config = SmaConfig::new(NonZero::new(20).unwrap());
/// assert_eq!(config.length(), 20);
///
/// assert!(SmaConfig::try_from(0).is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SmaConfig {
    length: NonZero<usize>,
}

impl CalculatorConfig for SmaConfig {
    #[inline]
    fn warm_up(&self) -> usize {
        self.length.get()
    }
}

impl SmaConfig {
    /// SMA over `length` closing prices.
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
}

impl TryFrom<usize> for SmaConfig {
    type Error = Error;

    fn try_from(length: usize) -> Result<Self, Self::Error> {
        NonZero::new(length)
            .map(Self::new)
            .ok_or_else(|| Error::InvalidConfiguration("SMA period must be positive".into()))
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SmaConfig({})", self.length)
    }
}

/// Simple Moving Average (SMA).
///
/// Computes the unweighted mean of the last *n* prices, where *n* is the
/// configured window length. Returns `None` until the window is full.
///
/// Uses a running sum for O(1) updates per price.
///
/// # Example
///
/// ```rust
/// use tickerlens_ta::{Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let mut sma = Sma::new(SmaConfig::new(NonZero::new(3).unwrap()));
///
/// assert_eq!(sma.compute(10.0), None);
/// assert_eq!(sma.compute(20.0), None);
/// assert_eq!(sma.compute(30.0), Some(20.0));
/// ```
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
    window: PriceWindow,
    length: f64,
    current: Option<Price>,
}

impl Calculator for Sma {
    type Config = SmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            window: PriceWindow::new(config.length()),
            #[allow(clippy::cast_precision_loss)]
            length: config.length() as f64,
            current: None,
        }
    }

    #[inline]
    fn config(&self) -> &SmaConfig {
        &self.config
    }

    #[inline]
    fn compute(&mut self, price: Price) -> Option<Price> {
        self.window.add(price);

        self.current = self.window.sum().map(|sum| sum / self.length);

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({})", self.config.length)
    }
}
