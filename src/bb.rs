use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    num::NonZero,
};

use crate::{
    Calculator, CalculatorConfig, Error, Price, Result, price_window::PriceWindow,
};

const DEFAULT_LENGTH: NonZero<usize> = NonZero::new(20).unwrap();

/// Standard deviation multiplier for Bollinger Bands.
///
/// Wraps a positive, finite `f64`. Defaults to `2.0` (the standard
/// Bollinger Bands setting).
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct StdDev(f64);

impl StdDev {
    /// Creates a new standard deviation multiplier.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if `value` is zero, negative, NaN or
    /// infinite.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidConfiguration(format!(
                "Bollinger multiplier must be a positive finite number, got {value}"
            )))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for StdDev {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for StdDev {}

impl Hash for StdDev {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for StdDev {
    fn default() -> Self {
        Self(2.0)
    }
}

/// Configuration for the Bollinger Bands ([`Bb`]) calculator.
///
/// # Convergence
///
/// Bollinger Bands use an SMA for the middle band. Like SMA, values are exact
/// once the window is full, there is no warm-up bias to suppress.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{BbConfig, StdDev};
/// use std::num::NonZero;
///
/// // Default: length 20, 2.0 std devs
/// let config = BbConfig::default();
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.std_dev(), StdDev::default());
///
/// let wide = BbConfig::new(NonZero::new(20).unwrap(), StdDev::new(2.5).unwrap());
/// assert_eq!(wide.std_dev().value(), 2.5);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BbConfig {
    length: NonZero<usize>,
    std_dev: StdDev,
}

impl CalculatorConfig for BbConfig {
    #[inline]
    fn warm_up(&self) -> usize {
        self.length.get()
    }
}

impl BbConfig {
    #[must_use]
    pub fn new(length: NonZero<usize>, std_dev: StdDev) -> Self {
        Self { length, std_dev }
    }

    /// BB with custom length, 2σ.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::new(length, StdDev::default())
    }

    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }

    /// Standard deviation multiplier for the upper and lower bands.
    #[inline]
    #[must_use]
    pub fn std_dev(&self) -> StdDev {
        self.std_dev
    }
}

/// BB(20, 2σ), the standard Bollinger Bands setting.
impl Default for BbConfig {
    fn default() -> Self {
        Self::close(DEFAULT_LENGTH)
    }
}

impl Display for BbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BbConfig({}, {})", self.length, self.std_dev.value())
    }
}

/// Bollinger Bands output: upper, middle, and lower bands.
///
/// The middle band is the SMA. Upper and lower bands are offset by
/// `std_dev × σ`, where `σ` is the population standard deviation of the window.
///
/// ```text
/// upper  = SMA + k × σ
/// middle = SMA
/// lower  = SMA − k × σ
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BbValue {
    upper: Price,
    middle: Price,
    lower: Price,
}

impl BbValue {
    /// Upper band: `SMA + k × σ`.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// Middle band: SMA of the window.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    /// Lower band: `SMA − k × σ`.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }
}

impl Display for BbValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB(u: {}, m: {}, l: {})",
            self.upper, self.middle, self.lower
        )
    }
}

/// Bollinger Bands (BB).
///
/// A volatility indicator consisting of three bands: a simple moving average
/// (middle) with upper and lower bands offset by a configurable number of
/// standard deviations.
///
/// Mean and σ are recomputed from the window on every price, shifted by the
/// oldest price in the window. A flat window therefore collapses all three
/// bands onto the price exactly, and a small spread around a large mean keeps
/// its σ.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{Bb, BbConfig, Calculator};
///
/// let mut bb = Bb::new(BbConfig::default());
///
/// # for _ in 1..20 { bb.compute(100.0); }
/// if let Some(value) = bb.compute(100.0) {
///     println!("upper: {}, middle: {}, lower: {}",
///         value.upper(), value.middle(), value.lower());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Bb {
    config: BbConfig,
    std_dev_multiplier: f64,
    window: PriceWindow,
    current: Option<BbValue>,
}

impl Calculator for Bb {
    type Config = BbConfig;
    type Output = BbValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            std_dev_multiplier: config.std_dev.value(),
            window: PriceWindow::new(config.length()),
            current: None,
        }
    }

    #[inline]
    fn config(&self) -> &BbConfig {
        &self.config
    }

    #[inline]
    fn compute(&mut self, price: Price) -> Option<Self::Output> {
        self.window.add(price);

        self.current = self.window.mean_and_variance().map(|(mean, variance)| {
            let offset = variance.sqrt() * self.std_dev_multiplier;
            Self::Output {
                upper: mean + offset,
                middle: mean,
                lower: mean - offset,
            }
        });

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Display for Bb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB({}, {})",
            self.config.length, self.std_dev_multiplier,
        )
    }
}
