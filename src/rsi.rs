use std::{fmt::Display, num::NonZero};

use crate::{Calculator, CalculatorConfig, Error, Price};

/// Configuration for the Relative Strength Index ([`Rsi`])
/// calculator.
///
/// RSI uses Wilder's smoothing, which has infinite memory: the
/// SMA seed (first `length` price changes) influences all
/// subsequent values. Output begins at bar `length + 1`.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{CalculatorConfig, RsiConfig};
/// use std::num::NonZero;
///
/// let config = RsiConfig::new(NonZero::new(14).unwrap());
/// assert_eq!(config.length(), 14);
/// assert_eq!(config.warm_up(), 15);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RsiConfig {
    length: NonZero<usize>,
}

impl CalculatorConfig for RsiConfig {
    /// `length` deltas need `length + 1` prices.
    #[inline]
    fn warm_up(&self) -> usize {
        self.length.get() + 1
    }
}

impl RsiConfig {
    /// RSI on closing price.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self { length }
    }

    /// Number of price changes averaged.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }
}

impl TryFrom<usize> for RsiConfig {
    type Error = Error;

    fn try_from(length: usize) -> Result<Self, Self::Error> {
        NonZero::new(length)
            .map(Self::new)
            .ok_or_else(|| Error::InvalidConfiguration("RSI period must be positive".into()))
    }
}

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({})", self.length)
    }
}

#[derive(Clone, Copy, Debug)]
enum RsiPhase {
    Seeding {
        sum_gain: f64,
        sum_loss: f64,
        deltas: usize,
    },
    Active {
        avg_gain: f64,
        avg_loss: f64,
    },
}

/// Relative Strength Index (RSI) with Wilder's smoothing.
///
/// Measures the speed and magnitude of recent price changes on
/// a 0–100 scale. Values above 70 are conventionally considered
/// overbought; below 30, oversold.
///
/// The first `length` price changes are averaged with a simple
/// mean (SMA seed). After seeding, gains and losses are smoothed
/// with Wilder's method:
///
/// ```text
/// avg_gain = (prev_avg_gain × (length − 1) + gain) / length
/// avg_loss = (prev_avg_loss × (length − 1) + loss) / length
/// RSI      = 100 − 100 / (1 + avg_gain / avg_loss)
/// ```
///
/// When `avg_loss` is zero the RSI saturates at 100.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{Rsi, RsiConfig};
/// use std::num::NonZero;
///
/// let mut rsi = Rsi::new(RsiConfig::new(NonZero::new(3).unwrap()));
///
/// // Seeding: need 3 price changes (4 prices)
/// assert_eq!(rsi.compute(10.0), None);
/// assert_eq!(rsi.compute(12.0), None);
/// assert_eq!(rsi.compute(11.0), None);
///
/// // changes = +2, −1, +2 → avg_gain=4/3, avg_loss=1/3 → RS=4 → RSI=80
/// assert_eq!(rsi.compute(13.0), Some(80.0));
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    previous: Option<Price>,
    phase: RsiPhase,
    current: Option<Price>,
    length: f64,
    length_minus_one: f64,
}

impl Calculator for Rsi {
    type Config = RsiConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            previous: None,
            phase: RsiPhase::Seeding {
                sum_gain: 0.0,
                sum_loss: 0.0,
                deltas: 0,
            },
            current: None,
            #[allow(clippy::cast_precision_loss)]
            length: config.length() as f64,
            #[allow(clippy::cast_precision_loss)]
            length_minus_one: (config.length() - 1) as f64,
        }
    }

    #[inline]
    fn config(&self) -> &RsiConfig {
        &self.config
    }

    #[inline]
    fn compute(&mut self, price: Price) -> Option<Self::Output> {
        // First price: no change yet
        let previous = self.previous.replace(price)?;

        let (gain, loss) = Self::gain_and_loss(previous, price);

        self.phase = match self.phase {
            RsiPhase::Seeding {
                sum_gain,
                sum_loss,
                deltas,
            } => {
                let (sum_gain, sum_loss, deltas) = (sum_gain + gain, sum_loss + loss, deltas + 1);

                if deltas == self.config.length() {
                    RsiPhase::Active {
                        avg_gain: sum_gain / self.length,
                        avg_loss: sum_loss / self.length,
                    }
                } else {
                    RsiPhase::Seeding {
                        sum_gain,
                        sum_loss,
                        deltas,
                    }
                }
            }
            RsiPhase::Active { avg_gain, avg_loss } => RsiPhase::Active {
                avg_gain: avg_gain.mul_add(self.length_minus_one, gain) / self.length,
                avg_loss: avg_loss.mul_add(self.length_minus_one, loss) / self.length,
            },
        };

        self.current = match self.phase {
            RsiPhase::Seeding { .. } => None,
            RsiPhase::Active { avg_gain, avg_loss } => {
                Some(Self::rsi_from_averages(avg_gain, avg_loss))
            }
        };

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Rsi {
    #[inline]
    fn gain_and_loss(prev_price: Price, price: Price) -> (Price, Price) {
        let change = price - prev_price;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        (gain, loss)
    }

    #[inline]
    fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({})", self.config.length)
    }
}
