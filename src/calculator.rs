use crate::{Error, Price, Result};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a [`Calculator`].
///
/// Every calculator has a corresponding config type that holds its
/// parameters. Configs are value types: cheap to copy, compare, and hash.
pub trait CalculatorConfig: Sized + Copy + PartialEq + Eq + Hash + Display + Debug {
    /// Number of prices consumed before the first output: the first value
    /// corresponds to input index `warm_up() - 1`.
    fn warm_up(&self) -> usize;

    /// Shortest input accepted by [`Calculator::calculate`].
    ///
    /// Equals [`warm_up`](Self::warm_up) unless the indicator asks for more
    /// history than its first output strictly needs.
    fn required_bars(&self) -> usize {
        self.warm_up()
    }
}

/// An incremental technical indicator over a price stream.
///
/// Calculators keep internal state and update on each call to
/// [`compute`](Calculator::compute). Output is `None` until the warm-up
/// window is populated, and `Some` on every call after that.
///
/// # Example
///
/// ```
/// use tickerlens_ta::{Calculator, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let mut sma = Sma::new(SmaConfig::new(NonZero::new(3).unwrap()));
///
/// assert_eq!(sma.compute(10.0), None);
/// assert_eq!(sma.compute(20.0), None);
/// assert_eq!(sma.compute(30.0), Some(20.0));
///
/// let series = Sma::calculate(SmaConfig::new(NonZero::new(3).unwrap()), &[1.0, 2.0, 3.0, 4.0, 5.0]);
/// assert_eq!(series, Ok(vec![2.0, 3.0, 4.0]));
/// ```
pub trait Calculator: Sized + Clone + Display + Debug {
    /// Configuration type for this calculator.
    type Config: CalculatorConfig;

    /// Computed output type. `f64` for simple indicators,
    /// a struct for composite ones (MACD, Bollinger Bands).
    type Output: Copy + Send + Sync + Display + Debug;

    /// Creates a new calculator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Returns the config this calculator was built with.
    fn config(&self) -> &Self::Config;

    /// Feeds the next price and returns the updated value,
    /// or `None` while warming up.
    fn compute(&mut self, price: Price) -> Option<Self::Output>;

    /// Returns the last computed value without advancing state,
    /// or `None` while warming up.
    fn value(&self) -> Option<Self::Output>;

    /// Runs a fresh calculator over `prices` and collects every defined
    /// output. Element 0 corresponds to `prices[config.warm_up() - 1]`.
    ///
    /// # Errors
    ///
    /// [`Error::InsufficientData`] if `prices` is shorter than
    /// [`required_bars`](CalculatorConfig::required_bars).
    fn calculate(config: Self::Config, prices: &[Price]) -> Result<Vec<Self::Output>> {
        let required = config.required_bars();
        if prices.len() < required {
            return Err(Error::insufficient(required, prices.len()));
        }

        let mut calculator = Self::new(config);

        Ok(prices
            .iter()
            .filter_map(|&price| calculator.compute(price))
            .collect())
    }
}
