//! Signal classification.
//!
//! Each function maps the latest reading of one indicator family to a
//! [`Signal`]. All rules compare the latest values only.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Price;

/// RSI strictly above this reads as overbought.
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// RSI strictly below this reads as oversold.
pub const RSI_OVERSOLD: f64 = 30.0;

/// Discrete trading signal attached to an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl Signal {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Neutral => "neutral",
        }
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SMA and EMA: price above its average is bullish. A tie is a sell.
#[must_use]
pub fn moving_average(price: Price, average: Price) -> Signal {
    if price > average {
        Signal::Buy
    } else {
        Signal::Sell
    }
}

/// Overbought RSI sells, oversold RSI buys. The thresholds themselves are
/// neutral.
#[must_use]
pub fn rsi(value: f64) -> Signal {
    if value > RSI_OVERBOUGHT {
        Signal::Sell
    } else if value < RSI_OVERSOLD {
        Signal::Buy
    } else {
        Signal::Neutral
    }
}

/// MACD line above its signal line is bullish.
#[must_use]
pub fn macd(macd_line: f64, signal_line: f64) -> Signal {
    if macd_line > signal_line {
        Signal::Buy
    } else {
        Signal::Sell
    }
}

#[must_use]
pub fn histogram(value: f64) -> Signal {
    if value > 0.0 { Signal::Buy } else { Signal::Sell }
}

/// Touching or piercing the upper band sells.
#[must_use]
pub fn upper_band(price: Price, upper: Price) -> Signal {
    if price >= upper {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

/// Touching or piercing the lower band buys.
#[must_use]
pub fn lower_band(price: Price, lower: Price) -> Signal {
    if price <= lower {
        Signal::Buy
    } else {
        Signal::Neutral
    }
}
