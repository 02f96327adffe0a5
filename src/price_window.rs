use crate::Price;
use std::collections::VecDeque;

/// Fixed-size trailing window over a price stream.
#[derive(Clone, Debug)]
pub(crate) struct PriceWindow {
    size: usize,
    window: VecDeque<Price>,
    /// Running sum of values in the window. Maintained incrementally via
    /// add/subtract, may accumulate FP rounding drift over very long runs,
    /// but negligible for typical window sizes on financial data.
    sum: Price,
}

impl PriceWindow {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            window: VecDeque::with_capacity(size),
            sum: 0.0,
        }
    }

    #[inline]
    pub fn add(&mut self, price: Price) {
        if self.is_ready()
            && let Some(old_price) = self.window.pop_front()
        {
            self.sum -= old_price;
        }

        self.window.push_back(price);
        self.sum += price;
    }

    #[inline]
    pub fn sum(&self) -> Option<Price> {
        self.is_ready().then_some(self.sum)
    }

    /// Mean and population variance of a full window.
    ///
    /// Recomputed from the stored prices, shifted by the oldest one, so a
    /// window of identical prices yields exactly that price and zero variance.
    pub fn mean_and_variance(&self) -> Option<(Price, f64)> {
        if !self.is_ready() {
            return None;
        }
        let &pivot = self.window.front()?;

        #[allow(clippy::cast_precision_loss)]
        let n = self.size as f64;
        let shift = self.window.iter().map(|p| p - pivot).sum::<f64>() / n;
        let variance = self
            .window
            .iter()
            .map(|p| {
                let deviation = (p - pivot) - shift;
                deviation * deviation
            })
            .sum::<f64>()
            / n;

        Some((pivot + shift, variance))
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.window.len() == self.size
    }
}
