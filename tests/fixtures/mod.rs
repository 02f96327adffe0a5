#![allow(dead_code)]

use serde::{Deserialize, de::DeserializeOwned};
use tickerlens_ta::{Ohlcv, Price, PriceSeries, Timestamp};

/// Daily OHLCV bar parsed from the fixture CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub timestamp: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv for RefBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Reference value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub timestamp: u64,
    pub expected: f64,
}

/// Reference BB value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefBbValue {
    pub timestamp: u64,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Reference MACD value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefMacdValue {
    pub timestamp: u64,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

const OHLCV_PATH: &str = "tests/fixtures/data/synthetic-1d.csv";

/// Load the reference OHLCV bars.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Reference bars as a [`PriceSeries`].
pub fn load_reference_series() -> PriceSeries {
    PriceSeries::from_ohlcv(&load_reference_ohlcvs())
}

/// Load single-value reference data (SMA, EMA, RSI).
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

/// Load BB reference data (upper, middle, lower).
pub fn load_bb_ref(path: &str) -> Vec<RefBbValue> {
    load_records(path, "invalid BB reference record")
}

/// Load MACD reference data (macd, signal, histogram).
pub fn load_macd_ref(path: &str) -> Vec<RefMacdValue> {
    load_records(path, "invalid MACD reference record")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Generate streaming and batch reference tests for a single-value
/// calculator.
///
/// Usage: `reference_test!(sma_200, Sma, SmaConfig::new(nz(200)), "tests/fixtures/data/sma-200-close.csv", 1e-6);`
#[allow(unused_macros)]
macro_rules! reference_test {
    ($name:ident, $ind:ty, $config:expr, $ref_path:expr, $tolerance:expr) => {
        mod $name {
            use super::fixtures::*;
            use std::num::NonZero;
            use tickerlens_ta::*;

            fn nz(n: usize) -> NonZero<usize> {
                NonZero::new(n).unwrap()
            }

            #[test]
            fn matches_reference() {
                let bars = load_reference_ohlcvs();
                let reference = load_ref_values($ref_path);
                let mut ind = <$ind>::new($config);

                let mut ref_idx = 0;
                for bar in &bars {
                    ind.compute(bar.close);

                    if ref_idx < reference.len() && bar.timestamp == reference[ref_idx].timestamp
                    {
                        let value = ind.value().unwrap_or_else(|| {
                            panic!("{} returned None at t={}", stringify!($name), bar.timestamp)
                        });
                        assert_near(
                            value,
                            reference[ref_idx].expected,
                            $tolerance,
                            &format!(
                                "{} at bar {ref_idx} (t={})",
                                stringify!($name),
                                bar.timestamp
                            ),
                        );
                        ref_idx += 1;
                    }
                }

                assert_eq!(
                    ref_idx,
                    reference.len(),
                    "not all reference values checked: {ref_idx}/{}",
                    reference.len()
                );
            }

            #[test]
            fn batch_matches_reference() {
                let closes = load_reference_series().closes();
                let reference = load_ref_values($ref_path);
                let values = <$ind as Calculator>::calculate($config, &closes).unwrap();

                assert_eq!(values.len(), reference.len());
                for (i, (value, expected)) in values.iter().zip(&reference).enumerate() {
                    assert_near(
                        *value,
                        expected.expected,
                        $tolerance,
                        &format!("{} batch at {i}", stringify!($name)),
                    );
                }
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use reference_test;

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
