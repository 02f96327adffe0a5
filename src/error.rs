use serde::{Serialize, Serializer};

/// Errors produced while computing indicators.
///
/// Only [`Error::InvalidSeries`] fails a whole
/// [`Engine::compute`](crate::Engine::compute) call. The other two variants
/// are scoped to a single indicator: the engine records them as an
/// [`Omission`](crate::Omission) and carries on.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The series is shorter than the indicator's minimum window.
    #[error("insufficient data: {required} bars required, {available} available")]
    InsufficientData { required: usize, available: usize },

    /// The series is empty or contains a non-finite price.
    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    /// A period or multiplier is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn insufficient(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
