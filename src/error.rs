/// Errors raised while validating problems and solver settings.
///
/// The numeric core itself never fails once its inputs pass these checks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("length mismatch: {points} data points but {labels} labels")]
    LengthMismatch { points: usize, labels: usize },

    #[error("non-finite feature value in data point {row}")]
    NonFiniteFeature { row: usize },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            reason: format!("expected a finite positive number, got {}", value),
        })
    }
}

pub(crate) fn check_nonzero(name: &'static str, value: usize) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            reason: "must be at least 1".to_string(),
        })
    }
}
