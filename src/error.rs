use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpicityError` and maps other errors to
/// convert to an `EpicityError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpicityError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    /// A population count outside `0..=CITY_MAX_POPULATION`.
    InvalidPopulation(i64),
    /// A negative quota supplied by the caller.
    InvalidQuota(i64),
    EpicityError(String),
}

impl From<io::Error> for EpicityError {
    fn from(error: io::Error) -> Self {
        EpicityError::IoError(error)
    }
}

impl From<serde_json::Error> for EpicityError {
    fn from(error: serde_json::Error) -> Self {
        EpicityError::JsonError(error)
    }
}

impl From<String> for EpicityError {
    fn from(error: String) -> Self {
        EpicityError::EpicityError(error)
    }
}

impl From<&str> for EpicityError {
    fn from(error: &str) -> Self {
        EpicityError::EpicityError(error.to_string())
    }
}

impl std::error::Error for EpicityError {}

impl Display for EpicityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {self:?}")?;
        Ok(())
    }
}
