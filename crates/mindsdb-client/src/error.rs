use forecast_core::ForecastError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MindsDbError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

pub type MindsDbResult<T> = Result<T, MindsDbError>;

impl From<MindsDbError> for ForecastError {
    fn from(e: MindsDbError) -> Self {
        ForecastError::UpstreamQuery(e.to_string())
    }
}
