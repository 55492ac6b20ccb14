use forecast_core::ForecastError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CohereError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("No generations returned")]
    EmptyGeneration,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CohereResult<T> = Result<T, CohereError>;

impl From<CohereError> for ForecastError {
    fn from(e: CohereError) -> Self {
        ForecastError::UpstreamGeneration(e.to_string())
    }
}
