use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Upstream query failed: {0}")]
    UpstreamQuery(String),

    #[error("Upstream generation failed: {0}")]
    UpstreamGeneration(String),

    #[error("Expected {expected} '||'-separated fields in completion, found {found}")]
    PromptFormat { expected: usize, found: usize },

    #[error("Malformed query result: {0}")]
    MalformedTable(String),
}

pub type ForecastResult<T> = Result<T, ForecastError>;
