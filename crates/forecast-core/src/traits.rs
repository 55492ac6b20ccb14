use async_trait::async_trait;
use crate::{ForecastResult, QueryTable};

/// SQL-like query backend (MindsDB in production)
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Run a statement and return its tabular result.
    async fn query(&self, sql: &str) -> ForecastResult<QueryTable>;

    fn backend_name(&self) -> &'static str;
}

/// Hosted text-generation backend (Cohere in production)
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the first completion generated for `prompt`.
    async fn generate(&self, prompt: &str) -> ForecastResult<String>;

    fn backend_name(&self) -> &'static str;
}
