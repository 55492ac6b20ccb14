pub mod error;

pub use error::{MindsDbError, MindsDbResult};

use async_trait::async_trait;
use forecast_core::{ForecastResult, QueryBackend, QueryTable};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;

const DEFAULT_BASE_URL: &str = "https://cloud.mindsdb.com";

/// Connection settings for the MindsDB HTTP API
#[derive(Debug, Clone)]
pub struct MindsDbConfig {
    pub base_url: String,
    /// Login email. When unset no login is attempted.
    pub login: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl Default for MindsDbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login: None,
            password: None,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SqlRequest<'a> {
    query: &'a str,
}

/// Reply of `POST /api/sql/query`
#[derive(Debug, Deserialize)]
struct SqlResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    column_names: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
    #[serde(default)]
    error_message: Option<String>,
}

impl SqlResponse {
    fn into_table(self) -> MindsDbResult<QueryTable> {
        match self.kind.as_str() {
            "table" => Ok(QueryTable::new(self.column_names, self.data)),
            "ok" => Ok(QueryTable::default()),
            "error" => Err(MindsDbError::QueryFailed(
                self.error_message
                    .unwrap_or_else(|| "unknown error".to_string()),
            )),
            other => Err(MindsDbError::InvalidResponse(format!(
                "unexpected response type '{}'",
                other
            ))),
        }
    }
}

/// Client for the MindsDB SQL API.
///
/// The session cookie obtained at login is kept by the cookie store and sent
/// with every query.
pub struct MindsDbClient {
    client: Client,
    config: MindsDbConfig,
    session: OnceCell<()>,
}

impl MindsDbClient {
    pub fn new(config: MindsDbConfig) -> MindsDbResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            config,
            session: OnceCell::new(),
        })
    }

    async fn ensure_session(&self) -> MindsDbResult<()> {
        let (Some(email), Some(password)) = (
            self.config.login.as_deref(),
            self.config.password.as_deref(),
        ) else {
            return Ok(());
        };

        self.session
            .get_or_try_init(|| async {
                tracing::info!("Logging in to MindsDB at {}", self.config.base_url);
                let response = self
                    .client
                    .post(format!("{}/cloud/login", self.config.base_url))
                    .json(&LoginRequest { email, password })
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(MindsDbError::Auth(format!("HTTP {}: {}", status, body)));
                }
                tracing::info!("Connected to MindsDB");
                Ok::<(), MindsDbError>(())
            })
            .await
            .map(|_| ())
    }

    /// Execute a statement and return the raw table.
    pub async fn execute(&self, sql: &str) -> MindsDbResult<QueryTable> {
        self.ensure_session().await?;

        tracing::debug!("MindsDB query: {}", sql);
        let response = self
            .client
            .post(format!("{}/api/sql/query", self.config.base_url))
            .json(&SqlRequest { query: sql })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    MindsDbError::Auth(format!("HTTP {}: {}", status, body))
                }
                s if s.is_server_error() => {
                    MindsDbError::ServiceUnavailable(format!("HTTP {}: {}", status, body))
                }
                _ => MindsDbError::QueryFailed(format!("HTTP {}: {}", status, body)),
            });
        }

        let reply: SqlResponse = response
            .json()
            .await
            .map_err(|e| MindsDbError::InvalidResponse(e.to_string()))?;
        let table = reply.into_table()?;
        tracing::debug!("MindsDB returned {} rows", table.rows.len());
        Ok(table)
    }
}

#[async_trait]
impl QueryBackend for MindsDbClient {
    async fn query(&self, sql: &str) -> ForecastResult<QueryTable> {
        Ok(self.execute(sql).await?)
    }

    fn backend_name(&self) -> &'static str {
        "mindsdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn_fake(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String, login: Option<&str>) -> MindsDbClient {
        MindsDbClient::new(MindsDbConfig {
            base_url,
            login: login.map(str::to_string),
            password: login.map(|_| "secret".to_string()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_table_reply_decodes() {
        let reply: SqlResponse = serde_json::from_value(json!({
            "type": "table",
            "column_names": ["close", "date", "crypto_name"],
            "data": [[1.5, "2024-01-01", "Bitcoin"]]
        }))
        .unwrap();
        let table = reply.into_table().unwrap();
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.prediction_rows().unwrap()[0].close, 1.5);
    }

    #[test]
    fn test_ok_reply_is_empty_table() {
        let reply: SqlResponse = serde_json::from_value(json!({"type": "ok"})).unwrap();
        assert!(reply.into_table().unwrap().is_empty());
    }

    #[test]
    fn test_error_reply_is_query_failure() {
        let reply: SqlResponse = serde_json::from_value(json!({
            "type": "error",
            "error_code": 0,
            "error_message": "Table 'nope' not found"
        }))
        .unwrap();
        match reply.into_table() {
            Err(MindsDbError::QueryFailed(msg)) => assert!(msg.contains("nope")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_posts_query_and_logs_in_once() {
        let logins = Arc::new(AtomicUsize::new(0));
        let login_counter = logins.clone();

        let router = Router::new()
            .route(
                "/cloud/login",
                post(move |Json(body): Json<Value>| {
                    let counter = login_counter.clone();
                    async move {
                        assert_eq!(body["email"], "me@example.com");
                        counter.fetch_add(1, Ordering::SeqCst);
                        AxumStatus::OK
                    }
                }),
            )
            .route(
                "/api/sql/query",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "type": "table",
                        "column_names": ["crypto_name"],
                        "data": [[body["query"].clone()]]
                    }))
                }),
            );
        let client = client_for(spawn_fake(router).await, Some("me@example.com"));

        let first = client.execute("SELECT DISTINCT crypto_name FROM files.t;").await.unwrap();
        client.execute("SELECT 1;").await.unwrap();

        assert_eq!(
            first.string_column("crypto_name").unwrap(),
            vec!["SELECT DISTINCT crypto_name FROM files.t;".to_string()]
        );
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_is_auth_error() {
        let router = Router::new().route(
            "/cloud/login",
            post(|| async { (AxumStatus::UNAUTHORIZED, "bad credentials") }),
        );
        let client = client_for(spawn_fake(router).await, Some("me@example.com"));

        let err = client.execute("SELECT 1;").await.unwrap_err();
        assert!(matches!(err, MindsDbError::Auth(_)));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_unavailable() {
        let router = Router::new().route(
            "/api/sql/query",
            post(|| async { (AxumStatus::BAD_GATEWAY, "down") }),
        );
        let client = client_for(spawn_fake(router).await, None);

        let err = client.query("SELECT 1;").await.unwrap_err();
        assert!(err.to_string().contains("Service unavailable"));
    }
}
