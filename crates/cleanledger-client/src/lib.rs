//! HTTP client for the finance tracker API
//!
//! Implements the core's remote collaborators over JSON:
//! - `PUT  /transactions/{id}`: save an edited transaction
//! - `POST /sanitizations`: register a sanitization rule
//! - `GET  /transactions?account=&page=`: all transactions of an account
//! - `GET  /transactions/unsanitized?account=&page=`: transactions still lacking a description

pub mod error;
pub mod token;

use async_trait::async_trait;
use cleanledger_config::Config;
use cleanledger_core::{
    CoreError, CoreResult, SanitizationRule, SanitizationStore, Transaction, TransactionPage,
    TransactionQuery, TransactionStore,
};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

pub use error::ApiError;
pub use token::{StaticTokenSource, TokenSource};

/// Client for the remote API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidConfig {
            message: format!("invalid base URL '{}': {}", base_url, e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfig {
                message: format!("base URL '{}' cannot carry a path", base_url),
            });
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
            Arc::new(StaticTokenSource::from_config(config)),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, ApiError> {
        let request = match self.tokens.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        Self::read(response, resource).await
    }

    async fn read<T: DeserializeOwned>(response: Response, resource: &str) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response.text().await.unwrap_or_default();
        log::debug!(
            target: "cleanledger::client",
            "{} answered {}: {}",
            resource,
            status,
            message
        );
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound {
                resource: resource.to_string(),
            },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::BadRequest { message }
            }
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn list(
        &self,
        segments: &[&str],
        account: &str,
        page: u32,
    ) -> Result<TransactionPage, ApiError> {
        let url = self.endpoint(segments);
        let resource = url.path().to_string();
        let request = self
            .http
            .get(url)
            .query(&[("account", account.to_string()), ("page", page.to_string())]);
        self.send(request, &resource).await
    }
}

#[async_trait]
impl TransactionStore for ApiClient {
    async fn update(&self, transaction: Transaction) -> CoreResult<Transaction> {
        let id = transaction.id.clone();
        let request = self
            .http
            .put(self.endpoint(&["transactions", &id]))
            .json(&transaction);
        self.send(request, "transaction")
            .await
            .map_err(|e| match e {
                ApiError::NotFound { .. } => CoreError::TransactionNotFound { id },
                other => other.into_core("update transaction"),
            })
    }
}

#[async_trait]
impl SanitizationStore for ApiClient {
    async fn add(&self, rule: SanitizationRule) -> CoreResult<SanitizationRule> {
        let request = self.http.post(self.endpoint(&["sanitizations"])).json(&rule);
        self.send(request, "sanitizations")
            .await
            .map_err(|e| e.into_core("add sanitization"))
    }
}

#[async_trait]
impl TransactionQuery for ApiClient {
    async fn list_all(&self, account: &str, page: u32) -> CoreResult<TransactionPage> {
        self.list(&["transactions"], account, page)
            .await
            .map_err(|e| e.into_core("list transactions"))
    }

    async fn list_unsanitized(&self, account: &str, page: u32) -> CoreResult<TransactionPage> {
        self.list(&["transactions", "unsanitized"], account, page)
            .await
            .map_err(|e| e.into_core("list unsanitized transactions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::response::{IntoResponse, Response as AxumResponse};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use cleanledger_core::{
        Backends, FinanceContext, QueryClient, RetryPolicy, SubmitOutcome, TransactionLists,
        TransactionType, UpdateWorkflow, ViewKey,
    };
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const TOKEN: &str = "test-token";

    #[derive(Clone, Default)]
    struct FakeApi {
        transactions: Arc<Mutex<Vec<Transaction>>>,
        rules: Arc<Mutex<Vec<serde_json::Value>>>,
        update_failures: Arc<AtomicU32>,
        update_calls: Arc<AtomicU32>,
        list_calls: Arc<AtomicU32>,
    }

    #[derive(Deserialize)]
    struct ListParams {
        account: String,
        page: u32,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == format!("Bearer {}", TOKEN))
    }

    async fn put_transaction(
        State(api): State<FakeApi>,
        Path(id): Path<String>,
        headers: HeaderMap,
        Json(tx): Json<Transaction>,
    ) -> AxumResponse {
        api.update_calls.fetch_add(1, Ordering::SeqCst);
        if !authorized(&headers) {
            return (HttpStatus::UNAUTHORIZED, "missing token").into_response();
        }
        if api
            .update_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return (HttpStatus::SERVICE_UNAVAILABLE, "try again").into_response();
        }
        let mut transactions = api.transactions.lock().unwrap();
        match transactions.iter_mut().find(|t| t.id == id) {
            Some(existing) => {
                *existing = tx.clone();
                Json(tx).into_response()
            }
            None => (HttpStatus::NOT_FOUND, "no such transaction").into_response(),
        }
    }

    async fn post_sanitization(
        State(api): State<FakeApi>,
        Json(rule): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        api.rules.lock().unwrap().push(rule.clone());
        Json(rule)
    }

    fn page_of(api: &FakeApi, params: &ListParams, unsanitized_only: bool) -> TransactionPage {
        api.list_calls.fetch_add(1, Ordering::SeqCst);
        let items = api
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.account == params.account)
            .filter(|t| !unsanitized_only || !t.is_sanitized())
            .cloned()
            .collect();
        TransactionPage {
            items,
            page: params.page,
            total_pages: 1,
        }
    }

    async fn list_all(
        State(api): State<FakeApi>,
        Query(params): Query<ListParams>,
    ) -> Json<TransactionPage> {
        Json(page_of(&api, &params, false))
    }

    async fn list_unsanitized(
        State(api): State<FakeApi>,
        Query(params): Query<ListParams>,
    ) -> Json<TransactionPage> {
        Json(page_of(&api, &params, true))
    }

    async fn spawn(api: FakeApi) -> String {
        let app = Router::new()
            .route("/api/transactions", get(list_all))
            .route("/api/transactions/unsanitized", get(list_unsanitized))
            .route("/api/transactions/:id", put(put_transaction))
            .route("/api/sanitizations", post(post_sanitization))
            .with_state(api);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn transaction(id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            raw_description: "STARBUCKS 1234".to_string(),
            sanitized_description: None,
            transaction_type: TransactionType::Income,
            category: None,
            subcategory: None,
            vendor: None,
            debit: None,
            credit: Some(Decimal::from(50)),
            account: "acc1".to_string(),
        }
    }

    fn fake_api() -> FakeApi {
        let api = FakeApi::default();
        api.transactions.lock().unwrap().push(transaction("1"));
        api
    }

    fn client(base_url: &str, token: Option<&str>) -> ApiClient {
        ApiClient::new(
            base_url,
            Duration::from_secs(5),
            Arc::new(StaticTokenSource::new(token.map(str::to_string))),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_building() {
        let client = client("http://localhost:8080/api/", None);
        assert_eq!(
            client.endpoint(&["transactions", "a b"]).as_str(),
            "http://localhost:8080/api/transactions/a%20b"
        );
        let tokens = Arc::new(StaticTokenSource::default());
        assert!(ApiClient::new("not a url", Duration::from_secs(1), tokens).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = Config::default();
        assert!(ApiClient::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_update_transaction() {
        let api = fake_api();
        let client = client(&spawn(api.clone()).await, Some(TOKEN));

        let mut tx = transaction("1");
        tx.sanitized_description = Some("Coffee".to_string());
        let saved = client.update(tx.clone()).await.unwrap();
        assert_eq!(saved, tx);
        assert!(api.transactions.lock().unwrap()[0].is_sanitized());
    }

    #[tokio::test]
    async fn test_update_unknown_transaction() {
        let client = client(&spawn(fake_api()).await, Some(TOKEN));
        let err = client.update(transaction("404")).await.unwrap_err();
        assert!(matches!(err, CoreError::TransactionNotFound { ref id } if id == "404"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let api = fake_api();
        let client = client(&spawn(api.clone()).await, None);
        let err = client.update(transaction("1")).await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let api = fake_api();
        api.update_failures.store(1, Ordering::SeqCst);
        let client = client(&spawn(api.clone()).await, Some(TOKEN));
        let err = client.update(transaction("1")).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_list_views() {
        let api = fake_api();
        api.transactions.lock().unwrap().push({
            let mut tx = transaction("2");
            tx.sanitized_description = Some("Rent".to_string());
            tx
        });
        let client = client(&spawn(api).await, Some(TOKEN));

        let all = client.list_all("acc1", 3).await.unwrap();
        assert_eq!(all.items.len(), 2);
        assert_eq!(all.page, 3);

        let unsanitized = client.list_unsanitized("acc1", 1).await.unwrap();
        assert_eq!(unsanitized.items.len(), 1);
        assert_eq!(unsanitized.items[0].id, "1");

        assert!(client.list_all("other", 1).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_workflow_over_http() {
        let api = fake_api();
        api.update_failures.store(1, Ordering::SeqCst);
        let client = Arc::new(client(&spawn(api.clone()).await, Some(TOKEN)));

        let cache = Arc::new(QueryClient::new(RetryPolicy::default()));
        let lists = TransactionLists::new(client.clone(), cache.clone());
        let before = lists.list_unsanitized("acc1", 1).await.unwrap();
        assert_eq!(before.items.len(), 1);

        let backends = Backends {
            transactions: client.clone(),
            sanitizations: client.clone(),
            invalidator: lists.invalidator(),
            retry: RetryPolicy::default(),
        };
        let workflow = UpdateWorkflow::new(
            "acc1",
            before.items[0].clone(),
            &FinanceContext::default(),
            backends,
        )
        .unwrap();
        workflow
            .edit(|form| {
                form.sanitized_description = "Coffee".to_string();
                form.vendor = "Cafe".to_string();
                form.register_rule = true;
            })
            .unwrap();
        workflow.add_keyword("STARBUCKS").unwrap();

        let outcome = workflow.submit().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::FullSuccess { rule: Some(_), .. }));
        assert_eq!(api.update_calls.load(Ordering::SeqCst), 2);

        let rules = api.rules.lock().unwrap().clone();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0]["keywords"], serde_json::json!(["STARBUCKS"]));
        assert_eq!(rules[0]["sanitizedDescription"], "Coffee");
        assert_eq!(rules[0]["vendor"], "Cafe");
        assert_eq!(rules[0]["type"], "INCOME");

        assert!(cache.is_stale(&ViewKey::unsanitized_transactions("acc1").with_page(1)));
        let after = lists.list_unsanitized("acc1", 1).await.unwrap();
        assert!(after.items.is_empty());
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
    }
}
