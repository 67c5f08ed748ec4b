use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use membership::{
    application::customer::{CustomerService, CustomerServiceError, InterestSummary, ModelSummary},
    domain::customer::{
        Customer, CustomerFilter, CustomerKey, CustomerPatch, CustomerSort, NewCustomer,
    },
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

/// 共有状態
pub type AppState = Arc<CustomerService>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/:id",
            get(find_customer)
                .put(update_customer)
                .delete(delete_customer),
        )
        .route("/stats/interests", get(interest_summary))
        .route("/stats/models", get(model_summary))
        .route("/stats/count", get(count_customers))
        .with_state(state)
}

/// エラーレスポンス
///
/// 本文は `{"error": "<message>"}`。サーバーエラーの詳細はログにのみ出力する。
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Customer not found")
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// サービスエラーを変換する。`failure` はサーバーエラー時の文言。
    fn from_service(error: CustomerServiceError, failure: &str) -> Self {
        match error {
            CustomerServiceError::NotFound => Self::not_found(),
            CustomerServiceError::Conflict => Self::bad_request("Member number already exists"),
            CustomerServiceError::Exhausted => Self::bad_request("No member number available"),
            CustomerServiceError::Validation(e) => Self::bad_request(e.to_string()),
            CustomerServiceError::DataAccess(e) => {
                error!("{}: {}", failure, e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, failure)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::bad_request(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::bad_request(value.body_text())
    }
}

fn parse_key(id: &str) -> Result<CustomerKey, ApiError> {
    CustomerKey::parse(id).ok_or_else(ApiError::not_found)
}

/// 一覧・件数の検索条件
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    interest: Option<String>,
    model: Option<String>,
    born_from: Option<DateTime<Utc>>,
    born_to: Option<DateTime<Utc>>,
    #[serde(default)]
    sort: CustomerSort,
}

impl From<&ListQuery> for CustomerFilter {
    fn from(value: &ListQuery) -> Self {
        let mut filter = CustomerFilter::all().born_between(value.born_from, value.born_to);
        if let Some(interest) = &value.interest {
            filter = filter.with_interest(interest.as_str());
        }
        if let Some(model) = &value.model {
            filter = filter.with_model(model.as_str());
        }
        filter
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn list_customers(
    State(service): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let Query(query) = query?;
    service
        .list(&CustomerFilter::from(&query), query.sort)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Failed to fetch customers"))
}

async fn create_customer(
    State(service): State<AppState>,
    body: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let Json(new) = body?;
    service
        .create(new)
        .await
        .map(|customer| (StatusCode::CREATED, Json(customer)))
        .map_err(|e| ApiError::from_service(e, "Failed to create customer"))
}

async fn find_customer(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    service
        .find(parse_key(&id)?)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Failed to fetch customer"))
}

async fn update_customer(
    State(service): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CustomerPatch>, JsonRejection>,
) -> Result<Json<Customer>, ApiError> {
    let key = parse_key(&id)?;
    let Json(patch) = body?;
    service
        .update(key, patch)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Failed to update customer"))
}

async fn delete_customer(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    service
        .delete(parse_key(&id)?)
        .await
        .map(|_| Json(json!({ "message": "Customer deleted successfully" })))
        .map_err(|e| ApiError::from_service(e, "Failed to delete customer"))
}

async fn interest_summary(
    State(service): State<AppState>,
) -> Result<Json<Vec<InterestSummary>>, ApiError> {
    service
        .interest_summary()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Failed to summarize interests"))
}

async fn model_summary(
    State(service): State<AppState>,
) -> Result<Json<Vec<ModelSummary>>, ApiError> {
    service
        .model_summary()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Failed to summarize models"))
}

async fn count_customers(
    State(service): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    service
        .count(&CustomerFilter::from(&query))
        .await
        .map(|count| Json(json!({ "count": count })))
        .map_err(|e| ApiError::from_service(e, "Failed to count customers"))
}
