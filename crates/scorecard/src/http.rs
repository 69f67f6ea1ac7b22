use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::import::{ImportError, ImportReport};
use crate::periods::PeriodId;
use crate::scorecards::common::ScorecardError;

/// `?period_id=` filter shared by the indicator listing and import routes.
#[derive(Debug, Deserialize)]
pub(crate) struct PeriodQuery {
    pub(crate) period_id: PeriodId,
}

/// `Json` extractor whose rejections carry the `{"error"}` body.
#[derive(Debug)]
pub(crate) struct ApiJson<T>(pub(crate) T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_response(rejection.status(), rejection.body_text())),
        }
    }
}

/// `Path` extractor whose rejections carry the `{"error"}` body.
#[derive(Debug)]
pub(crate) struct ApiPath<T>(pub(crate) T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_response(rejection.status(), rejection.body_text())),
        }
    }
}

/// `Query` extractor whose rejections carry the `{"error"}` body.
#[derive(Debug)]
pub(crate) struct ApiQuery<T>(pub(crate) T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_response(rejection.status(), rejection.body_text())),
        }
    }
}

fn rejection_response(status: StatusCode, message: String) -> Response {
    let payload = json!({ "error": message });
    (status, Json(payload)).into_response()
}

pub fn status_for(error: &ScorecardError) -> StatusCode {
    match error {
        ScorecardError::NotFound { .. } => StatusCode::NOT_FOUND,
        ScorecardError::Conflict(_) => StatusCode::CONFLICT,
        ScorecardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ScorecardError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: ScorecardError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        error!(%error, "request failed");
    }
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) fn respond<T: Serialize>(
    status: StatusCode,
    result: Result<T, ScorecardError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn import_response<T: Serialize>(
    result: Result<ImportReport<T>, ImportError>,
) -> Response {
    match result {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(ImportError::Scorecard(error)) => error_response(error),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}
