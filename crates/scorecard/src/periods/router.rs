use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{NewPeriod, PeriodId, PeriodSearch, PeriodStatus, PeriodUpdate};
use super::repository::PeriodRepository;
use super::service::PeriodService;
use crate::http::{error_response, respond, ApiJson, ApiPath, ApiQuery};

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    pub(crate) status: PeriodStatus,
}

/// Router exposing period CRUD, search, and activation.
pub fn period_router<R>(service: Arc<PeriodService<R>>) -> Router
where
    R: PeriodRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/periods",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/periods/active", get(active_handler::<R>))
        .route("/api/v1/periods/search", get(search_handler::<R>))
        .route(
            "/api/v1/periods/:period_id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/v1/periods/:period_id/status", put(status_handler::<R>))
        .with_state(service)
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<PeriodService<R>>>,
    ApiJson(new_period): ApiJson<NewPeriod>,
) -> Response
where
    R: PeriodRepository + 'static,
{
    respond(StatusCode::CREATED, service.create(new_period))
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<PeriodService<R>>>) -> Response
where
    R: PeriodRepository + 'static,
{
    respond(StatusCode::OK, service.list())
}

pub(crate) async fn search_handler<R>(
    State(service): State<Arc<PeriodService<R>>>,
    ApiQuery(search): ApiQuery<PeriodSearch>,
) -> Response
where
    R: PeriodRepository + 'static,
{
    respond(StatusCode::OK, service.search(search))
}

pub(crate) async fn active_handler<R>(State(service): State<Arc<PeriodService<R>>>) -> Response
where
    R: PeriodRepository + 'static,
{
    match service.active() {
        Ok(Some(period)) => (StatusCode::OK, Json(period)).into_response(),
        Ok(None) => {
            let payload = serde_json::json!({ "error": "no active period" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<PeriodService<R>>>,
    ApiPath(period_id): ApiPath<PeriodId>,
) -> Response
where
    R: PeriodRepository + 'static,
{
    respond(StatusCode::OK, service.get(period_id))
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<PeriodService<R>>>,
    ApiPath(period_id): ApiPath<PeriodId>,
    ApiJson(update): ApiJson<PeriodUpdate>,
) -> Response
where
    R: PeriodRepository + 'static,
{
    respond(StatusCode::OK, service.update(period_id, update))
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<PeriodService<R>>>,
    ApiPath(period_id): ApiPath<PeriodId>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Response
where
    R: PeriodRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_status(period_id, update.status),
    )
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<PeriodService<R>>>,
    ApiPath(period_id): ApiPath<PeriodId>,
) -> Response
where
    R: PeriodRepository + 'static,
{
    match service.delete(period_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}
