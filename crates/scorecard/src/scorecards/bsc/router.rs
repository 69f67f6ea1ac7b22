use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};

use super::domain::{
    BscActualUpdate, BscIndicatorSearch, BscIndicatorUpdate, NewBscActual, NewBscIndicator,
};
use super::repository::{BscActualRepository, BscIndicatorRepository};
use super::service::BscScorecardService;
use crate::http::{
    error_response, import_response, respond, ApiJson, ApiPath, ApiQuery, PeriodQuery,
};
use crate::periods::{PeriodId, PeriodRepository};
use crate::scorecards::common::{ActualId, IndicatorId, Perspective};

type SharedService<P, I, A> = State<Arc<BscScorecardService<P, I, A>>>;

/// Router exposing BSC indicators, actuals, import, and the dashboard.
pub fn bsc_router<P, I, A>(service: Arc<BscScorecardService<P, I, A>>) -> Router
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/bsc/indicators",
            get(list_indicators_handler::<P, I, A>).post(create_indicator_handler::<P, I, A>),
        )
        .route(
            "/api/v1/bsc/indicators/import",
            post(import_handler::<P, I, A>),
        )
        .route(
            "/api/v1/bsc/indicators/search",
            get(search_handler::<P, I, A>),
        )
        .route(
            "/api/v1/bsc/indicators/perspective/:perspective",
            get(perspective_handler::<P, I, A>),
        )
        .route(
            "/api/v1/bsc/indicators/:indicator_id",
            get(get_indicator_handler::<P, I, A>)
                .put(update_indicator_handler::<P, I, A>)
                .delete(delete_indicator_handler::<P, I, A>),
        )
        .route(
            "/api/v1/bsc/indicators/:indicator_id/actuals",
            get(actuals_handler::<P, I, A>),
        )
        .route("/api/v1/bsc/actuals", post(record_actual_handler::<P, I, A>))
        .route(
            "/api/v1/bsc/actuals/:actual_id",
            put(recompute_actual_handler::<P, I, A>),
        )
        .route(
            "/api/v1/bsc/dashboard/:period_id",
            get(dashboard_handler::<P, I, A>),
        )
        .with_state(service)
}

pub(crate) async fn create_indicator_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiJson(new_indicator): ApiJson<NewBscIndicator>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::CREATED, service.create_indicator(new_indicator))
}

pub(crate) async fn list_indicators_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::OK, service.indicators_for_period(query.period_id))
}

pub(crate) async fn search_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiQuery(search): ApiQuery<BscIndicatorSearch>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::OK, service.search_indicators(search))
}

pub(crate) async fn perspective_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiPath(perspective): ApiPath<Perspective>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.indicators_by_perspective(query.period_id, perspective),
    )
}

pub(crate) async fn get_indicator_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::OK, service.get_indicator(indicator_id))
}

pub(crate) async fn update_indicator_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
    ApiJson(update): ApiJson<BscIndicatorUpdate>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::OK, service.update_indicator(indicator_id, update))
}

pub(crate) async fn delete_indicator_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    match service.delete_indicator(indicator_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
    body: String,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    import_response(service.import_indicators(query.period_id, body.as_bytes()))
}

pub(crate) async fn actuals_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::OK, service.actuals_for_indicator(indicator_id))
}

pub(crate) async fn record_actual_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiJson(new_actual): ApiJson<NewBscActual>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::CREATED, service.record_actual(new_actual))
}

pub(crate) async fn recompute_actual_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiPath(actual_id): ApiPath<ActualId>,
    ApiJson(update): ApiJson<BscActualUpdate>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::OK, service.recompute_actual(actual_id, update))
}

pub(crate) async fn dashboard_handler<P, I, A>(
    State(service): SharedService<P, I, A>,
    ApiPath(period_id): ApiPath<PeriodId>,
) -> Response
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    respond(StatusCode::OK, service.dashboard(period_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::{NewPeriod, PeriodService, PeriodType};
    use crate::store::memory::{
        InMemoryBscActualRepository, InMemoryBscIndicatorRepository, InMemoryPeriodRepository,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, PeriodId) {
        let periods = Arc::new(InMemoryPeriodRepository::default());
        let period = PeriodService::new(periods.clone())
            .create(NewPeriod {
                period_type: PeriodType::Quarterly,
                year: 2025,
                label: "Q1".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"),
                end_date: NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid"),
            })
            .expect("period");
        let service = BscScorecardService::new(
            periods,
            Arc::new(InMemoryBscIndicatorRepository::default()),
            Arc::new(InMemoryBscActualRepository::default()),
        );
        (bsc_router(Arc::new(service)), period.id)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body)),
            None => request.body(Body::empty()),
        }
        .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json")
        };
        (status, value)
    }

    fn indicator(period_id: PeriodId, perspective: &str, code: &str) -> String {
        json!({
            "period_id": period_id,
            "perspective": perspective,
            "code": code,
            "kpi": format!("KPI {code}"),
            "weight": "10",
            "uom": "percentage",
            "category": "max",
            "calculation": "average",
            "target": "100"
        })
        .to_string()
    }

    #[tokio::test]
    async fn search_and_perspective_listing() {
        let (app, period_id) = app();
        for (perspective, code) in [
            ("financial", "F-01"),
            ("financial", "F-02"),
            ("customer", "C-01"),
        ] {
            let (status, _) = send(
                &app,
                "POST",
                "/api/v1/bsc/indicators",
                Some(indicator(period_id, perspective, code)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let uri = format!(
            "/api/v1/bsc/indicators/search?period_id={period_id}&perspective=financial&code=F-0&page=2&page_size=1"
        );
        let (status, page) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 2);
        assert_eq!(page["total_pages"], 2);
        assert_eq!(page["data"][0]["code"], "F-02");

        let uri = format!("/api/v1/bsc/indicators/perspective/customer?period_id={period_id}");
        let (status, listed) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["code"], "C-01");
    }

    #[tokio::test]
    async fn extractor_failures_use_the_error_body() {
        let (app, period_id) = app();

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/bsc/indicators",
            Some("{\"period_id\":".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let uri = format!("/api/v1/bsc/indicators/perspective/unknown?period_id={period_id}");
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) =
            send(&app, "GET", "/api/v1/bsc/indicators/search?page_size=500", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().expect("message").contains("page_size"));
    }
}
