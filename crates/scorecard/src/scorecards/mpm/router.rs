use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use uuid::Uuid;

use super::domain::{
    ActionPlanId, ActionPlanStatus, ActionPlanUpdate, MonthlyTargetId, MonthlyTargetUpdate,
    MpmActualUpdate, MpmApproverId, MpmApproverUpdate, MpmIndicatorSearch, MpmIndicatorUpdate,
    NewActionPlan, NewMonthlyTarget, NewMpmActual, NewMpmApprover, NewMpmIndicator,
    NewQuarterlyData, QuarterlyDataId, QuarterlyDataUpdate,
};
use super::repository::MpmStore;
use super::service::MpmScorecardService;
use crate::http::{
    error_response, import_response, respond, ApiJson, ApiPath, ApiQuery, PeriodQuery,
};
use crate::periods::PeriodId;
use crate::scorecards::common::{ActualId, IndicatorId, Perspective};

type SharedService<S> = State<Arc<MpmScorecardService<S>>>;

#[derive(Debug, Serialize)]
struct StatusBody {
    status: ActionPlanStatus,
}

/// Router exposing MPM indicators, actuals, monthly targets, action plans, approvers and the dashboard.
pub fn mpm_router<S: MpmStore>(service: Arc<MpmScorecardService<S>>) -> Router {
    Router::new()
        .route(
            "/api/v1/mpm/indicators",
            get(list_indicators_handler::<S>).post(create_indicator_handler::<S>),
        )
        .route("/api/v1/mpm/indicators/import", post(import_handler::<S>))
        .route("/api/v1/mpm/indicators/search", get(search_handler::<S>))
        .route(
            "/api/v1/mpm/indicators/perspective/:perspective",
            get(perspective_handler::<S>),
        )
        .route(
            "/api/v1/mpm/indicators/:indicator_id",
            get(get_indicator_handler::<S>)
                .put(update_indicator_handler::<S>)
                .delete(delete_indicator_handler::<S>),
        )
        .route(
            "/api/v1/mpm/indicators/:indicator_id/actuals",
            get(actuals_handler::<S>),
        )
        .route(
            "/api/v1/mpm/indicators/:indicator_id/action-plans",
            get(indicator_plans_handler::<S>),
        )
        .route(
            "/api/v1/mpm/indicators/:indicator_id/monthly-targets",
            get(monthly_targets_handler::<S>),
        )
        .route(
            "/api/v1/mpm/monthly-targets",
            post(create_monthly_target_handler::<S>),
        )
        .route(
            "/api/v1/mpm/monthly-targets/:target_id",
            put(update_monthly_target_handler::<S>),
        )
        .route("/api/v1/mpm/actuals", post(record_actual_handler::<S>))
        .route(
            "/api/v1/mpm/actuals/:actual_id",
            put(recompute_actual_handler::<S>),
        )
        .route("/api/v1/mpm/action-plans", post(create_plan_handler::<S>))
        .route(
            "/api/v1/mpm/action-plans/:plan_id",
            get(get_plan_handler::<S>).put(update_plan_handler::<S>),
        )
        .route(
            "/api/v1/mpm/action-plans/:plan_id/status",
            post(recompute_status_handler::<S>),
        )
        .route(
            "/api/v1/mpm/quarterly-data",
            post(create_quarterly_handler::<S>),
        )
        .route(
            "/api/v1/mpm/quarterly-data/:quarterly_id",
            put(update_quarterly_handler::<S>),
        )
        .route(
            "/api/v1/mpm/quarterly-summary",
            get(quarterly_summary_handler::<S>),
        )
        .route(
            "/api/v1/mpm/dashboard/:period_id",
            get(dashboard_handler::<S>),
        )
        .route(
            "/api/v1/mpm/approvers",
            get(list_approvers_handler::<S>).post(create_approver_handler::<S>),
        )
        .route(
            "/api/v1/mpm/approvers/by-user/:user_id",
            get(approver_by_user_handler::<S>),
        )
        .route(
            "/api/v1/mpm/approvers/:approver_id",
            get(get_approver_handler::<S>)
                .put(update_approver_handler::<S>)
                .delete(delete_approver_handler::<S>),
        )
        .with_state(service)
}

async fn create_indicator_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiJson(new_indicator): ApiJson<NewMpmIndicator>,
) -> Response {
    respond(StatusCode::CREATED, service.create_indicator(new_indicator))
}

async fn list_indicators_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> Response {
    respond(StatusCode::OK, service.indicators_for_period(query.period_id))
}

async fn search_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiQuery(search): ApiQuery<MpmIndicatorSearch>,
) -> Response {
    respond(StatusCode::OK, service.search_indicators(search))
}

async fn perspective_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(perspective): ApiPath<Perspective>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> Response {
    respond(
        StatusCode::OK,
        service.indicators_by_perspective(query.period_id, perspective),
    )
}

async fn get_indicator_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
) -> Response {
    respond(StatusCode::OK, service.get_indicator(indicator_id))
}

async fn update_indicator_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
    ApiJson(update): ApiJson<MpmIndicatorUpdate>,
) -> Response {
    respond(StatusCode::OK, service.update_indicator(indicator_id, update))
}

async fn delete_indicator_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
) -> Response {
    match service.delete_indicator(indicator_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

async fn import_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
    body: String,
) -> Response {
    import_response(service.import_indicators(query.period_id, body.as_bytes()))
}

async fn actuals_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
) -> Response {
    respond(StatusCode::OK, service.actuals_for_indicator(indicator_id))
}

async fn indicator_plans_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
) -> Response {
    respond(
        StatusCode::OK,
        service.action_plans_for_indicator(indicator_id),
    )
}

async fn create_monthly_target_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiJson(new_target): ApiJson<NewMonthlyTarget>,
) -> Response {
    respond(StatusCode::CREATED, service.add_monthly_target(new_target))
}

async fn monthly_targets_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(indicator_id): ApiPath<IndicatorId>,
) -> Response {
    respond(StatusCode::OK, service.monthly_targets(indicator_id))
}

async fn update_monthly_target_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(target_id): ApiPath<MonthlyTargetId>,
    ApiJson(update): ApiJson<MonthlyTargetUpdate>,
) -> Response {
    respond(StatusCode::OK, service.update_monthly_target(target_id, update))
}

async fn record_actual_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiJson(new_actual): ApiJson<NewMpmActual>,
) -> Response {
    respond(StatusCode::CREATED, service.record_actual(new_actual))
}

async fn recompute_actual_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(actual_id): ApiPath<ActualId>,
    ApiJson(update): ApiJson<MpmActualUpdate>,
) -> Response {
    respond(StatusCode::OK, service.recompute_actual(actual_id, update))
}

async fn create_plan_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiJson(new_plan): ApiJson<NewActionPlan>,
) -> Response {
    respond(StatusCode::CREATED, service.create_action_plan(new_plan))
}

async fn get_plan_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(plan_id): ApiPath<ActionPlanId>,
) -> Response {
    respond(StatusCode::OK, service.action_plan(plan_id))
}

async fn update_plan_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(plan_id): ApiPath<ActionPlanId>,
    ApiJson(update): ApiJson<ActionPlanUpdate>,
) -> Response {
    respond(StatusCode::OK, service.update_action_plan(plan_id, update))
}

async fn recompute_status_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(plan_id): ApiPath<ActionPlanId>,
) -> Response {
    respond(
        StatusCode::OK,
        service
            .recompute_action_plan_status(plan_id)
            .map(|status| StatusBody { status }),
    )
}

async fn create_quarterly_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiJson(new_data): ApiJson<NewQuarterlyData>,
) -> Response {
    respond(StatusCode::CREATED, service.create_quarterly_data(new_data))
}

async fn update_quarterly_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(quarterly_id): ApiPath<QuarterlyDataId>,
    ApiJson(update): ApiJson<QuarterlyDataUpdate>,
) -> Response {
    respond(
        StatusCode::OK,
        service.update_quarterly_data(quarterly_id, update),
    )
}

async fn quarterly_summary_handler<S: MpmStore>(State(service): SharedService<S>) -> Response {
    respond(StatusCode::OK, service.quarterly_summary())
}

async fn dashboard_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(period_id): ApiPath<PeriodId>,
) -> Response {
    respond(StatusCode::OK, service.dashboard(period_id))
}

async fn list_approvers_handler<S: MpmStore>(State(service): SharedService<S>) -> Response {
    respond(StatusCode::OK, service.approvers())
}

async fn create_approver_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiJson(new_approver): ApiJson<NewMpmApprover>,
) -> Response {
    respond(StatusCode::CREATED, service.create_approver(new_approver))
}

async fn get_approver_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(approver_id): ApiPath<MpmApproverId>,
) -> Response {
    respond(StatusCode::OK, service.approver(approver_id))
}

async fn approver_by_user_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Response {
    respond(StatusCode::OK, service.approver_by_user(user_id))
}

async fn update_approver_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(approver_id): ApiPath<MpmApproverId>,
    ApiJson(update): ApiJson<MpmApproverUpdate>,
) -> Response {
    respond(StatusCode::OK, service.update_approver(approver_id, update))
}

async fn delete_approver_handler<S: MpmStore>(
    State(service): SharedService<S>,
    ApiPath(approver_id): ApiPath<MpmApproverId>,
) -> Response {
    match service.delete_approver(approver_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}
