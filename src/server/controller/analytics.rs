use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        analytic::{AnalyticDto, AnalyticsQuery, AnalyticsReportDto, RecomputeAnalyticsDto},
        api::ErrorDto,
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::user::User,
        service::analytics::AnalyticsService,
        state::AppState,
    },
};

/// Tag for grouping analytics endpoints in OpenAPI documentation
pub static ANALYTICS_TAG: &str = "analytics";

/// Daily figures for the authenticated shop.
///
/// Rows are maintained by the scheduled rollup every 15 minutes; days with no
/// row yet are simply absent.
///
/// # Access Control
/// - `Shop`
///
/// # Returns
/// - `200 OK` - Rows for the range with totals
/// - `400 Bad Request` - `to` before `from` or a range over 366 days
#[utoipa::path(
    get,
    path = "/api/shop/analytics",
    tag = ANALYTICS_TAG,
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Report for the range", body = AnalyticsReportDto),
        (status = 400, description = "Invalid date range", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let report = AnalyticsService::new(&state.db)
        .get(shop.id, query.from, query.to)
        .await?;

    Ok(Json(report.into_dto()))
}

/// Recompute one day for the authenticated shop without waiting for the rollup.
#[utoipa::path(
    post,
    path = "/api/shop/analytics/recompute",
    tag = ANALYTICS_TAG,
    request_body = RecomputeAnalyticsDto,
    responses(
        (status = 200, description = "Recomputed row", body = AnalyticDto),
        (status = 400, description = "Date in the future", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn recompute_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<RecomputeAnalyticsDto>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let row = AnalyticsService::new(&state.db)
        .recompute(shop.id, payload.date)
        .await?;

    Ok(Json(row.into_dto()))
}
