use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::{ErrorDto, PageDto},
        review::{ReviewDto, UpsertReviewDto},
    },
    server::{
        error::AppError,
        model::{
            review::{Review, UpsertReviewParams},
            user::User,
        },
        service::review::ReviewService,
        state::AppState,
        util::pagination::PaginationParams,
    },
};

/// Tag for grouping review endpoints in OpenAPI documentation
pub static REVIEW_TAG: &str = "review";

/// Review a product from a completed order.
///
/// One review exists per user, product and order; posting again replaces the
/// rating and text.
///
/// # Returns
/// - `200 OK` - Review saved
/// - `400 Bad Request` - Rating outside 1-5, empty text, order not completed or
///   product not in the order
/// - `404 Not Found` - Order not found for the caller
#[utoipa::path(
    put,
    path = "/api/reviews",
    tag = REVIEW_TAG,
    request_body = UpsertReviewDto,
    responses(
        (status = 200, description = "Review saved", body = ReviewDto),
        (status = 400, description = "Invalid review", body = ErrorDto),
        (status = 404, description = "Order not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn upsert_review(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpsertReviewDto>,
) -> Result<impl IntoResponse, AppError> {
    let review = ReviewService::new(&state.db)
        .upsert(UpsertReviewParams::from_dto(user.id, payload))
        .await?;

    Ok(Json(review.into_dto()))
}

#[utoipa::path(
    get,
    path = "/api/products/{product_id}/reviews",
    tag = REVIEW_TAG,
    params(("product_id" = i32, Path, description = "Product ID"), PaginationParams),
    responses(
        (status = 200, description = "Reviews, newest first", body = PageDto<ReviewDto>),
        (status = 404, description = "Product not found", body = ErrorDto)
    ),
)]
pub async fn list_product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = ReviewService::new(&state.db)
        .list_for_product(product_id, pagination)
        .await?;

    Ok(Json(page.into_dto(Review::into_dto)))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{review_id}",
    tag = REVIEW_TAG,
    params(("review_id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(review_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    ReviewService::new(&state.db).delete(review_id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
