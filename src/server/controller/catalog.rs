use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    model::{
        api::{ErrorDto, PageDto},
        catalog::{
            CategoryDto, CreateCategoryDto, CreateProductDto, ProductDto, ProductSearchQuery,
            UpdateProductDto,
        },
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::{
            catalog::{CreateProductParams, Product, UpdateProductParams},
            user::User,
        },
        service::catalog::CatalogService,
        state::AppState,
        util::pagination::PaginationParams,
    },
};

/// Tag for grouping catalog endpoints in OpenAPI documentation
pub static CATALOG_TAG: &str = "catalog";

/// List all product categories.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = CATALOG_TAG,
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryDto>),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = CatalogService::new(&state.db, &state.upload_dir)
        .list_categories()
        .await?;

    Ok(Json(
        categories
            .into_iter()
            .map(|c| c.into_dto())
            .collect::<Vec<_>>(),
    ))
}

/// Create a product category.
///
/// # Access Control
/// - `Admin` - Only admins can create categories
///
/// # Returns
/// - `201 Created` - Category created
/// - `400 Bad Request` - Empty name
/// - `403 Forbidden` - Caller is not an admin
/// - `409 Conflict` - A category with this name exists
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = CATALOG_TAG,
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Invalid name", body = ErrorDto),
        (status = 403, description = "Caller is not an admin", body = ErrorDto),
        (status = 409, description = "Category name taken", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateCategoryDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&user).require(&[Permission::Admin])?;

    let category = CatalogService::new(&state.db, &state.upload_dir)
        .create_category(payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(category.into_dto())))
}

/// Search products by name and category.
///
/// # Arguments
/// - `search` - Optional case-insensitive name fragment and category filter
/// - `pagination` - Page and page size
///
/// # Returns
/// - `200 OK` - One page of matching products, newest first
#[utoipa::path(
    get,
    path = "/api/products",
    tag = CATALOG_TAG,
    params(ProductSearchQuery, PaginationParams),
    responses(
        (status = 200, description = "Matching products", body = PageDto<ProductDto>),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(search): Query<ProductSearchQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = CatalogService::new(&state.db, &state.upload_dir)
        .search(search.q, search.category_id, pagination)
        .await?;

    Ok(Json(page.into_dto(Product::into_dto)))
}

#[utoipa::path(
    get,
    path = "/api/products/{product_id}",
    tag = CATALOG_TAG,
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with rating summary", body = ProductDto),
        (status = 404, description = "Product not found", body = ErrorDto)
    ),
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let product = CatalogService::new(&state.db, &state.upload_dir)
        .get_product(product_id)
        .await?;

    Ok(Json(product.into_dto()))
}

#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/products",
    tag = CATALOG_TAG,
    params(("shop_id" = i32, Path, description = "Shop user ID"), PaginationParams),
    responses(
        (status = 200, description = "The shop's products", body = PageDto<ProductDto>),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_shop_products(
    State(state): State<AppState>,
    Path(shop_id): Path<i32>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = CatalogService::new(&state.db, &state.upload_dir)
        .list_by_shop(shop_id, pagination)
        .await?;

    Ok(Json(page.into_dto(Product::into_dto)))
}

/// Add a product to the authenticated shop's catalog.
///
/// A temporary upload URL in `image_url` is committed to permanent storage.
///
/// # Access Control
/// - `Shop` - Only shops sell products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = CATALOG_TAG,
    request_body = CreateProductDto,
    responses(
        (status = 201, description = "Product created", body = ProductDto),
        (status = 400, description = "Invalid product data", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateProductDto>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let product = CatalogService::new(&state.db, &state.upload_dir)
        .create_product(CreateProductParams::from_dto(shop.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(product.into_dto())))
}

/// Update one of the authenticated shop's products.
///
/// # Access Control
/// - `Shop` - Only the owning shop; other shops' products read as not found
#[utoipa::path(
    patch,
    path = "/api/products/{product_id}",
    tag = CATALOG_TAG,
    params(("product_id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductDto,
    responses(
        (status = 200, description = "Product updated", body = ProductDto),
        (status = 400, description = "Invalid product data", body = ErrorDto),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 404, description = "Product not found", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(product_id): Path<i32>,
    Json(payload): Json<UpdateProductDto>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    let product = CatalogService::new(&state.db, &state.upload_dir)
        .update_product(UpdateProductParams::from_dto(product_id, shop.id, payload))
        .await?;

    Ok(Json(product.into_dto()))
}

#[utoipa::path(
    delete,
    path = "/api/products/{product_id}",
    tag = CATALOG_TAG,
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Caller is not a shop", body = ErrorDto),
        (status = 404, description = "Product not found", body = ErrorDto),
        (status = 409, description = "Product is referenced by orders", body = ErrorDto)
    ),
    security(("bearer" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let shop = AuthGuard::new(&user).require(&[Permission::Shop])?;

    CatalogService::new(&state.db, &state.upload_dir)
        .delete_product(product_id, shop.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
