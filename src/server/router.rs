use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::services::ServeDir;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::{
    controller::{
        address, analytics, auth, cart, catalog, delivery, discount, notification, order,
        payment, review, upload, user, video,
    },
    middleware::auth::{optional_auth, require_auth},
    service::storage::MAX_UPLOAD_BYTES,
    state::AppState,
};

/// Multipart framing allowance on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "TasteTube API", description = "Short food videos with a shop and checkout"),
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::request_otp,
        auth::verify_otp,
        user::get_me,
        user::update_me,
        user::get_profile,
        user::follow,
        user::unfollow,
        address::list_addresses,
        address::create_address,
        address::update_address,
        address::delete_address,
        address::set_default_address,
        catalog::list_categories,
        catalog::create_category,
        catalog::search_products,
        catalog::get_product,
        catalog::list_shop_products,
        catalog::create_product,
        catalog::update_product,
        catalog::delete_product,
        video::feed,
        video::following_feed,
        video::list_user_videos,
        video::create_video,
        video::get_video,
        video::update_video,
        video::delete_video,
        video::like_video,
        video::unlike_video,
        video::list_comments,
        video::create_comment,
        video::delete_comment,
        cart::get_cart,
        cart::add_cart_item,
        cart::update_cart_item,
        cart::remove_cart_item,
        discount::create_discount,
        discount::list_own_discounts,
        discount::update_discount,
        discount::delete_discount,
        discount::list_shop_discounts,
        discount::list_vouchers,
        discount::save_voucher,
        discount::remove_voucher,
        order::quote,
        order::create_order,
        order::list_my_orders,
        order::list_shop_orders,
        order::get_order,
        order::confirm_order,
        order::cancel_order,
        order::complete_order,
        delivery::get_delivery_option,
        delivery::upsert_delivery_option,
        delivery::get_delivery,
        delivery::start_self_delivery,
        delivery::update_self_delivery,
        delivery::book_courier,
        delivery::refresh_courier,
        delivery::cancel_courier,
        delivery::courier_webhook,
        payment::list_cards,
        payment::add_card,
        payment::set_default_card,
        payment::delete_card,
        payment::get_payment,
        payment::gateway_return,
        payment::gateway_ipn,
        review::upsert_review,
        review::list_product_reviews,
        review::delete_review,
        notification::list_notifications,
        notification::mark_notification_read,
        notification::mark_all_notifications_read,
        analytics::get_analytics,
        analytics::recompute_analytics,
        upload::upload,
    ),
    modifiers(&BearerSecurity)
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// Routes reachable without a token.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/otp/request", post(auth::request_otp))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/products", get(catalog::search_products))
        .route("/api/products/{product_id}", get(catalog::get_product))
        .route(
            "/api/products/{product_id}/reviews",
            get(review::list_product_reviews),
        )
        .route(
            "/api/shops/{shop_id}/products",
            get(catalog::list_shop_products),
        )
        .route(
            "/api/shops/{shop_id}/discounts",
            get(discount::list_shop_discounts),
        )
        .route(
            "/api/shops/{shop_id}/delivery-option",
            get(delivery::get_delivery_option),
        )
        .route("/api/videos", get(video::feed))
        .route("/api/payments/gateway/return", get(payment::gateway_return))
        .route("/api/payments/gateway/ipn", get(payment::gateway_ipn))
        .route("/api/webhooks/courier", post(delivery::courier_webhook))
}

/// Routes that personalize their response when a valid token is present.
fn viewer_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users/{user_id}", get(user::get_profile))
        .route("/api/users/{user_id}/videos", get(video::list_user_videos))
        .route("/api/videos/{video_id}", get(video::get_video))
        .route("/api/videos/{video_id}/comments", get(video::list_comments))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth))
}

/// Routes that require a live token.
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/otp/verify", post(auth::verify_otp))
        .route("/api/users/me", get(user::get_me).patch(user::update_me))
        .route(
            "/api/users/{user_id}/follow",
            post(user::follow).delete(user::unfollow),
        )
        .route(
            "/api/addresses",
            get(address::list_addresses).post(address::create_address),
        )
        .route(
            "/api/addresses/{address_id}",
            patch(address::update_address).delete(address::delete_address),
        )
        .route(
            "/api/addresses/{address_id}/default",
            post(address::set_default_address),
        )
        .route("/api/categories", post(catalog::create_category))
        .route("/api/products", post(catalog::create_product))
        .route(
            "/api/products/{product_id}",
            patch(catalog::update_product).delete(catalog::delete_product),
        )
        .route("/api/videos", post(video::create_video))
        .route("/api/videos/following", get(video::following_feed))
        .route(
            "/api/videos/{video_id}",
            patch(video::update_video).delete(video::delete_video),
        )
        .route(
            "/api/videos/{video_id}/like",
            post(video::like_video).delete(video::unlike_video),
        )
        .route(
            "/api/videos/{video_id}/comments",
            post(video::create_comment),
        )
        .route("/api/comments/{comment_id}", delete(video::delete_comment))
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/items", post(cart::add_cart_item))
        .route(
            "/api/cart/items/{item_id}",
            patch(cart::update_cart_item).delete(cart::remove_cart_item),
        )
        .route("/api/discounts", post(discount::create_discount))
        .route("/api/discounts/mine", get(discount::list_own_discounts))
        .route(
            "/api/discounts/{discount_id}",
            patch(discount::update_discount).delete(discount::delete_discount),
        )
        .route(
            "/api/vouchers",
            get(discount::list_vouchers).post(discount::save_voucher),
        )
        .route(
            "/api/vouchers/{voucher_id}",
            delete(discount::remove_voucher),
        )
        .route("/api/orders/quote", post(order::quote))
        .route(
            "/api/orders",
            get(order::list_my_orders).post(order::create_order),
        )
        .route("/api/orders/{order_id}", get(order::get_order))
        .route("/api/orders/{order_id}/confirm", post(order::confirm_order))
        .route("/api/orders/{order_id}/cancel", post(order::cancel_order))
        .route("/api/orders/{order_id}/complete", post(order::complete_order))
        .route("/api/orders/{order_id}/delivery", get(delivery::get_delivery))
        .route(
            "/api/orders/{order_id}/delivery/self",
            post(delivery::start_self_delivery).patch(delivery::update_self_delivery),
        )
        .route(
            "/api/orders/{order_id}/delivery/courier",
            post(delivery::book_courier).delete(delivery::cancel_courier),
        )
        .route(
            "/api/orders/{order_id}/delivery/courier/refresh",
            post(delivery::refresh_courier),
        )
        .route("/api/shop/orders", get(order::list_shop_orders))
        .route(
            "/api/shop/delivery-option",
            put(delivery::upsert_delivery_option),
        )
        .route("/api/shop/analytics", get(analytics::get_analytics))
        .route(
            "/api/shop/analytics/recompute",
            post(analytics::recompute_analytics),
        )
        .route(
            "/api/payments/cards",
            get(payment::list_cards).post(payment::add_card),
        )
        .route(
            "/api/payments/cards/{card_id}",
            delete(payment::delete_card),
        )
        .route(
            "/api/payments/cards/{card_id}/default",
            post(payment::set_default_card),
        )
        .route("/api/payments/{payment_id}", get(payment::get_payment))
        .route("/api/reviews", put(review::upsert_review))
        .route("/api/reviews/{review_id}", delete(review::delete_review))
        .route(
            "/api/notifications",
            get(notification::list_notifications),
        )
        .route(
            "/api/notifications/read-all",
            post(notification::mark_all_notifications_read),
        )
        .route(
            "/api/notifications/{notification_id}/read",
            post(notification::mark_notification_read),
        )
        .route(
            "/api/uploads",
            post(upload::upload).layer(DefaultBodyLimit::max(
                MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// Builds the application router.
///
/// Public, optionally authenticated and protected routes are merged into one
/// router; routes sharing a path with different methods may live in different
/// groups. Uploaded media is served from `/media` and the OpenAPI document
/// from `/api/docs`.
pub fn router(state: AppState) -> Router {
    let media = ServeDir::new(&state.upload_dir);

    Router::new()
        .merge(public_routes())
        .merge(viewer_routes(&state))
        .merge(protected_routes(&state))
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/media", media)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration, Utc};
    use sea_orm::DatabaseConnection;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::server::{data::auth_token::AuthTokenRepository, util::token::hash_token};
    use test_utils::{builder::TestBuilder, factory};

    fn app(db: &DatabaseConnection) -> Router {
        router(AppState::for_tests(db.clone(), std::env::temp_dir()))
    }

    async fn issue_token(db: &DatabaseConnection, user_id: i32, token: &str) {
        AuthTokenRepository::new(db)
            .create(user_id, hash_token(token), Utc::now() + Duration::days(1))
            .await
            .unwrap();
    }

    fn get_request(path: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, path: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Tests registering and then using the issued token.
    ///
    /// Expected: 201 with a token, then 200 from /api/users/me for the new user
    #[tokio::test]
    async fn registers_and_uses_token() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let response = app(db)
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                None,
                json!({
                    "username": "noodle_fan",
                    "email": "Noodle@Example.com",
                    "password": "slurp-slurp",
                    "role": "customer"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap().to_string();

        let response = app(db)
            .oneshot(get_request("/api/users/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["username"], "noodle_fan");
        assert_eq!(me["email"], "noodle@example.com");
    }

    /// Tests that protected routes reject anonymous requests.
    ///
    /// Expected: 401 for the cart, orders and uploads
    #[tokio::test]
    async fn protected_routes_require_token() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        for path in ["/api/cart", "/api/orders", "/api/notifications"] {
            let response = app(db).oneshot(get_request(path, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
        }

        let response = app(db)
            .oneshot(json_request("POST", "/api/products", None, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    /// Tests that the catalog is browsable without a token while writes on the
    /// same path stay protected.
    ///
    /// Expected: 200 listing the shop's product
    #[tokio::test]
    async fn catalog_is_public() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let product = factory::create_product(db, shop.id).await.unwrap();

        let response = app(db)
            .oneshot(get_request("/api/products", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["items"][0]["id"], product.id);

        let response = app(db)
            .oneshot(get_request(&format!("/api/products/{}", product.id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    /// Tests that shop-only endpoints refuse customers.
    ///
    /// Expected: 403 when a customer creates a product
    #[tokio::test]
    async fn shop_routes_reject_customers() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let customer = factory::create_user(db).await.unwrap();
        issue_token(db, customer.id, "customer-token").await;

        let response = app(db)
            .oneshot(json_request(
                "POST",
                "/api/products",
                Some("customer-token"),
                json!({ "name": "Bun", "price": 10000, "quantity": 5 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    /// Tests that categories are created by admins only.
    ///
    /// Expected: 403 for a shop, 201 for an admin, then listed publicly
    #[tokio::test]
    async fn admin_creates_category() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let shop = factory::create_shop(db).await.unwrap();
        let admin = factory::user::create_admin(db).await.unwrap();
        issue_token(db, shop.id, "shop-token").await;
        issue_token(db, admin.id, "admin-token").await;
        let body = json!({ "name": "Street food" });

        let response = app(db)
            .oneshot(json_request("POST", "/api/categories", Some("shop-token"), body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app(db)
            .oneshot(json_request("POST", "/api/categories", Some("admin-token"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app(db)
            .oneshot(get_request("/api/categories", None))
            .await
            .unwrap();
        let categories = body_json(response).await;
        assert_eq!(categories[0]["name"], "Street food");
    }

    /// Tests that a private video is only visible to its owner through the
    /// optionally authenticated route.
    ///
    /// Expected: 404 anonymously, 200 with the owner's token
    #[tokio::test]
    async fn private_video_needs_owner_token() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let owner = factory::create_user(db).await.unwrap();
        let video = factory::video::VideoFactory::new(db, owner.id)
            .visibility("PRIVATE")
            .build()
            .await
            .unwrap();
        issue_token(db, owner.id, "owner-token").await;
        let path = format!("/api/videos/{}", video.id);

        let response = app(db).oneshot(get_request(&path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app(db)
            .oneshot(get_request(&path, Some("owner-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    /// Tests that the OpenAPI document is served with the bearer scheme.
    ///
    /// Expected: 200 and a `bearer` security scheme
    #[tokio::test]
    async fn serves_openapi_document() {
        let test = TestBuilder::new().with_user_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let response = app(db)
            .oneshot(get_request("/api/docs/openapi.json", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let doc = body_json(response).await;
        assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
        assert!(doc["paths"]["/api/orders"].is_object());
    }
}
