use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::services::uploads::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Room for the multipart framing and text fields around one image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings/active", get(handlers::bookings::list_active))
        .route(
            "/api/bookings/:id/cancel",
            put(handlers::bookings::cancel_booking),
        )
        .route(
            "/api/available-slots/:date",
            get(handlers::bookings::available_slots),
        )
        .route("/api/gallery", get(handlers::gallery::list_images))
        .route("/api/admin/login", post(handlers::auth::login));

    // The gate runs before any extractor touches the request body.
    let admin_routes = Router::new()
        .route("/api/admin/verify", get(handlers::auth::verify))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/:id/cancel",
            put(handlers::admin::cancel_booking),
        )
        .route(
            "/api/admin/gallery/upload",
            post(handlers::gallery::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/admin/gallery/:id",
            delete(handlers::gallery::delete_image),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            handlers::auth::require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
