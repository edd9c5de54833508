pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod queries;
pub mod services;
pub mod state;
pub mod validation;

pub use config::Config;
pub use database::{DbConn, DbPool};
pub use error::{Error, Result};
pub use services::compliance::ComplianceAnalyzer;
pub use state::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{analysis, auth, clubs, events, health, nutrition, reports, users};

/// Load configuration from environment variables
pub fn load_config() -> std::result::Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load()?)
}

/// Builds the full application router, with every route nested under `/api`.
///
/// Public routes: health, registration, login and token refresh. Everything
/// else requires a bearer access token.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/register/", post(auth::register))
        .route("/login/", post(auth::login))
        .route("/token/refresh/", post(auth::refresh_token));

    let protected_routes = Router::new()
        .route(
            "/user/",
            get(users::get_current_user).put(users::update_current_user),
        )
        .route("/users/{id}/nutrition/", get(users::get_user_nutrition))
        .route("/search-users/", get(users::search_users))
        .route("/clubs/", get(clubs::list_clubs).post(clubs::create_club))
        .route("/clubs/{name}/", get(clubs::get_club))
        .route(
            "/clubs/{name}/members/",
            get(clubs::list_members).delete(clubs::remove_member),
        )
        .route("/clubs/{name}/add-member/", post(clubs::add_member))
        .route(
            "/clubs/{name}/events/",
            get(events::list_club_events).post(events::create_club_event),
        )
        .route("/events/", get(events::list_events))
        .route(
            "/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/search-plans/", get(nutrition::search_plans))
        .route("/plans/", get(nutrition::list_plans).post(nutrition::create_plan))
        .route("/plans/{id}", get(nutrition::get_plan))
        .route("/nutrition/", get(nutrition::list_nutrition_facts))
        .route("/analyze-form/", post(analysis::analyze_form))
        .route("/query/", post(reports::run_query))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::jwt_auth_middleware,
        ));

    let max_upload_bytes = state.config.server.max_upload_bytes;

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

