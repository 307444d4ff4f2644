use std::path::Path;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes::{auth, health, note, user, views},
};

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout).get(auth::logout))
        .route("/user/search", get(user::search))
        .route("/user/{username}", get(user::get_profile))
        .route("/api/health", get(health::health))
        // pages
        .route("/", get(views::app))
        .route("/login", get(views::login))
        .route("/register", get(views::register))
        .route("/account", get(views::account))
        .route("/delete/user", get(views::delete_user))
        .route("/delete/notes", get(views::delete_notes));

    let protected_routes = Router::new()
        .route(
            "/user/me",
            get(user::get_me)
                .patch(user::update_me)
                .delete(user::delete_me),
        )
        .route(
            "/api/notes",
            get(note::list_notes)
                .post(note::create_note)
                .delete(note::delete_all_notes),
        )
        .route(
            "/api/notes/{id}",
            get(note::get_note)
                .put(note::update_note)
                .delete(note::delete_note),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let static_dir = Path::new(&state.config.views_dir).join("static");

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(views::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(state.config.request_timeout()))
                .layer(from_fn(log_errors)),
        );

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
