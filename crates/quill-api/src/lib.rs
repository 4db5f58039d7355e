use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use quill_auth::SessionKeeper;
use quill_db::Database;

pub mod auth;
pub mod comments;
pub mod error;
pub mod guards;
pub mod likes;
mod pages;
pub mod posts;
pub mod session;

pub type AppState = Arc<AppStateInner>;

/// Read-only after startup; the database serializes its own writes.
pub struct AppStateInner {
    pub db: Database,
    pub sessions: SessionKeeper,
}

/// The full HTTP surface. The session resolver runs before every handler,
/// so each request carries a `CurrentUser` extension by the time any guard
/// looks at it.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(posts::index))
        .route("/newpost", get(posts::new_form).post(posts::create))
        .route("/signup", get(auth::show_signup).post(auth::signup))
        .route("/welcome", get(auth::welcome))
        .route("/login", get(auth::show_login).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/{id}", get(posts::show))
        .route("/{id}/delete", get(posts::delete))
        .route("/{id}/edit", get(posts::edit_form).post(posts::update))
        .route("/{id}/like", get(likes::create))
        .route("/{id}/comment", post(comments::create))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::resolve_session,
        ))
        .with_state(state)
}
