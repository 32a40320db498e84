//! Payroll API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payroll", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/generate", post(handler::generate))
        .route("/me", get(handler::list_mine))
        .route(
            "/settings",
            get(handler::get_settings).put(handler::update_settings),
        )
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/finalize", post(handler::finalize))
        .route("/{id}/pay", post(handler::mark_paid))
}
