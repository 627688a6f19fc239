pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(handlers::submit_contact))
        .route(
            "/contact/submissions",
            get(handlers::list_submissions).delete(handlers::delete_submission),
        )
}
