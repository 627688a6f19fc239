use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{
    ContactRequest, ContactResponse, DeleteQuery, DeleteResponse, ListQuery, PaginationMeta,
    SubmissionsResponse,
};
use super::services;

#[instrument(skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let outcome = services::create_submission(&state, payload)
        .await
        .map_err(|e| e.or_internal("Failed to submit your message. Please try again."))?;

    info!(id = outcome.id, notified = ?outcome.notified, "contact submission accepted");
    Ok(Json(ContactResponse {
        success: true,
        message: "Thank you for your message! We will get back to you soon.".into(),
        id: outcome.id,
    }))
}

#[instrument(skip(state))]
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<SubmissionsResponse>, ApiError> {
    let page = services::list_submissions(&state, query.page(), query.limit())
        .await
        .map_err(|e| e.or_internal("Failed to fetch submissions"))?;

    Ok(Json(SubmissionsResponse {
        success: true,
        data: page.submissions,
        pagination: PaginationMeta {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        },
    }))
}

#[instrument(skip(state))]
pub async fn delete_submission(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    services::delete_submission(&state, query.id.as_deref())
        .await
        .map_err(|e| e.or_internal("Failed to delete submission"))?;

    info!(id = ?query.id, "contact submission deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Submission deleted successfully".into(),
    }))
}
