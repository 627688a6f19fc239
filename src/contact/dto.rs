use serde::{Deserialize, Serialize};

use crate::contact::repo::Submission;

/// Request body for POST /contact. All fields are optional at this layer so
/// that absence reaches the validator instead of being rejected by serde.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response returned after a successful submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

/// Pagination query for GET /contact/submissions. Values that fail to parse
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    limit: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> Option<i64> {
        self.page.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// Query for DELETE /contact/submissions.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SubmissionsResponse {
    pub success: bool,
    pub data: Vec<Submission>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}
