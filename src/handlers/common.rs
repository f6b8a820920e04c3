use crate::{config::AppConfig, errors::ApiError, ApiResponse, PaginatedResponse};
use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// JSON request body whose rejections render as `ErrorResponse`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query extractor whose rejections render as `ErrorResponse`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

/// Path extractor whose rejections render as `ErrorResponse`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// Pagination parameters for list operations
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Items per page; capped by `api_max_page_size`
    pub limit: Option<u64>,
}

impl PaginationParams {
    /// `(page, limit)` with configured defaults and bounds applied. The page
    /// is capped so that `(page - 1) * limit` stays within a SQL offset.
    pub fn resolve(&self, config: &AppConfig) -> (u64, u64) {
        let limit = config.page_size(self.limit);
        let last_page = (i64::MAX as u64) / limit;
        (self.page.unwrap_or(1).clamp(1, last_page), limit)
    }
}

/// Row offset of a resolved page.
pub fn page_offset(page: u64, limit: u64) -> usize {
    usize::try_from(page.saturating_sub(1).saturating_mul(limit)).unwrap_or(usize::MAX)
}

pub fn paginate<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> PaginatedResponse<T> {
    let total_pages = if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    };
    PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}
