use super::common::{created_response, no_content_response, JsonBody, Path, Query};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::length_adjustments::{
        CreateLengthAdjustmentRequest, LengthAdjustmentFilter, LengthAdjustmentResponse,
    },
    ApiResponse, ApiResult,
};
use axum::{
    extract::State,
    response::Response,
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/material-length-adjustments",
    summary = "List length adjustments of a material",
    params(LengthAdjustmentFilter),
    responses(
        (status = 200, description = "Adjustments retrieved", body = ApiResponse<Vec<LengthAdjustmentResponse>>),
        (status = 400, description = "Missing or invalid material_id", body = crate::errors::ErrorResponse),
    ),
    tag = "material-length-adjustments"
)]
pub async fn list_length_adjustments(
    State(state): State<AppState>,
    Query(filter): Query<LengthAdjustmentFilter>,
) -> ApiResult<Vec<LengthAdjustmentResponse>> {
    let adjustments = state
        .services
        .length_adjustments
        .list_for_material(filter.material_id)
        .await?;
    Ok(Json(ApiResponse::success(adjustments)))
}

#[utoipa::path(
    post,
    path = "/api/v1/material-length-adjustments",
    summary = "Record length adjustment",
    request_body = CreateLengthAdjustmentRequest,
    responses(
        (status = 201, description = "Adjustment recorded", body = ApiResponse<LengthAdjustmentResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    tag = "material-length-adjustments"
)]
pub async fn create_length_adjustment(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateLengthAdjustmentRequest>,
) -> Result<Response, ServiceError> {
    let adjustment = state
        .services
        .length_adjustments
        .create_adjustment(request)
        .await?;
    Ok(created_response(adjustment))
}

#[utoipa::path(
    get,
    path = "/api/v1/material-length-adjustments/{id}",
    summary = "Get length adjustment",
    params(("id" = Uuid, Path, description = "Adjustment ID")),
    responses(
        (status = 200, description = "Adjustment retrieved", body = ApiResponse<LengthAdjustmentResponse>),
        (status = 404, description = "Adjustment not found", body = crate::errors::ErrorResponse),
    ),
    tag = "material-length-adjustments"
)]
pub async fn get_length_adjustment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<LengthAdjustmentResponse> {
    let adjustment = state.services.length_adjustments.get_adjustment(id).await?;
    Ok(Json(ApiResponse::success(adjustment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/material-length-adjustments/{id}",
    summary = "Delete length adjustment",
    params(("id" = Uuid, Path, description = "Adjustment ID")),
    responses(
        (status = 204, description = "Adjustment deleted"),
        (status = 404, description = "Adjustment not found", body = crate::errors::ErrorResponse),
    ),
    tag = "material-length-adjustments"
)]
pub async fn delete_length_adjustment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state
        .services
        .length_adjustments
        .delete_adjustment(id)
        .await?;
    Ok(no_content_response())
}
