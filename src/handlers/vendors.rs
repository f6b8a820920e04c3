use super::common::{
    created_response, no_content_response, paginate, JsonBody, PaginationParams, Path, Query,
};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::vendors::{CreateVendorRequest, UpdateVendorRequest, VendorResponse},
    ApiResponse, ApiResult, PaginatedResponse,
};
use axum::{
    extract::State,
    response::Response,
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/vendors",
    summary = "List vendors",
    params(PaginationParams),
    responses(
        (status = 200, description = "Vendors retrieved", body = ApiResponse<PaginatedResponse<VendorResponse>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<VendorResponse>> {
    let (page, limit) = params.resolve(&state.config);
    let (items, total) = state.services.vendors.list_vendors(page, limit).await?;
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    summary = "Create vendor",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = ApiResponse<VendorResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Vendor name already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateVendorRequest>,
) -> Result<Response, ServiceError> {
    let vendor = state.services.vendors.create_vendor(request).await?;
    Ok(created_response(vendor))
}

#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}",
    summary = "Get vendor",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor retrieved", body = ApiResponse<VendorResponse>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<VendorResponse> {
    let vendor = state.services.vendors.get_vendor(id).await?;
    Ok(Json(ApiResponse::success(vendor)))
}

#[utoipa::path(
    put,
    path = "/api/v1/vendors/{id}",
    summary = "Update vendor",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated", body = ApiResponse<VendorResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Vendor name already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateVendorRequest>,
) -> ApiResult<VendorResponse> {
    let vendor = state.services.vendors.update_vendor(id, request).await?;
    Ok(Json(ApiResponse::success(vendor)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vendors/{id}",
    summary = "Delete vendor",
    description = "Materials and orders supplied by the vendor are kept and lose their vendor reference",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 204, description = "Vendor deleted"),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
    ),
    tag = "vendors"
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.vendors.delete_vendor(id).await?;
    Ok(no_content_response())
}
