use super::common::{
    created_response, no_content_response, paginate, JsonBody, PaginationParams, Path, Query,
};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::material_orders::{
        CreateMaterialOrderRequest, MaterialOrderFilter, MaterialOrderResponse,
        UpdateMaterialOrderRequest,
    },
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
    path = "/api/v1/material-orders",
    summary = "List material orders",
    params(MaterialOrderFilter, PaginationParams),
    responses(
        (status = 200, description = "Material orders retrieved", body = ApiResponse<PaginatedResponse<MaterialOrderResponse>>),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse),
    ),
    tag = "material-orders"
)]
pub async fn list_material_orders(
    State(state): State<AppState>,
    Query(filter): Query<MaterialOrderFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<MaterialOrderResponse>> {
    let (page, limit) = params.resolve(&state.config);
    let (items, total) = state
        .services
        .material_orders
        .list_orders(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

#[utoipa::path(
    post,
    path = "/api/v1/material-orders",
    summary = "Create material order",
    request_body = CreateMaterialOrderRequest,
    responses(
        (status = 201, description = "Material order created", body = ApiResponse<MaterialOrderResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    tag = "material-orders"
)]
pub async fn create_material_order(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateMaterialOrderRequest>,
) -> Result<Response, ServiceError> {
    let order = state.services.material_orders.create_order(request).await?;
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/material-orders/{id}",
    summary = "Get material order",
    params(("id" = Uuid, Path, description = "Material order ID")),
    responses(
        (status = 200, description = "Material order retrieved", body = ApiResponse<MaterialOrderResponse>),
        (status = 404, description = "Material order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "material-orders"
)]
pub async fn get_material_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<MaterialOrderResponse> {
    let order = state.services.material_orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    put,
    path = "/api/v1/material-orders/{id}",
    summary = "Update material order",
    params(("id" = Uuid, Path, description = "Material order ID")),
    request_body = UpdateMaterialOrderRequest,
    responses(
        (status = 200, description = "Material order updated", body = ApiResponse<MaterialOrderResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material order or material not found", body = crate::errors::ErrorResponse),
    ),
    tag = "material-orders"
)]
pub async fn update_material_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateMaterialOrderRequest>,
) -> ApiResult<MaterialOrderResponse> {
    let order = state
        .services
        .material_orders
        .update_order(id, request)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/material-orders/{id}/arrive",
    summary = "Mark material order arrived",
    description = "Idempotent; the arrival date is set to now unless one is already recorded",
    params(("id" = Uuid, Path, description = "Material order ID")),
    responses(
        (status = 200, description = "Material order marked arrived", body = ApiResponse<MaterialOrderResponse>),
        (status = 404, description = "Material order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "material-orders"
)]
pub async fn mark_material_order_arrived(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<MaterialOrderResponse> {
    let order = state.services.material_orders.mark_arrived(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/material-orders/{id}",
    summary = "Delete material order",
    params(("id" = Uuid, Path, description = "Material order ID")),
    responses(
        (status = 204, description = "Material order deleted"),
        (status = 404, description = "Material order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "material-orders"
)]
pub async fn delete_material_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.material_orders.delete_order(id).await?;
    Ok(no_content_response())
}
