use super::common::{
    created_response, no_content_response, paginate, JsonBody, PaginationParams, Path, Query,
};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::tickets::{CreateTicketRequest, TicketFilter, TicketResponse, UpdateTicketRequest},
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
    path = "/api/v1/tickets",
    summary = "List tickets",
    params(TicketFilter, PaginationParams),
    responses(
        (status = 200, description = "Tickets retrieved", body = ApiResponse<PaginatedResponse<TicketResponse>>),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse),
    ),
    tag = "tickets"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<TicketResponse>> {
    let (page, limit) = params.resolve(&state.config);
    let (items, total) = state
        .services
        .tickets
        .list_tickets(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    summary = "Create ticket",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = ApiResponse<TicketResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Ticket number already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "tickets"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateTicketRequest>,
) -> Result<Response, ServiceError> {
    let ticket = state.services.tickets.create_ticket(request).await?;
    Ok(created_response(ticket))
}

#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    summary = "Get ticket",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket retrieved", body = ApiResponse<TicketResponse>),
        (status = 404, description = "Ticket not found", body = crate::errors::ErrorResponse),
    ),
    tag = "tickets"
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TicketResponse> {
    let ticket = state.services.tickets.get_ticket(id).await?;
    Ok(Json(ApiResponse::success(ticket)))
}

#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}",
    summary = "Update ticket",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = UpdateTicketRequest,
    responses(
        (status = 200, description = "Ticket updated", body = ApiResponse<TicketResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Ticket or material not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Ticket number already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "tickets"
)]
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateTicketRequest>,
) -> ApiResult<TicketResponse> {
    let ticket = state.services.tickets.update_ticket(id, request).await?;
    Ok(Json(ApiResponse::success(ticket)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tickets/{id}",
    summary = "Delete ticket",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 404, description = "Ticket not found", body = crate::errors::ErrorResponse),
    ),
    tag = "tickets"
)]
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.tickets.delete_ticket(id).await?;
    Ok(no_content_response())
}
