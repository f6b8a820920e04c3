use super::{common::Query, materials::MaterialListQuery};
use crate::{
    events::MaterialEvent,
    handlers::AppState,
    inventory_store::InventorySummary,
    ApiResponse, ApiResult,
};
use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    Json,
};
use futures::{stream, Stream};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct RecomputeAllResponse {
    pub materials_recomputed: usize,
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/summary",
    summary = "Inventory totals",
    description = "Totals over the materials the same search and filters would list",
    params(MaterialListQuery),
    responses(
        (status = 200, description = "Summary computed", body = ApiResponse<InventorySummary>),
        (status = 400, description = "Malformed filters", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn inventory_summary(
    State(state): State<AppState>,
    Query(query): Query<MaterialListQuery>,
) -> ApiResult<InventorySummary> {
    let filters = query.filter_set()?;
    let summary = state.store.read().await.summary(query.search(), &filters);
    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/recompute",
    summary = "Recompute every material",
    description = "Rewrites the persisted inventory figures of all materials",
    responses(
        (status = 200, description = "Inventory recomputed", body = ApiResponse<RecomputeAllResponse>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn recompute_all(State(state): State<AppState>) -> ApiResult<RecomputeAllResponse> {
    let materials_recomputed = state.services.inventory.recompute_all().await?;
    Ok(Json(ApiResponse::success(RecomputeAllResponse {
        materials_recomputed,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/events",
    summary = "Material event stream",
    description = "Server-sent events: `event` is the wire name (MATERIAL:CREATED, MATERIAL:UPDATED, MATERIAL:DELETED), `data` the JSON payload",
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = String),
    ),
    tag = "inventory"
)]
pub async fn material_event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    debug!("material event subscriber connected");
    Sse::new(material_events(state.material_events.subscribe())).keep_alive(KeepAlive::default())
}

/// Turns a broadcast receiver into SSE events. Lagging subscribers skip what
/// they missed.
fn material_events(
    rx: broadcast::Receiver<MaterialEvent>,
) -> impl Stream<Item = Result<SseEvent, axum::Error>> {
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((to_sse(&event), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "material event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

fn to_sse(event: &MaterialEvent) -> Result<SseEvent, axum::Error> {
    let sse = SseEvent::default().event(event.name());
    match event {
        MaterialEvent::Created(material) | MaterialEvent::Updated(material) => {
            sse.json_data(material)
        }
        MaterialEvent::Deleted(id) => sse.json_data(serde_json::json!({ "id": id })),
    }
}
