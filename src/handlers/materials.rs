use super::common::{
    created_response, no_content_response, page_offset, paginate, JsonBody, PaginationParams, Path,
    Query,
};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    inventory_store::{FilterSet, InventoryMaterial, NamedFilter},
    services::{
        material_inventory::MaterialInventoryReport,
        materials::{CreateMaterialRequest, UpdateMaterialRequest},
    },
    ApiResponse, ApiResult, PaginatedResponse,
};
use axum::{
    extract::State,
    response::Response,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// Query string shared by the material list and the inventory summary.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaterialListQuery {
    /// Case-insensitive text search
    pub search: Option<String>,
    /// JSON array of `{"name": .., "filter": {"type": .., "value": ..}}`
    pub filters: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl MaterialListQuery {
    pub fn search(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn filter_set(&self) -> Result<FilterSet, ServiceError> {
        let Some(raw) = self.filters.as_deref().filter(|raw| !raw.trim().is_empty()) else {
            return Ok(FilterSet::new());
        };
        let named: Vec<NamedFilter> = serde_json::from_str(raw)
            .map_err(|e| ServiceError::BadRequest(format!("Invalid filters: {}", e)))?;
        Ok(named.into_iter().collect())
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/materials",
    summary = "List materials",
    description = "Served from the in-memory inventory store: text search, then filters in the given order, then sorted critical/warning/healthy and by name",
    params(MaterialListQuery),
    responses(
        (status = 200, description = "Materials retrieved", body = ApiResponse<PaginatedResponse<InventoryMaterial>>),
        (status = 400, description = "Malformed filters", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialListQuery>,
) -> ApiResult<PaginatedResponse<InventoryMaterial>> {
    let filters = query.filter_set()?;
    let (page, limit) = query.pagination().resolve(&state.config);

    let store = state.store.read().await;
    let visible = store.visible(query.search(), &filters);
    let total = visible.len() as u64;
    let items = visible
        .into_iter()
        .skip(page_offset(page, limit))
        .take(limit as usize)
        .cloned()
        .collect();
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

#[utoipa::path(
    post,
    path = "/api/v1/materials",
    summary = "Create material",
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Material created", body = ApiResponse<InventoryMaterial>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Material code already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn create_material(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateMaterialRequest>,
) -> Result<Response, ServiceError> {
    let material = state.services.materials.create_material(request).await?;
    Ok(created_response(material))
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    summary = "Get material",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material retrieved", body = ApiResponse<InventoryMaterial>),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<InventoryMaterial> {
    let material = state.services.materials.get_material(id).await?;
    Ok(Json(ApiResponse::success(material)))
}

#[utoipa::path(
    put,
    path = "/api/v1/materials/{id}",
    summary = "Update material",
    params(("id" = Uuid, Path, description = "Material ID")),
    request_body = UpdateMaterialRequest,
    responses(
        (status = 200, description = "Material updated", body = ApiResponse<InventoryMaterial>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material or vendor not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Material code already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateMaterialRequest>,
) -> ApiResult<InventoryMaterial> {
    let material = state.services.materials.update_material(id, request).await?;
    Ok(Json(ApiResponse::success(material)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/materials/{id}",
    summary = "Delete material",
    description = "Also deletes the material's orders and length adjustments; tickets lose their primary material",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 204, description = "Material deleted"),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.materials.delete_material(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}/inventory",
    summary = "Material inventory",
    description = "Purchase-order snapshot of the material with its related order and adjustment ids",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Inventory built", body = ApiResponse<MaterialInventoryReport>),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn get_material_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<MaterialInventoryReport> {
    let report = state.services.inventory.inventory_report(id).await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    post,
    path = "/api/v1/materials/{id}/recompute",
    summary = "Recompute material inventory",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Inventory recomputed", body = ApiResponse<InventoryMaterial>),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    tag = "materials"
)]
pub async fn recompute_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<InventoryMaterial> {
    let material = state
        .services
        .inventory
        .recompute_material_inventory(id)
        .await?;
    Ok(Json(ApiResponse::success(material)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory_store::MaterialFilter;
    use assert_matches::assert_matches;

    #[test]
    fn filters_parse_in_order() {
        let query = MaterialListQuery {
            filters: Some(
                r#"[{"name":"neg","filter":{"type":"negative_net"}},{"name":"low","filter":{"type":"low_stock"}}]"#
                    .into(),
            ),
            ..Default::default()
        };
        let set = query.filter_set().unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["neg", "low"]);
        assert_eq!(set.get("low"), Some(&MaterialFilter::LowStock));
    }

    #[test]
    fn blank_or_missing_filters_mean_none() {
        assert!(MaterialListQuery::default().filter_set().unwrap().is_empty());
        let blank = MaterialListQuery {
            filters: Some("  ".into()),
            ..Default::default()
        };
        assert!(blank.filter_set().unwrap().is_empty());
    }

    #[test]
    fn malformed_filters_are_a_bad_request() {
        let query = MaterialListQuery {
            filters: Some(r#"[{"name":"x","filter":{"type":"nope"}}]"#.into()),
            ..Default::default()
        };
        assert_matches!(query.filter_set(), Err(ServiceError::BadRequest(_)));
    }
}
