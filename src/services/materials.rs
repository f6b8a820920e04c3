use crate::{
    db::DbPool,
    entities::{material, material_length_adjustment, material_order, ticket},
    errors::ServiceError,
    events::{Event, EventSender},
    inventory_store::InventoryMaterial,
    money::Money,
    services::{
        clean_text, double_option, validate_non_negative_feet, validate_non_negative_money,
        validate_not_blank,
        vendors::{vendor_name, vendor_names},
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialRequest {
    #[validate(
        length(min = 1, max = 255, message = "Material name is required"),
        custom = "validate_not_blank"
    )]
    pub name: String,
    /// Human-facing material code
    #[validate(
        length(min = 1, max = 100, message = "Material code is required"),
        custom = "validate_not_blank"
    )]
    pub material_id: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub category: String,
    pub vendor_id: Option<Uuid>,
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub color: Option<String>,
    #[validate(custom = "validate_non_negative_feet")]
    pub thickness: Option<Decimal>,
    #[validate(custom = "validate_non_negative_feet")]
    pub weight: Option<Decimal>,
    #[validate(custom = "validate_non_negative_feet")]
    pub width: Option<Decimal>,
    #[validate(custom = "validate_non_negative_money")]
    #[schema(value_type = Option<String>, example = "0.42")]
    pub cost_per_msi: Option<Money>,
    #[validate(custom = "validate_non_negative_money")]
    #[schema(value_type = Option<String>, example = "0.05")]
    pub freight_cost_per_msi: Option<Money>,
    #[validate(custom = "validate_non_negative_feet")]
    pub low_stock_threshold: Option<Decimal>,
    #[validate(custom = "validate_non_negative_feet")]
    pub low_stock_buffer: Option<Decimal>,
}

/// Partial update. `vendor_id`, `cost_per_msi` and `freight_cost_per_msi`
/// accept an explicit `null` to clear the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMaterialRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub material_id: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub vendor_id: Option<Option<Uuid>>,
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub color: Option<String>,
    #[validate(custom = "validate_non_negative_feet")]
    pub thickness: Option<Decimal>,
    #[validate(custom = "validate_non_negative_feet")]
    pub weight: Option<Decimal>,
    #[validate(custom = "validate_non_negative_feet")]
    pub width: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub cost_per_msi: Option<Option<Money>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub freight_cost_per_msi: Option<Option<Money>>,
    #[validate(custom = "validate_non_negative_feet")]
    pub low_stock_threshold: Option<Decimal>,
    #[validate(custom = "validate_non_negative_feet")]
    pub low_stock_buffer: Option<Decimal>,
}

impl UpdateMaterialRequest {
    fn money_errors(&self) -> Result<(), ServiceError> {
        let negative = [self.cost_per_msi, self.freight_cost_per_msi]
            .into_iter()
            .flatten()
            .flatten()
            .any(|m| m.is_negative());
        if negative {
            return Err(ServiceError::ValidationError(
                "Costs per MSI must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Service for managing materials
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    default_threshold: Decimal,
    default_buffer: Decimal,
}

impl MaterialService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
            default_threshold: Decimal::ZERO,
            default_buffer: Decimal::ZERO,
        }
    }

    /// Low-stock figures applied when a create request leaves them out.
    pub fn with_stock_defaults(mut self, threshold: Decimal, buffer: Decimal) -> Self {
        self.default_threshold = threshold;
        self.default_buffer = buffer;
        self
    }

    async fn find_material(&self, id: Uuid) -> Result<material::Model, ServiceError> {
        material::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", id))
    }

    async fn ensure_code_free(&self, code: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = material::Entity::find().filter(material::Column::MaterialId.eq(code));
        if let Some(id) = except {
            query = query.filter(material::Column::Id.ne(id));
        }
        if query.count(&*self.db_pool).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "Material code '{}' already exists",
                code
            )));
        }
        Ok(())
    }

    async fn resolve_vendor(&self, vendor_id: Option<Uuid>) -> Result<Option<String>, ServiceError> {
        match vendor_id {
            None => Ok(None),
            Some(id) => vendor_name(&*self.db_pool, Some(id))
                .await?
                .map(Some)
                .ok_or_else(|| ServiceError::not_found("Vendor", id)),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_material(
        &self,
        request: CreateMaterialRequest,
    ) -> Result<InventoryMaterial, ServiceError> {
        request.validate()?;
        let code = request.material_id.trim().to_string();
        self.ensure_code_free(&code, None).await?;
        let vendor = self.resolve_vendor(request.vendor_id).await?;

        let now = Utc::now();
        let model = material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            material_id: Set(code),
            category: Set(request.category.trim().to_string()),
            vendor_id: Set(request.vendor_id),
            description: Set(clean_text(request.description)),
            color: Set(clean_text(request.color)),
            thickness: Set(request.thickness),
            weight: Set(request.weight),
            width: Set(request.width),
            cost_per_msi_cents: Set(request.cost_per_msi.map(|m| m.cents())),
            freight_cost_per_msi_cents: Set(request.freight_cost_per_msi.map(|m| m.cents())),
            low_stock_threshold: Set(request.low_stock_threshold.unwrap_or(self.default_threshold)),
            low_stock_buffer: Set(request.low_stock_buffer.unwrap_or(self.default_buffer)),
            net_length_available: Set(Decimal::ZERO),
            length_arrived: Set(Decimal::ZERO),
            length_not_arrived: Set(Decimal::ZERO),
            sum_of_length_adjustments: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(material_id = %model.id, code = %model.material_id, "material created");
        let material = InventoryMaterial::from_model(model, vendor);
        self.event_sender
            .send_or_log(Event::MaterialCreated(material.clone()))
            .await;
        Ok(material)
    }

    #[instrument(skip(self))]
    pub async fn get_material(&self, id: Uuid) -> Result<InventoryMaterial, ServiceError> {
        let model = self.find_material(id).await?;
        let vendor = vendor_name(&*self.db_pool, model.vendor_id).await?;
        Ok(InventoryMaterial::from_model(model, vendor))
    }

    #[instrument(skip(self))]
    pub async fn update_material(
        &self,
        id: Uuid,
        request: UpdateMaterialRequest,
    ) -> Result<InventoryMaterial, ServiceError> {
        request.validate()?;
        request.money_errors()?;
        let existing = self.find_material(id).await?;

        if let Some(code) = request.material_id.as_deref().map(str::trim) {
            if code != existing.material_id {
                self.ensure_code_free(code, Some(id)).await?;
            }
        }
        if let Some(Some(vendor_id)) = request.vendor_id {
            self.resolve_vendor(Some(vendor_id)).await?;
        }

        let mut active: material::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(code) = request.material_id {
            active.material_id = Set(code.trim().to_string());
        }
        if let Some(category) = request.category {
            active.category = Set(category.trim().to_string());
        }
        if let Some(vendor_id) = request.vendor_id {
            active.vendor_id = Set(vendor_id);
        }
        if request.description.is_some() {
            active.description = Set(clean_text(request.description));
        }
        if request.color.is_some() {
            active.color = Set(clean_text(request.color));
        }
        if request.thickness.is_some() {
            active.thickness = Set(request.thickness);
        }
        if request.weight.is_some() {
            active.weight = Set(request.weight);
        }
        if request.width.is_some() {
            active.width = Set(request.width);
        }
        if let Some(cost) = request.cost_per_msi {
            active.cost_per_msi_cents = Set(cost.map(|m| m.cents()));
        }
        if let Some(cost) = request.freight_cost_per_msi {
            active.freight_cost_per_msi_cents = Set(cost.map(|m| m.cents()));
        }
        if let Some(threshold) = request.low_stock_threshold {
            active.low_stock_threshold = Set(threshold);
        }
        if let Some(buffer) = request.low_stock_buffer {
            active.low_stock_buffer = Set(buffer);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        let vendor = vendor_name(&*self.db_pool, updated.vendor_id).await?;
        let material = InventoryMaterial::from_model(updated, vendor);
        self.event_sender
            .send_or_log(Event::MaterialUpdated(material.clone()))
            .await;
        Ok(material)
    }

    /// Removes the material together with its orders and adjustments.
    /// Tickets stay and lose their primary material.
    #[instrument(skip(self))]
    pub async fn delete_material(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        self.find_material(id).await?;

        ticket::Entity::update_many()
            .col_expr(
                ticket::Column::PrimaryMaterialId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(ticket::Column::PrimaryMaterialId.eq(id))
            .exec(db)
            .await?;
        let orders = material_order::Entity::delete_many()
            .filter(material_order::Column::MaterialId.eq(id))
            .exec(db)
            .await?;
        let adjustments = material_length_adjustment::Entity::delete_many()
            .filter(material_length_adjustment::Column::MaterialId.eq(id))
            .exec(db)
            .await?;
        material::Entity::delete_by_id(id).exec(db).await?;

        info!(
            material_id = %id,
            orders = orders.rows_affected,
            adjustments = adjustments.rows_affected,
            "material deleted"
        );
        self.event_sender.send_or_log(Event::MaterialDeleted(id)).await;
        Ok(())
    }
}

/// Every material as the inventory store holds it; used to hydrate the store
/// at startup.
pub async fn list_inventory_materials<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<InventoryMaterial>, ServiceError> {
    let names = vendor_names(db).await?;
    Ok(material::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|m| {
            let vendor = m.vendor_id.and_then(|v| names.get(&v).cloned());
            InventoryMaterial::from_model(m, vendor)
        })
        .collect())
}
