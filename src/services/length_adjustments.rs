use crate::{
    db::DbPool,
    entities::{material, material_length_adjustment},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{clean_text, material_inventory::MaterialInventoryService, validate_non_zero_feet},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLengthAdjustmentRequest {
    pub material_id: Uuid,
    /// Signed feet; negative removes length
    #[validate(custom = "validate_non_zero_feet")]
    pub length: Decimal,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LengthAdjustmentResponse {
    pub id: Uuid,
    pub material_id: Uuid,
    pub length: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<material_length_adjustment::Model> for LengthAdjustmentResponse {
    fn from(m: material_length_adjustment::Model) -> Self {
        Self {
            id: m.id,
            material_id: m.material_id,
            length: m.length,
            notes: m.notes,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LengthAdjustmentFilter {
    pub material_id: Uuid,
}

/// Service for manual corrections to a material's on-hand length
#[derive(Clone)]
pub struct LengthAdjustmentService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    inventory: MaterialInventoryService,
}

impl LengthAdjustmentService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        inventory: MaterialInventoryService,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            inventory,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_adjustment(
        &self,
        request: CreateLengthAdjustmentRequest,
    ) -> Result<LengthAdjustmentResponse, ServiceError> {
        request.validate()?;
        material::Entity::find_by_id(request.material_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", request.material_id))?;

        let adjustment = material_length_adjustment::ActiveModel {
            id: Set(Uuid::new_v4()),
            material_id: Set(request.material_id),
            length: Set(request.length),
            notes: Set(clean_text(request.notes)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(
            adjustment_id = %adjustment.id,
            material_id = %adjustment.material_id,
            length = %adjustment.length,
            "length adjustment recorded"
        );
        self.event_sender
            .send_or_log(Event::LengthAdjustmentCreated {
                adjustment_id: adjustment.id,
                material_id: adjustment.material_id,
            })
            .await;
        self.inventory
            .recompute_material_inventory(adjustment.material_id)
            .await?;
        Ok(adjustment.into())
    }

    #[instrument(skip(self))]
    pub async fn get_adjustment(&self, id: Uuid) -> Result<LengthAdjustmentResponse, ServiceError> {
        material_length_adjustment::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::not_found("Length adjustment", id))
    }

    /// Adjustments of one material, oldest first.
    #[instrument(skip(self))]
    pub async fn list_for_material(
        &self,
        material_id: Uuid,
    ) -> Result<Vec<LengthAdjustmentResponse>, ServiceError> {
        Ok(material_length_adjustment::Entity::find()
            .filter(material_length_adjustment::Column::MaterialId.eq(material_id))
            .order_by_asc(material_length_adjustment::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn delete_adjustment(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = material_length_adjustment::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Length adjustment", id))?;
        material_length_adjustment::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;

        info!(adjustment_id = %id, material_id = %existing.material_id, "length adjustment deleted");
        self.event_sender
            .send_or_log(Event::LengthAdjustmentDeleted {
                adjustment_id: id,
                material_id: existing.material_id,
            })
            .await;
        self.inventory
            .recompute_material_inventory(existing.material_id)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_length_adjustments_are_rejected() {
        let request = CreateLengthAdjustmentRequest {
            material_id: Uuid::new_v4(),
            length: dec!(0),
            notes: None,
        };
        assert!(request.validate().is_err());

        let negative = CreateLengthAdjustmentRequest {
            length: dec!(-12.5),
            ..request
        };
        assert!(negative.validate().is_ok());
    }
}
