//! Purchase orders for material rolls.
//!
//! The free functions at the top are the query layer the inventory
//! aggregator builds on; [`MaterialOrderService`] owns the CRUD surface and
//! recomputes the touched material(s) after every write.

use crate::{
    db::DbPool,
    entities::{material, material_order},
    errors::ServiceError,
    events::{Event, EventSender},
    money::Money,
    services::{
        clean_text, double_option, material_inventory::MaterialInventoryService,
        validate_non_negative_money, validate_not_blank, validate_positive_feet,
    },
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// All orders whose material is in `material_ids`, oldest first.
pub async fn orders_for_materials<C: ConnectionTrait>(
    db: &C,
    material_ids: &[Uuid],
) -> Result<Vec<material_order::Model>, ServiceError> {
    if material_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(material_order::Entity::find()
        .filter(material_order::Column::MaterialId.is_in(material_ids.iter().copied()))
        .order_by_asc(material_order::Column::OrderDate)
        .all(db)
        .await?)
}

/// Splits orders into `(arrived, not_arrived)`.
pub fn partition_by_arrival(
    orders: &[material_order::Model],
) -> (Vec<&material_order::Model>, Vec<&material_order::Model>) {
    orders.iter().partition(|o| o.has_arrived)
}

pub fn order_length(order: &material_order::Model) -> Decimal {
    order.length()
}

pub fn sum_lengths<'a>(orders: impl IntoIterator<Item = &'a material_order::Model>) -> Decimal {
    orders.into_iter().map(order_length).sum()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialOrderRequest {
    pub material_id: Uuid,
    /// Defaults to the material's vendor
    pub vendor_id: Option<Uuid>,
    #[validate(
        length(min = 1, max = 100, message = "Purchase order number is required"),
        custom = "validate_not_blank"
    )]
    pub purchase_order_number: String,
    pub order_date: Option<DateTime<Utc>>,
    pub arrival_date: Option<DateTime<Utc>>,
    #[validate(custom = "validate_positive_feet")]
    pub feet_per_roll: Decimal,
    #[validate(range(min = 1, message = "At least one roll is required"))]
    pub total_rolls: i32,
    #[serde(default)]
    pub has_arrived: bool,
    #[validate(custom = "validate_non_negative_money")]
    #[schema(value_type = Option<String>, example = "45.50")]
    pub freight_charge: Option<Money>,
    #[validate(custom = "validate_non_negative_money")]
    #[schema(value_type = Option<String>, example = "12.00")]
    pub fuel_charge: Option<Money>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMaterialOrderRequest {
    pub material_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub vendor_id: Option<Option<Uuid>>,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub purchase_order_number: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub arrival_date: Option<Option<DateTime<Utc>>>,
    #[validate(custom = "validate_positive_feet")]
    pub feet_per_roll: Option<Decimal>,
    #[validate(range(min = 1))]
    pub total_rolls: Option<i32>,
    pub has_arrived: Option<bool>,
    #[validate(custom = "validate_non_negative_money")]
    #[schema(value_type = Option<String>)]
    pub freight_charge: Option<Money>,
    #[validate(custom = "validate_non_negative_money")]
    #[schema(value_type = Option<String>)]
    pub fuel_charge: Option<Money>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaterialOrderResponse {
    pub id: Uuid,
    pub material_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub purchase_order_number: String,
    pub order_date: DateTime<Utc>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub feet_per_roll: Decimal,
    pub total_rolls: i32,
    /// `feet_per_roll × total_rolls`
    pub total_length: Decimal,
    pub has_arrived: bool,
    #[schema(value_type = String, example = "45.50")]
    pub freight_charge: Money,
    #[schema(value_type = String, example = "12.00")]
    pub fuel_charge: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<material_order::Model> for MaterialOrderResponse {
    fn from(m: material_order::Model) -> Self {
        Self {
            total_length: m.length(),
            freight_charge: m.freight_charge(),
            fuel_charge: m.fuel_charge(),
            id: m.id,
            material_id: m.material_id,
            vendor_id: m.vendor_id,
            purchase_order_number: m.purchase_order_number,
            order_date: m.order_date,
            arrival_date: m.arrival_date,
            feet_per_roll: m.feet_per_roll,
            total_rolls: m.total_rolls,
            has_arrived: m.has_arrived,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Query parameters for listing material orders
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct MaterialOrderFilter {
    pub material_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub has_arrived: Option<bool>,
}

/// Service for managing material purchase orders
#[derive(Clone)]
pub struct MaterialOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    inventory: MaterialInventoryService,
}

impl MaterialOrderService {
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

    async fn find_material(&self, id: Uuid) -> Result<material::Model, ServiceError> {
        material::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", id))
    }

    async fn find_order(&self, id: Uuid) -> Result<material_order::Model, ServiceError> {
        material_order::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material order", id))
    }

    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        request: CreateMaterialOrderRequest,
    ) -> Result<MaterialOrderResponse, ServiceError> {
        request.validate()?;
        let material = self.find_material(request.material_id).await?;

        let now = Utc::now();
        let arrival_date = match (request.has_arrived, request.arrival_date) {
            (true, None) => Some(now),
            (_, date) => date,
        };
        let order = material_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            material_id: Set(material.id),
            vendor_id: Set(request.vendor_id.or(material.vendor_id)),
            purchase_order_number: Set(request.purchase_order_number.trim().to_string()),
            order_date: Set(request.order_date.unwrap_or(now)),
            arrival_date: Set(arrival_date),
            feet_per_roll: Set(request.feet_per_roll),
            total_rolls: Set(request.total_rolls),
            has_arrived: Set(request.has_arrived),
            freight_charge_cents: Set(request.freight_charge.unwrap_or_default().cents()),
            fuel_charge_cents: Set(request.fuel_charge.unwrap_or_default().cents()),
            notes: Set(clean_text(request.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        counter!("labelbase_material_orders_created", 1);
        info!(
            order_id = %order.id,
            material_id = %order.material_id,
            length = %order.length(),
            "material order created"
        );
        self.event_sender
            .send_or_log(Event::MaterialOrderCreated {
                order_id: order.id,
                material_id: order.material_id,
            })
            .await;
        self.inventory
            .recompute_material_inventory(order.material_id)
            .await?;

        Ok(order.into())
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> Result<MaterialOrderResponse, ServiceError> {
        self.find_order(id).await.map(Into::into)
    }

    /// Orders matching `filter`, newest first, plus the total count.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: MaterialOrderFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<MaterialOrderResponse>, u64), ServiceError> {
        let mut query = material_order::Entity::find();
        if let Some(material_id) = filter.material_id {
            query = query.filter(material_order::Column::MaterialId.eq(material_id));
        }
        if let Some(vendor_id) = filter.vendor_id {
            query = query.filter(material_order::Column::VendorId.eq(vendor_id));
        }
        if let Some(has_arrived) = filter.has_arrived {
            query = query.filter(material_order::Column::HasArrived.eq(has_arrived));
        }

        let paginator = query
            .order_by_desc(material_order::Column::OrderDate)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((orders.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    pub async fn update_order(
        &self,
        id: Uuid,
        request: UpdateMaterialOrderRequest,
    ) -> Result<MaterialOrderResponse, ServiceError> {
        request.validate()?;
        let existing = self.find_order(id).await?;
        let previous_material = existing.material_id;
        let was_arrived = existing.has_arrived;
        let had_arrival_date = existing.arrival_date.is_some();

        if let Some(material_id) = request.material_id {
            if material_id != previous_material {
                self.find_material(material_id).await?;
            }
        }

        let mut active: material_order::ActiveModel = existing.into();
        if let Some(material_id) = request.material_id {
            active.material_id = Set(material_id);
        }
        if let Some(vendor_id) = request.vendor_id {
            active.vendor_id = Set(vendor_id);
        }
        if let Some(po) = request.purchase_order_number {
            active.purchase_order_number = Set(po.trim().to_string());
        }
        if let Some(order_date) = request.order_date {
            active.order_date = Set(order_date);
        }
        if let Some(feet) = request.feet_per_roll {
            active.feet_per_roll = Set(feet);
        }
        if let Some(rolls) = request.total_rolls {
            active.total_rolls = Set(rolls);
        }
        if let Some(charge) = request.freight_charge {
            active.freight_charge_cents = Set(charge.cents());
        }
        if let Some(charge) = request.fuel_charge {
            active.fuel_charge_cents = Set(charge.cents());
        }
        if request.notes.is_some() {
            active.notes = Set(clean_text(request.notes));
        }
        let explicit_arrival = request.arrival_date.is_some();
        if let Some(arrival_date) = request.arrival_date {
            active.arrival_date = Set(arrival_date);
        }
        if let Some(has_arrived) = request.has_arrived {
            active.has_arrived = Set(has_arrived);
            if has_arrived && !was_arrived && !had_arrival_date && !explicit_arrival {
                active.arrival_date = Set(Some(Utc::now()));
            }
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        counter!("labelbase_material_orders_updated", 1);
        self.event_sender
            .send_or_log(Event::MaterialOrderUpdated {
                order_id: updated.id,
                material_id: updated.material_id,
            })
            .await;

        self.inventory
            .recompute_material_inventory(updated.material_id)
            .await?;
        if previous_material != updated.material_id {
            self.recompute_if_present(previous_material).await?;
        }

        Ok(updated.into())
    }

    /// Flags the order as received. Calling it again changes nothing.
    #[instrument(skip(self))]
    pub async fn mark_arrived(&self, id: Uuid) -> Result<MaterialOrderResponse, ServiceError> {
        let existing = self.find_order(id).await?;
        if existing.has_arrived && existing.arrival_date.is_some() {
            return Ok(existing.into());
        }

        let material_id = existing.material_id;
        let arrival_date = existing.arrival_date.unwrap_or_else(Utc::now);
        let mut active: material_order::ActiveModel = existing.into();
        active.has_arrived = Set(true);
        active.arrival_date = Set(Some(arrival_date));
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        counter!("labelbase_material_orders_arrived", 1);
        info!(order_id = %id, %material_id, length = %updated.length(), "material order arrived");
        self.event_sender
            .send_or_log(Event::MaterialOrderArrived {
                order_id: id,
                material_id,
            })
            .await;
        self.inventory
            .recompute_material_inventory(material_id)
            .await?;

        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find_order(id).await?;
        material_order::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;

        counter!("labelbase_material_orders_deleted", 1);
        info!(order_id = %id, material_id = %existing.material_id, "material order deleted");
        self.event_sender
            .send_or_log(Event::MaterialOrderDeleted {
                order_id: id,
                material_id: existing.material_id,
            })
            .await;
        self.recompute_if_present(existing.material_id).await
    }

    async fn recompute_if_present(&self, material_id: Uuid) -> Result<(), ServiceError> {
        match self
            .inventory
            .recompute_material_inventory(material_id)
            .await
        {
            Ok(_) | Err(ServiceError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_order(
    material_id: Uuid,
    feet_per_roll: Decimal,
    rolls: i32,
    arrived: bool,
) -> material_order::Model {
    let now = Utc::now();
    material_order::Model {
        id: Uuid::new_v4(),
        material_id,
        vendor_id: None,
        purchase_order_number: "PO-TEST".to_string(),
        order_date: now,
        arrival_date: arrived.then_some(now),
        feet_per_roll,
        total_rolls: rolls,
        has_arrived: arrived,
        freight_charge_cents: 0,
        fuel_charge_cents: 0,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn partition_splits_on_arrival_flag() {
        let material = Uuid::new_v4();
        let orders = vec![
            test_order(material, dec!(100), 10, true),
            test_order(material, dec!(50), 5, false),
            test_order(material, dec!(25), 2, true),
        ];
        let (arrived, pending) = partition_by_arrival(&orders);
        assert_eq!(arrived.len(), 2);
        assert_eq!(pending.len(), 1);
        assert_eq!(sum_lengths(arrived), dec!(1050));
        assert_eq!(sum_lengths(pending), dec!(250));
    }

    #[test]
    fn order_length_is_feet_times_rolls() {
        let order = test_order(Uuid::new_v4(), dec!(12.5), 4, false);
        assert_eq!(order_length(&order), dec!(50));
        assert_eq!(sum_lengths(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn create_request_rejects_bad_quantities() {
        let mut request: CreateMaterialOrderRequest = serde_json::from_value(serde_json::json!({
            "material_id": Uuid::new_v4(),
            "purchase_order_number": "PO-1",
            "feet_per_roll": "100",
            "total_rolls": 0,
            "freight_charge": "-1.00"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("total_rolls"));
        assert!(fields.contains_key("freight_charge"));

        request.total_rolls = 3;
        request.freight_charge = Some(Money::from_cents(4550));
        request.feet_per_roll = dec!(0);
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("feet_per_roll"));
    }

    #[test]
    fn response_exposes_dollars_and_total_length() {
        let mut order = test_order(Uuid::new_v4(), dec!(100), 3, true);
        order.freight_charge_cents = 4550;
        let response = MaterialOrderResponse::from(order);
        assert_eq!(response.total_length, dec!(300));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["freight_charge"], "45.50");
        assert_eq!(json["fuel_charge"], "0.00");
    }
}
