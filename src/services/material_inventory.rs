//! Material inventory aggregation.
//!
//! Two views are built from the same inputs:
//!
//! * the *snapshot* ([`MaterialInventorySnapshot`]) reports purchase-order
//!   figures for one material: length in stock, length on order and the
//!   in-stock length net of ticket consumption;
//! * the *persisted* figures ([`MaterialInventory`]) stored on the material
//!   row, which additionally fold in manual length adjustments.
//!
//! Missing materials or orders never fail aggregation; they yield zeros.

use crate::{
    db::DbPool,
    entities::{material, material_length_adjustment, material_order},
    errors::ServiceError,
    events::{Event, EventSender},
    inventory_store::{InventoryMaterial, MaterialInventory},
    services::{
        material_orders::{
            orders_for_materials, partition_by_arrival, sum_lengths, MaterialOrderResponse,
        },
        tickets::consumption_for_materials,
        vendors::vendor_name,
    },
};
use chrono::Utc;
use metrics::{counter, gauge};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialInventorySnapshot {
    pub length_of_material_in_stock: Decimal,
    pub length_of_material_ordered: Decimal,
    pub net_length_of_material_in_stock: Decimal,
    pub purchase_orders_for_material: Vec<MaterialOrderResponse>,
}

/// Snapshot for one material from its orders and the feet its tickets used.
/// Negative net values are reported as they are.
pub fn build_inventory_snapshot(
    orders: Vec<material_order::Model>,
    consumed: Decimal,
) -> MaterialInventorySnapshot {
    let (arrived, pending) = partition_by_arrival(&orders);
    let in_stock = sum_lengths(arrived);
    let ordered = sum_lengths(pending);
    MaterialInventorySnapshot {
        length_of_material_in_stock: in_stock,
        length_of_material_ordered: ordered,
        net_length_of_material_in_stock: in_stock - consumed,
        purchase_orders_for_material: orders.into_iter().map(Into::into).collect(),
    }
}

/// Persisted figures: `arrived + adjustments - consumed`; on-order length is
/// kept apart.
pub fn derive_material_inventory(
    orders: &[material_order::Model],
    adjustments_total: Decimal,
    consumed: Decimal,
) -> MaterialInventory {
    let (arrived, pending) = partition_by_arrival(orders);
    let length_arrived = sum_lengths(arrived);
    MaterialInventory {
        net_length_available: length_arrived + adjustments_total - consumed,
        length_arrived,
        length_not_arrived: sum_lengths(pending),
        sum_of_length_adjustments: adjustments_total,
    }
}

async fn adjustments_total<C: ConnectionTrait>(
    db: &C,
    material_id: Uuid,
) -> Result<(Decimal, Vec<Uuid>), ServiceError> {
    let adjustments = material_length_adjustment::Entity::find()
        .filter(material_length_adjustment::Column::MaterialId.eq(material_id))
        .order_by_asc(material_length_adjustment::Column::CreatedAt)
        .all(db)
        .await?;
    let total = adjustments.iter().map(|a| a.length).sum();
    Ok((total, adjustments.into_iter().map(|a| a.id).collect()))
}

/// Full inventory view of one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaterialInventoryReport {
    pub material: InventoryMaterial,
    pub snapshot: MaterialInventorySnapshot,
    pub material_order_ids: Vec<Uuid>,
    pub length_adjustment_ids: Vec<Uuid>,
}

/// Builds inventory snapshots and keeps the persisted figures current
#[derive(Clone)]
pub struct MaterialInventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MaterialInventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn build_inventory_for_material(
        &self,
        material_id: Uuid,
    ) -> Result<MaterialInventorySnapshot, ServiceError> {
        let mut snapshots = self.build_inventory_for_materials(&[material_id]).await?;
        Ok(snapshots.remove(&material_id).unwrap_or_default())
    }

    /// One snapshot per requested id, including ids with no orders at all.
    /// Orders and consumption are each fetched in a single query.
    #[instrument(skip(self, material_ids), fields(count = material_ids.len()))]
    pub async fn build_inventory_for_materials(
        &self,
        material_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, MaterialInventorySnapshot>, ServiceError> {
        let db = &*self.db_pool;
        let orders = orders_for_materials(db, material_ids).await?;
        let consumption = consumption_for_materials(db, material_ids).await?;

        let mut by_material: HashMap<Uuid, Vec<material_order::Model>> = material_ids
            .iter()
            .map(|id| (*id, Vec::new()))
            .collect();
        for order in orders {
            by_material.entry(order.material_id).or_default().push(order);
        }

        Ok(by_material
            .into_iter()
            .map(|(id, orders)| {
                let consumed = consumption.get(&id).copied().unwrap_or_default();
                (id, build_inventory_snapshot(orders, consumed))
            })
            .collect())
    }

    /// Rewrites the material's inventory columns from its orders,
    /// adjustments and tickets, then publishes the refreshed record.
    #[instrument(skip(self))]
    pub async fn recompute_material_inventory(
        &self,
        material_id: Uuid,
    ) -> Result<InventoryMaterial, ServiceError> {
        let db = &*self.db_pool;
        let existing = material::Entity::find_by_id(material_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", material_id))?;

        let orders = orders_for_materials(db, &[material_id]).await?;
        let (adjusted, _) = adjustments_total(db, material_id).await?;
        let consumed = consumption_for_materials(db, &[material_id])
            .await?
            .remove(&material_id)
            .unwrap_or_default();
        let inventory = derive_material_inventory(&orders, adjusted, consumed);

        let vendor_id = existing.vendor_id;
        let mut active: material::ActiveModel = existing.into();
        active.net_length_available = Set(inventory.net_length_available);
        active.length_arrived = Set(inventory.length_arrived);
        active.length_not_arrived = Set(inventory.length_not_arrived);
        active.sum_of_length_adjustments = Set(inventory.sum_of_length_adjustments);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        counter!("labelbase_inventory_recomputes", 1);
        debug!(
            %material_id,
            net = %inventory.net_length_available,
            arrived = %inventory.length_arrived,
            on_order = %inventory.length_not_arrived,
            "material inventory recomputed"
        );

        let material = InventoryMaterial::from_model(updated, vendor_name(db, vendor_id).await?);
        self.event_sender
            .send_or_log(Event::MaterialUpdated(material.clone()))
            .await;
        Ok(material)
    }

    /// Recomputes every material; returns how many were rewritten.
    #[instrument(skip(self))]
    pub async fn recompute_all(&self) -> Result<usize, ServiceError> {
        let ids: Vec<Uuid> = material::Entity::find()
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        let started = std::time::Instant::now();
        for id in &ids {
            self.recompute_material_inventory(*id).await?;
        }
        gauge!(
            "labelbase_inventory_recompute_all_seconds",
            started.elapsed().as_secs_f64()
        );
        info!(materials = ids.len(), "recomputed inventory for all materials");
        Ok(ids.len())
    }

    #[instrument(skip(self))]
    pub async fn inventory_report(
        &self,
        material_id: Uuid,
    ) -> Result<MaterialInventoryReport, ServiceError> {
        let db = &*self.db_pool;
        let model = material::Entity::find_by_id(material_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", material_id))?;
        let name = vendor_name(db, model.vendor_id).await?;

        let snapshot = self.build_inventory_for_material(material_id).await?;
        let (_, length_adjustment_ids) = adjustments_total(db, material_id).await?;
        let material_order_ids = snapshot
            .purchase_orders_for_material
            .iter()
            .map(|o| o.id)
            .collect();

        Ok(MaterialInventoryReport {
            material: InventoryMaterial::from_model(model, name),
            snapshot,
            material_order_ids,
            length_adjustment_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::material_orders::test_order;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn snapshot_for_the_reference_material() {
        let m = Uuid::new_v4();
        let orders = vec![
            test_order(m, dec!(100), 10, true),
            test_order(m, dec!(50), 5, false),
        ];
        let snapshot = build_inventory_snapshot(orders, dec!(200));
        assert_eq!(snapshot.length_of_material_in_stock, dec!(1000));
        assert_eq!(snapshot.length_of_material_ordered, dec!(250));
        assert_eq!(snapshot.net_length_of_material_in_stock, dec!(800));
        assert_eq!(snapshot.purchase_orders_for_material.len(), 2);
    }

    #[test]
    fn no_orders_yields_zero_minus_consumption() {
        let snapshot = build_inventory_snapshot(Vec::new(), dec!(30));
        assert_eq!(snapshot.length_of_material_in_stock, Decimal::ZERO);
        assert_eq!(snapshot.length_of_material_ordered, Decimal::ZERO);
        assert_eq!(snapshot.net_length_of_material_in_stock, dec!(-30));
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let json = serde_json::to_value(build_inventory_snapshot(Vec::new(), Decimal::ZERO)).unwrap();
        for key in [
            "lengthOfMaterialInStock",
            "lengthOfMaterialOrdered",
            "netLengthOfMaterialInStock",
            "purchaseOrdersForMaterial",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn persisted_inventory_folds_in_adjustments() {
        let m = Uuid::new_v4();
        let orders = vec![
            test_order(m, dec!(100), 10, true),
            test_order(m, dec!(50), 5, false),
        ];
        let inventory = derive_material_inventory(&orders, dec!(-40), dec!(200));
        assert_eq!(inventory.length_arrived, dec!(1000));
        assert_eq!(inventory.length_not_arrived, dec!(250));
        assert_eq!(inventory.sum_of_length_adjustments, dec!(-40));
        assert_eq!(inventory.net_length_available, dec!(760));
    }

    fn arb_orders() -> impl Strategy<Value = Vec<(i64, i32, bool)>> {
        proptest::collection::vec((1i64..5_000, 1i32..50, any::<bool>()), 0..20)
    }

    proptest! {
        #[test]
        fn in_stock_is_exactly_the_arrived_orders(rows in arb_orders(), consumed in 0i64..100_000) {
            let m = Uuid::new_v4();
            let orders: Vec<_> = rows
                .iter()
                .map(|(feet, rolls, arrived)| test_order(m, Decimal::from(*feet), *rolls, *arrived))
                .collect();
            let expected_stock: Decimal = rows
                .iter()
                .filter(|(_, _, arrived)| *arrived)
                .map(|(feet, rolls, _)| Decimal::from(*feet) * Decimal::from(*rolls))
                .sum();
            let expected_ordered: Decimal = rows
                .iter()
                .filter(|(_, _, arrived)| !*arrived)
                .map(|(feet, rolls, _)| Decimal::from(*feet) * Decimal::from(*rolls))
                .sum();

            let consumed = Decimal::from(consumed);
            let snapshot = build_inventory_snapshot(orders, consumed);
            prop_assert_eq!(snapshot.length_of_material_in_stock, expected_stock);
            prop_assert_eq!(snapshot.length_of_material_ordered, expected_ordered);
            prop_assert_eq!(snapshot.net_length_of_material_in_stock, expected_stock - consumed);
        }

        #[test]
        fn persisted_net_matches_the_derived_formula(
            rows in arb_orders(),
            adjustments in -10_000i64..10_000,
            consumed in 0i64..100_000,
        ) {
            let m = Uuid::new_v4();
            let orders: Vec<_> = rows
                .iter()
                .map(|(feet, rolls, arrived)| test_order(m, Decimal::from(*feet), *rolls, *arrived))
                .collect();
            let inv = derive_material_inventory(&orders, Decimal::from(adjustments), Decimal::from(consumed));
            prop_assert_eq!(
                inv.net_length_available,
                inv.length_arrived + inv.sum_of_length_adjustments - Decimal::from(consumed)
            );
        }
    }
}
