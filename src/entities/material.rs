use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// A roll-stock material (face stock, laminate, liner...).
///
/// The four inventory columns are derived from material orders, length
/// adjustments and ticket consumption and are only ever written by the
/// inventory recompute.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Human-facing material code, e.g. `MV-2000`.
    #[sea_orm(unique)]
    pub material_id: String,
    pub category: String,
    pub vendor_id: Option<Uuid>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub thickness: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    pub cost_per_msi_cents: Option<i64>,
    pub freight_cost_per_msi_cents: Option<i64>,
    pub low_stock_threshold: Decimal,
    pub low_stock_buffer: Decimal,
    pub net_length_available: Decimal,
    pub length_arrived: Decimal,
    pub length_not_arrived: Decimal,
    pub sum_of_length_adjustments: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn cost_per_msi(&self) -> Option<Money> {
        self.cost_per_msi_cents.map(Money::from_cents)
    }

    pub fn freight_cost_per_msi(&self) -> Option<Money> {
        self.freight_cost_per_msi_cents.map(Money::from_cents)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id",
        on_delete = "SetNull"
    )]
    Vendor,
    #[sea_orm(has_many = "super::material_order::Entity")]
    MaterialOrders,
    #[sea_orm(has_many = "super::material_length_adjustment::Entity")]
    LengthAdjustments,
    #[sea_orm(has_many = "super::ticket::Entity")]
    Tickets,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::material_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialOrders.def()
    }
}

impl Related<super::material_length_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LengthAdjustments.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
