use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Purchase order for rolls of a single material.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "material_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub material_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub purchase_order_number: String,
    pub order_date: DateTime<Utc>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub feet_per_roll: Decimal,
    pub total_rolls: i32,
    pub has_arrived: bool,
    pub freight_charge_cents: i64,
    pub fuel_charge_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Total feet on this order: `feet_per_roll × total_rolls`.
    pub fn length(&self) -> Decimal {
        self.feet_per_roll * Decimal::from(self.total_rolls)
    }

    pub fn freight_charge(&self) -> Money {
        Money::from_cents(self.freight_charge_cents)
    }

    pub fn fuel_charge(&self) -> Money {
        Money::from_cents(self.fuel_charge_cents)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id",
        on_delete = "Cascade"
    )]
    Material,
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id",
        on_delete = "SetNull"
    )]
    Vendor,
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
