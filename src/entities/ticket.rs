use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter as StrumEnumIter, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Production departments a ticket moves through, in shop-floor order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    StrumEnumIter,
    ToSchema,
)]
pub enum Department {
    #[serde(rename = "ORDER-PREP")]
    #[strum(serialize = "ORDER-PREP")]
    OrderPrep,
    #[serde(rename = "ART-PREP")]
    #[strum(serialize = "ART-PREP")]
    ArtPrep,
    #[serde(rename = "PRE-PRESS")]
    #[strum(serialize = "PRE-PRESS")]
    PrePress,
    #[serde(rename = "PRINTING")]
    #[strum(serialize = "PRINTING")]
    Printing,
    #[serde(rename = "CUTTING")]
    #[strum(serialize = "CUTTING")]
    Cutting,
    #[serde(rename = "WINDING")]
    #[strum(serialize = "WINDING")]
    Winding,
    #[serde(rename = "PACKAGING")]
    #[strum(serialize = "PACKAGING")]
    Packaging,
    #[serde(rename = "SHIPPING")]
    #[strum(serialize = "SHIPPING")]
    Shipping,
    #[serde(rename = "BILLING")]
    #[strum(serialize = "BILLING")]
    Billing,
    #[serde(rename = "COMPLETED")]
    #[strum(serialize = "COMPLETED")]
    Completed,
}

impl Default for Department {
    fn default() -> Self {
        Department::OrderPrep
    }
}

/// A production job. `total_material_length` is the feet of its primary
/// material it consumes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub ticket_number: String,
    pub primary_material_id: Option<Uuid>,
    pub department: String,
    pub department_status: Option<String>,
    pub total_material_length: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Falls back to the first department for legacy values.
    pub fn department(&self) -> Department {
        self.department.parse().unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::PrimaryMaterialId",
        to = "super::material::Column::Id",
        on_delete = "SetNull"
    )]
    PrimaryMaterial,
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrimaryMaterial.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn department_wire_names_match_between_strum_and_serde() {
        use strum::IntoEnumIterator;
        for dept in Department::iter() {
            let json = serde_json::to_string(&dept).unwrap();
            assert_eq!(json, format!("\"{}\"", dept));
            assert_eq!(Department::from_str(dept.as_ref()).unwrap(), dept);
        }
    }

    #[test]
    fn unknown_department_reads_as_order_prep() {
        let now = Utc::now();
        let ticket = Model {
            id: Uuid::new_v4(),
            ticket_number: "T-1".into(),
            primary_material_id: None,
            department: "MYSTERY".into(),
            department_status: None,
            total_material_length: Decimal::ZERO,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(ticket.department(), Department::OrderPrep);
    }
}
