//! In-memory mirror of every material and its inventory figures.
//!
//! Constructed once in `main`, shared through `AppState` behind a
//! `tokio::sync::RwLock`, and kept current by the event loop applying
//! [`MaterialEvent`]s. Reads compose a text search with a [`FilterSet`] and
//! return materials in inventory-health order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::material;
use crate::events::MaterialEvent;
use crate::money::Money;

pub mod filter;

pub use filter::{FilterSet, MaterialFilter, NamedFilter};

pub type SharedInventoryStore = Arc<RwLock<MaterialInventoryStore>>;

/// Inventory-health tier. Declaration order is sort order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum InventoryTier {
    Critical,
    Warning,
    Healthy,
}

impl InventoryTier {
    /// `critical` below the threshold, `warning` below threshold + buffer.
    pub fn classify(net: Decimal, threshold: Decimal, buffer: Decimal) -> Self {
        if net < threshold {
            InventoryTier::Critical
        } else if net < threshold + buffer {
            InventoryTier::Warning
        } else {
            InventoryTier::Healthy
        }
    }
}

/// Persisted inventory figures of a material, in feet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MaterialInventory {
    pub net_length_available: Decimal,
    pub length_arrived: Decimal,
    pub length_not_arrived: Decimal,
    pub sum_of_length_adjustments: Decimal,
}

impl From<&material::Model> for MaterialInventory {
    fn from(m: &material::Model) -> Self {
        Self {
            net_length_available: m.net_length_available,
            length_arrived: m.length_arrived,
            length_not_arrived: m.length_not_arrived,
            sum_of_length_adjustments: m.sum_of_length_adjustments,
        }
    }
}

/// A material as listed to clients: record fields, vendor name and inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InventoryMaterial {
    pub id: Uuid,
    pub name: String,
    pub material_id: String,
    pub category: String,
    pub vendor_id: Option<Uuid>,
    pub vendor_name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub thickness: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "0.42")]
    pub cost_per_msi: Option<Money>,
    #[schema(value_type = Option<String>, example = "0.05")]
    pub freight_cost_per_msi: Option<Money>,
    pub low_stock_threshold: Decimal,
    pub low_stock_buffer: Decimal,
    pub inventory: MaterialInventory,
    pub tier: InventoryTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryMaterial {
    pub fn from_model(model: material::Model, vendor_name: Option<String>) -> Self {
        let inventory = MaterialInventory::from(&model);
        let tier = InventoryTier::classify(
            inventory.net_length_available,
            model.low_stock_threshold,
            model.low_stock_buffer,
        );
        Self {
            id: model.id,
            cost_per_msi: model.cost_per_msi(),
            freight_cost_per_msi: model.freight_cost_per_msi(),
            name: model.name,
            material_id: model.material_id,
            category: model.category,
            vendor_id: model.vendor_id,
            vendor_name,
            description: model.description,
            color: model.color,
            thickness: model.thickness,
            weight: model.weight,
            width: model.width,
            low_stock_threshold: model.low_stock_threshold,
            low_stock_buffer: model.low_stock_buffer,
            inventory,
            tier,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    /// Tier recomputed from the current figures.
    pub fn tier(&self) -> InventoryTier {
        InventoryTier::classify(
            self.inventory.net_length_available,
            self.low_stock_threshold,
            self.low_stock_buffer,
        )
    }

    fn search_terms(&self) -> Vec<String> {
        [
            Some(self.name.as_str()),
            Some(self.material_id.as_str()),
            Some(self.category.as_str()),
            self.vendor_name.as_deref(),
            self.description.as_deref(),
            self.color.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .chain(self.thickness.map(|t| t.normalize().to_string()))
        .collect()
    }
}

/// Sort policy: tier, then name (case-insensitive), then material code.
pub fn inventory_order(a: &InventoryMaterial, b: &InventoryMaterial) -> Ordering {
    a.tier()
        .cmp(&b.tier())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.material_id.cmp(&b.material_id))
}

/// Totals over a visible material set, in feet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InventorySummary {
    pub count: usize,
    pub length_on_hand: Decimal,
    pub length_on_order: Decimal,
    pub net_length_available: Decimal,
}

impl InventorySummary {
    pub fn from_materials<'a>(materials: impl IntoIterator<Item = &'a InventoryMaterial>) -> Self {
        materials
            .into_iter()
            .fold(InventorySummary::default(), |mut acc, m| {
                acc.count += 1;
                acc.length_on_hand += m.inventory.length_arrived;
                acc.length_on_order += m.inventory.length_not_arrived;
                acc.net_length_available += m.inventory.net_length_available;
                acc
            })
    }
}

#[derive(Debug, Default)]
pub struct MaterialInventoryStore {
    materials: HashMap<Uuid, InventoryMaterial>,
    search_index: HashMap<Uuid, Vec<String>>,
}

impl MaterialInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedInventoryStore {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&InventoryMaterial> {
        self.materials.get(&id)
    }

    /// Inserts or replaces a material. Last write wins.
    pub fn set_material(&mut self, mut material: InventoryMaterial) {
        material.tier = material.tier();
        self.search_index.insert(material.id, material.search_terms());
        self.materials.insert(material.id, material);
    }

    pub fn remove_material(&mut self, id: Uuid) -> Option<InventoryMaterial> {
        self.search_index.remove(&id);
        self.materials.remove(&id)
    }

    /// Replaces the whole collection.
    pub fn set_materials(&mut self, materials: impl IntoIterator<Item = InventoryMaterial>) {
        self.materials.clear();
        self.search_index.clear();
        for material in materials {
            self.set_material(material);
        }
    }

    pub fn apply_event(&mut self, event: &MaterialEvent) {
        match event {
            MaterialEvent::Created(m) | MaterialEvent::Updated(m) => self.set_material(m.clone()),
            MaterialEvent::Deleted(id) => {
                self.remove_material(*id);
            }
        }
    }

    /// Case-insensitive substring search. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&InventoryMaterial> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.materials.values().collect();
        }
        self.materials
            .values()
            .filter(|m| {
                self.search_index
                    .get(&m.id)
                    .is_some_and(|terms| terms.iter().any(|t| t.contains(&needle)))
            })
            .collect()
    }

    /// Search, then filters in registration order, then inventory order.
    pub fn visible(&self, query: &str, filters: &FilterSet) -> Vec<&InventoryMaterial> {
        let mut materials = filters.apply(self.search(query));
        materials.sort_by(|a, b| inventory_order(a, b));
        materials
    }

    pub fn summary(&self, query: &str, filters: &FilterSet) -> InventorySummary {
        InventorySummary::from_materials(filters.apply(self.search(query)))
    }
}

#[cfg(test)]
pub(crate) fn test_material(name: &str, net: Decimal) -> InventoryMaterial {
    let now = Utc::now();
    let inventory = MaterialInventory {
        net_length_available: net,
        length_arrived: net.max(Decimal::ZERO),
        ..Default::default()
    };
    InventoryMaterial {
        id: Uuid::new_v4(),
        name: name.to_string(),
        material_id: format!("MAT-{}", name.to_uppercase().replace(' ', "-")),
        category: "Vinyl".to_string(),
        vendor_id: None,
        vendor_name: None,
        description: None,
        color: None,
        thickness: None,
        weight: None,
        width: None,
        cost_per_msi: None,
        freight_cost_per_msi: None,
        low_stock_threshold: Decimal::ZERO,
        low_stock_buffer: Decimal::ZERO,
        inventory,
        tier: InventoryTier::Healthy,
        created_at: now,
        updated_at: now,
    }
}
