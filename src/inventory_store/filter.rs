use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{InventoryMaterial, InventoryTier};

/// A narrowing step over the material list.
///
/// Serialized adjacently tagged, e.g. `{"type": "low_stock"}` or
/// `{"type": "net_length_below", "value": "500"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MaterialFilter {
    /// Exactly this inventory-health tier
    InventoryTier(InventoryTier),
    /// Critical or warning
    LowStock,
    /// Net length below zero
    NegativeNet,
    /// Some length still on order
    HasOpenOrders,
    Vendor(Uuid),
    /// Case-insensitive category match
    Category(String),
    NetLengthAtLeast(Decimal),
    NetLengthBelow(Decimal),
    /// Inclusive bounds; materials without a thickness never match
    ThicknessRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
}

impl MaterialFilter {
    pub fn matches(&self, material: &InventoryMaterial) -> bool {
        let net = material.inventory.net_length_available;
        match self {
            MaterialFilter::InventoryTier(tier) => material.tier() == *tier,
            MaterialFilter::LowStock => material.tier() != InventoryTier::Healthy,
            MaterialFilter::NegativeNet => net < Decimal::ZERO,
            MaterialFilter::HasOpenOrders => {
                material.inventory.length_not_arrived > Decimal::ZERO
            }
            MaterialFilter::Vendor(vendor_id) => material.vendor_id == Some(*vendor_id),
            MaterialFilter::Category(category) => {
                material.category.eq_ignore_ascii_case(category.trim())
            }
            MaterialFilter::NetLengthAtLeast(feet) => net >= *feet,
            MaterialFilter::NetLengthBelow(feet) => net < *feet,
            MaterialFilter::ThicknessRange { min, max } => match material.thickness {
                Some(t) => min.map_or(true, |lo| t >= lo) && max.map_or(true, |hi| t <= hi),
                None => false,
            },
        }
    }

    /// One reduction step: keeps the materials this filter accepts.
    pub fn apply<'a>(&self, materials: Vec<&'a InventoryMaterial>) -> Vec<&'a InventoryMaterial> {
        materials.into_iter().filter(|m| self.matches(m)).collect()
    }
}

/// Filter as it appears in a request: a caller-chosen name plus the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NamedFilter {
    pub name: String,
    pub filter: MaterialFilter,
}

/// Ordered registry of named filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: Vec<NamedFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `filter` under `name`. Replacing an existing name keeps its
    /// original position in the chain.
    pub fn set_filter(&mut self, name: impl Into<String>, filter: MaterialFilter) {
        let name = name.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.filter = filter,
            None => self.entries.push(NamedFilter { name, filter }),
        }
    }

    pub fn remove_filter(&mut self, name: &str) -> Option<MaterialFilter> {
        let idx = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(idx).filter)
    }

    pub fn clear_filters(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, name: &str) -> Option<&MaterialFilter> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.filter)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every registered filter in registration order.
    pub fn apply<'a>(&self, materials: Vec<&'a InventoryMaterial>) -> Vec<&'a InventoryMaterial> {
        self.entries
            .iter()
            .fold(materials, |acc, entry| entry.filter.apply(acc))
    }
}

impl FromIterator<NamedFilter> for FilterSet {
    fn from_iter<I: IntoIterator<Item = NamedFilter>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for NamedFilter { name, filter } in iter {
            set.set_filter(name, filter);
        }
        set
    }
}
