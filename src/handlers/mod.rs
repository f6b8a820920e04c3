pub mod common;
pub mod health;
pub mod inventory;
pub mod length_adjustments;
pub mod material_orders;
pub mod materials;
pub mod tickets;
pub mod vendors;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    length_adjustments::LengthAdjustmentService, material_inventory::MaterialInventoryService,
    material_orders::MaterialOrderService, materials::MaterialService, tickets::TicketService,
    vendors::VendorService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub vendors: Arc<VendorService>,
    pub materials: Arc<MaterialService>,
    pub material_orders: Arc<MaterialOrderService>,
    pub length_adjustments: Arc<LengthAdjustmentService>,
    pub tickets: Arc<TicketService>,
    pub inventory: Arc<MaterialInventoryService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let inventory = MaterialInventoryService::new(db_pool.clone(), event_sender.clone());

        Self {
            vendors: Arc::new(VendorService::new(db_pool.clone(), event_sender.clone())),
            materials: Arc::new(
                MaterialService::new(db_pool.clone(), event_sender.clone()).with_stock_defaults(
                    config.default_low_stock_threshold,
                    config.default_low_stock_buffer,
                ),
            ),
            material_orders: Arc::new(MaterialOrderService::new(
                db_pool.clone(),
                event_sender.clone(),
                inventory.clone(),
            )),
            length_adjustments: Arc::new(LengthAdjustmentService::new(
                db_pool.clone(),
                event_sender.clone(),
                inventory.clone(),
            )),
            tickets: Arc::new(TicketService::new(
                db_pool,
                event_sender,
                inventory.clone(),
            )),
            inventory: Arc::new(inventory),
        }
    }
}
