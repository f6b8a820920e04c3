use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::inventory_store::{InventoryMaterial, MaterialInventoryStore};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))
    }

    /// Sends an event after a write has already been committed. A closed
    /// channel is logged and otherwise ignored.
    pub async fn send_or_log(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.send(event).await {
            warn!(event = name, error = %e, "dropping event");
        }
    }
}

/// Push notification for a single material, as seen by the inventory store
/// and by SSE subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum MaterialEvent {
    #[serde(rename = "MATERIAL:CREATED")]
    Created(InventoryMaterial),
    #[serde(rename = "MATERIAL:UPDATED")]
    Updated(InventoryMaterial),
    #[serde(rename = "MATERIAL:DELETED")]
    Deleted(Uuid),
}

impl MaterialEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MaterialEvent::Created(_) => "MATERIAL:CREATED",
            MaterialEvent::Updated(_) => "MATERIAL:UPDATED",
            MaterialEvent::Deleted(_) => "MATERIAL:DELETED",
        }
    }

    pub fn material_id(&self) -> Uuid {
        match self {
            MaterialEvent::Created(m) | MaterialEvent::Updated(m) => m.id,
            MaterialEvent::Deleted(id) => *id,
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Material events
    MaterialCreated(InventoryMaterial),
    MaterialUpdated(InventoryMaterial),
    MaterialDeleted(Uuid),

    // Material order events
    MaterialOrderCreated { order_id: Uuid, material_id: Uuid },
    MaterialOrderUpdated { order_id: Uuid, material_id: Uuid },
    MaterialOrderArrived { order_id: Uuid, material_id: Uuid },
    MaterialOrderDeleted { order_id: Uuid, material_id: Uuid },

    // Length adjustment events
    LengthAdjustmentCreated { adjustment_id: Uuid, material_id: Uuid },
    LengthAdjustmentDeleted { adjustment_id: Uuid, material_id: Uuid },

    // Ticket events
    TicketCreated(Uuid),
    TicketUpdated(Uuid),
    TicketDeleted(Uuid),

    // Vendor events
    VendorCreated(Uuid),
    VendorUpdated(Uuid),
    VendorDeleted(Uuid),
}

impl Event {
    /// Wire name used in logs and on the push stream.
    pub fn name(&self) -> &'static str {
        match self {
            Event::MaterialCreated(_) => "MATERIAL:CREATED",
            Event::MaterialUpdated(_) => "MATERIAL:UPDATED",
            Event::MaterialDeleted(_) => "MATERIAL:DELETED",
            Event::MaterialOrderCreated { .. } => "MATERIAL_ORDER:CREATED",
            Event::MaterialOrderUpdated { .. } => "MATERIAL_ORDER:UPDATED",
            Event::MaterialOrderArrived { .. } => "MATERIAL_ORDER:ARRIVED",
            Event::MaterialOrderDeleted { .. } => "MATERIAL_ORDER:DELETED",
            Event::LengthAdjustmentCreated { .. } => "MATERIAL_LENGTH_ADJUSTMENT:CREATED",
            Event::LengthAdjustmentDeleted { .. } => "MATERIAL_LENGTH_ADJUSTMENT:DELETED",
            Event::TicketCreated(_) => "TICKET:CREATED",
            Event::TicketUpdated(_) => "TICKET:UPDATED",
            Event::TicketDeleted(_) => "TICKET:DELETED",
            Event::VendorCreated(_) => "VENDOR:CREATED",
            Event::VendorUpdated(_) => "VENDOR:UPDATED",
            Event::VendorDeleted(_) => "VENDOR:DELETED",
        }
    }

    /// The store-facing projection of this event, if it concerns a material.
    pub fn material_event(&self) -> Option<MaterialEvent> {
        match self {
            Event::MaterialCreated(m) => Some(MaterialEvent::Created(m.clone())),
            Event::MaterialUpdated(m) => Some(MaterialEvent::Updated(m.clone())),
            Event::MaterialDeleted(id) => Some(MaterialEvent::Deleted(*id)),
            _ => None,
        }
    }
}

/// Applies material events to the shared store and fans them out to push
/// subscribers, in arrival order. Ends when every sender is dropped.
pub async fn process_events(
    mut rx: mpsc::Receiver<Event>,
    store: Arc<RwLock<MaterialInventoryStore>>,
    broadcaster: broadcast::Sender<MaterialEvent>,
) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        let Some(material_event) = event.material_event() else {
            debug!(event = event.name(), "Received event");
            continue;
        };

        info!(
            event = material_event.name(),
            material_id = %material_event.material_id(),
            "Received material event"
        );

        store.write().await.apply_event(&material_event);

        // No subscribers is not an error.
        let _ = broadcaster.send(material_event);
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory_store::test_material;
    use rust_decimal_macros::dec;

    #[test]
    fn wire_names_follow_resource_colon_action() {
        let m = test_material("Matte Vinyl", dec!(100));
        assert_eq!(Event::MaterialCreated(m.clone()).name(), "MATERIAL:CREATED");
        assert_eq!(Event::MaterialUpdated(m).name(), "MATERIAL:UPDATED");
        assert_eq!(
            Event::MaterialOrderArrived {
                order_id: Uuid::new_v4(),
                material_id: Uuid::new_v4()
            }
            .name(),
            "MATERIAL_ORDER:ARRIVED"
        );
        assert!(Event::TicketCreated(Uuid::new_v4())
            .material_event()
            .is_none());
    }

    #[test]
    fn material_event_serializes_with_wire_tag() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(MaterialEvent::Deleted(id)).unwrap();
        assert_eq!(json["event"], "MATERIAL:DELETED");
        assert_eq!(json["payload"], id.to_string());
    }

    #[tokio::test]
    async fn process_events_updates_store_and_broadcasts() {
        let (tx, rx) = mpsc::channel(8);
        let store = Arc::new(RwLock::new(MaterialInventoryStore::new()));
        let (btx, mut brx) = broadcast::channel(8);

        let handle = tokio::spawn(process_events(rx, store.clone(), btx));
        let sender = EventSender::new(tx);

        let material = test_material("Gloss Vinyl", dec!(40));
        let id = material.id;
        sender
            .send(Event::MaterialCreated(material.clone()))
            .await
            .unwrap();
        sender.send(Event::VendorCreated(Uuid::new_v4())).await.unwrap();
        sender.send(Event::MaterialDeleted(id)).await.unwrap();
        drop(sender);
        handle.await.unwrap();

        assert_eq!(brx.recv().await.unwrap(), MaterialEvent::Created(material));
        assert_eq!(brx.recv().await.unwrap(), MaterialEvent::Deleted(id));
        assert!(store.read().await.get(id).is_none());
    }

    #[tokio::test]
    async fn send_after_loop_shutdown_is_an_event_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let err = sender
            .send(Event::TicketDeleted(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EventError(_)));
        // and the logging variant swallows it
        sender.send_or_log(Event::TicketDeleted(Uuid::new_v4())).await;
    }
}
