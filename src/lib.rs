//! Labelbase API Library
//!
//! Material inventory, purchase order and production ticket tracking for a
//! label manufacturer.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod inventory_store;
pub mod middleware_helpers;
pub mod migrator;
pub mod money;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use utoipa::ToSchema;

use crate::{
    config::AppConfig,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender, MaterialEvent},
    inventory_store::{MaterialInventoryStore, SharedInventoryStore},
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
    /// Read-mostly mirror of every material; written by the event loop only
    pub store: SharedInventoryStore,
    /// Fan-out of material events for push subscribers
    pub material_events: broadcast::Sender<MaterialEvent>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Builds the state with an empty store. The returned receiver feeds
    /// [`AppState::spawn_event_loop`].
    pub fn new(db: Arc<DbPool>, config: AppConfig) -> (Self, mpsc::Receiver<Event>) {
        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let (material_events, _) = broadcast::channel(config.event_broadcast_capacity);
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), &config);

        let state = Self {
            db,
            config,
            event_sender,
            store: MaterialInventoryStore::new().shared(),
            material_events,
            services,
        };
        (state, event_rx)
    }

    /// Loads every material into the store. Returns how many were loaded.
    pub async fn hydrate_store(&self) -> Result<usize, ServiceError> {
        let materials = services::materials::list_inventory_materials(&*self.db).await?;
        let count = materials.len();
        self.store.write().await.set_materials(materials);
        Ok(count)
    }

    pub fn spawn_event_loop(&self, rx: mpsc::Receiver<Event>) -> JoinHandle<()> {
        tokio::spawn(events::process_events(
            rx,
            self.store.clone(),
            self.material_events.clone(),
        ))
    }
}

// Common response wrappers
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}


/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    use handlers::{inventory, length_adjustments, material_orders, materials, tickets, vendors};

    Router::new()
        .route(
            "/vendors",
            get(vendors::list_vendors).post(vendors::create_vendor),
        )
        .route(
            "/vendors/{id}",
            get(vendors::get_vendor)
                .put(vendors::update_vendor)
                .delete(vendors::delete_vendor),
        )
        .route(
            "/materials",
            get(materials::list_materials).post(materials::create_material),
        )
        .route(
            "/materials/{id}",
            get(materials::get_material)
                .put(materials::update_material)
                .delete(materials::delete_material),
        )
        .route(
            "/materials/{id}/inventory",
            get(materials::get_material_inventory),
        )
        .route(
            "/materials/{id}/recompute",
            post(materials::recompute_material),
        )
        .route(
            "/material-orders",
            get(material_orders::list_material_orders)
                .post(material_orders::create_material_order),
        )
        .route(
            "/material-orders/{id}",
            get(material_orders::get_material_order)
                .put(material_orders::update_material_order)
                .delete(material_orders::delete_material_order),
        )
        .route(
            "/material-orders/{id}/arrive",
            post(material_orders::mark_material_order_arrived),
        )
        .route(
            "/material-length-adjustments",
            get(length_adjustments::list_length_adjustments)
                .post(length_adjustments::create_length_adjustment),
        )
        .route(
            "/material-length-adjustments/{id}",
            get(length_adjustments::get_length_adjustment)
                .delete(length_adjustments::delete_length_adjustment),
        )
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/inventory/summary", get(inventory::inventory_summary))
        .route("/inventory/recompute", post(inventory::recompute_all))
        .route("/inventory/events", get(inventory::material_event_stream))
}

/// CORS from configuration: explicit origins win, otherwise permissive only
/// where the configuration allows it.
pub fn cors_layer(cfg: &AppConfig) -> Result<CorsLayer, ServiceError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            environment = %cfg.environment,
            "Using permissive CORS because explicit origins were not configured"
        );
        Ok(CorsLayer::permissive())
    } else {
        Err(ServiceError::InternalError(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
                .to_string(),
        ))
    }
}

/// Full application router: health, the v1 API, Swagger UI and the
/// tracing, compression, CORS and request-id layers.
pub fn build_router(state: AppState) -> Result<Router, ServiceError> {
    let cors = cors_layer(&state.config)?;

    Ok(Router::<AppState>::new()
        .route("/", get(|| async { "labelbase-api up" }))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state))
}
