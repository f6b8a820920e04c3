use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Labelbase API",
        version = "0.1.0",
        description = r#"
# Labelbase material inventory API

Tracks roll-stock materials for a label plant: vendors, purchase orders for
material rolls, manual length adjustments and the production tickets that
consume material.

## Inventory

Every material carries derived figures, recomputed after each order,
adjustment or ticket change:

- `length_arrived`: feet on arrived purchase orders
- `length_not_arrived`: feet still on order
- `sum_of_length_adjustments`: signed manual corrections
- `net_length_available`: arrived + adjustments - consumed by tickets

The material list is served from an in-memory store and accepts a text
`search` plus an ordered JSON array of named `filters`. Results are sorted
critical, warning, healthy and then by name.

## Money

Monetary fields are decimal dollar strings (`"45.50"`), stored as whole
cents.

## Events

`GET /api/v1/inventory/events` streams `MATERIAL:CREATED`,
`MATERIAL:UPDATED` and `MATERIAL:DELETED` as server-sent events.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "vendors", description = "Material suppliers"),
        (name = "materials", description = "Materials and their inventory"),
        (name = "material-orders", description = "Purchase orders for material rolls"),
        (name = "material-length-adjustments", description = "Manual length corrections"),
        (name = "tickets", description = "Production tickets consuming material"),
        (name = "inventory", description = "Store totals, bulk recompute and the event stream"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::health::health_check,

        // Vendors
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::delete_vendor,

        // Materials
        crate::handlers::materials::list_materials,
        crate::handlers::materials::create_material,
        crate::handlers::materials::get_material,
        crate::handlers::materials::update_material,
        crate::handlers::materials::delete_material,
        crate::handlers::materials::get_material_inventory,
        crate::handlers::materials::recompute_material,

        // Material orders
        crate::handlers::material_orders::list_material_orders,
        crate::handlers::material_orders::create_material_order,
        crate::handlers::material_orders::get_material_order,
        crate::handlers::material_orders::update_material_order,
        crate::handlers::material_orders::mark_material_order_arrived,
        crate::handlers::material_orders::delete_material_order,

        // Length adjustments
        crate::handlers::length_adjustments::list_length_adjustments,
        crate::handlers::length_adjustments::create_length_adjustment,
        crate::handlers::length_adjustments::get_length_adjustment,
        crate::handlers::length_adjustments::delete_length_adjustment,

        // Tickets
        crate::handlers::tickets::list_tickets,
        crate::handlers::tickets::create_ticket,
        crate::handlers::tickets::get_ticket,
        crate::handlers::tickets::update_ticket,
        crate::handlers::tickets::delete_ticket,

        // Inventory
        crate::handlers::inventory::inventory_summary,
        crate::handlers::inventory::recompute_all,
        crate::handlers::inventory::material_event_stream,
    ),
    components(
        schemas(
            crate::inventory_store::InventoryTier,
            crate::inventory_store::MaterialFilter,
            crate::inventory_store::NamedFilter,
            crate::entities::ticket::Department,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_resource() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Labelbase API"));
        for path in [
            "/api/v1/vendors/{id}",
            "/api/v1/materials/{id}/inventory",
            "/api/v1/material-orders/{id}/arrive",
            "/api/v1/material-length-adjustments",
            "/api/v1/tickets",
            "/api/v1/inventory/events",
            "/health",
        ] {
            assert!(json.contains(path), "missing {path}");
        }
    }
}
