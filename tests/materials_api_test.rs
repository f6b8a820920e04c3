mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{dec, query, TestApp};

fn names(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_string())
        .collect()
}

fn uuid(value: &Value) -> Uuid {
    Uuid::parse_str(value["id"].as_str().expect("id")).expect("uuid")
}

#[tokio::test]
async fn material_crud_lifecycle() {
    let app = TestApp::new().await;
    let vendor = app.create_vendor("Avery Dennison").await;

    let created = app
        .create(
            "/api/v1/materials",
            json!({
                "name": "Matte White BOPP",
                "material_id": "MW-200",
                "category": "Film",
                "vendor_id": vendor["id"],
                "thickness": "2.6",
                "cost_per_msi": "0.45",
                "low_stock_threshold": "500",
                "low_stock_buffer": "250",
            }),
        )
        .await;
    assert_eq!(created["vendor_name"], "Avery Dennison");
    assert_eq!(created["cost_per_msi"], "0.45");
    assert_eq!(created["tier"], "critical");
    let id = uuid(&created);

    app.wait_for(|store| store.get(id).is_some()).await;

    let (status, fetched) = app
        .json(Method::GET, &format!("/api/v1/materials/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["material_id"], "MW-200");
    assert_eq!(dec(&fetched["data"]["thickness"]), dec!(2.6));

    let (status, updated) = app
        .json(
            Method::PUT,
            &format!("/api/v1/materials/{id}"),
            Some(json!({ "name": "Matte White BOPP 2.6", "cost_per_msi": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["name"], "Matte White BOPP 2.6");
    assert!(updated["data"]["cost_per_msi"].is_null());

    app.wait_for(|store| {
        store
            .get(id)
            .is_some_and(|m| m.name == "Matte White BOPP 2.6")
    })
    .await;

    let response = app
        .request(Method::DELETE, &format!("/api/v1/materials/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    app.wait_for(|store| store.get(id).is_none()).await;

    let (status, body) = app
        .json(Method::GET, &format!("/api/v1/materials/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].as_str().unwrap().contains("not found"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn duplicate_material_code_conflicts() {
    let app = TestApp::new().await;
    app.create_material("Gloss Paper", "GP-9").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/materials",
            Some(json!({ "name": "Other Paper", "material_id": "GP-9" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn invalid_materials_are_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/materials",
            Some(json!({ "name": "", "material_id": "X-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/materials",
            Some(json!({ "name": "   ", "material_id": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/tickets",
            Some(json!({ "ticket_number": "  " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/materials",
            Some(json!({ "name": "Cheap", "material_id": "X-2", "cost_per_msi": "-1.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/materials",
            Some(json!({ "name": "Orphan", "material_id": "X-3", "vendor_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_searches_and_filters_the_store() {
    let app = TestApp::new().await;
    let matte = app.create_material("Matte Vinyl", "MV-1").await;
    let gloss = app.create_material("Gloss Vinyl", "GV-1").await;
    app.create_material("Kraft Paper", "KP-1").await;

    let matte_id = matte["id"].as_str().unwrap().to_string();
    app.create_order(&matte_id, "100", 3, true).await;
    app.create_order(gloss["id"].as_str().unwrap(), "100", 2, false)
        .await;

    let matte_uuid = uuid(&matte);
    let gloss_uuid = uuid(&gloss);
    app.wait_for(|store| {
        store.len() == 3
            && store
                .get(matte_uuid)
                .is_some_and(|m| m.inventory.net_length_available == dec!(300))
            && store
                .get(gloss_uuid)
                .is_some_and(|m| m.inventory.length_not_arrived == dec!(200))
    })
    .await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/materials?search=MATTE", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Matte Vinyl"]);

    let (_, body) = app
        .json(Method::GET, "/api/v1/materials?search=vinyl", None)
        .await;
    assert_eq!(names(&body), vec!["Gloss Vinyl", "Matte Vinyl"]);
    assert_eq!(body["data"]["total"], 2);

    let filters = json!([
        { "name": "on-order", "filter": { "type": "has_open_orders" } }
    ])
    .to_string();
    let (status, body) = app
        .json(
            Method::GET,
            &format!("/api/v1/materials?{}", query(&[("filters", filters.as_str())])),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Gloss Vinyl"]);

    let filters = json!([
        { "name": "stocked", "filter": { "type": "net_length_at_least", "value": "100" } }
    ])
    .to_string();
    let (_, body) = app
        .json(
            Method::GET,
            &format!(
                "/api/v1/materials?{}",
                query(&[("search", "vinyl"), ("filters", filters.as_str())])
            ),
            None,
        )
        .await;
    assert_eq!(names(&body), vec!["Matte Vinyl"]);

    let (_, body) = app
        .json(Method::GET, "/api/v1/materials?page=2&limit=2", None)
        .await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(names(&body).len(), 1);
}

#[tokio::test]
async fn malformed_filters_are_a_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app
        .json(
            Method::GET,
            &format!("/api/v1/materials?{}", query(&[("filters", "[{\"name\": 1}")])),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid filters"));
}

#[tokio::test]
async fn summary_totals_the_visible_materials() {
    let app = TestApp::new().await;
    let a = app.create_material("Label Stock A", "LS-A").await;
    let b = app.create_material("Label Stock B", "LS-B").await;
    app.create_order(a["id"].as_str().unwrap(), "100", 4, true).await;
    app.create_order(b["id"].as_str().unwrap(), "50", 2, false).await;

    let b_uuid = uuid(&b);
    app.wait_for(|store| {
        store
            .get(b_uuid)
            .is_some_and(|m| m.inventory.length_not_arrived == dec!(100))
            && store.get(uuid(&a)).is_some_and(|m| {
                m.inventory.length_arrived == dec!(400)
            })
    })
    .await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/inventory/summary?search=label", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(dec(&body["data"]["length_on_hand"]), dec!(400));
    assert_eq!(dec(&body["data"]["length_on_order"]), dec!(100));
}

#[tokio::test]
async fn vendor_rename_and_delete_reach_the_store() {
    let app = TestApp::new().await;
    let vendor = app.create_vendor("Mactac").await;
    let material = app
        .create(
            "/api/v1/materials",
            json!({ "name": "Clear Film", "material_id": "CF-7", "vendor_id": vendor["id"] }),
        )
        .await;
    let id = uuid(&material);
    let vendor_id = vendor["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/v1/vendors/{vendor_id}"),
            Some(json!({ "name": "Mactac Americas" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.wait_for(|store| {
        store
            .get(id)
            .is_some_and(|m| m.vendor_name.as_deref() == Some("Mactac Americas"))
    })
    .await;

    let response = app
        .request(Method::DELETE, &format!("/api/v1/vendors/{vendor_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    app.wait_for(|store| {
        store
            .get(id)
            .is_some_and(|m| m.vendor_id.is_none() && m.vendor_name.is_none())
    })
    .await;
}

#[tokio::test]
async fn duplicate_vendor_name_conflicts() {
    let app = TestApp::new().await;
    app.create_vendor("UPM Raflatac").await;
    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/vendors",
            Some(json!({ "name": "UPM Raflatac" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.json(Method::GET, "/api/v1/vendors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
}
