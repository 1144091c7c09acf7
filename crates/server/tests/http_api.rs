use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tabulon_common::wire::PageResult;
use tabulon_engine::block;
use tabulon_server::routes::router;
use tabulon_server::{ConnectorService, Settings};
use tempfile::TempDir;
use tower::ServiceExt;

fn write_table(root: &Path, schema: &str, table: &str, contents: &str) {
    let dir = root.join(schema);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.csv", table)), contents).unwrap();
}

fn five_row_orders(root: &Path) {
    write_table(
        root,
        "sales",
        "orders",
        "id,customer,city\n1,ann,oslo\n2,bob,rome\n3,cyd,lima\n4,dee,kyiv\n5,eve,bern\n",
    );
}

fn app(root: &Path) -> Router {
    let settings = Settings { data_dir: root.to_path_buf(), ..Settings::default() };
    router(Arc::new(ConnectorService::new(&settings)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn column(page: &Value, index: usize) -> Vec<String> {
    let page: PageResult = serde_json::from_value(page.clone()).unwrap();
    block::decode(&page.column_blocks[index])
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(&app(dir.path()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_discovery() {
    // Arrange
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());
    write_table(dir.path(), "sales", "customers", "id\n");
    let app = app(dir.path());

    // Act
    let (_, schemas) = send(&app, "GET", "/schemas", None).await;
    let (_, tables) = send(&app, "GET", "/schemas/sales/tables", None).await;
    let (status, metadata) = send(&app, "GET", "/schemas/sales/tables/orders", None).await;

    // Assert
    assert_eq!(schemas, json!(["sales", "virtual"]));
    assert_eq!(
        tables,
        json!([{ "schema": "sales", "table": "customers" }, { "schema": "sales", "table": "orders" }])
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        metadata,
        json!({
            "schemaTableName": { "schema": "sales", "table": "orders" },
            "columns": [
                { "name": "id", "type": "varchar", "comment": null, "hidden": false },
                { "name": "customer", "type": "varchar", "comment": null, "hidden": false },
                { "name": "city", "type": "varchar", "comment": null, "hidden": false }
            ],
            "comment": null
        })
    );
}

#[tokio::test]
async fn test_splits_and_two_page_read() {
    // Arrange
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());
    let app = app(dir.path());

    // Act
    let (_, splits) = send(&app, "POST", "/schemas/sales/tables/orders/splits", Some(json!({ "splitCount": 2 }))).await;
    let (status, first) = send(&app, "POST", "/schemas/sales/tables/orders/splits/0-3/rows", None).await;
    let next_token = first["nextToken"].clone();
    let (_, second) = send(
        &app,
        "POST",
        "/schemas/sales/tables/orders/splits/0-3/rows",
        Some(json!({ "nextToken": next_token })),
    )
    .await;

    // Assert
    assert_eq!(splits, json!({ "splits": ["0-3", "3-5"] }));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["rowCount"], 1);
    assert_eq!(first["nextToken"], "1-3");
    assert_eq!(column(&first, 1), vec!["ann"]);
    assert_eq!(second["rowCount"], 2);
    assert_eq!(second["nextToken"], Value::Null);
    assert_eq!(column(&second, 1), vec!["bob", "cyd"]);
}

#[tokio::test]
async fn test_empty_split_request_uses_single_split() {
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());
    let (_, splits) = send(&app(dir.path()), "POST", "/schemas/sales/tables/orders/splits", None).await;
    assert_eq!(splits, json!({ "splits": ["0-5"] }));
}

#[tokio::test]
async fn test_desired_columns() {
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());

    let (_, page) = send(
        &app(dir.path()),
        "POST",
        "/schemas/sales/tables/orders/splits/3-5/rows",
        Some(json!({ "desiredColumns": ["city", "id"] })),
    )
    .await;

    assert_eq!(page["columnBlocks"].as_array().unwrap().len(), 2);
    assert_eq!(column(&page, 0), vec!["kyiv"]);
    assert_eq!(column(&page, 1), vec!["4"]);
}

#[tokio::test]
async fn test_client_errors_are_400() {
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());
    let app = app(dir.path());

    let (status, body) = send(
        &app,
        "POST",
        "/schemas/sales/tables/orders/splits/0-5/rows",
        Some(json!({ "desiredColumns": ["zip"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_COLUMN");

    let (status, body) = send(&app, "POST", "/schemas/sales/tables/orders/splits/abc/rows", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_TOKEN");

    let (status, body) = send(
        &app,
        "POST",
        "/schemas/sales/tables/orders/splits/0-3/rows",
        Some(json!({ "nextToken": "3-5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_TOKEN");

    let (status, body) =
        send(&app, "POST", "/schemas/sales/tables/orders/splits", Some(json!({ "splitSize": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SPLIT_POLICY");
}

#[tokio::test]
async fn test_missing_table_is_404() {
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());
    let app = app(dir.path());

    let (status, body) = send(&app, "GET", "/schemas/sales/tables/refunds", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, "GET", "/schemas/hr/tables", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_virtual_permutations() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    // Act
    let (_, tables) = send(&app, "GET", "/schemas/virtual/tables", None).await;
    let (_, splits) = send(&app, "POST", "/schemas/virtual/tables/permutations/splits", None).await;
    let (status, page) = send(
        &app,
        "POST",
        "/schemas/virtual/tables/permutations/splits/0-1/rows",
        Some(json!({ "parameters": { "word": "rocket" } })),
    )
    .await;

    // Assert
    assert_eq!(tables, json!([{ "schema": "virtual", "table": "permutations" }]));
    assert_eq!(splits, json!({ "splits": ["0-1"] }));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["rowCount"], 720);
    assert_eq!(page["nextToken"], Value::Null);
    let results = column(&page, 1);
    assert_eq!(results[0], "rocket");
    assert!(column(&page, 0).iter().all(|w| w == "rocket"));
}

#[tokio::test]
async fn test_virtual_missing_word_is_400() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(
        &app(dir.path()),
        "POST",
        "/schemas/virtual/tables/permutations/splits/0-1/rows",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_PARAMETER");
}

#[tokio::test]
async fn test_changed_file_is_reloaded() {
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());
    let app = app(dir.path());

    let (_, before) = send(&app, "POST", "/schemas/sales/tables/orders/splits", None).await;
    write_table(dir.path(), "sales", "orders", "id,customer,city\n1,ann,oslo\n");
    let (_, after) = send(&app, "POST", "/schemas/sales/tables/orders/splits", None).await;

    assert_eq!(before, json!({ "splits": ["0-5"] }));
    assert_eq!(after, json!({ "splits": ["0-1"] }));
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());
    let request = Request::builder()
        .method("POST")
        .uri("/schemas/sales/tables/orders/splits")
        .body(Body::from("{\"splitCount\": "))
        .unwrap();

    let response = app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_undecodable_path_is_json_400() {
    let dir = TempDir::new().unwrap();
    five_row_orders(dir.path());

    // %FF does not decode to UTF-8.
    let (status, body) = send(&app(dir.path()), "GET", "/schemas/%FF/tables", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_REQUEST");
    assert!(body["message"].as_str().unwrap().starts_with("Malformed request"));
}

#[tokio::test]
async fn test_max_split_count_caps_splits() {
    let dir = TempDir::new().unwrap();
    let mut contents = String::from("id,customer\n");
    for i in 0..30 {
        contents.push_str(&format!("{},c{}\n", i, i));
    }
    write_table(dir.path(), "sales", "orders", &contents);
    let settings = Settings { data_dir: dir.path().to_path_buf(), default_split_size: Some(5), ..Settings::default() };
    let app = router(Arc::new(ConnectorService::new(&settings)));

    let (status, body) =
        send(&app, "POST", "/schemas/sales/tables/orders/splits", Some(json!({ "maxSplitCount": 50 }))).await;

    assert_eq!(status, StatusCode::OK);
    let splits = body["splits"].as_array().unwrap();
    assert_eq!(splits.len(), 6);
    for split in splits {
        let uri = format!("/schemas/sales/tables/orders/splits/{}/rows", split.as_str().unwrap());
        let (_, first) = send(&app, "POST", &uri, None).await;
        let next_token = first["nextToken"].clone();
        let (_, second) = send(&app, "POST", &uri, Some(json!({ "nextToken": next_token }))).await;
        assert_eq!(first["rowCount"].as_u64().unwrap() + second["rowCount"].as_u64().unwrap(), 5);
    }
}
