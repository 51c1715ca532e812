use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use copurchase_api::{
    api::{create_router, AppState},
    data::{load_engine, LoadError, OrderDataSource},
    models::{OrderLine, Product},
    services::SelfPairPolicy,
};

/// In-memory source whose tables can be swapped between reloads
struct MemorySource {
    tables: Mutex<(Vec<Product>, Vec<OrderLine>)>,
    broken: AtomicBool,
    stall_next_order_load: AtomicBool,
}

impl MemorySource {
    fn new(products: Vec<Product>, lines: Vec<OrderLine>) -> Self {
        Self {
            tables: Mutex::new((products, lines)),
            broken: AtomicBool::new(false),
            stall_next_order_load: AtomicBool::new(false),
        }
    }

    fn replace(&self, products: Vec<Product>, lines: Vec<OrderLine>) {
        *self.tables.lock().unwrap() = (products, lines);
    }

    fn fail_next_loads(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// The next order-line load reads the current tables, then stalls before returning
    fn stall_next_order_load(&self) {
        self.stall_next_order_load.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl OrderDataSource for MemorySource {
    async fn load_products(&self) -> Result<Vec<Product>, LoadError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(LoadError::MissingColumn {
                path: "memory".to_string(),
                column: "price",
            });
        }
        Ok(self.tables.lock().unwrap().0.clone())
    }

    async fn load_order_lines(&self) -> Result<Vec<OrderLine>, LoadError> {
        let lines = self.tables.lock().unwrap().1.clone();
        if self.stall_next_order_load.swap(false, Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok(lines)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn catalog() -> Vec<Product> {
    vec![
        Product::new("p1", "Mouse", 25.99),
        Product::new("p2", "Pad", 7.99),
        Product::new("p3", "Keyboard", 55.00),
    ]
}

fn orders() -> Vec<OrderLine> {
    vec![
        OrderLine::new("o1", "c1", "p1"),
        OrderLine::new("o1", "c1", "p2"),
        OrderLine::new("o2", "c2", "p3"),
    ]
}

async fn create_state(source: Arc<MemorySource>) -> AppState {
    let engine = load_engine(source.as_ref(), SelfPairPolicy::Exclude)
        .await
        .unwrap();
    AppState::new(engine, source, SelfPairPolicy::Exclude)
}

async fn create_test_server_with(source: Arc<MemorySource>) -> TestServer {
    TestServer::new(create_router(create_state(source).await)).unwrap()
}

async fn create_test_server() -> TestServer {
    create_test_server_with(Arc::new(MemorySource::new(catalog(), orders()))).await
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_recommend_for_product() {
    let server = create_test_server().await;

    let response = server
        .post("/recommend")
        .json(&json!({ "product_id": "p1", "top_k": 5 }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "source": "product_co_purchase",
            "product_id": "p1",
            "recommendations": [
                { "product_id": "p2", "name": "Pad", "price": 7.99, "score": 1 }
            ]
        })
    );
}

#[tokio::test]
async fn test_product_fallback_orders_ties_by_id() {
    let server = create_test_server().await;

    let response = server
        .post("/recommend")
        .json(&json!({ "product_id": "p3" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "product_co_purchase");
    let ids: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["product_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_product_wins_over_customer() {
    let server = create_test_server().await;

    let response = server
        .post("/recommend")
        .json(&json!({ "product_id": "p1", "customer_id": "c2" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "product_co_purchase");
    assert_eq!(body["product_id"], "p1");
    assert!(body.get("customer_id").is_none());
}

#[tokio::test]
async fn test_recommend_for_customer() {
    let server = create_test_server().await;

    let response = server
        .post("/recommend")
        .json(&json!({ "customer_id": "c2" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "customer_history");
    assert_eq!(body["customer_id"], "c2");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_trending_without_ids() {
    let server = create_test_server().await;

    let response = server.post("/recommend").json(&json!({ "top_k": 2 })).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "trending");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(body["recommendations"][0]["product_id"], "p1");
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let server = create_test_server().await;

    let response = server
        .post("/recommend")
        .json(&json!({ "product_id": "p404" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Product p404 not found");
}

#[tokio::test]
async fn test_customer_without_purchases_is_404() {
    let server = create_test_server().await;

    let response = server
        .post("/recommend")
        .json(&json!({ "customer_id": "c404" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_zero_top_k_is_400() {
    let server = create_test_server().await;

    let response = server.post("/recommend").json(&json!({ "top_k": 0 })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_products() {
    let server = create_test_server().await;

    let response = server.get("/products").await;

    response.assert_status_ok();
    let products: Vec<Value> = response.json();
    assert_eq!(products.len(), 3);
    assert_eq!(products[0]["product_id"], "p1");
    assert_eq!(products[2]["name"], "Keyboard");
}

#[tokio::test]
async fn test_reload_swaps_snapshot() {
    let source = Arc::new(MemorySource::new(catalog(), orders()));
    let server = create_test_server_with(source.clone()).await;

    source.replace(
        catalog(),
        vec![
            OrderLine::new("o1", "c1", "p1"),
            OrderLine::new("o1", "c1", "p3"),
        ],
    );

    let response = server.post("/admin/reload").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "reloaded");
    assert_eq!(body["order_lines"], 2);

    let response = server
        .post("/recommend")
        .json(&json!({ "product_id": "p1" }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["recommendations"][0]["product_id"], "p3");
}

#[tokio::test]
async fn test_failed_reload_keeps_serving_old_snapshot() {
    let source = Arc::new(MemorySource::new(catalog(), orders()));
    let server = create_test_server_with(source.clone()).await;

    source.fail_next_loads();

    let response = server.post("/admin/reload").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let response = server
        .post("/recommend")
        .json(&json!({ "product_id": "p1" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendations"][0]["product_id"], "p2");
}

#[tokio::test]
async fn test_request_id_round_trip() {
    let server = create_test_server().await;

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-abc"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-abc");

    let response = server.get("/health").await;
    let generated = response.header("x-request-id");
    assert_eq!(generated.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_overlapping_reloads_publish_latest_data() {
    let source = Arc::new(MemorySource::new(catalog(), orders()));
    let state = create_state(source.clone()).await;

    // First reload reads the original orders and stalls before building.
    source.stall_next_order_load();
    let slow = tokio::spawn({
        let state = state.clone();
        async move { state.reload().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    source.replace(
        catalog(),
        vec![
            OrderLine::new("o1", "c1", "p1"),
            OrderLine::new("o1", "c1", "p3"),
        ],
    );
    let latest = state.reload().await.unwrap();
    assert_eq!(latest.order_lines, 2);

    slow.await.unwrap().unwrap();

    let engine = state.engine().await;
    assert_eq!(engine.index().count("p1", "p3"), 1);
    assert_eq!(engine.index().count("p1", "p2"), 0);
}
