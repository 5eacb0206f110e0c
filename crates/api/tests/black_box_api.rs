use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = bakeops_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

const STAFF: &str = "staff-7";
const MANAGER: &str = "manager-1";

async fn register_store(client: &reqwest::Client, base_url: &str, name: &str) -> String {
    let res = client
        .post(format!("{base_url}/stores"))
        .header("x-staff-id", MANAGER)
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn register_ingredient(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    unit: &str,
) -> String {
    let res = client
        .post(format!("{base_url}/ingredients"))
        .header("x-staff-id", MANAGER)
        .json(&json!({ "name": name, "unit": unit }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn receive_stock(
    client: &reqwest::Client,
    base_url: &str,
    store_id: &str,
    ingredient_id: &str,
    quantity: i64,
) {
    let res = client
        .post(format!("{base_url}/stock/receive"))
        .header("x-staff-id", MANAGER)
        .json(&json!({
            "store_id": store_id,
            "ingredient_id": ingredient_id,
            "quantity": quantity,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

async fn create_request(
    client: &reqwest::Client,
    base_url: &str,
    store_id: &str,
    ingredient_id: &str,
    quantity: i64,
) -> String {
    let res = client
        .post(format!("{base_url}/requests"))
        .header("x-staff-id", STAFF)
        .json(&json!({
            "store_id": store_id,
            "items": [{ "ingredient_id": ingredient_id, "quantity": quantity }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "pending");
    body["id"].as_str().unwrap().to_string()
}

async fn availability(
    client: &reqwest::Client,
    base_url: &str,
    store_id: &str,
    ingredient_id: &str,
) -> i64 {
    let res = client
        .get(format!("{base_url}/stores/{store_id}/availability/{ingredient_id}"))
        .header("x-staff-id", STAFF)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["available"].as_i64().unwrap()
}

#[tokio::test]
async fn identity_header_required_for_domain_endpoints() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .header("x-staff-id", STAFF)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["staff_id"], STAFF);

    // Health stays open for probes.
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn request_lifecycle_over_http() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let store_id = register_store(&client, &srv.base_url, "downtown").await;
    let flour = register_ingredient(&client, &srv.base_url, "flour", "kg").await;
    receive_stock(&client, &srv.base_url, &store_id, &flour, 10).await;

    assert_eq!(availability(&client, &srv.base_url, &store_id, &flour).await, 10);

    // Two pending requests soft-reserve their demand.
    let r1 = create_request(&client, &srv.base_url, &store_id, &flour, 4).await;
    let _r2 = create_request(&client, &srv.base_url, &store_id, &flour, 4).await;
    assert_eq!(availability(&client, &srv.base_url, &store_id, &flour).await, 2);

    // Approve the first: stock drops, status flips, decision is recorded.
    let res = client
        .post(format!("{}/requests/{}/approve", srv.base_url, r1))
        .header("x-staff-id", MANAGER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "approved");
    assert_eq!(body["decided_by"], MANAGER);

    let res = client
        .get(format!("{}/stores/{}/stock", srv.base_url, store_id))
        .header("x-staff-id", STAFF)
        .send()
        .await
        .unwrap();
    let entries: serde_json::Value = res.json().await.unwrap();
    assert_eq!(entries[0]["main_warehouse"]["quantity"], 6);

    // Re-approving an approved request is an illegal transition.
    let res = client
        .post(format!("{}/requests/{}/approve", srv.base_url, r1))
        .header("x-staff-id", MANAGER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_transition");

    // Complete the hand-over.
    let res = client
        .post(format!("{}/requests/{}/complete", srv.base_url, r1))
        .header("x-staff-id", MANAGER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn rejection_releases_the_soft_reservation() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let store_id = register_store(&client, &srv.base_url, "harbor").await;
    let flour = register_ingredient(&client, &srv.base_url, "flour", "kg").await;
    receive_stock(&client, &srv.base_url, &store_id, &flour, 10).await;

    let r1 = create_request(&client, &srv.base_url, &store_id, &flour, 6).await;
    assert_eq!(availability(&client, &srv.base_url, &store_id, &flour).await, 4);

    let res = client
        .post(format!("{}/requests/{}/reject", srv.base_url, r1))
        .header("x-staff-id", MANAGER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Rejection never touches the ledger; the reservation simply lapses.
    assert_eq!(availability(&client, &srv.base_url, &store_id, &flour).await, 10);

    let res = client
        .get(format!(
            "{}/requests?store_id={}&status=rejected",
            srv.base_url, store_id
        ))
        .header("x-staff-id", STAFF)
        .send()
        .await
        .unwrap();
    let rows: serde_json::Value = res.json().await.unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["id"], r1.as_str());
}

#[tokio::test]
async fn bulk_approval_checks_combined_demand() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let store_id = register_store(&client, &srv.base_url, "station").await;
    let sugar = register_ingredient(&client, &srv.base_url, "sugar", "kg").await;
    receive_stock(&client, &srv.base_url, &store_id, &sugar, 5).await;

    // 3 and 4 each fit individually; their sum (7) exceeds the 5 on hand.
    let r4 = create_request(&client, &srv.base_url, &store_id, &sugar, 3).await;
    let r5 = create_request(&client, &srv.base_url, &store_id, &sugar, 4).await;

    let res = client
        .post(format!("{}/requests/bulk-approve", srv.base_url))
        .header("x-staff-id", MANAGER)
        .json(&json!({ "request_ids": [r4, r5] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(body["ingredient_id"], sugar.as_str());
    assert_eq!(body["required"], 7);
    assert_eq!(body["available"], 5);

    // Nothing was approved, nothing was withdrawn.
    assert_eq!(availability(&client, &srv.base_url, &store_id, &sugar).await, 0);
    let res = client
        .get(format!(
            "{}/requests?store_id={}&status=pending",
            srv.base_url, store_id
        ))
        .header("x-staff-id", STAFF)
        .send()
        .await
        .unwrap();
    let rows: serde_json::Value = res.json().await.unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bulk_approval_commits_when_the_batch_fits() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let store_id = register_store(&client, &srv.base_url, "market").await;
    let flour = register_ingredient(&client, &srv.base_url, "flour", "kg").await;
    receive_stock(&client, &srv.base_url, &store_id, &flour, 10).await;

    let r2 = create_request(&client, &srv.base_url, &store_id, &flour, 4).await;
    let r3 = create_request(&client, &srv.base_url, &store_id, &flour, 4).await;

    let res = client
        .post(format!("{}/requests/bulk-approve", srv.base_url))
        .header("x-staff-id", MANAGER)
        .json(&json!({ "request_ids": [r2, r3] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["approved_count"], 2);

    let res = client
        .get(format!("{}/stores/{}/stock", srv.base_url, store_id))
        .header("x-staff-id", STAFF)
        .send()
        .await
        .unwrap();
    let entries: serde_json::Value = res.json().await.unwrap();
    assert_eq!(entries[0]["main_warehouse"]["quantity"], 2);
}

#[tokio::test]
async fn requests_against_unknown_stores_or_ingredients_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let store_id = register_store(&client, &srv.base_url, "depot").await;
    let unknown_store = uuid::Uuid::now_v7().to_string();
    let unknown_ingredient = uuid::Uuid::now_v7().to_string();

    let res = client
        .post(format!("{}/requests", srv.base_url))
        .header("x-staff-id", STAFF)
        .json(&json!({
            "store_id": unknown_store,
            "items": [{ "ingredient_id": unknown_ingredient, "quantity": 1 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/requests", srv.base_url))
        .header("x-staff-id", STAFF)
        .json(&json!({
            "store_id": store_id,
            "items": [{ "ingredient_id": unknown_ingredient, "quantity": 1 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
