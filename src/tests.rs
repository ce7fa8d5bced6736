//! Integration tests for the Prefilheus admin backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::Config;
use crate::models::Record;
use crate::pages::Pages;
use crate::query::QueryBuilder;
use crate::store::{MemoryStore, RecordStore};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_store(MemoryStore::new("created_at")).await
    }

    async fn with_store(store: MemoryStore) -> Self {
        let state = test_state(store);
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.client.delete(self.url(path)).send().await.unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn insert(&self, nome: &str, secretaria: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/records",
                json!({
                    "nome": nome,
                    "email": format!("{}@exemplo.com", nome.to_lowercase()),
                    "telefone": "111",
                    "secretaria": secretaria,
                    "demanda": "teste"
                }),
            )
            .await;
        assert_eq!(status, 200, "insert failed: {}", body);
        body["data"]["id"].as_i64().unwrap()
    }
}

fn test_state(store: MemoryStore) -> AppState {
    let config = Config {
        supabase_url: None,
        supabase_key: None,
        table: "prefilheus".to_string(),
        timestamp_column: "created_at".to_string(),
        initial_limit: 20,
        utc_offset_minutes: 0,
        http_timeout: std::time::Duration::from_secs(5),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
    };

    AppState {
        store: Arc::new(RecordStore::Memory(store)),
        pages: Arc::new(Pages::default()),
        queries: Arc::new(QueryBuilder::from_config(&config)),
        config: Arc::new(config),
    }
}

fn dated(id: i64, secretaria: Option<&str>, created_at: &str) -> Record {
    Record {
        id,
        nome: Some(format!("Pessoa {}", id)),
        email: Some(format!("p{}@exemplo.com", id)),
        telefone: Some("111".to_string()),
        secretaria: secretaria.map(str::to_string),
        demanda: None,
        created_at: Some(created_at.parse().unwrap()),
    }
}

fn ids(rows: &Value) -> Vec<i64> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_router_answers_without_a_listener() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = create_router(test_state(MemoryStore::new("created_at")));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/filter")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_record_crud() {
    let fixture = TestFixture::new().await;

    let id = fixture.insert("Ana", "Obras").await;

    // Update
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/records/{}", id)))
        .json(&json!({ "secretaria": "Saúde", "demanda": "buraco na rua" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["secretaria"], "Saúde");
    assert_eq!(body["data"]["nome"], "Ana");

    // List
    let (status, body) = fixture.get("/api/records").await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body["data"]), vec![id]);

    // Delete
    let (status, body) = fixture.delete(&format!("/api/records/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let (_, body) = fixture.get("/api/records").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_records_listed_newest_first() {
    let fixture = TestFixture::new().await;
    let first = fixture.insert("Ana", "Obras").await;
    let second = fixture.insert("Bia", "Saúde").await;
    let third = fixture.insert("Caio", "Obras").await;

    let (_, body) = fixture.get("/api/records").await;
    assert_eq!(ids(&body["data"]), vec![third, second, first]);
}

#[tokio::test]
async fn test_delete_all_records() {
    let fixture = TestFixture::new().await;
    for nome in ["Ana", "Bia", "Caio"] {
        fixture.insert(nome, "Obras").await;
    }

    let (status, _) = fixture.delete("/api/records").await;
    assert_eq!(status, 200);

    let (_, body) = fixture.get("/api/records").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/records",
            json!({ "nome": "Ana", "email": "", "demanda": "sem contato" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("email"));
    assert!(message.contains("telefone"));
    assert!(message.contains("secretaria"));
    assert!(!message.contains("nome"));

    // Empty patch
    let id = fixture.insert("Ana", "Obras").await;
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/records/{}", id)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/records/404"))
        .json(&json!({ "nome": "Ninguém" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_initial_load_is_capped() {
    let fixture = TestFixture::new().await;
    for i in 0..25 {
        let secretaria = if i % 2 == 0 { "Obras" } else { "Saúde" };
        fixture.insert(&format!("Pessoa{}", i), secretaria).await;
    }

    let (status, body) = fixture.post("/api/filter/load", json!({})).await;
    assert_eq!(status, 200);

    let rows = &body["data"]["results"]["data"];
    assert_eq!(rows.as_array().unwrap().len(), 20);
    assert_eq!(ids(rows)[0], 25);
    assert_eq!(body["data"]["results"]["status"]["state"], "success");
    assert_eq!(body["data"]["secretarias"], json!(["Obras", "Saúde"]));
    assert!(body["data"]["activeFilters"].as_array().unwrap().is_empty());

    // Empty criteria behave like the initial view
    let (_, body) = fixture.post("/api/filter/apply", json!({})).await;
    assert_eq!(body["data"]["results"]["data"].as_array().unwrap().len(), 20);

    // Any filter lifts the cap
    let (_, body) = fixture
        .post("/api/filter/apply", json!({ "email": "EXEMPLO.COM" }))
        .await;
    assert_eq!(body["data"]["results"]["data"].as_array().unwrap().len(), 25);
}

#[tokio::test]
async fn test_insert_then_filter_by_secretaria() {
    let fixture = TestFixture::new().await;
    fixture.insert("Bia", "Obras").await;
    fixture.insert("Caio", "Saúde").await;

    let (status, body) = fixture
        .post(
            "/api/records",
            json!({
                "nome": "Ana",
                "email": "a@x.com",
                "telefone": "111",
                "secretaria": "Obras",
                "demanda": "teste"
            }),
        )
        .await;
    assert_eq!(status, 200);
    let ana = body["data"]["id"].as_i64().unwrap();

    let (status, body) = fixture
        .post("/api/filter/apply", json!({ "secretaria": "Obras" }))
        .await;
    assert_eq!(status, 200);

    let rows = &body["data"]["results"]["data"];
    assert_eq!(ids(rows).len(), 2);
    assert_eq!(ids(rows)[0], ana);
    assert_eq!(rows[0]["nome"], "Ana");
    assert_eq!(rows[0]["demanda"], "teste");
    assert_eq!(
        body["data"]["activeFilters"],
        json!([{ "label": "secretaria", "value": "Obras" }])
    );
}

#[tokio::test]
async fn test_text_filters_are_case_insensitive_substrings() {
    let fixture = TestFixture::new().await;
    fixture.insert("Mariana", "Obras").await;
    fixture.insert("Ana Paula", "Saúde").await;
    fixture.insert("Carlos", "Obras").await;

    let (_, body) = fixture
        .post("/api/filter/apply", json!({ "nome": "ANA" }))
        .await;
    assert_eq!(ids(&body["data"]["results"]["data"]), vec![2, 1]);

    let (_, body) = fixture
        .post(
            "/api/filter/apply",
            json!({ "nome": "ana", "secretaria": "Obras" }),
        )
        .await;
    assert_eq!(ids(&body["data"]["results"]["data"]), vec![1]);
    assert_eq!(
        body["data"]["activeFilters"],
        json!([
            { "label": "nome", "value": "ana" },
            { "label": "secretaria", "value": "Obras" }
        ])
    );
}

#[tokio::test]
async fn test_single_day_range_is_inclusive() {
    let store = MemoryStore::with_records(vec![
        dated(1, Some("Obras"), "2023-12-31T23:59:59.999Z"),
        dated(2, Some("Obras"), "2024-01-01T00:00:00Z"),
        dated(3, Some("Saúde"), "2024-01-01T12:00:00Z"),
        dated(4, Some("Obras"), "2024-01-01T23:59:59.999Z"),
        dated(5, Some("Obras"), "2024-01-02T00:00:00Z"),
    ]);
    let fixture = TestFixture::with_store(store).await;

    let (status, body) = fixture
        .post(
            "/api/filter/apply",
            json!({ "dataInicio": "2024-01-01", "dataFim": "2024-01-01" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body["data"]["results"]["data"]), vec![4, 3, 2]);
    assert_eq!(
        body["data"]["activeFilters"],
        json!([
            { "label": "data início", "value": "01/01/2024" },
            { "label": "data fim", "value": "01/01/2024" }
        ])
    );
}

#[tokio::test]
async fn test_remove_active_filter_requeries() {
    let fixture = TestFixture::new().await;
    fixture.insert("Ana", "Obras").await;
    fixture.insert("Ana", "Saúde").await;
    fixture.insert("Bia", "Obras").await;

    let (_, body) = fixture
        .post(
            "/api/filter/apply",
            json!({ "nome": "ana", "secretaria": "Obras" }),
        )
        .await;
    assert_eq!(ids(&body["data"]["results"]["data"]), vec![1]);

    let (status, body) = fixture.delete("/api/filter/active/secretaria").await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body["data"]["results"]["data"]), vec![2, 1]);
    assert_eq!(body["data"]["criteria"]["nome"], "ana");
    assert!(body["data"]["criteria"]["secretaria"].is_null());
    assert_eq!(
        body["data"]["activeFilters"],
        json!([{ "label": "nome", "value": "ana" }])
    );

    // Unknown labels change nothing
    let (status, body) = fixture.delete("/api/filter/active/protocolo").await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body["data"]["results"]["data"]), vec![2, 1]);
    assert_eq!(body["data"]["criteria"]["nome"], "ana");
}

#[tokio::test]
async fn test_clear_filters_reloads_initial_view() {
    let fixture = TestFixture::new().await;
    fixture.insert("Ana", "Obras").await;
    fixture.insert("Bia", "Saúde").await;

    fixture
        .post("/api/filter/apply", json!({ "nome": "Ana" }))
        .await;

    let (status, body) = fixture.post("/api/filter/clear", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body["data"]["results"]["data"]), vec![2, 1]);
    assert!(body["data"]["activeFilters"].as_array().unwrap().is_empty());
    assert!(body["data"]["criteria"]["nome"].is_null());

    // State persists between requests
    let (_, body) = fixture.get("/api/filter").await;
    assert_eq!(ids(&body["data"]["results"]["data"]), vec![2, 1]);
}

#[tokio::test]
async fn test_report_generation() {
    let store = MemoryStore::with_records(vec![
        dated(1, Some("Saude"), "2024-01-01T10:00:00Z"),
        dated(2, Some("Saude"), "2024-01-02T10:00:00Z"),
        dated(3, None, "2024-01-03T10:00:00Z"),
    ]);
    let fixture = TestFixture::with_store(store).await;

    let (status, body) = fixture.post("/api/report", json!({})).await;
    assert_eq!(status, 200);

    let report = &body["data"]["report"];
    assert_eq!(report["status"]["state"], "success");
    assert_eq!(report["data"]["totalRecords"], 3);
    assert_eq!(
        report["data"]["bySecretaria"],
        json!([
            { "name": "Saude", "count": 2, "percentage": "66.7%" },
            { "name": "Não especificada", "count": 1, "percentage": "33.3%" }
        ])
    );

    // Bounded by date
    let (_, body) = fixture
        .post(
            "/api/report",
            json!({ "startDate": "2024-01-02", "endDate": "2024-01-03" }),
        )
        .await;
    let report = &body["data"]["report"]["data"];
    assert_eq!(report["totalRecords"], 2);
    assert_eq!(report["bySecretaria"][0]["percentage"], "50.0%");
    assert_eq!(body["data"]["range"]["startDate"], "2024-01-02");

    // Clear
    let (_, body) = fixture.post("/api/report/clear", json!({})).await;
    assert_eq!(body["data"]["report"]["status"]["state"], "idle");
    assert!(body["data"]["report"]["data"].is_null());
}

#[tokio::test]
async fn test_report_over_empty_collection() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.post("/api/report", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["report"]["data"]["totalRecords"], 0);
    assert_eq!(body["data"]["report"]["data"]["bySecretaria"], json!([]));
}

#[tokio::test]
async fn test_insert_page_tracks_outcome() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get("/api/insert").await;
    assert_eq!(body["data"]["status"]["state"], "idle");

    let (status, body) = fixture
        .post(
            "/api/insert",
            json!({
                "nome": "Ana",
                "email": "a@x.com",
                "telefone": "111",
                "secretaria": "Obras"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"]["state"], "success");
    assert_eq!(body["data"]["data"]["message"], "Registro inserido com sucesso!");
    assert_eq!(body["data"]["data"]["record"]["id"], 1);

    let (status, body) = fixture.post("/api/insert", json!({ "nome": "Ana" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = fixture.get("/api/insert").await;
    assert_eq!(body["data"]["status"]["state"], "error");
    assert!(body["data"]["status"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Erro ao inserir registro"));
    // Previous outcome is kept
    assert_eq!(body["data"]["data"]["record"]["id"], 1);
}

#[tokio::test]
async fn test_missing_collection_surfaces_error() {
    let fixture = TestFixture::with_store(MemoryStore::without_collection("prefilheus")).await;

    let (status, body) = fixture.post("/api/filter/load", json!({})).await;
    assert_eq!(status, 502);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "REMOTE_CALL_FAILURE");
    assert_eq!(body["error"]["details"]["remoteCode"], "42P01");

    let (_, body) = fixture.get("/api/filter").await;
    assert_eq!(body["data"]["results"]["status"]["state"], "error");
    assert!(body["data"]["results"]["status"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Erro ao carregar dados iniciais"));

    // The page is not stuck loading: the next action runs again
    let (status, _) = fixture
        .post("/api/filter/apply", json!({ "nome": "Ana" }))
        .await;
    assert_eq!(status, 502);

    let (status, body) = fixture.post("/api/report", json!({})).await;
    assert_eq!(status, 502);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("does not exist"));

    let (status, body) = fixture.get("/api/collection/status").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "missing");
    assert_eq!(body["data"]["table"], "prefilheus");
    assert_eq!(body["data"]["backend"], "memory");
}

#[tokio::test]
async fn test_collection_status_available() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/collection/status").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "available");
}
