//! End-to-end tests for the HTTP surface.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`
//! against an in-memory store, or against stores that fail on purpose.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use stockroom::config::Config;
use stockroom::server::{build_router, AppState};
use stockroom_core::error::{StoreError, StoreResult};
use stockroom_core::models::{Item, ItemFields};
use stockroom_core::query::ListQuery;
use stockroom_core::store::memory::InMemoryStore;
use stockroom_core::store::ItemStore;

// ─── Test stores ────────────────────────────────────────────────────

/// Reads work; every write is rejected by the "database".
struct ReadOnlyStore {
    inner: InMemoryStore,
}

#[async_trait]
impl ItemStore for ReadOnlyStore {
    fn backend(&self) -> &'static str {
        "read-only"
    }
    async fn list(&self, query: &ListQuery) -> StoreResult<Vec<Item>> {
        self.inner.list(query).await
    }
    async fn insert(&self, _fields: &ItemFields) -> StoreResult<Item> {
        Err(StoreError::Backend {
            message: "new row violates row-level security policy for table \"items\"".to_string(),
            code: Some("42501".to_string()),
        })
    }
    async fn update(&self, _id: &str, _fields: &ItemFields) -> StoreResult<Option<Item>> {
        Err(StoreError::backend("permission denied"))
    }
    async fn delete(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::backend("permission denied"))
    }
}

/// Nothing works: the service is unreachable.
struct UnreachableStore;

#[async_trait]
impl ItemStore for UnreachableStore {
    fn backend(&self) -> &'static str {
        "unreachable"
    }
    async fn list(&self, _query: &ListQuery) -> StoreResult<Vec<Item>> {
        Err(StoreError::Transport("connection refused".to_string()))
    }
    async fn insert(&self, _fields: &ItemFields) -> StoreResult<Item> {
        Err(StoreError::Transport("connection refused".to_string()))
    }
    async fn update(&self, _id: &str, _fields: &ItemFields) -> StoreResult<Option<Item>> {
        Err(StoreError::Transport("connection refused".to_string()))
    }
    async fn delete(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::Transport("connection refused".to_string()))
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn app(store: Arc<dyn ItemStore>) -> Router {
    build_router(AppState {
        store,
        config: Arc::new(Config::in_memory()),
    })
}

fn seeded_store() -> Arc<InMemoryStore> {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let rows = [
        ("1", "Sencha", "Tea", "Pantry"),
        ("2", "Oolong Tea", "Drinks", "Pantry"),
        ("3", "Mug", "Kitchen", "Tea House"),
    ];
    Arc::new(InMemoryStore::with_items(rows.iter().enumerate().map(
        |(i, (id, name, category, location))| Item {
            id: id.to_string(),
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            location: Some(location.to_string()),
            created_at: base + Duration::minutes(i as i64),
        },
    )))
}

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response<Body>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

async fn names(store: &InMemoryStore) -> Vec<String> {
    store
        .list(&ListQuery::all())
        .await
        .unwrap()
        .into_iter()
        .filter_map(|i| i.name)
        .collect()
}

// ─── Listing ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_index_lists_newest_first() {
    let app = app(seeded_store());
    let resp = send(&app, get("/")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    let mug = html.find("Mug").unwrap();
    let oolong = html.find("Oolong Tea").unwrap();
    let sencha = html.find("Sencha").unwrap();
    assert!(mug < oolong && oolong < sencha);
}

#[tokio::test]
async fn test_search_matches_name_or_category_only() {
    let app = app(seeded_store());
    let html = body_text(send(&app, get("/?q=%20TEA%20")).await).await;
    assert!(html.contains("Sencha"));
    assert!(html.contains("Oolong Tea"));
    assert!(!html.contains("Mug"));
    assert!(html.contains(r#"name="q" value=" TEA ""#));
}

#[tokio::test]
async fn test_blank_search_returns_everything() {
    let app = app(seeded_store());
    let html = body_text(send(&app, get("/?q=%20%20")).await).await;
    assert!(html.contains("Sencha"));
    assert!(html.contains("Mug"));
}

#[tokio::test]
async fn test_error_param_is_displayed() {
    let app = app(seeded_store());
    let html = body_text(send(&app, get("/?error=duplicate+key")).await).await;
    assert!(html.contains("duplicate key"));
    assert!(html.contains("Sencha"));
}

#[tokio::test]
async fn test_list_failure_renders_empty_page() {
    let app = app(Arc::new(UnreachableStore));
    let resp = send(&app, get("/?q=tea")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Errore nella ricerca"));
    assert!(html.contains("No items."));
}

// ─── Create ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_item_normalizes_and_redirects_home() {
    let store = Arc::new(InMemoryStore::new());
    let app = app(store.clone());

    let resp = send(
        &app,
        form(
            "POST",
            "/add-item",
            "name=%20%20milk%20%20&category=dairy&location=fridge+a",
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let items = store.list(&ListQuery::all()).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name.as_deref(), Some("Milk"));
    assert_eq!(items[0].category.as_deref(), Some("Dairy"));
    assert_eq!(items[0].location.as_deref(), Some("Fridge A"));
}

#[tokio::test]
async fn test_failed_add_redirects_with_error_and_creates_nothing() {
    let store = Arc::new(ReadOnlyStore {
        inner: InMemoryStore::new(),
    });
    let app = app(store.clone());

    let resp = send(
        &app,
        form("POST", "/add-item", "name=tea&category=tea&location=pantry"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let loc = location(&resp);
    assert!(loc.starts_with("/?error="), "{}", loc);
    assert!(loc.contains("row-level+security"), "{}", loc);
    assert!(store.inner.is_empty());

    // Following the redirect renders the message
    let resp = send(&app, get(&loc)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("new row violates row-level security policy for table &quot;items&quot;"));
}

// ─── Update ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_put_updates_item() {
    let store = seeded_store();
    let app = app(store.clone());

    let resp = send(
        &app,
        form("PUT", "/items/1", "name=matcha&category=TEA&location=shelf+2"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(names(&store).await, vec!["Mug", "Oolong Tea", "Matcha"]);
}

#[tokio::test]
async fn test_post_with_put_override() {
    let store = seeded_store();
    let app = app(store.clone());

    let resp = send(
        &app,
        form(
            "POST",
            "/items/3?_method=PUT",
            "name=travel+mug&category=kitchen&location=desk",
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(names(&store).await[0], "Travel Mug");
}

#[tokio::test]
async fn test_override_in_form_body() {
    let store = seeded_store();
    let app = app(store.clone());

    let resp = send(&app, form("POST", "/items/2", "_method=DELETE")).await;
    assert_eq!(location(&resp), "/");
    assert_eq!(names(&store).await, vec!["Mug", "Sencha"]);
}

#[tokio::test]
async fn test_failed_update_redirects_with_error() {
    let app = app(Arc::new(UnreachableStore));
    let resp = send(&app, form("PUT", "/items/1", "name=x")).await;
    assert_eq!(location(&resp), "/?error=connection+refused");
}

// ─── Delete ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_removes_item() {
    let store = seeded_store();
    let app = app(store.clone());

    let resp = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/items/3")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let html = body_text(send(&app, get("/")).await).await;
    assert!(!html.contains("Mug"));
}

#[tokio::test]
async fn test_delete_unknown_id_is_harmless() {
    let store = seeded_store();
    let app = app(store.clone());

    let resp = send(&app, form("POST", "/items/does-not-exist?_method=DELETE", "")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_unknown_override_redirects_with_error() {
    let store = seeded_store();
    let app = app(store.clone());

    let resp = send(&app, form("POST", "/items/1?_method=PATCHY", "")).await;
    assert!(location(&resp).starts_with("/?error=unsupported+method+override"));
    assert_eq!(store.len(), 3);
}

// ─── Health ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let app = app(seeded_store());
    let resp = send(&app, get("/health")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}
