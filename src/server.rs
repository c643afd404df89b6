//! Inventory HTTP server.
//!
//! Serves the listing page and the form endpoints that mutate items. Every
//! handler delegates to [`stockroom_core::service`] and only decides how to
//! present the typed result: render the page, or redirect back to `/`,
//! attaching `?error=<message>` when the store reported a failure.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/` | Listing page; `q` filters by name/category, `error` shows a banner |
//! | `POST`   | `/add-item` | Create from form fields `name`, `category`, `location` |
//! | `PUT`    | `/items/{id}` | Update from the same form fields |
//! | `DELETE` | `/items/{id}` | Delete |
//! | `POST`   | `/items/{id}?_method=PUT\|DELETE` | Method override for HTML forms |
//! | `GET`    | `/health` | Health check (returns version) |
//!
//! Store failures never surface as 5xx responses.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    response::{Html, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use url::form_urlencoded::byte_serialize;

use stockroom_core::error::StoreError;
use stockroom_core::models::ItemFields;
use stockroom_core::service::{self, Mutation};
use stockroom_core::store::ItemStore;

use crate::config::Config;
use crate::views;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The item repository, constructed once by the entry point.
    pub store: Arc<dyn ItemStore>,
    pub config: Arc<Config>,
}

/// Build the router with all routes and the request tracing layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/add-item", post(handle_add))
        .route(
            "/items/{id}",
            post(handle_method_override)
                .put(handle_update)
                .delete(handle_delete),
        )
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Binds to `[server].bind` and runs until Ctrl+C or SIGTERM.
pub async fn run_server(config: &Config, store: Arc<dyn ItemStore>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let backend = store.backend();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, backend, "server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

// ============ Redirect mapping ============

/// Location of the listing page carrying `message` as its error banner.
pub fn error_location(message: &str) -> String {
    let encoded: String = byte_serialize(message.as_bytes()).collect();
    format!("/?error={}", encoded)
}

/// Map a write outcome to the redirect the browser follows.
fn redirect_for(result: Result<Mutation, StoreError>) -> Redirect {
    match result {
        Ok(_) => Redirect::to("/"),
        Err(e) => Redirect::to(&error_location(&e.to_string())),
    }
}

// ============ GET / ============

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    q: Option<String>,
    error: Option<String>,
}

async fn handle_index(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Html<String> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let listing = service::list_items(
        state.store.as_ref(),
        params.q.as_deref(),
        params.error,
        &state.config.ui.list_error_message,
    )
    .await;
    Html(views::render_listing(&listing))
}

// ============ Item forms ============

/// Form body shared by create and update. `_method` is only read by the
/// override route.
#[derive(Debug, Default, Deserialize)]
struct ItemForm {
    name: Option<String>,
    category: Option<String>,
    location: Option<String>,
    #[serde(rename = "_method")]
    method: Option<String>,
}

impl ItemForm {
    fn fields(self) -> ItemFields {
        ItemFields {
            name: self.name,
            category: self.category,
            location: self.location,
        }
    }
}

fn form_or_default(form: Result<Form<ItemForm>, FormRejection>) -> ItemForm {
    match form {
        Ok(Form(f)) => f,
        Err(e) => {
            warn!(error = %e, "unreadable form body, treating as empty");
            ItemForm::default()
        }
    }
}

async fn handle_add(
    State(state): State<AppState>,
    form: Result<Form<ItemForm>, FormRejection>,
) -> Redirect {
    let fields = form_or_default(form).fields();
    redirect_for(service::create_item(state.store.as_ref(), fields).await)
}

async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<ItemForm>, FormRejection>,
) -> Redirect {
    let fields = form_or_default(form).fields();
    redirect_for(service::update_item(state.store.as_ref(), &id, fields).await)
}

async fn handle_delete(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    redirect_for(service::delete_item(state.store.as_ref(), &id).await)
}

#[derive(Debug, Default, Deserialize)]
struct OverrideParams {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// `POST /items/{id}` with `_method` in the query string or form body.
async fn handle_method_override(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<OverrideParams>, QueryRejection>,
    form: Result<Form<ItemForm>, FormRejection>,
) -> Redirect {
    let mut form = form_or_default(form);
    let method = params
        .ok()
        .and_then(|Query(p)| p.method)
        .or_else(|| form.method.take())
        .unwrap_or_default();

    match method.to_ascii_uppercase().as_str() {
        "PUT" | "PATCH" => {
            redirect_for(service::update_item(state.store.as_ref(), &id, form.fields()).await)
        }
        "DELETE" => redirect_for(service::delete_item(state.store.as_ref(), &id).await),
        other => {
            warn!(id = %id, method = other, "unsupported method override");
            Redirect::to(&error_location(&format!(
                "unsupported method override: '{}'",
                other
            )))
        }
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    backend: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend().to_string(),
    })
}
