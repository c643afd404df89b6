//! PostgREST-backed [`ItemStore`] implementation (Supabase's REST API).
//!
//! Each operation is a single stateless HTTP request against
//! `{url}/rest/v1/{table}`; nothing is retried and no session is kept.
//!
//! # Wire mapping
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `list`    | `GET ?select=*&order=created_at.desc[&or=(…)]` |
//! | `insert`  | `POST` body `[fields]`, `Prefer: return=representation` |
//! | `update`  | `PATCH ?id=eq.<id>` body `fields`, `Prefer: return=representation` |
//! | `delete`  | `DELETE ?id=eq.<id>`, `Prefer: return=minimal` |
//!
//! Search filters arrive as typed [`Filter`] values and are rendered by
//! [`filter_param`], which double-quotes every value so user text can never
//! be read as PostgREST syntax.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;

use stockroom_core::error::{StoreError, StoreResult};
use stockroom_core::models::{Item, ItemFields};
use stockroom_core::query::{Condition, Filter, ListQuery, Operator, Order};
use stockroom_core::store::ItemStore;

use crate::config::DatabaseConfig;

/// HTTP implementation of the [`ItemStore`] trait.
pub struct PostgrestStore {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    schema: String,
}

impl PostgrestStore {
    /// Build a store for `table` on the PostgREST service at `base_url`.
    ///
    /// `base_url` is the project URL (e.g. `https://xyz.supabase.co`); the
    /// `/rest/v1` prefix is appended here.
    pub fn new(
        base_url: &str,
        key: &str,
        schema: &str,
        table: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            key: key.to_string(),
            schema: schema.to_string(),
        })
    }

    pub fn from_config(db: &DatabaseConfig) -> Result<Self> {
        let url = db
            .url
            .as_deref()
            .context("database.url (SUPABASE_URL) is required for the postgrest backend")?;
        let key = db
            .key
            .as_deref()
            .context("database.key (SUPABASE_KEY) is required for the postgrest backend")?;
        Self::new(
            url,
            key,
            &db.schema,
            &db.table,
            db.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// A request carrying credentials and the schema profile header.
    fn request(&self, method: Method) -> RequestBuilder {
        let profile_header = if method == Method::GET || method == Method::HEAD {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header(profile_header, &self.schema)
    }
}

/// Error body returned by PostgREST on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

/// Pass successful responses through; turn everything else into a [`StoreError`].
async fn check(resp: Response) -> StoreResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.map_err(transport)?;
    Err(match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => StoreError::Backend {
            message: parsed.message,
            code: parsed.code,
        },
        Err(_) if body.trim().is_empty() => StoreError::backend(status.to_string()),
        Err(_) => StoreError::backend(format!("{}: {}", status, body.trim())),
    })
}

async fn decode_rows(resp: Response) -> StoreResult<Vec<Item>> {
    let body = resp.text().await.map_err(transport)?;
    serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
}

fn operator_name(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "eq",
        Operator::ILike => "ilike",
    }
}

/// Double-quote a value for use inside a PostgREST logical expression.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

fn condition_expr(c: &Condition) -> String {
    format!(
        "{}.{}.{}",
        c.field.column(),
        operator_name(c.op),
        quote(&c.value)
    )
}

/// Render a filter as a single query parameter.
pub fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::AnyOf(conditions) => {
            let parts: Vec<String> = conditions.iter().map(condition_expr).collect();
            ("or".to_string(), format!("({})", parts.join(",")))
        }
    }
}

pub fn order_param(order: &Order) -> (String, String) {
    let direction = if order.descending { "desc" } else { "asc" };
    (
        "order".to_string(),
        format!("{}.{}", order.field.column(), direction),
    )
}

/// All query parameters for a listing request.
pub fn list_params(query: &ListQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.push(order_param(&query.order));
    if let Some(filter) = &query.filter {
        params.push(filter_param(filter));
    }
    params
}

fn id_param(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

#[async_trait]
impl ItemStore for PostgrestStore {
    fn backend(&self) -> &'static str {
        "postgrest"
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<Vec<Item>> {
        let resp = self
            .request(Method::GET)
            .query(&list_params(query))
            .send()
            .await
            .map_err(transport)?;
        decode_rows(check(resp).await?).await
    }

    async fn insert(&self, fields: &ItemFields) -> StoreResult<Item> {
        let resp = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&[fields])
            .send()
            .await
            .map_err(transport)?;
        let rows = decode_rows(check(resp).await?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn update(&self, id: &str, fields: &ItemFields) -> StoreResult<Option<Item>> {
        let resp = self
            .request(Method::PATCH)
            .query(&id_param(id))
            .header("Prefer", "return=representation")
            .json(fields)
            .send()
            .await
            .map_err(transport)?;
        let rows = decode_rows(check(resp).await?).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let resp = self
            .request(Method::DELETE)
            .query(&id_param(id))
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(transport)?;
        check(resp).await?;
        Ok(())
    }
}
