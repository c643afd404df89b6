//! # Stockroom
//!
//! **A small inventory web application over a hosted database.**
//!
//! Stockroom lists, searches, creates, updates and deletes inventory items
//! kept in a PostgREST service (such as Supabase), and renders the listing
//! as server-side HTML.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐   ┌──────────────────┐
//! │  HTTP    │──▶│ stockroom-core │──▶│ ItemStore        │
//! │ (axum)   │   │ service        │   │ PostgREST/SQLite │
//! └──────────┘   │ normalize      │   │ /in-memory       │
//! ┌──────────┐   │ query          │   └──────────────────┘
//! │   CLI    │──▶│                │
//! └──────────┘   └────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. A handler receives form fields or a search term.
//! 2. Writes go through the title-case normalizer
//!    ([`stockroom_core::normalize`]); searches become a typed filter
//!    ([`stockroom_core::query`]).
//! 3. The [`ItemStore`](stockroom_core::ItemStore) chosen at startup
//!    ([`backend::open_store`]) runs the operation.
//! 4. The handler renders the page ([`views`]) or redirects back to it,
//!    carrying any store error in `?error=`.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML + environment configuration and validation |
//! | [`backend`] | Builds the configured store |
//! | [`postgrest_store`] | Hosted PostgREST store over HTTP |
//! | [`sqlite_store`] | Local SQLite store |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | SQLite schema creation (idempotent) |
//! | [`server`] | Axum routes and redirect mapping |
//! | [`views`] | HTML rendering of the listing page |
//! | [`commands`] | CLI item commands |
//! | [`telemetry`] | `tracing` subscriber setup |

pub mod backend;
pub mod commands;
pub mod config;
pub mod db;
pub mod migrate;
pub mod postgrest_store;
pub mod server;
pub mod sqlite_store;
pub mod telemetry;
pub mod views;

pub use stockroom_core::{Item, ItemFields, ItemStore};
