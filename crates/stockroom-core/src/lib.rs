//! # Stockroom Core
//!
//! Backend-agnostic logic for Stockroom: the item model, the title-case
//! normalizer, typed search filters, the store abstraction, and the
//! inventory service that request handlers call into.
//!
//! This crate contains no HTTP server, database driver, or filesystem I/O.
//! Concrete stores other than [`store::memory::InMemoryStore`] live in the
//! `stockroom` crate.

pub mod error;
pub mod models;
pub mod normalize;
pub mod query;
pub mod service;
pub mod store;

pub use error::StoreError;
pub use models::{Item, ItemFields};
pub use query::{ListQuery, SearchTerm};
pub use service::{Listing, Mutation};
pub use store::ItemStore;
