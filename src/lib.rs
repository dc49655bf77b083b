//! Read-only JSON API over the belly button biodiversity dataset.
//!
//! [`store::DataStore`] loads the SQLite dataset into an immutable
//! [`store::Dataset`], [`query::QueryService`] answers lookups over it and
//! [`http::build_router`] exposes those lookups as HTTP routes.

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod output;
pub mod query;
pub mod store;
