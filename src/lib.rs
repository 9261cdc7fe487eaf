//! Domestic Worker Catalog Library
//!
//! This library provides the worker catalog API (listing query, registration
//! and updates over a persisted worker collection) together with the client
//! pieces that consume it.
//!
//! # Modules
//!
//! - `catalog`: Fixed option sets (roles, languages, salary types, availability, states).
//! - `circuit_breaker`: Circuit breaker guarding database calls.
//! - `config`: Configuration management.
//! - `db`: Database connection, pool management and schema.
//! - `db_storage`: Postgres-backed worker store.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Worker records and API payloads.
//! - `query`: Listing parameters, match predicate and sort keys.
//! - `router`: Route table and OpenAPI document.
//! - `services`: Worker service used by the handlers.
//! - `store`: Store trait and in-memory implementation.
//! - `validation`: Draft and patch validation.
//! - `client`: HTTP client for the catalog API.
//! - `session`: Session context and token verification.
//! - `listing_view`: Listing screen state.
//! - `apply_form`: Registration form.

pub mod catalog;
pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod query;
pub mod router;
pub mod services;
pub mod store;
pub mod validation;

// Client side
pub mod apply_form;
pub mod client;
pub mod listing_view;
pub mod session;
