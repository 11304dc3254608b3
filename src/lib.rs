//! Fake Profile Generator Library
//!
//! Generates synthetic personal profiles for Italy, France, Germany and
//! Luxembourg, optionally paired with real disposable mailboxes, and exports
//! them as JSON or CSV.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Generation logic, models and errors.
//! - `integrations`: Disposable mailbox provider clients.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `export`: CSV export.
//! - `generation`: Batch generation workflow.
//! - `generator`: Locale-aware profile generation.
//! - `handlers`: HTTP request handlers.
//! - `iban`: Per-country IBAN pools.
//! - `models`: Core data models.
//! - `routes`: Router assembly.
//! - `tax_codes`: Codice fiscale and VAT number generation.
//! - `ui`: HTML form page.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod errors;
pub mod export;
pub mod generation;
pub mod generator;
pub mod handlers;
pub mod iban;
pub mod models;
pub mod routes;
pub mod tax_codes;
pub mod ui;
