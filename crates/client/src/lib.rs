//! Async REST clients and submit flows for billflow.
//!
//! [`client::ApiClient`] wraps a single base URL. The service modules
//! ([`organizations`], [`countries`], [`quickbooks`], [`kong`]) build on it,
//! and [`flow`] glues a [`billflow_core::form::FormState`] to a call.

pub mod auth;
pub mod client;
pub mod config;
pub mod countries;
pub mod error;
pub mod flow;
pub mod kong;
pub mod organizations;
pub mod quickbooks;
pub mod telemetry;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result, SubmitFailure};
