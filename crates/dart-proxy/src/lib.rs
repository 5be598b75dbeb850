#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Bearer-token check.
pub mod auth;
/// Command-line and environment configuration.
pub mod config;
/// Error responses.
pub mod error;
/// Tracing subscriber setup.
pub mod logging;
/// Inbound query validation.
pub mod query;
/// HTTP routes.
pub mod routes;

pub use config::{Config, PolicyPreset};
pub use error::ApiError;
pub use routes::{AppState, router};
