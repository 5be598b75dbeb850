#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Scope-locked OpenDART disclosure service.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dart::{DartService, OpenDartClient, ScopePolicy, Ticker};
//!
//! #[tokio::main]
//! async fn main() -> dart::Result<()> {
//!     let client = OpenDartClient::new("your_api_key")?;
//!     let service = DartService::new(Arc::new(client)).with_policy(ScopePolicy::annual_only());
//!
//!     let ticker: Ticker = "005930".parse()?;
//!     let company = service.resolve(&ticker).await?;
//!     println!("{} -> {}", company.stock_code, company.corp_code);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use dart_core::*;

// Caches
pub use dart_cache::{CorpCodeResolver, StatementCache, StatementCacheEntry};

// Upstream client
pub use dart_opendart::{OPENDART_BASE_URL, OpenDartClient};

mod response;
mod service;

pub use response::{
    FilingScope, FilingsResponse, Operation, ResolveResponse, StatementPage, StatementScope,
};
pub use service::{
    DEFAULT_LIMIT, DEFAULT_LOOKBACK_YEARS, DartService, MAX_CURSOR_PAGES_HINT, MAX_LIMIT,
    MAX_LOOKBACK_YEARS, MIN_LIMIT, MIN_LOOKBACK_YEARS, StatementRequest, clamp_lookback,
};
