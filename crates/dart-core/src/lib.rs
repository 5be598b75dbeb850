#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the OpenDART proxy.
//!
//! This crate provides the foundational abstractions shared by the client,
//! cache and service crates:
//!
//! - [`DisclosureSource`](provider::DisclosureSource) - Upstream disclosure API
//! - [`ScopePolicy`](scope::ScopePolicy) - Server-side parameter locks
//! - [`StatementSelection`](scope::StatementSelection) - Requested / effective statement filters
//! - [`paginate`](page::paginate) - Offset-cursor paging
//! - [`Clock`](clock::Clock) - Injectable time source

/// Injectable time sources.
pub mod clock;
/// Report, consolidation and statement-type codes.
pub mod codes;
/// Error types for proxy operations.
pub mod error;
/// Scripted in-memory upstream.
pub mod memory;
/// Offset-cursor pagination.
pub mod page;
/// Upstream trait and response envelopes.
pub mod provider;
/// Scope policy and statement selection.
pub mod scope;
/// Core data types (Ticker, CorpCode, CorporateRecord, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use codes::{FsDiv, ReportCode, SjDiv};
pub use error::{DartError, Result};
pub use memory::InMemorySource;
pub use page::{Page, paginate};
pub use provider::{
    ApiEnvelope, CompanyOverview, DartStatus, DisclosureSource, FilingList, FilingSummary,
    FilingsQuery, StatementList,
};
pub use scope::{ScopePolicy, StatementFilter, StatementSelection, missing_statements};
pub use types::{BusinessYear, CorpCode, CorporateRecord, StatementKey, StatementRow, Ticker};
