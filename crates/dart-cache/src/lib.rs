#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caches for the OpenDART proxy.
//!
//! - [`CorpCodeResolver`] - ticker to corporate identifier, refreshed daily
//! - [`StatementCache`] - full statement result sets, refreshed every six hours

/// Corp-code manifest parsing.
pub mod manifest;
/// Ticker resolution.
pub mod resolver;
/// Statement result-set cache.
pub mod statements;

pub use resolver::CorpCodeResolver;
pub use statements::{StatementCache, StatementCacheEntry};
