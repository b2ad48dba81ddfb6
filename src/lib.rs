//! AI personal-finance advisory service.
//!
//! A thin application layer around one piece of real machinery: a local
//! retrieval index over bundled reference documents that grounds LLM
//! advisory responses. Everything else is prompt assembly, numeric
//! aggregation over user-entered figures, and the HTTP surface the
//! dashboard talks to.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
