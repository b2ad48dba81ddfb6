//! Application layer - Use cases and orchestration.
//!
//! Services here orchestrate domain logic and infrastructure through the
//! domain ports (traits) rather than concrete implementations.

pub mod services;

pub use services::{
    AdvisorReply, AdvisorService, HolisticAdvice, IndexState, InsightsService, RetrieverService,
};
