mod advisor;
mod insights;
mod retriever;

pub use advisor::{AdvisorReply, AdvisorService, HolisticAdvice};
pub use insights::InsightsService;
pub use retriever::{IndexState, RetrieverService};
