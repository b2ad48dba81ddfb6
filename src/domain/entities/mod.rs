mod conversation;
mod document;
mod embedding;
mod insight;
mod persona;
mod profile;

pub use conversation::{Message, MessageRole};
pub use document::{chunk_document, ChunkSpan, Document, DocumentChunk, SearchResult};
pub use embedding::Embedding;
pub use insight::{Insight, InsightCategory};
pub use persona::Persona;
pub use profile::{
    format_currency, format_percentage, Debt, DebtKind, EmergencyFund, FinancialProfile,
    InvestmentAccount, Investments, OtherInvestment, PersonalInfo, RealEstate, Savings,
    SavingsAccount, SavingsGoal,
};
