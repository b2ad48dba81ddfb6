use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

use crate::application::RetrieverService;
use crate::domain::{
    ports::LlmService, DomainError, FinancialProfile, Message, Persona, SearchResult,
};

const CHAT_SYSTEM_PROMPT: &str =
    "You are a helpful, honest, and accurate financial advisor assistant. Provide clear \
     advice based on financial best practices. When you don't know something, admit it \
     rather than making up information.";

/// One persona's answer, with the knowledge-base topics that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorReply {
    pub persona: Persona,
    pub advice: String,
    pub sources: Vec<String>,
}

/// Consensus across all personas plus the individual replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolisticAdvice {
    pub consensus: String,
    pub replies: Vec<AdvisorReply>,
}

/// Orchestrates one advisory interaction: optional retrieval, prompt
/// assembly, one blocking model call, and nothing else. No retries, no
/// caching of partial results.
pub struct AdvisorService {
    llm: Arc<dyn LlmService>,
    retriever: Arc<RetrieverService>,
    /// Persona system-prompt overrides from config; defaults apply otherwise.
    prompt_overrides: BTreeMap<String, String>,
    voting_threshold: f64,
}

impl AdvisorService {
    pub fn new(
        llm: Arc<dyn LlmService>,
        retriever: Arc<RetrieverService>,
        prompt_overrides: BTreeMap<String, String>,
        voting_threshold: f64,
    ) -> Self {
        Self {
            llm,
            retriever,
            prompt_overrides,
            voting_threshold,
        }
    }

    /// Personalized advice from a single persona.
    #[instrument(skip(self, profile), fields(persona = %persona))]
    pub async fn advise(
        &self,
        persona: Persona,
        query: &str,
        profile: &FinancialProfile,
    ) -> Result<AdvisorReply, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }

        let hinted_query = format!("{} {}", persona.retrieval_hint(), query);
        let grounding = self.retriever.retrieve(&hinted_query).await?;
        let context = RetrieverService::format_context(&grounding);

        let prompt = build_advice_prompt(persona, query, profile, &context);
        let advice = self
            .llm
            .complete_with_system(self.system_prompt(persona), &prompt)
            .await?;

        Ok(AdvisorReply {
            persona,
            advice,
            sources: source_topics(&grounding),
        })
    }

    /// Consults every persona for the same query, then asks the model for a
    /// consensus view across their recommendations.
    #[instrument(skip(self, profile))]
    pub async fn holistic(
        &self,
        query: &str,
        profile: &FinancialProfile,
    ) -> Result<HolisticAdvice, DomainError> {
        let replies = try_join_all(
            Persona::ALL
                .iter()
                .map(|persona| self.advise(*persona, query, profile)),
        )
        .await?;

        let consensus_prompt = build_consensus_prompt(query, &replies, self.voting_threshold);
        let consensus = self
            .llm
            .complete_with_system(CHAT_SYSTEM_PROMPT, &consensus_prompt)
            .await?;

        Ok(HolisticAdvice { consensus, replies })
    }

    /// Freeform grounded Q&A without a persona. Prior conversation turns are
    /// threaded into the prompt; an empty grounding context means the model
    /// answers from general knowledge alone.
    #[instrument(skip(self, history), fields(history = history.len()))]
    pub async fn chat(&self, message: &str, history: &[Message]) -> Result<String, DomainError> {
        if message.trim().is_empty() {
            return Err(DomainError::validation("message must not be empty"));
        }

        let grounding = self.retriever.retrieve(message).await?;
        let context = RetrieverService::format_context(&grounding);
        let prompt = build_chat_prompt(message, history, &context);

        self.llm
            .complete_with_system(CHAT_SYSTEM_PROMPT, &prompt)
            .await
    }

    fn system_prompt(&self, persona: Persona) -> &str {
        self.prompt_overrides
            .get(persona.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| persona.default_system_prompt())
    }
}

fn source_topics(results: &[SearchResult]) -> Vec<String> {
    let mut topics = Vec::new();
    for result in results {
        if !topics.contains(&result.chunk.topic) {
            topics.push(result.chunk.topic.clone());
        }
    }
    topics
}

fn build_advice_prompt(
    persona: Persona,
    query: &str,
    profile: &FinancialProfile,
    context: &str,
) -> String {
    let data = serde_json::to_string_pretty(&persona_view(persona, profile))
        .unwrap_or_else(|_| "{}".to_string());

    let mut prompt = format!("USER QUERY: {query}\n\nUSER FINANCIAL DATA:\n{data}\n\n");
    if !context.is_empty() {
        prompt.push_str(context);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "Based on this information, provide personalized advice to help the user. \
         Focus specifically on {}. Be concrete and specific with your recommendations.",
        persona.retrieval_hint()
    ));
    prompt
}

/// The slice of the profile a persona reasons over, plus the aggregates it
/// cares about. Keeps prompts focused and bounded.
fn persona_view(persona: Persona, profile: &FinancialProfile) -> serde_json::Value {
    match persona {
        Persona::Budget => json!({
            "income": profile.income,
            "expenses": profile.expenses,
            "total_income": profile.total_income(),
            "total_expenses": profile.total_expenses(),
            "monthly_cashflow": profile.monthly_cashflow(),
            "savings_rate_pct": profile.savings_rate(),
        }),
        Persona::Investment => json!({
            "investments": profile.investments,
            "portfolio_value": profile.portfolio_value(),
            "asset_allocation_pct": profile.asset_allocation(),
            "monthly_cashflow": profile.monthly_cashflow(),
            "age": profile.personal.age,
        }),
        Persona::Debt => json!({
            "debts": profile.debts,
            "total_debt": profile.total_debt(),
            "debt_to_income_pct": profile.debt_to_income_ratio(),
            "monthly_cashflow": profile.monthly_cashflow(),
        }),
        Persona::Savings => json!({
            "savings": profile.savings,
            "total_savings": profile.total_savings(),
            "savings_rate_pct": profile.savings_rate(),
            "monthly_cashflow": profile.monthly_cashflow(),
        }),
        Persona::Tax => json!({
            "personal": profile.personal,
            "income": profile.income,
            "total_income": profile.total_income(),
            "retirement_accounts": profile.investments.retirement_accounts,
        }),
    }
}

fn build_consensus_prompt(query: &str, replies: &[AdvisorReply], threshold: f64) -> String {
    let mut prompt = format!(
        "I need to generate a consensus recommendation based on input from multiple \
         financial expert agents.\n\nUser Query: {query}\n\nExpert Agent Recommendations:"
    );

    for reply in replies {
        prompt.push_str(&format!(
            "\n\n{} AGENT RECOMMENDATION:\n{}",
            reply.persona.as_str().to_uppercase(),
            reply.advice
        ));
    }

    prompt.push_str(&format!(
        "\n\nAnalyze these recommendations and generate a consensus view that:\n\
         1. Identifies points of agreement between at least {:.0}% of the agents\n\
         2. Highlights key recommendations that have strong support\n\
         3. Notes significant disagreements and explains the different perspectives\n\
         4. Provides a balanced, integrated recommendation\n\n\
         The consensus should be comprehensive yet concise, focusing on actionable advice.",
        threshold * 100.0
    ));
    prompt
}

fn build_chat_prompt(message: &str, history: &[Message], context: &str) -> String {
    let mut prompt = String::from("I'll help you with your question about personal finance.\n\n");

    if !context.is_empty() {
        prompt.push_str(context);
        prompt.push('\n');
    }

    if !history.is_empty() {
        let transcript = history
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n");
        prompt.push_str(&format!("Previous conversation:\n{transcript}\n\n"));
    }

    prompt.push_str(&format!("USER QUERY: {message}"));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageRole;
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records prompts and echoes a canned completion.
    struct RecordingLlm {
        calls: Mutex<Vec<(String, String)>>,
        reply: String,
    }

    impl RecordingLlm {
        fn new(reply: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmService for RecordingLlm {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            self.complete_with_system("", prompt).await
        }

        async fn complete_with_system(
            &self,
            system: &str,
            prompt: &str,
        ) -> Result<String, DomainError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            Ok(self.reply.clone())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmService for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, DomainError> {
            Err(DomainError::external("rate limited"))
        }

        async fn complete_with_system(
            &self,
            _system: &str,
            _prompt: &str,
        ) -> Result<String, DomainError> {
            Err(DomainError::external("rate limited"))
        }
    }

    fn empty_retriever() -> Arc<RetrieverService> {
        // Degraded on purpose: advice must still work without grounding.
        Arc::new(RetrieverService::degraded(
            Arc::new(InMemoryVectorStore::new()),
            "test",
        ))
    }

    fn advisor(llm: Arc<dyn LlmService>) -> AdvisorService {
        AdvisorService::new(llm, empty_retriever(), BTreeMap::new(), 0.6)
    }

    #[tokio::test]
    async fn test_advise_without_grounding_context() {
        let llm = Arc::new(RecordingLlm::new("spend less"));
        let service = advisor(llm.clone());

        let reply = service
            .advise(
                Persona::Budget,
                "how should I budget?",
                &FinancialProfile::default(),
            )
            .await
            .unwrap();

        assert_eq!(reply.advice, "spend less");
        assert_eq!(reply.persona, Persona::Budget);
        assert!(reply.sources.is_empty());

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        let (system, prompt) = &calls[0];
        assert_eq!(system, Persona::Budget.default_system_prompt());
        assert!(prompt.contains("USER QUERY: how should I budget?"));
        assert!(prompt.contains("USER FINANCIAL DATA:"));
        assert!(!prompt.contains("RELEVANT FINANCIAL INFORMATION"));
    }

    #[tokio::test]
    async fn test_advise_rejects_empty_query() {
        let service = advisor(Arc::new(RecordingLlm::new("x")));
        let err = service
            .advise(Persona::Debt, "  ", &FinancialProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_llm_failure_surfaces_as_external() {
        let service = advisor(Arc::new(FailingLlm));
        let err = service
            .advise(Persona::Tax, "help", &FinancialProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(_)));
    }

    #[tokio::test]
    async fn test_prompt_override_replaces_default() {
        let llm = Arc::new(RecordingLlm::new("ok"));
        let overrides =
            BTreeMap::from([("budget".to_string(), "You are extremely frugal.".to_string())]);
        let service = AdvisorService::new(llm.clone(), empty_retriever(), overrides, 0.6);

        service
            .advise(Persona::Budget, "help", &FinancialProfile::default())
            .await
            .unwrap();

        assert_eq!(llm.calls()[0].0, "You are extremely frugal.");
    }

    #[tokio::test]
    async fn test_holistic_consults_all_personas_then_consensus() {
        let llm = Arc::new(RecordingLlm::new("agreed"));
        let service = advisor(llm.clone());

        let advice = service
            .holistic("what should I do first?", &FinancialProfile::default())
            .await
            .unwrap();

        assert_eq!(advice.replies.len(), Persona::ALL.len());
        assert_eq!(advice.consensus, "agreed");

        let calls = llm.calls();
        // One call per persona plus the consensus call.
        assert_eq!(calls.len(), Persona::ALL.len() + 1);
        let consensus_prompt = &calls.last().unwrap().1;
        assert!(consensus_prompt.contains("BUDGET AGENT RECOMMENDATION:"));
        assert!(consensus_prompt.contains("TAX AGENT RECOMMENDATION:"));
        assert!(consensus_prompt.contains("at least 60%"));
    }

    #[tokio::test]
    async fn test_chat_threads_history() {
        let llm = Arc::new(RecordingLlm::new("sure"));
        let service = advisor(llm.clone());

        let history = vec![
            Message::user("what is an emergency fund?"),
            Message::assistant("Cash set aside for surprises."),
        ];
        let reply = service.chat("how big should mine be?", &history).await.unwrap();

        assert_eq!(reply, "sure");
        let (system, prompt) = &llm.calls()[0];
        assert_eq!(system, CHAT_SYSTEM_PROMPT);
        assert!(prompt.contains("Previous conversation:"));
        assert!(prompt.contains("User: what is an emergency fund?"));
        assert!(prompt.contains("Assistant: Cash set aside for surprises."));
        assert!(prompt.contains("USER QUERY: how big should mine be?"));
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_message() {
        let service = advisor(Arc::new(RecordingLlm::new("x")));
        let err = service.chat("", &[]).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_persona_view_slices_profile() {
        let profile = FinancialProfile::default();
        let budget = persona_view(Persona::Budget, &profile);
        assert!(budget.get("income").is_some());
        assert!(budget.get("debts").is_none());

        let debt = persona_view(Persona::Debt, &profile);
        assert!(debt.get("debts").is_some());
        assert!(debt.get("expenses").is_none());
    }

    #[test]
    fn test_history_roles_render() {
        assert_eq!(MessageRole::User.as_str(), "User");
        assert_eq!(MessageRole::Assistant.as_str(), "Assistant");
    }
}
