use serde::{Deserialize, Serialize};

/// A single rule-derived observation about a profile. Produced without any
/// model call; purely numeric analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub category: InsightCategory,
    pub message: String,
}

impl Insight {
    pub fn new(category: InsightCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Spending,
    Savings,
    Investments,
    Debt,
    Cashflow,
    Goals,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spending => "spending",
            Self::Savings => "savings",
            Self::Investments => "investments",
            Self::Debt => "debt",
            Self::Cashflow => "cashflow",
            Self::Goals => "goals",
        }
    }
}
