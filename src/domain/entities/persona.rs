use serde::{Deserialize, Serialize};

/// A fixed advisory role. Each persona carries a system prompt and a
/// retrieval hint that steers knowledge-base lookups toward its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Budget,
    Investment,
    Debt,
    Savings,
    Tax,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::Budget,
        Persona::Investment,
        Persona::Debt,
        Persona::Savings,
        Persona::Tax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Investment => "investment",
            Self::Debt => "debt",
            Self::Savings => "savings",
            Self::Tax => "tax",
        }
    }

    /// Prefix prepended to the user query when searching the knowledge base,
    /// so lookups land in this persona's topic area.
    pub fn retrieval_hint(&self) -> &'static str {
        match self {
            Self::Budget => "budget planning",
            Self::Investment => "investment strategy",
            Self::Debt => "debt management",
            Self::Savings => "savings strategy",
            Self::Tax => "tax planning",
        }
    }

    /// Built-in system prompt, used when the config does not override it.
    pub fn default_system_prompt(&self) -> &'static str {
        match self {
            Self::Budget => {
                "You are a specialized AI financial advisor focusing on budget planning \
                 and expense management. Help the user optimize spending, build an \
                 effective budget, and improve cashflow. Be specific and personalized."
            }
            Self::Investment => {
                "You are a specialized AI financial advisor focusing on investing. Help \
                 the user with asset allocation, diversification, and long-term strategy \
                 appropriate to their goals and risk tolerance. Be specific and \
                 personalized."
            }
            Self::Debt => {
                "You are a specialized AI financial advisor focusing on debt management. \
                 Help the user prioritize and pay down debts, weighing interest rates, \
                 balances, and cashflow. Be specific and personalized."
            }
            Self::Savings => {
                "You are a specialized AI financial advisor focusing on savings. Help \
                 the user build an emergency fund and reach savings goals. Be specific \
                 and personalized."
            }
            Self::Tax => {
                "You are a specialized AI financial advisor focusing on tax planning. \
                 Help the user understand deductions, tax-advantaged accounts, and \
                 filing considerations. You are not a substitute for a licensed tax \
                 professional. Be specific and personalized."
            }
        }
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget" => Ok(Self::Budget),
            "investment" => Ok(Self::Investment),
            "debt" => Ok(Self::Debt),
            "savings" => Ok(Self::Savings),
            "tax" => Ok(Self::Tax),
            other => Err(format!("unknown persona: {other}")),
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_str() {
        for persona in Persona::ALL {
            assert_eq!(persona.as_str().parse::<Persona>().unwrap(), persona);
        }
    }

    #[test]
    fn test_unknown_persona_rejected() {
        assert!("astrology".parse::<Persona>().is_err());
    }
}
