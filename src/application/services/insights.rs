use tracing::instrument;

use crate::domain::{
    format_currency, format_percentage, FinancialProfile, Insight, InsightCategory,
};

// Rule thresholds, expressed as percentages where applicable.
const HIGH_EXPENSE_RATIO: f64 = 90.0;
const DOMINANT_CATEGORY_SHARE: f64 = 40.0;
const LOW_SAVINGS_RATE: f64 = 10.0;
const STRONG_SAVINGS_RATE: f64 = 20.0;
const HIGH_DTI: f64 = 36.0;
const HIGH_INTEREST_RATE: f64 = 15.0;
const CONCENTRATED_ALLOCATION: f64 = 70.0;
const THIN_CASHFLOW_MARGIN: f64 = 10.0;

/// Deterministic, model-free analysis of a financial profile. Every rule is
/// a pure function of the entered figures; the same profile always yields
/// the same insights.
pub struct InsightsService;

impl InsightsService {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all)]
    pub fn generate(&self, profile: &FinancialProfile) -> Vec<Insight> {
        let mut insights = Vec::new();
        self.analyze_spending(profile, &mut insights);
        self.analyze_savings(profile, &mut insights);
        self.analyze_debt(profile, &mut insights);
        self.analyze_investments(profile, &mut insights);
        self.analyze_cashflow(profile, &mut insights);
        self.analyze_goals(profile, &mut insights);
        insights
    }

    fn analyze_spending(&self, profile: &FinancialProfile, out: &mut Vec<Insight>) {
        let income = profile.total_income();
        let expenses = profile.total_expenses();
        if income <= 0.0 || expenses <= 0.0 {
            return;
        }

        let ratio = expenses / income * 100.0;
        if ratio > HIGH_EXPENSE_RATIO {
            out.push(Insight::new(
                InsightCategory::Spending,
                format!(
                    "Your expenses consume {} of your income, leaving little room for \
                     saving. Review your largest categories for cuts.",
                    format_percentage(ratio)
                ),
            ));
        }

        if let Some((category, amount)) = profile
            .expenses
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
        {
            let share = amount / expenses * 100.0;
            if share > DOMINANT_CATEGORY_SHARE {
                out.push(Insight::new(
                    InsightCategory::Spending,
                    format!(
                        "{} accounts for {} of your spending ({}/month). A change here \
                         moves the needle more than anywhere else.",
                        category,
                        format_percentage(share),
                        format_currency(*amount)
                    ),
                ));
            }
        }
    }

    fn analyze_savings(&self, profile: &FinancialProfile, out: &mut Vec<Insight>) {
        if profile.total_income() > 0.0 {
            let rate = profile.savings_rate();
            if rate < LOW_SAVINGS_RATE {
                out.push(Insight::new(
                    InsightCategory::Savings,
                    format!(
                        "Your savings rate is {}. Aim for at least 10% of income; \
                         automating a transfer on payday makes this easier.",
                        format_percentage(rate)
                    ),
                ));
            } else if rate >= STRONG_SAVINGS_RATE {
                out.push(Insight::new(
                    InsightCategory::Savings,
                    format!(
                        "You are saving {} of your income, well above the common 20% \
                         guideline. Keep it up.",
                        format_percentage(rate)
                    ),
                ));
            }
        }

        let fund = &profile.savings.emergency_fund;
        if fund.target > 0.0 && fund.balance < fund.target {
            let progress = fund.balance / fund.target * 100.0;
            out.push(Insight::new(
                InsightCategory::Savings,
                format!(
                    "Your emergency fund is at {} of its {} target ({} saved).",
                    format_percentage(progress),
                    format_currency(fund.target),
                    format_currency(fund.balance)
                ),
            ));
        } else if fund.target <= 0.0 && fund.balance <= 0.0 {
            out.push(Insight::new(
                InsightCategory::Savings,
                "You have no emergency fund yet. Three to six months of expenses is a \
                 common target.",
            ));
        }
    }

    fn analyze_debt(&self, profile: &FinancialProfile, out: &mut Vec<Insight>) {
        if profile.debts.is_empty() {
            return;
        }

        let dti = profile.debt_to_income_ratio();
        if dti > HIGH_DTI {
            out.push(Insight::new(
                InsightCategory::Debt,
                format!(
                    "Your debt-to-income ratio is {}, above the {}% level lenders \
                     consider stretched.",
                    format_percentage(dti),
                    HIGH_DTI
                ),
            ));
        }

        let mut expensive: Vec<_> = profile
            .debts
            .iter()
            .filter(|d| d.interest_rate > HIGH_INTEREST_RATE)
            .collect();
        expensive.sort_by(|a, b| b.interest_rate.total_cmp(&a.interest_rate));
        if let Some(worst) = expensive.first() {
            out.push(Insight::new(
                InsightCategory::Debt,
                format!(
                    "{} carries a {} interest rate on a {} balance. Directing extra \
                     payments here first minimizes total interest.",
                    worst.name,
                    format_percentage(worst.interest_rate),
                    format_currency(worst.balance)
                ),
            ));
        }
    }

    fn analyze_investments(&self, profile: &FinancialProfile, out: &mut Vec<Insight>) {
        let allocation = profile.asset_allocation();
        if let Some((asset_class, share)) = allocation
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
        {
            if *share > CONCENTRATED_ALLOCATION {
                out.push(Insight::new(
                    InsightCategory::Investments,
                    format!(
                        "{} of your portfolio sits in {}. Consider whether that \
                         concentration matches your risk tolerance.",
                        format_percentage(*share),
                        asset_class
                    ),
                ));
            }
        }

        let has_retirement = !profile.investments.retirement_accounts.is_empty();
        let working_age = profile.personal.age.map(|a| a < 60).unwrap_or(true);
        if !has_retirement && working_age && profile.total_income() > 0.0 {
            out.push(Insight::new(
                InsightCategory::Investments,
                "You have no retirement accounts on record. Tax-advantaged retirement \
                 saving usually comes before taxable investing.",
            ));
        }
    }

    fn analyze_cashflow(&self, profile: &FinancialProfile, out: &mut Vec<Insight>) {
        let income = profile.total_income();
        if income <= 0.0 {
            return;
        }

        let cashflow = profile.monthly_cashflow();
        if cashflow < 0.0 {
            out.push(Insight::new(
                InsightCategory::Cashflow,
                format!(
                    "You are spending {} more than you earn each month. Closing this \
                     gap comes before any other goal.",
                    format_currency(-cashflow)
                ),
            ));
        } else if cashflow / income * 100.0 < THIN_CASHFLOW_MARGIN {
            out.push(Insight::new(
                InsightCategory::Cashflow,
                format!(
                    "Your monthly margin is {}, under 10% of income. One surprise \
                     expense could tip you negative.",
                    format_currency(cashflow)
                ),
            ));
        }
    }

    fn analyze_goals(&self, profile: &FinancialProfile, out: &mut Vec<Insight>) {
        for goal in &profile.savings.goals {
            if goal.target <= 0.0 {
                continue;
            }
            let progress = goal.current / goal.target * 100.0;
            if progress >= 100.0 {
                out.push(Insight::new(
                    InsightCategory::Goals,
                    format!("You reached your \"{}\" goal of {}.", goal.name, format_currency(goal.target)),
                ));
            } else if progress < 50.0 {
                out.push(Insight::new(
                    InsightCategory::Goals,
                    format!(
                        "\"{}\" is at {} of its {} target.",
                        goal.name,
                        format_percentage(progress),
                        format_currency(goal.target)
                    ),
                ));
            }
        }
    }
}

impl Default for InsightsService {
    fn default() -> Self {
        Self::new()
    }
}
