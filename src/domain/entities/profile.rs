use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-entered financial figures, supplied by the dashboard layer as plain
/// structured records. All monetary amounts are monthly unless a field says
/// otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialProfile {
    #[serde(default)]
    pub personal: PersonalInfo,
    /// Income sources by name, e.g. "salary", "self_employment".
    #[serde(default)]
    pub income: BTreeMap<String, f64>,
    /// Expense categories by name, e.g. "housing", "food".
    #[serde(default)]
    pub expenses: BTreeMap<String, f64>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub investments: Investments,
    #[serde(default)]
    pub savings: Savings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub filing_status: Option<String>,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub name: String,
    pub kind: DebtKind,
    pub balance: f64,
    /// Annual interest rate as a percentage, e.g. 19.9.
    pub interest_rate: f64,
    pub minimum_payment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    CreditCard,
    StudentLoan,
    Mortgage,
    AutoLoan,
    PersonalLoan,
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Investments {
    #[serde(default)]
    pub retirement_accounts: Vec<InvestmentAccount>,
    #[serde(default)]
    pub brokerage_accounts: Vec<InvestmentAccount>,
    #[serde(default)]
    pub real_estate: Vec<RealEstate>,
    #[serde(default)]
    pub other: Vec<OtherInvestment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentAccount {
    pub name: String,
    pub balance: f64,
    /// Asset class -> percentage of this account, e.g. {"stocks": 80.0}.
    #[serde(default)]
    pub asset_allocation: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealEstate {
    pub name: String,
    pub estimated_value: f64,
    pub mortgage_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherInvestment {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Savings {
    #[serde(default)]
    pub emergency_fund: EmergencyFund,
    #[serde(default)]
    pub accounts: Vec<SavingsAccount>,
    #[serde(default)]
    pub goals: Vec<SavingsGoal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmergencyFund {
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub target: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsAccount {
    pub name: String,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub name: String,
    pub target: f64,
    pub current: f64,
}

impl FinancialProfile {
    pub fn total_income(&self) -> f64 {
        self.income.values().sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.values().sum()
    }

    pub fn monthly_cashflow(&self) -> f64 {
        self.total_income() - self.total_expenses()
    }

    /// Savings rate as a percentage of income; 0 when income is 0.
    pub fn savings_rate(&self) -> f64 {
        let income = self.total_income();
        if income <= 0.0 {
            return 0.0;
        }
        (income - self.total_expenses()) / income * 100.0
    }

    pub fn total_debt(&self) -> f64 {
        self.debts.iter().map(|d| d.balance).sum()
    }

    pub fn total_minimum_payments(&self) -> f64 {
        self.debts.iter().map(|d| d.minimum_payment).sum()
    }

    /// Debt-to-income ratio as a percentage; 0 when income is 0.
    pub fn debt_to_income_ratio(&self) -> f64 {
        let income = self.total_income();
        if income <= 0.0 {
            return 0.0;
        }
        self.total_minimum_payments() / income * 100.0
    }

    /// Total portfolio value: account balances plus real-estate equity
    /// plus other investments.
    pub fn portfolio_value(&self) -> f64 {
        let inv = &self.investments;
        let accounts: f64 = inv
            .retirement_accounts
            .iter()
            .chain(inv.brokerage_accounts.iter())
            .map(|a| a.balance)
            .sum();
        let real_estate: f64 = inv
            .real_estate
            .iter()
            .map(|p| p.estimated_value - p.mortgage_balance)
            .sum();
        let other: f64 = inv.other.iter().map(|o| o.value).sum();

        accounts + real_estate + other
    }

    pub fn total_savings(&self) -> f64 {
        self.savings.emergency_fund.balance
            + self.savings.accounts.iter().map(|a| a.balance).sum::<f64>()
    }

    pub fn net_worth(&self) -> f64 {
        self.portfolio_value() + self.total_savings() - self.total_debt()
    }

    /// Asset allocation as percentages of portfolio value, combining all
    /// investment accounts; real-estate equity reports under "real_estate".
    pub fn asset_allocation(&self) -> BTreeMap<String, f64> {
        let mut allocation: BTreeMap<String, f64> = BTreeMap::new();
        let total = self.portfolio_value();
        if total <= 0.0 {
            return allocation;
        }

        let inv = &self.investments;
        for account in inv
            .retirement_accounts
            .iter()
            .chain(inv.brokerage_accounts.iter())
        {
            for (asset_class, pct) in &account.asset_allocation {
                *allocation.entry(asset_class.clone()).or_insert(0.0) +=
                    account.balance * pct / 100.0;
            }
        }

        let real_estate_equity: f64 = inv
            .real_estate
            .iter()
            .map(|p| p.estimated_value - p.mortgage_balance)
            .sum();
        if real_estate_equity > 0.0 {
            *allocation.entry("real_estate".to_string()).or_insert(0.0) += real_estate_equity;
        }

        for value in allocation.values_mut() {
            *value = *value / total * 100.0;
        }

        allocation
    }
}

pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let mut grouped = String::new();
    let digits = whole.to_string();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}
