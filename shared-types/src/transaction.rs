use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ParseEnumError;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ParseEnumError::new("TransactionType", other)),
        }
    }
}

/// Income or expense record
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    pub transaction_date: String,
    pub description: Option<String>,
}

/// Income/expense totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

impl MonthlySummary {
    pub fn new(month: impl Into<String>, income: f64, expenses: f64) -> Self {
        Self {
            month: month.into(),
            income,
            expenses,
            net: income - expenses,
        }
    }
}
