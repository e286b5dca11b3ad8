//! Basic types shared by the models and the query cache

use serde::{Deserialize, Serialize};

/// Transaction type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money coming in (credit side)
    Income,
    /// Money going out (debit side)
    Expense,
    /// Money moved between own accounts (debit side)
    Transfer,
}

impl TransactionType {
    /// Types a credit entry may carry
    pub const CREDIT_TYPES: &'static [TransactionType] = &[TransactionType::Income];

    /// Types a debit entry may carry
    pub const DEBIT_TYPES: &'static [TransactionType] =
        &[TransactionType::Expense, TransactionType::Transfer];
}

impl Default for TransactionType {
    fn default() -> Self {
        TransactionType::Expense
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            "transfer" => Ok(TransactionType::Transfer),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "INCOME"),
            TransactionType::Expense => write!(f, "EXPENSE"),
            TransactionType::Transfer => write!(f, "TRANSFER"),
        }
    }
}

/// Cached list views of the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKey {
    /// Every transaction of an account
    ListAllTransactions,
    /// Transactions of an account that have no sanitized description yet
    ListUnsanitizedTransactions,
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKey::ListAllTransactions => write!(f, "list-all-transactions"),
            QueryKey::ListUnsanitizedTransactions => write!(f, "list-unsanitized-transactions"),
        }
    }
}
