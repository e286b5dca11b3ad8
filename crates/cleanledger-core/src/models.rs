//! Core data models exchanged with the finance tracker API

use chrono::NaiveDate;
use cleanledger_utils::{display_currency, display_date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::TransactionType;

/// One bank ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: String,
    /// Booking date
    pub date: NaiveDate,
    /// Description as supplied by the bank, never edited
    pub raw_description: String,
    /// User-corrected description
    #[serde(default)]
    pub sanitized_description: Option<String>,
    /// Income, expense or transfer
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    /// Amount leaving the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debit: Option<Decimal>,
    /// Amount entering the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<Decimal>,
    /// Account the entry belongs to
    pub account: String,
}

impl Transaction {
    /// Whether money entered the account
    pub fn is_credit(&self) -> bool {
        self.credit.is_some()
    }

    /// The amount on whichever side is set
    pub fn amount(&self) -> Decimal {
        self.debit.or(self.credit).unwrap_or_default()
    }

    /// Types the user may pick for this entry
    pub fn allowed_types(&self) -> &'static [TransactionType] {
        if self.is_credit() {
            TransactionType::CREDIT_TYPES
        } else {
            TransactionType::DEBIT_TYPES
        }
    }

    /// Check the debit/credit invariants
    pub fn check_invariants(&self) -> CoreResult<()> {
        match (self.debit, self.credit) {
            (Some(_), Some(_)) => Err(CoreError::InvalidTransaction {
                message: format!("transaction {} has both debit and credit set", self.id),
            }),
            (None, None) => Err(CoreError::InvalidTransaction {
                message: format!("transaction {} has neither debit nor credit set", self.id),
            }),
            _ if !self.allowed_types().contains(&self.transaction_type) => {
                Err(CoreError::InvalidTransaction {
                    message: format!(
                        "transaction {} is a {} but type is {}",
                        self.id,
                        if self.is_credit() { "credit" } else { "debit" },
                        self.transaction_type
                    ),
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether the user already gave this entry a description
    pub fn is_sanitized(&self) -> bool {
        self.sanitized_description
            .as_deref()
            .map_or(false, |d| !d.is_empty())
    }

    /// Description to show in lists
    pub fn display_description(&self) -> &str {
        match self.sanitized_description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => &self.raw_description,
        }
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        let sign = if self.is_credit() { "+" } else { "-" };
        format!(
            "{}  {}{}  {}",
            display_date(self.date),
            sign,
            display_currency(self.amount()),
            self.display_description()
        )
    }
}

/// A reusable auto-matching rule
///
/// Future raw descriptions containing any of the keywords receive the
/// description, type, category, subcategory and vendor stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizationRule {
    keywords: Vec<String>,
    sanitized_description: String,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category: String,
    subcategory: String,
    vendor: String,
}

impl SanitizationRule {
    /// Create a rule; a rule without keywords is never created
    pub fn new(
        keywords: Vec<String>,
        sanitized_description: String,
        transaction_type: TransactionType,
        category: String,
        subcategory: String,
        vendor: String,
    ) -> CoreResult<Self> {
        if keywords.is_empty() {
            return Err(CoreError::EmptyKeywords);
        }
        Ok(Self {
            keywords,
            sanitized_description,
            transaction_type,
            category,
            subcategory,
            vendor,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn sanitized_description(&self) -> &str {
        &self.sanitized_description
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }
}

/// One page of a transaction list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub page: u32,
    pub total_pages: u32,
}

impl TransactionPage {
    /// Find a transaction on this page
    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
