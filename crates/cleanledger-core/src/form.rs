//! Working draft of a transaction's editable fields

use crate::models::Transaction;
use crate::types::TransactionType;

/// Form state behind the "edit transaction" dialog
///
/// Never persisted; it is reset after a successful submission or a cancel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionForm {
    pub sanitized_description: String,
    pub transaction_type: TransactionType,
    pub category: String,
    pub subcategory: String,
    pub vendor: String,
    /// Also register a sanitization rule for future matches
    pub register_rule: bool,
    keywords: Vec<String>,
}

impl TransactionForm {
    /// Seed the form from the transaction being edited
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            sanitized_description: transaction.sanitized_description.clone().unwrap_or_default(),
            transaction_type: transaction.transaction_type,
            category: transaction.category.clone().unwrap_or_default(),
            subcategory: transaction.subcategory.clone().unwrap_or_default(),
            vendor: transaction.vendor.clone().unwrap_or_default(),
            register_rule: false,
            keywords: vec![],
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Add a keyword; blank and repeated keywords are ignored
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.keywords.iter().any(|k| k == keyword) {
            return false;
        }
        self.keywords.push(keyword.to_string());
        true
    }

    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k != keyword.trim());
        self.keywords.len() != before
    }

    /// Replace the keyword list
    pub fn set_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords.clear();
        for keyword in keywords {
            self.add_keyword(keyword.as_ref());
        }
    }

    /// The transaction as it will be sent to the transaction store
    pub fn apply_to(&self, transaction: &Transaction) -> Transaction {
        Transaction {
            sanitized_description: Some(self.sanitized_description.clone()),
            transaction_type: self.transaction_type,
            category: Some(self.category.clone()),
            subcategory: Some(self.subcategory.clone()),
            vendor: Some(self.vendor.clone()),
            ..transaction.clone()
        }
    }
}
