//! In-memory collaborators for tests

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::models::{SanitizationRule, Transaction, TransactionPage};
use crate::query::QueryInvalidator;
use crate::store::{SanitizationStore, TransactionQuery, TransactionStore};
use crate::types::TransactionType;

/// A credit of 50 booked on 2024-06-15
pub fn sample_transaction(id: &str, account: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        raw_description: "STARBUCKS 1234 SEATTLE WA".to_string(),
        sanitized_description: None,
        transaction_type: TransactionType::Income,
        category: Some("Food".to_string()),
        subcategory: Some("Eating Out".to_string()),
        vendor: None,
        debit: None,
        credit: Some(Decimal::from(50)),
        account: account.to_string(),
    }
}

/// Transaction store that fails its first `failures` calls
#[derive(Default)]
pub struct MemoryTransactionStore {
    failures: AtomicU32,
    pub saved: Mutex<Vec<Transaction>>,
    attempts: AtomicU32,
}

impl MemoryTransactionStore {
    pub fn failing(failures: u32) -> Self {
        Self {
            failures: AtomicU32::new(failures),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn saved(&self) -> Vec<Transaction> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn update(&self, transaction: Transaction) -> CoreResult<Transaction> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(CoreError::persistence("update transaction", "503 Service Unavailable"));
        }
        self.saved.lock().unwrap().push(transaction.clone());
        Ok(transaction)
    }
}

/// Sanitization store that fails its first `failures` calls
#[derive(Default)]
pub struct MemorySanitizationStore {
    failures: AtomicU32,
    pub added: Mutex<Vec<SanitizationRule>>,
    attempts: AtomicU32,
}

impl MemorySanitizationStore {
    pub fn failing(failures: u32) -> Self {
        Self {
            failures: AtomicU32::new(failures),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn added(&self) -> Vec<SanitizationRule> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl SanitizationStore for MemorySanitizationStore {
    async fn add(&self, rule: SanitizationRule) -> CoreResult<SanitizationRule> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(CoreError::persistence("add sanitization", "connection reset"));
        }
        self.added.lock().unwrap().push(rule.clone());
        Ok(rule)
    }
}

/// Records every invalidated view name
#[derive(Default)]
pub struct RecordingInvalidator {
    pub views: Mutex<Vec<String>>,
}

impl RecordingInvalidator {
    pub fn views(&self) -> Vec<String> {
        self.views.lock().unwrap().clone()
    }
}

impl QueryInvalidator for RecordingInvalidator {
    fn invalidate(&self, view_name: &str) {
        self.views.lock().unwrap().push(view_name.to_string());
    }
}

/// Single-page list source backed by a vector
pub struct MemoryQuery {
    transactions: Mutex<Vec<Transaction>>,
    calls: AtomicU32,
}

impl MemoryQuery {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Mutex::new(transactions),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sanitize(&self, id: &str, description: &str) {
        let mut transactions = self.transactions.lock().unwrap();
        if let Some(tx) = transactions.iter_mut().find(|t| t.id == id) {
            tx.sanitized_description = Some(description.to_string());
        }
    }

    fn page(&self, account: &str, page: u32, unsanitized_only: bool) -> TransactionPage {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.account == account)
            .filter(|t| !unsanitized_only || !t.is_sanitized())
            .cloned()
            .collect();
        TransactionPage {
            items,
            page,
            total_pages: 1,
        }
    }
}

#[async_trait]
impl TransactionQuery for MemoryQuery {
    async fn list_all(&self, account: &str, page: u32) -> CoreResult<TransactionPage> {
        Ok(self.page(account, page, false))
    }

    async fn list_unsanitized(&self, account: &str, page: u32) -> CoreResult<TransactionPage> {
        Ok(self.page(account, page, true))
    }
}
