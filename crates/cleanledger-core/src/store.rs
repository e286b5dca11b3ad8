//! Remote collaborators of the update workflow
//!
//! The stores persist edits; `TransactionQuery` reads the paged list views
//! that [`TransactionLists`] caches.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::models::{SanitizationRule, Transaction, TransactionPage};
use crate::query::{QueryClient, QueryInvalidator, ViewKey};

/// Persists edited transactions
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Save the transaction and return the stored version
    async fn update(&self, transaction: Transaction) -> CoreResult<Transaction>;
}

/// Persists sanitization rules
#[async_trait]
pub trait SanitizationStore: Send + Sync {
    /// Register the rule and return the stored version
    async fn add(&self, rule: SanitizationRule) -> CoreResult<SanitizationRule>;
}

/// Reads paged transaction lists
#[async_trait]
pub trait TransactionQuery: Send + Sync {
    async fn list_all(&self, account: &str, page: u32) -> CoreResult<TransactionPage>;

    async fn list_unsanitized(&self, account: &str, page: u32) -> CoreResult<TransactionPage>;
}

pub type TransactionStoreRef = Arc<dyn TransactionStore>;
pub type SanitizationStoreRef = Arc<dyn SanitizationStore>;
pub type TransactionQueryRef = Arc<dyn TransactionQuery>;

/// Cached access to the transaction list views
pub struct TransactionLists {
    source: TransactionQueryRef,
    cache: Arc<QueryClient<TransactionPage>>,
}

impl TransactionLists {
    pub fn new(source: TransactionQueryRef, cache: Arc<QueryClient<TransactionPage>>) -> Self {
        Self { source, cache }
    }

    /// The cache, for sharing with the update workflow as its invalidator
    pub fn invalidator(&self) -> Arc<dyn QueryInvalidator> {
        self.cache.clone()
    }

    pub async fn list_all(&self, account: &str, page: u32) -> CoreResult<TransactionPage> {
        let key = ViewKey::all_transactions(account).with_page(page);
        self.cache
            .fetch(&key, || self.source.list_all(account, page))
            .await
    }

    pub async fn list_unsanitized(&self, account: &str, page: u32) -> CoreResult<TransactionPage> {
        let key = ViewKey::unsanitized_transactions(account).with_page(page);
        self.cache
            .fetch(&key, || self.source.list_unsanitized(account, page))
            .await
    }

    /// Last page seen for the view, even if it has gone stale
    pub fn previous_all(&self, account: &str, page: u32) -> Option<TransactionPage> {
        self.cache
            .previous(&ViewKey::all_transactions(account).with_page(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invalidation::{CacheEvent, InvalidationPolicy};
    use crate::retry::RetryPolicy;
    use crate::test_support::{sample_transaction, MemoryQuery};

    fn lists(source: Arc<MemoryQuery>) -> TransactionLists {
        TransactionLists::new(source, Arc::new(QueryClient::new(RetryPolicy::default())))
    }

    #[tokio::test]
    async fn test_list_all_is_cached_per_page() {
        let source = Arc::new(MemoryQuery::new(vec![sample_transaction("1", "acc1")]));
        let lists = lists(source.clone());

        let page = lists.list_all("acc1", 1).await.unwrap();
        assert_eq!(page.items.len(), 1);
        lists.list_all("acc1", 1).await.unwrap();
        assert_eq!(source.calls(), 1);

        lists.list_all("acc1", 2).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_update_event_refreshes_both_views() {
        let source = Arc::new(MemoryQuery::new(vec![sample_transaction("1", "acc1")]));
        let lists = lists(source.clone());

        lists.list_all("acc1", 1).await.unwrap();
        let unsanitized = lists.list_unsanitized("acc1", 1).await.unwrap();
        assert_eq!(unsanitized.items.len(), 1);
        assert_eq!(source.calls(), 2);

        source.sanitize("1", "Coffee");
        let event = CacheEvent::TransactionUpdated {
            account: "acc1".to_string(),
        };
        InvalidationPolicy.apply(&event, lists.invalidator().as_ref());

        assert_eq!(lists.previous_all("acc1", 1).unwrap().items[0].sanitized_description, None);
        let all = lists.list_all("acc1", 1).await.unwrap();
        assert_eq!(all.items[0].sanitized_description.as_deref(), Some("Coffee"));
        let unsanitized = lists.list_unsanitized("acc1", 1).await.unwrap();
        assert!(unsanitized.items.is_empty());
        assert_eq!(source.calls(), 4);
    }
}
