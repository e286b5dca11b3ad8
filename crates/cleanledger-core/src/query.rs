//! In-memory cache of remote list views
//!
//! Entries are keyed by a view name of the form `<view>-<account>` plus an
//! optional page. Invalidating a view name marks every page under it stale;
//! stale data stays readable until a fetch replaces it. A fetch that was
//! in flight while its view was invalidated is stored already stale.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError, RwLock};

use crate::error::CoreResult;
use crate::retry::RetryPolicy;
use crate::types::QueryKey;

/// Identifies one cached view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub view: QueryKey,
    pub account: String,
    pub page: Option<u32>,
}

impl ViewKey {
    pub fn new(view: QueryKey, account: &str) -> Self {
        Self {
            view,
            account: account.to_string(),
            page: None,
        }
    }

    pub fn all_transactions(account: &str) -> Self {
        Self::new(QueryKey::ListAllTransactions, account)
    }

    pub fn unsanitized_transactions(account: &str) -> Self {
        Self::new(QueryKey::ListUnsanitizedTransactions, account)
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// The view name shared by all pages, e.g. `list-all-transactions-acc1`
    pub fn name(&self) -> String {
        format!("{}-{}", self.view, self.account)
    }
}

impl std::fmt::Display for ViewKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.page {
            Some(page) => write!(f, "{}[{}]", self.name(), page),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// Marks cached views stale so the next read refetches them
pub trait QueryInvalidator: Send + Sync {
    /// Fire-and-forget refresh trigger for every page of `view_name`
    fn invalidate(&self, view_name: &str);
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    stale: bool,
}

/// Cache of fetched views
#[derive(Debug)]
pub struct QueryClient<T> {
    entries: RwLock<HashMap<(String, Option<u32>), CacheEntry<T>>>,
    /// Invalidation count per view name; lock order is `entries` first
    generations: Mutex<HashMap<String, u64>>,
    retry: RetryPolicy,
}

impl<T: Clone> QueryClient<T> {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generations: Mutex::new(HashMap::new()),
            retry,
        }
    }

    fn slot(key: &ViewKey) -> (String, Option<u32>) {
        (key.name(), key.page)
    }

    fn generation(&self, view_name: &str) -> u64 {
        let generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        generations.get(view_name).copied().unwrap_or(0)
    }

    /// Cached data if present and not stale
    pub fn fresh(&self, key: &ViewKey) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&Self::slot(key))
            .filter(|entry| !entry.stale)
            .map(|entry| entry.data.clone())
    }

    /// Last fetched data, even if stale
    pub fn previous(&self, key: &ViewKey) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&Self::slot(key)).map(|entry| entry.data.clone())
    }

    /// True when the next read will hit the remote source
    pub fn is_stale(&self, key: &ViewKey) -> bool {
        self.fresh(key).is_none()
    }

    /// Return fresh cached data or fetch it through the retry policy
    ///
    /// A failed fetch leaves the previous data in place.
    pub async fn fetch<F, Fut>(&self, key: &ViewKey, fetcher: F) -> CoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        if let Some(data) = self.fresh(key) {
            log::debug!(target: "cleanledger::query", "cache hit for {}", key);
            return Ok(data);
        }

        log::debug!(target: "cleanledger::query", "fetching {}", key);
        let started = self.generation(&key.name());
        let data = self.retry.run(&format!("fetch {}", key), fetcher).await?;

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let stale = self.generation(&key.name()) != started;
        if stale {
            log::debug!(
                target: "cleanledger::query",
                "{} was invalidated while fetching",
                key
            );
        }
        entries.insert(
            Self::slot(key),
            CacheEntry {
                data: data.clone(),
                stale,
            },
        );
        Ok(data)
    }
}

impl<T: Send + Sync> QueryInvalidator for QueryClient<T> {
    fn invalidate(&self, view_name: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(view_name.to_string())
            .or_insert(0) += 1;
        let mut count = 0;
        for ((name, _), entry) in entries.iter_mut() {
            if name == view_name {
                entry.stale = true;
                count += 1;
            }
        }
        log::debug!(
            target: "cleanledger::query",
            "invalidated {} ({} cached pages)",
            view_name,
            count
        );
    }
}
