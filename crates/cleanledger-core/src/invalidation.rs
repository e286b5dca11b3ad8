//! Which cached views go stale after a change

use crate::query::{QueryInvalidator, ViewKey};

/// Changes that affect cached views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A transaction of `account` was updated
    TransactionUpdated { account: String },
}

/// Maps events to the views they make stale
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidationPolicy;

impl InvalidationPolicy {
    /// Views to refresh; the page parameter is never set, so all pages go stale
    pub fn views_for(&self, event: &CacheEvent) -> Vec<ViewKey> {
        match event {
            CacheEvent::TransactionUpdated { account } => vec![
                ViewKey::all_transactions(account),
                ViewKey::unsanitized_transactions(account),
            ],
        }
    }

    /// Invalidate every view affected by `event`
    pub fn apply(&self, event: &CacheEvent, invalidator: &dyn QueryInvalidator) {
        for view in self.views_for(event) {
            invalidator.invalidate(&view.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueryKey;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl QueryInvalidator for Recorder {
        fn invalidate(&self, view_name: &str) {
            self.0.lock().unwrap().push(view_name.to_string());
        }
    }

    #[test]
    fn test_transaction_updated_views() {
        let event = CacheEvent::TransactionUpdated {
            account: "acc-9".to_string(),
        };
        let views = InvalidationPolicy.views_for(&event);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].view, QueryKey::ListAllTransactions);
        assert_eq!(views[1].view, QueryKey::ListUnsanitizedTransactions);
        assert!(views.iter().all(|v| v.account == "acc-9" && v.page.is_none()));
    }

    #[test]
    fn test_apply_invalidates_by_name() {
        let recorder = Recorder::default();
        let event = CacheEvent::TransactionUpdated {
            account: "acc-9".to_string(),
        };
        InvalidationPolicy.apply(&event, &recorder);
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "list-all-transactions-acc-9".to_string(),
                "list-unsanitized-transactions-acc-9".to_string(),
            ]
        );
    }
}
