//! Transaction editing and sanitization logic
//!
//! - `validation`: field rules for the edit form
//! - `sanitization`: turns an opted-in form into a matching rule
//! - `workflow`: validate, persist, register rule, invalidate views
//! - `invalidation`: which cached views a change makes stale
//! - `query` / `store`: cached list views and the remote collaborators

pub mod error;
pub mod form;
pub mod invalidation;
pub mod models;
pub mod query;
pub mod retry;
pub mod sanitization;
pub mod selector;
pub mod store;
pub mod types;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use form::TransactionForm;
pub use invalidation::{CacheEvent, InvalidationPolicy};
pub use models::{SanitizationRule, Transaction, TransactionPage};
pub use query::{QueryClient, QueryInvalidator, ViewKey};
pub use retry::RetryPolicy;
pub use sanitization::build_rule;
pub use selector::{FinanceContext, OptionSelector};
pub use store::{
    SanitizationStore, SanitizationStoreRef, TransactionLists, TransactionQuery,
    TransactionQueryRef, TransactionStore, TransactionStoreRef,
};
pub use types::{QueryKey, TransactionType};
pub use validation::{validate, Field, FieldErrors};
pub use workflow::{Backends, SubmitOutcome, UpdateWorkflow, WorkflowState};
