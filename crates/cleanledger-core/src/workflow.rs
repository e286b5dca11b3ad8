//! Transaction update workflow
//!
//! One workflow backs one "edit transaction" dialog. A submission
//! validates the form, saves the transaction, registers a sanitization rule
//! when the user opted in, and finally marks the account's list views
//! stale:
//!
//! ```text
//! Idle -> Submitting -> Success | Failed -> Idle
//! ```
//!
//! The rule is only sent once the transaction save has succeeded.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::form::TransactionForm;
use crate::invalidation::{CacheEvent, InvalidationPolicy};
use crate::models::{SanitizationRule, Transaction};
use crate::query::QueryInvalidator;
use crate::retry::RetryPolicy;
use crate::sanitization::build_rule;
use crate::selector::{FinanceContext, OptionSelector};
use crate::store::{SanitizationStoreRef, TransactionStoreRef};
use crate::validation::{validate, FieldErrors};

/// Where a submission currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    Idle,
    Submitting,
    Success,
    Failed,
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowState::Idle => write!(f, "idle"),
            WorkflowState::Submitting => write!(f, "submitting"),
            WorkflowState::Success => write!(f, "success"),
            WorkflowState::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a submission that got past validation
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Transaction saved, and the rule too if one was requested
    FullSuccess {
        transaction: Transaction,
        rule: Option<SanitizationRule>,
    },
    /// Transaction saved but the rule could not be registered
    TransactionSavedRuleFailed {
        transaction: Transaction,
        error: String,
    },
    /// Nothing was saved
    TransactionSaveFailed { error: String },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::FullSuccess { .. })
    }
}

/// Remote collaborators used by a workflow
#[derive(Clone)]
pub struct Backends {
    pub transactions: TransactionStoreRef,
    pub sanitizations: SanitizationStoreRef,
    pub invalidator: Arc<dyn QueryInvalidator>,
    pub retry: RetryPolicy,
}

struct Editor {
    transaction: Transaction,
    form: TransactionForm,
    state: WorkflowState,
    categories: OptionSelector,
    subcategories: OptionSelector,
    keywords: OptionSelector,
}

/// Drives one edit dialog for a transaction of a fixed account
pub struct UpdateWorkflow {
    account: String,
    editor: Mutex<Editor>,
    busy: AtomicBool,
    backends: Backends,
    policy: InvalidationPolicy,
    logger: Box<dyn ErrorLogger>,
}

/// Clears the busy flag when a submission ends, even if it is dropped early
struct BusyGuard<'a> {
    workflow: &'a UpdateWorkflow,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut editor = self.workflow.editor();
        if editor.state == WorkflowState::Submitting {
            editor.state = WorkflowState::Failed;
        }
        drop(editor);
        self.workflow.busy.store(false, Ordering::SeqCst);
    }
}

impl UpdateWorkflow {
    /// Open the dialog for `transaction`, which must belong to `account`
    pub fn new(
        account: &str,
        transaction: Transaction,
        context: &FinanceContext,
        backends: Backends,
    ) -> CoreResult<Self> {
        Self::check_transaction(account, &transaction)?;
        Ok(Self {
            account: account.to_string(),
            editor: Mutex::new(Editor {
                form: TransactionForm::from_transaction(&transaction),
                transaction,
                state: WorkflowState::Idle,
                categories: context.category_selector(),
                subcategories: context.subcategory_selector(),
                keywords: OptionSelector::creatable(),
            }),
            busy: AtomicBool::new(false),
            backends,
            policy: InvalidationPolicy,
            logger: Box::new(DefaultErrorLogger),
        })
    }

    pub fn with_logger(mut self, logger: Box<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    fn check_transaction(account: &str, transaction: &Transaction) -> CoreResult<()> {
        if transaction.account != account {
            return Err(CoreError::InvalidTransaction {
                message: format!(
                    "transaction {} belongs to account {}, not {}",
                    transaction.id, transaction.account, account
                ),
            });
        }
        transaction.check_invariants()
    }

    fn editor(&self) -> MutexGuard<'_, Editor> {
        self.editor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_idle(&self) -> CoreResult<()> {
        if self.busy.load(Ordering::SeqCst) {
            return Err(CoreError::SubmissionInProgress);
        }
        Ok(())
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn state(&self) -> WorkflowState {
        self.editor().state
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// The transaction as last loaded or saved
    pub fn transaction(&self) -> Transaction {
        self.editor().transaction.clone()
    }

    pub fn form(&self) -> TransactionForm {
        self.editor().form.clone()
    }

    /// Switch the dialog to another transaction of the same account
    pub fn open(&self, transaction: Transaction) -> CoreResult<()> {
        self.ensure_idle()?;
        Self::check_transaction(&self.account, &transaction)?;
        let mut editor = self.editor();
        editor.form = TransactionForm::from_transaction(&transaction);
        editor.transaction = transaction;
        editor.state = WorkflowState::Idle;
        Ok(())
    }

    /// Change free-text fields of the form
    pub fn edit<F>(&self, change: F) -> CoreResult<()>
    where
        F: FnOnce(&mut TransactionForm),
    {
        self.ensure_idle()?;
        change(&mut self.editor().form);
        Ok(())
    }

    pub fn select_category(&self, value: &str) -> CoreResult<()> {
        self.ensure_idle()?;
        let mut editor = self.editor();
        let category = editor.categories.select(value)?;
        editor.form.category = category;
        Ok(())
    }

    pub fn select_subcategory(&self, value: &str) -> CoreResult<()> {
        self.ensure_idle()?;
        let mut editor = self.editor();
        let subcategory = editor.subcategories.select(value)?;
        editor.form.subcategory = subcategory;
        Ok(())
    }

    pub fn add_keyword(&self, value: &str) -> CoreResult<()> {
        self.ensure_idle()?;
        let mut editor = self.editor();
        let keyword = editor.keywords.select(value)?;
        editor.form.add_keyword(&keyword);
        Ok(())
    }

    pub fn category_options(&self) -> Vec<String> {
        self.editor().categories.options().to_vec()
    }

    pub fn subcategory_options(&self) -> Vec<String> {
        self.editor().subcategories.options().to_vec()
    }

    /// Current validation errors, empty when the form can be submitted
    pub fn validate(&self) -> FieldErrors {
        let editor = self.editor();
        validate(&editor.form, editor.transaction.allowed_types())
    }

    /// Close the dialog without saving
    pub fn cancel(&self) -> CoreResult<()> {
        self.ensure_idle()?;
        let mut editor = self.editor();
        let form = TransactionForm::from_transaction(&editor.transaction);
        editor.form = form;
        editor.state = WorkflowState::Idle;
        Ok(())
    }

    /// Dismiss a finished submission
    pub fn acknowledge(&self) {
        let mut editor = self.editor();
        if matches!(editor.state, WorkflowState::Success | WorkflowState::Failed) {
            editor.state = WorkflowState::Idle;
        }
    }

    /// Validate and persist the form
    ///
    /// Returns `Err` only when nothing was attempted: validation failed or a
    /// submission is already running. Remote failures are reported through
    /// the outcome and keep the form for another try.
    pub async fn submit(&self) -> CoreResult<SubmitOutcome> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CoreError::SubmissionInProgress);
        }
        let _guard = BusyGuard { workflow: self };

        let (record, rule) = {
            let mut editor = self.editor();
            let errors = validate(&editor.form, editor.transaction.allowed_types());
            if !errors.is_empty() {
                let context = ErrorContext::new("validate_form")
                    .with_account(&self.account)
                    .with_transaction(&editor.transaction.id);
                self.logger
                    .log_warning(&format!("submission blocked: {}", errors), &context);
                return Err(CoreError::Validation { errors });
            }
            let rule = build_rule(&editor.form)?;
            let record = editor.form.apply_to(&editor.transaction);
            editor.state = WorkflowState::Submitting;
            (record, rule)
        };

        let context = ErrorContext::new("update_transaction")
            .with_account(&self.account)
            .with_transaction(&record.id);
        log::info!(
            target: "cleanledger::workflow",
            "updating transaction {} of account {} (register rule: {})",
            record.id,
            self.account,
            rule.is_some()
        );

        let transactions = &self.backends.transactions;
        let saved = match self
            .backends
            .retry
            .run("update transaction", || transactions.update(record.clone()))
            .await
        {
            Ok(saved) => saved,
            Err(error) => {
                self.logger.log_error(&error, &context);
                self.editor().state = WorkflowState::Failed;
                return Ok(SubmitOutcome::TransactionSaveFailed {
                    error: error.to_string(),
                });
            }
        };

        let rule_result = match rule {
            Some(rule) => {
                let sanitizations = &self.backends.sanitizations;
                self.backends
                    .retry
                    .run("add sanitization", || sanitizations.add(rule.clone()))
                    .await
                    .map(Some)
            }
            None => Ok(None),
        };

        // The transaction changed either way, so its views are stale.
        self.policy.apply(
            &CacheEvent::TransactionUpdated {
                account: self.account.clone(),
            },
            self.backends.invalidator.as_ref(),
        );

        let mut editor = self.editor();
        editor.transaction = saved.clone();
        match rule_result {
            Ok(rule) => {
                editor.form = TransactionForm::from_transaction(&saved);
                editor.state = WorkflowState::Success;
                log::info!(
                    target: "cleanledger::workflow",
                    "transaction {} updated",
                    saved.id
                );
                Ok(SubmitOutcome::FullSuccess {
                    transaction: saved,
                    rule,
                })
            }
            Err(error) => {
                editor.state = WorkflowState::Failed;
                drop(editor);
                self.logger.log_error(
                    &error,
                    &context.with_data("stage", serde_json::json!("rule")),
                );
                Ok(SubmitOutcome::TransactionSavedRuleFailed {
                    transaction: saved,
                    error: error.to_string(),
                })
            }
        }
    }
}
