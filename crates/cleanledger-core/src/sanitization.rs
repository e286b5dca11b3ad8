//! Sanitization rule builder

use crate::error::CoreResult;
use crate::form::TransactionForm;
use crate::models::SanitizationRule;

/// Snapshot the edited values into a rule, if the user opted in
///
/// The rule copies the form at call time; later edits to the form or to
/// the transaction do not reach it.
pub fn build_rule(form: &TransactionForm) -> CoreResult<Option<SanitizationRule>> {
    if !form.register_rule {
        return Ok(None);
    }

    SanitizationRule::new(
        form.keywords().to_vec(),
        form.sanitized_description.clone(),
        form.transaction_type,
        form.category.clone(),
        form.subcategory.clone(),
        form.vendor.clone(),
    )
    .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::TransactionType;

    fn form() -> TransactionForm {
        let mut form = TransactionForm::default();
        form.sanitized_description = "Coffee".to_string();
        form.transaction_type = TransactionType::Income;
        form.category = "Food".to_string();
        form.subcategory = "Eating Out".to_string();
        form.vendor = "Cafe".to_string();
        form.register_rule = true;
        form.add_keyword("STARBUCKS");
        form
    }

    #[test]
    fn test_no_rule_without_opt_in() {
        let mut form = form();
        form.register_rule = false;
        assert_eq!(build_rule(&form).unwrap(), None);
    }

    #[test]
    fn test_rule_snapshots_form() {
        let mut form = form();
        let rule = build_rule(&form).unwrap().unwrap();

        form.vendor = "Changed".to_string();
        form.add_keyword("SBUX");

        assert_eq!(rule.keywords(), &["STARBUCKS".to_string()]);
        assert_eq!(rule.sanitized_description(), "Coffee");
        assert_eq!(rule.transaction_type(), TransactionType::Income);
        assert_eq!(rule.category(), "Food");
        assert_eq!(rule.subcategory(), "Eating Out");
        assert_eq!(rule.vendor(), "Cafe");
    }

    #[test]
    fn test_opt_in_without_keywords_fails() {
        let mut form = form();
        form.set_keywords(Vec::<String>::new());
        assert!(matches!(build_rule(&form), Err(CoreError::EmptyKeywords)));
    }
}
