//! Option pickers for category, subcategory and keyword fields

use cleanledger_config::CategoriesConfig;

use crate::error::{CoreError, CoreResult};

/// A list of known options, optionally allowing new ones to be created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSelector {
    options: Vec<String>,
    allow_create: bool,
}

impl OptionSelector {
    pub fn new<I, S>(options: I, allow_create: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selector = Self {
            options: vec![],
            allow_create,
        };
        for option in options {
            let option = option.into();
            if !option.is_empty() && !selector.options.contains(&option) {
                selector.options.push(option);
            }
        }
        selector
    }

    /// An empty selector where every value is created on demand
    pub fn creatable() -> Self {
        Self::new(Vec::<String>::new(), true)
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn allows_create(&self) -> bool {
        self.allow_create
    }

    /// Pick a value, creating it when allowed
    ///
    /// An empty value clears the selection.
    pub fn select(&mut self, value: &str) -> CoreResult<String> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(String::new());
        }
        if self.options.iter().any(|o| o == value) {
            return Ok(value.to_string());
        }
        if !self.allow_create {
            return Err(CoreError::UnknownOption {
                value: value.to_string(),
            });
        }
        log::debug!("Creating option '{}'", value);
        self.options.push(value.to_string());
        Ok(value.to_string())
    }
}

/// Category and subcategory options known for the selected account
#[derive(Debug, Clone, Default)]
pub struct FinanceContext {
    pub categories: Vec<String>,
    pub subcategories: Vec<String>,
    pub allow_create: bool,
}

impl FinanceContext {
    pub fn from_config(config: &CategoriesConfig) -> Self {
        Self {
            categories: config.categories.clone(),
            subcategories: config.subcategories.clone(),
            allow_create: config.allow_create,
        }
    }

    pub fn category_selector(&self) -> OptionSelector {
        OptionSelector::new(self.categories.iter().cloned(), self.allow_create)
    }

    pub fn subcategory_selector(&self) -> OptionSelector {
        OptionSelector::new(self.subcategories.iter().cloned(), self.allow_create)
    }
}
