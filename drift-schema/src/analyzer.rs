use serde::{Deserialize, Serialize};

/// A text analyzer: a tokenizer pipeline plus token filters, used by
/// `SEARCH` indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    pub name: String,
    pub tokenizers: Vec<String>,
    pub filters: Vec<String>,
}

impl Analyzer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tokenizers: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn tokenizer(mut self, tokenizer: impl Into<String>) -> Self {
        self.tokenizers.push(tokenizer.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }
}
