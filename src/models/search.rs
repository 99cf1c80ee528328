use serde::Serialize;

use crate::models::catalog_entry::CatalogEntry;

/// Parameters of one catalog search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub text: String,
    pub offset: u64,
    pub limit: u64,
}

impl SearchQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("text".to_string(), self.text.clone()),
            ("offset".to_string(), self.offset.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}

/// One page of search results. Always replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultPage {
    pub items: Vec<CatalogEntry>,
    pub total_count: u64,
}

impl ResultPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
