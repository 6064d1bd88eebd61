//! StatementService - bank statement listing and search

use std::sync::Arc;

use finova_store::{Statement, StatementStore, StorageResult};
use serde::Deserialize;

/// Search parameters. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementQuery {
    /// Case-insensitive substring of the customer name
    pub customer_name: Option<String>,
    /// Case-insensitive substring of the merchant name
    pub merchant_name: Option<String>,
    /// Case-insensitive substring of the ISO-8601 transaction instant
    pub transaction_date: Option<String>,
    /// Exact transaction type, e.g. `DEBIT`
    pub transaction_type: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl StatementQuery {
    /// Customer filter, if any
    pub fn customer(&self) -> Option<&str> {
        present(self.customer_name.as_ref())
    }

    /// True when the record passes the merchant, date and type filters
    pub fn matches(&self, statement: &Statement) -> bool {
        if let Some(merchant) = present(self.merchant_name.as_ref()) {
            let hit = statement
                .merchant_name
                .as_deref()
                .is_some_and(|m| contains_ignore_case(m, merchant));
            if !hit {
                return false;
            }
        }

        if let Some(date) = present(self.transaction_date.as_ref()) {
            let hit = statement
                .transaction_date_iso()
                .is_some_and(|d| contains_ignore_case(&d, date));
            if !hit {
                return false;
            }
        }

        if let Some(kind) = present(self.transaction_type.as_ref()) {
            if statement.transaction_type.as_deref() != Some(kind) {
                return false;
            }
        }

        true
    }
}

/// Statement read operations
#[derive(Clone)]
pub struct StatementService {
    statements: Arc<dyn StatementStore>,
}

impl StatementService {
    /// Create a service over a statement store
    pub fn new(statements: Arc<dyn StatementStore>) -> Self {
        Self { statements }
    }

    /// Every statement in insertion order
    pub async fn all(&self) -> StorageResult<Vec<Statement>> {
        self.statements.list_statements().await
    }

    /// Statements matching all supplied filters
    pub async fn search(&self, query: &StatementQuery) -> StorageResult<Vec<Statement>> {
        let base = match query.customer() {
            Some(customer) => self.statements.find_statements_by_customer(customer).await?,
            None => self.statements.list_statements().await?,
        };

        let results: Vec<Statement> = base.into_iter().filter(|s| query.matches(s)).collect();
        tracing::debug!(?query, count = results.len(), "Statement search");
        Ok(results)
    }
}
