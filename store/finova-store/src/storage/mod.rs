//! Storage - Backend Traits and Implementations
//!
//! TigerStyle: Abstract storage with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │         UserStore / GadgetStore / StatementStore             │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │SimStorageBackend│           │ PostgresBackend │
//! │ (tests, --in-   │           │  (production)   │
//! │  memory mode)   │           │                 │
//! └─────────────────┘           └─────────────────┘
//! ```
//!
//! Every query is parameterized. Text search goes through
//! [`like_pattern`] so user input is always matched literally.

mod backend;
mod entity;
mod error;
mod sim;

#[cfg(feature = "postgres")]
mod postgres;

pub use backend::{GadgetStore, StatementStore, UserStore};
pub use entity::{Gadget, NewGadget, NewStatement, NewUser, Statement, TransactionType, User};
pub use error::{StorageError, StorageResult};
pub use sim::SimStorageBackend;

#[cfg(feature = "postgres")]
pub use postgres::{PostgresBackend, PostgresConfig};

/// Escape SQL `LIKE` metacharacters and wrap the fragment for a
/// "contains" match. The escape character is a backslash.
#[must_use]
pub fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn test_like_pattern_plain() {
        assert_eq!(like_pattern("John"), "%John%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_like_pattern_regex_is_literal() {
        // Regex operators carry no meaning in a LIKE pattern
        assert_eq!(like_pattern(".*"), "%.*%");
    }
}
