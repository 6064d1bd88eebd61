//! Storage traits - one per entity
//!
//! TigerStyle: narrow interfaces, explicit results. Backends must issue a
//! single atomic statement for every write so concurrent requests cannot
//! lose updates.

use async_trait::async_trait;

use super::entity::{Gadget, NewGadget, NewStatement, NewUser, Statement, User};
use super::error::StorageResult;

/// Accounts of the gadget store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look a user up by login name (exact match).
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;

    /// Look a user up by id.
    async fn get_user_by_id(&self, id: i32) -> StorageResult<Option<User>>;

    /// Insert a new user.
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    async fn insert_user(&self, user: &NewUser) -> StorageResult<User>;

    /// Subtract `amount` from the user's balance if the balance covers it.
    ///
    /// Returns `false` when the user does not exist or the balance is too
    /// low; the balance is untouched in that case.
    async fn debit_balance(&self, username: &str, amount: f64) -> StorageResult<bool>;

    /// Update username and/or image. `None` keeps the current value.
    ///
    /// Returns `false` if no user has this id, `StorageError::Conflict` if
    /// the new username is taken.
    async fn update_profile(
        &self,
        id: i32,
        username: Option<&str>,
        image: Option<&str>,
    ) -> StorageResult<bool>;
}

/// Catalog of the gadget store.
#[async_trait]
pub trait GadgetStore: Send + Sync {
    /// All gadgets ordered by id.
    async fn list_gadgets(&self) -> StorageResult<Vec<Gadget>>;

    /// Look a gadget up by id.
    async fn get_gadget(&self, id: i32) -> StorageResult<Option<Gadget>>;

    /// Insert a new gadget.
    async fn insert_gadget(&self, gadget: &NewGadget) -> StorageResult<Gadget>;
}

/// Bank statement documents.
#[async_trait]
pub trait StatementStore: Send + Sync {
    /// All statements in insertion order.
    async fn list_statements(&self) -> StorageResult<Vec<Statement>>;

    /// Statements whose customer name contains `fragment`, ignoring case.
    ///
    /// The fragment is matched literally.
    async fn find_statements_by_customer(&self, fragment: &str) -> StorageResult<Vec<Statement>>;

    /// Insert a new statement.
    async fn insert_statement(&self, statement: &NewStatement) -> StorageResult<Statement>;

    /// Number of stored statements.
    async fn count_statements(&self) -> StorageResult<usize>;
}
