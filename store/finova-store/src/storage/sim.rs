//! SimStorageBackend - In-memory storage
//!
//! TigerStyle: Same semantics as the Postgres backend, held behind one
//! `RwLock` so every write is atomic. Used by tests and `--in-memory` mode.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{GadgetStore, StatementStore, UserStore};
use super::entity::{Gadget, NewGadget, NewStatement, NewUser, Statement, User};
use super::error::{StorageError, StorageResult};

#[derive(Debug, Default)]
struct SimState {
    users: Vec<User>,
    gadgets: Vec<Gadget>,
    statements: Vec<Statement>,
    next_user_id: i32,
    next_gadget_id: i32,
}

impl SimState {
    fn username_taken(&self, username: &str, except_id: Option<i32>) -> bool {
        self.users
            .iter()
            .any(|u| u.username == username && Some(u.id) != except_id)
    }
}

/// In-memory storage backend.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct SimStorageBackend {
    state: Arc<RwLock<SimState>>,
}

impl SimStorageBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// =============================================================================
// UserStore
// =============================================================================

#[async_trait]
impl UserStore for SimStorageBackend {
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_id(&self, id: i32) -> StorageResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> StorageResult<User> {
        let mut state = self.state.write().await;
        if state.username_taken(&user.username, None) {
            return Err(StorageError::conflict(format!(
                "username already exists: {}",
                user.username
            )));
        }

        state.next_user_id += 1;
        let stored = user.clone().into_user(state.next_user_id);
        state.users.push(stored.clone());

        // Postcondition
        assert!(stored.id > 0, "stored user must have positive id");

        Ok(stored)
    }

    async fn debit_balance(&self, username: &str, amount: f64) -> StorageResult<bool> {
        let mut state = self.state.write().await;
        match state.users.iter_mut().find(|u| u.username == username) {
            Some(user) if user.balance >= amount => {
                user.balance -= amount;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_profile(
        &self,
        id: i32,
        username: Option<&str>,
        image: Option<&str>,
    ) -> StorageResult<bool> {
        let mut state = self.state.write().await;
        if let Some(name) = username {
            if state.username_taken(name, Some(id)) {
                return Err(StorageError::conflict(format!(
                    "username already exists: {name}"
                )));
            }
        }

        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        if let Some(name) = username {
            user.username = name.to_string();
        }
        if let Some(image) = image {
            user.image = image.to_string();
        }
        Ok(true)
    }
}

// =============================================================================
// GadgetStore
// =============================================================================

#[async_trait]
impl GadgetStore for SimStorageBackend {
    async fn list_gadgets(&self) -> StorageResult<Vec<Gadget>> {
        let state = self.state.read().await;
        let mut gadgets = state.gadgets.clone();
        gadgets.sort_by_key(|g| g.id);
        Ok(gadgets)
    }

    async fn get_gadget(&self, id: i32) -> StorageResult<Option<Gadget>> {
        let state = self.state.read().await;
        Ok(state.gadgets.iter().find(|g| g.id == id).cloned())
    }

    async fn insert_gadget(&self, gadget: &NewGadget) -> StorageResult<Gadget> {
        let mut state = self.state.write().await;
        state.next_gadget_id += 1;
        let stored = gadget.clone().into_gadget(state.next_gadget_id);
        state.gadgets.push(stored.clone());
        Ok(stored)
    }
}

// =============================================================================
// StatementStore
// =============================================================================

#[async_trait]
impl StatementStore for SimStorageBackend {
    async fn list_statements(&self) -> StorageResult<Vec<Statement>> {
        let state = self.state.read().await;
        Ok(state.statements.clone())
    }

    async fn find_statements_by_customer(&self, fragment: &str) -> StorageResult<Vec<Statement>> {
        let needle = fragment.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .statements
            .iter()
            .filter(|s| {
                s.customer_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn insert_statement(&self, statement: &NewStatement) -> StorageResult<Statement> {
        let stored = statement
            .clone()
            .into_statement(uuid::Uuid::new_v4().simple().to_string());
        let mut state = self.state.write().await;
        state.statements.push(stored.clone());
        Ok(stored)
    }

    async fn count_statements(&self) -> StorageResult<usize> {
        Ok(self.state.read().await.statements.len())
    }
}

// =============================================================================
// Tests
// =============================================================================
