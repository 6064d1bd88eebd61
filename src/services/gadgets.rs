//! GadgetService - catalog reads and purchase history

use std::sync::Arc;

use finova_store::{Gadget, GadgetStore, StorageResult};

use crate::session::SessionStore;

/// Catalog operations
#[derive(Clone)]
pub struct GadgetService {
    gadgets: Arc<dyn GadgetStore>,
    sessions: SessionStore,
}

impl GadgetService {
    /// Create a service over a gadget store
    pub fn new(gadgets: Arc<dyn GadgetStore>, sessions: SessionStore) -> Self {
        Self { gadgets, sessions }
    }

    /// Whole catalog, ordered by id
    pub async fn list(&self) -> StorageResult<Vec<Gadget>> {
        self.gadgets.list_gadgets().await
    }

    /// One gadget by id
    pub async fn get(&self, id: i32) -> StorageResult<Option<Gadget>> {
        self.gadgets.get_gadget(id).await
    }

    /// Gadgets bought in a session, empty when there are none
    pub async fn purchases(&self, session_id: &str) -> Vec<Gadget> {
        self.sessions.purchases(session_id).await
    }
}
