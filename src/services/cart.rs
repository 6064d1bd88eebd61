//! CartService - checkout and purchase export/import
//!
//! TigerStyle: The balance is charged by one conditional update, so a
//! checkout either debits exactly once or not at all. Imported history is
//! rebuilt from the catalog; only gadget ids are taken from the file.

use std::sync::Arc;

use finova_store::{GadgetStore, User, UserStore};

use crate::sealing::{PurchaseExport, PurchaseSealer, SealError};
use crate::session::{SessionStore, PURCHASES_COUNT_MAX};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Smallest quantity per checkout
pub const QUANTITY_MIN: i32 = 1;

/// Largest quantity per checkout
pub const QUANTITY_MAX: i32 = 100;

// =============================================================================
// Types
// =============================================================================

/// Checkout outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseResult {
    /// Balance debited, purchase recorded
    Success,
    /// Balance does not cover the total
    InsufficientBalance,
    /// Invalid request or storage failure; nothing was charged
    Failure,
}

/// Import outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Purchase history replaced with this many entries
    Imported(usize),
    /// History reset to empty
    Failed(String),
}

impl ImportOutcome {
    /// Message shown on the profile page
    pub fn message(&self) -> String {
        match self {
            Self::Imported(count) => format!("Imported {count} purchases"),
            Self::Failed(reason) => format!("Import failed - {reason}"),
        }
    }

    /// True on success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Imported(_))
    }
}

#[derive(Debug, thiserror::Error)]
enum ImportError {
    #[error("{0}")]
    Seal(#[from] SealError),

    #[error("export belongs to another account")]
    WrongOwner,

    #[error("too many purchases: {count} > {max}")]
    TooMany { count: usize, max: usize },

    #[error("unknown gadget {0}")]
    UnknownGadget(i32),

    #[error("catalog lookup failed")]
    Storage(#[from] finova_store::StorageError),
}

// =============================================================================
// CartService
// =============================================================================

/// Checkout and purchase history operations
#[derive(Clone)]
pub struct CartService {
    gadgets: Arc<dyn GadgetStore>,
    users: Arc<dyn UserStore>,
    sessions: SessionStore,
    sealer: Arc<PurchaseSealer>,
}

impl CartService {
    /// Create a cart over the stores, session store and export sealer
    pub fn new(
        gadgets: Arc<dyn GadgetStore>,
        users: Arc<dyn UserStore>,
        sessions: SessionStore,
        sealer: Arc<PurchaseSealer>,
    ) -> Self {
        Self {
            gadgets,
            users,
            sessions,
            sealer,
        }
    }

    /// Buy `quantity` units of a gadget for `username`
    pub async fn checkout(
        &self,
        session_id: &str,
        username: &str,
        gadget_id: i32,
        quantity: i32,
    ) -> PurchaseResult {
        if !(QUANTITY_MIN..=QUANTITY_MAX).contains(&quantity) {
            return PurchaseResult::Failure;
        }

        let gadget = match self.gadgets.get_gadget(gadget_id).await {
            Ok(Some(gadget)) => gadget,
            Ok(None) => {
                tracing::warn!(gadget_id, "Checkout for unknown gadget");
                return PurchaseResult::Failure;
            }
            Err(e) => {
                tracing::error!(gadget_id, error = %e, "Gadget lookup failed");
                return PurchaseResult::Failure;
            }
        };

        let Some(price) = gadget.price else {
            return PurchaseResult::Failure;
        };
        let total = price * f64::from(quantity);
        if !total.is_finite() || total <= 0.0 {
            return PurchaseResult::Failure;
        }

        match self.users.debit_balance(username, total).await {
            Ok(true) => {}
            Ok(false) => return PurchaseResult::InsufficientBalance,
            Err(e) => {
                tracing::error!(username, error = %e, "Debit failed");
                return PurchaseResult::Failure;
            }
        }

        let units = usize::try_from(quantity).unwrap_or(0);
        assert!(units > 0, "quantity was range-checked above");

        self.sessions.append_purchase(session_id, &gadget, units).await;
        tracing::info!(username, gadget_id, quantity, total, "Checkout completed");
        PurchaseResult::Success
    }

    /// Seal the session's purchase history for download
    pub async fn export_purchases(
        &self,
        session_id: &str,
        owner: &User,
    ) -> Result<Vec<u8>, SealError> {
        let purchases = self.sessions.purchases(session_id).await;
        let count = purchases.len();
        let sealed = self.sealer.seal(&PurchaseExport::new(owner.id, purchases))?;
        tracing::info!(user_id = owner.id, count, "Exported purchases");
        Ok(sealed)
    }

    /// Replace the session's purchase history from an uploaded export
    pub async fn import_purchases(
        &self,
        session_id: &str,
        owner: &User,
        bytes: &[u8],
    ) -> ImportOutcome {
        match self.resolve_import(owner, bytes).await {
            Ok(purchases) => {
                let count = purchases.len();
                self.sessions.set_purchases(session_id, purchases).await;
                tracing::info!(user_id = owner.id, count, "Imported purchases");
                ImportOutcome::Imported(count)
            }
            Err(e) => {
                tracing::warn!(user_id = owner.id, error = %e, "Purchase import rejected");
                self.sessions.set_purchases(session_id, Vec::new()).await;
                ImportOutcome::Failed(e.to_string())
            }
        }
    }

    async fn resolve_import(
        &self,
        owner: &User,
        bytes: &[u8],
    ) -> Result<Vec<finova_store::Gadget>, ImportError> {
        let export = self.sealer.open(bytes)?;
        if export.owner_id != owner.id {
            return Err(ImportError::WrongOwner);
        }
        if export.purchases.len() > PURCHASES_COUNT_MAX {
            return Err(ImportError::TooMany {
                count: export.purchases.len(),
                max: PURCHASES_COUNT_MAX,
            });
        }

        let mut resolved = Vec::with_capacity(export.purchases.len());
        for entry in &export.purchases {
            let gadget = self
                .gadgets
                .get_gadget(entry.id)
                .await?
                .ok_or(ImportError::UnknownGadget(entry.id))?;
            resolved.push(gadget);
        }
        Ok(resolved)
    }
}

// =============================================================================
// Tests
// =============================================================================
