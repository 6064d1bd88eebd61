//! Entities - Rows of the store and statement databases
//!
//! TigerStyle: Explicit types, validation, builder-style constructors.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AVATAR_URL, IMAGE_URL_BYTES_MAX, STARTING_BALANCE, USERNAME_BYTES_MAX,
};

// =============================================================================
// User
// =============================================================================

/// A store account.
#[derive(Clone, PartialEq)]
pub struct User {
    /// Database identifier
    pub id: i32,
    /// Unique login name
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Avatar URL
    pub image: String,
    /// Spendable balance
    pub balance: f64,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("image", &self.image)
            .field("balance", &self.balance)
            .finish()
    }
}

/// A user that has not been stored yet.
#[derive(Clone)]
pub struct NewUser {
    /// Unique login name
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Avatar URL
    pub image: String,
    /// Opening balance
    pub balance: f64,
}

impl NewUser {
    /// Create a user with the default avatar and starting balance.
    ///
    /// # Panics
    /// Panics if the username is empty or exceeds limits.
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let username = username.into();
        assert!(!username.is_empty(), "username cannot be empty");
        assert!(
            username.len() <= USERNAME_BYTES_MAX,
            "username {} bytes exceeds max {}",
            username.len(),
            USERNAME_BYTES_MAX
        );

        Self {
            username,
            password_hash: password_hash.into(),
            image: DEFAULT_AVATAR_URL.to_string(),
            balance: STARTING_BALANCE,
        }
    }

    /// Override the avatar.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        let image = image.into();
        assert!(
            image.len() <= IMAGE_URL_BYTES_MAX,
            "image {} bytes exceeds max {}",
            image.len(),
            IMAGE_URL_BYTES_MAX
        );
        self.image = image;
        self
    }

    /// Override the opening balance.
    #[must_use]
    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    /// Attach a database id.
    #[must_use]
    pub fn into_user(self, id: i32) -> User {
        User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            image: self.image,
            balance: self.balance,
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("image", &self.image)
            .field("balance", &self.balance)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Gadget
// =============================================================================

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gadget {
    /// Database identifier
    pub id: i32,
    /// Display name
    pub name: String,
    /// Long description
    pub description: String,
    /// Product image URL
    pub image: String,
    /// Unit price; unpriced items cannot be bought
    pub price: Option<f64>,
}

/// A catalog item that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGadget {
    /// Display name
    pub name: String,
    /// Long description
    pub description: String,
    /// Product image URL
    pub image: String,
    /// Unit price
    pub price: Option<f64>,
}

impl NewGadget {
    /// Create a priced gadget.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
            price: Some(price),
        }
    }

    /// Remove the price (item is shown but not purchasable).
    #[must_use]
    pub fn unpriced(mut self) -> Self {
        self.price = None;
        self
    }

    /// Attach a database id.
    #[must_use]
    pub fn into_gadget(self, id: i32) -> Gadget {
        Gadget {
            id,
            name: self.name,
            description: self.description,
            image: self.image,
            price: self.price,
        }
    }
}

// =============================================================================
// Statement
// =============================================================================

/// Direction of a bank transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money leaving the account
    Debit,
    /// Money entering the account
    Credit,
}

impl TransactionType {
    /// Get string representation as stored.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }

    /// Parse the stored representation (exact match).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DEBIT" => Some(Self::Debit),
            "CREDIT" => Some(Self::Credit),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bank statement line.
///
/// Every field besides the id may be absent in the document store, so the
/// record keeps them optional and search filters skip missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Document identifier
    pub id: String,
    /// Card / account number
    pub account_number: Option<String>,
    /// Account holder
    pub customer_name: Option<String>,
    /// `DEBIT` or `CREDIT`, kept as stored
    pub transaction_type: Option<String>,
    /// Transaction amount
    pub amount: Option<f64>,
    /// Free-text description
    pub description: Option<String>,
    /// Counterparty
    pub merchant_name: Option<String>,
    /// Tags
    #[serde(default)]
    pub categories: Vec<String>,
    /// When the transaction happened
    pub transaction_date: Option<DateTime<Utc>>,
    /// Processing status
    pub status: Option<String>,
}

impl Statement {
    /// The transaction date as an ISO-8601 instant, e.g. `2025-01-15T10:30:00Z`.
    #[must_use]
    pub fn transaction_date_iso(&self) -> Option<String> {
        self.transaction_date
            .map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

/// A statement that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStatement {
    /// Card / account number
    pub account_number: String,
    /// Account holder
    pub customer_name: String,
    /// Direction
    pub transaction_type: TransactionType,
    /// Transaction amount
    pub amount: f64,
    /// Free-text description
    pub description: String,
    /// Counterparty
    pub merchant_name: String,
    /// Tags
    pub categories: Vec<String>,
    /// When the transaction happened
    pub transaction_date: DateTime<Utc>,
    /// Processing status
    pub status: String,
}

impl NewStatement {
    /// Attach a document id.
    #[must_use]
    pub fn into_statement(self, id: String) -> Statement {
        Statement {
            id,
            account_number: Some(self.account_number),
            customer_name: Some(self.customer_name),
            transaction_type: Some(self.transaction_type.as_str().to_string()),
            amount: Some(self.amount),
            description: Some(self.description),
            merchant_name: Some(self.merchant_name),
            categories: self.categories,
            transaction_date: Some(self.transaction_date),
            status: Some(self.status),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
