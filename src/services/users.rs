//! UserService - registration, login, profile updates
//!
//! TigerStyle: Input limits are checked here before anything reaches
//! storage. Password hashing runs on the blocking pool.

use std::sync::Arc;

use finova_store::{
    NewUser, StorageError, StorageResult, User, UserStore, IMAGE_URL_BYTES_MAX,
    PASSWORD_BYTES_MAX, USERNAME_BYTES_MAX,
};
use url::Url;

use crate::password;
use crate::session::Session;

// =============================================================================
// Errors
// =============================================================================

/// Registration and login failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already exists")]
    UsernameTaken,

    #[error("invalid input: {0}")]
    Invalid(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Message shown on the login/register form
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid username or password",
            Self::UsernameTaken => "Username already exists",
            Self::Invalid(reason) => *reason,
            Self::Storage(_) | Self::Internal(_) => "Something went wrong, please try again",
        }
    }
}

/// Profile update failures
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Update failed - username may already exist")]
    UsernameTaken,

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Invalid(&'static str),

    #[error("Database error")]
    Storage(#[source] StorageError),
}

// =============================================================================
// Validation
// =============================================================================

fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("Username is required");
    }
    if username.len() > USERNAME_BYTES_MAX {
        return Err("Username is too long");
    }
    if username.chars().any(char::is_control) {
        return Err("Username contains invalid characters");
    }
    Ok(())
}

fn validate_image(image: &str) -> Result<(), &'static str> {
    if image.len() > IMAGE_URL_BYTES_MAX {
        return Err("Image URL is too long");
    }
    match Url::parse(image) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err("Image must be an http(s) URL"),
    }
}

// =============================================================================
// UserService
// =============================================================================

/// Account operations
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    /// Create a service over a user store
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Create an account with the default avatar and starting balance
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        validate_username(username).map_err(AuthError::Invalid)?;
        if password.is_empty() {
            return Err(AuthError::Invalid("Password is required"));
        }
        if password.len() > PASSWORD_BYTES_MAX {
            return Err(AuthError::Invalid("Password is too long"));
        }

        if self.users.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let owned = password.to_string();
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&owned))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = match self.users.insert_user(&NewUser::new(username, hash)).await {
            Ok(user) => user,
            Err(e) if e.is_conflict() => return Err(AuthError::UsernameTaken),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Check credentials and return the account
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty()
            || password.is_empty()
            || username.len() > USERNAME_BYTES_MAX
            || password.len() > PASSWORD_BYTES_MAX
        {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self.users.get_user_by_username(username).await?;
        let owned = password.to_string();
        let verified = tokio::task::spawn_blocking(move || match user {
            Some(user) if password::verify_password(&owned, &user.password_hash) => Some(user),
            Some(_) => None,
            None => {
                password::verify_dummy(&owned);
                None
            }
        })
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        match verified {
            Some(user) => {
                tracing::info!(user_id = user.id, "User logged in");
                Ok(user)
            }
            None => {
                tracing::warn!(username = %username, "Failed login attempt");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Current row for a user id
    pub async fn find_by_id(&self, id: i32) -> StorageResult<Option<User>> {
        self.users.get_user_by_id(id).await
    }

    /// True when the session's user id still resolves to an account
    pub async fn is_authenticated(&self, session: &Session) -> bool {
        match self.find_by_id(session.user_id).await {
            Ok(user) => user.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "Session user lookup failed");
                false
            }
        }
    }

    /// Change username and/or avatar. Blank fields are left unchanged.
    pub async fn update_profile(
        &self,
        user: &User,
        username: Option<&str>,
        image: Option<&str>,
    ) -> Result<(), ProfileError> {
        let username = username.map(str::trim).filter(|s| !s.is_empty());
        let image = image.map(str::trim).filter(|s| !s.is_empty());

        if let Some(name) = username {
            validate_username(name).map_err(ProfileError::Invalid)?;
        }
        if let Some(image) = image {
            validate_image(image).map_err(ProfileError::Invalid)?;
        }
        if username.is_none() && image.is_none() {
            return Ok(());
        }

        match self.users.update_profile(user.id, username, image).await {
            Ok(true) => {
                tracing::info!(user_id = user.id, "Profile updated");
                Ok(())
            }
            Ok(false) => Err(ProfileError::NotFound),
            Err(e) if e.is_conflict() => Err(ProfileError::UsernameTaken),
            Err(e) => {
                tracing::error!(user_id = user.id, error = %e, "Profile update failed");
                Err(ProfileError::Storage(e))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
