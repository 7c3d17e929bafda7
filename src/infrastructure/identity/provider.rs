//! Identity provider abstraction.
//!
//! The trait covers the two faces of the external identity system:
//! resource-server token validation (introspection) and admin-side account
//! management (provisioning, updates, group membership).

use async_trait::async_trait;

use crate::error::AppError;

/// Result of validating a Bearer access token (RFC 7662 introspection).
#[derive(Debug, Clone)]
pub struct TokenIntrospection {
    /// Whether the token is currently valid.
    pub active: bool,
    /// Token subject: the identity provider's user id.
    pub subject: Option<String>,
    /// Preferred username claim, if present.
    pub username: Option<String>,
    /// Union of realm-level and client-level roles granted to the subject.
    pub roles: Vec<String>,
}

/// A user account as stored by the identity provider.
///
/// Also used as the pre-update snapshot for compensation: `restore_user`
/// writes these fields back verbatim.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub subject: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: bool,
}

/// Data for provisioning a new identity provider account.
#[derive(Debug, Clone)]
pub struct NewIdentityUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// One-time password; the provider forces a change on first login.
    pub temporary_password: String,
}

/// Profile fields pushed to the identity provider on employee update.
#[derive(Debug, Clone)]
pub struct IdentityUserUpdate {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Gateway to the external identity provider.
///
/// # Implementations
///
/// - [`crate::infrastructure::identity::KeycloakClient`] - Keycloak admin REST + OAuth2 endpoints
/// - Test mocks available with `cfg(test)`; integration tests use a local stub
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validates a Bearer access token via token introspection.
    ///
    /// An expired or revoked token yields `active: false`, not an error;
    /// errors mean the provider itself could not be consulted.
    async fn introspect(&self, token: &str) -> Result<TokenIntrospection, AppError>;

    /// Creates a user account and returns its subject id.
    ///
    /// Triggers the provider's setup e-mail (password reset + e-mail
    /// verification) best-effort; a failed e-mail never fails the creation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the username or e-mail is taken.
    async fn create_user(&self, user: &NewIdentityUser) -> Result<String, AppError>;

    /// Fetches the current account state, used as a compensation snapshot.
    async fn get_user(&self, subject: &str) -> Result<IdentityUser, AppError>;

    /// Pushes profile changes to the provider.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the new username is taken and
    /// [`AppError::Validation`] when the provider rejects the data.
    async fn update_user(&self, subject: &str, update: &IdentityUserUpdate)
    -> Result<(), AppError>;

    /// Writes a previously captured snapshot back (compensation path).
    async fn restore_user(&self, subject: &str, snapshot: &IdentityUser) -> Result<(), AppError>;

    /// Deletes a user account (compensation for a failed local insert).
    async fn delete_user(&self, subject: &str) -> Result<(), AppError>;

    /// Adds the user to a named group.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the group does not exist.
    async fn assign_group(&self, subject: &str, group: &str) -> Result<(), AppError>;

    /// Removes the user from a named group.
    async fn remove_group(&self, subject: &str, group: &str) -> Result<(), AppError>;

    /// Lightweight reachability probe for the health endpoint.
    async fn health_check(&self) -> bool;
}
