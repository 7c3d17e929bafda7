//! Authentication service for OAuth2 Bearer token validation.

use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::AppError;
use crate::infrastructure::identity::IdentityProvider;

/// Role names as granted by the identity provider.
///
/// Kept as plain constants so handlers state their requirement at the route.
pub mod roles {
    pub const EMPLOYEE_CREATE: &str = "EMPLOYEE:CREATE";
    pub const EMPLOYEE_READ: &str = "EMPLOYEE:READ";
    pub const EMPLOYEE_READ_ALL: &str = "EMPLOYEE:READ_ALL";
    pub const EMPLOYEE_UPDATE: &str = "EMPLOYEE:UPDATE";
    pub const EMPLOYEE_TERMINATE: &str = "EMPLOYEE:TERMINATE";
    pub const AUDIT_LOG_READ_ALL: &str = "AUDIT_LOG:READ_ALL";
    pub const MANAGE_ROLES: &str = "MANAGE_ROLES";
}

/// Authenticated caller attached to each request by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Identity provider subject (user id) of the caller.
    pub subject: String,
    pub username: Option<String>,
    roles: BTreeSet<String>,
}

impl AuthContext {
    pub fn new(subject: String, username: Option<String>, roles: Vec<String>) -> Self {
        Self {
            subject,
            username,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Enforces a role, failing with 403 naming the missing role.
    pub fn require_role(&self, role: &str) -> Result<(), AppError> {
        if self.has_role(role) {
            return Ok(());
        }

        Err(AppError::forbidden(
            "You do not have permission to access this resource",
            json!({ "required_role": role }),
        ))
    }
}

/// Service for authenticating API requests via OAuth2 Bearer tokens.
///
/// Tokens are validated against the identity provider with RFC 7662
/// introspection; the resulting claims (subject, username, flattened roles)
/// become the request's [`AuthContext`].
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// Authenticates a raw Bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is inactive (expired,
    /// revoked, unknown) or carries no subject. Returns
    /// [`AppError::Dependency`] when the identity provider cannot be reached.
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext, AppError> {
        let introspection = self.identity.introspect(token).await?;

        if !introspection.active {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Token is expired, revoked, or unknown" }),
            ));
        }

        let subject = introspection.subject.ok_or_else(|| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Token carries no subject" }),
            )
        })?;

        Ok(AuthContext::new(
            subject,
            introspection.username,
            introspection.roles,
        ))
    }
}
