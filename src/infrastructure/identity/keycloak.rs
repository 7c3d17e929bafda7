//! Keycloak implementation of the identity provider gateway.
//!
//! Talks to two endpoint families:
//!
//! - `/realms/{realm}/protocol/openid-connect/*` - OAuth2 token and
//!   introspection endpoints
//! - `/admin/realms/{realm}/*` - admin REST API for account management
//!
//! Admin calls authenticate with a service-account access token obtained via
//! the `client_credentials` grant and cached until shortly before expiry.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::identity::provider::{
    IdentityProvider, IdentityUser, IdentityUserUpdate, NewIdentityUser, TokenIntrospection,
};

/// Leeway subtracted from token lifetimes so a token is refreshed before it
/// actually expires on the provider side.
const TOKEN_EXPIRY_LEEWAY_SECS: u64 = 10;

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Keycloak-backed [`IdentityProvider`].
pub struct KeycloakClient {
    http: reqwest::Client,
    base_url: String,
    realm: String,
    client_id: String,
    client_secret: String,
    admin_token: RwLock<Option<CachedToken>>,
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UserRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credentials: Option<Vec<CredentialRepresentation>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRepresentation {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    temporary: bool,
}

#[derive(Debug, Deserialize)]
struct GroupRepresentation {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize, Default)]
struct RoleClaim {
    #[serde(default)]
    roles: Vec<String>,
}

/// RFC 7662 response with the Keycloak-specific role claims.
#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    realm_access: Option<RoleClaim>,
    #[serde(default)]
    resource_access: Option<std::collections::HashMap<String, RoleClaim>>,
}

impl IntrospectionResponse {
    /// Flattens realm roles and per-client roles into one de-duplicated set.
    fn into_introspection(self) -> TokenIntrospection {
        let mut roles = BTreeSet::new();

        if let Some(realm) = self.realm_access {
            roles.extend(realm.roles);
        }
        if let Some(clients) = self.resource_access {
            for claim in clients.into_values() {
                roles.extend(claim.roles);
            }
        }

        TokenIntrospection {
            active: self.active,
            subject: self.sub,
            username: self.preferred_username,
            roles: roles.into_iter().collect(),
        }
    }
}

/// Extracts the created resource id from a `Location` header value.
///
/// Keycloak answers user creation with
/// `Location: {base}/admin/realms/{realm}/users/{id}`.
fn created_id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl KeycloakClient {
    /// Builds a client from service configuration.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.idp_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.idp_base_url.trim_end_matches('/').to_string(),
            realm: config.idp_realm.clone(),
            client_id: config.idp_client_id.clone(),
            client_secret: config.idp_client_secret.clone(),
            admin_token: RwLock::new(None),
        })
    }

    fn realm_url(&self, path: &str) -> String {
        format!("{}/realms/{}{}", self.base_url, self.realm, path)
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/admin/realms/{}{}", self.base_url, self.realm, path)
    }

    /// Returns a valid service-account access token, refreshing if needed.
    async fn admin_token(&self) -> Result<String, AppError> {
        {
            let guard = self.admin_token.read().await;
            if let Some(cached) = guard.as_ref() {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let response = self
            .http
            .post(self.realm_url("/protocol/openid-connect/token"))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Service account token request rejected");
            return Err(AppError::dependency(
                "Identity provider rejected service account credentials",
                json!({ "status": status.as_u16(), "body": body }),
            ));
        }

        let token: TokenResponse = response.json().await?;
        let access_token = token.access_token.clone();

        let mut guard = self.admin_token.write().await;
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now()
                + Duration::from_secs(token.expires_in.saturating_sub(TOKEN_EXPIRY_LEEWAY_SECS)),
        });

        Ok(access_token)
    }

    /// Triggers the provider's account setup e-mail (password + verification).
    ///
    /// Failure is logged and swallowed: the account exists, the e-mail can be
    /// re-sent from the admin console.
    async fn send_setup_email(&self, subject: &str, token: &str) {
        let result = self
            .http
            .put(self.admin_url(&format!("/users/{subject}/execute-actions-email")))
            .bearer_auth(token)
            .json(&json!(["UPDATE_PASSWORD", "VERIFY_EMAIL"]))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(subject, "Setup e-mail sent");
            }
            Ok(response) => {
                tracing::error!(subject, status = %response.status(), "Setup e-mail rejected");
            }
            Err(e) => {
                tracing::error!(subject, error = %e, "Setup e-mail request failed");
            }
        }
    }

    async fn fetch_user(&self, subject: &str, token: &str) -> Result<UserRepresentation, AppError> {
        let response = self
            .http
            .get(self.admin_url(&format!("/users/{subject}")))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::not_found(
                "User not found in identity provider",
                json!({ "subject": subject }),
            )),
            status if status.is_success() => Ok(response.json().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::dependency(
                    "Identity provider error",
                    json!({ "status": status.as_u16(), "body": body }),
                ))
            }
        }
    }

    async fn put_user(
        &self,
        subject: &str,
        user: &UserRepresentation,
        token: &str,
    ) -> Result<(), AppError> {
        let response = self
            .http
            .put(self.admin_url(&format!("/users/{subject}")))
            .bearer_auth(token)
            .json(user)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(AppError::conflict(
                "Username or email already exists in identity provider",
                json!({ "subject": subject }),
            )),
            StatusCode::BAD_REQUEST => {
                // Surface the provider's validation message to the caller.
                let body = response.text().await.unwrap_or_default();
                Err(AppError::bad_request(
                    "Identity provider rejected the update",
                    json!({ "provider_error": body }),
                ))
            }
            StatusCode::NOT_FOUND => Err(AppError::not_found(
                "User not found in identity provider",
                json!({ "subject": subject }),
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::dependency(
                    "Identity provider error",
                    json!({ "status": status.as_u16(), "body": body }),
                ))
            }
        }
    }

    /// Resolves a group name to its id.
    ///
    /// The admin API only accepts group ids for membership operations, and
    /// its search is a substring match, so the exact name is matched here.
    async fn find_group_id(&self, group: &str, token: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(self.admin_url("/groups"))
            .bearer_auth(token)
            .query(&[("search", group), ("max", "10")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::dependency(
                "Identity provider error",
                json!({ "status": status.as_u16() }),
            ));
        }

        let groups: Vec<GroupRepresentation> = response.json().await?;

        groups
            .into_iter()
            .find(|g| g.name.eq_ignore_ascii_case(group))
            .map(|g| g.id)
            .ok_or_else(|| {
                AppError::not_found(
                    "Group not found in identity provider",
                    json!({ "group": group }),
                )
            })
    }

    async fn group_membership(
        &self,
        subject: &str,
        group: &str,
        join: bool,
    ) -> Result<(), AppError> {
        let token = self.admin_token().await?;
        let group_id = self.find_group_id(group, &token).await?;
        let url = self.admin_url(&format!("/users/{subject}/groups/{group_id}"));

        let request = if join {
            self.http.put(url)
        } else {
            self.http.delete(url)
        };

        let response = request.bearer_auth(&token).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(AppError::not_found(
                "User not found in identity provider",
                json!({ "subject": subject }),
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::dependency(
                    "Identity provider error",
                    json!({ "status": status.as_u16(), "body": body }),
                ))
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for KeycloakClient {
    async fn introspect(&self, token: &str) -> Result<TokenIntrospection, AppError> {
        let basic = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(self.realm_url("/protocol/openid-connect/token/introspect"))
            .header(reqwest::header::AUTHORIZATION, format!("Basic {basic}"))
            .form(&[("token", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, "Token introspection rejected");
            return Err(AppError::dependency(
                "Identity provider rejected introspection request",
                json!({ "status": status.as_u16() }),
            ));
        }

        let body: IntrospectionResponse = response.json().await?;
        Ok(body.into_introspection())
    }

    async fn create_user(&self, user: &NewIdentityUser) -> Result<String, AppError> {
        tracing::info!(username = %user.username, "Creating identity provider user");

        let token = self.admin_token().await?;

        let representation = UserRepresentation {
            id: None,
            username: user.username.clone(),
            email: Some(user.email.clone()),
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
            enabled: true,
            email_verified: Some(false),
            required_actions: Some(vec!["UPDATE_PASSWORD".to_string()]),
            credentials: Some(vec![CredentialRepresentation {
                kind: "password".to_string(),
                value: user.temporary_password.clone(),
                temporary: true,
            }]),
        };

        let response = self
            .http
            .post(self.admin_url("/users"))
            .bearer_auth(&token)
            .json(&representation)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                let subject = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(created_id_from_location)
                    .ok_or_else(|| {
                        AppError::dependency(
                            "Identity provider did not return the created user id",
                            json!({}),
                        )
                    })?;

                tracing::info!(subject, "Identity provider user created");

                self.send_setup_email(&subject, &token).await;

                Ok(subject)
            }
            StatusCode::CONFLICT => Err(AppError::conflict(
                "User already exists in identity provider",
                json!({ "username": user.username }),
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, "Identity provider user creation failed");
                Err(AppError::dependency(
                    "Failed to create user in identity provider",
                    json!({ "status": status.as_u16(), "body": body }),
                ))
            }
        }
    }

    async fn get_user(&self, subject: &str) -> Result<IdentityUser, AppError> {
        let token = self.admin_token().await?;
        let user = self.fetch_user(subject, &token).await?;

        Ok(IdentityUser {
            subject: user.id.unwrap_or_else(|| subject.to_string()),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            enabled: user.enabled,
        })
    }

    async fn update_user(
        &self,
        subject: &str,
        update: &IdentityUserUpdate,
    ) -> Result<(), AppError> {
        tracing::info!(subject, "Updating identity provider user");

        let token = self.admin_token().await?;

        // Read-modify-write: only touch the fields this service owns.
        let mut user = self.fetch_user(subject, &token).await?;
        user.username = update.username.clone();
        user.first_name = Some(update.first_name.clone());
        user.last_name = Some(update.last_name.clone());
        user.credentials = None;

        self.put_user(subject, &user, &token).await
    }

    async fn restore_user(&self, subject: &str, snapshot: &IdentityUser) -> Result<(), AppError> {
        tracing::warn!(subject, "Restoring identity provider user from snapshot");

        let token = self.admin_token().await?;

        let representation = UserRepresentation {
            id: Some(snapshot.subject.clone()),
            username: snapshot.username.clone(),
            email: snapshot.email.clone(),
            first_name: snapshot.first_name.clone(),
            last_name: snapshot.last_name.clone(),
            enabled: snapshot.enabled,
            email_verified: None,
            required_actions: None,
            credentials: None,
        };

        self.put_user(subject, &representation, &token).await
    }

    async fn delete_user(&self, subject: &str) -> Result<(), AppError> {
        tracing::warn!(subject, "Deleting identity provider user");

        let token = self.admin_token().await?;

        let response = self
            .http
            .delete(self.admin_url(&format!("/users/{subject}")))
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()), // already gone, nothing to do
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::dependency(
                    "Failed to delete user in identity provider",
                    json!({ "status": status.as_u16(), "body": body }),
                ))
            }
        }
    }

    async fn assign_group(&self, subject: &str, group: &str) -> Result<(), AppError> {
        tracing::info!(subject, group, "Adding user to group");
        self.group_membership(subject, group, true).await
    }

    async fn remove_group(&self, subject: &str, group: &str) -> Result<(), AppError> {
        tracing::info!(subject, group, "Removing user from group");
        self.group_membership(subject, group, false).await
    }

    async fn health_check(&self) -> bool {
        match self.http.get(self.realm_url("")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
