//! Identity provider integration.
//!
//! The [`IdentityProvider`] trait abstracts the external identity system;
//! [`KeycloakClient`] implements it against Keycloak's OAuth2 and admin REST
//! endpoints.

pub mod keycloak;
pub mod provider;

pub use keycloak::KeycloakClient;
pub use provider::{
    IdentityProvider, IdentityUser, IdentityUserUpdate, NewIdentityUser, TokenIntrospection,
};

#[cfg(test)]
pub use provider::MockIdentityProvider;
