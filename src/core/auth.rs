//! Credential sign-in
//!
//! Sign-in is delegated to an [`Authenticator`] collaborator. Its failures are
//! split three ways, and the mutation layer maps each differently:
//!
//! - [`SignInError::Auth`] with [`AuthErrorKind::CredentialsSignin`]: the
//!   user typed the wrong thing
//! - [`SignInError::Auth`] with any other kind: the collaborator failed
//! - [`SignInError::Foreign`]: not an authentication error at all; fatal

use crate::core::service::UserStore;
use crate::core::validation::{FieldRule, FormInput, FormSchema, filters, validators};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Provider name for email/password sign-in
pub const CREDENTIALS_PROVIDER: &str = "credentials";

/// Recognized authentication failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Unknown user or wrong password
    CredentialsSignin,
    /// The provider itself failed while checking credentials
    CallbackRoute,
    /// Requested provider is not configured
    Configuration,
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorKind::CredentialsSignin => write!(f, "CredentialsSignin"),
            AuthErrorKind::CallbackRoute => write!(f, "CallbackRouteError"),
            AuthErrorKind::Configuration => write!(f, "Configuration"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("authentication failed: {kind}")]
    Auth { kind: AuthErrorKind },

    #[error(transparent)]
    Foreign(#[from] anyhow::Error),
}

impl SignInError {
    pub fn auth(kind: AuthErrorKind) -> Self {
        SignInError::Auth { kind }
    }
}

/// Establishes a session from submitted credentials
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn sign_in(&self, provider: &str, credentials: &FormInput) -> Result<(), SignInError>;
}

/// Email and password as submitted, with the password wiped on drop
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Parse credentials from a login form; `None` when the form is malformed
    pub fn parse(input: &FormInput) -> Option<Self> {
        let fields = credentials_schema().validate(input).into_result().ok()?;
        Some(Self {
            email: fields.text("email")?.to_string(),
            password: Zeroizing::new(fields.text("password")?.to_string()),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

fn credentials_schema() -> FormSchema {
    FormSchema::new()
        .field(
            FieldRule::text("email", "Please enter a valid email.")
                .filter(filters::trim())
                .filter(filters::lowercase())
                .check(validators::email(), "Please enter a valid email."),
        )
        .field(
            FieldRule::text("password", "Password must be at least 6 characters.")
                .check(validators::min_length(6), "Password must be at least 6 characters."),
        )
}

/// Hex SHA-256 digest stored in place of a password
///
/// The digest is unsalted and fast, so identical passwords share a digest and
/// leaked digests are cheap to brute-force. Not fit for production accounts.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Email/password [`Authenticator`] backed by a [`UserStore`]
#[derive(Clone)]
pub struct CredentialsAuthenticator {
    users: Arc<dyn UserStore>,
}

impl CredentialsAuthenticator {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Authenticator for CredentialsAuthenticator {
    async fn sign_in(&self, provider: &str, input: &FormInput) -> Result<(), SignInError> {
        if provider != CREDENTIALS_PROVIDER {
            return Err(SignInError::auth(AuthErrorKind::Configuration));
        }

        let Some(credentials) = Credentials::parse(input) else {
            return Err(SignInError::auth(AuthErrorKind::CredentialsSignin));
        };

        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch user");
                SignInError::auth(AuthErrorKind::CallbackRoute)
            })?;

        match user {
            Some(user) if user.password == hash_password(credentials.password()) => {
                tracing::info!(user_id = %user.id, "session established");
                Ok(())
            }
            _ => Err(SignInError::auth(AuthErrorKind::CredentialsSignin)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoice::User;
    use anyhow::{Result, anyhow};

    struct FixedUsers(Option<User>);

    #[async_trait]
    impl UserStore for FixedUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self.0.clone().filter(|u| u.email == email))
        }
    }

    struct BrokenUsers;

    #[async_trait]
    impl UserStore for BrokenUsers {
        async fn find_by_email(&self, _: &str) -> Result<Option<User>> {
            Err(anyhow!("connection reset"))
        }
    }

    fn user() -> User {
        User {
            id: "410544b2-4001-4271-9855-fec4b6a6442a".to_string(),
            name: "User".to_string(),
            email: "user@nextmail.com".to_string(),
            password: hash_password("123456"),
        }
    }

    fn login(email: &str, password: &str) -> FormInput {
        FormInput::from([
            ("email".to_string(), email.to_string()),
            ("password".to_string(), password.to_string()),
        ])
    }

    fn kind(result: Result<(), SignInError>) -> AuthErrorKind {
        match result {
            Err(SignInError::Auth { kind }) => kind,
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_password_is_hex_sha256() {
        assert_eq!(
            hash_password("123456"),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }

    #[test]
    fn test_parse_normalizes_email() {
        let creds = Credentials::parse(&login("  User@NextMail.com ", "123456")).unwrap();
        assert_eq!(creds.email(), "user@nextmail.com");
        assert_eq!(creds.password(), "123456");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::parse(&login("user@nextmail.com", "hunter22")).unwrap();
        let printed = format!("{:?}", creds);
        assert!(printed.contains("user@nextmail.com"));
        assert!(!printed.contains("hunter22"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_parse_rejects_short_password() {
        assert!(Credentials::parse(&login("user@nextmail.com", "123")).is_none());
    }

    #[tokio::test]
    async fn test_sign_in_succeeds_with_matching_password() {
        let auth = CredentialsAuthenticator::new(Arc::new(FixedUsers(Some(user()))));
        assert!(
            auth.sign_in(CREDENTIALS_PROVIDER, &login("user@nextmail.com", "123456"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let auth = CredentialsAuthenticator::new(Arc::new(FixedUsers(Some(user()))));
        let result = auth
            .sign_in(CREDENTIALS_PROVIDER, &login("user@nextmail.com", "654321"))
            .await;
        assert_eq!(kind(result), AuthErrorKind::CredentialsSignin);
    }

    #[tokio::test]
    async fn test_sign_in_unknown_user() {
        let auth = CredentialsAuthenticator::new(Arc::new(FixedUsers(None)));
        let result = auth
            .sign_in(CREDENTIALS_PROVIDER, &login("nobody@nextmail.com", "123456"))
            .await;
        assert_eq!(kind(result), AuthErrorKind::CredentialsSignin);
    }

    #[tokio::test]
    async fn test_sign_in_malformed_form() {
        let auth = CredentialsAuthenticator::new(Arc::new(FixedUsers(Some(user()))));
        let result = auth
            .sign_in(CREDENTIALS_PROVIDER, &FormInput::new())
            .await;
        assert_eq!(kind(result), AuthErrorKind::CredentialsSignin);
    }

    #[tokio::test]
    async fn test_sign_in_store_failure_is_callback_error() {
        let auth = CredentialsAuthenticator::new(Arc::new(BrokenUsers));
        let result = auth
            .sign_in(CREDENTIALS_PROVIDER, &login("user@nextmail.com", "123456"))
            .await;
        assert_eq!(kind(result), AuthErrorKind::CallbackRoute);
    }

    #[tokio::test]
    async fn test_sign_in_unknown_provider() {
        let auth = CredentialsAuthenticator::new(Arc::new(FixedUsers(Some(user()))));
        let result = auth
            .sign_in("github", &login("user@nextmail.com", "123456"))
            .await;
        assert_eq!(kind(result), AuthErrorKind::Configuration);
    }
}
