//! Authentication service.
//!
//! [`AuthGate`] is the per-request view of who is signed in. It is loaded
//! from the session, talks to the vendor service for login, sign-up and
//! token refresh, and writes the outcome back to the session. Tokens are
//! opaque: the vendor service issues and checks them.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;
use tracing::instrument;

use street_bite_core::{Email, Role, User};

use crate::api::{ApiClient, ApiError, LoginCredentials, UserData};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::session_keys;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Session-backed authentication state for one request.
pub struct AuthGate {
    session: Session,
    api: ApiClient,
    user: Option<User>,
    token: Option<SecretString>,
}

impl AuthGate {
    /// Rehydrate from the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store cannot be read.
    pub async fn load(session: Session, api: ApiClient) -> Result<Self, AuthError> {
        let user = session.get::<User>(session_keys::CURRENT_USER).await?;
        let token = session
            .get::<String>(session_keys::AUTH_TOKEN)
            .await?
            .map(SecretString::from);

        Ok(Self {
            session,
            api,
            user,
            token,
        })
    }

    /// A user and a token are both present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        if self.is_authenticated() {
            self.user.as_ref()
        } else {
            None
        }
    }

    /// The bearer token, if signed in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        if self.is_authenticated() {
            self.token.as_ref()
        } else {
            None
        }
    }

    /// Sign in with email and password.
    ///
    /// On success the token and user are stored in the session. Favorites
    /// already held for the same account are kept; otherwise the service's
    /// record is used. On failure nothing in the session changes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the service rejects the
    /// pair, with its message.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: SecretString) -> Result<&User, AuthError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(AuthError::MissingField("Password"));
        }

        let credentials = LoginCredentials {
            email: email.into_inner(),
            password,
        };
        let response = self.api.login(&credentials).await?;
        let token = response
            .token
            .ok_or_else(|| AuthError::Api(ApiError::Parse("missing token".to_string())))?;

        let mut user = response.user;
        if let Some(previous) = &self.user
            && previous.id == user.id
        {
            user.saved_vendors = previous.saved_vendors.clone();
        }

        self.session.cycle_id().await?;
        self.session.insert(session_keys::AUTH_TOKEN, &token).await?;
        self.session.insert(session_keys::CURRENT_USER, &user).await?;
        set_sentry_user(&user.id, Some(user.email.as_str()));
        tracing::info!(user_id = %user.id, "User signed in");

        self.token = Some(SecretString::from(token));
        Ok(self.user.insert(user))
    }

    /// Create an account. The caller still has to sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with the service's message when the
    /// account cannot be created.
    #[instrument(skip(self, data), fields(email = %data.email))]
    pub async fn register(&self, data: &UserData) -> Result<User, AuthError> {
        let response = self.api.register(data).await?;
        tracing::info!(user_id = %response.user.id, "Account created");
        Ok(response.user)
    }

    /// Sign out locally. No request is made to the vendor service.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        self.clear_credentials().await?;
        self.session.remove::<serde_json::Value>(session_keys::REGISTRATION_WIZARD).await?;
        self.session.flush().await?;
        Ok(())
    }

    /// Re-fetch the signed-in user from the service.
    ///
    /// A 401 means the token is gone: the stored token and user are cleared
    /// and `Ok(None)` is returned. Saved vendors held in the session win
    /// over the service's copy.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` for failures other than 401.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<Option<&User>, AuthError> {
        let Some(token) = self.token.clone() else {
            return Ok(None);
        };

        match self.api.current_user(&token).await {
            Ok(mut fresh) => {
                if let Some(previous) = &self.user
                    && previous.id == fresh.id
                {
                    fresh.saved_vendors = previous.saved_vendors.clone();
                }
                self.session.insert(session_keys::CURRENT_USER, &fresh).await?;
                self.session.insert(session_keys::TOKEN_VERIFIED, true).await?;
                self.user = Some(fresh);
                Ok(self.current_user())
            }
            Err(ApiError::Unauthorized(_)) => {
                tracing::info!("Stored token rejected; signing out");
                self.clear_credentials().await?;
                Ok(None)
            }
            Err(e) => Err(AuthError::Api(e)),
        }
    }

    /// Confirm the stored token with the vendor service, once per session.
    ///
    /// Does nothing when signed out or already confirmed. A rejected token
    /// signs the session out; other failures leave it untouched and the
    /// check runs again on the next request.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` when the service cannot be asked.
    pub async fn verify(&mut self) -> Result<(), AuthError> {
        if self.token.is_none() {
            return Ok(());
        }
        let verified = self
            .session
            .get::<bool>(session_keys::TOKEN_VERIFIED)
            .await?
            .unwrap_or(false);
        if !verified {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Handle a 401 from any authenticated call.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn token_rejected(&mut self) -> Result<(), AuthError> {
        tracing::info!("Vendor service rejected token; clearing credentials");
        self.clear_credentials().await
    }

    async fn clear_credentials(&mut self) -> Result<(), AuthError> {
        self.session.remove::<String>(session_keys::AUTH_TOKEN).await?;
        self.session.remove::<User>(session_keys::CURRENT_USER).await?;
        self.session.remove::<bool>(session_keys::TOKEN_VERIFIED).await?;
        self.token = None;
        self.user = None;
        clear_sentry_user();
        Ok(())
    }
}

/// Check a sign-up form and build the request body.
///
/// # Errors
///
/// Returns the first problem found: blank name, bad email, short password
/// or mismatched confirmation.
pub fn sign_up(
    name: &str,
    email: &str,
    password: &str,
    password_confirm: &str,
    role: Role,
) -> Result<UserData, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::MissingField("Name"));
    }
    let email = Email::parse(email)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password != password_confirm {
        return Err(AuthError::PasswordMismatch);
    }

    Ok(UserData {
        name: name.to_string(),
        email: email.into_inner(),
        password: SecretString::from(password),
        role,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;
    use url::Url;

    use street_bite_core::{Favorites, UserId, VendorId};

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn api() -> ApiClient {
        // Never contacted by these tests.
        ApiClient::new(&Url::parse("http://127.0.0.1:9/api").unwrap())
    }

    fn user() -> User {
        User {
            id: UserId::new("u1"),
            name: "Sarah Johnson".to_string(),
            email: Email::parse("sarah.j@example.com").unwrap(),
            role: Role::User,
            saved_vendors: [VendorId::new("v3"), VendorId::new("v9")].into_iter().collect::<Favorites>(),
        }
    }

    async fn signed_in(session: &Session) {
        session.insert(session_keys::CURRENT_USER, user()).await.unwrap();
        session.insert(session_keys::AUTH_TOKEN, "tok").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_session_is_anonymous() {
        let gate = AuthGate::load(session(), api()).await.unwrap();
        assert!(!gate.is_authenticated());
        assert!(gate.current_user().is_none());
        assert!(gate.token().is_none());
    }

    #[tokio::test]
    async fn test_user_without_token_is_not_authenticated() {
        let session = session();
        session.insert(session_keys::CURRENT_USER, user()).await.unwrap();
        let gate = AuthGate::load(session, api()).await.unwrap();
        assert!(!gate.is_authenticated());
        assert!(gate.current_user().is_none());
    }

    #[tokio::test]
    async fn test_rehydrates_user_and_token() {
        let session = session();
        signed_in(&session).await;
        let gate = AuthGate::load(session, api()).await.unwrap();
        assert!(gate.is_authenticated());
        assert_eq!(gate.current_user().unwrap().saved_vendors.len(), 2);
        assert_eq!(gate.token().unwrap().expose_secret(), "tok");
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let session = session();
        signed_in(&session).await;
        let mut gate = AuthGate::load(session.clone(), api()).await.unwrap();

        gate.logout().await.unwrap();

        assert!(!gate.is_authenticated());
        assert!(session.get::<User>(session_keys::CURRENT_USER).await.unwrap().is_none());
        assert!(session.get::<String>(session_keys::AUTH_TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_rejected_clears_credentials() {
        let session = session();
        signed_in(&session).await;
        let mut gate = AuthGate::load(session.clone(), api()).await.unwrap();

        gate.token_rejected().await.unwrap();

        assert!(!gate.is_authenticated());
        assert!(session.get::<String>(session_keys::AUTH_TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_token_makes_no_request() {
        let mut gate = AuthGate::load(session(), api()).await.unwrap();
        assert!(gate.refresh().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_skips_confirmed_and_anonymous_sessions() {
        // The unreachable client would fail any request that got made.
        let mut gate = AuthGate::load(session(), api()).await.unwrap();
        gate.verify().await.unwrap();

        let session = session();
        signed_in(&session).await;
        session.insert(session_keys::TOKEN_VERIFIED, true).await.unwrap();
        let mut gate = AuthGate::load(session, api()).await.unwrap();
        gate.verify().await.unwrap();
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn test_verify_failure_keeps_session() {
        let session = session();
        signed_in(&session).await;
        let mut gate = AuthGate::load(session.clone(), api()).await.unwrap();

        assert!(matches!(gate.verify().await, Err(AuthError::Api(_))));
        assert!(gate.is_authenticated());
        assert!(session.get::<bool>(session_keys::TOKEN_VERIFIED).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_email_before_network() {
        let mut gate = AuthGate::load(session(), api()).await.unwrap();
        let err = gate
            .login("not-an-email", SecretString::from("password1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn test_sign_up_validation() {
        assert!(matches!(
            sign_up(" ", "a@b.co", "longenough", "longenough", Role::User),
            Err(AuthError::MissingField("Name"))
        ));
        assert!(matches!(
            sign_up("Mike", "mike.p@example.com", "short", "short", Role::User),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            sign_up("Mike", "mike.p@example.com", "longenough", "different", Role::User),
            Err(AuthError::PasswordMismatch)
        ));

        let data = sign_up(" Mike ", " mike.p@example.com ", "longenough", "longenough", Role::Vendor)
            .unwrap();
        assert_eq!(data.name, "Mike");
        assert_eq!(data.email, "mike.p@example.com");
        assert_eq!(data.role, Role::Vendor);
    }

    #[test]
    fn test_api_errors_map_to_form_messages() {
        let err = AuthError::from(ApiError::Unauthorized("Invalid email or password".to_string()));
        assert_eq!(err.user_message(), "Invalid email or password");
        let err = AuthError::from(ApiError::Status {
            status: 409,
            message: "User already exists".to_string(),
        });
        assert_eq!(err.user_message(), "User already exists");
    }
}
