//! Saved vendors of the signed-in user.
//!
//! Favorites ride along with the [`User`] stored in the session: toggling
//! rewrites that record, signing out drops it. Nothing is sent to the vendor
//! service. Without a signed-in user, meaning a stored user and a bearer
//! token, toggling is a silent no-op and the set reads as empty.

use tower_sessions::Session;

use street_bite_core::{Favorites, User, VendorId};

use crate::models::session_keys;

/// Favorites backed by the session.
#[derive(Clone)]
pub struct FavoritesStore {
    session: Session,
}

impl FavoritesStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Add the vendor if absent, remove it if present.
    ///
    /// Returns the new membership, or `None` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn toggle(&self, id: &VendorId) -> Result<Option<bool>, tower_sessions::session::Error> {
        let Some(mut user) = self.user().await? else {
            tracing::debug!(vendor_id = %id, "Ignoring favorite toggle without a user");
            return Ok(None);
        };

        let saved = user.saved_vendors.toggle(id);
        self.session.insert(session_keys::CURRENT_USER, &user).await?;
        tracing::debug!(vendor_id = %id, saved, "Toggled favorite");
        Ok(Some(saved))
    }

    /// Whether the vendor is saved. Always false when signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn is_favorite(&self, id: &VendorId) -> Result<bool, tower_sessions::session::Error> {
        Ok(self
            .user()
            .await?
            .is_some_and(|user| user.saved_vendors.contains(id)))
    }

    /// All saved vendor ids, in the order they were saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn all(&self) -> Result<Favorites, tower_sessions::session::Error> {
        Ok(self
            .user()
            .await?
            .map(|user| user.saved_vendors)
            .unwrap_or_default())
    }

    async fn user(&self) -> Result<Option<User>, tower_sessions::session::Error> {
        if self
            .session
            .get::<String>(session_keys::AUTH_TOKEN)
            .await?
            .is_none()
        {
            return Ok(None);
        }
        self.session.get::<User>(session_keys::CURRENT_USER).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use street_bite_core::{Email, Role, UserId};

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn user(saved: &[&str]) -> User {
        User {
            id: UserId::new("u2"),
            name: "Mike Peterson".to_string(),
            email: Email::parse("mike.p@example.com").unwrap(),
            role: Role::User,
            saved_vendors: saved.iter().copied().map(VendorId::from).collect(),
        }
    }

    async fn signed_in(session: &Session, saved: &[&str]) {
        session.insert(session_keys::CURRENT_USER, user(saved)).await.unwrap();
        session.insert(session_keys::AUTH_TOKEN, "tok").await.unwrap();
    }

    async fn saved(session: &Session) -> Vec<String> {
        session
            .get::<User>(session_keys::CURRENT_USER)
            .await
            .unwrap()
            .unwrap()
            .saved_vendors
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_toggle_without_user_is_noop() {
        let session = session();
        let store = FavoritesStore::new(session.clone());

        let id = VendorId::new("v1");

        assert_eq!(store.toggle(&id).await.unwrap(), None);
        assert!(!store.is_favorite(&id).await.unwrap());
        assert!(store.all().await.unwrap().is_empty());
        assert!(session.get::<User>(session_keys::CURRENT_USER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_toggle_with_user_but_no_token_is_noop() {
        let session = session();
        session.insert(session_keys::CURRENT_USER, user(&["v6"])).await.unwrap();
        let store = FavoritesStore::new(session.clone());

        assert_eq!(store.toggle(&VendorId::new("v1")).await.unwrap(), None);
        assert!(!store.is_favorite(&VendorId::new("v6")).await.unwrap());
        assert!(store.all().await.unwrap().is_empty());
        assert_eq!(saved(&session).await, ["v6"]);
    }

    #[tokio::test]
    async fn test_toggle_persists_in_session() {
        let session = session();
        signed_in(&session, &["v1", "v6"]).await;
        let store = FavoritesStore::new(session.clone());

        assert_eq!(store.toggle(&VendorId::new("v2")).await.unwrap(), Some(true));
        assert_eq!(store.toggle(&VendorId::new("v1")).await.unwrap(), Some(false));
        assert_eq!(saved(&session).await, ["v6", "v2"]);

        let reloaded = FavoritesStore::new(session);
        assert!(reloaded.is_favorite(&VendorId::new("v2")).await.unwrap());
        assert!(!reloaded.is_favorite(&VendorId::new("v1")).await.unwrap());
        assert_eq!(reloaded.all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_double_toggle_restores_set() {
        let session = session();
        signed_in(&session, &["v1", "v6"]).await;
        let store = FavoritesStore::new(session.clone());

        let id = VendorId::new("v6");
        store.toggle(&id).await.unwrap();
        store.toggle(&id).await.unwrap();

        let mut after = saved(&session).await;
        after.sort();
        assert_eq!(after, ["v1", "v6"]);
    }
}
