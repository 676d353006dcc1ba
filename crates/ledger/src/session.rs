//! Binding between the identity provider and the [`LedgerStore`].
//!
//! The ledger only needs the user id to scope its collections; the profile
//! fields are kept for display.

use serde::{Deserialize, Serialize};

use crate::{Gateway, LedgerStore, ResultLedger};

const DEFAULT_DISPLAY_NAME: &str = "User";

/// User as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            photo_url: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }
}

/// Authentication state of the client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn set_user(&mut self, user: Option<User>) {
        self.is_authenticated = user.is_some();
        self.user = user;
        self.is_loading = false;
        self.error = None;
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.is_loading = false;
    }

    pub fn clear_user(&mut self) {
        *self = Self::default();
    }
}

/// A user session owning the ledger of the signed-in user.
#[derive(Debug)]
pub struct Session<G> {
    auth: AuthState,
    store: LedgerStore<G>,
}

impl<G: Gateway> Session<G> {
    pub fn new(store: LedgerStore<G>) -> Self {
        Self {
            auth: AuthState::default(),
            store,
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthState {
        &mut self.auth
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.user.as_ref()
    }

    /// Scoping key for the store, if someone is signed in.
    pub fn user_id(&self) -> Option<&str> {
        self.user().map(|user| user.id.as_str())
    }

    pub fn display_name(&self) -> &str {
        self.user()
            .and_then(|user| user.display_name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    pub fn store(&self) -> &LedgerStore<G> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LedgerStore<G> {
        &mut self.store
    }

    /// React to an identity change.
    ///
    /// A signed-in user gets both collections fetched; `None` signs out and
    /// discards the ledger. Switching user discards the previous ledger
    /// before fetching.
    pub async fn on_user_changed(&mut self, user: Option<User>) -> ResultLedger<()> {
        let Some(user) = user else {
            tracing::info!("signed out");
            self.auth.clear_user();
            self.store.reset();
            return Ok(());
        };

        if self.user_id().is_some_and(|current| current != user.id) {
            self.store.reset();
        }

        let user_id = user.id.clone();
        tracing::info!("signed in as {user_id}");
        self.auth.set_user(Some(user));
        self.store.fetch_all(&user_id).await
    }
}
