use crate::utils::token::{authorization_header, is_token_expired, EXPIRY_BUFFER_SECS};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

#[derive(Debug, Default, Clone)]
struct Credentials {
    access: Option<String>,
    refresh: Option<String>,
}

/// In-memory cached auth tokens shared by every request path.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Credentials>,
}

impl CredentialStore {
    pub fn new(access: Option<String>, refresh: Option<String>) -> Self {
        Self {
            inner: RwLock::new(Credentials { access, refresh }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh.clone()
    }

    pub fn authorization(&self) -> Option<String> {
        self.read().access.as_deref().map(authorization_header)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().access.is_some()
    }

    /// True when the access token is a JWT about to expire and a refresh token is on hand.
    pub fn should_refresh(&self) -> bool {
        let creds = self.read();
        match (&creds.access, &creds.refresh) {
            (Some(access), Some(_)) => is_token_expired(access, EXPIRY_BUFFER_SECS),
            (None, Some(_)) => true,
            _ => false,
        }
    }

    pub fn save(&self, access: String, refresh: Option<String>) {
        let mut creds = self.write();
        creds.access = Some(access);
        if refresh.is_some() {
            creds.refresh = refresh;
        }
    }

    /// Clears only while `access` is still the cached access token.
    pub fn clear_if_access(&self, access: Option<&str>) -> bool {
        let mut creds = self.write();
        if creds.access.as_deref() != access {
            return false;
        }
        if creds.access.is_some() || creds.refresh.is_some() {
            info!("Clearing cached credentials");
        }
        *creds = Credentials::default();
        true
    }

    /// Clears only while `refresh` is still the cached refresh token.
    pub fn clear_if_refresh(&self, refresh: &str) -> bool {
        let mut creds = self.write();
        if creds.refresh.as_deref() != Some(refresh) {
            return false;
        }
        info!("Clearing cached credentials after failed refresh");
        *creds = Credentials::default();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_keeps_refresh_when_not_rotated() {
        let store = CredentialStore::new(Some("old".into()), Some("r1".into()));
        store.save("new".into(), None);
        assert_eq!(store.access_token().as_deref(), Some("new"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
        assert_eq!(store.authorization().as_deref(), Some("Token new"));

        assert!(store.clear_if_access(Some("new")));
        assert!(!store.is_authenticated());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn conditional_clears_spare_rotated_tokens() {
        let store = CredentialStore::new(Some("a2".into()), Some("r2".into()));
        assert!(!store.clear_if_refresh("r1"));
        assert!(!store.clear_if_access(Some("a1")));
        assert_eq!(store.access_token().as_deref(), Some("a2"));

        assert!(store.clear_if_refresh("r2"));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn opaque_tokens_never_need_refresh() {
        let store = CredentialStore::new(Some("opaque".into()), Some("r".into()));
        assert!(!store.should_refresh());
        let anonymous = CredentialStore::default();
        assert!(!anonymous.should_refresh());
    }
}
