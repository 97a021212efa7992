//! Credential store — registration, verification, identity rebinding.
//!
//! Passwords are kept as deterministic SHA-256 hex digests and verified by
//! digest equality. The digest is unsalted; it exists for equality testing
//! only and is not a hardened password scheme.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::store::CredentialRepository;

/// A persisted login record.
///
/// `identity` / `handle` / `display_name` describe the client identity that
/// last held this login; they are rewritten on every successful password
/// login, so a login can migrate across client identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub identity: Option<String>,
    pub handle: Option<String>,
    pub display_name: String,
    pub login: String,
    pub password_digest: String,
}

/// Identity metadata the transport supplies with each inbound event.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub identity: String,
    pub handle: Option<String>,
    pub display_name: String,
}

/// Deterministic password digest (SHA-256, lowercase hex).
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(Credential),
    /// The login is already taken (case-sensitive exact match).
    AlreadyExists,
}

/// Outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified(Credential),
    /// Unknown login or wrong password — indistinguishable to the caller.
    NotFound,
}

/// Register/verify operations over the persisted credential collection.
///
/// The backing repository is a whole-table store: every mutation reloads the
/// collection, edits it, and rewrites it in full. Concurrent writers from
/// separate processes race (last writer wins); that is an accepted weakness
/// of the storage design.
pub struct CredentialStore {
    repo: Arc<dyn CredentialRepository>,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn CredentialRepository>) -> Self {
        Self { repo }
    }

    /// Load the collection, degrading an unreadable table to empty.
    async fn load_or_empty(&self) -> Vec<Credential> {
        match self.repo.load().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "credential table unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Create a new credential for `login` unless it already exists.
    ///
    /// Minimum password length is the registration flow's concern, not the
    /// store's.
    pub async fn register(
        &self,
        login: &str,
        password: &str,
        caller: &CallerIdentity,
    ) -> Result<RegisterOutcome, StoreError> {
        let mut records = self.load_or_empty().await;
        if records.iter().any(|c| c.login == login) {
            return Ok(RegisterOutcome::AlreadyExists);
        }
        let credential = Credential {
            identity: Some(caller.identity.clone()),
            handle: caller.handle.clone(),
            display_name: caller.display_name.clone(),
            login: login.to_string(),
            password_digest: hash_password(password),
        };
        records.push(credential.clone());
        self.repo.save(&records).await?;
        tracing::info!(login, "credential registered");
        Ok(RegisterOutcome::Created(credential))
    }

    /// Whether a credential with this exact login exists.
    pub async fn login_taken(&self, login: &str) -> bool {
        self.load_or_empty().await.iter().any(|c| c.login == login)
    }

    /// Verify a login/password pair. On success the stored record is rebound
    /// to the caller's current identity metadata and persisted.
    ///
    /// A failed rewrite is logged but does not fail the login; the rebind is
    /// retried naturally on the next successful login.
    pub async fn verify(
        &self,
        login: &str,
        password: &str,
        caller: &CallerIdentity,
    ) -> VerifyOutcome {
        let digest = hash_password(password);
        let mut records = self.load_or_empty().await;
        let Some(record) = records
            .iter_mut()
            .find(|c| c.login == login && c.password_digest == digest)
        else {
            return VerifyOutcome::NotFound;
        };
        record.identity = Some(caller.identity.clone());
        record.handle = caller.handle.clone();
        record.display_name = caller.display_name.clone();
        let verified = record.clone();
        if let Err(e) = self.repo.save(&records).await {
            tracing::warn!(error = %e, login, "failed to persist identity rebind");
        }
        tracing::info!(login, "login verified");
        VerifyOutcome::Verified(verified)
    }

    /// Find the credential currently bound to a client identity, if any.
    /// Used to short-circuit already-authorized users past the auth flow.
    pub async fn find_by_identity(&self, identity: &str) -> Option<Credential> {
        self.load_or_empty()
            .await
            .into_iter()
            .find(|c| c.identity.as_deref() == Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCredentialTable;

    fn caller(id: &str) -> CallerIdentity {
        CallerIdentity {
            identity: id.to_string(),
            handle: Some(format!("@{id}")),
            display_name: format!("User {id}"),
        }
    }

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryCredentialTable::default()))
    }

    #[test]
    fn digest_is_deterministic_hex() {
        assert_eq!(hash_password("1234"), hash_password("1234"));
        assert_ne!(hash_password("1234"), hash_password("12345"));
        assert_eq!(hash_password("1234").len(), 64);
        assert_ne!(hash_password("secret"), "secret");
    }

    #[tokio::test]
    async fn register_then_verify_roundtrip() {
        let store = store();
        let outcome = store.register("ivan", "1234", &caller("u1")).await.unwrap();
        let RegisterOutcome::Created(created) = outcome else {
            panic!("expected Created");
        };
        assert_eq!(created.password_digest, hash_password("1234"));

        match store.verify("ivan", "1234", &caller("u1")).await {
            VerifyOutcome::Verified(c) => assert_eq!(c.login, "ivan"),
            VerifyOutcome::NotFound => panic!("expected Verified"),
        }
    }

    #[tokio::test]
    async fn duplicate_login_is_rejected_without_mutation() {
        let store = store();
        store.register("ivan", "1234", &caller("u1")).await.unwrap();
        let outcome = store.register("ivan", "other", &caller("u2")).await.unwrap();
        assert_eq!(outcome, RegisterOutcome::AlreadyExists);

        // Original record is intact: old password still verifies.
        assert!(matches!(
            store.verify("ivan", "1234", &caller("u1")).await,
            VerifyOutcome::Verified(_)
        ));
        assert!(matches!(
            store.verify("ivan", "other", &caller("u2")).await,
            VerifyOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn login_is_case_sensitive() {
        let store = store();
        store.register("Ivan", "1234", &caller("u1")).await.unwrap();
        assert!(store.login_taken("Ivan").await);
        assert!(!store.login_taken("ivan").await);
        assert!(matches!(
            store.verify("ivan", "1234", &caller("u1")).await,
            VerifyOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_not_found() {
        let store = store();
        store.register("ivan", "1234", &caller("u1")).await.unwrap();
        assert!(matches!(
            store.verify("ivan", "4321", &caller("u1")).await,
            VerifyOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn verify_rebinds_identity_metadata() {
        let store = store();
        store.register("ivan", "1234", &caller("old")).await.unwrap();

        // Same login from a new client identity migrates the record.
        let outcome = store.verify("ivan", "1234", &caller("new")).await;
        let VerifyOutcome::Verified(c) = outcome else {
            panic!("expected Verified");
        };
        assert_eq!(c.identity.as_deref(), Some("new"));
        assert_eq!(c.handle.as_deref(), Some("@new"));

        assert!(store.find_by_identity("new").await.is_some());
        assert!(store.find_by_identity("old").await.is_none());
    }

    #[tokio::test]
    async fn find_by_identity_misses_unbound() {
        let store = store();
        assert!(store.find_by_identity("nobody").await.is_none());
    }
}
