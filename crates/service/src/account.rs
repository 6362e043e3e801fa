//! Account creation and login against stored credentials.
//!
//! Passwords are compared as stored, in the clear, matching the system this
//! one replaces; see `models::user` for the flag on that behavior.

use std::sync::Arc;

use models::user::{self, User};
use mongodb::bson::doc;
use serde::Serialize;
use tracing::{error, instrument, warn};

use crate::errors::ServiceError;
use crate::store::{RecordStore, StoreError};

pub const LOGIN_OK_MESSAGE: &str = "Login successful";
/// Shared by the no-such-user and wrong-password paths so that responses
/// cannot be used to enumerate usernames.
pub const LOGIN_FAILED_MESSAGE: &str = "Incorrect Username or Password.";
pub const AMBIGUOUS_ACCOUNT_MESSAGE: &str = "More than one user with same name";
pub const CREATED_MESSAGE: &str = "Successfully created account.";
pub const DUPLICATE_USERNAME_MESSAGE: &str = "Username already taken.";
pub const CREATE_FAILED_MESSAGE: &str = "Failed creating account.";

/// Shaped result of account creation; always produced, like the review
/// receipt.
#[derive(Debug, Clone, Serialize)]
pub struct AccountReceipt {
    pub created: bool,
    pub message: String,
}

/// How a login resolved. Drives status-code mapping in the HTTP layer and
/// never appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Granted,
    Denied,
    /// More than one stored account matched the username. Unreachable while
    /// the unique index holds; treated as a data-integrity signal.
    AmbiguousAccount,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    #[serde(rename = "authRes")]
    pub auth_res: bool,
    pub message: String,
    #[serde(skip)]
    pub outcome: LoginOutcome,
}

impl LoginResult {
    fn granted() -> Self {
        Self { auth_res: true, message: LOGIN_OK_MESSAGE.into(), outcome: LoginOutcome::Granted }
    }

    fn denied() -> Self {
        Self { auth_res: false, message: LOGIN_FAILED_MESSAGE.into(), outcome: LoginOutcome::Denied }
    }

    fn ambiguous() -> Self {
        Self {
            auth_res: false,
            message: AMBIGUOUS_ACCOUNT_MESSAGE.into(),
            outcome: LoginOutcome::AmbiguousAccount,
        }
    }
}

pub struct AccountService {
    store: Arc<dyn RecordStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create an account. Duplicate usernames are rejected by the store's
    /// unique index and surface as a receipt with a distinct message; there
    /// is no application-side pre-check to race against.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::account::AccountService;
    /// use service::store::MemoryStore;
    /// let svc = AccountService::new(Arc::new(MemoryStore::for_app()));
    /// let first = tokio_test::block_on(svc.create_account("alice", "pw"));
    /// assert!(first.created);
    /// let second = tokio_test::block_on(svc.create_account("alice", "other"));
    /// assert!(!second.created);
    /// ```
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn create_account(&self, username: &str, password: &str) -> AccountReceipt {
        let record = doc! { "username": username, "password": password };
        match self.store.insert(user::COLLECTION, record).await {
            Ok(_) => AccountReceipt { created: true, message: CREATED_MESSAGE.into() },
            Err(StoreError::Conflict(_)) => {
                warn!(username, "duplicate account rejected");
                AccountReceipt { created: false, message: DUPLICATE_USERNAME_MESSAGE.into() }
            }
            Err(e) => {
                warn!(username, error = %e, "account insert failed");
                AccountReceipt { created: false, message: CREATE_FAILED_MESSAGE.into() }
            }
        }
    }

    /// Authenticate against the stored credential. The result is a state
    /// machine over the match count: zero and wrong-password both deny with
    /// the identical generic message; more than one match reports the
    /// integrity violation.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, ServiceError> {
        let matches = self
            .store
            .find(user::COLLECTION, doc! { "username": username })
            .await?;

        if matches.len() > 1 {
            error!(username, matches = matches.len(), "duplicate accounts detected at login");
            return Ok(LoginResult::ambiguous());
        }
        match matches.into_iter().next() {
            None => Ok(LoginResult::denied()),
            Some(doc) => {
                let stored = User::from_document(doc)?;
                if stored.password == password {
                    Ok(LoginResult::granted())
                } else {
                    Ok(LoginResult::denied())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use mongodb::bson::doc;

    fn service() -> (Arc<MemoryStore>, AccountService) {
        let store = Arc::new(MemoryStore::for_app());
        let svc = AccountService::new(store.clone());
        (store, svc)
    }

    #[tokio::test]
    async fn create_then_login() {
        let (_store, svc) = service();
        let receipt = svc.create_account("bob", "secret").await;
        assert!(receipt.created);
        assert_eq!(receipt.message, CREATED_MESSAGE);

        let result = svc.login("bob", "secret").await.unwrap();
        assert!(result.auth_res);
        assert_eq!(result.outcome, LoginOutcome::Granted);
        assert_eq!(result.message, LOGIN_OK_MESSAGE);
    }

    #[tokio::test]
    async fn failure_messages_resist_enumeration() {
        let (_store, svc) = service();
        svc.create_account("bob", "secret").await;

        let unknown_user = svc.login("mallory", "whatever").await.unwrap();
        let wrong_password = svc.login("bob", "wrong").await.unwrap();

        assert!(!unknown_user.auth_res);
        assert!(!wrong_password.auth_res);
        // byte-identical so the two cases are indistinguishable
        assert_eq!(unknown_user.message, wrong_password.message);
        assert_eq!(unknown_user.message, LOGIN_FAILED_MESSAGE);
        assert_eq!(unknown_user.outcome, LoginOutcome::Denied);
        assert_eq!(wrong_password.outcome, LoginOutcome::Denied);
    }

    #[tokio::test]
    async fn second_create_is_rejected() {
        let (store, svc) = service();
        assert!(svc.create_account("alice", "x").await.created);

        let second = svc.create_account("alice", "x").await;
        assert!(!second.created);
        assert_eq!(second.message, DUPLICATE_USERNAME_MESSAGE);

        // exactly one record made it in
        let stored = store.find(user::COLLECTION, doc! { "username": "alice" }).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_accounts_report_ambiguity() {
        let (store, svc) = service();
        // seed past the unique key to model a pre-index data set
        store.seed(
            user::COLLECTION,
            vec![
                doc! { "username": "twin", "password": "a" },
                doc! { "username": "twin", "password": "b" },
            ],
        );

        let result = svc.login("twin", "a").await.unwrap();
        assert!(!result.auth_res);
        assert_eq!(result.outcome, LoginOutcome::AmbiguousAccount);
        assert_eq!(result.message, AMBIGUOUS_ACCOUNT_MESSAGE);
    }

    #[tokio::test]
    async fn login_surfaces_store_outage() {
        let (store, svc) = service();
        store.set_unavailable(true);
        assert!(svc.login("bob", "secret").await.is_err());
    }

    #[tokio::test]
    async fn create_surfaces_outage_as_receipt() {
        let (store, svc) = service();
        store.set_unavailable(true);
        let receipt = svc.create_account("bob", "secret").await;
        assert!(!receipt.created);
        assert_eq!(receipt.message, CREATE_FAILED_MESSAGE);
    }
}
