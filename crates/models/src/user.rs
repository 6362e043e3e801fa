use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Stored collection name.
pub const COLLECTION: &str = "users";

/// An account record. Uniqueness of `username` is enforced by a unique
/// index created at startup, not by application-side pre-checks.
///
/// The password is stored exactly as supplied. That mirrors the system this
/// one replaces and is a known weakness; production deployments should move
/// to salted password hashing before exposing this service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    pub fn from_document(doc: Document) -> Result<Self, ModelError> {
        bson::from_document(doc).map_err(|e| ModelError::Decode(e.to_string()))
    }

    pub fn to_document(&self) -> Result<Document, ModelError> {
        bson::to_document(self).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    if username.trim().is_empty() {
        return Err(ModelError::Validation("username required".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.is_empty() {
        return Err(ModelError::Validation("password required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_username_rejected() {
        assert!(validate_username("  ").is_err());
        assert!(validate_username("alice").is_ok());
    }

    #[test]
    fn empty_password_rejected() {
        assert!(validate_password("").is_err());
        assert!(validate_password("x").is_ok());
    }
}
