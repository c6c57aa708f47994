//! Session token registry
//!
//! Successful logins mint an opaque random token; mutating endpoints
//! present it back via the X-Auth-Token header. Tokens live for the
//! server process only.

use rand::RngCore;
use std::collections::HashSet;

use crate::error::AuthError;

const TOKEN_BYTES: usize = 16;

/// In-memory registry of issued admin tokens
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: HashSet<String>,
}

impl TokenRegistry {
    /// Mint and register a fresh token
    pub fn issue(&mut self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        self.tokens.insert(token.clone());
        token
    }

    /// Verify a token presented by a client
    pub fn verify(&self, token: Option<&str>) -> Result<(), AuthError> {
        match token {
            None => Err(AuthError::MissingToken),
            Some(t) if self.tokens.contains(t) => Ok(()),
            Some(_) => Err(AuthError::InvalidToken),
        }
    }

    /// Number of live tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let mut registry = TokenRegistry::default();
        let token = registry.issue();
        assert!(registry.verify(Some(&token)).is_ok());
    }

    #[test]
    fn unknown_token_is_rejected() {
        let registry = TokenRegistry::default();
        assert!(matches!(
            registry.verify(Some("deadbeef")),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(registry.verify(None), Err(AuthError::MissingToken)));
    }

    #[test]
    fn tokens_are_unique() {
        let mut registry = TokenRegistry::default();
        let a = registry.issue();
        let b = registry.issue();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
