use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Bearer token for an authenticated dashboard session.
///
/// Sent as `Authorization: Bearer <token>` on every REST call and on the
/// push channel upgrade request. When an expiry is known, the client
/// refuses to send once it has passed instead of waiting for a 401.
#[derive(Debug, Clone)]
pub struct SessionToken {
    token: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            expires_at: None,
        }
    }

    /// Attach a known expiry instant.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// `true` once the expiry instant (if any) has been reached.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    pub(crate) fn bearer(&self) -> &str {
        self.token.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn token_without_expiry_never_expires() {
        let token = SessionToken::new(SecretString::from("abc".to_string()));
        assert!(!token.is_expired());
        assert!(token.expires_at().is_none());
    }

    #[test]
    fn token_past_expiry_is_expired() {
        let token = SessionToken::new(SecretString::from("abc".to_string()))
            .with_expiry(Utc::now() - Duration::seconds(5));
        assert!(token.is_expired());
    }

    #[test]
    fn token_before_expiry_is_valid() {
        let token = SessionToken::new(SecretString::from("abc".to_string()))
            .with_expiry(Utc::now() + Duration::minutes(10));
        assert!(!token.is_expired());
        assert_eq!(token.bearer(), "abc");
    }
}
