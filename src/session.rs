//! Access gate for the front end.
//!
//! `StaticCredentials` compares plain strings and offers no security; it stands
//! in for a real authenticator behind the `Authenticator` trait.

use std::collections::HashMap;

use crate::error::{Error, Result};

pub const CREDENTIALS_VAR: &str = "EQUISCOPE_CREDENTIALS";

pub trait Authenticator {
    fn authenticate(&self, username: &str, password: &str) -> bool;
}

#[derive(Clone, Debug, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    /// Parses `user:pass` pairs separated by commas.
    pub fn parse(table: &str) -> Result<Self> {
        let mut credentials = Self::new();

        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once(':') {
                Some((user, pass)) if !user.is_empty() => {
                    credentials.users.insert(user.to_string(), pass.to_string());
                }
                _ => {
                    return Err(Error::InvalidConfigValue {
                        key: CREDENTIALS_VAR,
                        value: entry.to_string(),
                    });
                }
            }
        }

        Ok(credentials)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, username: &str, password: &str) -> bool {
        self.users.get(username).is_some_and(|p| p == password)
    }
}

/// Per-user login state, owned by the front end.
#[derive(Clone, Debug, Default)]
pub struct Session {
    username: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login<A>(&mut self, authenticator: &A, username: &str, password: &str) -> bool
    where
        A: Authenticator + ?Sized,
    {
        if authenticator.authenticate(username, password) {
            log::info!("user {username} logged in");
            self.username = Some(username.to_string());
            true
        } else {
            log::warn!("rejected login for {username}");
            self.username = None;
            false
        }
    }

    pub fn logout(&mut self) {
        self.username = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials() {
        let credentials = StaticCredentials::new().with_user("admin", "equiscope");

        assert!(credentials.authenticate("admin", "equiscope"));
        assert!(!credentials.authenticate("admin", "wrong"));
        assert!(!credentials.authenticate("guest", "equiscope"));
    }

    #[test]
    fn test_parse_table() {
        let credentials = StaticCredentials::parse("admin:secret, analyst:p:w").unwrap();

        assert_eq!(credentials.len(), 2);
        assert!(credentials.authenticate("admin", "secret"));
        assert!(credentials.authenticate("analyst", "p:w"));
    }

    #[test]
    fn test_parse_rejects_malformed_entry() {
        assert!(matches!(
            StaticCredentials::parse("admin"),
            Err(Error::InvalidConfigValue { key: CREDENTIALS_VAR, .. })
        ));
        assert!(StaticCredentials::parse(":nouser").is_err());
    }

    #[test]
    fn test_session_lifecycle() {
        let credentials = StaticCredentials::new().with_user("admin", "secret");
        let mut session = Session::new();
        assert!(!session.is_authenticated());

        assert!(!session.login(&credentials, "admin", "nope"));
        assert!(!session.is_authenticated());

        assert!(session.login(&credentials, "admin", "secret"));
        assert_eq!(session.username(), Some("admin"));

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_login_through_trait_object() {
        let credentials: Box<dyn Authenticator> =
            Box::new(StaticCredentials::new().with_user("a", "b"));
        let mut session = Session::new();

        assert!(session.login(credentials.as_ref(), "a", "b"));
    }
}
