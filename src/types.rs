//! NewType wrappers for strong typing throughout the service.
//!
//! These types prevent accidental mixing of semantically different values
//! (e.g., passing a blog id where a user id is expected, or a password hash
//! where an email is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a string NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }
    };
}

/// Macro to generate an integer identifier wrapper.
///
/// Identifiers are allocated by the database layer from a per-table sequence
/// and are always positive.
macro_rules! newtype_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

newtype_id!(
    /// Database identifier of a user (the principal).
    UserId
);

newtype_id!(
    /// Database identifier of a blog post.
    BlogId
);

newtype_string!(
    /// Email address of a user.
    ///
    /// This is the identity key: it is unique across users, it is what the
    /// user presents at login, and it is the `sub` claim of issued tokens.
    Email
);

impl Email {
    /// Minimal shape check: a non-empty local part and domain around one `@`.
    pub fn is_plausible(&self) -> bool {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        }
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

newtype_string!(
    /// A bcrypt password hash in modular crypt format (`$2b$<cost>$...`).
    ///
    /// Never compare two hashes for equality; use the password hasher's
    /// `verify` instead. There is deliberately no `Display` impl so the hash
    /// does not end up in log lines by accident.
    PasswordHash
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_creation() {
        let email = Email::new("alice@example.com");
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(email.to_string(), "alice@example.com");
    }

    #[test]
    fn test_email_into_inner() {
        let email = Email::new(String::from("carol@example.com"));
        assert_eq!(email.into_inner(), "carol@example.com");
    }

    #[test]
    fn test_email_plausibility() {
        assert!(Email::new("alice@example.com").is_plausible());
        assert!(!Email::new("alice").is_plausible());
        assert!(!Email::new("@example.com").is_plausible());
        assert!(!Email::new("alice@").is_plausible());
        assert!(!Email::new("a@b@c").is_plausible());
        assert!(!Email::new("").is_plausible());
    }

    #[test]
    fn test_ids_serde_transparent() {
        let id = BlogId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");

        let parsed: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, UserId::new(7));
        assert_eq!(parsed.get(), 7);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(BlogId::new(3).to_string(), "3");
        assert_eq!(UserId::new(9).to_string(), "9");
    }

    #[test]
    fn test_password_hash_serde() {
        let hash = PasswordHash::new("$2b$04$abcdefghijklmnopqrstuv");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"$2b$04$abcdefghijklmnopqrstuv\"");
    }

    #[test]
    fn test_type_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Email::new("a@example.com"));
        set.insert(Email::new("b@example.com"));

        assert!(set.contains(&Email::new("a@example.com")));
        assert!(!set.contains(&Email::new("c@example.com")));
    }
}
