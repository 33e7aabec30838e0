//! User account model.

use crate::model::UserId;
use std::fmt::{Debug, Formatter};

/// Registered account.
///
/// `password_hash` is a PHC-format argon2id string; it is redacted from
/// `Debug` output so the record can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Insert payload for a new account. The password is already hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl Debug for NewUser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::User;
    use crate::model::UserId;

    #[test]
    fn debug_output_hides_password_hash() {
        let user = User {
            id: UserId(1),
            username: "amal".to_string(),
            email: "amal@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: 0,
        };
        let rendered = format!("{user:?}");
        assert!(rendered.contains("amal"));
        assert!(!rendered.contains("secret"));
    }
}
