//! Library member model

use serde::{Deserialize, Serialize};

use super::eq_ignore_case;

/// A registered borrower. Ids and emails are matched case-insensitively.
///
/// Equality is deliberately not implemented on "same id or same email";
/// uniqueness is checked through [`Member::has_id`] and [`Member::has_email`]
/// where members are inserted or updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub full_name: String,
    pub major: Option<String>,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Member {
    pub fn new(
        id: impl Into<String>,
        full_name: impl Into<String>,
        major: Option<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            major: major.filter(|m| !m.trim().is_empty()),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn has_id(&self, id: &str) -> bool {
        eq_ignore_case(&self.id, id)
    }

    pub fn has_email(&self, email: &str) -> bool {
        eq_ignore_case(&self.email, email)
    }

    /// Plaintext comparison
    pub fn check_password(&self, password: &str) -> bool {
        !self.password.is_empty() && self.password == password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_ignores_case() {
        let member = Member::new("M1", "Ani", None, "A@X.com", "secret");
        assert!(member.has_id("m1"));
        assert!(member.has_email("a@x.COM"));
        assert!(!member.has_email("b@x.com"));
    }

    #[test]
    fn test_blank_major_is_none() {
        let member = Member::new("M1", "Ani", Some("  ".into()), "a@x.com", "pw");
        assert_eq!(member.major, None);
    }

    #[test]
    fn test_password_never_serialized() {
        let member = Member::new("M1", "Ani", Some("TI".into()), "a@x.com", "secret");
        let json = serde_json::to_string(&member).unwrap();
        assert!(!json.contains("secret"));
    }
}
