//! Authentication service

use serde::Serialize;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::eq_ignore_case,
    repository::Repository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// Who is logged in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub display_name: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub struct AuthService<'a> {
    repository: &'a Repository,
    config: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(repository: &'a Repository, config: &'a AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Administrator credentials first, then member id and password.
    /// Passwords are compared as stored, in plain text.
    pub fn login(&self, username: &str, password: &str) -> AppResult<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Authentication(
                "Username and password are required".to_string(),
            ));
        }

        if eq_ignore_case(username, &self.config.admin_username)
            && password == self.config.admin_password
        {
            tracing::info!(username, "Administrator logged in");
            return Ok(Session {
                user_id: self.config.admin_username.clone(),
                role: Role::Admin,
                display_name: "Administrator".to_string(),
            });
        }

        match self.repository.members().get(username) {
            Some(member) if member.check_password(password) => {
                tracing::info!(member_id = %member.id, "Member logged in");
                Ok(Session {
                    user_id: member.id.clone(),
                    role: Role::Member,
                    display_name: member.full_name.clone(),
                })
            }
            _ => {
                tracing::warn!(username, "Login failed");
                Err(AppError::Authentication(
                    "Invalid username or password".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::test_support::stocked;

    #[test]
    fn test_admin_login() {
        let fx = stocked();
        let session = fx.library.auth().login("Admin", "admin123").unwrap();
        assert!(session.is_admin());
        assert_eq!(session.user_id, "admin");

        assert!(fx.library.auth().login("admin", "ADMIN123").is_err());
    }

    #[test]
    fn test_member_login() {
        let fx = stocked();
        let session = fx.library.auth().login("m1", "pw").unwrap();
        assert_eq!(session.role, Role::Member);
        assert_eq!(session.user_id, "M1");
        assert_eq!(session.display_name, "Ani Lestari");
    }

    #[test]
    fn test_login_failures() {
        let fx = stocked();
        for (user, pass) in [("M1", "wrong"), ("M9", "pw"), ("", "pw"), ("M1", "")] {
            assert!(matches!(
                fx.library.auth().login(user, pass),
                Err(AppError::Authentication(_))
            ));
        }
    }
}
