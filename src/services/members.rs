//! Member management service

use crate::{
    error::{AppError, AppResult},
    models::Member,
    repository::Repository,
};

pub struct MembersService<'a> {
    repository: &'a mut Repository,
}

impl<'a> MembersService<'a> {
    pub fn new(repository: &'a mut Repository) -> Self {
        Self { repository }
    }

    pub fn exists_by_id(&self, id: &str) -> bool {
        self.repository.members().contains(id)
    }

    pub fn exists_by_email(&self, email: &str) -> bool {
        self.repository.members().find(|m| m.has_email(email)).is_some()
    }

    /// Register a member. Both the id and the email must be unused.
    pub fn add_member(&mut self, member: Member) -> AppResult<()> {
        if self.exists_by_id(&member.id) {
            tracing::warn!(member_id = %member.id, "Member id already registered");
            return Err(AppError::DuplicateMemberId(member.id));
        }
        if self.exists_by_email(&member.email) {
            tracing::warn!(email = %member.email, "Member email already registered");
            return Err(AppError::DuplicateEmail(member.email));
        }

        tracing::info!(member_id = %member.id, name = %member.full_name, "Member added");
        self.repository.members_mut().add(member);
        self.repository.flush_members();
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Option<Member> {
        self.repository.members().get(id).cloned()
    }

    pub fn find_by_email(&self, email: &str) -> Option<Member> {
        self.repository.members().find(|m| m.has_email(email)).cloned()
    }

    /// Overwrite name, major and email of the member with the same id. The
    /// password only changes when a non-empty one is supplied.
    pub fn update_member(&mut self, member: &Member) -> AppResult<()> {
        let existing = self.repository.members().get(&member.id).ok_or_else(|| {
            tracing::warn!(member_id = %member.id, "Member not found for update");
            AppError::NoSuchMember(member.id.clone())
        })?;

        if !existing.has_email(&member.email) && self.exists_by_email(&member.email) {
            tracing::warn!(email = %member.email, "Email already used by another member");
            return Err(AppError::DuplicateEmail(member.email.clone()));
        }

        self.repository.members_mut().update(&member.id, |existing| {
            existing.full_name = member.full_name.clone();
            existing.major = member.major.clone();
            existing.email = member.email.clone();
            if !member.password.is_empty() {
                existing.password = member.password.clone();
            }
        });

        tracing::info!(member_id = %member.id, "Member updated");
        self.repository.flush_members();
        Ok(())
    }

    pub fn delete_member(&mut self, id: &str) -> AppResult<Member> {
        let removed = self.repository.members_mut().delete(id).ok_or_else(|| {
            tracing::warn!(member_id = id, "Member not found for deletion");
            AppError::NoSuchMember(id.to_string())
        })?;

        tracing::info!(member_id = %removed.id, "Member deleted");
        self.repository.flush_members();
        Ok(removed)
    }

    /// Snapshot of all members
    pub fn list_members(&self) -> Vec<Member> {
        self.repository.members().list()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::models::Member;
    use crate::services::test_support::fixture;

    fn ani() -> Member {
        Member::new("M1", "Ani Lestari", Some("Informatika".into()), "a@x.com", "pass123")
    }

    #[test]
    fn test_add_and_find() {
        let mut fx = fixture();
        fx.library.members().add_member(ani()).unwrap();

        let found = fx.library.members().find_by_id("m1").unwrap();
        assert_eq!(found.full_name, "Ani Lestari");
        assert!(fx.library.members().find_by_email("A@X.COM").is_some());
        assert!(fx.library.members().find_by_id("M2").is_none());
        assert_eq!(fx.storage.snapshot().members.len(), 1);
    }

    #[test]
    fn test_same_id_or_same_email_rejected() {
        let mut fx = fixture();
        fx.library.members().add_member(ani()).unwrap();

        let same_id = Member::new("M1", "Other", None, "other@x.com", "pw");
        assert!(matches!(
            fx.library.members().add_member(same_id),
            Err(AppError::DuplicateMemberId(_))
        ));

        let same_email = Member::new("M2", "Other", None, "A@x.com", "pw");
        assert!(matches!(
            fx.library.members().add_member(same_email),
            Err(AppError::DuplicateEmail(_))
        ));

        assert_eq!(fx.library.members().list_members().len(), 1);
        assert_eq!(fx.storage.snapshot().member_saves, 1);
    }

    #[test]
    fn test_update_member() {
        let mut fx = fixture();
        fx.library.members().add_member(ani()).unwrap();

        let changed = Member::new("M1", "Ani L.", Some("Hukum".into()), "ani.l@x.com", "newpass");
        fx.library.members().update_member(&changed).unwrap();

        let member = fx.library.members().find_by_id("M1").unwrap();
        assert_eq!(member.full_name, "Ani L.");
        assert_eq!(member.major.as_deref(), Some("Hukum"));
        assert_eq!(member.email, "ani.l@x.com");
        assert_eq!(member.password, "newpass");
    }

    #[test]
    fn test_empty_password_keeps_stored_one() {
        let mut fx = fixture();
        fx.library.members().add_member(ani()).unwrap();

        let changed = Member::new("M1", "Ani", None, "a@x.com", "");
        fx.library.members().update_member(&changed).unwrap();

        let member = fx.library.members().find_by_id("M1").unwrap();
        assert_eq!(member.password, "pass123");
        assert_eq!(member.major, None);
    }

    #[test]
    fn test_update_email_collision_rejected() {
        let mut fx = fixture();
        fx.library.members().add_member(ani()).unwrap();
        fx.library
            .members()
            .add_member(Member::new("M2", "Budi", None, "b@x.com", "pw"))
            .unwrap();

        let stolen = Member::new("M2", "Budi", None, "A@X.com", "");
        assert!(matches!(
            fx.library.members().update_member(&stolen),
            Err(AppError::DuplicateEmail(_))
        ));
        assert_eq!(fx.library.members().find_by_id("M2").unwrap().email, "b@x.com");

        // Changing only the case of one's own email is allowed
        let recased = Member::new("M1", "Ani", None, "A@X.COM", "");
        assert!(fx.library.members().update_member(&recased).is_ok());
    }

    #[test]
    fn test_update_unknown_member() {
        let mut fx = fixture();
        assert!(matches!(
            fx.library.members().update_member(&ani()),
            Err(AppError::NoSuchMember(_))
        ));
    }

    #[test]
    fn test_delete_member() {
        let mut fx = fixture();
        fx.library.members().add_member(ani()).unwrap();

        let removed = fx.library.members().delete_member("m1").unwrap();
        assert_eq!(removed.id, "M1");
        assert!(fx.library.members().find_by_id("M1").is_none());
        assert!(matches!(
            fx.library.members().delete_member("M1"),
            Err(AppError::NoSuchMember(_))
        ));
    }
}
