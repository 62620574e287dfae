//! Persistent-store collaborator for the four account entities.
//!
//! The core only talks to `AccountStore`; a SQL or document store plugs in
//! behind the trait. `MemoryStore` is the in-process implementation used by
//! tests and dev mode. Store-level uniqueness is the backstop for the
//! orchestrator's pre-check-then-insert sequence: a `UniqueViolation` from a
//! concurrent duplicate insert maps to the same conflict as a failed
//! pre-check.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Admin, OrgMember, OrgRole, Organization, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(&'static str),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn insert_organization(&self, org: Organization) -> Result<Organization, StoreError>;
    async fn find_organization_by_email(&self, email: &str)
        -> Result<Option<Organization>, StoreError>;
    async fn find_organization_by_id(&self, id: Uuid) -> Result<Option<Organization>, StoreError>;

    async fn insert_admin(&self, admin: Admin) -> Result<Admin, StoreError>;
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError>;
    async fn find_admin_by_id(&self, id: Uuid) -> Result<Option<Admin>, StoreError>;
    async fn admin_exists(&self) -> Result<bool, StoreError>;

    /// No email uniqueness on members: multi-org membership is by design.
    async fn insert_member(&self, member: OrgMember) -> Result<OrgMember, StoreError>;
    /// Bare-email lookup used by org_member login; oldest membership wins.
    async fn find_member_by_email(&self, email: &str) -> Result<Option<OrgMember>, StoreError>;
    async fn find_member_by_email_in_org(
        &self,
        email: &str,
        organization_id: Uuid,
    ) -> Result<Option<OrgMember>, StoreError>;
    async fn find_member_by_id(&self, id: Uuid) -> Result<Option<OrgMember>, StoreError>;
    async fn find_member_by_user_and_org(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<OrgMember>, StoreError>;
    async fn members_for_org(&self, organization_id: Uuid) -> Result<Vec<OrgMember>, StoreError>;
    async fn memberships_for_user(&self, user_id: Uuid) -> Result<Vec<OrgMember>, StoreError>;
    /// Remove the membership of one user in one organization.
    async fn delete_member(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, StoreError>;
    async fn update_member_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: OrgRole,
    ) -> Result<Option<OrgMember>, StoreError>;
}

/// In-process store. Each table is a map behind its own lock so a
/// check-then-insert runs atomically under the write guard, mirroring a
/// database unique constraint.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    organizations: RwLock<HashMap<Uuid, Organization>>,
    admins: RwLock<HashMap<Uuid, Admin>>,
    members: RwLock<HashMap<Uuid, OrgMember>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend(anyhow::anyhow!("memory store lock poisoned"))
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users.email"));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation("users.username"));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn insert_organization(&self, org: Organization) -> Result<Organization, StoreError> {
        let mut orgs = self.organizations.write().map_err(|_| poisoned())?;
        if orgs.values().any(|o| o.email == org.email) {
            return Err(StoreError::UniqueViolation("organizations.email"));
        }
        orgs.insert(org.id, org.clone());
        Ok(org)
    }

    async fn find_organization_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Organization>, StoreError> {
        let orgs = self.organizations.read().map_err(|_| poisoned())?;
        Ok(orgs.values().find(|o| o.email == email).cloned())
    }

    async fn find_organization_by_id(&self, id: Uuid) -> Result<Option<Organization>, StoreError> {
        let orgs = self.organizations.read().map_err(|_| poisoned())?;
        Ok(orgs.get(&id).cloned())
    }

    async fn insert_admin(&self, admin: Admin) -> Result<Admin, StoreError> {
        let mut admins = self.admins.write().map_err(|_| poisoned())?;
        if admins.values().any(|a| a.email == admin.email) {
            return Err(StoreError::UniqueViolation("admin.email"));
        }
        admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        let admins = self.admins.read().map_err(|_| poisoned())?;
        Ok(admins.values().find(|a| a.email == email).cloned())
    }

    async fn find_admin_by_id(&self, id: Uuid) -> Result<Option<Admin>, StoreError> {
        let admins = self.admins.read().map_err(|_| poisoned())?;
        Ok(admins.get(&id).cloned())
    }

    async fn admin_exists(&self) -> Result<bool, StoreError> {
        let admins = self.admins.read().map_err(|_| poisoned())?;
        Ok(!admins.is_empty())
    }

    async fn insert_member(&self, member: OrgMember) -> Result<OrgMember, StoreError> {
        let mut members = self.members.write().map_err(|_| poisoned())?;
        members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<OrgMember>, StoreError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        Ok(members
            .values()
            .filter(|m| m.email == email)
            .min_by_key(|m| m.joined_at)
            .cloned())
    }

    async fn find_member_by_email_in_org(
        &self,
        email: &str,
        organization_id: Uuid,
    ) -> Result<Option<OrgMember>, StoreError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        Ok(members
            .values()
            .find(|m| m.email == email && m.organization_id == organization_id)
            .cloned())
    }

    async fn find_member_by_id(&self, id: Uuid) -> Result<Option<OrgMember>, StoreError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        Ok(members.get(&id).cloned())
    }

    async fn find_member_by_user_and_org(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<OrgMember>, StoreError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        Ok(members
            .values()
            .find(|m| m.user_id == Some(user_id) && m.organization_id == organization_id)
            .cloned())
    }

    async fn members_for_org(&self, organization_id: Uuid) -> Result<Vec<OrgMember>, StoreError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        let mut rows: Vec<OrgMember> = members
            .values()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.joined_at);
        Ok(rows)
    }

    async fn memberships_for_user(&self, user_id: Uuid) -> Result<Vec<OrgMember>, StoreError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        let mut rows: Vec<OrgMember> = members
            .values()
            .filter(|m| m.user_id == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.joined_at);
        Ok(rows)
    }

    async fn delete_member(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut members = self.members.write().map_err(|_| poisoned())?;
        let id = members
            .values()
            .find(|m| m.user_id == Some(user_id) && m.organization_id == organization_id)
            .map(|m| m.id);
        Ok(match id {
            Some(id) => members.remove(&id).is_some(),
            None => false,
        })
    }

    async fn update_member_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: OrgRole,
    ) -> Result<Option<OrgMember>, StoreError> {
        let mut members = self.members.write().map_err(|_| poisoned())?;
        Ok(members
            .values_mut()
            .find(|m| m.user_id == Some(user_id) && m.organization_id == organization_id)
            .map(|m| {
                m.role = role;
                m.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, SubscriptionTier};

    fn sample_user(email: &str, username: &str) -> User {
        User::new(
            username.to_string(),
            email.to_string(),
            "Sample User".to_string(),
            "$argon2$fake".to_string(),
            None,
            SubscriptionTier::Free,
            Currency::Usd,
        )
    }

    #[tokio::test]
    async fn duplicate_user_email_is_a_unique_violation() {
        let store = MemoryStore::new();
        store
            .insert_user(sample_user("a@test.com", "a"))
            .await
            .unwrap();

        let err = store
            .insert_user(sample_user("a@test.com", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation("users.email")));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let store = MemoryStore::new();
        store
            .insert_user(sample_user("a@test.com", "same"))
            .await
            .unwrap();

        let err = store
            .insert_user(sample_user("b@test.com", "same"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation("users.username")));
    }

    #[tokio::test]
    async fn members_allow_duplicate_emails_across_orgs() {
        let store = MemoryStore::new();
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();

        for org in [org_a, org_b] {
            store
                .insert_member(OrgMember::new_independent(
                    org,
                    "nurse".to_string(),
                    "nurse@test.com".to_string(),
                    "Nurse Joy".to_string(),
                    "$argon2$fake".to_string(),
                    OrgRole::Nurse,
                ))
                .await
                .unwrap();
        }

        let in_a = store
            .find_member_by_email_in_org("nurse@test.com", org_a)
            .await
            .unwrap();
        let in_b = store
            .find_member_by_email_in_org("nurse@test.com", org_b)
            .await
            .unwrap();
        assert!(in_a.is_some());
        assert!(in_b.is_some());
        assert_ne!(in_a.unwrap().id, in_b.unwrap().id);
    }
}
