//! Organization membership lifecycle.
//!
//! Memberships are denormalized: an OrgMember row carries its own copy of
//! the credentials, whether or not a backing User row exists. The same
//! email may hold memberships in several organizations, each with its own
//! role and active flag.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{OrgMember, OrgRole, User};
use crate::services::directory::{AccountDirectory, NewUser};
use crate::services::store::AccountStore;
use crate::services::ServiceError;
use crate::utils::{hash_password, Password};

pub const ALREADY_MEMBER: &str = "User is already a member of this organization";
pub const MEMBER_EMAIL_TAKEN: &str =
    "An org member with this email already exists in this organization";

/// Fields for a member registered directly against an organization.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub organization_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: OrgRole,
}

#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn AccountStore>,
    directory: AccountDirectory,
}

impl MembershipService {
    pub fn new(store: Arc<dyn AccountStore>, directory: AccountDirectory) -> Self {
        Self { store, directory }
    }

    /// Rejects memberships against an organization id no row backs.
    async fn require_organization(&self, organization_id: Uuid) -> Result<(), ServiceError> {
        if self
            .directory
            .find_organization_by_id(organization_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::Validation(
                "organization_id does not reference a known organization".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a membership with no backing User row.
    pub async fn create_independent_member(
        &self,
        new_member: NewMember,
    ) -> Result<OrgMember, ServiceError> {
        self.require_organization(new_member.organization_id).await?;

        if self
            .directory
            .find_member_by_email_in_org(&new_member.email, new_member.organization_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyExists(MEMBER_EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_password(&Password::new(new_member.password))?;
        let member = OrgMember::new_independent(
            new_member.organization_id,
            new_member.username,
            new_member.email,
            new_member.full_name,
            password_hash.into_string(),
            new_member.role,
        );

        self.store
            .insert_member(member)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::Error::from(e)))
    }

    /// Link an existing User into an organization, copying the user's
    /// credentials onto the new membership row.
    pub async fn link_user(
        &self,
        user: &User,
        organization_id: Uuid,
        role: OrgRole,
    ) -> Result<OrgMember, ServiceError> {
        self.require_organization(organization_id).await?;

        if self
            .store
            .find_member_by_user_and_org(user.id, organization_id)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::Error::from(e)))?
            .is_some()
        {
            return Err(ServiceError::AlreadyExists(ALREADY_MEMBER.to_string()));
        }

        let member = OrgMember::from_user(user, organization_id, role);
        self.store
            .insert_member(member)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::Error::from(e)))
    }

    pub async fn link_existing_user_to_org(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: OrgRole,
    ) -> Result<OrgMember, ServiceError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::Error::from(e)))?
            .ok_or(ServiceError::AccountNotFound)?;
        self.link_user(&user, organization_id, role).await
    }

    /// Create a User account and immediately link it into an organization.
    ///
    /// The two writes are not transactional. A failed link leaves the User
    /// row in place; the caller can retry the link, so the partial state is
    /// logged rather than rolled back.
    pub async fn create_user_then_link(
        &self,
        new_user: NewUser,
        organization_id: Uuid,
        role: OrgRole,
    ) -> Result<(User, OrgMember), ServiceError> {
        self.require_organization(organization_id).await?;

        let user = self.directory.create_user(new_user).await?;
        match self.link_user(&user, organization_id, role).await {
            Ok(member) => Ok((user, member)),
            Err(err) => {
                tracing::warn!(
                    user_id = %user.id,
                    organization_id = %organization_id,
                    error = %err,
                    "User created but membership link failed"
                );
                Err(err)
            }
        }
    }

    /// Memberships held by a user across all organizations, oldest first.
    pub async fn memberships_for_user(&self, user_id: Uuid) -> Result<Vec<OrgMember>, ServiceError> {
        self.store
            .memberships_for_user(user_id)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::Error::from(e)))
    }

    /// All members of an organization, oldest first.
    pub async fn members_for_org(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrgMember>, ServiceError> {
        self.store
            .members_for_org(organization_id)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::Error::from(e)))
    }

    pub async fn update_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: OrgRole,
    ) -> Result<OrgMember, ServiceError> {
        self.store
            .update_member_role(user_id, organization_id, role)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::Error::from(e)))?
            .ok_or(ServiceError::AccountNotFound)
    }

    /// Remove one membership. Other memberships of the same user and the
    /// backing User row, if any, are untouched.
    pub async fn remove_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<(), ServiceError> {
        let removed = self
            .store
            .delete_member(user_id, organization_id)
            .await
            .map_err(|e| ServiceError::Internal(anyhow::Error::from(e)))?;
        if !removed {
            return Err(ServiceError::AccountNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, SubscriptionTier};
    use crate::services::directory::NewOrganization;
    use crate::services::store::MemoryStore;

    async fn setup() -> (MembershipService, AccountDirectory, Uuid) {
        let store: Arc<dyn AccountStore> = Arc::new(MemoryStore::new());
        let directory = AccountDirectory::new(store.clone());
        let service = MembershipService::new(store, directory.clone());
        let org = directory
            .create_organization(NewOrganization {
                name: "Clinic".to_string(),
                email: "clinic@test.com".to_string(),
                password: "abc$1234".to_string(),
            })
            .await
            .unwrap();
        (service, directory, org.id)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password: "abc$1234".to_string(),
            organization_id: None,
            subscription_tier: SubscriptionTier::Free,
            currency: Currency::Usd,
        }
    }

    fn new_member(org_id: Uuid, email: &str) -> NewMember {
        NewMember {
            organization_id: org_id,
            username: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            full_name: "Test Member".to_string(),
            password: "abc$1234".to_string(),
            role: OrgRole::Staff,
        }
    }

    #[tokio::test]
    async fn independent_member_has_no_user_link() {
        let (service, _, org_id) = setup().await;
        let member = service
            .create_independent_member(new_member(org_id, "m@test.com"))
            .await
            .unwrap();
        assert_eq!(member.user_id, None);
        assert!(member.is_active);
    }

    #[tokio::test]
    async fn linking_copies_user_credentials() {
        let (service, directory, org_id) = setup().await;
        let user = directory.create_user(new_user("u@test.com")).await.unwrap();

        let member = service
            .link_existing_user_to_org(user.id, org_id, OrgRole::Doctor)
            .await
            .unwrap();

        assert_eq!(member.user_id, Some(user.id));
        assert_eq!(member.email, user.email);
        assert_eq!(member.password_hash, user.password_hash);
        assert_ne!(member.id, user.id);
    }

    #[tokio::test]
    async fn relinking_same_pair_conflicts() {
        let (service, directory, org_id) = setup().await;
        let user = directory.create_user(new_user("u@test.com")).await.unwrap();

        service
            .link_existing_user_to_org(user.id, org_id, OrgRole::Doctor)
            .await
            .unwrap();
        let err = service
            .link_existing_user_to_org(user.id, org_id, OrgRole::Nurse)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn same_email_can_join_two_organizations() {
        let (service, directory, org_a) = setup().await;
        let org_b = directory
            .create_organization(NewOrganization {
                name: "Lab".to_string(),
                email: "lab@test.com".to_string(),
                password: "abc$1234".to_string(),
            })
            .await
            .unwrap()
            .id;

        service
            .create_independent_member(new_member(org_a, "shared@test.com"))
            .await
            .unwrap();
        let mut second = new_member(org_b, "shared@test.com");
        second.role = OrgRole::Nurse;
        service.create_independent_member(second).await.unwrap();

        assert_eq!(service.members_for_org(org_a).await.unwrap().len(), 1);
        assert_eq!(service.members_for_org(org_b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_email_twice_in_one_organization_conflicts() {
        let (service, _, org_id) = setup().await;
        service
            .create_independent_member(new_member(org_id, "m@test.com"))
            .await
            .unwrap();
        let err = service
            .create_independent_member(new_member(org_id, "m@test.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn unknown_organization_is_rejected() {
        let (service, _, _) = setup().await;
        let err = service
            .create_independent_member(new_member(Uuid::new_v4(), "m@test.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn update_role_and_remove_membership() {
        let (service, directory, org_id) = setup().await;
        let user = directory.create_user(new_user("u@test.com")).await.unwrap();
        service
            .link_existing_user_to_org(user.id, org_id, OrgRole::Staff)
            .await
            .unwrap();

        let updated = service
            .update_role(user.id, org_id, OrgRole::Doctor)
            .await
            .unwrap();
        assert_eq!(updated.role, OrgRole::Doctor);

        service.remove_membership(user.id, org_id).await.unwrap();
        assert!(matches!(
            service.remove_membership(user.id, org_id).await.unwrap_err(),
            ServiceError::AccountNotFound
        ));
        assert!(directory
            .find_user_by_email("u@test.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn create_then_link_writes_both_rows() {
        let (service, directory, org_id) = setup().await;
        let (user, member) = service
            .create_user_then_link(new_user("fresh@test.com"), org_id, OrgRole::Nurse)
            .await
            .unwrap();

        assert_eq!(member.user_id, Some(user.id));
        assert_eq!(member.role, OrgRole::Nurse);
        assert!(directory
            .find_user_by_email("fresh@test.com")
            .await
            .unwrap()
            .is_some());
    }
}
