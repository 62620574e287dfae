//! Account lookup and creation across the four account kinds.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    Account, AccountKind, Admin, Currency, OrgMember, Organization, SubscriptionTier, User,
};
use crate::services::store::{AccountStore, StoreError};
use crate::services::ServiceError;
use crate::utils::{hash_password, Password};

pub const EMAIL_TAKEN: &str = "An account with this email already exists";

/// Fields for a new individual user. The password arrives in plaintext and
/// is hashed before anything is persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub organization_id: Option<Uuid>,
    pub subscription_tier: SubscriptionTier,
    pub currency: Currency,
}

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn AccountStore>,
}

/// A late unique violation from a concurrent duplicate insert is the same
/// conflict as a failed pre-check.
fn map_store_err(err: StoreError) -> ServiceError {
    match err {
        StoreError::UniqueViolation("users.username") => {
            ServiceError::AlreadyExists("An account with this username already exists".to_string())
        }
        StoreError::UniqueViolation(_) => ServiceError::AlreadyExists(EMAIL_TAKEN.to_string()),
        StoreError::Backend(e) => ServiceError::Internal(e),
    }
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        self.store
            .find_user_by_email(email)
            .await
            .map_err(map_store_err)
    }

    pub async fn find_organization_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Organization>, ServiceError> {
        self.store
            .find_organization_by_email(email)
            .await
            .map_err(map_store_err)
    }

    pub async fn find_organization_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Organization>, ServiceError> {
        self.store
            .find_organization_by_id(id)
            .await
            .map_err(map_store_err)
    }

    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, ServiceError> {
        self.store
            .find_admin_by_email(email)
            .await
            .map_err(map_store_err)
    }

    pub async fn find_member_by_email(
        &self,
        email: &str,
    ) -> Result<Option<OrgMember>, ServiceError> {
        self.store
            .find_member_by_email(email)
            .await
            .map_err(map_store_err)
    }

    pub async fn find_member_by_email_in_org(
        &self,
        email: &str,
        organization_id: Uuid,
    ) -> Result<Option<OrgMember>, ServiceError> {
        self.store
            .find_member_by_email_in_org(email, organization_id)
            .await
            .map_err(map_store_err)
    }

    /// True when any of the four account kinds already owns this email.
    pub async fn email_taken_anywhere(&self, email: &str) -> Result<bool, ServiceError> {
        Ok(self.find_user_by_email(email).await?.is_some()
            || self.find_organization_by_email(email).await?.is_some()
            || self.find_admin_by_email(email).await?.is_some()
            || self.find_member_by_email(email).await?.is_some())
    }

    /// Typeless lookup. Probes User, then OrgMember, then Organization,
    /// then Admin; the order is a documented tie-break, with User winning
    /// should id spaces ever collide.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Account, ServiceError> {
        if let Some(user) = self.store.find_user_by_id(id).await.map_err(map_store_err)? {
            return Ok(Account::User(user));
        }
        if let Some(member) = self
            .store
            .find_member_by_id(id)
            .await
            .map_err(map_store_err)?
        {
            return Ok(Account::OrgMember(member));
        }
        if let Some(org) = self
            .store
            .find_organization_by_id(id)
            .await
            .map_err(map_store_err)?
        {
            return Ok(Account::Organization(org));
        }
        if let Some(admin) = self
            .store
            .find_admin_by_id(id)
            .await
            .map_err(map_store_err)?
        {
            return Ok(Account::Admin(admin));
        }
        Err(ServiceError::AccountNotFound)
    }

    /// Kind-scoped lookup for callers that already know the account kind.
    pub async fn find_by_id_and_kind(
        &self,
        id: Uuid,
        kind: AccountKind,
    ) -> Result<Account, ServiceError> {
        let account = match kind {
            AccountKind::User => self
                .store
                .find_user_by_id(id)
                .await
                .map_err(map_store_err)?
                .map(Account::User),
            AccountKind::OrgMember => self
                .store
                .find_member_by_id(id)
                .await
                .map_err(map_store_err)?
                .map(Account::OrgMember),
            AccountKind::Organization => self
                .store
                .find_organization_by_id(id)
                .await
                .map_err(map_store_err)?
                .map(Account::Organization),
            AccountKind::Admin => self
                .store
                .find_admin_by_id(id)
                .await
                .map_err(map_store_err)?
                .map(Account::Admin),
        };
        account.ok_or(ServiceError::AccountNotFound)
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, ServiceError> {
        if self.find_user_by_email(&new_user.email).await?.is_some() {
            return Err(ServiceError::AlreadyExists(EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_password(&Password::new(new_user.password))?;
        let user = User::new(
            new_user.username,
            new_user.email,
            new_user.full_name,
            password_hash.into_string(),
            new_user.organization_id,
            new_user.subscription_tier,
            new_user.currency,
        );

        self.store.insert_user(user).await.map_err(map_store_err)
    }

    pub async fn create_organization(
        &self,
        new_org: NewOrganization,
    ) -> Result<Organization, ServiceError> {
        if self
            .find_organization_by_email(&new_org.email)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyExists(EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_password(&Password::new(new_org.password))?;
        let org = Organization::new(new_org.name, new_org.email, password_hash.into_string());

        self.store
            .insert_organization(org)
            .await
            .map_err(map_store_err)
    }

    /// The Admin table is a system-wide singleton: any existing row blocks
    /// a second registration regardless of email.
    pub async fn create_admin(&self, new_admin: NewAdmin) -> Result<Admin, ServiceError> {
        if self.store.admin_exists().await.map_err(map_store_err)? {
            return Err(ServiceError::AlreadyExists(
                "An admin already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&Password::new(new_admin.password))?;
        let admin = Admin::new(new_admin.name, new_admin.email, password_hash.into_string());

        self.store.insert_admin(admin).await.map_err(map_store_err)
    }
}
