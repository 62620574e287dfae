//! Account entities and shared enums.
//!
//! The four account kinds share no base type; `Account` is the tagged union
//! the directory and orchestrator dispatch over.

mod admin;
mod org_member;
mod organization;
mod user;

pub use admin::{Admin, AdminResponse};
pub use org_member::{OrgMember, OrgMemberResponse};
pub use organization::{Organization, OrganizationResponse};
pub use user::{User, UserResponse};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Caller-declared account kind, used both as the registration account type
/// and as the login context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    User,
    OrgMember,
    Organization,
    Admin,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::User => "user",
            AccountKind::OrgMember => "org_member",
            AccountKind::Organization => "organization",
            AccountKind::Admin => "admin",
        }
    }
}

/// Type tag stored on User, Organization, and Admin rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    User,
    Admin,
    Organization,
}

/// Role held by a member within one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    OrgAdmin,
    Doctor,
    Nurse,
    Staff,
}

impl OrgRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::OrgAdmin => "org_admin",
            OrgRole::Doctor => "doctor",
            OrgRole::Nurse => "nurse",
            OrgRole::Staff => "staff",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Basic,
    Premium,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Ngn,
    Eur,
}

/// Tagged union over the four account entities.
#[derive(Debug, Clone)]
pub enum Account {
    User(User),
    OrgMember(OrgMember),
    Organization(Organization),
    Admin(Admin),
}

impl Account {
    pub fn id(&self) -> Uuid {
        match self {
            Account::User(u) => u.id,
            Account::OrgMember(m) => m.id,
            Account::Organization(o) => o.id,
            Account::Admin(a) => a.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Account::User(u) => &u.email,
            Account::OrgMember(m) => &m.email,
            Account::Organization(o) => &o.email,
            Account::Admin(a) => &a.email,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Account::User(u) => &u.password_hash,
            Account::OrgMember(m) => &m.password_hash,
            Account::Organization(o) => &o.password_hash,
            Account::Admin(a) => &a.password_hash,
        }
    }

    pub fn kind(&self) -> AccountKind {
        match self {
            Account::User(_) => AccountKind::User,
            Account::OrgMember(_) => AccountKind::OrgMember,
            Account::Organization(_) => AccountKind::Organization,
            Account::Admin(_) => AccountKind::Admin,
        }
    }

    /// Response view without credential material, tagged by account type.
    pub fn sanitized(&self) -> AccountResponse {
        match self {
            Account::User(u) => AccountResponse::User(u.sanitized()),
            Account::OrgMember(m) => AccountResponse::OrgMember(m.sanitized()),
            Account::Organization(o) => AccountResponse::Organization(o.sanitized()),
            Account::Admin(a) => AccountResponse::Admin(a.sanitized()),
        }
    }
}

/// Normalized account representation returned by every auth flow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "account_type", rename_all = "snake_case")]
pub enum AccountResponse {
    User(UserResponse),
    OrgMember(OrgMemberResponse),
    Organization(OrganizationResponse),
    Admin(AdminResponse),
}

impl AccountResponse {
    pub fn id(&self) -> Uuid {
        match self {
            AccountResponse::User(u) => u.id,
            AccountResponse::OrgMember(m) => m.id,
            AccountResponse::Organization(o) => o.id,
            AccountResponse::Admin(a) => a.id,
        }
    }
}
