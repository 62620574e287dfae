//! Organization membership records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::OrgRole;
use crate::models::User;

/// A person within one organization.
///
/// `user_id` is optional: an independent member exists only inside its
/// organization. Credentials are denormalized even when linked to a User so
/// an org-scoped login never joins back to the users table. The same email
/// (and the same user) may hold membership rows across many organizations;
/// uniqueness is enforced only per (identity, organization) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgMember {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub organization_id: Uuid,
    pub role: OrgRole,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

impl OrgMember {
    /// Member registered directly against an organization, with no backing
    /// User row.
    pub fn new_independent(
        organization_id: Uuid,
        username: String,
        email: String,
        full_name: String,
        password_hash: String,
        role: OrgRole,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            organization_id,
            role,
            username,
            email,
            full_name,
            password_hash,
            is_active: true,
            joined_at: Utc::now(),
        }
    }

    /// Membership for an existing User. Copies the credentials at link time;
    /// later changes on either side need an explicit update path.
    pub fn from_user(user: &User, organization_id: Uuid, role: OrgRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Some(user.id),
            organization_id,
            role,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            password_hash: user.password_hash.clone(),
            is_active: true,
            joined_at: Utc::now(),
        }
    }

    pub fn sanitized(&self) -> OrgMemberResponse {
        OrgMemberResponse::from(self.clone())
    }
}

/// Org member view for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrgMemberResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub organization_id: Uuid,
    pub role: OrgRole,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    #[schema(value_type = String, format = "date-time")]
    pub joined_at: DateTime<Utc>,
}

impl From<OrgMember> for OrgMemberResponse {
    fn from(m: OrgMember) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            organization_id: m.organization_id,
            role: m.role,
            username: m.username,
            email: m.email,
            full_name: m.full_name,
            is_active: m.is_active,
            joined_at: m.joined_at,
        }
    }
}
