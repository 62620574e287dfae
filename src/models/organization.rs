//! Organization accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{OrgRole, UserType};

/// An organization account. Logging in as an organization always carries the
/// implicit `org_admin` role within its own organization, distinct from the
/// platform-wide Admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub role: OrgRole,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            user_type: UserType::Organization,
            role: OrgRole::OrgAdmin,
            created_at: Utc::now(),
        }
    }

    pub fn sanitized(&self) -> OrganizationResponse {
        OrganizationResponse::from(self.clone())
    }
}

/// Organization view for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
    pub role: OrgRole,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            email: org.email,
            user_type: org.user_type,
            role: org.role,
            created_at: org.created_at,
        }
    }
}
