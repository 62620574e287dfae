//! Platform admin account. Exactly one row may exist system-wide.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            user_type: UserType::Admin,
            is_admin: true,
            created_at: Utc::now(),
        }
    }

    pub fn sanitized(&self) -> AdminResponse {
        AdminResponse::from(self.clone())
    }
}

/// Admin view for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
    pub is_admin: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AdminResponse {
    fn from(a: Admin) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            user_type: a.user_type,
            is_admin: a.is_admin,
            created_at: a.created_at,
        }
    }
}
