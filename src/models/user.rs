//! Individual user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Currency, SubscriptionTier, UserType};

/// Individual user entity.
///
/// `user_type` is normally `user`; a row promoted to `admin` may still log
/// in through the default login context and is reported with the admin role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub user_type: UserType,
    /// Loose affiliation; membership rows are the authoritative link.
    pub organization_id: Option<Uuid>,
    /// Org member (doctor/nurse/staff) assigned to this user, if any.
    pub assigned_staff_id: Option<Uuid>,
    pub subscription_tier: SubscriptionTier,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        full_name: String,
        password_hash: String,
        organization_id: Option<Uuid>,
        subscription_tier: SubscriptionTier,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            full_name,
            password_hash,
            user_type: UserType::User,
            organization_id,
            assigned_staff_id: None,
            subscription_tier,
            currency,
            created_at: Utc::now(),
        }
    }

    /// Convert to a response view (no password hash).
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self.clone())
    }
}

/// User view for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub user_type: UserType,
    pub organization_id: Option<Uuid>,
    pub assigned_staff_id: Option<Uuid>,
    pub subscription_tier: SubscriptionTier,
    pub currency: Currency,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            user_type: u.user_type,
            organization_id: u.organization_id,
            assigned_staff_id: u.assigned_staff_id,
            subscription_tier: u.subscription_tier,
            currency: u.currency,
            created_at: u.created_at,
        }
    }
}
