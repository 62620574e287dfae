//! Account and membership handlers. All routes here sit behind the auth
//! middleware.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::dtos::auth::{MessageResponse, UpdateRoleRequest};
use crate::dtos::ErrorResponse;
use crate::middleware::AuthUser;
use crate::models::{AccountResponse, OrgMemberResponse};
use crate::services::ServiceError;
use crate::AppState;

/// Resolve the account behind the presented access token
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Account",
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<AccountResponse>, ServiceError> {
    let account = state.auth.current_account(&claims).await?;
    Ok(Json(account.sanitized()))
}

/// List members of an organization, oldest first
#[utoipa::path(
    get,
    path = "/orgs/{org_id}/members",
    params(("org_id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Members of the organization", body = [OrgMemberResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Membership",
    security(("bearer_auth" = []))
)]
pub async fn list_org_members(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<OrgMemberResponse>>, ServiceError> {
    let members = state.membership.members_for_org(org_id).await?;
    Ok(Json(members.iter().map(|m| m.sanitized()).collect()))
}

/// List an individual user's memberships across organizations
#[utoipa::path(
    get,
    path = "/users/{user_id}/memberships",
    params(("user_id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Memberships held by the user", body = [OrgMemberResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Membership",
    security(("bearer_auth" = []))
)]
pub async fn list_user_memberships(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<OrgMemberResponse>>, ServiceError> {
    let memberships = state.membership.memberships_for_user(user_id).await?;
    Ok(Json(memberships.iter().map(|m| m.sanitized()).collect()))
}

/// Change one member's role within one organization
#[utoipa::path(
    patch,
    path = "/orgs/{org_id}/members/{user_id}/role",
    params(
        ("org_id" = Uuid, Path, description = "Organization id"),
        ("user_id" = Uuid, Path, description = "User id of the member")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated membership", body = OrgMemberResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Membership not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Membership",
    security(("bearer_auth" = []))
)]
pub async fn update_member_role(
    State(state): State<AppState>,
    Path((org_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<OrgMemberResponse>, ServiceError> {
    let member = state
        .membership
        .update_role(user_id, org_id, req.role)
        .await?;
    Ok(Json(member.sanitized()))
}

/// Remove one membership; other memberships and any backing User row stay
#[utoipa::path(
    delete,
    path = "/orgs/{org_id}/members/{user_id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization id"),
        ("user_id" = Uuid, Path, description = "User id of the member")
    ),
    responses(
        (status = 200, description = "Membership removed", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Membership not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Membership",
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    State(state): State<AppState>,
    Path((org_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.membership.remove_membership(user_id, org_id).await?;
    Ok(Json(MessageResponse {
        message: "Membership removed".to_string(),
    }))
}
