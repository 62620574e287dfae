//! Registration, login, logout and session orchestration.

use uuid::Uuid;

use crate::dtos::auth::{LoginRequest, RegisterRequest};
use crate::models::{Account, AccountKind, Currency, OrgRole, SubscriptionTier, UserType};
use crate::services::directory::{
    AccountDirectory, NewAdmin, NewOrganization, NewUser, EMAIL_TAKEN,
};
use crate::services::error::invalid_credentials;
use crate::services::membership::{MembershipService, NewMember};
use crate::services::token::{Claims, TokenService};
use crate::services::ServiceError;
use crate::utils::{is_strong_password, verify_password, Password, PasswordHashString};

/// Result of a successful register or login, before the transport layer
/// decides between body tokens and cookies.
#[derive(Debug)]
pub struct AuthOutcome {
    pub account: Account,
    /// Resolved role; login only.
    pub role: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug)]
pub struct LogoutOutcome {
    pub token_invalidated: bool,
}

#[derive(Clone)]
pub struct AuthService {
    directory: AccountDirectory,
    membership: MembershipService,
    tokens: TokenService,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!("{} is required", field))),
    }
}

impl AuthService {
    pub fn new(
        directory: AccountDirectory,
        membership: MembershipService,
        tokens: TokenService,
    ) -> Self {
        Self {
            directory,
            membership,
            tokens,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthOutcome, ServiceError> {
        let email = normalize_email(&req.email);
        if !is_strong_password(&req.password) {
            return Err(ServiceError::WeakPassword);
        }

        let account = match req.account_type {
            AccountKind::User => {
                if self.directory.email_taken_anywhere(&email).await? {
                    return Err(ServiceError::AlreadyExists(EMAIL_TAKEN.to_string()));
                }
                let user = self
                    .directory
                    .create_user(NewUser {
                        username: require(req.username, "username")?,
                        email,
                        full_name: require(req.full_name, "full_name")?,
                        password: req.password,
                        organization_id: req.organization_id,
                        subscription_tier: req.subscription_tier.unwrap_or(SubscriptionTier::Free),
                        currency: req.currency.unwrap_or(Currency::Usd),
                    })
                    .await?;
                Account::User(user)
            }
            AccountKind::Organization => {
                if self.directory.email_taken_anywhere(&email).await? {
                    return Err(ServiceError::AlreadyExists(EMAIL_TAKEN.to_string()));
                }
                let org = self
                    .directory
                    .create_organization(NewOrganization {
                        name: require(req.name, "name")?,
                        email,
                        password: req.password,
                    })
                    .await?;
                Account::Organization(org)
            }
            AccountKind::Admin => {
                if self.directory.email_taken_anywhere(&email).await? {
                    return Err(ServiceError::AlreadyExists(EMAIL_TAKEN.to_string()));
                }
                let admin = self
                    .directory
                    .create_admin(NewAdmin {
                        name: require(req.name, "name")?,
                        email,
                        password: req.password,
                    })
                    .await?;
                Account::Admin(admin)
            }
            AccountKind::OrgMember => {
                let member = self.register_org_member(req, email).await?;
                Account::OrgMember(member)
            }
        };

        let (access_token, refresh_token) = self.tokens.issue_pair(account.id())?;
        tracing::info!(
            account_id = %account.id(),
            kind = account.kind().as_str(),
            "Account registered"
        );

        Ok(AuthOutcome {
            account,
            role: None,
            access_token,
            refresh_token,
        })
    }

    /// Org member registration. The email may already hold memberships in
    /// other organizations; only a same-org member, an organization or an
    /// admin with the email is a conflict. An existing User with the email
    /// is linked instead of duplicated.
    async fn register_org_member(
        &self,
        req: RegisterRequest,
        email: String,
    ) -> Result<crate::models::OrgMember, ServiceError> {
        let organization_id = req.organization_id.ok_or_else(|| {
            ServiceError::Validation("organization_id is required for org_member accounts".into())
        })?;
        let role = req.role.unwrap_or(OrgRole::Staff);

        if self
            .directory
            .find_member_by_email_in_org(&email, organization_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyExists(
                crate::services::membership::MEMBER_EMAIL_TAKEN.to_string(),
            ));
        }
        if self.directory.find_organization_by_email(&email).await?.is_some()
            || self.directory.find_admin_by_email(&email).await?.is_some()
        {
            return Err(ServiceError::AlreadyExists(EMAIL_TAKEN.to_string()));
        }

        if let Some(user) = self.directory.find_user_by_email(&email).await? {
            return self
                .membership
                .link_user(&user, organization_id, role)
                .await;
        }

        self.membership
            .create_independent_member(NewMember {
                organization_id,
                username: require(req.username, "username")?,
                email,
                full_name: require(req.full_name, "full_name")?,
                password: req.password,
                role,
            })
            .await
    }

    /// Login is scoped by `login_context`: only the table it names is
    /// consulted. Misses and wrong passwords collapse into one generic 401
    /// so the response never reveals whether the email exists.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthOutcome, ServiceError> {
        let email = normalize_email(&req.email);
        let password = Password::new(req.password);

        let result = self
            .resolve_login(&email, &password, req.login_context)
            .await;
        let (account, role) = match result {
            Ok(found) => found,
            Err(cause @ (ServiceError::AccountNotFound | ServiceError::PasswordInvalid)) => {
                return Err(invalid_credentials(&cause, &email));
            }
            Err(other) => return Err(other),
        };

        let (access_token, refresh_token) = self.tokens.issue_pair(account.id())?;
        tracing::info!(
            account_id = %account.id(),
            kind = account.kind().as_str(),
            role = %role,
            "Login succeeded"
        );

        Ok(AuthOutcome {
            account,
            role: Some(role),
            access_token,
            refresh_token,
        })
    }

    async fn resolve_login(
        &self,
        email: &str,
        password: &Password,
        context: AccountKind,
    ) -> Result<(Account, String), ServiceError> {
        match context {
            AccountKind::User => {
                let user = self
                    .directory
                    .find_user_by_email(email)
                    .await?
                    .ok_or(ServiceError::AccountNotFound)?;
                check_password(password, &user.password_hash)?;
                // A User row promoted to the admin type keeps the admin role
                let role = if user.user_type == UserType::Admin {
                    "admin"
                } else {
                    "user"
                };
                Ok((Account::User(user), role.to_string()))
            }
            AccountKind::OrgMember => {
                let member = self
                    .directory
                    .find_member_by_email(email)
                    .await?
                    .ok_or(ServiceError::AccountNotFound)?;
                check_password(password, &member.password_hash)?;
                let role = member.role.as_str().to_string();
                Ok((Account::OrgMember(member), role))
            }
            AccountKind::Organization => {
                let org = self
                    .directory
                    .find_organization_by_email(email)
                    .await?
                    .ok_or(ServiceError::AccountNotFound)?;
                check_password(password, &org.password_hash)?;
                Ok((Account::Organization(org), "org_admin".to_string()))
            }
            AccountKind::Admin => {
                let admin = self
                    .directory
                    .find_admin_by_email(email)
                    .await?
                    .ok_or(ServiceError::AccountNotFound)?;
                check_password(password, &admin.password_hash)?;
                Ok((Account::Admin(admin), "admin".to_string()))
            }
        }
    }

    /// Best-effort revocation of whatever tokens the caller presented.
    /// Logout never fails; `token_invalidated` reports whether at least one
    /// token actually hit the revocation list.
    pub async fn logout(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> LogoutOutcome {
        let mut token_invalidated = false;

        // Both tokens are only decoded, never checked against the
        // revocation list; re-revoking an already-revoked jti is harmless.
        if let Some(token) = access_token {
            if let Ok(claims) = self.tokens.decode(token) {
                if self.tokens.revoke(&claims).await.is_ok() {
                    token_invalidated = true;
                }
            }
        }

        if let Some(token) = refresh_token {
            if let Ok(claims) = self.tokens.decode(token) {
                if self.tokens.revoke(&claims).await.is_ok() {
                    token_invalidated = true;
                }
            }
        }

        tracing::info!(token_invalidated, "Logout processed");
        LogoutOutcome { token_invalidated }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ServiceError> {
        self.tokens.refresh(refresh_token).await
    }

    /// Resolve the account behind verified claims. A subject that no longer
    /// maps to a row reads as an authorization failure, not a missing
    /// resource.
    pub async fn current_account(&self, claims: &Claims) -> Result<Account, ServiceError> {
        let id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| ServiceError::NotAuthorized)?;
        match self.directory.find_by_id(id).await {
            Ok(account) => Ok(account),
            Err(ServiceError::AccountNotFound) => Err(ServiceError::NotAuthorized),
            Err(other) => Err(other),
        }
    }
}

fn check_password(password: &Password, stored_hash: &str) -> Result<(), ServiceError> {
    let hash = PasswordHashString::new(stored_hash.to_string());
    if verify_password(password, &hash) {
        Ok(())
    } else {
        Err(ServiceError::PasswordInvalid)
    }
}
