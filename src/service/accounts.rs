use tracing::info;

use super::require_address;
use crate::backend::DualBackend;
use crate::error::{CouponError, DomainError, Result};
use crate::models::*;
use crate::util::{gen_id, now_ms};

/// User accounts and the merchant onboarding workflow.
#[derive(Clone)]
pub struct AccountService {
    backends: DualBackend,
}

impl AccountService {
    pub fn new(backends: DualBackend) -> Self {
        Self { backends }
    }

    /// Sign in with a wallet address, creating the account on first use.
    pub fn login(&self, request: LoginRequest) -> Result<User> {
        let address = request.address.trim();
        require_address(address, "Wallet")?;
        let name = request.name.filter(|n| !n.trim().is_empty());
        let email = request.email.filter(|e| !e.trim().is_empty());

        let user = self.backends.execute("login", |b| {
            let user = match b.get_user_by_address(address)? {
                Some(existing) => {
                    if !existing.is_active {
                        return Err(DomainError::Inactive.into());
                    }
                    User {
                        last_login_at: now_ms(),
                        name: name.clone().or(existing.name.clone()),
                        email: email.clone().or(existing.email.clone()),
                        ..existing
                    }
                }
                None => User::new(address, name.clone(), email.clone()),
            };
            b.upsert_user(&user)?;
            Ok(user)
        })?;

        info!(user_id = %user.id, address, role = ?user.role, "User signed in");
        Ok(user)
    }

    pub fn get_user(&self, address: &str) -> Result<User> {
        self.backends.execute("get user", |b| {
            Ok(b.get_user_by_address(address)?
                .ok_or(DomainError::NotFound("User"))?)
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.backends
            .execute("list users", |b| Ok(b.list_users()?))
    }

    /// Activate or deactivate an account. Admins cannot deactivate themselves.
    pub fn toggle_user_status(&self, user_id: &str, admin_address: &str) -> Result<User> {
        let user = self.backends.execute("toggle user status", |b| {
            let user = b
                .get_user_by_id(user_id)?
                .ok_or(DomainError::NotFound("User"))?;
            if user.is_active && user.address == admin_address {
                return Err(DomainError::Forbidden(
                    "Admins cannot deactivate their own account".into(),
                )
                .into());
            }
            let user = User {
                is_active: !user.is_active,
                ..user
            };
            b.upsert_user(&user)?;
            Ok(user)
        })?;

        info!(user_id, admin = admin_address, active = user.is_active, "User status changed");
        Ok(user)
    }

    pub fn apply_for_merchant(
        &self,
        address: &str,
        input: CreateMerchantApplication,
    ) -> Result<MerchantApplication> {
        require_address(address, "Wallet")?;
        input.validate()?;

        let app = self.backends.execute("apply for merchant", |b| {
            let open = b.list_applications(Some(address))?.into_iter().any(|a| {
                matches!(
                    a.status,
                    ApplicationStatus::Pending | ApplicationStatus::Approved
                )
            });
            if open {
                return Err(DomainError::ApplicationExists.into());
            }

            let app = MerchantApplication {
                id: gen_id(),
                user_address: address.to_string(),
                business_name: input.business_name.trim().to_string(),
                business_type: input.business_type.trim().to_string(),
                description: input.description.trim().to_string(),
                website: input.website.clone().filter(|w| !w.trim().is_empty()),
                contact_email: input.contact_email.trim().to_string(),
                status: ApplicationStatus::Pending,
                applied_at: now_ms(),
                reviewed_at: None,
                reviewed_by: None,
                rejection_reason: None,
            };
            b.insert_application(&app)?;
            Ok(app)
        })?;

        info!(application_id = %app.id, address, business = %app.business_name, "Merchant application submitted");
        Ok(app)
    }

    /// The user's most recent application, if any.
    pub fn get_user_application(&self, address: &str) -> Result<Option<MerchantApplication>> {
        self.backends.execute("get user application", |b| {
            Ok(b.list_applications(Some(address))?.into_iter().next())
        })
    }

    pub fn list_applications(&self) -> Result<Vec<MerchantApplication>> {
        self.backends
            .execute("list applications", |b| Ok(b.list_applications(None)?))
    }

    /// Decide a pending application. Approval promotes the applicant to
    /// merchant and creates their verified profile.
    pub fn review_application(
        &self,
        application_id: &str,
        admin_address: &str,
        review: ReviewApplication,
    ) -> Result<MerchantApplication> {
        require_address(admin_address, "Admin")?;
        let reason = review
            .rejection_reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if review.decision == ReviewDecision::Rejected && reason.is_none() {
            return Err(CouponError::validation("A rejection reason is required"));
        }
        let status = ApplicationStatus::from(review.decision);

        let app = self.backends.execute("review application", |b| {
            let app = b
                .get_application(application_id)?
                .ok_or(DomainError::NotFound("Application"))?;
            if app.status != ApplicationStatus::Pending {
                return Err(DomainError::AlreadyReviewed.into());
            }

            let now = now_ms();
            let decision = ApplicationReview {
                id: app.id.clone(),
                status,
                reviewed_at: now,
                reviewed_by: admin_address.to_string(),
                rejection_reason: match status {
                    ApplicationStatus::Rejected => reason.clone(),
                    _ => None,
                },
            };
            let promotion = match status {
                ApplicationStatus::Approved => {
                    let user = match b.get_user_by_address(&app.user_address)? {
                        Some(user) => user,
                        None => User::new(&app.user_address, None, Some(app.contact_email.clone())),
                    };
                    Some(MerchantPromotion {
                        user: User {
                            role: UserRole::Merchant,
                            ..user
                        },
                        profile: MerchantProfile {
                            address: app.user_address.clone(),
                            name: app.business_name.clone(),
                            description: app.description.clone(),
                            category: app.business_type.clone(),
                            website: app.website.clone(),
                            verified: true,
                            joined_at: now,
                        },
                    })
                }
                _ => None,
            };
            if !b.review_application(&decision, promotion.as_ref())? {
                return Err(DomainError::AlreadyReviewed.into());
            }

            Ok(MerchantApplication {
                status: decision.status,
                reviewed_at: Some(decision.reviewed_at),
                reviewed_by: Some(decision.reviewed_by),
                rejection_reason: decision.rejection_reason,
                ..app
            })
        })?;

        info!(
            application_id,
            admin = admin_address,
            status = ?app.status,
            "Merchant application reviewed"
        );
        Ok(app)
    }
}
