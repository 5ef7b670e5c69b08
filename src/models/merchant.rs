use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::User;
use crate::error::{CouponError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantProfile {
    pub address: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub website: Option<String>,
    pub verified: bool,
    pub joined_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantApplication {
    pub id: String,
    pub user_address: String,
    pub business_name: String,
    pub business_type: String,
    pub description: String,
    pub website: Option<String>,
    pub contact_email: String,
    pub status: ApplicationStatus,
    pub applied_at: i64,
    pub reviewed_at: Option<i64>,
    pub reviewed_by: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMerchantApplication {
    pub business_name: String,
    pub business_type: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    pub contact_email: String,
}

impl CreateMerchantApplication {
    pub fn validate(&self) -> Result<()> {
        if self.business_name.trim().is_empty() {
            return Err(CouponError::validation("Business name is required"));
        }
        if self.business_type.trim().is_empty() {
            return Err(CouponError::validation("Business type is required"));
        }
        if self.description.trim().is_empty() {
            return Err(CouponError::validation("Description is required"));
        }
        let email = self.contact_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(CouponError::validation("A valid contact email is required"));
        }
        Ok(())
    }
}

/// Outcome an admin can give a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ApplicationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => ApplicationStatus::Approved,
            ReviewDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewApplication {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// A review decision ready to be written to a pending application.
#[derive(Debug, Clone)]
pub struct ApplicationReview {
    pub id: String,
    pub status: ApplicationStatus,
    pub reviewed_at: i64,
    pub reviewed_by: String,
    pub rejection_reason: Option<String>,
}

/// Writes that accompany an approval: the applicant's merchant role and
/// their verified profile.
#[derive(Debug, Clone)]
pub struct MerchantPromotion {
    pub user: User,
    pub profile: MerchantProfile,
}
