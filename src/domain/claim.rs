//! Credit claim domain entity and related types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claim lifecycle status.
///
/// `pending → approved` and `pending → rejected` are the only transitions;
/// both targets are terminal apart from the privileged score correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClaimStatus::Pending),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            other => Err(format!("unknown claim status: {}", other)),
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credit claim domain entity.
///
/// `score` is null while pending; `reject_reason` is set only when rejected;
/// approver and timestamp are recorded exactly once at resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Key into the credit-type config store
    pub credit_type: String,
    pub score: Option<f64>,
    pub status: ClaimStatus,
    /// Dynamic field values keyed by the type's declared field keys
    pub fields: serde_json::Value,
    pub reject_reason: Option<String>,
    pub approver_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Claim {
    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }

    pub fn is_approved(&self) -> bool {
        self.status == ClaimStatus::Approved
    }
}

/// A claim joined with the fields of its owner the approval workflow needs
/// for scoping and display.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimWithOwner {
    #[serde(flatten)]
    pub claim: Claim,
    pub owner_username: String,
    pub owner_name: String,
    pub owner_class: Option<String>,
}

/// Proof attachment, stored either inline (legacy rows) or behind a
/// storage key. After migration at least one of the two is populated.
#[derive(Debug, Clone)]
pub struct Proof {
    pub id: Uuid,
    pub credit_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub data: Option<Vec<u8>>,
    pub storage_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An uploaded proof file, validated but not yet persisted.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub filename: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Claim submission payload: type key plus the dynamic field values.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitClaim {
    #[schema(example = "volunteer")]
    pub credit_type: String,
    /// Values for the fields the credit type declares
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: serde_json::Value,
}

/// Claim response DTO.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub credit_type: String,
    pub score: Option<f64>,
    pub status: ClaimStatus,
    #[schema(value_type = Object)]
    pub fields: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub proofs: Vec<ProofSummary>,
}

/// Proof metadata returned with a claim (bytes are fetched separately).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProofSummary {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
}

impl From<&Proof> for ProofSummary {
    fn from(proof: &Proof) -> Self {
        Self {
            id: proof.id,
            filename: proof.filename.clone(),
            mime_type: proof.mime_type.clone(),
        }
    }
}

impl ClaimResponse {
    pub fn from_parts(claim: Claim, proofs: &[Proof]) -> Self {
        Self {
            id: claim.id,
            user_id: claim.user_id,
            credit_type: claim.credit_type,
            score: claim.score,
            status: claim.status,
            fields: claim.fields,
            reject_reason: claim.reject_reason,
            approver_id: claim.approver_id,
            approved_at: claim.approved_at,
            created_at: claim.created_at,
            proofs: proofs.iter().map(ProofSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [ClaimStatus::Pending, ClaimStatus::Approved, ClaimStatus::Rejected] {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<ClaimStatus>().is_err());
    }

    #[test]
    fn test_status_predicates() {
        let claim = Claim {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            credit_type: "volunteer".to_string(),
            score: None,
            status: ClaimStatus::Pending,
            fields: serde_json::json!({}),
            reject_reason: None,
            approver_id: None,
            approved_at: None,
            created_at: Utc::now(),
        };
        assert!(claim.is_pending());
        assert!(!claim.is_approved());
    }
}
