//! Credit claim service - submission, reading and deletion.
//!
//! Submission validates the dynamic field schema of the declared credit
//! type, checks every proof file against the MIME allow-list and size
//! ceiling, stores the (possibly recompressed) bytes behind the configured
//! storage backend, and persists the claim with all its proof rows in one
//! transaction. Any failure rejects the whole submission; there are no
//! partial writes.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::authorization::{AuthorizationEngine, Principal};
use super::config_service::ConfigService;
use crate::config::{
    ALLOWED_PROOF_MIME_TYPES, MAX_PROOF_FILE_BYTES, MAX_TEXT_FIELD_LENGTH, MIN_TEXT_FIELD_LENGTH,
};
use crate::domain::{
    scoring, Capability, Claim, ClaimResponse, ClaimStatus, CreditTypeConfig, FieldConfig,
    FieldType, Proof, ProofUpload, SubmitClaim,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{compress_image, proof_key, StorageBackend, UnitOfWork};

/// Claim service trait for dependency injection.
#[async_trait]
pub trait ClaimService: Send + Sync {
    /// Validate and persist a new claim with its proof files
    async fn submit(
        &self,
        principal: &Principal,
        payload: SubmitClaim,
        files: Vec<ProofUpload>,
    ) -> AppResult<ClaimResponse>;

    /// The caller's own claims, newest first
    async fn my_claims(&self, principal: &Principal) -> AppResult<Vec<ClaimResponse>>;

    /// One claim, visibility-checked
    async fn get(&self, principal: &Principal, claim_id: Uuid) -> AppResult<ClaimResponse>;

    /// Advisory suggested score for a claim, from its type's scoring rule
    async fn suggested_score(
        &self,
        principal: &Principal,
        claim_id: Uuid,
    ) -> AppResult<Option<f64>>;

    /// Proof bytes, preferring the storage backend and falling back to
    /// legacy inline bytes
    async fn proof_bytes(&self, principal: &Principal, proof_id: Uuid)
        -> AppResult<(String, String, Bytes)>;

    /// Hard-delete a claim and its proofs (approver/admin only, no recovery)
    async fn delete(&self, principal: &Principal, claim_id: Uuid) -> AppResult<()>;
}

/// Validate one submitted value against its field declaration, returning
/// the value to store. Errors name the offending field.
fn validate_field_value(
    field: &FieldConfig,
    value: Option<&serde_json::Value>,
) -> AppResult<Option<serde_json::Value>> {
    let missing = || {
        AppError::validation(format!("field '{}' is required", field.key))
    };

    let value = match value {
        Some(v) if !v.is_null() => v,
        _ => {
            // File fields are evidenced by the uploaded proofs, not the blob
            if field.required && field.field_type != FieldType::File {
                return Err(missing());
            }
            return Ok(None);
        }
    };

    match field.field_type {
        FieldType::Text => {
            let text = value.as_str().map(str::trim).unwrap_or_default();
            if text.is_empty() {
                if field.required {
                    return Err(missing());
                }
                return Ok(None);
            }
            if text.len() < MIN_TEXT_FIELD_LENGTH || text.len() > MAX_TEXT_FIELD_LENGTH {
                return Err(AppError::validation(format!(
                    "field '{}' must be {}-{} characters",
                    field.key, MIN_TEXT_FIELD_LENGTH, MAX_TEXT_FIELD_LENGTH
                )));
            }
            Ok(Some(serde_json::Value::String(text.to_string())))
        }
        FieldType::Number => {
            let parsed = match value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match parsed {
                Some(n) => Ok(Some(serde_json::json!(n))),
                None => Err(AppError::validation(format!(
                    "field '{}' must be a number",
                    field.key
                ))),
            }
        }
        FieldType::Date => {
            let text = value.as_str().unwrap_or_default();
            match chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                Ok(_) => Ok(Some(serde_json::Value::String(text.to_string()))),
                Err(_) => Err(AppError::validation(format!(
                    "field '{}' must be a date (YYYY-MM-DD)",
                    field.key
                ))),
            }
        }
        // File fields may carry a caption string; stored verbatim
        FieldType::File => Ok(Some(value.clone())),
    }
}

/// Check one proof upload against the allow-list and size ceiling.
fn validate_upload(upload: &ProofUpload) -> AppResult<()> {
    if !ALLOWED_PROOF_MIME_TYPES.contains(&upload.mime_type.as_str()) {
        return Err(AppError::validation(format!(
            "file '{}' has unsupported type '{}' (allowed: JPEG, PNG, GIF, PDF)",
            upload.filename, upload.mime_type
        )));
    }

    if upload.data.len() > MAX_PROOF_FILE_BYTES {
        return Err(AppError::validation(format!(
            "file '{}' exceeds the {} MB size limit",
            upload.filename,
            MAX_PROOF_FILE_BYTES / (1024 * 1024)
        )));
    }

    Ok(())
}

/// Assemble the claim's stored field blob from the resolved schema.
fn build_field_blob(
    resolved: &[FieldConfig],
    submitted: &serde_json::Value,
) -> AppResult<serde_json::Value> {
    let mut blob = serde_json::Map::new();

    for field in resolved {
        if let Some(value) = validate_field_value(field, submitted.get(&field.key))? {
            blob.insert(field.key.clone(), value);
        }
    }

    Ok(serde_json::Value::Object(blob))
}

/// Concrete implementation of ClaimService.
pub struct ClaimManager<U: UnitOfWork> {
    uow: Arc<U>,
    configs: Arc<dyn ConfigService>,
    authz: Arc<AuthorizationEngine>,
    storage: Arc<dyn StorageBackend>,
}

impl<U: UnitOfWork> ClaimManager<U> {
    pub fn new(
        uow: Arc<U>,
        configs: Arc<dyn ConfigService>,
        authz: Arc<AuthorizationEngine>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            uow,
            configs,
            authz,
            storage,
        }
    }

    async fn claim_response(&self, claim: Claim) -> AppResult<ClaimResponse> {
        let proofs = self.uow.proofs().list_by_credit(claim.id).await?;
        Ok(ClaimResponse::from_parts(claim, &proofs))
    }

    async fn type_with_fields(
        &self,
        key: &str,
    ) -> AppResult<(CreditTypeConfig, Vec<FieldConfig>)> {
        let ty = self
            .configs
            .credit_type(key)
            .await?
            .ok_or_else(|| AppError::validation(format!("unknown credit type: {}", key)))?;
        let resolved = self.configs.resolve_fields(&ty).await?;
        Ok((ty, resolved))
    }
}

#[async_trait]
impl<U: UnitOfWork> ClaimService for ClaimManager<U> {
    async fn submit(
        &self,
        principal: &Principal,
        payload: SubmitClaim,
        files: Vec<ProofUpload>,
    ) -> AppResult<ClaimResponse> {
        self.authz.require(principal, Capability::CreditsSubmit).await?;

        let (_ty, resolved) = self.type_with_fields(&payload.credit_type).await?;
        let blob = build_field_blob(&resolved, &payload.fields)?;

        // Validate every file before any byte is stored; a single bad file
        // rejects the whole submission
        for upload in &files {
            validate_upload(upload)?;
        }

        let claim_id = Uuid::new_v4();
        let now = Utc::now();

        let mut proof_rows = Vec::with_capacity(files.len());
        for upload in files {
            let data = compress_image(&upload.data, &upload.mime_type);
            let key = proof_key(&upload.filename);
            // A storage failure fails the submission before any row exists
            self.storage.put(&key, data).await?;

            proof_rows.push(Proof {
                id: Uuid::new_v4(),
                credit_id: claim_id,
                filename: upload.filename,
                mime_type: upload.mime_type,
                data: None,
                storage_key: Some(key),
                created_at: now,
            });
        }

        let claim = Claim {
            id: claim_id,
            user_id: principal.id,
            credit_type: payload.credit_type,
            score: None,
            status: ClaimStatus::Pending,
            fields: blob,
            reject_reason: None,
            approver_id: None,
            approved_at: None,
            created_at: now,
        };

        let inserted = self.uow.claims().insert_with_proofs(claim, proof_rows).await?;

        tracing::info!(
            claim = %inserted.id,
            user = %principal.username,
            credit_type = %inserted.credit_type,
            "claim submitted"
        );

        self.claim_response(inserted).await
    }

    async fn my_claims(&self, principal: &Principal) -> AppResult<Vec<ClaimResponse>> {
        let claims = self.uow.claims().list_by_user(principal.id).await?;

        let mut responses = Vec::with_capacity(claims.len());
        for claim in claims {
            responses.push(self.claim_response(claim).await?);
        }
        Ok(responses)
    }

    async fn get(&self, principal: &Principal, claim_id: Uuid) -> AppResult<ClaimResponse> {
        let item = self
            .uow
            .claims()
            .find_with_owner(claim_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let visible = self
            .authz
            .can_view_claim(principal, item.claim.user_id, item.owner_class.as_deref())
            .await?;
        if !visible {
            return Err(AppError::Forbidden(None));
        }

        self.claim_response(item.claim).await
    }

    async fn suggested_score(
        &self,
        principal: &Principal,
        claim_id: Uuid,
    ) -> AppResult<Option<f64>> {
        let item = self
            .uow
            .claims()
            .find_with_owner(claim_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let visible = self
            .authz
            .can_view_claim(principal, item.claim.user_id, item.owner_class.as_deref())
            .await?;
        if !visible {
            return Err(AppError::Forbidden(None));
        }

        let (ty, resolved) = self.type_with_fields(&item.claim.credit_type).await?;
        Ok(scoring::suggest_score(&ty, &resolved, &item.claim.fields))
    }

    async fn proof_bytes(
        &self,
        principal: &Principal,
        proof_id: Uuid,
    ) -> AppResult<(String, String, Bytes)> {
        let proof = self
            .uow
            .proofs()
            .find_by_id(proof_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let item = self
            .uow
            .claims()
            .find_with_owner(proof.credit_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let visible = self
            .authz
            .can_view_claim(principal, item.claim.user_id, item.owner_class.as_deref())
            .await?;
        if !visible {
            return Err(AppError::Forbidden(None));
        }

        // Prefer the storage key; recover locally from inline bytes when the
        // backend cannot serve the object
        if let Some(key) = &proof.storage_key {
            match self.storage.get(key).await {
                Ok(bytes) => return Ok((proof.filename, proof.mime_type, bytes)),
                Err(e) => {
                    tracing::warn!(
                        proof = %proof.id,
                        key = %key,
                        error = %e,
                        "storage backend read failed, trying inline bytes"
                    );
                }
            }
        }

        match proof.data {
            Some(data) if !data.is_empty() => {
                Ok((proof.filename, proof.mime_type, Bytes::from(data)))
            }
            _ => Err(AppError::storage(format!(
                "proof {} has no retrievable content",
                proof.id
            ))),
        }
    }

    async fn delete(&self, principal: &Principal, claim_id: Uuid) -> AppResult<()> {
        let item = self
            .uow
            .claims()
            .find_with_owner(claim_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // Approvers may purge claims within their class; super users anywhere
        if !self.authz.is_super_user(&principal.role).await? {
            self.authz.require(principal, Capability::CreditsApprove).await?;
            let same_class = matches!(
                (&principal.class, &item.owner_class),
                (Some(own), Some(theirs)) if own == theirs
            );
            if !same_class {
                return Err(AppError::Forbidden(None));
            }
        }

        // Best-effort blob cleanup; rows are the source of truth
        let proofs = self.uow.proofs().list_by_credit(claim_id).await?;
        for proof in proofs {
            if let Some(key) = proof.storage_key {
                if let Err(e) = self.storage.delete(&key).await {
                    tracing::warn!(key = %key, error = %e, "failed to delete proof blob");
                }
            }
        }

        self.uow.claims().delete(claim_id).await?;

        tracing::info!(claim = %claim_id, by = %principal.username, "claim deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_field(key: &str, required: bool) -> FieldConfig {
        FieldConfig {
            key: key.into(),
            label: key.into(),
            field_type: FieldType::Text,
            required,
            description: String::new(),
        }
    }

    fn number_field(key: &str) -> FieldConfig {
        FieldConfig {
            key: key.into(),
            label: key.into(),
            field_type: FieldType::Number,
            required: true,
            description: String::new(),
        }
    }

    #[test]
    fn test_required_text_field_missing() {
        let fields = [text_field("activityName", true)];
        let err = build_field_blob(&fields, &json!({})).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("activityName")));
    }

    #[test]
    fn test_text_field_length_bounds() {
        let fields = [text_field("activityName", true)];
        assert!(build_field_blob(&fields, &json!({"activityName": "x"})).is_err());
        assert!(build_field_blob(&fields, &json!({"activityName": "x".repeat(101)})).is_err());
        let blob = build_field_blob(&fields, &json!({"activityName": "校园马拉松"})).unwrap();
        assert_eq!(blob["activityName"], "校园马拉松");
    }

    #[test]
    fn test_number_field_accepts_strings_and_numbers() {
        let fields = [number_field("volunteerHours")];
        let blob = build_field_blob(&fields, &json!({"volunteerHours": "7.5"})).unwrap();
        assert_eq!(blob["volunteerHours"], json!(7.5));

        assert!(build_field_blob(&fields, &json!({"volunteerHours": "lots"})).is_err());
    }

    #[test]
    fn test_undeclared_fields_are_dropped() {
        let fields = [text_field("activityName", false)];
        let blob =
            build_field_blob(&fields, &json!({"activityName": "合唱比赛", "extra": "ignored"}))
                .unwrap();
        assert!(blob.get("extra").is_none());
    }

    #[test]
    fn test_upload_mime_allow_list() {
        let bad = ProofUpload {
            filename: "malware.exe".into(),
            mime_type: "application/x-msdownload".into(),
            data: Bytes::from_static(b"MZ"),
        };
        let err = validate_upload(&bad).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("malware.exe")));

        let ok = ProofUpload {
            filename: "receipt.pdf".into(),
            mime_type: "application/pdf".into(),
            data: Bytes::from_static(b"%PDF"),
        };
        assert!(validate_upload(&ok).is_ok());
    }

    #[test]
    fn test_upload_size_ceiling() {
        let big = ProofUpload {
            filename: "huge.png".into(),
            mime_type: "image/png".into(),
            data: Bytes::from(vec![0u8; MAX_PROOF_FILE_BYTES + 1]),
        };
        let err = validate_upload(&big).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("huge.png")));
    }
}
