//! Claim submission tests: dynamic field validation, file checks, storage
//! writes and atomicity.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;

use common::*;
use quality_credits::domain::{ClaimStatus, ProofUpload, SubmitClaim};
use quality_credits::errors::AppError;
use quality_credits::services::{
    AuthorizationEngine, ClaimManager, ClaimService, ConfigManager, ConfigService,
};

struct Fixture {
    uow: TestUow,
    storage: Arc<MemoryStorage>,
    claims: ClaimManager<TestUow>,
}

async fn fixture() -> Fixture {
    let uow = TestUow::new();
    seed_configs(&uow).await;

    let uow_arc = Arc::new(uow.clone());
    let configs: Arc<dyn ConfigService> = Arc::new(ConfigManager::new(uow_arc.clone()));
    let authz = Arc::new(AuthorizationEngine::new(configs.clone()));
    let storage = Arc::new(MemoryStorage::new());
    let claims = ClaimManager::new(uow_arc, configs, authz, storage.clone());

    Fixture {
        uow,
        storage,
        claims,
    }
}

fn volunteer_submission(hours: u32) -> SubmitClaim {
    SubmitClaim {
        credit_type: "志愿活动".to_string(),
        fields: json!({"activityName": "社区服务", "volunteerHours": hours}),
    }
}

fn png_upload(name: &str) -> ProofUpload {
    ProofUpload {
        filename: name.to_string(),
        mime_type: "image/png".to_string(),
        data: Bytes::from_static(b"\x89PNG\r\n\x1a\nnot a real png"),
    }
}

#[tokio::test]
async fn test_submission_creates_pending_claim_with_stored_proofs() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());

    let response = fx
        .claims
        .submit(
            &principal_for(&student),
            volunteer_submission(10),
            vec![png_upload("photo.png")],
        )
        .await
        .unwrap();

    assert_eq!(response.status, ClaimStatus::Pending);
    assert_eq!(response.score, None);
    assert_eq!(response.fields["volunteerHours"], json!(10.0));
    assert_eq!(response.proofs.len(), 1);

    // Bytes landed in the backend, the row carries only the key
    assert_eq!(fx.storage.object_count(), 1);
    let stored = fx.uow.with_store(|s| s.proofs[0].clone());
    assert!(stored.storage_key.is_some());
    assert!(stored.data.is_none());
}

#[tokio::test]
async fn test_unknown_credit_type_is_rejected() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());

    let err = fx
        .claims
        .submit(
            &principal_for(&student),
            SubmitClaim {
                credit_type: "singing".to_string(),
                fields: json!({}),
            },
            vec![],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(msg) if msg.contains("singing")));
    assert_eq!(fx.uow.claim_count(), 0);
}

#[tokio::test]
async fn test_missing_required_field_names_the_field() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());

    let err = fx
        .claims
        .submit(
            &principal_for(&student),
            SubmitClaim {
                credit_type: "志愿活动".to_string(),
                fields: json!({"volunteerHours": 3}),
            },
            vec![],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(msg) if msg.contains("activityName")));
    assert_eq!(fx.uow.claim_count(), 0);
}

#[tokio::test]
async fn test_executable_proof_rejects_whole_submission() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());

    let err = fx
        .claims
        .submit(
            &principal_for(&student),
            volunteer_submission(10),
            vec![
                png_upload("photo.png"),
                ProofUpload {
                    filename: "malware.exe".to_string(),
                    mime_type: "application/x-msdownload".to_string(),
                    data: Bytes::from_static(b"MZ"),
                },
            ],
        )
        .await
        .unwrap_err();

    // The error names the offending file and nothing was persisted anywhere
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("malware.exe")));
    assert_eq!(fx.uow.claim_count(), 0);
    assert_eq!(fx.uow.proof_count(), 0);
    assert_eq!(fx.storage.object_count(), 0);
}

#[tokio::test]
async fn test_storage_write_failure_persists_no_rows() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());
    fx.storage.fail_puts.store(true, Ordering::SeqCst);

    let err = fx
        .claims
        .submit(
            &principal_for(&student),
            volunteer_submission(5),
            vec![png_upload("photo.png")],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Storage(_)));
    assert_eq!(fx.uow.claim_count(), 0);
    assert_eq!(fx.uow.proof_count(), 0);
}

#[tokio::test]
async fn test_role_without_submit_capability_is_forbidden() {
    let fx = fixture().await;
    let auditor = user_with_role("90000001", "auditor", None);
    fx.uow.add_user(auditor.clone());

    let err = fx
        .claims
        .submit(&principal_for(&auditor), volunteer_submission(1), vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_suggested_score_for_time_based_type() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());

    let response = fx
        .claims
        .submit(&principal_for(&student), volunteer_submission(10), vec![])
        .await
        .unwrap();

    let suggested = fx
        .claims
        .suggested_score(&principal_for(&student), response.id)
        .await
        .unwrap();
    assert_eq!(suggested, Some(60.0));
}

#[tokio::test]
async fn test_suggested_score_is_none_for_manual_types() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());

    let response = fx
        .claims
        .submit(
            &principal_for(&student),
            SubmitClaim {
                credit_type: "competition".to_string(),
                fields: json!({"activityName": "数学建模"}),
            },
            vec![],
        )
        .await
        .unwrap();

    let suggested = fx
        .claims
        .suggested_score(&principal_for(&student), response.id)
        .await
        .unwrap();
    assert_eq!(suggested, None);
}

#[tokio::test]
async fn test_proof_read_prefers_backend_then_falls_back_to_inline() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());

    let claim = pending_claim(&student, "志愿活动", json!({}));
    let claim_id = claim.id;
    fx.uow.add_claim(claim);

    // Legacy row: inline bytes plus a storage key the backend cannot serve
    let proof_id = uuid::Uuid::new_v4();
    fx.uow.add_proof(quality_credits::domain::Proof {
        id: proof_id,
        credit_id: claim_id,
        filename: "legacy.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        data: Some(b"inline bytes".to_vec()),
        storage_key: Some("missing-key.jpg".to_string()),
        created_at: chrono::Utc::now(),
    });

    let (filename, mime, bytes) = fx
        .claims
        .proof_bytes(&principal_for(&student), proof_id)
        .await
        .unwrap();
    assert_eq!(filename, "legacy.jpg");
    assert_eq!(mime, "image/jpeg");
    assert_eq!(bytes.as_ref(), b"inline bytes");

    // When the backend has the object it wins over the inline copy
    fx.storage.insert("missing-key.jpg", Bytes::from_static(b"backend bytes"));
    let (_, _, bytes) = fx
        .claims
        .proof_bytes(&principal_for(&student), proof_id)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), b"backend bytes");
}

#[tokio::test]
async fn test_proof_with_no_content_reports_unavailable() {
    let fx = fixture().await;
    let student = user_with_role("20230101", "student", Some("3A"));
    fx.uow.add_user(student.clone());

    let claim = pending_claim(&student, "志愿活动", json!({}));
    let claim_id = claim.id;
    fx.uow.add_claim(claim);

    let proof_id = uuid::Uuid::new_v4();
    fx.uow.add_proof(quality_credits::domain::Proof {
        id: proof_id,
        credit_id: claim_id,
        filename: "gone.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        data: Some(Vec::new()),
        storage_key: Some("never-uploaded.pdf".to_string()),
        created_at: chrono::Utc::now(),
    });

    let err = fx
        .claims
        .proof_bytes(&principal_for(&student), proof_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
}

#[tokio::test]
async fn test_students_cannot_read_other_classes_claims() {
    let fx = fixture().await;
    let student_a = user_with_role("20230101", "student", Some("3A"));
    let student_b = user_with_role("20230201", "student", Some("3B"));
    fx.uow.add_user(student_a.clone());
    fx.uow.add_user(student_b.clone());

    let claim = pending_claim(&student_a, "志愿活动", json!({}));
    let claim_id = claim.id;
    fx.uow.add_claim(claim);

    // Owner reads fine
    assert!(fx.claims.get(&principal_for(&student_a), claim_id).await.is_ok());

    // A student from another class holds credits.view but fails the class check
    let err = fx
        .claims
        .get(&principal_for(&student_b), claim_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}
