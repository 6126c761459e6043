//! Approval workflow tests against the real services over in-memory
//! infrastructure.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::*;
use quality_credits::domain::ClaimStatus;
use quality_credits::errors::AppError;
use quality_credits::services::{
    ApprovalManager, ApprovalService, AuthorizationEngine, ConfigManager, ConfigService,
};

struct Fixture {
    uow: TestUow,
    authz: Arc<AuthorizationEngine>,
    approvals: ApprovalManager<TestUow>,
}

async fn fixture() -> Fixture {
    let uow = TestUow::new();
    seed_configs(&uow).await;

    let uow_arc = Arc::new(uow.clone());
    let configs: Arc<dyn ConfigService> = Arc::new(ConfigManager::new(uow_arc.clone()));
    let authz = Arc::new(AuthorizationEngine::new(configs));
    let approvals = ApprovalManager::new(uow_arc, authz.clone());

    Fixture {
        uow,
        authz,
        approvals,
    }
}

fn volunteer_fields(hours: u32) -> serde_json::Value {
    json!({"activityName": "社区服务", "volunteerHours": hours})
}

#[tokio::test]
async fn test_approve_within_class_finalizes_score() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let monitor = user_with_role("20230001", "monitor", Some("3A"));
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(10));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(monitor.clone());
    fx.uow.add_claim(claim);

    let approved = fx
        .approvals
        .approve(&principal_for(&monitor), claim_id, 60.0)
        .await
        .unwrap();

    assert_eq!(approved.status, ClaimStatus::Approved);
    assert_eq!(approved.score, Some(60.0));
    assert_eq!(approved.approver_id, Some(monitor.id));
    assert!(approved.approved_at.is_some());
    assert!(approved.reject_reason.is_none());

    // The claim leaves the pending queue the moment it transitions
    let pending = fx.approvals.pending(&principal_for(&monitor)).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_cross_class_approval_is_forbidden() {
    let fx = fixture().await;

    let student = user_with_role("20230201", "student", Some("3B"));
    let monitor = user_with_role("20230001", "monitor", Some("3A"));
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(4));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(monitor.clone());
    fx.uow.add_claim(claim);

    let err = fx
        .approvals
        .approve(&principal_for(&monitor), claim_id, 24.0)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    // Claim state is unchanged
    assert_eq!(fx.uow.claim(claim_id).unwrap().status, ClaimStatus::Pending);
}

#[tokio::test]
async fn test_admin_is_barred_from_approving() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let admin = user_with_role("root", "admin", Some("3A"));
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(2));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(admin.clone());
    fx.uow.add_claim(claim);

    let err = fx
        .approvals
        .approve(&principal_for(&admin), claim_id, 12.0)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(fx.uow.claim(claim_id).unwrap().status, ClaimStatus::Pending);
}

#[tokio::test]
async fn test_role_without_capability_cannot_approve() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let peer = user_with_role("20230102", "student", Some("3A"));
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(2));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(peer.clone());
    fx.uow.add_claim(claim);

    assert!(!fx
        .authz
        .can("student", quality_credits::Capability::CreditsApprove)
        .await
        .unwrap());

    let err = fx
        .approvals
        .approve(&principal_for(&peer), claim_id, 10.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_reject_records_reason_and_keeps_score_null() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let monitor = user_with_role("20230001", "monitor", Some("3A"));
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(3));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(monitor.clone());
    fx.uow.add_claim(claim);

    let rejected = fx
        .approvals
        .reject(&principal_for(&monitor), claim_id, "材料不完整".to_string())
        .await
        .unwrap();

    assert_eq!(rejected.status, ClaimStatus::Rejected);
    assert_eq!(rejected.score, None);
    assert_eq!(rejected.reject_reason.as_deref(), Some("材料不完整"));
    assert_eq!(rejected.approver_id, Some(monitor.id));
}

#[tokio::test]
async fn test_reject_requires_a_reason() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let monitor = user_with_role("20230001", "monitor", Some("3A"));
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(3));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(monitor.clone());
    fx.uow.add_claim(claim);

    let err = fx
        .approvals
        .reject(&principal_for(&monitor), claim_id, "   ".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_approval_score_bounds() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let monitor = user_with_role("20230001", "monitor", Some("3A"));
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(3));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(monitor.clone());
    fx.uow.add_claim(claim);

    let principal = principal_for(&monitor);

    let err = fx.approvals.approve(&principal, claim_id, -1.0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = fx.approvals.approve(&principal, claim_id, 1000.5).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // The boundary itself is accepted
    let approved = fx.approvals.approve(&principal, claim_id, 1000.0).await.unwrap();
    assert_eq!(approved.score, Some(1000.0));
}

#[tokio::test]
async fn test_resolved_claims_cannot_transition_again() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let monitor = user_with_role("20230001", "monitor", Some("3A"));
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(5));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(monitor.clone());
    fx.uow.add_claim(claim);

    let principal = principal_for(&monitor);
    fx.approvals.approve(&principal, claim_id, 30.0).await.unwrap();

    let err = fx.approvals.approve(&principal, claim_id, 40.0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = fx
        .approvals
        .reject(&principal, claim_id, "too late".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Score untouched by the failed transitions
    assert_eq!(fx.uow.claim(claim_id).unwrap().score, Some(30.0));
}

#[tokio::test]
async fn test_correct_score_only_on_approved_claims() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let monitor = user_with_role("20230001", "monitor", Some("3A"));
    let admin = user_with_role("root", "admin", None);
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(5));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(monitor.clone());
    fx.uow.add_user(admin.clone());
    fx.uow.add_claim(claim);

    // Pending claims are not eligible
    let err = fx
        .approvals
        .correct_score(&principal_for(&admin), claim_id, 100.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    fx.approvals
        .approve(&principal_for(&monitor), claim_id, 30.0)
        .await
        .unwrap();

    // Correction allows the wider bound
    let corrected = fx
        .approvals
        .correct_score(&principal_for(&admin), claim_id, 2500.0)
        .await
        .unwrap();
    assert_eq!(corrected.score, Some(2500.0));
    assert_eq!(corrected.status, ClaimStatus::Approved);

    // But not beyond it
    let err = fx
        .approvals
        .correct_score(&principal_for(&admin), claim_id, 3000.5)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // And not by uncapable roles
    let err = fx
        .approvals
        .correct_score(&principal_for(&student), claim_id, 10.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_pending_queue_scoping() {
    let fx = fixture().await;

    let student_a = user_with_role("20230101", "student", Some("3A"));
    let student_b = user_with_role("20230201", "student", Some("3B"));
    let monitor_a = user_with_role("20230001", "monitor", Some("3A"));
    let secretary_a = user_with_role("20230002", "youth_league_secretary", Some("3A"));
    let auditor = user_with_role("90000001", "auditor", None);

    let volunteer_a = pending_claim(&student_a, "志愿活动", volunteer_fields(2));
    let competition_a = pending_claim(&student_a, "competition", json!({"activityName": "数学建模"}));
    let volunteer_b = pending_claim(&student_b, "志愿活动", volunteer_fields(8));

    fx.uow.add_user(student_a);
    fx.uow.add_user(student_b);
    fx.uow.add_user(monitor_a.clone());
    fx.uow.add_user(secretary_a.clone());
    fx.uow.add_user(auditor.clone());
    fx.uow.add_claim(volunteer_a.clone());
    fx.uow.add_claim(competition_a.clone());
    fx.uow.add_claim(volunteer_b.clone());

    // system.admin sees every claim regardless of class
    let all = fx.approvals.pending(&principal_for(&auditor)).await.unwrap();
    assert_eq!(all.len(), 3);

    // The class leader sees every type, but only inside its class
    let monitors = fx.approvals.pending(&principal_for(&monitor_a)).await.unwrap();
    let ids: Vec<_> = monitors.iter().map(|c| c.claim.id).collect();
    assert_eq!(monitors.len(), 2);
    assert!(ids.contains(&volunteer_a.id));
    assert!(ids.contains(&competition_a.id));

    // Other officers are filtered by the type's approver list
    let secretary_view = fx
        .approvals
        .pending(&principal_for(&secretary_a))
        .await
        .unwrap();
    assert_eq!(secretary_view.len(), 1);
    assert_eq!(secretary_view[0].claim.id, volunteer_a.id);
}

#[tokio::test]
async fn test_approver_without_class_is_rejected_explicitly() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let classless = user_with_role("20230001", "monitor", None);
    let claim = pending_claim(&student, "志愿活动", volunteer_fields(2));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(classless.clone());
    fx.uow.add_claim(claim);

    let err = fx.approvals.pending(&principal_for(&classless)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(Some(_))));

    let err = fx
        .approvals
        .approve(&principal_for(&classless), claim_id, 10.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(Some(_))));
}

#[tokio::test]
async fn test_type_restricted_officer_cannot_approve_other_types() {
    let fx = fixture().await;

    let student = user_with_role("20230101", "student", Some("3A"));
    let secretary = user_with_role("20230002", "youth_league_secretary", Some("3A"));
    let claim = pending_claim(&student, "competition", json!({"activityName": "数学建模"}));
    let claim_id = claim.id;
    fx.uow.add_user(student);
    fx.uow.add_user(secretary.clone());
    fx.uow.add_claim(claim);

    let err = fx
        .approvals
        .approve(&principal_for(&secretary), claim_id, 50.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_history_excludes_pending_and_scopes_by_class() {
    let fx = fixture().await;

    let student_a = user_with_role("20230101", "student", Some("3A"));
    let student_b = user_with_role("20230201", "student", Some("3B"));
    let monitor_a = user_with_role("20230001", "monitor", Some("3A"));

    let mut resolved_a = pending_claim(&student_a, "志愿活动", volunteer_fields(2));
    resolved_a.status = ClaimStatus::Approved;
    resolved_a.score = Some(12.0);
    let mut resolved_b = pending_claim(&student_b, "志愿活动", volunteer_fields(2));
    resolved_b.status = ClaimStatus::Rejected;
    resolved_b.reject_reason = Some("no".to_string());
    let still_pending = pending_claim(&student_a, "志愿活动", volunteer_fields(1));

    fx.uow.add_user(student_a);
    fx.uow.add_user(student_b);
    fx.uow.add_user(monitor_a.clone());
    fx.uow.add_claim(resolved_a.clone());
    fx.uow.add_claim(resolved_b);
    fx.uow.add_claim(still_pending);

    let history = fx
        .approvals
        .history(&principal_for(&monitor_a), Default::default())
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].claim.id, resolved_a.id);
}
