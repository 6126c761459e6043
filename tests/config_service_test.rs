//! Config store tests: round-trip fidelity, soft-delete idempotence,
//! protected keys and permission resolution.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::*;
use quality_credits::domain::{Capability, ConfigCategory, CreditTypeConfig};
use quality_credits::errors::AppError;
use quality_credits::services::{
    AuthorizationEngine, ConfigManager, ConfigService,
};

struct Fixture {
    configs: ConfigManager<TestUow>,
    authz: AuthorizationEngine,
}

async fn fixture() -> Fixture {
    let uow = TestUow::new();
    seed_configs(&uow).await;

    let uow_arc = Arc::new(uow);
    let configs = ConfigManager::new(uow_arc.clone());
    let service: Arc<dyn ConfigService> = Arc::new(ConfigManager::new(uow_arc));
    let authz = AuthorizationEngine::new(service);

    Fixture { configs, authz }
}

#[tokio::test]
async fn test_credit_type_round_trips_through_the_store() {
    let fx = fixture().await;

    let value = json!({
        "key": "innovation",
        "label": "创新创业",
        "description": "Innovation projects",
        "color": "#0ea5e9",
        "cardColor": "#e0f2fe",
        "fields": [
            "activityName",
            {"key": "projectHours", "label": "项目时长", "type": "number",
             "required": false, "description": "hours spent"}
        ],
        "scoreCalculation": "time_based",
        "scorePerHour": 2.5,
        "approverRoles": ["monitor"]
    });

    fx.configs
        .upsert(ConfigCategory::CreditTypes, "innovation", value.clone())
        .await
        .unwrap();

    let entries = fx.configs.list(ConfigCategory::CreditTypes).await.unwrap();
    let stored = entries.iter().find(|e| e.key == "innovation").unwrap();

    // Deep equality through the typed form for every field
    let expected: CreditTypeConfig = serde_json::from_value(value).unwrap();
    let actual: CreditTypeConfig = serde_json::from_value(stored.value.clone()).unwrap();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_soft_delete_is_idempotent_and_keeps_the_row() {
    let fx = fixture().await;

    fx.configs
        .soft_delete(ConfigCategory::CreditTypes, "certificate")
        .await
        .unwrap();

    // Second delete leaves the same final state
    fx.configs
        .soft_delete(ConfigCategory::CreditTypes, "certificate")
        .await
        .unwrap();

    // Inactive rows vanish from the active view
    let active = fx.configs.list_active(ConfigCategory::CreditTypes).await.unwrap();
    assert!(active.iter().all(|e| e.key != "certificate"));
    assert!(fx.configs.credit_type("certificate").await.unwrap().is_none());

    // But stay resolvable for historical display
    let all = fx.configs.list(ConfigCategory::CreditTypes).await.unwrap();
    let row = all.iter().find(|e| e.key == "certificate").unwrap();
    assert!(!row.is_active);
    let label = fx
        .configs
        .label_for(ConfigCategory::CreditTypes, "certificate")
        .await
        .unwrap();
    assert_eq!(label, "技能证书");
}

#[tokio::test]
async fn test_missing_config_labels_fall_back_to_the_raw_key() {
    let fx = fixture().await;

    let label = fx
        .configs
        .label_for(ConfigCategory::CreditTypes, "long-gone-type")
        .await
        .unwrap();
    assert_eq!(label, "long-gone-type");
}

#[tokio::test]
async fn test_protected_role_keys_cannot_be_deleted() {
    let fx = fixture().await;

    for key in ["admin", "student"] {
        let err = fx
            .configs
            .soft_delete(ConfigCategory::Roles, key)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    // Non-protected roles delete fine
    fx.configs
        .soft_delete(ConfigCategory::Roles, "youth_league_secretary")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upsert_rejects_key_mismatch() {
    let fx = fixture().await;

    let err = fx
        .configs
        .upsert(
            ConfigCategory::Roles,
            "monitor",
            json!({"key": "impostor", "label": "x", "permissions": []}),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_upsert_enforces_time_based_invariant() {
    let fx = fixture().await;

    let err = fx
        .configs
        .upsert(
            ConfigCategory::CreditTypes,
            "broken",
            json!({
                "key": "broken", "label": "x",
                "scoreCalculation": "time_based"
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_upsert_reactivates_a_soft_deleted_key() {
    let fx = fixture().await;

    fx.configs
        .soft_delete(ConfigCategory::CreditTypes, "certificate")
        .await
        .unwrap();

    fx.configs
        .upsert(
            ConfigCategory::CreditTypes,
            "certificate",
            json!({
                "key": "certificate", "label": "技能证书",
                "scoreCalculation": "fixed", "defaultScore": 25.0
            }),
        )
        .await
        .unwrap();

    let ty = fx.configs.credit_type("certificate").await.unwrap().unwrap();
    assert_eq!(ty.default_score, Some(25.0));
}

#[tokio::test]
async fn test_unconfigured_role_resolves_to_no_permissions() {
    let fx = fixture().await;

    let caps = fx.authz.resolve_permissions("ghost-role").await.unwrap();
    assert!(caps.is_empty());
    assert!(!fx.authz.can("ghost-role", Capability::CreditsView).await.unwrap());
}

#[tokio::test]
async fn test_wildcard_and_admin_role_are_both_super_users() {
    let fx = fixture().await;

    // The hardcoded role key
    assert!(fx.authz.is_super_user("admin").await.unwrap());
    // A role whose config carries the wildcard would match too; monitor's
    // does not
    assert!(!fx.authz.is_super_user("monitor").await.unwrap());
}

#[tokio::test]
async fn test_unknown_capability_strings_grant_nothing() {
    let fx = fixture().await;

    fx.configs
        .upsert(
            ConfigCategory::Roles,
            "experimental",
            json!({
                "key": "experimental", "label": "试验角色",
                "permissions": ["credits.telepathy", "credits.view"]
            }),
        )
        .await
        .unwrap();

    let caps = fx.authz.resolve_permissions("experimental").await.unwrap();
    assert_eq!(caps.len(), 1);
    assert!(caps.contains(Capability::CreditsView));
}
