//! Seed command - default configuration and the initial admin account.
//!
//! Safe to re-run: config records are upserts and the admin account is
//! skipped when the username already exists.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::cli::args::SeedArgs;
use crate::config::{Config, ROLE_ADMIN, ROLE_CLASS_LEADER, ROLE_STUDENT};
use crate::domain::{ConfigCategory, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence, UnitOfWork};
use crate::services::{ConfigManager, ConfigService};

/// Execute the seed command
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let uow = Arc::new(Persistence::new(db.get_connection()));
    let configs = ConfigManager::new(uow.clone());

    seed_roles(&configs).await?;
    seed_statuses(&configs).await?;
    seed_fields(&configs).await?;
    seed_credit_types(&configs).await?;
    seed_admin(&uow, &args).await?;

    tracing::info!("seed completed");
    println!("Seed completed");
    Ok(())
}

async fn seed_roles(configs: &impl ConfigService) -> AppResult<()> {
    let roles = [
        json!({
            "key": ROLE_ADMIN,
            "label": "系统管理员",
            "description": "Full platform administration; barred from claim approval",
            "color": "#dc2626",
            "cardColor": "#fee2e2",
            "permissions": ["*"]
        }),
        json!({
            "key": ROLE_STUDENT,
            "label": "学生",
            "description": "Submits credit claims",
            "color": "#2563eb",
            "cardColor": "#dbeafe",
            "permissions": ["credits.submit", "credits.view"]
        }),
        json!({
            "key": ROLE_CLASS_LEADER,
            "label": "班长",
            "description": "Approves every credit type within the class",
            "color": "#16a34a",
            "cardColor": "#dcfce7",
            "permissions": [
                "credits.submit", "credits.view", "credits.approve",
                "credits.reject", "credits.export"
            ]
        }),
        json!({
            "key": "youth_league_secretary",
            "label": "团支书",
            "description": "Approves volunteer and activity claims within the class",
            "color": "#9333ea",
            "cardColor": "#f3e8ff",
            "permissions": ["credits.submit", "credits.view", "credits.approve", "credits.reject"]
        }),
        json!({
            "key": "study_committee",
            "label": "学习委员",
            "description": "Approves competition and certificate claims within the class",
            "color": "#ea580c",
            "cardColor": "#ffedd5",
            "permissions": ["credits.submit", "credits.view", "credits.approve", "credits.reject"]
        }),
    ];

    for role in roles {
        let key = role["key"].as_str().unwrap_or_default().to_string();
        configs.upsert(ConfigCategory::Roles, &key, role).await?;
    }
    Ok(())
}

async fn seed_statuses(configs: &impl ConfigService) -> AppResult<()> {
    let statuses = [
        json!({"key": "pending", "label": "待审核", "color": "#f59e0b"}),
        json!({"key": "approved", "label": "已通过", "color": "#16a34a"}),
        json!({"key": "rejected", "label": "已驳回", "color": "#dc2626"}),
    ];

    for status in statuses {
        let key = status["key"].as_str().unwrap_or_default().to_string();
        configs.upsert(ConfigCategory::Statuses, &key, status).await?;
    }
    Ok(())
}

async fn seed_fields(configs: &impl ConfigService) -> AppResult<()> {
    let fields = [
        json!({
            "key": "activityName",
            "label": "活动名称",
            "type": "text",
            "required": true,
            "description": "Name of the activity or event"
        }),
        json!({
            "key": "activityDate",
            "label": "活动日期",
            "type": "date",
            "required": true,
            "description": ""
        }),
        json!({
            "key": "volunteerHours",
            "label": "志愿时长",
            "type": "number",
            "required": true,
            "description": "Hours of volunteer work"
        }),
        json!({
            "key": "awardLevel",
            "label": "获奖等级",
            "type": "text",
            "required": false,
            "description": "Competition award level"
        }),
        json!({
            "key": "certificateName",
            "label": "证书名称",
            "type": "text",
            "required": true,
            "description": ""
        }),
    ];

    for field in fields {
        let key = field["key"].as_str().unwrap_or_default().to_string();
        configs.upsert(ConfigCategory::Fields, &key, field).await?;
    }
    Ok(())
}

async fn seed_credit_types(configs: &impl ConfigService) -> AppResult<()> {
    let types = [
        json!({
            "key": "volunteer",
            "label": "志愿活动",
            "description": "Volunteer work scored by hours",
            "color": "#16a34a",
            "cardColor": "#dcfce7",
            "fields": ["activityName", "activityDate", "volunteerHours"],
            "scoreCalculation": "time_based",
            "scorePerHour": 6.0,
            "approverRoles": [ROLE_CLASS_LEADER, "youth_league_secretary"]
        }),
        json!({
            "key": "competition",
            "label": "学科竞赛",
            "description": "Academic competitions, scored by the approver",
            "color": "#ea580c",
            "cardColor": "#ffedd5",
            "fields": ["activityName", "activityDate", "awardLevel"],
            "scoreCalculation": "manual",
            "approverRoles": [ROLE_CLASS_LEADER, "study_committee"]
        }),
        json!({
            "key": "certificate",
            "label": "技能证书",
            "description": "Professional certificates, fixed score",
            "color": "#2563eb",
            "cardColor": "#dbeafe",
            "fields": ["certificateName", "activityDate"],
            "scoreCalculation": "fixed",
            "defaultScore": 20.0,
            "approverRoles": [ROLE_CLASS_LEADER, "study_committee"]
        }),
        json!({
            "key": "activity",
            "label": "校园活动",
            "description": "Campus activities, fixed score",
            "color": "#9333ea",
            "cardColor": "#f3e8ff",
            "fields": ["activityName", "activityDate"],
            "scoreCalculation": "fixed",
            "defaultScore": 5.0
        }),
    ];

    for ty in types {
        let key = ty["key"].as_str().unwrap_or_default().to_string();
        configs.upsert(ConfigCategory::CreditTypes, &key, ty).await?;
    }
    Ok(())
}

async fn seed_admin(uow: &Arc<Persistence>, args: &SeedArgs) -> AppResult<()> {
    if uow
        .users()
        .find_by_username(&args.admin_username)
        .await?
        .is_some()
    {
        tracing::info!(username = %args.admin_username, "admin account already exists");
        return Ok(());
    }

    let now = Utc::now();
    uow.users()
        .create(User {
            id: Uuid::new_v4(),
            username: args.admin_username.clone(),
            name: "Administrator".to_string(),
            password_hash: Password::new(&args.admin_password)?.into_string(),
            role: ROLE_ADMIN.to_string(),
            class: None,
            grade: None,
            major: None,
            created_at: now,
            updated_at: now,
        })
        .await?;

    tracing::info!(username = %args.admin_username, "admin account created");
    Ok(())
}
