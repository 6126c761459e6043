//! Shared in-memory test doubles.
//!
//! Service tests run against real service implementations wired to
//! in-memory repositories, storage and attempt counters, so the behavior
//! under test is the real submission/approval/config logic without a
//! database or Redis.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use quality_credits::domain::{
    Claim, ClaimStatus, ClaimWithOwner, Class, ConfigCategory, ConfigEntry, Grade, Major, Notice,
    Proof, UpdateUser, User,
};
use quality_credits::errors::{AppError, AppResult};
use quality_credits::infra::{
    ClaimRepository, ConfigRepository, HistoryFilter, LoginAttempts, NoticeRepository,
    ProofRepository, StorageBackend, StructureRepository, UnitOfWork, UserRepository,
};
use quality_credits::services::Principal;

// =============================================================================
// Backing store
// =============================================================================

#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    pub configs: Vec<ConfigEntry>,
    pub claims: Vec<Claim>,
    pub proofs: Vec<Proof>,
    pub grades: Vec<Grade>,
    pub majors: Vec<Major>,
    pub classes: Vec<Class>,
    pub notices: Vec<Notice>,
}

/// In-memory UnitOfWork handing out repositories over one shared store.
#[derive(Clone, Default)]
pub struct TestUow {
    store: Arc<Mutex<Store>>,
}

impl TestUow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        f(&mut self.store.lock().unwrap())
    }

    pub fn add_user(&self, user: User) {
        self.with_store(|s| s.users.push(user));
    }

    pub fn add_claim(&self, claim: Claim) {
        self.with_store(|s| s.claims.push(claim));
    }

    pub fn add_proof(&self, proof: Proof) {
        self.with_store(|s| s.proofs.push(proof));
    }

    pub fn claim(&self, id: Uuid) -> Option<Claim> {
        self.with_store(|s| s.claims.iter().find(|c| c.id == id).cloned())
    }

    pub fn claim_count(&self) -> usize {
        self.with_store(|s| s.claims.len())
    }

    pub fn proof_count(&self) -> usize {
        self.with_store(|s| s.proofs.len())
    }
}

impl UnitOfWork for TestUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(MemUsers(self.store.clone()))
    }

    fn configs(&self) -> Arc<dyn ConfigRepository> {
        Arc::new(MemConfigs(self.store.clone()))
    }

    fn claims(&self) -> Arc<dyn ClaimRepository> {
        Arc::new(MemClaims(self.store.clone()))
    }

    fn proofs(&self) -> Arc<dyn ProofRepository> {
        Arc::new(MemProofs(self.store.clone()))
    }

    fn structure(&self) -> Arc<dyn StructureRepository> {
        Arc::new(MemStructure(self.store.clone()))
    }

    fn notices(&self) -> Arc<dyn NoticeRepository> {
        Arc::new(MemNotices(self.store.clone()))
    }
}

// =============================================================================
// Repository implementations
// =============================================================================

struct MemUsers(Arc<Mutex<Store>>);

#[async_trait]
impl UserRepository for MemUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.0.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.0.lock().unwrap().users.clone())
    }

    async fn list_by_class(&self, class: &str) -> AppResult<Vec<User>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| u.class.as_deref() == Some(class))
            .cloned()
            .collect())
    }

    async fn create(&self, user: User) -> AppResult<User> {
        self.0.lock().unwrap().users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let mut store = self.0.lock().unwrap();
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(class) = changes.class {
            user.class = Some(class);
        }
        if let Some(grade) = changes.grade {
            user.grade = Some(grade);
        }
        if let Some(major) = changes.major {
            user.major = Some(major);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut store = self.0.lock().unwrap();
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.password_hash = password_hash;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut store = self.0.lock().unwrap();
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        if store.users.len() == before {
            return Err(AppError::NotFound);
        }
        // FK cascade
        store.claims.retain(|c| c.user_id != id);
        Ok(())
    }

    async fn clear_class(&self, class: &str) -> AppResult<u64> {
        let mut store = self.0.lock().unwrap();
        let mut cleared = 0;
        for user in store.users.iter_mut() {
            if user.class.as_deref() == Some(class) {
                user.class = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn clear_grade(&self, grade: &str) -> AppResult<u64> {
        let mut store = self.0.lock().unwrap();
        let mut cleared = 0;
        for user in store.users.iter_mut() {
            if user.grade.as_deref() == Some(grade) {
                user.grade = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn clear_major(&self, major: &str) -> AppResult<u64> {
        let mut store = self.0.lock().unwrap();
        let mut cleared = 0;
        for user in store.users.iter_mut() {
            if user.major.as_deref() == Some(major) {
                user.major = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

struct MemConfigs(Arc<Mutex<Store>>);

#[async_trait]
impl ConfigRepository for MemConfigs {
    async fn list(&self, category: ConfigCategory) -> AppResult<Vec<ConfigEntry>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .configs
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect())
    }

    async fn get(&self, category: ConfigCategory, key: &str) -> AppResult<Option<ConfigEntry>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .configs
            .iter()
            .find(|e| e.category == category && e.key == key)
            .cloned())
    }

    async fn upsert(
        &self,
        category: ConfigCategory,
        key: &str,
        value: serde_json::Value,
    ) -> AppResult<ConfigEntry> {
        let mut store = self.0.lock().unwrap();
        let entry = ConfigEntry {
            category,
            key: key.to_string(),
            value,
            is_active: true,
        };

        match store
            .configs
            .iter_mut()
            .find(|e| e.category == category && e.key == key)
        {
            Some(existing) => *existing = entry.clone(),
            None => store.configs.push(entry.clone()),
        }

        Ok(entry)
    }

    async fn set_active(
        &self,
        category: ConfigCategory,
        key: &str,
        active: bool,
    ) -> AppResult<bool> {
        let mut store = self.0.lock().unwrap();
        match store
            .configs
            .iter_mut()
            .find(|e| e.category == category && e.key == key)
        {
            Some(entry) => {
                entry.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

struct MemClaims(Arc<Mutex<Store>>);

fn join_owner(store: &Store, claim: &Claim) -> ClaimWithOwner {
    let owner = store.users.iter().find(|u| u.id == claim.user_id);
    ClaimWithOwner {
        claim: claim.clone(),
        owner_username: owner.map(|u| u.username.clone()).unwrap_or_default(),
        owner_name: owner.map(|u| u.name.clone()).unwrap_or_default(),
        owner_class: owner.and_then(|u| u.class.clone()),
    }
}

#[async_trait]
impl ClaimRepository for MemClaims {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Claim>> {
        Ok(self.0.lock().unwrap().claims.iter().find(|c| c.id == id).cloned())
    }

    async fn find_with_owner(&self, id: Uuid) -> AppResult<Option<ClaimWithOwner>> {
        let store = self.0.lock().unwrap();
        Ok(store
            .claims
            .iter()
            .find(|c| c.id == id)
            .map(|c| join_owner(&store, c)))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Claim>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .claims
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_pending_with_owners(&self) -> AppResult<Vec<ClaimWithOwner>> {
        let store = self.0.lock().unwrap();
        Ok(store
            .claims
            .iter()
            .filter(|c| c.status == ClaimStatus::Pending)
            .map(|c| join_owner(&store, c))
            .collect())
    }

    async fn list_resolved_with_owners(
        &self,
        filter: HistoryFilter,
    ) -> AppResult<Vec<ClaimWithOwner>> {
        let store = self.0.lock().unwrap();
        Ok(store
            .claims
            .iter()
            .filter(|c| c.status != ClaimStatus::Pending)
            .map(|c| join_owner(&store, c))
            .filter(|item| {
                filter
                    .status
                    .map_or(true, |status| item.claim.status == status)
                    && filter
                        .credit_type
                        .as_deref()
                        .map_or(true, |t| item.claim.credit_type == t)
                    && filter.user_id.map_or(true, |id| item.claim.user_id == id)
                    && filter
                        .class
                        .as_deref()
                        .map_or(true, |class| item.owner_class.as_deref() == Some(class))
            })
            .collect())
    }

    async fn insert_with_proofs(&self, claim: Claim, proofs: Vec<Proof>) -> AppResult<Claim> {
        let mut store = self.0.lock().unwrap();
        store.claims.push(claim.clone());
        store.proofs.extend(proofs);
        Ok(claim)
    }

    async fn approve_pending(
        &self,
        id: Uuid,
        score: f64,
        approver_id: Uuid,
        approved_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut store = self.0.lock().unwrap();
        match store
            .claims
            .iter_mut()
            .find(|c| c.id == id && c.status == ClaimStatus::Pending)
        {
            Some(claim) => {
                claim.status = ClaimStatus::Approved;
                claim.score = Some(score);
                claim.approver_id = Some(approver_id);
                claim.approved_at = Some(approved_at);
                claim.reject_reason = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reject_pending(
        &self,
        id: Uuid,
        reason: String,
        approver_id: Uuid,
        rejected_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut store = self.0.lock().unwrap();
        match store
            .claims
            .iter_mut()
            .find(|c| c.id == id && c.status == ClaimStatus::Pending)
        {
            Some(claim) => {
                claim.status = ClaimStatus::Rejected;
                claim.score = None;
                claim.reject_reason = Some(reason);
                claim.approver_id = Some(approver_id);
                claim.approved_at = Some(rejected_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn correct_approved_score(&self, id: Uuid, score: f64) -> AppResult<bool> {
        let mut store = self.0.lock().unwrap();
        match store
            .claims
            .iter_mut()
            .find(|c| c.id == id && c.status == ClaimStatus::Approved)
        {
            Some(claim) => {
                claim.score = Some(score);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut store = self.0.lock().unwrap();
        let before = store.claims.len();
        store.claims.retain(|c| c.id != id);
        if store.claims.len() == before {
            return Err(AppError::NotFound);
        }
        store.proofs.retain(|p| p.credit_id != id);
        Ok(())
    }
}

struct MemProofs(Arc<Mutex<Store>>);

#[async_trait]
impl ProofRepository for MemProofs {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Proof>> {
        Ok(self.0.lock().unwrap().proofs.iter().find(|p| p.id == id).cloned())
    }

    async fn list_by_credit(&self, credit_id: Uuid) -> AppResult<Vec<Proof>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .proofs
            .iter()
            .filter(|p| p.credit_id == credit_id)
            .cloned()
            .collect())
    }

    async fn list_unmigrated(&self, limit: u64) -> AppResult<Vec<Proof>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .proofs
            .iter()
            .filter(|p| p.data.as_ref().is_some_and(|d| !d.is_empty()))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_migrated(&self, id: Uuid, storage_key: String) -> AppResult<()> {
        let mut store = self.0.lock().unwrap();
        let proof = store
            .proofs
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound)?;
        proof.storage_key = Some(storage_key);
        proof.data = Some(Vec::new());
        Ok(())
    }
}

struct MemStructure(Arc<Mutex<Store>>);

#[async_trait]
impl StructureRepository for MemStructure {
    async fn list_grades(&self) -> AppResult<Vec<Grade>> {
        Ok(self.0.lock().unwrap().grades.clone())
    }

    async fn create_grade(&self, name: String) -> AppResult<Grade> {
        let grade = Grade {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };
        self.0.lock().unwrap().grades.push(grade.clone());
        Ok(grade)
    }

    async fn delete_grade(&self, id: Uuid) -> AppResult<Grade> {
        let mut store = self.0.lock().unwrap();
        let pos = store
            .grades
            .iter()
            .position(|g| g.id == id)
            .ok_or(AppError::NotFound)?;
        Ok(store.grades.remove(pos))
    }

    async fn list_majors(&self) -> AppResult<Vec<Major>> {
        Ok(self.0.lock().unwrap().majors.clone())
    }

    async fn create_major(&self, name: String) -> AppResult<Major> {
        let major = Major {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };
        self.0.lock().unwrap().majors.push(major.clone());
        Ok(major)
    }

    async fn delete_major(&self, id: Uuid) -> AppResult<Major> {
        let mut store = self.0.lock().unwrap();
        let pos = store
            .majors
            .iter()
            .position(|m| m.id == id)
            .ok_or(AppError::NotFound)?;
        Ok(store.majors.remove(pos))
    }

    async fn list_classes(&self) -> AppResult<Vec<Class>> {
        Ok(self.0.lock().unwrap().classes.clone())
    }

    async fn find_class_by_name(&self, name: &str) -> AppResult<Option<Class>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .classes
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn create_class(&self, name: String, grade: String, major: String) -> AppResult<Class> {
        let class = Class {
            id: Uuid::new_v4(),
            name,
            grade,
            major,
            created_at: Utc::now(),
        };
        self.0.lock().unwrap().classes.push(class.clone());
        Ok(class)
    }

    async fn delete_class(&self, id: Uuid) -> AppResult<Class> {
        let mut store = self.0.lock().unwrap();
        let pos = store
            .classes
            .iter()
            .position(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        Ok(store.classes.remove(pos))
    }
}

struct MemNotices(Arc<Mutex<Store>>);

#[async_trait]
impl NoticeRepository for MemNotices {
    async fn list(&self) -> AppResult<Vec<Notice>> {
        Ok(self.0.lock().unwrap().notices.clone())
    }

    async fn create(&self, notice: Notice) -> AppResult<Notice> {
        self.0.lock().unwrap().notices.push(notice.clone());
        Ok(notice)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut store = self.0.lock().unwrap();
        let before = store.notices.len();
        store.notices.retain(|n| n.id != id);
        if store.notices.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// Storage and attempt-counter doubles
// =============================================================================

/// In-memory storage backend with failure injection.
#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<HashMap<String, Bytes>>,
    pub fail_puts: AtomicBool,
    pub fail_gets: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn insert(&self, key: &str, data: Bytes) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn put(&self, key: &str, content: Bytes) -> AppResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AppError::storage("injected put failure"));
        }
        self.objects.lock().unwrap().insert(key.to_string(), content);
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(AppError::storage("injected get failure"));
        }
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// In-memory login-attempt counter (no real clock; lockouts report the
/// full window).
#[derive(Default)]
pub struct MemoryAttempts {
    counts: Mutex<HashMap<String, u32>>,
}

impl MemoryAttempts {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoginAttempts for MemoryAttempts {
    async fn failures(&self, username: &str) -> AppResult<u32> {
        Ok(*self.counts.lock().unwrap().get(username).unwrap_or(&0))
    }

    async fn record_failure(&self, username: &str) -> AppResult<u32> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(username.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn reset(&self, username: &str) -> AppResult<()> {
        self.counts.lock().unwrap().remove(username);
        Ok(())
    }

    async fn lockout_remaining(&self, username: &str) -> AppResult<Option<u64>> {
        let count = *self.counts.lock().unwrap().get(username).unwrap_or(&0);
        if count >= quality_credits::config::MAX_LOGIN_FAILURES {
            Ok(Some(quality_credits::config::LOGIN_LOCKOUT_SECONDS))
        } else {
            Ok(None)
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn user_with_role(username: &str, role: &str, class: Option<&str>) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        name: format!("{} name", username),
        password_hash: "hashed".to_string(),
        role: role.to_string(),
        class: class.map(str::to_string),
        grade: Some("2023".to_string()),
        major: Some("CS".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn principal_for(user: &User) -> Principal {
    Principal {
        id: user.id,
        username: user.username.clone(),
        role: user.role.clone(),
        class: user.class.clone(),
    }
}

pub fn pending_claim(user: &User, credit_type: &str, fields: serde_json::Value) -> Claim {
    Claim {
        id: Uuid::new_v4(),
        user_id: user.id,
        credit_type: credit_type.to_string(),
        score: None,
        status: ClaimStatus::Pending,
        fields,
        reject_reason: None,
        approver_id: None,
        approved_at: None,
        created_at: Utc::now(),
    }
}

/// Seed the role/credit-type/field configs the scenarios rely on.
pub async fn seed_configs(uow: &TestUow) {
    let configs = uow.configs();

    let roles = [
        json!({
            "key": "admin", "label": "管理员", "permissions": ["*"]
        }),
        json!({
            "key": "student", "label": "学生",
            "permissions": ["credits.submit", "credits.view"]
        }),
        json!({
            "key": "monitor", "label": "班长",
            "permissions": ["credits.submit", "credits.view", "credits.approve",
                            "credits.reject", "credits.export"]
        }),
        json!({
            "key": "youth_league_secretary", "label": "团支书",
            "permissions": ["credits.view", "credits.approve", "credits.reject"]
        }),
        json!({
            "key": "auditor", "label": "稽核",
            "permissions": ["system.admin", "credits.view"]
        }),
    ];
    for role in roles {
        let key = role["key"].as_str().unwrap().to_string();
        configs
            .upsert(ConfigCategory::Roles, &key, role)
            .await
            .unwrap();
    }

    let fields = [
        json!({
            "key": "activityName", "label": "活动名称", "type": "text",
            "required": true, "description": ""
        }),
        json!({
            "key": "volunteerHours", "label": "志愿时长", "type": "number",
            "required": true, "description": ""
        }),
    ];
    for field in fields {
        let key = field["key"].as_str().unwrap().to_string();
        configs
            .upsert(ConfigCategory::Fields, &key, field)
            .await
            .unwrap();
    }

    let types = [
        json!({
            "key": "志愿活动", "label": "志愿活动",
            "fields": ["activityName", "volunteerHours"],
            "scoreCalculation": "time_based",
            "scorePerHour": 6.0,
            "approverRoles": ["monitor", "youth_league_secretary"]
        }),
        json!({
            "key": "competition", "label": "学科竞赛",
            "fields": ["activityName"],
            "scoreCalculation": "manual",
            "approverRoles": ["study_committee"]
        }),
        json!({
            "key": "certificate", "label": "技能证书",
            "fields": [],
            "scoreCalculation": "fixed",
            "defaultScore": 20.0
        }),
    ];
    for ty in types {
        let key = ty["key"].as_str().unwrap().to_string();
        configs
            .upsert(ConfigCategory::CreditTypes, &key, ty)
            .await
            .unwrap();
    }
}
