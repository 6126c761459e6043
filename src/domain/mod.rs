//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns:
//! users, claims, configurable roles/credit types, capability sets
//! and the pure scoring evaluator.

pub mod capability;
pub mod claim;
pub mod configs;
pub mod notice;
pub mod password;
pub mod scoring;
pub mod structure;
pub mod user;

pub use capability::{Capability, CapabilitySet, UnknownCapability};
pub use claim::{
    Claim, ClaimResponse, ClaimStatus, ClaimWithOwner, Proof, ProofSummary, ProofUpload,
    SubmitClaim,
};
pub use configs::{
    ConfigCategory, ConfigEntry, CreditTypeConfig, FieldConfig, FieldRef, FieldType, RoleConfig,
    ScoreCalculation, StatusConfig,
};
pub use notice::{CreateNotice, Notice};
pub use password::Password;
pub use scoring::{hours_value, round2, suggest_score};
pub use structure::{Class, CreateClass, CreateNamed, Grade, Major};
pub use user::{CreateUser, ImportOutcome, ImportUserRow, UpdateUser, User, UserResponse};
