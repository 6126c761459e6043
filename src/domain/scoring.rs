//! Scoring rule evaluator.
//!
//! Pure function from (credit type config, claim field values) to a
//! suggested score. Advisory only: the approval workflow never applies the
//! suggestion automatically, a human supplies the final score.

use serde_json::Value;

use super::configs::{CreditTypeConfig, FieldConfig, FieldType, ScoreCalculation};
use crate::config::HOURS_FIELD_KEY;

/// Compute the suggested score for a claim.
///
/// - `fixed` types suggest their `default_score` (0 when unset)
/// - `time_based` types suggest hours × `score_per_hour`, rounded to two
///   decimal places; absent or non-positive hours suggest 0
/// - `manual` types suggest nothing
///
/// `resolved_fields` is the type's field list with registry keys already
/// resolved; it locates the hours field for time-based types.
pub fn suggest_score(
    ty: &CreditTypeConfig,
    resolved_fields: &[FieldConfig],
    claim_fields: &Value,
) -> Option<f64> {
    match ty.score_calculation {
        ScoreCalculation::Manual => None,
        ScoreCalculation::Fixed => Some(ty.default_score.unwrap_or(0.0)),
        ScoreCalculation::TimeBased => {
            let rate = ty.score_per_hour.unwrap_or(0.0);
            let hours = hours_value(resolved_fields, claim_fields).unwrap_or(0.0);
            if hours <= 0.0 || rate <= 0.0 {
                Some(0.0)
            } else {
                Some(round2(hours * rate))
            }
        }
    }
}

/// Extract the hours value from a claim's field blob: the type's first
/// declared number field wins, falling back to the conventional
/// `volunteerHours` key.
pub fn hours_value(resolved_fields: &[FieldConfig], claim_fields: &Value) -> Option<f64> {
    let number_key = resolved_fields
        .iter()
        .find(|f| f.field_type == FieldType::Number)
        .map(|f| f.key.as_str())
        .unwrap_or(HOURS_FIELD_KEY);

    claim_fields.get(number_key).and_then(numeric)
}

/// Accept both JSON numbers and numeric strings (legacy form payloads).
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
