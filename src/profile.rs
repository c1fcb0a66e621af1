//! Profile Matching: rank alternatives by closeness to an ideal profile.
//!
//! Every sub-criterion of an alternative gets a GAP weight in [1, 5]:
//! numeric candidates against a numeric ideal go through the integer gap
//! table, numeric candidates against an ideal range are interpolated, and
//! categorical candidates score 5 on membership and 1 otherwise. GAP weights
//! roll up into criterion scores via the sub-criteria weights, then into one
//! final score via the criteria weights, and alternatives are ranked by
//! final score descending.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A candidate's value for one sub-criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v} (number)"),
            Value::Text(s) => write!(f, "'{s}' (text)"),
        }
    }
}

/// The ideal profile for one sub-criterion.
///
/// Untagged, so JSON shapes map directly: `4` is a single numeric ideal,
/// `[2.0, 8.0]` a closed range, `"Good"` a single category, and
/// `["Good", "Excellent"]` a set of acceptable categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdealSpec {
    Number(f64),
    Text(String),
    Range(f64, f64),
    AnyOf(Vec<String>),
}

impl fmt::Display for IdealSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdealSpec::Number(v) => write!(f, "{v} (number)"),
            IdealSpec::Text(s) => write!(f, "'{s}' (text)"),
            IdealSpec::Range(min, max) => write!(f, "[{min}, {max}] (range)"),
            IdealSpec::AnyOf(opts) => write!(f, "{opts:?} (category set)"),
        }
    }
}

/// A named alternative with one candidate value per sub-criterion
/// (or per bare criterion without sub-criteria).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: String,
    pub values: BTreeMap<String, Value>,
}

/// A criterion and its ordered sub-criteria.
///
/// A criterion without sub-criteria is modeled as a group containing just
/// itself, carrying sub-weight 1.0. An empty list is a configuration error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionGroup {
    pub name: String,
    pub sub_criteria: Vec<String>,
}

/// One ranked alternative with its full score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAlternative {
    pub name: String,
    /// GAP weight per sub-criterion, each in [1, 5].
    pub gap_weights: BTreeMap<String, f64>,
    /// Aggregated score per criterion.
    pub criterion_scores: BTreeMap<String, f64>,
    pub final_score: f64,
    /// 1-based position after sorting by final score descending.
    pub ranking: usize,
}

/// A single gap computation failed. [`MatchError::Gap`] attaches the
/// offending sub-criterion key when this happens during ranking.
#[derive(Debug, Error, PartialEq)]
pub enum GapError {
    #[error("type mismatch: candidate {candidate} vs ideal {ideal}")]
    TypeMismatch { candidate: String, ideal: String },
    #[error("numeric input required, got {value}")]
    NonNumericInput { value: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("error processing key '{key}' for alternative '{alternative}': {source}")]
    Gap {
        alternative: String,
        key: String,
        source: GapError,
    },
    #[error("no ideal value defined for key '{key}'")]
    MissingIdealValue { key: String },
    #[error("alternative '{alternative}' has no value for sub-criterion '{key}'")]
    MissingCandidateValue { alternative: String, key: String },
    #[error("sub-criterion '{key}' has no weight")]
    MissingWeight { key: String },
    #[error("criterion '{criterion}' has no weight")]
    MissingCriterionWeight { criterion: String },
    #[error("criterion '{criterion}' has an empty sub-criteria list")]
    EmptyCriterionGroup { criterion: String },
}

/// Map an exact integer gap (candidate minus ideal) to a GAP weight.
///
/// Only integer-valued gaps in -4..=4 hit the table; everything else,
/// including every fractional gap, falls through to the floor weight 1.
/// The fractional fall-through mirrors the reference behavior of looking a
/// continuous difference up in an integer-keyed table and is kept verbatim.
pub fn gap_to_weight(gap: f64) -> f64 {
    if !gap.is_finite() || gap != gap.trunc() {
        return 1.0;
    }
    match gap as i64 {
        0 => 5.0,
        1 => 4.5,
        -1 => 4.0,
        2 => 3.5,
        -2 => 3.0,
        3 => 2.5,
        -3 => 2.0,
        4 => 1.5,
        -4 => 1.0,
        _ => 1.0,
    }
}

/// Score a numeric candidate against a closed ideal range.
///
/// Inside `[min, max]` scores 5. Below the range, the score ramps linearly
/// from 1 at x=0 up to 5 at x=min; above it, from 5 at x=max down to 1 at
/// x=min+max. Anything outside `[0, min+max]` saturates at 1.
pub fn interpolate(x: f64, min: f64, max: f64) -> Result<f64, GapError> {
    for v in [x, min, max] {
        if !v.is_finite() {
            return Err(GapError::NonNumericInput {
                value: v.to_string(),
            });
        }
    }
    if min <= x && x <= max {
        Ok(5.0)
    } else if 0.0 <= x && x < min {
        Ok(1.0 + (x / min) * 4.0)
    } else if max < x && x <= min + max {
        Ok(5.0 + ((x - max) / min) * -4.0)
    } else {
        Ok(1.0)
    }
}

/// Compute the GAP weight for one candidate value against its ideal profile entry.
///
/// Dispatch order matters: a range ideal always takes the interpolation
/// path (a text candidate there is a numeric-input error, not a mismatch),
/// then categorical candidates are matched against the trimmed category
/// set, then plain number-vs-number goes through the gap table.
pub fn compute_gap(candidate: &Value, ideal: &IdealSpec) -> Result<f64, GapError> {
    match (candidate, ideal) {
        (Value::Number(x), IdealSpec::Range(min, max)) => interpolate(*x, *min, *max),
        (Value::Text(_), IdealSpec::Range(..)) => Err(GapError::NonNumericInput {
            value: candidate.to_string(),
        }),
        (Value::Text(s), IdealSpec::Text(accepted)) => {
            Ok(if s.trim() == accepted.trim() { 5.0 } else { 1.0 })
        }
        (Value::Text(s), IdealSpec::AnyOf(accepted)) => {
            let candidate = s.trim();
            let hit = accepted.iter().any(|a| a.trim() == candidate);
            Ok(if hit { 5.0 } else { 1.0 })
        }
        (Value::Number(x), IdealSpec::Number(target)) => {
            if !x.is_finite() || !target.is_finite() {
                return Err(GapError::NonNumericInput {
                    value: candidate.to_string(),
                });
            }
            Ok(gap_to_weight(x - target))
        }
        _ => Err(GapError::TypeMismatch {
            candidate: candidate.to_string(),
            ideal: ideal.to_string(),
        }),
    }
}

/// Rank alternatives against the ideal profile.
///
/// Weight maps are validated against the criteria groups up front, so a
/// missing sub-criterion or criterion weight fails the whole call before
/// any alternative is scored. Ties on final score keep their input order
/// (stable sort); every input alternative appears exactly once in the
/// output with ranking 1..N.
pub fn rank(
    alternatives: &[Alternative],
    ideal_values: &BTreeMap<String, IdealSpec>,
    groups: &[CriterionGroup],
    sub_weights: &BTreeMap<String, f64>,
    criteria_weights: &BTreeMap<String, f64>,
) -> Result<Vec<ScoredAlternative>, MatchError> {
    for group in groups {
        if group.sub_criteria.is_empty() {
            return Err(MatchError::EmptyCriterionGroup {
                criterion: group.name.clone(),
            });
        }
        for sub in &group.sub_criteria {
            if !sub_weights.contains_key(sub) {
                return Err(MatchError::MissingWeight { key: sub.clone() });
            }
        }
        if !criteria_weights.contains_key(&group.name) {
            return Err(MatchError::MissingCriterionWeight {
                criterion: group.name.clone(),
            });
        }
    }

    let mut scored = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        let mut gap_weights = BTreeMap::new();
        for (key, candidate) in &alternative.values {
            let ideal = ideal_values
                .get(key)
                .ok_or_else(|| MatchError::MissingIdealValue { key: key.clone() })?;
            let weight = compute_gap(candidate, ideal).map_err(|source| MatchError::Gap {
                alternative: alternative.name.clone(),
                key: key.clone(),
                source,
            })?;
            gap_weights.insert(key.clone(), weight);
        }

        let mut criterion_scores = BTreeMap::new();
        let mut final_score = 0.0;
        for group in groups {
            let mut score = 0.0;
            for sub in &group.sub_criteria {
                let gap = gap_weights.get(sub).ok_or_else(|| {
                    MatchError::MissingCandidateValue {
                        alternative: alternative.name.clone(),
                        key: sub.clone(),
                    }
                })?;
                score += gap * sub_weights[sub];
            }
            final_score += score * criteria_weights[&group.name];
            criterion_scores.insert(group.name.clone(), score);
        }

        scored.push(ScoredAlternative {
            name: alternative.name.clone(),
            gap_weights,
            criterion_scores,
            final_score,
            ranking: 0,
        });
    }

    // Vec::sort_by is stable, so ties keep input order.
    scored.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    for (idx, result) in scored.iter_mut().enumerate() {
        result.ranking = idx + 1;
    }
    Ok(scored)
}
