//! One-shot analysis pipeline: AHP weight derivation feeding Profile
//! Matching ranking.
//!
//! Everything a run needs is collected into one immutable
//! [`AnalysisRequest`] and passed by value through the engines; nothing is
//! read from or written to ambient state, so two identical requests always
//! produce identical outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ahp::{self, AhpError, AhpResult, ComparisonMatrix};
use crate::profile::{self, Alternative, CriterionGroup, IdealSpec, MatchError, ScoredAlternative};

/// Pairwise comparisons for the sub-criteria of one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCriteriaBlock {
    pub criterion: String,
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

/// Full input for one analysis run.
///
/// Criteria without a [`SubCriteriaBlock`] are scored directly: they form a
/// single-member group of themselves with sub-weight 1.0, and alternatives
/// carry a value under the criterion name itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub criteria: Vec<String>,
    pub criteria_matrix: Vec<Vec<f64>>,
    #[serde(default)]
    pub sub_criteria: Vec<SubCriteriaBlock>,
    pub ideal_values: BTreeMap<String, IdealSpec>,
    pub alternatives: Vec<Alternative>,
}

/// Everything one run produces: the main AHP table, one AHP result per
/// sub-criteria group, the assembled weight maps, and the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub main: AhpResult,
    pub groups: BTreeMap<String, AhpResult>,
    pub sub_criteria_weights: BTreeMap<String, f64>,
    pub criteria_weights: BTreeMap<String, f64>,
    pub ranking: Vec<ScoredAlternative>,
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("AHP failed for {scope}: {source}")]
    Ahp { scope: String, source: AhpError },
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error("sub-criteria block references unknown criterion '{criterion}'")]
    UnknownCriterion { criterion: String },
    #[error("duplicate sub-criteria block for criterion '{criterion}'")]
    DuplicateBlock { criterion: String },
}

fn ahp_for(
    scope: &str,
    matrix_rows: &[Vec<f64>],
    labels: &[String],
) -> Result<AhpResult, AnalysisError> {
    let matrix =
        ComparisonMatrix::from_rows(matrix_rows.to_vec()).map_err(|source| AnalysisError::Ahp {
            scope: scope.to_string(),
            source,
        })?;
    ahp::compute(&matrix, labels).map_err(|source| AnalysisError::Ahp {
        scope: scope.to_string(),
        source,
    })
}

/// Run the full pipeline: main-criteria AHP, one AHP per sub-criteria
/// block, then Profile Matching over the assembled weights.
pub fn run_analysis(request: &AnalysisRequest) -> Result<AnalysisOutput, AnalysisError> {
    let main = ahp_for("main criteria", &request.criteria_matrix, &request.criteria)?;

    let criteria_weights: BTreeMap<String, f64> = request
        .criteria
        .iter()
        .cloned()
        .zip(main.weights.iter().copied())
        .collect();

    let mut groups = BTreeMap::new();
    let mut sub_criteria_weights = BTreeMap::new();
    for block in &request.sub_criteria {
        if !request.criteria.contains(&block.criterion) {
            return Err(AnalysisError::UnknownCriterion {
                criterion: block.criterion.clone(),
            });
        }
        let scope = format!("sub-criteria of '{}'", block.criterion);
        let result = ahp_for(&scope, &block.matrix, &block.labels)?;
        for (label, weight) in block.labels.iter().zip(&result.weights) {
            sub_criteria_weights.insert(label.clone(), *weight);
        }
        if groups.insert(block.criterion.clone(), result).is_some() {
            return Err(AnalysisError::DuplicateBlock {
                criterion: block.criterion.clone(),
            });
        }
    }

    let criterion_groups: Vec<CriterionGroup> = request
        .criteria
        .iter()
        .map(|criterion| match groups.get(criterion) {
            Some(result) => CriterionGroup {
                name: criterion.clone(),
                sub_criteria: result.labels.clone(),
            },
            None => {
                // Bare criterion: its own single sub-criterion at weight 1.
                sub_criteria_weights.insert(criterion.clone(), 1.0);
                CriterionGroup {
                    name: criterion.clone(),
                    sub_criteria: vec![criterion.clone()],
                }
            }
        })
        .collect();

    let ranking = profile::rank(
        &request.alternatives,
        &request.ideal_values,
        &criterion_groups,
        &sub_criteria_weights,
        &criteria_weights,
    )?;

    Ok(AnalysisOutput {
        main,
        groups,
        sub_criteria_weights,
        criteria_weights,
        ranking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Value;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn request_with_sub_criteria() -> AnalysisRequest {
        let alternatives = vec![
            Alternative {
                name: "Ana".to_string(),
                values: [
                    ("Experience".to_string(), Value::Number(4.0)),
                    ("Education".to_string(), Value::Number(3.0)),
                    ("Interview".to_string(), Value::Text("Good".to_string())),
                ]
                .into_iter()
                .collect(),
            },
            Alternative {
                name: "Ben".to_string(),
                values: [
                    ("Experience".to_string(), Value::Number(2.0)),
                    ("Education".to_string(), Value::Number(4.0)),
                    ("Interview".to_string(), Value::Text("Fair".to_string())),
                ]
                .into_iter()
                .collect(),
            },
        ];
        AnalysisRequest {
            criteria: strings(&["Competence", "Interview"]),
            criteria_matrix: vec![vec![1.0, 3.0], vec![1.0 / 3.0, 1.0]],
            sub_criteria: vec![SubCriteriaBlock {
                criterion: "Competence".to_string(),
                labels: strings(&["Experience", "Education"]),
                matrix: vec![vec![1.0, 2.0], vec![0.5, 1.0]],
            }],
            ideal_values: [
                ("Experience".to_string(), IdealSpec::Number(4.0)),
                ("Education".to_string(), IdealSpec::Number(4.0)),
                (
                    "Interview".to_string(),
                    IdealSpec::AnyOf(strings(&["Good", "Excellent"])),
                ),
            ]
            .into_iter()
            .collect(),
            alternatives,
        }
    }

    #[test]
    fn pipeline_ranks_alternatives_with_derived_weights() {
        let request = request_with_sub_criteria();
        let output = run_analysis(&request).unwrap();

        assert!((output.main.weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((output.criteria_weights["Competence"] - 0.75).abs() < 1e-9);
        assert!((output.criteria_weights["Interview"] - 0.25).abs() < 1e-9);
        // Sub weights come from the Competence block; the bare Interview
        // criterion gets weight 1.0 on itself.
        assert!(
            (output.sub_criteria_weights["Experience"] - 2.0 / 3.0).abs() < 1e-9
        );
        assert_eq!(output.sub_criteria_weights["Interview"], 1.0);

        assert_eq!(output.ranking.len(), 2);
        assert_eq!(output.ranking[0].name, "Ana");
        assert_eq!(output.ranking[0].ranking, 1);
        assert!(output.ranking[0].final_score > output.ranking[1].final_score);

        // Ana: Experience gap 0 -> 5, Education gap -1 -> 4, Interview hit -> 5.
        let ana = &output.ranking[0];
        assert_eq!(ana.gap_weights["Experience"], 5.0);
        assert_eq!(ana.gap_weights["Education"], 4.0);
        assert_eq!(ana.gap_weights["Interview"], 5.0);
        let competence = 5.0 * (2.0 / 3.0) + 4.0 * (1.0 / 3.0);
        assert!((ana.criterion_scores["Competence"] - competence).abs() < 1e-9);
        let expected = competence * 0.75 + 5.0 * 0.25;
        assert!((ana.final_score - expected).abs() < 1e-9);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let request = request_with_sub_criteria();
        let first = run_analysis(&request).unwrap();
        let second = run_analysis(&request).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_criterion_in_sub_block_is_rejected() {
        let mut request = request_with_sub_criteria();
        request.sub_criteria[0].criterion = "Charisma".to_string();
        let err = run_analysis(&request).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnknownCriterion {
                criterion: "Charisma".to_string()
            }
        );
    }

    #[test]
    fn duplicate_sub_block_is_rejected() {
        let mut request = request_with_sub_criteria();
        let duplicate = request.sub_criteria[0].clone();
        request.sub_criteria.push(duplicate);
        let err = run_analysis(&request).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DuplicateBlock {
                criterion: "Competence".to_string()
            }
        );
    }

    #[test]
    fn bad_sub_matrix_names_its_criterion() {
        let mut request = request_with_sub_criteria();
        request.sub_criteria[0].matrix = vec![vec![1.0, 0.0], vec![2.0, 1.0]];
        let err = run_analysis(&request).unwrap_err();
        match err {
            AnalysisError::Ahp { scope, source } => {
                assert!(scope.contains("Competence"));
                assert!(matches!(source, AhpError::NonPositiveEntry { .. }));
            }
            other => panic!("expected Ahp error, got {other:?}"),
        }
    }

    #[test]
    fn empty_main_matrix_is_rejected() {
        let mut request = request_with_sub_criteria();
        request.criteria_matrix = vec![];
        request.criteria = vec![];
        let err = run_analysis(&request).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Ahp {
                scope: "main criteria".to_string(),
                source: AhpError::Empty
            }
        );
    }
}
