#![forbid(unsafe_code)]

//! # prorank
//!
//! A multi-criteria decision calculator in two composable halves:
//!
//! - [`ahp`] derives normalized priority weights from a pairwise comparison
//!   matrix (geometric-mean eigenvector approximation) and reports a
//!   consistency ratio against Saaty's Random Index table.
//! - [`profile`] ranks alternatives against an ideal profile by converting
//!   per-attribute gaps into weights and aggregating them with the AHP
//!   weights.
//!
//! [`analysis`] glues the two together: one immutable request in, one ranked
//! output out. [`schema`] and [`store`] give results a versioned JSON shape
//! and a file-backed home.

pub mod ahp;
pub mod analysis;
pub mod profile;
pub mod schema;
pub mod store;

pub use ahp::{AhpError, AhpResult, ComparisonMatrix, ConsistencyReport};
pub use analysis::{run_analysis, AnalysisError, AnalysisOutput, AnalysisRequest};
pub use profile::{
    compute_gap, gap_to_weight, interpolate, rank, Alternative, CriterionGroup, GapError,
    IdealSpec, MatchError, ScoredAlternative, Value,
};
pub use schema::{StoredAnalysis, SCHEMA_VERSION};
pub use store::{AnalysisStore, StoreError};
