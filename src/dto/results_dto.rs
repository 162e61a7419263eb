use serde::{Deserialize, Serialize};

/// Per-criterion averages for the applicant's radar chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaAverages {
    pub code_quality: f64,
    pub maintainability: f64,
    pub algorithm: f64,
    pub readability: f64,
    pub performance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub count: usize,
    pub average_score: f64,
    pub criteria: CriteriaAverages,
}
