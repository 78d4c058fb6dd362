use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse reading of a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ScoreBand::Strong
        } else if score >= 60 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

/// What the model concluded about one resume against one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub name: String,
    /// 0..=100.
    pub score: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateEvaluation {
    pub candidate_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(flatten)]
    pub assessment: Assessment,
    pub band: ScoreBand,
    pub model: String,
    pub evaluated_at: DateTime<Utc>,
}

impl CandidateEvaluation {
    pub fn new(assessment: Assessment, model: impl Into<String>) -> Self {
        Self {
            candidate_id: Uuid::new_v4(),
            file_name: None,
            band: ScoreBand::from_score(assessment.score),
            assessment,
            model: model.into(),
            evaluated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_band_boundaries() {
        assert_eq!(ScoreBand::from_score(100), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_score(80), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_score(79), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(60), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(59), ScoreBand::Weak);
        assert_eq!(ScoreBand::from_score(0), ScoreBand::Weak);
    }

    #[test]
    fn test_evaluation_serializes_flat() {
        let assessment = Assessment {
            name: "张三".to_string(),
            score: 85,
            tags: vec!["Rust".to_string()],
            strengths: vec![],
            risks: vec![],
            summary: "Strong backend fit".to_string(),
        };
        let json = serde_json::to_value(CandidateEvaluation::new(assessment, "gpt-4o-mini")).unwrap();
        assert_eq!(json["name"], "张三");
        assert_eq!(json["score"], 85);
        assert_eq!(json["band"], "strong");
        assert!(json.get("file_name").is_none());
    }
}
