use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::test_response::NewTestResponse;

pub const MAX_CRITERION_POINTS: i32 = 20;

/// Five criteria, 20 points each.
pub const RUBRIC: [(&str, &str); 5] = [
    ("code_quality", "Code quality"),
    ("maintainability", "Maintainability"),
    ("algorithm", "Algorithm correctness"),
    ("readability", "Readability"),
    ("performance", "Performance"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    pub code_quality: i32,
    pub maintainability: i32,
    pub algorithm: i32,
    pub readability: i32,
    pub performance: i32,
    #[serde(default)]
    pub total_score: Option<i32>,
    pub review_comments: String,
}

impl GradeReport {
    pub fn criteria(&self) -> [(&'static str, i32); 5] {
        [
            ("code_quality", self.code_quality),
            ("maintainability", self.maintainability),
            ("algorithm", self.algorithm),
            ("readability", self.readability),
            ("performance", self.performance),
        ]
    }

    pub fn sum(&self) -> i32 {
        self.criteria().iter().map(|(_, points)| points).sum()
    }

    pub fn into_new_response(self, test_id: Uuid, answer: String, created_at: DateTime<Utc>) -> NewTestResponse {
        let score = self.sum();
        NewTestResponse {
            test_id,
            answer,
            code_quality: self.code_quality,
            maintainability: self.maintainability,
            algorithm: self.algorithm,
            readability: self.readability,
            performance: self.performance,
            score,
            review_comments: self.review_comments,
            created_at,
        }
    }
}

pub fn build_grading_prompt(answer: &str) -> String {
    let rubric = RUBRIC
        .iter()
        .enumerate()
        .map(|(i, (_, label))| format!("{}. {} ({} points)", i + 1, label, MAX_CRITERION_POINTS))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a senior software engineer grading a candidate's answer to a coding skill test.
Score the answer on each criterion below as an integer from 0 to {max}:

{rubric}

The total score is the sum of the five criteria (0-100).

Respond with a single JSON code block and nothing else, in exactly this shape:
```json
{{
  "code_quality": 0,
  "maintainability": 0,
  "algorithm": 0,
  "readability": 0,
  "performance": 0,
  "total_score": 0,
  "review_comments": "short review of the answer"
}}
```

Candidate answer:
{answer}"#,
        max = MAX_CRITERION_POINTS,
        rubric = rubric,
        answer = answer,
    )
}

/// Body of the first ```json fenced block, trimmed.
pub fn extract_json_fence(text: &str) -> Option<&str> {
    const OPEN: &str = "```json";
    let start = text.find(OPEN)? + OPEN.len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    let body = rest[..end].trim();
    (!body.is_empty()).then_some(body)
}

/// Strict: no fence, bad JSON, or an out-of-range criterion is an error.
pub fn parse_grading_reply(text: &str) -> Result<GradeReport> {
    let body = extract_json_fence(text)
        .ok_or_else(|| Error::Grading("response did not contain a ```json block".into()))?;

    let report: GradeReport = serde_json::from_str(body)
        .map_err(|e| Error::Grading(format!("malformed grading JSON: {}", e)))?;

    for (name, points) in report.criteria() {
        if !(0..=MAX_CRITERION_POINTS).contains(&points) {
            return Err(Error::Grading(format!(
                "{} score {} is outside 0-{}",
                name, points, MAX_CRITERION_POINTS
            )));
        }
    }

    if let Some(total) = report.total_score {
        if total != report.sum() {
            tracing::warn!(
                reported = total,
                computed = report.sum(),
                "grader total disagrees with criteria sum, using the sum"
            );
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "Here is the evaluation:\n```json\n{\"code_quality\": 15, \"maintainability\": 14, \"algorithm\": 18, \"readability\": 16, \"performance\": 12, \"total_score\": 75, \"review_comments\": \"Solid, but allocates in the hot loop.\"}\n```\nGood luck!";

    #[test]
    fn prompt_embeds_rubric_and_answer() {
        let prompt = build_grading_prompt("fn add(a: i32, b: i32) -> i32 { a + b }");
        for (_, label) in RUBRIC {
            assert!(prompt.contains(&format!("{} (20 points)", label)), "missing {}", label);
        }
        assert!(prompt.contains("fn add(a: i32, b: i32)"));
        assert!(prompt.contains("\"review_comments\""));
    }

    #[test]
    fn parses_fenced_reply() {
        let report = parse_grading_reply(REPLY).unwrap();
        assert_eq!(report.code_quality, 15);
        assert_eq!(report.performance, 12);
        assert_eq!(report.sum(), 75);
        assert_eq!(report.review_comments, "Solid, but allocates in the hot loop.");
    }

    #[test]
    fn persisted_score_is_the_criteria_sum() {
        let reply = "```json\n{\"code_quality\": 20, \"maintainability\": 20, \"algorithm\": 20, \"readability\": 20, \"performance\": 20, \"total_score\": 90, \"review_comments\": \"ok\"}\n```";
        let report = parse_grading_reply(reply).unwrap();
        let row = report.into_new_response(Uuid::new_v4(), "answer".into(), Utc::now());
        assert_eq!(row.score, 100);
        assert_eq!(
            row.score,
            row.code_quality + row.maintainability + row.algorithm + row.readability + row.performance
        );
    }

    #[test]
    fn missing_fence_is_a_grading_error() {
        let bare = "{\"code_quality\": 1, \"maintainability\": 1, \"algorithm\": 1, \"readability\": 1, \"performance\": 1, \"review_comments\": \"x\"}";
        assert!(matches!(parse_grading_reply(bare), Err(Error::Grading(_))));
        assert!(matches!(parse_grading_reply("```json\n{\"code_quality\": 1"), Err(Error::Grading(_))));
    }

    #[test]
    fn malformed_json_is_a_grading_error() {
        let reply = "```json\n{\"code_quality\": \"high\"}\n```";
        assert!(matches!(parse_grading_reply(reply), Err(Error::Grading(_))));
    }

    #[test]
    fn out_of_range_criterion_is_rejected() {
        let reply = "```json\n{\"code_quality\": 25, \"maintainability\": 1, \"algorithm\": 1, \"readability\": 1, \"performance\": 1, \"review_comments\": \"x\"}\n```";
        assert!(matches!(parse_grading_reply(reply), Err(Error::Grading(_))));
    }

    #[test]
    fn extract_ignores_surrounding_prose() {
        assert_eq!(extract_json_fence("a ```json\n{}\n``` b"), Some("{}"));
        assert_eq!(extract_json_fence("```json\n\n```"), None);
        assert_eq!(extract_json_fence("```\n{}\n```"), None);
    }
}
