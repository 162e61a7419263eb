use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::test_applicant::PendingAssignment;
use crate::services::exam_session::ExamState;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpenSessionRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub applicant_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub applicant_email: String,
}

impl OpenSessionRequest {
    /// Trimmed copy, so whitespace-only fields fail validation.
    pub fn normalized(self) -> Self {
        Self {
            applicant_name: self.applicant_name.trim().to_string(),
            applicant_email: self.applicant_email.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectTestRequest {
    pub test_id: Uuid,
}

/// Answer to the blocking yes/no prompt shown before starting or submitting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTestSummary {
    pub test_id: Uuid,
    pub title: String,
    pub category: String,
    pub programming_language: String,
    pub experience_level: String,
    pub difficulty: String,
    pub time_limit: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSessionView {
    pub id: Uuid,
    pub state: ExamState,
    pub applicant_name: String,
    pub applicant_email: String,
    pub options: Vec<PendingAssignment>,
    pub test: Option<ActiveTestSummary>,
    pub question: Option<String>,
    pub answer: String,
    pub editable: bool,
    pub remaining_seconds: u32,
    pub alert: bool,
    pub timer_active: bool,
    pub last_error: Option<String>,
    pub response_id: Option<Uuid>,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub response_id: Uuid,
    pub score: i32,
    pub code_quality: i32,
    pub maintainability: i32,
    pub algorithm: i32,
    pub readability: i32,
    pub performance: i32,
    pub review_comments: String,
    pub redirect_to: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_name_fails_after_normalizing() {
        let req = OpenSessionRequest {
            applicant_name: "   ".into(),
            applicant_email: " ada@example.com ".into(),
        }
        .normalized();
        assert_eq!(req.applicant_email, "ada@example.com");
        assert!(req.validate().is_err());
    }

    #[test]
    fn padded_fields_are_accepted_once_trimmed() {
        let req = OpenSessionRequest {
            applicant_name: "  Ada Lovelace ".into(),
            applicant_email: "ada@example.com\n".into(),
        }
        .normalized();
        assert!(req.validate().is_ok());
        assert_eq!(req.applicant_name, "Ada Lovelace");
    }
}
