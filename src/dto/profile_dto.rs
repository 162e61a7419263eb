use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertApplicantProfilePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(range(min = 0, max = 60))]
    pub experience_years: Option<i32>,
    #[validate(url)]
    pub resume_url: Option<String>,
}

impl UpsertApplicantProfilePayload {
    /// Trimmed, de-duplicated skill tags with blanks removed.
    pub fn normalized_skills(&self) -> Vec<String> {
        let mut skills: Vec<String> = Vec::new();
        for skill in &self.skills {
            let skill = skill.trim();
            if !skill.is_empty() && !skills.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
                skills.push(skill.to_string());
            }
        }
        skills
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertRecruiterProfilePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub position: Option<String>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(url)]
    pub website: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_are_trimmed_and_deduplicated() {
        let payload = UpsertApplicantProfilePayload {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            location: None,
            skills: vec![" Rust ".into(), "rust".into(), "".into(), "SQL".into()],
            experience_years: Some(3),
            resume_url: None,
        };
        assert_eq!(payload.normalized_skills(), vec!["Rust", "SQL"]);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn invalid_email_and_url_are_rejected() {
        let payload = CreateCompanyPayload {
            name: "Acme".into(),
            website: Some("not a url".into()),
            description: None,
            location: None,
        };
        assert!(payload.validate().is_err());

        let payload = UpsertRecruiterProfilePayload {
            name: "Bob".into(),
            email: "bob-at-example".into(),
            position: None,
            company_id: None,
        };
        assert!(payload.validate().is_err());
    }
}
