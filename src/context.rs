use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Applicant,
    Recruiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Recruiter => "recruiter",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "applicant" => Ok(Role::Applicant),
            "recruiter" => Ok(Role::Recruiter),
            other => Err(Error::Forbidden(format!("Unknown role '{}'", other))),
        }
    }
}

/// Authenticated caller, passed explicitly to every store and grading call.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub role: Role,
    pub access_token: String,
}

impl SessionContext {
    pub fn new(user_id: Uuid, role: Role, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            access_token: access_token.into(),
        }
    }

    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "This action requires the {} role",
                role.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("Recruiter".parse::<Role>().unwrap(), Role::Recruiter);
        assert_eq!("applicant".parse::<Role>().unwrap(), Role::Applicant);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn require_role_rejects_other_roles() {
        let ctx = SessionContext::new(Uuid::new_v4(), Role::Applicant, "token");
        assert!(ctx.require_role(Role::Applicant).is_ok());
        assert!(matches!(ctx.require_role(Role::Recruiter), Err(Error::Forbidden(_))));
    }
}
