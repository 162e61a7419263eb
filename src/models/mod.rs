pub mod applicant_profile;
pub mod application;
pub mod company;
pub mod job;
pub mod recruiter_profile;
pub mod skill_test;
pub mod test_applicant;
pub mod test_question;
pub mod test_response;
