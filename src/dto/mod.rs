pub mod application_dto;
pub mod exam_dto;
pub mod job_dto;
pub mod profile_dto;
pub mod results_dto;
pub mod skill_test_dto;
