pub mod application_service;
pub mod countdown;
pub mod exam_service;
pub mod exam_session;
pub mod exam_store;
pub mod grading_client;
pub mod grading_service;
pub mod job_service;
pub mod profile_service;
pub mod results_service;
pub mod skill_test_service;
