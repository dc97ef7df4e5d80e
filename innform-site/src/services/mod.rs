pub mod eduplan;
pub mod lms;
pub mod metrics;
pub mod student_auth;
