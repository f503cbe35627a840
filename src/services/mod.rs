pub mod answer_service;
pub mod credential_service;
pub mod eligibility_service;
pub mod fetch_service;
pub mod history_service;
pub mod invite_service;
pub mod notification_service;
pub mod question_service;
pub mod quiz_service;
pub mod session_service;
pub mod submission_service;
pub mod timer_service;
pub mod transport;
