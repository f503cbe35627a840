pub mod attempt;
pub mod attempt_result;
pub mod eligibility;
pub mod form;
pub mod invite;
pub mod question;
