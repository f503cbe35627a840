pub mod invite_dto;
pub mod quiz_dto;
