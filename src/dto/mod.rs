pub mod history_dto;
pub mod search_dto;
