pub mod genai_dto;
