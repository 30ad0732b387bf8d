pub mod genai;
pub mod health;
