pub mod chat_service;
pub mod genai_service;
pub mod intent_service;
pub mod llm_service;
