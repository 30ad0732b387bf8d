pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    chat_service::ChatService, genai_service::GenAiService, intent_service::IntentService,
    llm_service::LlmService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub intent_service: IntentService,
    pub chat_service: ChatService,
    pub genai_service: GenAiService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(150))
            .build()
            .unwrap();

        let llm_service = LlmService::from_config(config, http_client);
        let intent_service = IntentService::new(pool.clone());
        let chat_service = ChatService::new(pool.clone());
        let genai_service = GenAiService::new(pool.clone(), llm_service);

        Self {
            pool,
            intent_service,
            chat_service,
            genai_service,
        }
    }
}
