use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use hirehero_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let gen_ai_api = Router::new()
        .route("/gen-ai/chat", post(routes::genai::chat))
        .route(
            "/gen-ai/history",
            get(routes::genai::chat_history).delete(routes::genai::clear_chat_history),
        )
        .route("/gen-ai/parse-resume", post(routes::genai::parse_resume))
        .route("/gen-ai/generate-jd", post(routes::genai::generate_jd))
        .route(
            "/gen-ai/generate-cover-letter",
            post(routes::genai::generate_cover_letter),
        )
        .route(
            "/gen-ai/generate-interview-guide",
            post(routes::genai::generate_interview_guide),
        )
        .route(
            "/gen-ai/summarize-feedback",
            post(routes::genai::summarize_feedback),
        )
        .route(
            "/gen-ai/mock-interview/start",
            post(routes::genai::start_mock_interview),
        )
        .route(
            "/gen-ai/mock-interview/submit",
            post(routes::genai::submit_mock_interview),
        )
        .route(
            "/gen-ai/performance-insights",
            post(routes::genai::performance_insights),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ));

    let app = base_routes
        .merge(gen_ai_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
