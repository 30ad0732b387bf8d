use axum::{
    extract::{Extension, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::genai_dto::{
        ChatHistoryItem, ChatPayload, ChatResponse, CoverLetterPayload, CoverLetterResponse,
        GenerateJdPayload, InterviewGuidePayload, MockInterviewQuestions,
        MockInterviewStartPayload, MockInterviewSubmitPayload, ParsedResumeResponse,
        SummarizeFeedbackPayload,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::User,
    AppState,
};

/// Resolves the authenticated user from JWT claims. A token whose subject no
/// longer maps to a user row is treated as unauthorized, not as a 404.
async fn current_user(state: &AppState, claims: &Claims) -> Result<User> {
    let user_id: Uuid = claims
        .sub
        .parse()
        .map_err(|_| Error::Unauthorized("Invalid token subject".to_string()))?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, email, role, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?;

    user.ok_or_else(|| Error::Unauthorized("User not found".to_string()))
}

#[axum::debug_handler]
pub async fn chat(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChatPayload>,
) -> Result<impl IntoResponse> {
    let prompt = payload
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::BadRequest("Prompt is required".to_string()))?
        .to_string();

    let user = current_user(&state, &claims).await?;

    let action = state.intent_service.handle_data_query(&user, &prompt).await?;
    let reply = state.genai_service.chat_reply(&user, &prompt, &action).await?;

    state
        .chat_service
        .record_exchange(user.id, &prompt, &reply)
        .await?;

    // The session id is echoed back for the client; history is keyed by user.
    let session_id = payload
        .session_id
        .unwrap_or_else(|| "session_123".to_string());
    Ok(Json(ChatResponse { reply, session_id }))
}

#[axum::debug_handler]
pub async fn chat_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = current_user(&state, &claims).await?;
    let messages = state.chat_service.history(user.id).await?;

    let history: Vec<ChatHistoryItem> = messages
        .into_iter()
        .map(|m| ChatHistoryItem {
            sender: m.sender,
            text: m.message,
            timestamp: m.timestamp.to_rfc3339(),
        })
        .collect();

    Ok(Json(history))
}

#[axum::debug_handler]
pub async fn clear_chat_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = current_user(&state, &claims).await?;
    let deleted = state.chat_service.clear(user.id).await?;
    tracing::debug!(user_id = %user.id, deleted, "Cleared chat history");

    Ok(Json(json!({ "message": "History cleared" })))
}

#[axum::debug_handler]
pub async fn parse_resume(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    current_user(&state, &claims).await?;

    let mut resume: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("resume") {
            let filename = field
                .file_name()
                .map(|f| f.to_string())
                .unwrap_or_default();
            let data = field.bytes().await?;
            resume = Some((filename, data.to_vec()));
            break;
        }
    }

    let (filename, data) =
        resume.ok_or_else(|| Error::BadRequest("No resume file uploaded".to_string()))?;
    if filename.is_empty() || data.is_empty() {
        return Err(Error::BadRequest("No selected file".to_string()));
    }

    let parsed = state.genai_service.parse_resume(&filename, &data).await?;

    Ok(Json(ParsedResumeResponse {
        message: "Resume parsed successfully".to_string(),
        data: parsed,
    }))
}

#[axum::debug_handler]
pub async fn generate_jd(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateJdPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    current_user(&state, &claims).await?;

    let jd = state.genai_service.generate_jd(&payload).await?;
    Ok(Json(jd))
}

#[axum::debug_handler]
pub async fn generate_cover_letter(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CoverLetterPayload>,
) -> Result<impl IntoResponse> {
    let user = current_user(&state, &claims).await?;

    let job_id = payload
        .job_id
        .ok_or_else(|| Error::BadRequest("Job ID is required".to_string()))?;
    let job = state.genai_service.get_job(job_id).await?;

    let notes = payload.user_notes.as_deref().unwrap_or("");
    let draft = state
        .genai_service
        .generate_cover_letter(&user, &job, notes)
        .await?;

    Ok(Json(CoverLetterResponse {
        generated_draft: draft,
    }))
}

#[axum::debug_handler]
pub async fn generate_interview_guide(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<InterviewGuidePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    current_user(&state, &claims).await?;

    let guide = state
        .genai_service
        .generate_interview_guide(&payload.job_description)
        .await?;
    Ok(Json(guide))
}

#[axum::debug_handler]
pub async fn summarize_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SummarizeFeedbackPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    current_user(&state, &claims).await?;

    let summary = state.genai_service.summarize_feedback(&payload).await?;
    Ok(Json(summary))
}

#[axum::debug_handler]
pub async fn start_mock_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MockInterviewStartPayload>,
) -> Result<impl IntoResponse> {
    current_user(&state, &claims).await?;

    let job_id = payload
        .job_id
        .ok_or_else(|| Error::BadRequest("Job ID is required".to_string()))?;
    let job = state.genai_service.get_job(job_id).await?;

    let questions = state.genai_service.mock_interview_questions(&job).await?;
    Ok(Json(MockInterviewQuestions { questions }))
}

#[axum::debug_handler]
pub async fn submit_mock_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MockInterviewSubmitPayload>,
) -> Result<impl IntoResponse> {
    current_user(&state, &claims).await?;

    let job_id = payload
        .job_id
        .ok_or_else(|| Error::BadRequest("Job ID is required".to_string()))?;
    let job = state.genai_service.get_job(job_id).await?;

    let evaluation = state
        .genai_service
        .evaluate_mock_interview(&job, &payload.answers)
        .await?;
    Ok(Json(evaluation))
}

#[axum::debug_handler]
pub async fn performance_insights(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = current_user(&state, &claims).await?;
    if !user.is_hr() {
        return Err(Error::Forbidden("Access denied".to_string()));
    }

    let insights = state.genai_service.performance_insights(&user).await?;
    Ok((StatusCode::OK, Json(insights)))
}
