use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub prompt: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryItem {
    pub sender: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateJdPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub company_name: String,
    pub department: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
    pub education: Option<String>,
}

/// Response contract for JD generation. Doubles as the strict parse target
/// for the provider's JSON reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedJd {
    pub generated_description: String,
    pub generated_responsibilities: Vec<String>,
    pub generated_qualifications: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterPayload {
    pub job_id: Option<i64>,
    pub user_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub generated_draft: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InterviewGuidePayload {
    #[validate(length(min = 1))]
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewGuide {
    pub job_title: String,
    pub behavioral_questions: Vec<String>,
    pub technical_questions: Vec<String>,
    pub scoring_rubric: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SummarizeFeedbackPayload {
    #[validate(length(min = 1))]
    pub raw_feedback_notes: String,
    pub candidate_name: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackSummary {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Deserialize)]
pub struct MockInterviewStartPayload {
    pub job_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MockInterviewQuestions {
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct MockInterviewSubmitPayload {
    pub job_id: Option<i64>,
    #[serde(default)]
    pub answers: Vec<MockAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub question: String,
    pub rating: i32,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockEvaluation {
    pub overall_score: i32,
    pub overall_feedback: String,
    pub question_evaluations: Vec<QuestionEvaluation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub title: String,
    pub detail: String,
    #[serde(rename = "type")]
    pub insight_type: String,
}

#[derive(Debug, Serialize)]
pub struct ParsedResumeResponse {
    pub message: String,
    pub data: serde_json::Value,
}
