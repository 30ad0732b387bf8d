//! Generation orchestrator: one entry point per AI feature. Each builds a
//! fixed system prompt plus a request-specific user prompt, calls the
//! provider-abstracted text generator, and reshapes the raw reply into the
//! endpoint's response contract.
//!
//! Provider output is never trusted to be valid JSON: every structured
//! endpoint strips a stray code fence, attempts a strict parse, and falls
//! back to a documented substitute payload. The one exception is
//! mock-interview scoring, where a fabricated score would be misleading, so
//! a parse failure surfaces as a hard server error instead.

use crate::dto::genai_dto::{
    FeedbackSummary, GenerateJdPayload, GeneratedJd, Insight, InterviewGuide, MockAnswer,
    MockEvaluation, SummarizeFeedbackPayload,
};
use crate::error::{Error, Result};
use crate::models::job::Job;
use crate::models::user::User;
use crate::services::intent_service::ChatAction;
use crate::services::llm_service::LlmService;
use crate::utils::text::{snippet, strip_code_fences};
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

/// Job description excerpt length for mock-interview question prompts.
pub const MOCK_DESCRIPTION_SNIPPET_LEN: usize = 500;
/// Job description excerpt length for the feedback-summary prompt context.
pub const FEEDBACK_JD_CONTEXT_LEN: usize = 1500;
/// Overall cap on review comments fed to the insights prompt.
pub const MAX_RECENT_COMMENTS: usize = 15;
/// Per-employee cap on review comments (newest first).
pub const COMMENTS_PER_EMPLOYEE: usize = 2;

const KNOWLEDGE_BASE_CANDIDATE: &str = "\
HireHero Application Knowledge Base for Job Seekers:
- Your Role: Job Seeker (candidate). You cannot access HR features (like adding employees or performance reviews).
- Capabilities: Apply to Jobs, Update Profile/Resume, View AI Match Score, Check Application Status, Practice Mock Interviews, Generate Cover Letters.
- Profile Management:
    - To update resume: Navigate to the 'Profile' tab in the UI.
    - To update personal info (phone, summary, location): Use the 'Profile' tab.
- Application Tracking:
    - To check application status: Go to the 'Applications' tab in the UI. Statuses include applied, interviewing, offer_extended, rejected, withdrawn.
    - To accept an offer: Use the 'Accept' button in the application details view.
- Tools:
    - AI Studio: Ask questions, generate cover letters, start mock interviews.
- Core Data: You can query public job details (title, salary, location, description) and your own application status.";

const KNOWLEDGE_BASE_HR: &str = "\
HireHero Application Knowledge Base for HR Professionals:
- Your Role: HR Recruiter (hr). You cannot apply for jobs or manage candidate-side profiles.
- Capabilities: Post Jobs, Add Employees, View Applicants, Schedule Interviews, Generate Reports, JD Generation, Interview Guide Generation, Performance Analytics.
- Recruitment Management:
    - To post a job: Navigate to the 'Post Job' page.
    - To manage applicants: Use the 'Recruitment' tab in the UI.
    - To schedule an interview: Click the 'Schedule Interview' button on an application card.
- Employee Management:
    - To add a new employee: Navigate to the 'Add Employee' page.
    - To view/edit employees: Use the 'Employees' tab.
    - To add a performance review: Click the 'Review' button on an employee's record.
- Analytics & Reports:
    - To generate performance insights: Go to the 'Performance' tab.
    - To generate formal reports (PDF/CSV): Use the 'Generate Report' page.
- Tools:
    - AI Studio: JD Generator (generate detailed job descriptions), Interview Guide Tool (create structured interview questions), Feedback Summarizer.
- Core Data: You can query details about your posted jobs (status, applicant counts) and your hired employees (performance, roles).";

#[derive(Clone)]
pub struct GenAiService {
    pool: PgPool,
    llm: LlmService,
}

impl GenAiService {
    pub fn new(pool: PgPool, llm: LlmService) -> Self {
        Self { pool, llm }
    }

    pub async fn get_job(&self, job_id: i64) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, description, tags, salary, employment_type,
                   location, education, experience_level, posted_by, created_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        job.ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    // --- Chat ---

    pub async fn chat_reply(&self, user: &User, prompt: &str, action: &ChatAction) -> Result<String> {
        let (system_context, user_prompt) = build_chat_prompts(user, prompt, action);
        self.llm.generate_text(&system_context, &user_prompt).await
    }

    // --- Job description generation ---

    pub async fn generate_jd(&self, payload: &GenerateJdPayload) -> Result<GeneratedJd> {
        let system_prompt = "You are an expert HR assistant. Generate a detailed job description in strict JSON format. \
The JSON must have the following keys:\n\
- \"generated_description\": A professional summary of the role.\n\
- \"generated_responsibilities\": A list of strings (3-5 bullet points).\n\
- \"generated_qualifications\": A list of strings (3-5 bullet points).\n\
Do not include any markdown formatting like ```json ... ```.";

        let skills_str = match &payload.skills {
            Some(skills) if !skills.is_empty() => skills.join(", "),
            _ => "relevant industry skills".to_string(),
        };

        let user_prompt = format!(
            "Generate a detailed Job Description for the position of '{}' at '{}' in the '{}' department.\n\n\
Context:\n\
- Required Skills: {}\n\
- Experience Level: {}\n\
- Education Required: {}\n\n\
Ensure the description and requirements align with these specific details.",
            payload.title,
            payload.company_name,
            payload.department.as_deref().unwrap_or("General"),
            skills_str,
            payload.experience.as_deref().unwrap_or(""),
            payload.education.as_deref().unwrap_or(""),
        );

        let raw = self.llm.generate_text(system_prompt, &user_prompt).await?;
        Ok(parse_generated_jd(&raw))
    }

    // --- Cover letter ---

    pub async fn generate_cover_letter(
        &self,
        user: &User,
        job: &Job,
        user_notes: &str,
    ) -> Result<String> {
        let profile_summary: Option<String> =
            sqlx::query_scalar("SELECT summary FROM profiles WHERE user_id = $1")
                .bind(user.id)
                .fetch_optional(&self.pool)
                .await?
                .flatten();

        let full_name = user.full_name();
        let system_prompt = "You are a professional cover letter generator. \
Output ONLY the final cover letter text. \
Do not include any conversational filler (like \"Here is a draft\", \"Good luck\"), instructions, or advice. \
Start directly with the candidate's header and end with the signature.";

        let user_prompt = format!(
            "Write a professional cover letter using the following details:\n\n\
CANDIDATE NAME: {name}\n\
JOB TITLE: {title}\n\
COMPANY NAME: {company}\n\
PROFILE SUMMARY: {summary}\n\
USER NOTES: {notes}\n\n\
Requirements:\n\
1. Use the Candidate Name ({name}) in the header and signature.\n\
2. Use the Company Name ({company}) and Job Title ({title}) in the body of the letter.\n\
3. Use placeholders ONLY for missing contact info: \"[Your Address]\", \"[Your Phone Number]\", \"[Your Email]\", and \"[Date]\".\n\
4. The tone should be professional and enthusiastic.",
            name = full_name,
            title = job.title,
            company = job.company,
            summary = profile_summary.as_deref().unwrap_or(""),
            notes = user_notes,
        );

        self.llm.generate_text(system_prompt, &user_prompt).await
    }

    // --- Interview guide ---

    pub async fn generate_interview_guide(&self, jd_text: &str) -> Result<InterviewGuide> {
        let system_prompt = "You are an expert HR interviewer. Generate a structured interview guide in strict JSON format based on the job description.\n\
The JSON must have the following keys:\n\
- \"job_title\": The extracted job title.\n\
- \"behavioral_questions\": A list of 3-5 behavioral interview questions (strings).\n\
- \"technical_questions\": A list of 3-5 technical interview questions specific to the role (strings).\n\
- \"scoring_rubric\": A string containing a guide on how to evaluate candidates (e.g., \"1 - Poor: ..., 3 - Average: ..., 5 - Excellent: ...\").\n\
Do not include any markdown formatting like ```json ... ```.";

        let user_prompt = format!("JD: {}", jd_text);

        let raw = self.llm.generate_text(system_prompt, &user_prompt).await?;
        Ok(parse_interview_guide(&raw))
    }

    // --- Feedback summarization ---

    pub async fn summarize_feedback(
        &self,
        payload: &SummarizeFeedbackPayload,
    ) -> Result<FeedbackSummary> {
        let candidate_name = payload.candidate_name.as_deref().unwrap_or("The Candidate");
        let jd_context = match payload.job_description.as_deref() {
            Some(jd) if !jd.is_empty() => snippet(jd, FEEDBACK_JD_CONTEXT_LEN),
            _ => "Not provided...".to_string(),
        };

        let system_prompt = format!(
            "You are an expert HR assistant. Summarize the interview feedback for candidate '{name}'.\n\n\
Context:\n\
- Job Description Context: {jd}\n\n\
Task:\n\
Summarize the provided interview notes into a structured JSON format.\n\
Compare the feedback against the Job Description requirements where possible.\n\n\
The JSON must have the following keys:\n\
- \"summary\": A concise paragraph summarizing {name}'s performance and fit for the role (string).\n\
- \"strengths\": A list of the candidate's key strengths (list of strings).\n\
- \"weaknesses\": A list of the candidate's key weaknesses or areas for improvement (list of strings).\n\
- \"recommendation\": A short recommendation string (e.g., \"Hire\", \"Strong Hire\", \"No Hire\", \"Needs Discussion\").\n\
Do not include any markdown formatting like ```json ... ```.",
            name = candidate_name,
            jd = jd_context,
        );

        let user_prompt = format!("Feedback Notes:\n{}", payload.raw_feedback_notes);

        let raw = self.llm.generate_text(&system_prompt, &user_prompt).await?;
        Ok(parse_feedback_summary(&raw))
    }

    // --- Mock interview ---

    pub async fn mock_interview_questions(&self, job: &Job) -> Result<Vec<String>> {
        let system_prompt = "You are an expert technical interviewer. Generate 5 interview questions for the specified role.\n\
- 3 Questions must be Technical (specific to the skills/stack).\n\
- 2 Questions must be Behavioral (STAR method style).\n\
- Output strict JSON: A simple list of strings. [\"Question 1\", \"Question 2\", ...]\n\
- Do not include markdown formatting.";

        let user_prompt = format!(
            "Role: {}\nCompany: {}\nDescription: {}",
            job.title,
            job.company,
            snippet(&job.description, MOCK_DESCRIPTION_SNIPPET_LEN),
        );

        let raw = self.llm.generate_text(system_prompt, &user_prompt).await?;
        Ok(parse_mock_questions(&raw).unwrap_or_else(fallback_mock_questions))
    }

    pub async fn evaluate_mock_interview(
        &self,
        job: &Job,
        answers: &[MockAnswer],
    ) -> Result<MockEvaluation> {
        let mut transcript = String::new();
        for (idx, item) in answers.iter().enumerate() {
            transcript.push_str(&format!(
                "Q{}: {}\nCandidate Answer: {}\n\n",
                idx + 1,
                item.question,
                item.answer
            ));
        }

        let system_prompt = "You are an expert Hiring Manager evaluating a candidate's mock interview session for a specific job.\n\
Output strict JSON with the following structure:\n\
{\n\
    \"overall_score\": 8,\n\
    \"overall_feedback\": \"One sentence summary.\",\n\
    \"question_evaluations\": [\n\
        {\n\
            \"question\": \"The question text...\",\n\
            \"rating\": 7,\n\
            \"feedback\": \"Specific advice on how to improve this specific answer.\"\n\
        }\n\
    ]\n\
}\n\
Ratings are integers 1-10; make overall_score the average of the per-question ratings.\n\
Do not include markdown.";

        let user_prompt = format!("Job: {}\n\nInterview Transcript:\n{}", job.title, transcript);

        let raw = self.llm.generate_text(system_prompt, &user_prompt).await?;
        parse_mock_evaluation(&raw)
            .ok_or_else(|| Error::Internal("Failed to generate evaluation".to_string()))
    }

    // --- Performance insights ---

    pub async fn performance_insights(&self, user: &User) -> Result<Vec<Insight>> {
        let employee_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE hired_by = $1")
                .bind(user.id)
                .fetch_one(&self.pool)
                .await?;

        if employee_count == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, EmployeeReviewRow>(
            r#"
            SELECT e.id AS employee_id, e.department, p.rating, p.comments, p.review_date
            FROM employees e
            JOIN performance_reviews p ON p.employee_id = e.id
            WHERE e.hired_by = $1
            ORDER BY e.id, p.review_date DESC, p.id DESC
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        let stats = aggregate_performance(&rows);
        let stats_context = render_performance_context(&stats);

        let system_prompt = "You are an HR Data Analyst for HireHero. Analyze the provided performance metrics and review comments.\n\
Generate exactly 3 actionable insights in strict JSON format.\n\n\
You MUST generate exactly one insight for each of the following categories:\n\
1. A \"success\" insight: Highlight a high-performing department, positive trend, or praise.\n\
2. A \"warning\" insight: Highlight a low-performing area, risk, or negative sentiment.\n\
3. An \"info\" insight: A neutral observation about the data distribution or volume.\n\n\
The output must be a JSON list of objects with these keys:\n\
- \"title\": Short headline (e.g., \"Engineering Excelling\").\n\
- \"detail\": A 1-2 sentence explanation.\n\
- \"type\": The category (\"success\", \"warning\", or \"info\").\n\n\
Do not include markdown formatting.";

        let user_prompt = format!("Performance Data Analysis:\n{}", stats_context);

        let raw = self.llm.generate_text(system_prompt, &user_prompt).await?;
        Ok(parse_insights(&raw))
    }

    // --- Resume parsing ---

    pub async fn parse_resume(&self, filename: &str, data: &[u8]) -> Result<serde_json::Value> {
        let text = extract_resume_text(filename, data)?;
        if text.trim().is_empty() {
            return Err(Error::BadRequest(
                "Could not extract text from file.".to_string(),
            ));
        }

        let system_prompt = "You are a resume parsing engine. Extract structured data from the resume text as strict JSON.\n\
The JSON must have the following keys:\n\
- \"summary\": A short professional summary (string).\n\
- \"skills\": A list of skill strings.\n\
- \"experience\": A list of objects with \"title\", \"company\", \"start_date\", \"end_date\".\n\
- \"education\": A list of objects with \"degree\", \"institution\", \"start_date\", \"end_date\".\n\
- \"total_experience_years\": A number, or null if unclear.\n\
Do NOT include personally identifying information (name, email, phone, address) anywhere in the output.\n\
Do not include markdown formatting.";

        let user_prompt = format!("Resume Text:\n{}", text);

        let raw = self.llm.generate_text(system_prompt, &user_prompt).await?;
        serde_json::from_str(strip_code_fences(&raw))
            .map_err(|_| Error::Internal("Internal server error processing resume".to_string()))
    }
}

/// Builds the chat (system, user) prompt pair: role knowledge base, persona
/// line, and optional live database context from the intent router.
pub fn build_chat_prompts(user: &User, prompt: &str, action: &ChatAction) -> (String, String) {
    let (role_knowledge, role_persona) = match user.role.as_str() {
        "hr" => (KNOWLEDGE_BASE_HR, "HR Recruiter"),
        "candidate" => (KNOWLEDGE_BASE_CANDIDATE, "Job Seeker"),
        _ => ("", "User"),
    };

    let mut system_context = format!(
        "{}\n\n\
You are a helpful HR assistant named HireHero AI. The user, {}, is authenticated as a {}. \
Use the knowledge base above to answer procedural questions and to clarify system capabilities, strictly adhering to the user's role access.\n\
**CRITICAL INSTRUCTION: If data is provided below, use it to answer factual questions. For salary, preserve the exact formatting provided.**\n\n\
**If the user asks a question unrelated to the platform or employment (e.g., general knowledge, movies, history), politely decline and remind them of your focus.**",
        role_knowledge, user.first_name, role_persona,
    );

    let user_prompt = match action {
        ChatAction::WithData {
            context,
            prompt_extension,
        } => {
            system_context.push_str(&format!("\n\n--- LIVE DATABASE CONTEXT ---\n{}", context));
            prompt_extension.clone()
        }
        ChatAction::LlmOnly => prompt.to_string(),
    };

    (system_context, user_prompt)
}

pub fn parse_generated_jd(raw: &str) -> GeneratedJd {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).unwrap_or_else(|_| GeneratedJd {
        generated_description: raw.to_string(),
        generated_responsibilities: Vec::new(),
        generated_qualifications: Vec::new(),
    })
}

pub fn parse_interview_guide(raw: &str) -> InterviewGuide {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).unwrap_or_else(|_| InterviewGuide {
        job_title: "Role".to_string(),
        behavioral_questions: Vec::new(),
        technical_questions: Vec::new(),
        scoring_rubric: raw.to_string(),
    })
}

pub fn parse_feedback_summary(raw: &str) -> FeedbackSummary {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).unwrap_or_else(|_| FeedbackSummary {
        summary: raw.to_string(),
        strengths: vec!["Could not parse strengths.".to_string()],
        weaknesses: vec!["Could not parse weaknesses.".to_string()],
        recommendation: "Needs Discussion".to_string(),
    })
}

pub fn parse_mock_questions(raw: &str) -> Option<Vec<String>> {
    serde_json::from_str(strip_code_fences(raw)).ok()
}

pub fn fallback_mock_questions() -> Vec<String> {
    vec![
        "Tell me about yourself.".to_string(),
        "What is your greatest strength?".to_string(),
        "Describe a technical challenge you faced.".to_string(),
        "Why do you want to join us?".to_string(),
        "Where do you see yourself in 5 years?".to_string(),
    ]
}

pub fn parse_mock_evaluation(raw: &str) -> Option<MockEvaluation> {
    serde_json::from_str(strip_code_fences(raw)).ok()
}

pub fn parse_insights(raw: &str) -> Vec<Insight> {
    serde_json::from_str(strip_code_fences(raw)).unwrap_or_else(|_| {
        vec![Insight {
            title: "Analysis Error".to_string(),
            detail: "Could not generate insights.".to_string(),
            insight_type: "info".to_string(),
        }]
    })
}

fn extract_resume_text(filename: &str, data: &[u8]) -> Result<String> {
    if filename.to_lowercase().ends_with(".pdf") {
        pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::BadRequest(format!("Failed to parse PDF: {}", e)))
    } else {
        String::from_utf8(data.to_vec()).map_err(|_| {
            Error::BadRequest(
                "File format not supported. Please upload PDF or text file.".to_string(),
            )
        })
    }
}

/// One review row joined to its employee, ordered by employee then newest
/// review first. The ordering is what lets the rollup take the newest
/// comments per employee without re-sorting.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeReviewRow {
    pub employee_id: i64,
    pub department: Option<String>,
    pub rating: Option<i32>,
    pub comments: Option<String>,
    pub review_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceStats {
    pub global_avg: f64,
    pub dept_averages: Vec<(String, f64)>,
    pub recent_comments: Vec<String>,
}

/// Local numeric rollup handed to the generator as context, so the model
/// never does arithmetic: per-employee mean rating, per-department mean of
/// those, a global mean, and a bounded sample of recent comments.
pub fn aggregate_performance(rows: &[EmployeeReviewRow]) -> PerformanceStats {
    struct DeptAcc {
        sum: f64,
        count: usize,
    }

    let mut dept_order: Vec<String> = Vec::new();
    let mut dept_scores: std::collections::HashMap<String, DeptAcc> =
        std::collections::HashMap::new();
    let mut total_rating = 0.0;
    let mut rating_count = 0usize;
    let mut recent_comments: Vec<String> = Vec::new();

    let mut idx = 0;
    while idx < rows.len() {
        let employee_id = rows[idx].employee_id;
        let end = rows[idx..]
            .iter()
            .position(|r| r.employee_id != employee_id)
            .map(|p| idx + p)
            .unwrap_or(rows.len());
        let reviews = &rows[idx..end];
        idx = end;

        let dept = reviews[0]
            .department
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());

        let ratings: Vec<i32> = reviews.iter().filter_map(|r| r.rating).filter(|r| *r > 0).collect();
        if !ratings.is_empty() {
            let avg = ratings.iter().sum::<i32>() as f64 / ratings.len() as f64;
            let acc = dept_scores.entry(dept.clone()).or_insert_with(|| {
                dept_order.push(dept.clone());
                DeptAcc { sum: 0.0, count: 0 }
            });
            acc.sum += avg;
            acc.count += 1;
            total_rating += avg;
            rating_count += 1;
        }

        // Rows arrive newest-first per employee.
        for review in reviews
            .iter()
            .filter(|r| r.comments.as_deref().is_some_and(|c| !c.is_empty()))
            .take(COMMENTS_PER_EMPLOYEE)
        {
            recent_comments.push(format!(
                "[{}] {}",
                dept,
                review.comments.as_deref().unwrap_or_default()
            ));
        }
    }

    recent_comments.truncate(MAX_RECENT_COMMENTS);

    let dept_averages = dept_order
        .into_iter()
        .map(|dept| {
            let acc = &dept_scores[&dept];
            let avg = (acc.sum / acc.count as f64 * 10.0).round() / 10.0;
            (dept, avg)
        })
        .collect();

    let global_avg = if rating_count > 0 {
        (total_rating / rating_count as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    PerformanceStats {
        global_avg,
        dept_averages,
        recent_comments,
    }
}

pub fn render_performance_context(stats: &PerformanceStats) -> String {
    let dept_summary = stats
        .dept_averages
        .iter()
        .map(|(dept, avg)| format!("{}: {}", dept, avg))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Global Average Rating: {}/5.0\nDepartment Averages: {}\nRecent Review Sample:\n{}",
        stats.global_avg,
        dept_summary,
        stats.recent_comments.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::intent_service::ChatAction;

    fn user(role: &str) -> User {
        User {
            id: uuid::Uuid::nil(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            role: role.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn chat_prompts_select_role_knowledge_base() {
        let (system, _) = build_chat_prompts(&user("hr"), "hi", &ChatAction::LlmOnly);
        assert!(system.contains("HR Professionals"));
        assert!(system.contains("authenticated as a HR Recruiter"));

        let (system, _) = build_chat_prompts(&user("candidate"), "hi", &ChatAction::LlmOnly);
        assert!(system.contains("Job Seekers"));
        assert!(system.contains("authenticated as a Job Seeker"));
    }

    #[test]
    fn chat_prompts_inject_context_and_replace_user_prompt() {
        let action = ChatAction::WithData {
            context: "General Job Market Data:\n[]".to_string(),
            prompt_extension: "Answer from the data.".to_string(),
        };
        let (system, user_prompt) = build_chat_prompts(&user("candidate"), "original", &action);
        assert!(system.contains("--- LIVE DATABASE CONTEXT ---"));
        assert!(system.contains("General Job Market Data"));
        assert_eq!(user_prompt, "Answer from the data.");
    }

    #[test]
    fn chat_prompts_without_data_keep_original_prompt() {
        let (system, user_prompt) =
            build_chat_prompts(&user("candidate"), "original", &ChatAction::LlmOnly);
        assert!(!system.contains("LIVE DATABASE CONTEXT"));
        assert_eq!(user_prompt, "original");
    }

    #[test]
    fn fenced_jd_parses_same_as_unfenced() {
        let body = r#"{"generated_description": "A role.", "generated_responsibilities": ["Ship"], "generated_qualifications": ["Rust"]}"#;
        let fenced = format!("```json\n{}\n```", body);
        assert_eq!(parse_generated_jd(body), parse_generated_jd(&fenced));
        assert_eq!(parse_generated_jd(body).generated_description, "A role.");
    }

    #[test]
    fn unparseable_jd_falls_back_to_raw_text() {
        let raw = "Here is a lovely description with no JSON at all.";
        let jd = parse_generated_jd(raw);
        assert_eq!(jd.generated_description, raw);
        assert!(jd.generated_responsibilities.is_empty());
        assert!(jd.generated_qualifications.is_empty());
    }

    #[test]
    fn unparseable_guide_puts_raw_text_in_rubric() {
        let raw = "not json";
        let guide = parse_interview_guide(raw);
        assert_eq!(guide.job_title, "Role");
        assert!(guide.behavioral_questions.is_empty());
        assert_eq!(guide.scoring_rubric, raw);
    }

    #[test]
    fn unparseable_feedback_falls_back_with_raw_summary() {
        let summary = parse_feedback_summary("free text feedback");
        assert_eq!(summary.summary, "free text feedback");
        assert_eq!(summary.recommendation, "Needs Discussion");
    }

    #[test]
    fn mock_questions_fall_back_to_fixed_five() {
        assert_eq!(parse_mock_questions("not a list"), None);
        let fallback = fallback_mock_questions();
        assert_eq!(fallback.len(), 5);
        assert_eq!(fallback[0], "Tell me about yourself.");
    }

    #[test]
    fn mock_questions_parse_fenced_list() {
        let raw = "```json\n[\"Q1\", \"Q2\"]\n```";
        assert_eq!(
            parse_mock_questions(raw),
            Some(vec!["Q1".to_string(), "Q2".to_string()])
        );
    }

    #[test]
    fn mock_evaluation_has_no_fallback() {
        assert!(parse_mock_evaluation("garbage").is_none());
        let raw = r#"{"overall_score": 7, "overall_feedback": "Solid.", "question_evaluations": [{"question": "Q1", "rating": 7, "feedback": "Good."}]}"#;
        let eval = parse_mock_evaluation(raw).unwrap();
        assert_eq!(eval.overall_score, 7);
        assert_eq!(eval.question_evaluations.len(), 1);
    }

    #[test]
    fn unparseable_insights_degrade_to_single_info_object() {
        let insights = parse_insights("oops");
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Analysis Error");
        assert_eq!(insights[0].insight_type, "info");
    }

    fn review(
        employee_id: i64,
        dept: &str,
        rating: Option<i32>,
        comments: Option<&str>,
        day: u32,
    ) -> EmployeeReviewRow {
        EmployeeReviewRow {
            employee_id,
            department: Some(dept.to_string()),
            rating,
            comments: comments.map(|c| c.to_string()),
            review_date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        }
    }

    #[test]
    fn aggregation_computes_department_and_global_means() {
        // Employee 1 (Engineering): avg 4.0; employee 2 (Engineering): 3.0;
        // employee 3 (Sales): 5.0.
        let rows = vec![
            review(1, "Engineering", Some(5), Some("Great quarter"), 20),
            review(1, "Engineering", Some(3), None, 10),
            review(2, "Engineering", Some(3), Some("Steady"), 15),
            review(3, "Sales", Some(5), Some("Top seller"), 12),
        ];
        let stats = aggregate_performance(&rows);
        assert_eq!(stats.global_avg, 4.0);
        assert_eq!(
            stats.dept_averages,
            vec![("Engineering".to_string(), 3.5), ("Sales".to_string(), 5.0)]
        );
        assert_eq!(
            stats.recent_comments,
            vec![
                "[Engineering] Great quarter".to_string(),
                "[Engineering] Steady".to_string(),
                "[Sales] Top seller".to_string(),
            ]
        );
    }

    #[test]
    fn aggregation_caps_comments_per_employee_and_overall() {
        // One employee with four commented reviews, newest first.
        let rows = vec![
            review(1, "Support", Some(4), Some("newest"), 28),
            review(1, "Support", Some(4), Some("second"), 21),
            review(1, "Support", Some(4), Some("third"), 14),
            review(1, "Support", Some(4), Some("oldest"), 7),
        ];
        let stats = aggregate_performance(&rows);
        assert_eq!(
            stats.recent_comments,
            vec!["[Support] newest".to_string(), "[Support] second".to_string()]
        );

        // Fifteen-comment overall cap across many employees.
        let mut many = Vec::new();
        for emp in 0..20 {
            many.push(review(emp, "Ops", Some(3), Some("fine"), 10));
        }
        let stats = aggregate_performance(&many);
        assert_eq!(stats.recent_comments.len(), MAX_RECENT_COMMENTS);
    }

    #[test]
    fn comment_sampling_skips_uncommented_reviews_before_capping() {
        // The per-employee cap applies to non-empty comments, so an
        // uncommented newest review does not use up a slot.
        let rows = vec![
            review(1, "Support", Some(4), None, 28),
            review(1, "Support", Some(4), Some("older but commented"), 21),
            review(1, "Support", Some(4), Some("oldest commented"), 14),
        ];
        let stats = aggregate_performance(&rows);
        assert_eq!(
            stats.recent_comments,
            vec![
                "[Support] older but commented".to_string(),
                "[Support] oldest commented".to_string(),
            ]
        );
    }

    #[test]
    fn aggregation_skips_unrated_employees_in_means() {
        let rows = vec![
            review(1, "Engineering", None, Some("No rating yet"), 10),
            review(2, "Engineering", Some(4), None, 10),
        ];
        let stats = aggregate_performance(&rows);
        assert_eq!(stats.global_avg, 4.0);
        assert_eq!(stats.dept_averages, vec![("Engineering".to_string(), 4.0)]);
        // Comment still sampled even without a rating.
        assert_eq!(stats.recent_comments, vec!["[Engineering] No rating yet".to_string()]);
    }

    #[test]
    fn empty_rollup_renders_zero_global() {
        let stats = aggregate_performance(&[]);
        assert_eq!(stats.global_avg, 0.0);
        let context = render_performance_context(&stats);
        assert!(context.starts_with("Global Average Rating: 0/5.0"));
    }
}
