//! Intent routing for the chat assistant: decides which slice of stored data
//! (if any) gets injected into the generation prompt.
//!
//! Classification is an ordered cascade of role-gated keyword rules, matched
//! by plain case-insensitive substring containment. Short triggers like
//! "all" or "pay" can fire inside unrelated words; that is the shipped
//! product behavior and is kept as-is.

use crate::error::Result;
use crate::models::job::Job;
use crate::models::profile::{Education, Experience, Profile};
use crate::models::user::User;
use crate::utils::salary::format_salary;
use crate::utils::text::snippet;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// Job descriptions injected into fit-analysis context are cut at this many
/// characters. The bound is inherited, not derived from any provider limit.
pub const JOB_DESCRIPTION_SNIPPET_LEN: usize = 600;

const HR_EMPLOYEE_KEYWORDS: &[&str] = &[
    "employees",
    "my employees",
    "hired",
    "team",
    "staff",
    "people i manage",
    "work for me",
];

const HR_POSTED_JOB_KEYWORDS: &[&str] = &[
    "jobs",
    "my jobs",
    "posted jobs",
    "listings",
    "positions i created",
    "my openings",
];

const FIT_KEYWORDS: &[&str] = &[
    "should i apply",
    "am i a fit",
    "good fit",
    "match",
    "qualified",
    "chance",
    "suitability",
];

const INTERVIEW_KEYWORDS: &[&str] = &["interview", "schedule", "meeting", "when", "upcoming"];

const APPLICATION_KEYWORDS: &[&str] =
    &["application", "status", "applied", "my jobs", "track", "update on"];

const MARKET_DATA_KEYWORDS: &[&str] = &[
    "salary",
    "compensation",
    "pay",
    "location",
    "jobs",
    "list",
    "average",
    "range",
    "companies",
    "all",
    "hiring",
];

const MARKET_CONTEXT_KEYWORDS: &[&str] = &[
    "job", "role", "position", "company", "developer", "manager", "engineer", "analyst",
];

/// Outcome of routing a chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    /// No data injection; the generator answers from its own knowledge.
    LlmOnly,
    /// Inject `context` into the system prompt and replace the user prompt
    /// with `prompt_extension`.
    WithData {
        context: String,
        prompt_extension: String,
    },
}

/// A rule of the cascade that matched the prompt. The order of the returned
/// list is the resolution order; the first rule that produces data wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    HrEmployees,
    HrPostedJobs,
    CandidateFit,
    CandidateInterviews,
    CandidateApplications,
    JobMarket,
}

fn contains_any(prompt_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| prompt_lower.contains(k))
}

/// Pure classification step: which cascade rules fire for this role+prompt,
/// in resolution order. Fetching and context assembly happen later, so the
/// short-circuit order stays independently testable.
pub fn matched_intents(role: &str, prompt: &str) -> Vec<Intent> {
    let prompt_lower = prompt.to_lowercase();
    let mut intents = Vec::new();

    if role == "hr" {
        if contains_any(&prompt_lower, HR_EMPLOYEE_KEYWORDS) {
            intents.push(Intent::HrEmployees);
        }
        if contains_any(&prompt_lower, HR_POSTED_JOB_KEYWORDS) {
            intents.push(Intent::HrPostedJobs);
        }
    } else if role == "candidate" {
        if contains_any(&prompt_lower, FIT_KEYWORDS) {
            intents.push(Intent::CandidateFit);
        }
        if contains_any(&prompt_lower, INTERVIEW_KEYWORDS) {
            intents.push(Intent::CandidateInterviews);
        }
        if contains_any(&prompt_lower, APPLICATION_KEYWORDS) {
            intents.push(Intent::CandidateApplications);
        }
    }

    if contains_any(&prompt_lower, MARKET_DATA_KEYWORDS)
        && contains_any(&prompt_lower, MARKET_CONTEXT_KEYWORDS)
    {
        intents.push(Intent::JobMarket);
    }

    intents
}

/// Scans distinct job titles longest-first and returns the first one
/// contained in the prompt, so "Senior Software Engineer" wins over its
/// substring "Software Engineer".
pub fn match_job_title(titles: &[String], prompt: &str) -> Option<String> {
    let prompt_lower = prompt.to_lowercase();
    let mut sorted: Vec<&String> = titles.iter().collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    sorted
        .into_iter()
        .find(|t| prompt_lower.contains(&t.to_lowercase()))
        .cloned()
}

#[derive(Debug, Clone, FromRow)]
pub struct EmployeeContextRow {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub job_location: Option<String>,
    pub salary: Option<String>,
    pub employment_type: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PostedJobRow {
    pub title: String,
    pub company: String,
    pub created_at: DateTime<Utc>,
    pub applicant_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct InterviewContextRow {
    pub job_title: String,
    pub company: String,
    pub stage: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub location_type: Option<String>,
    pub location_detail: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationContextRow {
    pub job_title: String,
    pub company: String,
    pub status: String,
    pub applied_at: Option<DateTime<Utc>>,
}

/// A candidate's profile with its child records, as handed to the context
/// builders.
#[derive(Debug, Clone)]
pub struct ProfileContext {
    pub summary: Option<String>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn build_employee_action(rows: &[EmployeeContextRow], prompt: &str) -> ChatAction {
    let emp_data: Vec<serde_json::Value> = rows
        .iter()
        .map(|emp| {
            let name = match (&emp.first_name, &emp.last_name) {
                (Some(first), Some(last)) => format!("{} {}", first, last),
                _ => "Unknown User".to_string(),
            };
            serde_json::json!({
                "name": name,
                "role": emp.job_title,
                "department": emp.department,
                "location": emp.job_location,
                "salary": format_salary(emp.salary.as_deref(), emp.employment_type.as_deref()),
            })
        })
        .collect();

    ChatAction::WithData {
        context: format!(
            "HR's Employee Team Data:\n{}",
            pretty_json(&serde_json::Value::Array(emp_data))
        ),
        prompt_extension: format!(
            "Based on the Employee Data below, answer the HR's query: '{}'. Summarize the team details clearly.",
            prompt
        ),
    }
}

pub fn build_posted_jobs_action(rows: &[PostedJobRow], prompt: &str) -> ChatAction {
    let job_list: Vec<serde_json::Value> = rows
        .iter()
        .map(|job| {
            serde_json::json!({
                "title": job.title,
                "company": job.company,
                "created_at": job.created_at.format("%Y-%m-%d").to_string(),
                "applicant_count": job.applicant_count,
                "status": "Active",
            })
        })
        .collect();

    ChatAction::WithData {
        context: format!(
            "HR's Posted Jobs Data:\n{}",
            pretty_json(&serde_json::Value::Array(job_list))
        ),
        prompt_extension: format!(
            "Based on the Job Postings below, answer the HR's query: '{}'. Provide an overview of their active listings and applicant traction.",
            prompt
        ),
    }
}

fn profile_summary_block(profile: &ProfileContext) -> String {
    let edu_list: Vec<String> = if profile.education.is_empty() {
        vec!["Not listed".to_string()]
    } else {
        profile
            .education
            .iter()
            .map(|e| {
                format!(
                    "{} at {} ({} - {})",
                    e.degree,
                    e.institution,
                    e.start_date.as_deref().unwrap_or(""),
                    e.end_date.as_deref().unwrap_or("Present"),
                )
            })
            .collect()
    };
    let exp_list: Vec<String> = if profile.experience.is_empty() {
        vec!["Not listed".to_string()]
    } else {
        profile
            .experience
            .iter()
            .map(|e| {
                format!(
                    "{} at {} ({} - {})",
                    e.title,
                    e.company,
                    e.start_date.as_deref().unwrap_or(""),
                    e.end_date.as_deref().unwrap_or("Present"),
                )
            })
            .collect()
    };

    format!(
        "- Summary: {}\n- Education: {}\n- Experience: {}",
        profile.summary.as_deref().unwrap_or("None"),
        edu_list.join(", "),
        exp_list.join("; "),
    )
}

pub fn build_fit_action(job: &Job, profile: Option<&ProfileContext>, prompt: &str) -> ChatAction {
    match profile {
        Some(profile) => {
            let job_details = format!(
                "- Role: {}\n- Required Skills: {}\n- Education Level: {}\n- Experience Level: {}\n- Description: {}",
                job.title,
                job.tags.as_deref().unwrap_or(""),
                job.education.as_deref().unwrap_or(""),
                job.experience_level.as_deref().unwrap_or(""),
                snippet(&job.description, JOB_DESCRIPTION_SNIPPET_LEN),
            );
            ChatAction::WithData {
                context: format!(
                    "Candidate Profile:\n{}\n\nTarget Job Details:\n{}",
                    profile_summary_block(profile),
                    job_details
                ),
                prompt_extension: format!(
                    "Act as a Career Coach. Compare the Candidate Profile with the Target Job Details. Answer the user's question: '{}' strictly based on the data provided. Highlight matching skills and any missing requirements.",
                    prompt
                ),
            }
        }
        None => ChatAction::WithData {
            context: "User found the job but has no profile data (Education/Experience) entered in the system.".to_string(),
            prompt_extension: "The user is asking for advice, but their profile is empty. Politely inform them that you need them to update their Profile (Education, Experience, Skills) in the 'Profile' tab before you can analyze their fit for this role.".to_string(),
        },
    }
}

pub fn build_recommendation_action(
    jobs: &[Job],
    profile: Option<&ProfileContext>,
    prompt: &str,
) -> ChatAction {
    let jobs_summary: Vec<String> = jobs
        .iter()
        .map(|j| {
            format!(
                "- {} at {} (Skills: {}, Level: {})",
                j.title,
                j.company,
                j.tags.as_deref().unwrap_or(""),
                j.experience_level.as_deref().unwrap_or(""),
            )
        })
        .collect();

    let profile_block = match profile {
        Some(p) => profile_summary_block(p),
        None => "No profile on file.".to_string(),
    };

    ChatAction::WithData {
        context: format!(
            "Candidate Profile:\n{}\n\nAvailable Jobs List:\n{}",
            profile_block,
            jobs_summary.join("\n")
        ),
        prompt_extension: format!(
            "Act as a Career Advisor. The user is asking for job recommendations ('{}'). Based on their Profile and the Available Jobs List provided above, recommend the top 3 roles they are best suited for and explain why.",
            prompt
        ),
    }
}

pub fn build_interviews_action(rows: &[InterviewContextRow], prompt: &str) -> ChatAction {
    let inv_data: Vec<serde_json::Value> = rows
        .iter()
        .map(|inv| {
            serde_json::json!({
                "job_role": inv.job_title,
                "company": inv.company,
                "stage": inv.stage,
                "date_time": inv.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
                "type": inv.location_type,
                "link_or_location": inv.location_detail,
            })
        })
        .collect();

    ChatAction::WithData {
        context: format!(
            "User's Scheduled Interviews:\n{}",
            pretty_json(&serde_json::Value::Array(inv_data))
        ),
        prompt_extension: format!(
            "Based on the Interview Schedule below, answer the user's query: '{}'. Provide details on dates, times, and meeting links if requested.",
            prompt
        ),
    }
}

pub fn build_applications_action(rows: &[ApplicationContextRow], prompt: &str) -> ChatAction {
    let app_data: Vec<serde_json::Value> = rows
        .iter()
        .map(|app| {
            serde_json::json!({
                "job_title": app.job_title,
                "company": app.company,
                "status": app.status,
                "applied_date": app
                    .applied_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            })
        })
        .collect();

    ChatAction::WithData {
        context: format!(
            "User's Application History:\n{}",
            pretty_json(&serde_json::Value::Array(app_data))
        ),
        prompt_extension: format!(
            "Based on the Application History below, answer: '{}'. Give specific status updates.",
            prompt
        ),
    }
}

pub fn build_market_action(jobs: &[Job], prompt: &str) -> ChatAction {
    let job_data: Vec<serde_json::Value> = jobs
        .iter()
        .map(|job| {
            serde_json::json!({
                "title": job.title,
                "company": job.company,
                "salary": format_salary(job.salary.as_deref(), job.employment_type.as_deref()),
                "type": job.employment_type,
                "location": job.location,
            })
        })
        .collect();

    ChatAction::WithData {
        context: format!(
            "General Job Market Data:\n{}",
            pretty_json(&serde_json::Value::Array(job_data))
        ),
        prompt_extension: format!(
            "Based on the Job Market Data below, answer: '{}'. Use the provided salary formats.",
            prompt
        ),
    }
}

#[derive(Clone)]
pub struct IntentService {
    pool: PgPool,
}

impl IntentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Routes a chat prompt: runs the classification cascade, then resolves
    /// each matched rule in order against live data. A rule that finds no
    /// rows yields to the next; the fit rule can terminate the cascade
    /// outright (zero jobs system-wide means there is nothing to inject).
    pub async fn handle_data_query(&self, user: &User, prompt: &str) -> Result<ChatAction> {
        for intent in matched_intents(&user.role, prompt) {
            let resolved = match intent {
                Intent::HrEmployees => self.resolve_employees(user, prompt).await?,
                Intent::HrPostedJobs => self.resolve_posted_jobs(user, prompt).await?,
                Intent::CandidateFit => self.resolve_fit(user, prompt).await?,
                Intent::CandidateInterviews => self.resolve_interviews(user, prompt).await?,
                Intent::CandidateApplications => self.resolve_applications(user, prompt).await?,
                Intent::JobMarket => self.resolve_market(prompt).await?,
            };
            if let Some(action) = resolved {
                return Ok(action);
            }
        }
        Ok(ChatAction::LlmOnly)
    }

    async fn resolve_employees(&self, user: &User, prompt: &str) -> Result<Option<ChatAction>> {
        let rows = sqlx::query_as::<_, EmployeeContextRow>(
            r#"
            SELECT u.first_name, u.last_name, e.job_title, e.department, e.job_location,
                   e.salary, e.employment_type
            FROM employees e
            LEFT JOIN users u ON u.id = e.user_id
            WHERE e.hired_by = $1
            ORDER BY e.id
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(build_employee_action(&rows, prompt)))
    }

    async fn resolve_posted_jobs(&self, user: &User, prompt: &str) -> Result<Option<ChatAction>> {
        let rows = sqlx::query_as::<_, PostedJobRow>(
            r#"
            SELECT j.title, j.company, j.created_at, COUNT(a.id) AS applicant_count
            FROM jobs j
            LEFT JOIN applications a ON a.job_id = j.id
            WHERE j.posted_by = $1
            GROUP BY j.id, j.title, j.company, j.created_at
            ORDER BY j.id
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(build_posted_jobs_action(&rows, prompt)))
    }

    async fn resolve_fit(&self, user: &User, prompt: &str) -> Result<Option<ChatAction>> {
        let titles: Vec<String> = sqlx::query_scalar("SELECT DISTINCT title FROM jobs")
            .fetch_all(&self.pool)
            .await?;

        if let Some(title) = match_job_title(&titles, prompt) {
            let job = sqlx::query_as::<_, Job>(
                r#"
                SELECT id, title, company, description, tags, salary, employment_type,
                       location, education, experience_level, posted_by, created_at
                FROM jobs
                WHERE title = $1
                LIMIT 1
                "#,
            )
            .bind(&title)
            .fetch_optional(&self.pool)
            .await?;

            let Some(job) = job else {
                // Title list and job row disagree (row deleted between the
                // two reads); fall through to the next rule.
                return Ok(None);
            };

            let profile = self.load_profile(user).await?;
            return Ok(Some(build_fit_action(&job, profile.as_ref(), prompt)));
        }

        // General "what should I apply for" query.
        let jobs = self.load_all_jobs().await?;
        if jobs.is_empty() {
            // Nothing to recommend; terminate the cascade without data.
            return Ok(Some(ChatAction::LlmOnly));
        }
        let profile = self.load_profile(user).await?;
        Ok(Some(build_recommendation_action(&jobs, profile.as_ref(), prompt)))
    }

    async fn resolve_interviews(&self, user: &User, prompt: &str) -> Result<Option<ChatAction>> {
        let rows = sqlx::query_as::<_, InterviewContextRow>(
            r#"
            SELECT j.title AS job_title, j.company, i.stage, i.scheduled_at,
                   i.location_type, i.location_detail
            FROM interviews i
            JOIN applications a ON a.id = i.application_id
            JOIN jobs j ON j.id = a.job_id
            WHERE a.user_id = $1
            ORDER BY i.scheduled_at ASC
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(build_interviews_action(&rows, prompt)))
    }

    async fn resolve_applications(&self, user: &User, prompt: &str) -> Result<Option<ChatAction>> {
        let rows = sqlx::query_as::<_, ApplicationContextRow>(
            r#"
            SELECT j.title AS job_title, j.company, a.status, a.applied_at
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.user_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(build_applications_action(&rows, prompt)))
    }

    async fn resolve_market(&self, prompt: &str) -> Result<Option<ChatAction>> {
        let jobs = self.load_all_jobs().await?;
        if jobs.is_empty() {
            return Ok(None);
        }
        Ok(Some(build_market_action(&jobs, prompt)))
    }

    async fn load_all_jobs(&self) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, description, tags, salary, employment_type,
                   location, education, experience_level, posted_by, created_at
            FROM jobs
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn load_profile(&self, user: &User) -> Result<Option<ProfileContext>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, summary FROM profiles WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(profile) = profile else {
            return Ok(None);
        };

        let education = sqlx::query_as::<_, Education>(
            r#"
            SELECT id, profile_id, degree, institution, start_date, end_date
            FROM educations
            WHERE profile_id = $1
            ORDER BY id
            "#,
        )
        .bind(profile.id)
        .fetch_all(&self.pool)
        .await?;

        let experience = sqlx::query_as::<_, Experience>(
            r#"
            SELECT id, profile_id, title, company, start_date, end_date
            FROM experiences
            WHERE profile_id = $1
            ORDER BY id
            "#,
        )
        .bind(profile.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ProfileContext {
            summary: profile.summary,
            education,
            experience,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn job(title: &str, company: &str) -> Job {
        Job {
            id: 1,
            title: title.to_string(),
            company: company.to_string(),
            description: "Build and ship backend services.".to_string(),
            tags: Some("Rust, SQL".to_string()),
            salary: Some("1200000".to_string()),
            employment_type: Some("full-time".to_string()),
            location: Some("Bengaluru".to_string()),
            education: Some("Bachelor's".to_string()),
            experience_level: Some("Senior".to_string()),
            posted_by: Uuid::nil(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn hr_team_prompt_matches_employee_intent_first() {
        let intents = matched_intents("hr", "show my team");
        assert_eq!(intents.first(), Some(&Intent::HrEmployees));
    }

    #[test]
    fn hr_rules_do_not_fire_for_candidates() {
        let intents = matched_intents("candidate", "show my team");
        assert!(!intents.contains(&Intent::HrEmployees));
    }

    #[test]
    fn candidate_fit_prompt_matches_fit_intent() {
        let intents = matched_intents("candidate", "am I a good fit for Senior Engineer");
        assert_eq!(intents.first(), Some(&Intent::CandidateFit));
    }

    #[test]
    fn market_rule_fires_for_any_role() {
        let prompt = "what's the salary for Software Engineer roles";
        assert!(matched_intents("hr", prompt).contains(&Intent::JobMarket));
        assert!(matched_intents("candidate", prompt).contains(&Intent::JobMarket));
        assert!(matched_intents("", prompt).contains(&Intent::JobMarket));
    }

    #[test]
    fn market_rule_needs_both_keyword_families() {
        // "salary" alone is a data keyword without a role-context keyword.
        assert!(matched_intents("", "what about salary").is_empty());
        // "engineer" alone is context without data.
        assert!(matched_intents("", "I met an engineer").is_empty());
    }

    #[test]
    fn short_keywords_substring_match_by_design() {
        // "all" inside "tall" plus "role" still fires the market rule.
        assert!(matched_intents("", "tall tales about my role").contains(&Intent::JobMarket));
    }

    #[test]
    fn unmatched_prompt_yields_no_intents() {
        assert!(matched_intents("candidate", "hello there").is_empty());
    }

    #[test]
    fn longest_title_wins() {
        let titles = vec!["Engineer".to_string(), "Senior Engineer".to_string()];
        let matched = match_job_title(&titles, "am I fit for Senior Engineer");
        assert_eq!(matched.as_deref(), Some("Senior Engineer"));
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let titles = vec!["Software Engineer".to_string()];
        let matched = match_job_title(&titles, "should i apply to the software engineer opening?");
        assert_eq!(matched.as_deref(), Some("Software Engineer"));
    }

    #[test]
    fn no_title_match_returns_none() {
        let titles = vec!["Data Analyst".to_string()];
        assert_eq!(match_job_title(&titles, "what should I apply for?"), None);
    }

    #[test]
    fn employee_context_carries_names_and_formatted_salaries() {
        let rows = vec![EmployeeContextRow {
            first_name: Some("Priya".to_string()),
            last_name: Some("Sharma".to_string()),
            job_title: Some("Backend Developer".to_string()),
            department: Some("Engineering".to_string()),
            job_location: Some("Remote".to_string()),
            salary: Some("150000".to_string()),
            employment_type: Some("full-time".to_string()),
        }];
        let action = build_employee_action(&rows, "show my team");
        let ChatAction::WithData { context, prompt_extension } = action else {
            panic!("expected data injection");
        };
        assert!(context.starts_with("HR's Employee Team Data:"));
        assert!(context.contains("Priya Sharma"));
        assert!(context.contains("₹1.5L per annum"));
        assert!(prompt_extension.contains("show my team"));
    }

    #[test]
    fn employee_without_user_row_is_unknown() {
        let rows = vec![EmployeeContextRow {
            first_name: None,
            last_name: None,
            job_title: None,
            department: None,
            job_location: None,
            salary: None,
            employment_type: None,
        }];
        let ChatAction::WithData { context, .. } = build_employee_action(&rows, "team") else {
            panic!("expected data injection");
        };
        assert!(context.contains("Unknown User"));
        assert!(context.contains("Not specified"));
    }

    #[test]
    fn fit_without_profile_uses_empty_profile_variant() {
        let job = job("Senior Software Engineer", "Acme");
        let action = build_fit_action(&job, None, "am I a good fit for Senior Software Engineer");
        let ChatAction::WithData { context, prompt_extension } = action else {
            panic!("expected data injection");
        };
        assert!(context.contains("no profile data"));
        assert!(!context.contains("Target Job Details"));
        assert!(prompt_extension.contains("update their Profile"));
    }

    #[test]
    fn fit_with_profile_compares_profile_and_job() {
        let job = job("Senior Software Engineer", "Acme");
        let profile = ProfileContext {
            summary: Some("Five years of backend work.".to_string()),
            education: vec![],
            experience: vec![],
        };
        let action = build_fit_action(&job, Some(&profile), "am I a fit?");
        let ChatAction::WithData { context, .. } = action else {
            panic!("expected data injection");
        };
        assert!(context.contains("Candidate Profile:"));
        assert!(context.contains("Five years of backend work."));
        assert!(context.contains("Target Job Details:"));
        assert!(context.contains("- Role: Senior Software Engineer"));
        assert!(context.contains("- Education: Not listed"));
    }

    #[test]
    fn market_context_lists_jobs_with_formatted_salary() {
        let jobs = vec![job("Software Engineer", "Acme")];
        let action = build_market_action(&jobs, "what's the salary for Software Engineer roles");
        let ChatAction::WithData { context, .. } = action else {
            panic!("expected data injection");
        };
        assert!(context.starts_with("General Job Market Data:"));
        assert!(context.contains("₹12.0L per annum"));
    }

    #[test]
    fn builders_are_deterministic() {
        let jobs = vec![job("Software Engineer", "Acme"), job("Data Analyst", "Beta")];
        let a = build_market_action(&jobs, "list all jobs");
        let b = build_market_action(&jobs, "list all jobs");
        assert_eq!(a, b);
    }

    #[test]
    fn application_rows_render_status_and_date() {
        let rows = vec![ApplicationContextRow {
            job_title: "Software Engineer".to_string(),
            company: "Acme".to_string(),
            status: "interviewing".to_string(),
            applied_at: Some(Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap()),
        }];
        let ChatAction::WithData { context, .. } =
            build_applications_action(&rows, "any update on my application?")
        else {
            panic!("expected data injection");
        };
        assert!(context.contains("\"status\": \"interviewing\""));
        assert!(context.contains("\"applied_date\": \"2024-04-02\""));
    }

    #[test]
    fn interview_rows_render_schedule() {
        let rows = vec![InterviewContextRow {
            job_title: "Software Engineer".to_string(),
            company: "Acme".to_string(),
            stage: Some("technical".to_string()),
            scheduled_at: Utc.with_ymd_and_hms(2024, 5, 6, 14, 30, 0).unwrap(),
            location_type: Some("video".to_string()),
            location_detail: Some("https://meet.example/abc".to_string()),
        }];
        let ChatAction::WithData { context, .. } =
            build_interviews_action(&rows, "when is my interview?")
        else {
            panic!("expected data injection");
        };
        assert!(context.contains("2024-05-06 14:30"));
        assert!(context.contains("https://meet.example/abc"));
    }
}
