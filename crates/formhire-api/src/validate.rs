//! Request validation and normalisation for job and application writes.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use formhire_db::models::{JobFields, NewAnswer, NewApplication, NewQuestion};
use formhire_types::api::{JobDetail, JobFieldsRequest, QuestionInput, SubmitApplicationRequest};
use formhire_types::models::{JobQuestion, QuestionType, User};

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_COMPANY: &str = "FormHire";
pub const DEFAULT_EMPLOYMENT_TYPE: &str = "full-time";
pub const DEFAULT_EXPERIENCE_LEVEL: &str = "mid";

/// Vocabulary offered as listing filters. Defaults are drawn from it so a
/// listed option always matches jobs created without an explicit value.
pub const EMPLOYMENT_TYPES: &[&str] = &["full-time", "part-time", "contract", "freelance", "internship"];
pub const EXPERIENCE_LEVELS: &[&str] = &["entry", "mid", "senior", "executive"];

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn missing_fields(missing: &[&str]) -> ApiError {
    ApiError::validation(format!("Missing required fields: {}", missing.join(", ")))
}

/// Resolve the top-level job fields of a create or full replace. Omitted
/// optional fields take their defaults, never prior values.
pub fn job_fields(req: &JobFieldsRequest) -> ApiResult<JobFields> {
    let required = [
        ("title", &req.title),
        ("description", &req.description),
        ("requirements", &req.requirements),
        ("department", &req.department),
        ("location", &req.location),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, v)| trimmed(v).is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }

    Ok(JobFields {
        title: trimmed(&req.title).unwrap_or_default(),
        description: trimmed(&req.description).unwrap_or_default(),
        requirements: trimmed(&req.requirements).unwrap_or_default(),
        department: trimmed(&req.department).unwrap_or_default(),
        location: trimmed(&req.location).unwrap_or_default(),
        salary: trimmed(&req.salary),
        employment_type: trimmed(&req.employment_type)
            .unwrap_or_else(|| DEFAULT_EMPLOYMENT_TYPE.to_string()),
        experience_level: trimmed(&req.experience_level)
            .unwrap_or_else(|| DEFAULT_EXPERIENCE_LEVEL.to_string()),
        skills: req.skills.as_deref().map(clean_list).unwrap_or_default(),
        benefits: req.benefits.as_deref().map(clean_list).unwrap_or_default(),
        company_name: trimmed(&req.company_name).unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
        company_logo: trimmed(&req.company_logo),
        company_website: trimmed(&req.company_website),
        company_size: trimmed(&req.company_size),
        resume_required: req.resume_required.unwrap_or(true),
        featured: req.featured.unwrap_or(false),
        is_active: req.is_active.unwrap_or(true),
    })
}

/// Merge a partial update over the stored fields. Supplied required
/// fields must still be non-blank; a blank optional clears it.
pub fn merge_job_fields(current: &JobFields, req: &JobFieldsRequest) -> ApiResult<JobFields> {
    let mut missing = Vec::new();
    let mut required = |name: &'static str, value: &Option<String>, stored: &String| {
        match value {
            None => stored.clone(),
            Some(v) if v.trim().is_empty() => {
                missing.push(name);
                stored.clone()
            }
            Some(v) => v.trim().to_string(),
        }
    };

    let title = required("title", &req.title, &current.title);
    let description = required("description", &req.description, &current.description);
    let requirements = required("requirements", &req.requirements, &current.requirements);
    let department = required("department", &req.department, &current.department);
    let location = required("location", &req.location, &current.location);
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }

    let optional = |value: &Option<String>, stored: &Option<String>| match value {
        None => stored.clone(),
        Some(_) => trimmed(value),
    };
    let with_default = |value: &Option<String>, stored: &String, default: &str| match value {
        None => stored.clone(),
        Some(_) => trimmed(value).unwrap_or_else(|| default.to_string()),
    };

    Ok(JobFields {
        title,
        description,
        requirements,
        department,
        location,
        salary: optional(&req.salary, &current.salary),
        employment_type: with_default(
            &req.employment_type,
            &current.employment_type,
            DEFAULT_EMPLOYMENT_TYPE,
        ),
        experience_level: with_default(
            &req.experience_level,
            &current.experience_level,
            DEFAULT_EXPERIENCE_LEVEL,
        ),
        skills: req
            .skills
            .as_deref()
            .map(clean_list)
            .unwrap_or_else(|| current.skills.clone()),
        benefits: req
            .benefits
            .as_deref()
            .map(clean_list)
            .unwrap_or_else(|| current.benefits.clone()),
        company_name: with_default(&req.company_name, &current.company_name, DEFAULT_COMPANY),
        company_logo: optional(&req.company_logo, &current.company_logo),
        company_website: optional(&req.company_website, &current.company_website),
        company_size: optional(&req.company_size, &current.company_size),
        resume_required: req.resume_required.unwrap_or(current.resume_required),
        featured: req.featured.unwrap_or(current.featured),
        is_active: req.is_active.unwrap_or(current.is_active),
    })
}

/// Validate a replacement question set. Positions are 1-based in messages.
pub fn questions(inputs: &[QuestionInput]) -> ApiResult<Vec<NewQuestion>> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let position = i + 1;
            let question = input.question.trim();
            if question.is_empty() {
                return Err(ApiError::validation(format!(
                    "Question {} text is required",
                    position
                )));
            }

            let question_type = match input.question_type.as_deref().map(str::trim) {
                None | Some("") => QuestionType::Text,
                Some(raw) => raw.parse().map_err(|_| {
                    ApiError::validation(format!("Question {} has an invalid type: {}", position, raw))
                })?,
            };

            let options = if question_type.is_choice() {
                let options = clean_list(&input.options);
                if options.is_empty() {
                    return Err(ApiError::validation(format!(
                        "Question {} needs at least one option",
                        position
                    )));
                }
                options
            } else {
                Vec::new()
            };

            Ok(NewQuestion {
                question: question.to_string(),
                question_type,
                required: input.required,
                options,
                placeholder: trimmed(&input.placeholder),
            })
        })
        .collect()
}

/// Check an application payload against the job and build the insert.
pub fn application(
    req: &SubmitApplicationRequest,
    job: &JobDetail,
    user: &User,
) -> ApiResult<NewApplication> {
    let required = [
        ("phoneNumber", &req.phone_number),
        ("whyInterested", &req.why_interested),
        ("relevantExperience", &req.relevant_experience),
        ("workAuthorization", &req.work_authorization),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, v)| trimmed(v).is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }

    let resume_url = trimmed(&req.resume_url);
    if job.job.resume_required && resume_url.is_none() {
        return Err(ApiError::validation("Resume is required for this position"));
    }

    let answers = answers(req, &job.questions)?;

    let applicant_name = if user.name.trim().is_empty() {
        user.email.clone()
    } else {
        user.name.trim().to_string()
    };

    Ok(NewApplication {
        job_id: job.job.id,
        user_id: user.id,
        applicant_name,
        applicant_email: user.email.clone(),
        resume_url,
        phone_number: trimmed(&req.phone_number).unwrap_or_default(),
        linkedin_url: trimmed(&req.linkedin_url),
        portfolio_url: trimmed(&req.portfolio_url),
        why_interested: trimmed(&req.why_interested).unwrap_or_default(),
        relevant_experience: trimmed(&req.relevant_experience).unwrap_or_default(),
        expected_salary: trimmed(&req.expected_salary),
        availability_start: trimmed(&req.availability_start),
        current_employment: trimmed(&req.current_employment),
        relocation_willingness: trimmed(&req.relocation_willingness),
        work_authorization: trimmed(&req.work_authorization).unwrap_or_default(),
        cover_letter: trimmed(&req.cover_letter),
        additional_comments: trimmed(&req.additional_comments),
        reference_source: trimmed(&req.reference_source),
        answers,
    })
}

/// Snapshot each supplied answer with its question, ordered by the
/// question's position.
fn answers(req: &SubmitApplicationRequest, questions: &[JobQuestion]) -> ApiResult<Vec<NewAnswer>> {
    let by_id: HashMap<Uuid, &JobQuestion> = questions.iter().map(|q| (q.id, q)).collect();

    let mut seen = HashSet::new();
    let mut answers = Vec::with_capacity(req.custom_answers.len());
    for input in &req.custom_answers {
        let question = by_id.get(&input.question_id).copied().ok_or_else(|| {
            ApiError::validation(format!("Unknown question: {}", input.question_id))
        })?;
        if !seen.insert(input.question_id) {
            return Err(ApiError::validation(format!(
                "Duplicate answer for question: {}",
                question.question
            )));
        }
        answers.push((question, &input.answer));
    }

    for question in questions.iter().filter(|q| q.required) {
        let answered = answers
            .iter()
            .any(|(q, answer)| q.id == question.id && !answer.is_blank());
        if !answered {
            return Err(ApiError::validation(format!(
                "Please answer the required question: {}",
                question.question
            )));
        }
    }

    answers.sort_by_key(|(q, _)| q.order);
    Ok(answers
        .into_iter()
        .map(|(question, answer)| NewAnswer {
            question_id: question.id,
            question: question.question.clone(),
            question_type: question.question_type,
            position: question.order,
            answer: answer.flatten(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use formhire_types::api::{AnswerValue, CustomAnswerInput};
    use formhire_types::models::{AdminSummary, Job};

    use super::*;

    #[test]
    fn defaults_are_offered_as_filter_options() {
        assert!(EMPLOYMENT_TYPES.contains(&DEFAULT_EMPLOYMENT_TYPE));
        assert!(EXPERIENCE_LEVELS.contains(&DEFAULT_EXPERIENCE_LEVEL));
    }

    fn job_request() -> JobFieldsRequest {
        JobFieldsRequest {
            title: Some("  Engineer ".into()),
            description: Some("Build".into()),
            requirements: Some("Rust".into()),
            department: Some("Engineering".into()),
            location: Some("Remote".into()),
            ..Default::default()
        }
    }

    fn detail(resume_required: bool, questions: Vec<JobQuestion>) -> JobDetail {
        let now = Utc::now();
        JobDetail {
            job: Job {
                id: Uuid::new_v4(),
                title: "Engineer".into(),
                description: "Build".into(),
                requirements: "Rust".into(),
                department: "Engineering".into(),
                location: "Remote".into(),
                salary: None,
                employment_type: "full-time".into(),
                experience_level: "mid".into(),
                skills: vec![],
                benefits: vec![],
                company_name: "FormHire".into(),
                company_logo: None,
                company_website: None,
                company_size: None,
                resume_required,
                featured: false,
                is_active: true,
                admin_id: Uuid::new_v4(),
                created_at: now,
                updated_at: now,
            },
            admin: AdminSummary {
                name: "HR".into(),
                email: "hr@formhire.test".into(),
            },
            questions,
            application_count: 0,
        }
    }

    fn select_question(order: i64, required: bool) -> JobQuestion {
        JobQuestion {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            question: format!("Question {}", order),
            question_type: QuestionType::Checkbox,
            required,
            options: vec!["a".into(), "b".into()],
            placeholder: None,
            order,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".into(),
            name: "Jane".into(),
            image: None,
            bio: None,
            location: None,
            website: None,
            github: None,
            linkedin: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    fn complete_application() -> SubmitApplicationRequest {
        SubmitApplicationRequest {
            resume_url: Some("https://files.test/cv.pdf".into()),
            phone_number: Some("555-0100".into()),
            why_interested: Some("Mission".into()),
            relevant_experience: Some("Years".into()),
            work_authorization: Some("Citizen".into()),
            ..Default::default()
        }
    }

    #[test]
    fn job_defaults_apply() {
        let fields = job_fields(&job_request()).unwrap();
        assert_eq!(fields.title, "Engineer");
        assert_eq!(fields.company_name, DEFAULT_COMPANY);
        assert_eq!(fields.employment_type, "full-time");
        assert_eq!(fields.experience_level, "mid");
        assert!(fields.resume_required);
        assert!(fields.is_active);
        assert!(!fields.featured);
        assert!(fields.skills.is_empty());
    }

    #[test]
    fn job_missing_fields_are_listed() {
        let req = JobFieldsRequest {
            title: Some("   ".into()),
            description: Some("Build".into()),
            ..Default::default()
        };
        let err = job_fields(&req).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: title, requirements, department, location"
        );
    }

    #[test]
    fn merge_keeps_unspecified_fields() {
        let mut current = job_fields(&job_request()).unwrap();
        current.skills = vec!["rust".into()];
        current.salary = Some("$100k".into());

        let patch = JobFieldsRequest {
            title: Some("Staff Engineer".into()),
            salary: Some("".into()),
            featured: Some(true),
            ..Default::default()
        };
        let merged = merge_job_fields(&current, &patch).unwrap();
        assert_eq!(merged.title, "Staff Engineer");
        assert_eq!(merged.description, "Build");
        assert_eq!(merged.skills, vec!["rust"]);
        assert_eq!(merged.salary, None);
        assert!(merged.featured);
    }

    #[test]
    fn merge_rejects_blanked_required_field() {
        let current = job_fields(&job_request()).unwrap();
        let patch = JobFieldsRequest {
            location: Some(" ".into()),
            ..Default::default()
        };
        assert!(merge_job_fields(&current, &patch).is_err());
    }

    #[test]
    fn question_types_and_options() {
        let inputs = vec![
            QuestionInput {
                question: "Why?".into(),
                ..Default::default()
            },
            QuestionInput {
                question: "Stack".into(),
                question_type: Some("checkbox".into()),
                options: vec!["Rust".into(), " ".into()],
                ..Default::default()
            },
        ];
        let parsed = questions(&inputs).unwrap();
        assert_eq!(parsed[0].question_type, QuestionType::Text);
        assert_eq!(parsed[1].question_type, QuestionType::Checkbox);
        assert_eq!(parsed[1].options, vec!["Rust"]);

        let bad = vec![QuestionInput {
            question: "Pick".into(),
            question_type: Some("SELECT".into()),
            ..Default::default()
        }];
        assert!(questions(&bad).is_err());

        let blank = vec![QuestionInput::default()];
        assert_eq!(
            questions(&blank).unwrap_err().to_string(),
            "Question 1 text is required"
        );
    }

    #[test]
    fn application_requires_core_fields() {
        let req = SubmitApplicationRequest {
            phone_number: Some("555".into()),
            ..Default::default()
        };
        let err = application(&req, &detail(false, vec![]), &user()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: whyInterested, relevantExperience, workAuthorization"
        );
    }

    #[test]
    fn resume_required_only_when_job_says_so() {
        let mut req = complete_application();
        req.resume_url = None;
        assert!(application(&req, &detail(true, vec![]), &user()).is_err());
        assert!(application(&req, &detail(false, vec![]), &user()).is_ok());
    }

    #[test]
    fn required_question_needs_a_selection() {
        let question = select_question(1, true);
        let job = detail(false, vec![question.clone()]);

        let mut req = complete_application();
        assert!(application(&req, &job, &user()).is_err());

        req.custom_answers = vec![CustomAnswerInput {
            question_id: question.id,
            answer: AnswerValue::Choices(vec![]),
        }];
        assert!(application(&req, &job, &user()).is_err());

        req.custom_answers[0].answer = AnswerValue::Choices(vec!["a".into(), "b".into()]);
        let app = application(&req, &job, &user()).unwrap();
        assert_eq!(app.answers.len(), 1);
        assert_eq!(app.answers[0].answer, "a, b");
        assert_eq!(app.answers[0].question, "Question 1");
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut req = complete_application();
        req.custom_answers = vec![CustomAnswerInput {
            question_id: Uuid::new_v4(),
            answer: AnswerValue::Text("hello".into()),
        }];
        let err = application(&req, &detail(false, vec![]), &user()).unwrap_err();
        assert!(err.to_string().starts_with("Unknown question"));
    }

    #[test]
    fn answers_follow_question_order() {
        let first = select_question(1, false);
        let second = select_question(2, false);
        let job = detail(false, vec![first.clone(), second.clone()]);

        let mut req = complete_application();
        req.custom_answers = vec![
            CustomAnswerInput {
                question_id: second.id,
                answer: AnswerValue::Text("b".into()),
            },
            CustomAnswerInput {
                question_id: first.id,
                answer: AnswerValue::Text("a".into()),
            },
        ];
        let app = application(&req, &job, &user()).unwrap();
        let positions: Vec<i64> = app.answers.iter().map(|a| a.position).collect();
        assert_eq!(positions, vec![1, 2]);
    }
}
