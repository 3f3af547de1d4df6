use std::sync::Arc;
use std::thread;

use formhire_db::Database;
use formhire_db::models::{
    ApplicationFilter, JobFields, NewAnswer, NewApplication, NewQuestion, Principal,
    ProfileUpdate, SubmitOutcome,
};
use formhire_types::models::{ApplicationStatus, QuestionType};
use uuid::Uuid;

fn principal(email: &str) -> Principal {
    Principal {
        email: email.into(),
        name: "Jane Doe".into(),
        image: None,
    }
}

fn open_job(db: &Database, questions: &[NewQuestion]) -> Uuid {
    let (admin, _) = db.find_or_create_admin(&principal("hr@formhire.test")).unwrap();
    let fields = JobFields {
        title: "Backend Engineer".into(),
        description: "APIs".into(),
        requirements: "Rust".into(),
        department: "Engineering".into(),
        location: "Remote".into(),
        salary: Some("$100k".into()),
        employment_type: "FULL_TIME".into(),
        experience_level: "SENIOR".into(),
        skills: vec![],
        benefits: vec![],
        company_name: "FormHire".into(),
        company_logo: None,
        company_website: None,
        company_size: None,
        resume_required: true,
        featured: false,
        is_active: true,
    };
    db.create_job(admin.id, &fields, questions).unwrap().job.id
}

fn submission(db: &Database, job_id: Uuid, email: &str) -> NewApplication {
    let (user, _) = db.find_or_create_user(&principal(email)).unwrap();
    NewApplication {
        job_id,
        user_id: user.id,
        applicant_name: user.name,
        applicant_email: user.email,
        resume_url: Some("https://files.test/cv.pdf".into()),
        phone_number: " 555-0100 ".into(),
        linkedin_url: Some("  ".into()),
        portfolio_url: None,
        why_interested: "Mission".into(),
        relevant_experience: "Years".into(),
        expected_salary: None,
        availability_start: None,
        current_employment: None,
        relocation_willingness: None,
        work_authorization: "Citizen".into(),
        cover_letter: None,
        additional_comments: None,
        reference_source: None,
        answers: vec![],
    }
}

fn created(outcome: SubmitOutcome) -> formhire_types::models::Application {
    match outcome {
        SubmitOutcome::Created(app) => app,
        other => panic!("expected Created, got {:?}", other),
    }
}

#[test]
fn find_or_create_user_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let (first, created_first) = db.find_or_create_user(&principal("a@example.com")).unwrap();
    let (second, created_second) = db.find_or_create_user(&principal("a@example.com")).unwrap();

    assert!(created_first);
    assert!(!created_second);
    assert_eq!(first.id, second.id);
}

#[test]
fn concurrent_find_or_create_yields_one_user() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = db.clone();
            thread::spawn(move || db.find_or_create_user(&principal("race@example.com")).unwrap())
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);
    assert!(results.iter().all(|(u, _)| u.id == results[0].0.id));
}

#[test]
fn submit_normalises_fields() {
    let db = Database::open_in_memory().unwrap();
    let job_id = open_job(&db, &[]);

    let app = created(db.submit_application(&submission(&db, job_id, "a@example.com")).unwrap());
    assert_eq!(app.status, ApplicationStatus::Pending);
    assert_eq!(app.phone_number, "555-0100");
    assert_eq!(app.linkedin_url, None);
    assert!(app.status_updated_at.is_none());
}

#[test]
fn duplicate_submission_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let job_id = open_job(&db, &[]);
    let app = submission(&db, job_id, "a@example.com");

    created(db.submit_application(&app).unwrap());
    assert!(matches!(
        db.submit_application(&app).unwrap(),
        SubmitOutcome::Duplicate
    ));

    let all = db.list_applications(&ApplicationFilter::default(), false).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn concurrent_submissions_yield_exactly_one() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let job_id = open_job(&db, &[]);
    let app = submission(&db, job_id, "a@example.com");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = db.clone();
            let app = app.clone();
            thread::spawn(move || db.submit_application(&app).unwrap())
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = outcomes
        .iter()
        .filter(|o| matches!(o, SubmitOutcome::Created(_)))
        .count();
    let dupes = outcomes
        .iter()
        .filter(|o| matches!(o, SubmitOutcome::Duplicate))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(dupes, 7);
}

#[test]
fn closed_and_missing_jobs_refuse_submissions() {
    let db = Database::open_in_memory().unwrap();
    let job_id = open_job(&db, &[]);
    let other = open_job(&db, &[]);

    created(db.submit_application(&submission(&db, other, "x@example.com")).unwrap());
    db.delete_job(other).unwrap();

    assert!(matches!(
        db.submit_application(&submission(&db, other, "y@example.com")).unwrap(),
        SubmitOutcome::JobClosed
    ));
    assert!(matches!(
        db.submit_application(&submission(&db, Uuid::new_v4(), "y@example.com")).unwrap(),
        SubmitOutcome::JobNotFound
    ));
    assert!(matches!(
        db.submit_application(&submission(&db, job_id, "y@example.com")).unwrap(),
        SubmitOutcome::Created(_)
    ));
}

#[test]
fn answers_survive_question_replacement() {
    let db = Database::open_in_memory().unwrap();
    let question = NewQuestion {
        question: "Years of experience?".into(),
        question_type: QuestionType::Select,
        required: true,
        options: vec!["1-3".into(), "3-5".into()],
        placeholder: None,
    };
    let job_id = open_job(&db, &[question]);
    let asked = db.list_job_questions(job_id).unwrap().remove(0);

    let mut app = submission(&db, job_id, "a@example.com");
    app.answers.push(NewAnswer {
        question_id: asked.id,
        question: asked.question.clone(),
        question_type: asked.question_type,
        position: asked.order,
        answer: "3-5".into(),
    });
    let app = created(db.submit_application(&app).unwrap());

    let job = db.get_job(job_id).unwrap().unwrap();
    db.update_job(job_id, &JobFields::from(&job), Some(&[] as &[NewQuestion]))
        .unwrap()
        .unwrap();
    assert!(db.list_job_questions(job_id).unwrap().is_empty());

    let detail = db.get_application_detail(app.id, false).unwrap().unwrap();
    assert_eq!(detail.answers.len(), 1);
    assert_eq!(detail.answers[0].question, "Years of experience?");
    assert_eq!(detail.answers[0].answer, "3-5");
    assert_eq!(detail.job.title, "Backend Engineer");
}

#[test]
fn status_update_logs_only_with_note() {
    let db = Database::open_in_memory().unwrap();
    let job_id = open_job(&db, &[]);
    let app = created(db.submit_application(&submission(&db, job_id, "a@example.com")).unwrap());

    let change = db
        .update_application_status(app.id, ApplicationStatus::Reviewed, Some("  "))
        .unwrap()
        .unwrap();
    assert_eq!(change.previous, ApplicationStatus::Pending);
    assert_eq!(change.application.status, ApplicationStatus::Reviewed);
    assert_eq!(change.application.status_message, None);
    assert!(change.application.status_updated_at.is_some());

    let change = db
        .update_application_status(app.id, ApplicationStatus::Rejected, Some("Not a fit"))
        .unwrap()
        .unwrap();
    assert_eq!(change.previous, ApplicationStatus::Reviewed);
    assert_eq!(change.application.status_message.as_deref(), Some("Not a fit"));
    assert_eq!(change.job.title, "Backend Engineer");

    let detail = db.get_application_detail(app.id, true).unwrap().unwrap();
    let logs = detail.logs.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "REJECTED");
    assert_eq!(logs[0].notes.as_deref(), Some("Not a fit"));
}

#[test]
fn status_update_on_missing_application() {
    let db = Database::open_in_memory().unwrap();
    assert!(db
        .update_application_status(Uuid::new_v4(), ApplicationStatus::Accepted, None)
        .unwrap()
        .is_none());
}

#[test]
fn list_filters_by_user_job_and_status() {
    let db = Database::open_in_memory().unwrap();
    let first = open_job(&db, &[]);
    let second = open_job(&db, &[]);

    let a = created(db.submit_application(&submission(&db, first, "a@example.com")).unwrap());
    created(db.submit_application(&submission(&db, second, "a@example.com")).unwrap());
    created(db.submit_application(&submission(&db, first, "b@example.com")).unwrap());
    db.update_application_status(a.id, ApplicationStatus::Accepted, None)
        .unwrap();

    let mine = db
        .list_applications(
            &ApplicationFilter {
                user_id: Some(a.user_id),
                ..Default::default()
            },
            false,
        )
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|d| d.logs.is_none()));
    assert!(mine[0].application.applied_at >= mine[1].application.applied_at);

    let for_job = db
        .list_applications(
            &ApplicationFilter {
                job_id: Some(first),
                status: Some(ApplicationStatus::Pending),
                ..Default::default()
            },
            true,
        )
        .unwrap();
    assert_eq!(for_job.len(), 1);
    assert_eq!(for_job[0].application.applicant_email, "b@example.com");
    assert_eq!(for_job[0].logs.as_deref().map(<[_]>::len), Some(0));
}

#[test]
fn deleting_application_frees_the_pair() {
    let db = Database::open_in_memory().unwrap();
    let job_id = open_job(&db, &[]);
    let app = submission(&db, job_id, "a@example.com");
    let first = created(db.submit_application(&app).unwrap());

    assert!(db.delete_application(first.id).unwrap());
    assert!(!db.delete_application(first.id).unwrap());
    assert!(db.find_application(job_id, app.user_id).unwrap().is_none());
    created(db.submit_application(&app).unwrap());
}

#[test]
fn dashboard_counts() {
    let db = Database::open_in_memory().unwrap();
    let job_id = open_job(&db, &[]);
    let app = created(db.submit_application(&submission(&db, job_id, "a@example.com")).unwrap());
    created(db.submit_application(&submission(&db, job_id, "b@example.com")).unwrap());
    db.update_application_status(app.id, ApplicationStatus::Reviewed, None)
        .unwrap();

    let stats = db.dashboard_stats(1).unwrap();
    assert_eq!(stats.total_jobs, 1);
    assert_eq!(stats.active_jobs, 1);
    assert_eq!(stats.total_applications, 2);
    assert_eq!(stats.pending_applications, 1);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.recent_applications.len(), 1);
    assert_eq!(stats.recent_applications[0].job_title, "Backend Engineer");
}

#[test]
fn profile_update_merges_and_clears() {
    let db = Database::open_in_memory().unwrap();
    db.find_or_create_user(&principal("a@example.com")).unwrap();

    let user = db
        .update_profile(
            "a@example.com",
            &ProfileUpdate {
                bio: Some("Rustacean".into()),
                location: Some("Berlin".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(user.bio.as_deref(), Some("Rustacean"));
    assert_eq!(user.name, "Jane Doe");

    let user = db
        .update_profile(
            "a@example.com",
            &ProfileUpdate {
                location: Some("".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(user.location, None);
    assert_eq!(user.bio.as_deref(), Some("Rustacean"));

    assert!(db
        .update_profile("nobody@example.com", &ProfileUpdate::default())
        .unwrap()
        .is_none());
}

#[test]
fn inactive_admin_is_kept() {
    let db = Database::open_in_memory().unwrap();
    db.find_or_create_admin(&principal("hr@formhire.test")).unwrap();
    assert!(db.set_admin_active("hr@formhire.test", false).unwrap());

    let (admin, created) = db.find_or_create_admin(&principal("hr@formhire.test")).unwrap();
    assert!(!created);
    assert!(!admin.is_active);
}
