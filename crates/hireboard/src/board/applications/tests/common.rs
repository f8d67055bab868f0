use std::sync::Arc;

use chrono::NaiveDate;

use crate::board::applications::domain::{Application, InterviewRequest, NewApplication};
use crate::board::jobs::domain::{Job, NewJob};
use crate::board::users::NewUser;
use crate::board::Board;
use crate::notify::MockMailer;
use crate::policy::{Actor, Role};
use crate::store::InMemoryRecordStore;

pub(super) struct TestBoard {
    pub(super) board: Board<InMemoryRecordStore>,
    pub(super) mailer: MockMailer,
    pub(super) employer: Actor,
    pub(super) candidate: Actor,
}

pub(super) fn board() -> TestBoard {
    let store = Arc::new(InMemoryRecordStore::new());
    let mailer = MockMailer::default();
    let board = Board::new(store, Arc::new(mailer.clone()));

    let employer = board
        .users
        .register(employer_payload("hr@acme.com"))
        .expect("employer registers");
    let candidate = board
        .users
        .register(candidate_payload("ada@example.com"))
        .expect("candidate registers");

    TestBoard {
        employer: Actor::employer(&employer.id),
        candidate: Actor::candidate(&candidate.id),
        board,
        mailer,
    }
}

pub(super) fn employer_payload(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        role: Role::Employer,
        company_name: Some("Acme Robotics".to_string()),
        company_size: Some("50-200".to_string()),
    }
}

pub(super) fn candidate_payload(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role: Role::Candidate,
        company_name: None,
        company_size: None,
    }
}

pub(super) fn new_job() -> NewJob {
    NewJob {
        title: "Backend Engineer".to_string(),
        company: None,
        location: "Remote".to_string(),
        job_type: "Full-time".to_string(),
        salary: "$120k - $150k".to_string(),
        description: "Build and run the services behind the board".to_string(),
        requirements: "Rust, HTTP, SQL".to_string(),
        industry: "Software".to_string(),
        responsibilities: vec!["Ship features".to_string(), "Review code".to_string()],
        qualifications: vec!["3+ years backend experience".to_string()],
        application_deadline: None,
    }
}

pub(super) fn post_job(t: &TestBoard) -> Job {
    t.board
        .jobs
        .post(&t.employer, new_job())
        .expect("job posts")
}

pub(super) fn apply(t: &TestBoard, job: &Job) -> Application {
    t.board
        .applications
        .apply(
            &t.candidate,
            NewApplication {
                job_id: job.id.clone(),
                deadline: None,
                notes: String::new(),
            },
        )
        .expect("application submits")
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn interview_request() -> InterviewRequest {
    InterviewRequest {
        date: NaiveDate::from_ymd_opt(2026, 9, 14).expect("valid date"),
        time: "14:00".to_string(),
        interview_type: "Technical".to_string(),
        location_type: "remote".to_string(),
        location: "Video call".to_string(),
        notes: String::new(),
    }
}
