use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use clap::Args;
use hireboard::board::applications::{InterviewRequest, NewApplication};
use hireboard::board::jobs::{JobSearch, NewJob};
use hireboard::board::users::NewUser;
use hireboard::board::Board;
use hireboard::config::AppConfig;
use hireboard::error::{AppError, BoardError};
use hireboard::notify::{mailer_for, MockMailer};
use hireboard::policy::{Actor, Role};
use hireboard::store::InMemoryRecordStore;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// How many days out the demo listing's deadline falls (default 2,
    /// inside the reminder window).
    #[arg(long, default_value_t = 2)]
    pub(crate) deadline_days: i64,
    /// Skip the interview scheduling portion of the demo.
    #[arg(long)]
    pub(crate) skip_interview: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SweepArgs {
    /// Override the reference date for the sweep (YYYY-MM-DD, midnight UTC).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn board_err(err: impl Into<BoardError>) -> AppError {
    AppError::Board(err.into())
}

/// Run one reminder sweep against the configured store and report the count.
pub(crate) fn run_sweep(args: SweepArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = Arc::new(InMemoryRecordStore::new());
    let board = Board::new(store, mailer_for(config.mail.mode));

    let now = args
        .today
        .and_then(crate::infra::deadline_at)
        .unwrap_or_else(Utc::now);
    let sent = board.reminders.run_sweep(now);
    println!("Reminder sweep complete: {sent} reminder(s) sent");
    Ok(())
}

/// End-to-end walkthrough of the board: both account types, a listing with
/// an approaching deadline, an application, an interview, the reminder
/// deduplication, and the soft-delete cascade.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryRecordStore::new());
    let mailer = MockMailer::default();
    let board = Board::new(store, Arc::new(mailer.clone()));

    println!("HireBoard demo");
    println!("==============");

    let employer_account = board
        .users
        .register(NewUser {
            email: "hr@acme.com".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            role: Role::Employer,
            company_name: Some("Acme Robotics".to_string()),
            company_size: Some("50-200".to_string()),
        })
        .map_err(board_err)?;
    let candidate_account = board
        .users
        .register(NewUser {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::Candidate,
            company_name: None,
            company_size: None,
        })
        .map_err(board_err)?;
    println!(
        "Registered employer {} ({}) and candidate {} ({})",
        employer_account.full_name(),
        employer_account.id,
        candidate_account.full_name(),
        candidate_account.id
    );

    let employer = Actor::employer(&employer_account.id);
    let candidate = Actor::candidate(&candidate_account.id);

    let deadline = Utc::now() + Duration::days(args.deadline_days);
    let job = board
        .jobs
        .post(
            &employer,
            NewJob {
                title: "Backend Engineer".to_string(),
                company: None,
                location: "Remote".to_string(),
                job_type: "Full-time".to_string(),
                salary: "$120k - $150k".to_string(),
                description: "Build and run the services behind the board".to_string(),
                requirements: "Rust, HTTP, SQL".to_string(),
                industry: "Software".to_string(),
                responsibilities: vec!["Ship features".to_string()],
                qualifications: vec!["3+ years backend experience".to_string()],
                application_deadline: Some(deadline),
            },
        )
        .map_err(board_err)?;
    println!(
        "\nPosted listing {} '{}' at {} (deadline {} day(s) out)",
        job.id, job.title, job.company, args.deadline_days
    );

    let page = board
        .jobs
        .search(&JobSearch {
            keyword: Some("backend".to_string()),
            ..JobSearch::default()
        })
        .map_err(board_err)?;
    println!("Keyword search for 'backend' finds {} listing(s)", page.total);

    let application = board
        .applications
        .apply(
            &candidate,
            NewApplication {
                job_id: job.id.clone(),
                deadline: Some(deadline),
                notes: String::new(),
            },
        )
        .map_err(board_err)?;
    println!(
        "{} applied: application {} is now '{}'",
        candidate_account.full_name(),
        application.id,
        application.status.label()
    );

    if !args.skip_interview {
        let date = (Utc::now() + Duration::days(7)).date_naive();
        let (interview, application) = board
            .applications
            .schedule_interview(
                &employer,
                &application.id,
                InterviewRequest {
                    date,
                    time: "14:00".to_string(),
                    interview_type: "Technical".to_string(),
                    location_type: "remote".to_string(),
                    location: "Video call".to_string(),
                    notes: String::new(),
                },
            )
            .map_err(board_err)?;
        println!(
            "Interview {} scheduled for {} at {}; application moved to '{}'",
            interview.id,
            interview.date,
            interview.time,
            application.status.label()
        );
    }

    println!("\nDeadline reminders");
    let first = board.reminders.run_check(&candidate_account, Utc::now());
    println!(
        "First check: {} sent, {} already covered, {} outside the window",
        first.sent.len(),
        first.skipped_existing,
        first.skipped_unqualified
    );
    let second = board.reminders.run_check(&candidate_account, Utc::now());
    println!(
        "Second check: {} sent, {} already covered (the marker deduplicates)",
        second.sent.len(),
        second.skipped_existing
    );

    let (deleted, closed) = board.jobs.delete(&employer, &job.id).map_err(board_err)?;
    println!(
        "\nEmployer deleted listing {}: status '{}', {} open application(s) closed",
        deleted.id,
        deleted.status.label(),
        closed
    );

    println!("\nSimulated mailbox");
    for message in mailer.sent() {
        println!("  [{}] to {}: {}", message.template, message.to, message.subject);
    }

    Ok(())
}
