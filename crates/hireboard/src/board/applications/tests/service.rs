use super::common::*;
use crate::board::applications::domain::{ApplicationStatus, NewApplication};
use crate::board::applications::ApplicationError;
use crate::board::jobs::JobStatus;
use crate::policy::{Actor, PolicyError};

#[test]
fn apply_copies_listing_fields_and_confirms() {
    let t = board();
    let job = post_job(&t);

    let application = apply(&t, &job);
    assert_eq!(application.status, ApplicationStatus::Applied);
    assert_eq!(application.job_title, "Backend Engineer");
    assert_eq!(application.company, "Acme Robotics");

    let refreshed = t.board.jobs.get(&job.id).expect("job still readable");
    assert_eq!(refreshed.applications, 1);

    let confirmations: Vec<_> = t
        .mailer
        .sent()
        .into_iter()
        .filter(|m| m.template == "application-confirmation")
        .collect();
    assert_eq!(confirmations.len(), 1);
    assert_eq!(confirmations[0].to, "ada@example.com");
}

#[test]
fn apply_requires_an_active_listing() {
    let t = board();
    let job = post_job(&t);
    t.board
        .jobs
        .set_status(&t.employer, &job.id, JobStatus::Inactive)
        .expect("listing paused");

    match t.board.applications.apply(
        &t.candidate,
        NewApplication {
            job_id: job.id,
            deadline: None,
            notes: String::new(),
        },
    ) {
        Err(ApplicationError::Validation(message)) => {
            assert!(message.contains("no longer accepting"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn apply_rejects_duplicates() {
    let t = board();
    let job = post_job(&t);
    apply(&t, &job);

    match t.board.applications.apply(
        &t.candidate,
        NewApplication {
            job_id: job.id,
            deadline: None,
            notes: String::new(),
        },
    ) {
        Err(ApplicationError::Validation(message)) => {
            assert!(message.contains("already applied"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn status_update_persists_and_notifies() {
    let t = board();
    let job = post_job(&t);
    let application = apply(&t, &job);

    let updated = t
        .board
        .applications
        .update_status(&t.employer, &application.id, ApplicationStatus::Offer, None)
        .expect("status updates");
    assert_eq!(updated.status, ApplicationStatus::Offer);

    let stored = t
        .board
        .applications
        .get(&application.id)
        .expect("record readable");
    assert_eq!(stored.status, ApplicationStatus::Offer);

    let updates: Vec<_> = t
        .mailer
        .sent()
        .into_iter()
        .filter(|m| m.template == "status-update")
        .collect();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].body.contains("Offer"));
}

#[test]
fn status_update_requires_owning_the_job() {
    let t = board();
    let job = post_job(&t);
    let application = apply(&t, &job);

    let other = t
        .board
        .users
        .register(employer_payload("hr@rival.com"))
        .expect("second employer registers");

    match t.board.applications.update_status(
        &Actor::employer(&other.id),
        &application.id,
        ApplicationStatus::Rejected,
        None,
    ) {
        Err(ApplicationError::Policy(PolicyError::NotOwner)) => {}
        other => panic!("expected ownership error, got {other:?}"),
    }
}

#[test]
fn schedule_interview_is_a_single_compound_operation() {
    let t = board();
    let job = post_job(&t);
    let application = apply(&t, &job);

    let (interview, application) = t
        .board
        .applications
        .schedule_interview(&t.employer, &application.id, interview_request())
        .expect("interview schedules");

    assert!(interview.id.starts_with("int-"));
    assert_eq!(interview.application_id, application.id);
    assert_eq!(interview.candidate_id, t.candidate.user_id);
    assert_eq!(application.status, ApplicationStatus::Interview);
    assert!(application
        .notes
        .contains("Interview scheduled for 2026-09-14 at 14:00"));

    let sent = t.mailer.sent();
    assert_eq!(
        sent.iter()
            .filter(|m| m.template == "interview-invitation")
            .count(),
        1
    );
    // The transition itself also fires its usual status mail.
    assert_eq!(
        sent.iter().filter(|m| m.template == "status-update").count(),
        1
    );
}

#[test]
fn deleting_a_job_closes_open_applications_only() {
    let t = board();
    let job = post_job(&t);
    let first = apply(&t, &job);

    let second_candidate = t
        .board
        .users
        .register(candidate_payload("grace@example.com"))
        .expect("second candidate registers");
    let second = t
        .board
        .applications
        .apply(
            &Actor::candidate(&second_candidate.id),
            NewApplication {
                job_id: job.id.clone(),
                deadline: None,
                notes: String::new(),
            },
        )
        .expect("second application submits");

    t.board
        .applications
        .update_status(&t.employer, &first.id, ApplicationStatus::Rejected, None)
        .expect("first application rejected");

    let (deleted, closed) = t
        .board
        .jobs
        .delete(&t.employer, &job.id)
        .expect("job deletes");
    assert_eq!(deleted.status, JobStatus::Deleted);
    assert_eq!(closed, 1);

    let first = t.board.applications.get(&first.id).expect("first readable");
    assert_eq!(first.status, ApplicationStatus::Rejected);
    let second = t
        .board
        .applications
        .get(&second.id)
        .expect("second readable");
    assert_eq!(second.status, ApplicationStatus::JobClosed);

    // One status mail for the rejection, one for the close.
    assert_eq!(
        t.mailer
            .sent()
            .iter()
            .filter(|m| m.template == "status-update")
            .count(),
        2
    );

    // Deleting again is a no-op.
    let (_, closed_again) = t
        .board
        .jobs
        .delete(&t.employer, &job.id)
        .expect("second delete is a no-op");
    assert_eq!(closed_again, 0);
}

#[test]
fn candidates_only_read_their_own_applications() {
    let t = board();
    let job = post_job(&t);
    let application = apply(&t, &job);

    let stranger = t
        .board
        .users
        .register(candidate_payload("mallory@example.com"))
        .expect("stranger registers");

    match t
        .board
        .applications
        .get_for(&Actor::candidate(&stranger.id), &application.id)
    {
        Err(ApplicationError::Policy(PolicyError::NotOwner)) => {}
        other => panic!("expected ownership error, got {other:?}"),
    }

    let own = t
        .board
        .applications
        .get_for(&t.candidate, &application.id)
        .expect("own application readable");
    assert_eq!(own.id, application.id);
}

#[test]
fn listings_are_scoped_per_actor() {
    let t = board();
    let job = post_job(&t);
    apply(&t, &job);

    let mine = t
        .board
        .applications
        .list_for_candidate(&t.candidate)
        .expect("candidate list loads");
    assert_eq!(mine.len(), 1);

    let applicants = t
        .board
        .applications
        .list_for_job(&t.employer, &job.id)
        .expect("employer list loads");
    assert_eq!(applicants.len(), 1);
    assert_eq!(applicants[0].user_id, t.candidate.user_id);
}
