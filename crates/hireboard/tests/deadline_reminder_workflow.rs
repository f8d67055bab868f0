//! End-to-end specifications for the deadline reminder workflow: the
//! three-day qualification window, sent-marker deduplication, the opt-out,
//! and the recurring scheduler.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};

    use hireboard::board::applications::NewApplication;
    use hireboard::board::jobs::NewJob;
    use hireboard::board::users::{NewUser, User};
    use hireboard::board::Board;
    use hireboard::notify::MockMailer;
    use hireboard::policy::{Actor, Role};
    use hireboard::store::InMemoryRecordStore;

    pub(super) struct Harness {
        pub(super) board: Board<InMemoryRecordStore>,
        pub(super) mailer: MockMailer,
        pub(super) employer: Actor,
    }

    pub(super) fn harness() -> Harness {
        let store = Arc::new(InMemoryRecordStore::new());
        let mailer = MockMailer::default();
        let board = Board::new(store, Arc::new(mailer.clone()));

        let employer = board
            .users
            .register(NewUser {
                email: "hr@acme.com".to_string(),
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                role: Role::Employer,
                company_name: Some("Acme Robotics".to_string()),
                company_size: Some("50-200".to_string()),
            })
            .expect("employer registers");

        Harness {
            employer: Actor::employer(&employer.id),
            board,
            mailer,
        }
    }

    pub(super) fn candidate(h: &Harness, email: &str, first_name: &str) -> User {
        h.board
            .users
            .register(NewUser {
                email: email.to_string(),
                first_name: first_name.to_string(),
                last_name: "Lovelace".to_string(),
                role: Role::Candidate,
                company_name: None,
                company_size: None,
            })
            .expect("candidate registers")
    }

    /// Post a listing and apply to it with a tracked deadline.
    pub(super) fn tracked_application(
        h: &Harness,
        candidate: &User,
        deadline: Option<DateTime<Utc>>,
    ) -> String {
        let job = h
            .board
            .jobs
            .post(
                &h.employer,
                NewJob {
                    title: "Backend Engineer".to_string(),
                    company: None,
                    location: "Remote".to_string(),
                    job_type: "Full-time".to_string(),
                    salary: "$120k".to_string(),
                    description: "Build services".to_string(),
                    requirements: "Rust".to_string(),
                    industry: "Software".to_string(),
                    responsibilities: vec![],
                    qualifications: vec![],
                    application_deadline: deadline,
                },
            )
            .expect("job posts");

        h.board
            .applications
            .apply(
                &Actor::candidate(&candidate.id),
                NewApplication {
                    job_id: job.id,
                    deadline,
                    notes: String::new(),
                },
            )
            .expect("application submits")
            .id
    }

    pub(super) fn reminders_sent(h: &Harness) -> usize {
        h.mailer
            .sent()
            .iter()
            .filter(|m| m.template == "deadline-reminder")
            .count()
    }

    pub(super) fn two_days_out() -> DateTime<Utc> {
        Utc::now() + Duration::days(2)
    }
}

mod window {
    use super::common::*;
    use chrono::{Duration, Utc};

    #[test]
    fn approaching_deadline_sends_once_then_dedupes() {
        let h = harness();
        let ada = candidate(&h, "ada@example.com", "Ada");
        let app_id = tracked_application(&h, &ada, Some(two_days_out()));

        let now = Utc::now();
        let first = h.board.reminders.run_check(&ada, now);
        assert_eq!(first.sent, vec![app_id]);

        let second = h.board.reminders.run_check(&ada, now);
        assert!(second.sent.is_empty());
        assert_eq!(second.skipped_existing, 1);

        assert_eq!(reminders_sent(&h), 1);
        let reminder = h
            .mailer
            .sent()
            .into_iter()
            .find(|m| m.template == "deadline-reminder")
            .expect("reminder sent");
        assert_eq!(reminder.to, "ada@example.com");
        assert!(reminder.subject.contains("deadline in 2 day(s)"));
        assert!(reminder.body.contains("Backend Engineer"));
    }

    #[test]
    fn deadlines_outside_the_window_stay_quiet() {
        let h = harness();
        let ada = candidate(&h, "ada@example.com", "Ada");
        tracked_application(&h, &ada, Some(Utc::now() + Duration::days(10)));
        tracked_application(&h, &ada, Some(Utc::now() - Duration::days(1)));
        tracked_application(&h, &ada, None);

        let outcome = h.board.reminders.run_check(&ada, Utc::now());
        assert!(outcome.sent.is_empty());
        assert_eq!(outcome.skipped_unqualified, 3);
        assert_eq!(reminders_sent(&h), 0);
    }

    #[test]
    fn opted_out_candidates_are_skipped_entirely() {
        let h = harness();
        let ada = candidate(&h, "ada@example.com", "Ada");
        tracked_application(&h, &ada, Some(two_days_out()));

        let ada = h
            .board
            .users
            .update_email_preferences(
                &hireboard::policy::Actor::candidate(&ada.id),
                &ada.id,
                hireboard::board::users::EmailPreferences {
                    deadline_reminders: false,
                    ..Default::default()
                },
            )
            .expect("preferences update");

        let outcome = h.board.reminders.run_check(&ada, Utc::now());
        assert!(outcome.disabled);
        assert_eq!(reminders_sent(&h), 0);
    }

    #[test]
    fn sweep_visits_every_candidate_account() {
        let h = harness();
        let ada = candidate(&h, "ada@example.com", "Ada");
        let lin = candidate(&h, "lin@example.com", "Lin");
        tracked_application(&h, &ada, Some(two_days_out()));
        tracked_application(&h, &lin, Some(two_days_out()));

        assert_eq!(h.board.reminders.run_sweep(Utc::now()), 2);
        assert_eq!(h.board.reminders.run_sweep(Utc::now()), 0);
        assert_eq!(reminders_sent(&h), 2);
    }
}

mod scheduler {
    use super::common::*;
    use std::time::Duration;

    use hireboard::board::reminders::ReminderScheduler;

    #[tokio::test]
    async fn scheduler_runs_the_sweep_and_stops_cleanly() {
        let h = harness();
        let ada = candidate(&h, "ada@example.com", "Ada");
        tracked_application(&h, &ada, Some(two_days_out()));

        let scheduler =
            ReminderScheduler::start(h.board.reminders.clone(), Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop().await;

        // The first tick fires immediately; the hourly period keeps a second
        // one from landing inside the test window.
        assert_eq!(reminders_sent(&h), 1);
    }
}
