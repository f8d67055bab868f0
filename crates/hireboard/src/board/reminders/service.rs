use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::applications::domain::Application;
use crate::board::users::{User, UserService};
use crate::notify::{EmailTemplate, MailError, Notifier};
use crate::store::{Filter, RecordKind, RecordQuery, RecordStore, StoreError};

/// Applications qualify for a reminder this many days (or fewer) before
/// their deadline.
pub const REMINDER_WINDOW_DAYS: i64 = 3;

/// Sent-marker preventing duplicate reminder mails for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineNotification {
    #[serde(default)]
    pub id: String,
    pub application_id: String,
    pub sent_date: DateTime<Utc>,
}

/// What one check cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderOutcome {
    /// Application ids a reminder was sent for, in processing order.
    pub sent: Vec<String>,
    pub skipped_existing: usize,
    pub skipped_unqualified: usize,
    /// True when the user has opted out and the check did not run.
    pub disabled: bool,
}

impl ReminderOutcome {
    fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }
}

/// Error inside one reminder cycle. Never escapes [`ReminderService::run_check`].
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Whole days until the deadline, rounded up: a deadline 2.2 days out is
/// 3 days away, one 12 hours out is 1 day away, one in the past is <= 0.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (deadline - now).num_seconds() as f64;
    (seconds / 86_400.0).ceil() as i64
}

fn qualifies(application: &Application, now: DateTime<Utc>) -> Option<i64> {
    let deadline = application.deadline?;
    let days = days_until(deadline, now);
    (0 < days && days <= REMINDER_WINDOW_DAYS).then_some(days)
}

/// Deadline reminder workflow: per candidate, find applications whose
/// deadline falls strictly within the next three days and make sure exactly
/// one reminder is ever sent per application.
pub struct ReminderService<S> {
    store: Arc<S>,
    notifier: Notifier,
    users: Arc<UserService<S>>,
}

impl<S: RecordStore> ReminderService<S> {
    pub fn new(store: Arc<S>, notifier: Notifier, users: Arc<UserService<S>>) -> Self {
        Self {
            store,
            notifier,
            users,
        }
    }

    /// Run one check cycle for a candidate. Any error inside the cycle is
    /// logged and swallowed; a failed cycle never surfaces to the caller.
    pub fn run_check(&self, user: &User, now: DateTime<Utc>) -> ReminderOutcome {
        if !user.email_preferences.deadline_reminders {
            return ReminderOutcome::disabled();
        }

        match self.check_cycle(user, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(user_id = %user.id, %err, "deadline reminder cycle failed");
                ReminderOutcome::default()
            }
        }
    }

    /// Run the check for every candidate account. Returns the total number
    /// of reminders sent.
    pub fn run_sweep(&self, now: DateTime<Utc>) -> usize {
        let candidates = match self.users.list_candidates() {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(%err, "reminder sweep aborted: unable to list candidates");
                return 0;
            }
        };

        candidates
            .iter()
            .map(|user| self.run_check(user, now).sent.len())
            .sum()
    }

    fn check_cycle(&self, user: &User, now: DateTime<Utc>) -> Result<ReminderOutcome, ReminderError> {
        let applications = self.store.fetch(
            RecordKind::Application,
            &RecordQuery::new().filter(Filter::eq("user_id", user.id.clone())),
        )?;

        let markers = self
            .store
            .fetch(RecordKind::DeadlineNotification, &RecordQuery::new())?;
        let already_sent: HashSet<String> = markers
            .records
            .iter()
            .filter_map(|record| {
                record
                    .fields
                    .get("application_id")
                    .and_then(|value| value.as_str())
                    .map(str::to_string)
            })
            .collect();

        let mut outcome = ReminderOutcome::default();
        for record in &applications.records {
            let application: Application = record.decode()?;

            let Some(days) = qualifies(&application, now) else {
                outcome.skipped_unqualified += 1;
                continue;
            };
            if already_sent.contains(&application.id) {
                outcome.skipped_existing += 1;
                continue;
            }

            // Send first, then persist the marker, mirroring the original
            // order of side effects.
            let mut data = BTreeMap::new();
            data.insert("firstName".to_string(), user.first_name.clone());
            data.insert("jobTitle".to_string(), application.job_title.clone());
            data.insert("company".to_string(), application.company.clone());
            data.insert("daysLeft".to_string(), days.to_string());
            self.notifier.send(user, EmailTemplate::DeadlineReminder, &data)?;

            let marker = DeadlineNotification {
                id: String::new(),
                application_id: application.id.clone(),
                sent_date: now,
            };
            self.store.create(
                RecordKind::DeadlineNotification,
                serde_json::to_value(&marker).map_err(StoreError::from)?,
            )?;

            outcome.sent.push(application.id);
        }

        Ok(outcome)
    }
}
