use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    Application, ApplicationStatus, Interview, InterviewRequest, NewApplication,
};
use crate::board::jobs::domain::{Job, JobStatus};
use crate::board::users::User;
use crate::notify::{EmailTemplate, Notifier};
use crate::policy::{require_owner, require_role, Actor, PolicyError, Role};
use crate::store::{Filter, RecordId, RecordKind, RecordQuery, RecordStore, StoreError};

/// Application tracking: apply, employer-driven status transitions,
/// interview scheduling, and the job-deletion cascade.
pub struct ApplicationService<S> {
    store: Arc<S>,
    notifier: Notifier,
}

/// Error raised by application operations.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("{0}")]
    Validation(String),
    #[error("application not found")]
    NotFound,
    #[error("job not found")]
    JobNotFound,
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<S: RecordStore> ApplicationService<S> {
    pub fn new(store: Arc<S>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Submit an application to an active listing. Copies the listing's
    /// title and company onto the record, bumps the job's application
    /// counter, and sends a confirmation mail, both best-effort.
    pub fn apply(&self, actor: &Actor, new: NewApplication) -> Result<Application, ApplicationError> {
        require_role(actor, Role::Candidate)?;

        let job = self.load_job(&new.job_id)?;
        if job.status != JobStatus::Active {
            return Err(ApplicationError::Validation(
                "this listing is no longer accepting applications".to_string(),
            ));
        }

        let already = self.store.fetch(
            RecordKind::Application,
            &RecordQuery::new()
                .filter(Filter::eq("job_id", new.job_id.clone()))
                .filter(Filter::eq("user_id", actor.user_id.clone())),
        )?;
        if already.total > 0 {
            return Err(ApplicationError::Validation(
                "you have already applied to this job".to_string(),
            ));
        }

        let application = Application {
            id: String::new(),
            job_id: job.id.clone(),
            user_id: actor.user_id.clone(),
            job_title: job.title.clone(),
            company: job.company.clone(),
            status: ApplicationStatus::Applied,
            date_applied: chrono::Utc::now(),
            deadline: new.deadline,
            notes: new.notes,
        };
        let stored = self
            .store
            .create(
                RecordKind::Application,
                serde_json::to_value(&application).map_err(StoreError::from)?,
            )?;
        let application: Application = stored.decode()?;

        self.bump_application_counter(&job.id);

        let data = mail_data(&[
            ("jobTitle", &application.job_title),
            ("company", &application.company),
        ]);
        self.notify_candidate(
            &application.user_id,
            EmailTemplate::ApplicationConfirmation,
            data,
        );

        Ok(application)
    }

    /// Employer-driven status transition. The transition is unconditional;
    /// any target status is accepted.
    pub fn update_status(
        &self,
        actor: &Actor,
        application_id: &str,
        status: ApplicationStatus,
        note: Option<String>,
    ) -> Result<Application, ApplicationError> {
        require_role(actor, Role::Employer)?;
        let application = self.get(application_id)?;
        let job = self.load_job(&application.job_id)?;
        require_owner(actor, &job.employer_id)?;

        self.transition(application_id, status, note)
    }

    /// Compound operation: create the interview record, drive the status
    /// machine to `Interview` with a synthesized note, and send the
    /// invitation mail. Exactly one interview record per invocation.
    pub fn schedule_interview(
        &self,
        actor: &Actor,
        application_id: &str,
        request: InterviewRequest,
    ) -> Result<(Interview, Application), ApplicationError> {
        require_role(actor, Role::Employer)?;
        if request.time.trim().is_empty() || request.interview_type.trim().is_empty() {
            return Err(ApplicationError::Validation(
                "interview time and type are required".to_string(),
            ));
        }

        let application = self.get(application_id)?;
        let job = self.load_job(&application.job_id)?;
        require_owner(actor, &job.employer_id)?;

        let interview = Interview {
            id: String::new(),
            application_id: application.id.clone(),
            job_id: application.job_id.clone(),
            candidate_id: application.user_id.clone(),
            employer_id: actor.user_id.clone(),
            date: request.date,
            time: request.time,
            interview_type: request.interview_type,
            location_type: request.location_type,
            location: request.location,
            notes: request.notes,
        };
        let stored = self
            .store
            .create(
                RecordKind::Interview,
                serde_json::to_value(&interview).map_err(StoreError::from)?,
            )?;
        let interview: Interview = stored.decode()?;

        let note = format!(
            "Interview scheduled for {} at {}",
            interview.date, interview.time
        );
        let application =
            self.transition(application_id, ApplicationStatus::Interview, Some(note))?;

        let data = mail_data(&[
            ("jobTitle", &application.job_title),
            ("company", &application.company),
            ("date", &interview.date.to_string()),
            ("time", &interview.time),
            ("interviewType", &interview.interview_type),
            ("location", &interview.location),
        ]);
        self.notify_candidate(
            &application.user_id,
            EmailTemplate::InterviewInvitation,
            data,
        );

        Ok((interview, application))
    }

    /// Job-deletion cascade: move every open application for the job to
    /// `job_closed`, notifying each candidate once. Per-application failures
    /// are logged and do not stop the sweep. Returns how many were closed.
    pub fn close_for_job(&self, job: &Job) -> usize {
        let page = match self.store.fetch(
            RecordKind::Application,
            &RecordQuery::new().filter(Filter::eq("job_id", job.id.clone())),
        ) {
            Ok(page) => page,
            Err(err) => {
                warn!(job_id = %job.id, %err, "unable to load applications for closed job");
                return 0;
            }
        };

        let mut closed = 0;
        for record in &page.records {
            let application: Application = match record.decode() {
                Ok(application) => application,
                Err(err) => {
                    warn!(record_id = %record.id.0, %err, "skipping malformed application");
                    continue;
                }
            };
            if !application.status.is_open() {
                continue;
            }

            let note = "This position has been closed by the employer".to_string();
            match self.transition(&application.id, ApplicationStatus::JobClosed, Some(note)) {
                Ok(_) => closed += 1,
                Err(err) => {
                    warn!(application_id = %application.id, %err, "failed to close application");
                }
            }
        }

        info!(job_id = %job.id, closed, "closed applications for deleted job");
        closed
    }

    /// Fetch one application on behalf of an actor: candidates read their
    /// own, employers read applications to their own jobs.
    pub fn get_for(
        &self,
        actor: &Actor,
        application_id: &str,
    ) -> Result<Application, ApplicationError> {
        let application = self.get(application_id)?;
        match actor.role {
            Role::Candidate => require_owner(actor, &application.user_id)?,
            Role::Employer => {
                let job = self.load_job(&application.job_id)?;
                require_owner(actor, &job.employer_id)?;
            }
        }
        Ok(application)
    }

    pub fn get(&self, application_id: &str) -> Result<Application, ApplicationError> {
        let stored = self
            .store
            .get(RecordKind::Application, &RecordId(application_id.to_string()))?
            .ok_or(ApplicationError::NotFound)?;
        Ok(stored.decode()?)
    }

    /// A candidate's own applications, most recent first.
    pub fn list_for_candidate(&self, actor: &Actor) -> Result<Vec<Application>, ApplicationError> {
        require_role(actor, Role::Candidate)?;
        let page = self.store.fetch(
            RecordKind::Application,
            &RecordQuery::new()
                .filter(Filter::eq("user_id", actor.user_id.clone()))
                .order_desc("date_applied"),
        )?;
        decode_page(&page.records)
    }

    /// Applicants for one of the employer's own jobs.
    pub fn list_for_job(
        &self,
        actor: &Actor,
        job_id: &str,
    ) -> Result<Vec<Application>, ApplicationError> {
        require_role(actor, Role::Employer)?;
        let job = self.load_job(job_id)?;
        require_owner(actor, &job.employer_id)?;

        let page = self.store.fetch(
            RecordKind::Application,
            &RecordQuery::new()
                .filter(Filter::eq("job_id", job_id))
                .order_desc("date_applied"),
        )?;
        decode_page(&page.records)
    }

    /// Persist the new status, then fire the best-effort status mail.
    fn transition(
        &self,
        application_id: &str,
        status: ApplicationStatus,
        note: Option<String>,
    ) -> Result<Application, ApplicationError> {
        let stored = self
            .store
            .get(RecordKind::Application, &RecordId(application_id.to_string()))?
            .ok_or(ApplicationError::NotFound)?;
        let mut application: Application = stored.decode()?;

        application.status = status;
        if let Some(note) = note {
            if application.notes.is_empty() {
                application.notes = note;
            } else {
                application.notes.push('\n');
                application.notes.push_str(&note);
            }
        }

        let updated = self.store.update(
            RecordKind::Application,
            &stored.id,
            stored.revision,
            serde_json::to_value(&application).map_err(StoreError::from)?,
        )?;
        let application: Application = updated.decode()?;

        let data = mail_data(&[
            ("jobTitle", &application.job_title),
            ("company", &application.company),
            ("status", application.status.label()),
        ]);
        self.notify_candidate(&application.user_id, EmailTemplate::StatusUpdate, data);

        Ok(application)
    }

    fn load_job(&self, job_id: &str) -> Result<Job, ApplicationError> {
        let stored = self
            .store
            .get(RecordKind::Job, &RecordId(job_id.to_string()))?
            .ok_or(ApplicationError::JobNotFound)?;
        Ok(stored.decode()?)
    }

    /// Counter bumps lose to concurrent edits; the conflict is logged and
    /// dropped rather than retried.
    fn bump_application_counter(&self, job_id: &str) {
        let result = (|| -> Result<(), StoreError> {
            let stored = self
                .store
                .get(RecordKind::Job, &RecordId(job_id.to_string()))?
                .ok_or(StoreError::NotFound)?;
            let mut job: Job = stored.decode()?;
            job.applications += 1;
            self.store.update(
                RecordKind::Job,
                &stored.id,
                stored.revision,
                serde_json::to_value(&job)?,
            )?;
            Ok(())
        })();

        if let Err(err) = result {
            warn!(job_id, %err, "application counter bump dropped");
        }
    }

    /// Look up the candidate and send; every failure here is swallowed.
    fn notify_candidate(
        &self,
        user_id: &str,
        template: EmailTemplate,
        mut data: BTreeMap<String, String>,
    ) {
        let user: User = match self
            .store
            .get(RecordKind::User, &RecordId(user_id.to_string()))
        {
            Ok(Some(stored)) => match stored.decode() {
                Ok(user) => user,
                Err(err) => {
                    warn!(user_id, %err, "notification skipped: malformed user record");
                    return;
                }
            },
            Ok(None) => {
                warn!(user_id, "notification skipped: recipient not found");
                return;
            }
            Err(err) => {
                warn!(user_id, %err, "notification skipped: user lookup failed");
                return;
            }
        };

        data.insert("firstName".to_string(), user.first_name.clone());
        if let Err(err) = self.notifier.send(&user, template, &data) {
            warn!(user_id, template = template.name(), %err, "notification send failed");
        }
    }
}

fn decode_page(records: &[crate::store::StoredRecord]) -> Result<Vec<Application>, ApplicationError> {
    records
        .iter()
        .map(|record| record.decode().map_err(ApplicationError::from))
        .collect()
}

fn mail_data(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
