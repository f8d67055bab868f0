use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{Job, JobSearch, JobStatus, JobUpdate, NewJob};
use crate::board::applications::ApplicationService;
use crate::board::users::User;
use crate::policy::{require_owner, require_role, Actor, PolicyError, Role};
use crate::store::{Filter, RecordId, RecordKind, RecordQuery, RecordStore, StoreError};

/// Listing management for employers plus the public search surface.
pub struct JobService<S> {
    store: Arc<S>,
    applications: Arc<ApplicationService<S>>,
}

/// Error raised by listing operations.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{0}")]
    Validation(String),
    #[error("job not found")]
    NotFound,
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One page of search results.
#[derive(Debug, Clone, serde::Serialize)]
pub struct JobSearchPage {
    pub jobs: Vec<Job>,
    pub total: usize,
}

impl<S: RecordStore> JobService<S> {
    pub fn new(store: Arc<S>, applications: Arc<ApplicationService<S>>) -> Self {
        Self {
            store,
            applications,
        }
    }

    /// Publish a listing. Employer only; the company falls back to the
    /// account's company name when the payload leaves it out.
    pub fn post(&self, actor: &Actor, new: NewJob) -> Result<Job, JobError> {
        require_role(actor, Role::Employer)?;

        if new.title.trim().is_empty() || new.description.trim().is_empty() {
            return Err(JobError::Validation(
                "title and description are required".to_string(),
            ));
        }

        let company = match new.company {
            Some(company) if !company.trim().is_empty() => company,
            _ => self.employer_company(actor)?,
        };

        let job = Job {
            id: String::new(),
            title: new.title,
            company,
            location: new.location,
            job_type: new.job_type,
            salary: new.salary,
            description: new.description,
            requirements: new.requirements,
            industry: new.industry,
            responsibilities: new.responsibilities,
            qualifications: new.qualifications,
            employer_id: actor.user_id.clone(),
            status: JobStatus::Active,
            posted_date: chrono::Utc::now(),
            applications: 0,
            views: 0,
            application_deadline: new.application_deadline,
        };

        let stored = self
            .store
            .create(
                RecordKind::Job,
                serde_json::to_value(&job).map_err(StoreError::from)?,
            )?;
        Ok(stored.decode()?)
    }

    /// Public search over active listings, newest first. Structured filters
    /// become store where-clauses; the free-text keyword is matched across
    /// title, company, and description after the fetch.
    pub fn search(&self, search: &JobSearch) -> Result<JobSearchPage, JobError> {
        let mut query = RecordQuery::new()
            .filter(Filter::eq("status", JobStatus::Active.label()))
            .order_desc("posted_date");
        if let Some(location) = &search.location {
            query = query.filter(Filter::eq("location", location.clone()));
        }
        if let Some(job_type) = &search.job_type {
            query = query.filter(Filter::eq("job_type", job_type.clone()));
        }
        if let Some(industry) = &search.industry {
            query = query.filter(Filter::eq("industry", industry.clone()));
        }

        let page = self.store.fetch(RecordKind::Job, &query)?;
        let mut jobs: Vec<Job> = page
            .records
            .iter()
            .map(|record| record.decode().map_err(JobError::from))
            .collect::<Result<_, _>>()?;

        if let Some(keyword) = search.keyword.as_deref().map(str::to_ascii_lowercase) {
            jobs.retain(|job| {
                job.title.to_ascii_lowercase().contains(&keyword)
                    || job.company.to_ascii_lowercase().contains(&keyword)
                    || job.description.to_ascii_lowercase().contains(&keyword)
            });
        }

        let total = jobs.len();
        let jobs = jobs
            .into_iter()
            .skip(search.offset)
            .take(search.limit)
            .collect();
        Ok(JobSearchPage { jobs, total })
    }

    /// Fetch a listing; soft-deleted listings read as missing.
    pub fn get(&self, job_id: &str) -> Result<Job, JobError> {
        let stored = self
            .store
            .get(RecordKind::Job, &RecordId(job_id.to_string()))?
            .ok_or(JobError::NotFound)?;
        let job: Job = stored.decode()?;
        if job.status == JobStatus::Deleted {
            return Err(JobError::NotFound);
        }
        Ok(job)
    }

    /// Detail-page fetch: also bumps the view counter. A concurrent-edit
    /// conflict on the bump is logged and dropped.
    pub fn view(&self, job_id: &str) -> Result<Job, JobError> {
        let stored = self
            .store
            .get(RecordKind::Job, &RecordId(job_id.to_string()))?
            .ok_or(JobError::NotFound)?;
        let mut job: Job = stored.decode()?;
        if job.status == JobStatus::Deleted {
            return Err(JobError::NotFound);
        }

        job.views += 1;
        match self.store.update(
            RecordKind::Job,
            &stored.id,
            stored.revision,
            serde_json::to_value(&job).map_err(StoreError::from)?,
        ) {
            Ok(updated) => Ok(updated.decode()?),
            Err(StoreError::RevisionMismatch { .. }) => {
                warn!(job_id, "view counter bump dropped");
                job.views -= 1;
                Ok(job)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// An employer's own listings, newest first, deleted ones excluded.
    pub fn list_for_employer(&self, actor: &Actor) -> Result<Vec<Job>, JobError> {
        require_role(actor, Role::Employer)?;
        let page = self.store.fetch(
            RecordKind::Job,
            &RecordQuery::new()
                .filter(Filter::eq("employer_id", actor.user_id.clone()))
                .filter(Filter::ne("status", JobStatus::Deleted.label()))
                .order_desc("posted_date"),
        )?;
        page.records
            .iter()
            .map(|record| record.decode().map_err(JobError::from))
            .collect()
    }

    /// Edit a listing. Owner only.
    pub fn update(&self, actor: &Actor, job_id: &str, update: JobUpdate) -> Result<Job, JobError> {
        let (stored, mut job) = self.load_owned(actor, job_id)?;
        update.apply_to(&mut job);
        let updated = self.store.update(
            RecordKind::Job,
            &stored.id,
            stored.revision,
            serde_json::to_value(&job).map_err(StoreError::from)?,
        )?;
        Ok(updated.decode()?)
    }

    /// Pause or re-activate a listing. Owner only; deletion goes through
    /// [`JobService::delete`].
    pub fn set_status(&self, actor: &Actor, job_id: &str, status: JobStatus) -> Result<Job, JobError> {
        if status == JobStatus::Deleted {
            return Err(JobError::Validation(
                "use delete to remove a listing".to_string(),
            ));
        }
        let (stored, mut job) = self.load_owned(actor, job_id)?;
        job.status = status;
        let updated = self.store.update(
            RecordKind::Job,
            &stored.id,
            stored.revision,
            serde_json::to_value(&job).map_err(StoreError::from)?,
        )?;
        Ok(updated.decode()?)
    }

    /// Soft-delete a listing and close out its open applications, notifying
    /// each applicant. Deleting an already-deleted listing is a no-op.
    /// Returns the job and how many applications were closed.
    pub fn delete(&self, actor: &Actor, job_id: &str) -> Result<(Job, usize), JobError> {
        require_role(actor, Role::Employer)?;
        let stored = self
            .store
            .get(RecordKind::Job, &RecordId(job_id.to_string()))?
            .ok_or(JobError::NotFound)?;
        let mut job: Job = stored.decode()?;
        require_owner(actor, &job.employer_id)?;

        if job.status == JobStatus::Deleted {
            return Ok((job, 0));
        }

        job.status = JobStatus::Deleted;
        let updated = self.store.update(
            RecordKind::Job,
            &stored.id,
            stored.revision,
            serde_json::to_value(&job).map_err(StoreError::from)?,
        )?;
        let job: Job = updated.decode()?;

        let closed = self.applications.close_for_job(&job);
        info!(job_id = %job.id, closed, "listing deleted");
        Ok((job, closed))
    }

    fn load_owned(&self, actor: &Actor, job_id: &str) -> Result<(crate::store::StoredRecord, Job), JobError> {
        require_role(actor, Role::Employer)?;
        let stored = self
            .store
            .get(RecordKind::Job, &RecordId(job_id.to_string()))?
            .ok_or(JobError::NotFound)?;
        let job: Job = stored.decode()?;
        if job.status == JobStatus::Deleted {
            return Err(JobError::NotFound);
        }
        require_owner(actor, &job.employer_id)?;
        Ok((stored, job))
    }

    fn employer_company(&self, actor: &Actor) -> Result<String, JobError> {
        let stored = self
            .store
            .get(RecordKind::User, &RecordId(actor.user_id.clone()))?
            .ok_or_else(|| JobError::Validation("unknown employer account".to_string()))?;
        let user: User = stored.decode()?;
        user.company_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| JobError::Validation("a company name is required".to_string()))
    }
}
