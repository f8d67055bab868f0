use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing lifecycle. Deletion is soft: the record stays, status flips to
/// `deleted`, and open applications are closed out by the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Inactive,
    Deleted,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Inactive => "inactive",
            JobStatus::Deleted => "deleted",
        }
    }
}

/// A job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub salary: String,
    pub description: String,
    pub requirements: String,
    pub industry: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
    pub employer_id: String,
    pub status: JobStatus,
    pub posted_date: DateTime<Utc>,
    #[serde(default)]
    pub applications: u32,
    #[serde(default)]
    pub views: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<DateTime<Utc>>,
}

/// Payload for posting a listing. Company defaults to the employer's
/// account company when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    pub location: String,
    pub job_type: String,
    #[serde(default)]
    pub salary: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,
}

/// Partial edit applied to an existing listing; absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub industry: Option<String>,
    pub responsibilities: Option<Vec<String>>,
    pub qualifications: Option<Vec<String>>,
    pub application_deadline: Option<DateTime<Utc>>,
}

impl JobUpdate {
    pub fn apply_to(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(salary) = self.salary {
            job.salary = salary;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(requirements) = self.requirements {
            job.requirements = requirements;
        }
        if let Some(industry) = self.industry {
            job.industry = industry;
        }
        if let Some(responsibilities) = self.responsibilities {
            job.responsibilities = responsibilities;
        }
        if let Some(qualifications) = self.qualifications {
            job.qualifications = qualifications;
        }
        if let Some(deadline) = self.application_deadline {
            job.application_deadline = Some(deadline);
        }
    }
}

/// Search parameters from the browse page. Keyword matches title, company,
/// and description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSearch {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}
