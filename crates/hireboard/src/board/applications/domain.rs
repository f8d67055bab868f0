use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where an application sits in its lifecycle. Employers drive
/// `Applied → Interview → {Offer, Rejected}`; `JobClosed` is reached from
/// any state when the owning job is deleted. Transitions are not validated
/// for legality; the last employer action wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
    #[serde(rename = "job_closed")]
    JobClosed,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::JobClosed => "job_closed",
        }
    }

    /// Open applications are the ones a job deletion still has to close out.
    pub const fn is_open(self) -> bool {
        matches!(self, ApplicationStatus::Applied | ApplicationStatus::Interview)
    }
}

/// A candidate's application to one job. Job title and company are copied
/// from the listing at apply time so the tracker stays readable after the
/// job record changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub job_title: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub date_applied: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

/// Apply payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    pub job_id: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

/// A scheduled interview for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    #[serde(default)]
    pub id: String,
    pub application_id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub employer_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub interview_type: String,
    pub location_type: String,
    pub location: String,
    #[serde(default)]
    pub notes: String,
}

/// Interview details supplied by the employer.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewRequest {
    pub date: NaiveDate,
    pub time: String,
    pub interview_type: String,
    pub location_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
}
