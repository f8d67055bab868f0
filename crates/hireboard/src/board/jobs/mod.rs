pub mod domain;
pub mod service;

pub use domain::{Job, JobSearch, JobStatus, JobUpdate, NewJob};
pub use service::{JobError, JobSearchPage, JobService};
