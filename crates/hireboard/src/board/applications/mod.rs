pub mod domain;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationStatus, Interview, InterviewRequest, NewApplication,
};
pub use service::{ApplicationError, ApplicationService};
