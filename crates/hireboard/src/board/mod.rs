//! Domain services for the board: accounts, listings, applications with
//! their status machine, and deadline reminders, composed over one record
//! store and one notifier.

pub mod applications;
pub mod jobs;
pub mod reminders;
pub mod router;
pub mod users;

pub use router::board_router;

use std::sync::Arc;

use crate::board::applications::ApplicationService;
use crate::board::jobs::JobService;
use crate::board::reminders::ReminderService;
use crate::board::users::UserService;
use crate::notify::{Mailer, Notifier};
use crate::store::RecordStore;

/// Facade bundling the domain services behind one handle; this is the
/// state the HTTP layer carries.
pub struct Board<S: RecordStore> {
    pub users: Arc<UserService<S>>,
    pub jobs: Arc<JobService<S>>,
    pub applications: Arc<ApplicationService<S>>,
    pub reminders: Arc<ReminderService<S>>,
}

impl<S: RecordStore + 'static> Board<S> {
    pub fn new(store: Arc<S>, mailer: Arc<dyn Mailer>) -> Self {
        let notifier = Notifier::new(mailer);
        let users = Arc::new(UserService::new(store.clone(), notifier.clone()));
        let applications = Arc::new(ApplicationService::new(store.clone(), notifier.clone()));
        let jobs = Arc::new(JobService::new(store.clone(), applications.clone()));
        let reminders = Arc::new(ReminderService::new(store, notifier, users.clone()));

        Self {
            users,
            jobs,
            applications,
            reminders,
        }
    }
}

impl<S: RecordStore> Clone for Board<S> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            jobs: self.jobs.clone(),
            applications: self.applications.clone(),
            reminders: self.reminders.clone(),
        }
    }
}
