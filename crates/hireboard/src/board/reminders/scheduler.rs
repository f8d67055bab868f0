use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::service::ReminderService;
use crate::store::RecordStore;

/// Owns the recurring reminder sweep as a single scheduled task with
/// explicit start/stop. The first sweep runs immediately; subsequent sweeps
/// run once per period until [`ReminderScheduler::stop`] is called, which
/// cancels promptly and joins the task.
pub struct ReminderScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ReminderScheduler {
    pub fn start<S>(service: Arc<ReminderService<S>>, period: Duration) -> Self
    where
        S: RecordStore + 'static,
    {
        let (shutdown, mut signal) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let sent = service.run_sweep(Utc::now());
                        if sent > 0 {
                            info!(sent, "deadline reminder sweep dispatched");
                        } else {
                            debug!("deadline reminder sweep found nothing to send");
                        }
                    }
                    changed = signal.changed() => {
                        if changed.is_err() || *signal.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::applications::domain::{Application, ApplicationStatus};
    use crate::board::users::{NewUser, UserService};
    use crate::notify::{MockMailer, Notifier};
    use crate::policy::Role;
    use crate::store::{InMemoryRecordStore, RecordKind, RecordStore};

    #[tokio::test]
    async fn scheduler_runs_an_immediate_sweep_and_stops_cleanly() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mailer = MockMailer::default();
        let notifier = Notifier::new(Arc::new(mailer.clone()));
        let users = Arc::new(UserService::new(store.clone(), notifier.clone()));
        let service = Arc::new(ReminderService::new(store.clone(), notifier, users.clone()));

        let user = users
            .register(NewUser {
                email: "ada@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                role: Role::Candidate,
                company_name: None,
                company_size: None,
            })
            .expect("registers");

        let application = Application {
            id: String::new(),
            job_id: "job-000001".to_string(),
            user_id: user.id.clone(),
            job_title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            status: ApplicationStatus::Applied,
            date_applied: Utc::now(),
            deadline: Some(Utc::now() + chrono::Duration::days(1)),
            notes: String::new(),
        };
        store
            .create(
                RecordKind::Application,
                serde_json::to_value(&application).expect("serializes"),
            )
            .expect("creates");

        let scheduler = ReminderScheduler::start(service, Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop().await;

        let reminders = mailer
            .sent()
            .into_iter()
            .filter(|m| m.template == "deadline-reminder")
            .count();
        assert_eq!(reminders, 1);
    }
}
