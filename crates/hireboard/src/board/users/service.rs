use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use super::domain::{EmailPreferences, NewUser, User};
use crate::notify::{EmailTemplate, Notifier};
use crate::policy::{require_owner, Actor, PolicyError, Role};
use crate::store::{Filter, RecordId, RecordKind, RecordQuery, RecordStore, StoreError};

/// Account registration and email-preference management.
pub struct UserService<S> {
    store: Arc<S>,
    notifier: Notifier,
}

/// Error raised by account operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<S: RecordStore> UserService<S> {
    pub fn new(store: Arc<S>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Create an account. Employers must name their company. A welcome mail
    /// is sent best-effort; registration succeeds even if it fails.
    pub fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        validate(&new_user)?;

        let existing = self.store.fetch(
            RecordKind::User,
            &RecordQuery::new().filter(Filter::eq("email", new_user.email.clone())),
        )?;
        if existing.total > 0 {
            return Err(UserError::DuplicateEmail);
        }

        let user = User {
            id: String::new(),
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            role: new_user.role,
            company_name: new_user.company_name,
            company_size: new_user.company_size,
            email_preferences: EmailPreferences::default(),
        };

        let stored = self
            .store
            .create(
                RecordKind::User,
                serde_json::to_value(&user).map_err(StoreError::from)?,
            )?;
        let user: User = stored.decode()?;

        let mut data = BTreeMap::new();
        data.insert("firstName".to_string(), user.first_name.clone());
        data.insert("role".to_string(), user.role.label().to_string());
        if let Err(err) = self.notifier.send(&user, EmailTemplate::Welcome, &data) {
            warn!(user_id = %user.id, %err, "welcome mail failed");
        }

        Ok(user)
    }

    pub fn get(&self, user_id: &str) -> Result<User, UserError> {
        let stored = self
            .store
            .get(RecordKind::User, &RecordId(user_id.to_string()))?
            .ok_or(UserError::NotFound)?;
        Ok(stored.decode()?)
    }

    pub fn get_by_email(&self, email: &str) -> Result<User, UserError> {
        let page = self.store.fetch(
            RecordKind::User,
            &RecordQuery::new().filter(Filter::eq("email", email)),
        )?;
        let record = page.records.first().ok_or(UserError::NotFound)?;
        Ok(record.decode()?)
    }

    /// Every candidate account, used by the reminder sweep.
    pub fn list_candidates(&self) -> Result<Vec<User>, UserError> {
        let page = self.store.fetch(
            RecordKind::User,
            &RecordQuery::new().filter(Filter::eq("role", Role::Candidate.label())),
        )?;
        page.records
            .iter()
            .map(|record| record.decode().map_err(UserError::from))
            .collect()
    }

    /// Replace a user's notification preferences. Accounts can only change
    /// their own.
    pub fn update_email_preferences(
        &self,
        actor: &Actor,
        user_id: &str,
        preferences: EmailPreferences,
    ) -> Result<User, UserError> {
        require_owner(actor, user_id)?;

        let stored = self
            .store
            .get(RecordKind::User, &RecordId(user_id.to_string()))?
            .ok_or(UserError::NotFound)?;
        let mut user: User = stored.decode()?;
        user.email_preferences = preferences;

        let updated = self.store.update(
            RecordKind::User,
            &stored.id,
            stored.revision,
            serde_json::to_value(&user).map_err(StoreError::from)?,
        )?;
        Ok(updated.decode()?)
    }
}

fn validate(new_user: &NewUser) -> Result<(), UserError> {
    let email = new_user.email.trim();
    if !email.contains('@') || !email.contains('.') {
        return Err(UserError::Validation(
            "a valid email address is required".to_string(),
        ));
    }
    if new_user.first_name.trim().is_empty() || new_user.last_name.trim().is_empty() {
        return Err(UserError::Validation(
            "first and last name are required".to_string(),
        ));
    }
    if new_user.role == Role::Employer
        && new_user
            .company_name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
    {
        return Err(UserError::Validation(
            "employer accounts must include a company name".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MockMailer;
    use crate::store::InMemoryRecordStore;

    fn service() -> (UserService<InMemoryRecordStore>, MockMailer) {
        let mailer = MockMailer::default();
        let service = UserService::new(
            Arc::new(InMemoryRecordStore::new()),
            Notifier::new(Arc::new(mailer.clone())),
        );
        (service, mailer)
    }

    fn candidate_payload() -> NewUser {
        NewUser {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::Candidate,
            company_name: None,
            company_size: None,
        }
    }

    #[test]
    fn register_persists_and_sends_welcome() {
        let (service, mailer) = service();
        let user = service.register(candidate_payload()).expect("registers");

        assert!(user.id.starts_with("usr-"));
        assert!(user.email_preferences.deadline_reminders);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, "welcome");
        assert_eq!(sent[0].subject, "Welcome to HireBoard, Ada!");
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let (service, _) = service();
        service.register(candidate_payload()).expect("registers");
        match service.register(candidate_payload()) {
            Err(UserError::DuplicateEmail) => {}
            other => panic!("expected duplicate email, got {other:?}"),
        }
    }

    #[test]
    fn register_requires_company_for_employers() {
        let (service, _) = service();
        let payload = NewUser {
            email: "hr@acme.com".to_string(),
            role: Role::Employer,
            company_name: None,
            ..candidate_payload()
        };
        match service.register(payload) {
            Err(UserError::Validation(message)) => assert!(message.contains("company")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn preferences_update_is_self_service_only() {
        let (service, _) = service();
        let user = service.register(candidate_payload()).expect("registers");

        let stranger = Actor::candidate("usr-999999");
        match service.update_email_preferences(&stranger, &user.id, EmailPreferences::default()) {
            Err(UserError::Policy(PolicyError::NotOwner)) => {}
            other => panic!("expected ownership error, got {other:?}"),
        }

        let own = Actor::candidate(&user.id);
        let updated = service
            .update_email_preferences(
                &own,
                &user.id,
                EmailPreferences {
                    deadline_reminders: false,
                    ..EmailPreferences::default()
                },
            )
            .expect("updates preferences");
        assert!(!updated.email_preferences.deadline_reminders);
    }
}
