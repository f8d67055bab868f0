//! Notification simulator: named templates, `{{key}}` substitution, and a
//! mock transport that logs instead of delivering. Sends are best-effort at
//! every call site; a failed notification never blocks the operation that
//! triggered it.

mod mailer;
mod template;

pub use mailer::{mailer_for, EmailMessage, MailError, Mailer, MockMailer};
pub use template::{render, EmailTemplate};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::board::users::User;

/// Per-user preference categories; each maps to one boolean on the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailCategory {
    Welcome,
    ApplicationConfirmations,
    StatusUpdates,
    InterviewInvitations,
    DeadlineReminders,
}

/// Renders templates and dispatches them through the configured transport,
/// honoring the recipient's per-category opt-outs.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Render and send one message. Returns `Ok(false)` when the recipient
    /// has opted out of the template's category.
    pub fn send(
        &self,
        recipient: &User,
        template: EmailTemplate,
        data: &BTreeMap<String, String>,
    ) -> Result<bool, MailError> {
        if !recipient.email_preferences.allows(template.category()) {
            return Ok(false);
        }

        let message = EmailMessage {
            to: recipient.email.clone(),
            subject: render(template.subject(), data),
            body: render(template.body(), data),
            template: template.name(),
        };
        self.mailer.send(message)?;
        Ok(true)
    }
}
