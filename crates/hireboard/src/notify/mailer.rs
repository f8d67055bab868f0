use std::sync::{Arc, Mutex};

use tracing::info;

use crate::config::MailMode;

/// A rendered message handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub template: &'static str,
}

/// Mail dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// Trait describing the outbound mail transport.
pub trait Mailer: Send + Sync {
    fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// Simulated transport: records the message and logs it instead of
/// delivering. No retry, no queue, no delivery confirmation.
#[derive(Default, Clone)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for MockMailer {
    fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(
            template = message.template,
            to = %message.to,
            subject = %message.subject,
            "mock mail delivered"
        );
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message);
        Ok(())
    }
}

/// Resolve the transport for a configured mode. The live transport is not
/// wired up in this build and falls back to the mock.
pub fn mailer_for(mode: MailMode) -> Arc<dyn Mailer> {
    match mode {
        MailMode::Mock | MailMode::Live => Arc::new(MockMailer::default()),
    }
}
