use serde::{Deserialize, Serialize};

use crate::notify::EmailCategory;
use crate::policy::Role;

/// An account on the board, either a candidate or an employer. Employer
/// accounts additionally carry company metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default)]
    pub email_preferences: EmailPreferences,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn enabled() -> bool {
    true
}

/// Per-category notification opt-outs. An unset flag defaults to enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPreferences {
    #[serde(default = "enabled")]
    pub welcome: bool,
    #[serde(default = "enabled")]
    pub application_confirmations: bool,
    #[serde(default = "enabled")]
    pub status_updates: bool,
    #[serde(default = "enabled")]
    pub interview_invitations: bool,
    #[serde(default = "enabled")]
    pub deadline_reminders: bool,
}

impl Default for EmailPreferences {
    fn default() -> Self {
        Self {
            welcome: true,
            application_confirmations: true,
            status_updates: true,
            interview_invitations: true,
            deadline_reminders: true,
        }
    }
}

impl EmailPreferences {
    pub const fn allows(&self, category: EmailCategory) -> bool {
        match category {
            EmailCategory::Welcome => self.welcome,
            EmailCategory::ApplicationConfirmations => self.application_confirmations,
            EmailCategory::StatusUpdates => self.status_updates,
            EmailCategory::InterviewInvitations => self.interview_invitations,
            EmailCategory::DeadlineReminders => self.deadline_reminders,
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
}
