use std::collections::BTreeMap;

use super::EmailCategory;

/// The named templates the notifier can render. Subjects and bodies carry
/// `{{key}}` placeholders substituted textually at send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    Welcome,
    ApplicationConfirmation,
    StatusUpdate,
    InterviewInvitation,
    DeadlineReminder,
}

impl EmailTemplate {
    pub const fn name(self) -> &'static str {
        match self {
            EmailTemplate::Welcome => "welcome",
            EmailTemplate::ApplicationConfirmation => "application-confirmation",
            EmailTemplate::StatusUpdate => "status-update",
            EmailTemplate::InterviewInvitation => "interview-invitation",
            EmailTemplate::DeadlineReminder => "deadline-reminder",
        }
    }

    pub const fn category(self) -> EmailCategory {
        match self {
            EmailTemplate::Welcome => EmailCategory::Welcome,
            EmailTemplate::ApplicationConfirmation => EmailCategory::ApplicationConfirmations,
            EmailTemplate::StatusUpdate => EmailCategory::StatusUpdates,
            EmailTemplate::InterviewInvitation => EmailCategory::InterviewInvitations,
            EmailTemplate::DeadlineReminder => EmailCategory::DeadlineReminders,
        }
    }

    pub const fn subject(self) -> &'static str {
        match self {
            EmailTemplate::Welcome => "Welcome to HireBoard, {{firstName}}!",
            EmailTemplate::ApplicationConfirmation => {
                "Application received: {{jobTitle}} at {{company}}"
            }
            EmailTemplate::StatusUpdate => "Update on your application for {{jobTitle}}",
            EmailTemplate::InterviewInvitation => {
                "Interview invitation: {{jobTitle}} at {{company}}"
            }
            EmailTemplate::DeadlineReminder => "Reminder: {{jobTitle}} deadline in {{daysLeft}} day(s)",
        }
    }

    // The welcome body keeps the role-conditional markup from the original
    // mail templates. The renderer substitutes `{{key}}` placeholders only,
    // so the conditional markers pass through verbatim.
    pub const fn body(self) -> &'static str {
        match self {
            EmailTemplate::Welcome => {
                "<h1>Welcome to HireBoard, {{firstName}}!</h1>\n\
                 <p>Your {{role}} account is ready.</p>\n\
                 {{#if employer}}<p>Post your first listing from the employer dashboard.</p>{{/if}}\n\
                 {{#if candidate}}<p>Browse openings and track every application in one place.</p>{{/if}}"
            }
            EmailTemplate::ApplicationConfirmation => {
                "<h1>Application received</h1>\n\
                 <p>Hi {{firstName}},</p>\n\
                 <p>Your application for <strong>{{jobTitle}}</strong> at {{company}} has been submitted. \
                 You can follow its status from the My Applications page.</p>"
            }
            EmailTemplate::StatusUpdate => {
                "<h1>Application update</h1>\n\
                 <p>Hi {{firstName}},</p>\n\
                 <p>Your application for <strong>{{jobTitle}}</strong> at {{company}} moved to \
                 <strong>{{status}}</strong>.</p>"
            }
            EmailTemplate::InterviewInvitation => {
                "<h1>You have an interview!</h1>\n\
                 <p>Hi {{firstName}},</p>\n\
                 <p>{{company}} would like to interview you for <strong>{{jobTitle}}</strong>.</p>\n\
                 <p>{{date}} at {{time}} ({{interviewType}}, {{location}})</p>"
            }
            EmailTemplate::DeadlineReminder => {
                "<h1>Deadline approaching</h1>\n\
                 <p>Hi {{firstName}},</p>\n\
                 <p>The deadline for <strong>{{jobTitle}}</strong> at {{company}} is in \
                 {{daysLeft}} day(s). Make sure everything is in order.</p>"
            }
        }
    }
}

/// Substitute `{{key}}` placeholders textually. No escaping, no conditional
/// evaluation; placeholders with no matching key are left intact.
pub fn render(template: &str, data: &BTreeMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in data {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }
    rendered
}
