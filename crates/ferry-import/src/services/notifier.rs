//! Outcome notifications for import jobs

use async_trait::async_trait;
use ferry_core::notifications::{DynNotificationService, EmailMessage, NotificationError};
use ferry_core::UserRef;

use super::outcome::{ImportFailure, ImportSuccess};

/// Tells the requesting user how their import went
#[async_trait]
pub trait ImportNotifier: Send + Sync {
    async fn notify_success(&self, success: &ImportSuccess) -> Result<(), NotificationError>;
    async fn notify_failure(&self, failure: &ImportFailure) -> Result<(), NotificationError>;
}

/// Sends import outcomes as email through the configured notification service
pub struct EmailImportNotifier {
    notification_service: DynNotificationService,
}

impl EmailImportNotifier {
    pub fn new(notification_service: DynNotificationService) -> Self {
        Self {
            notification_service,
        }
    }

    pub fn success_message(success: &ImportSuccess) -> Result<EmailMessage, NotificationError> {
        let source = success.source.display_name();
        let project = &success.local_project;
        let user = &success.requesting_user;

        Ok(EmailMessage {
            to: vec![recipient(user)?],
            subject: format!("{} project imported", source),
            body: format!(
                "Hi {username},\n\nYour {source} project has been imported as \"{name}\" ({slug}).\n",
                username = user.username,
                source = source,
                name = project.name,
                slug = project.slug
            ),
            html_body: Some(format!(
                r#"<!DOCTYPE html>
                <html>
                <body style="font-family: Arial, sans-serif; line-height: 1.6;">
                    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                        <h2>{source} project imported</h2>
                        <p>Hi {username},</p>
                        <p>Your {source} project has been imported as <strong>{name}</strong> ({slug}).</p>
                    </div>
                </body>
                </html>"#,
                source = source,
                username = user.username,
                name = project.name,
                slug = project.slug
            )),
            from: None,
            reply_to: None,
        })
    }

    pub fn failure_message(failure: &ImportFailure) -> Result<EmailMessage, NotificationError> {
        let source = failure.source.display_name();
        let user = &failure.requesting_user;

        Ok(EmailMessage {
            to: vec![recipient(user)?],
            subject: failure.message.clone(),
            body: format!(
                "Hi {username},\n\n{message}: project {project_id} could not be imported.\n\nReason: {error}\n",
                username = user.username,
                message = failure.message,
                project_id = failure.external_project_id,
                error = failure.error
            ),
            html_body: Some(format!(
                r#"<!DOCTYPE html>
                <html>
                <body style="font-family: Arial, sans-serif; line-height: 1.6;">
                    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                        <h2>{message}</h2>
                        <p>Hi {username},</p>
                        <p>Your {source} project <strong>{project_id}</strong> could not be imported.</p>
                        <p style="color: #666;">Reason: {error}</p>
                    </div>
                </body>
                </html>"#,
                message = failure.message,
                username = user.username,
                source = source,
                project_id = failure.external_project_id,
                error = failure.error
            )),
            from: None,
            reply_to: None,
        })
    }
}

fn recipient(user: &UserRef) -> Result<String, NotificationError> {
    let email = user.email.trim();
    if email.is_empty() {
        return Err(NotificationError::InvalidRecipient(format!(
            "user {} has no email address",
            user.id
        )));
    }
    Ok(email.to_string())
}

#[async_trait]
impl ImportNotifier for EmailImportNotifier {
    async fn notify_success(&self, success: &ImportSuccess) -> Result<(), NotificationError> {
        let message = Self::success_message(success)?;
        self.notification_service.send_email(message).await
    }

    async fn notify_failure(&self, failure: &ImportFailure) -> Result<(), NotificationError> {
        let message = Self::failure_message(failure)?;
        self.notification_service.send_email(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::ImportSource;
    use ferry_import_types::{ImportError, ImportedProject};
    use ferry_core::notifications::NotificationService;
    use std::sync::{Arc, Mutex};

    fn user() -> UserRef {
        UserRef::new(7, "alice", "alice@example.com")
    }

    #[derive(Default)]
    struct RecordingService {
        sent: Mutex<Vec<EmailMessage>>,
        unavailable: bool,
    }

    #[async_trait]
    impl NotificationService for RecordingService {
        async fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError> {
            if self.unavailable {
                return Err(NotificationError::ServiceUnavailable(
                    "smtp relay down".to_string(),
                ));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn is_configured(&self) -> Result<bool, NotificationError> {
            Ok(!self.unavailable)
        }
    }

    fn success() -> ImportSuccess {
        ImportSuccess {
            source: ImportSource::Github,
            local_project: ImportedProject {
                id: 1,
                slug: "demo-project".to_string(),
                name: "Demo project".to_string(),
            },
            requesting_user: user(),
        }
    }

    fn failure() -> ImportFailure {
        ImportFailure {
            source: ImportSource::Asana,
            requesting_user: user(),
            external_project_id: "42".to_string(),
            error: ImportError::FailedRequest("rate limited".to_string()),
            message: "Error importing Asana project".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notify_success_sends_one_email_to_user() {
        let service = Arc::new(RecordingService::default());
        let notifier = EmailImportNotifier::new(service.clone());

        notifier.notify_success(&success()).await.unwrap();

        let sent = service.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["alice@example.com".to_string()]);
        assert_eq!(sent[0].subject, "GitHub project imported");
    }

    #[tokio::test]
    async fn test_notify_failure_sends_one_email_to_user() {
        let service = Arc::new(RecordingService::default());
        let notifier = EmailImportNotifier::new(service.clone());

        notifier.notify_failure(&failure()).await.unwrap();

        let sent = service.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["alice@example.com".to_string()]);
        assert_eq!(sent[0].subject, "Error importing Asana project");
        assert!(sent[0].body.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_delivery_errors_reach_the_caller() {
        let service = Arc::new(RecordingService {
            unavailable: true,
            ..RecordingService::default()
        });
        let notifier = EmailImportNotifier::new(service);

        let result = notifier.notify_success(&success()).await;
        assert!(matches!(result, Err(NotificationError::ServiceUnavailable(_))));
    }

    #[test]
    fn test_success_message_addresses_requesting_user() {
        let success = ImportSuccess {
            source: ImportSource::Github,
            local_project: ImportedProject {
                id: 1,
                slug: "demo-project".to_string(),
                name: "Demo project".to_string(),
            },
            requesting_user: user(),
        };

        let message = EmailImportNotifier::success_message(&success).unwrap();
        assert_eq!(message.to, vec!["alice@example.com".to_string()]);
        assert_eq!(message.subject, "GitHub project imported");
        assert!(message.body.contains("demo-project"));
        assert!(message.html_body.unwrap().contains("demo-project"));
    }

    #[test]
    fn test_failure_message_includes_project_and_error() {
        let failure = ImportFailure {
            source: ImportSource::Trello,
            requesting_user: user(),
            external_project_id: "42".to_string(),
            error: ImportError::RateLimited("try again in 60s".to_string()),
            message: "Error importing Trello project".to_string(),
        };

        let message = EmailImportNotifier::failure_message(&failure).unwrap();
        assert_eq!(message.to, vec!["alice@example.com".to_string()]);
        assert_eq!(message.subject, "Error importing Trello project");
        assert!(message.body.contains("42"));
        assert!(message.body.contains("try again in 60s"));
    }

    #[test]
    fn test_missing_email_is_invalid_recipient() {
        let failure = ImportFailure {
            source: ImportSource::Jira,
            requesting_user: UserRef::new(3, "nomail", "  "),
            external_project_id: "PRJ".to_string(),
            error: ImportError::Unauthorized("token revoked".to_string()),
            message: "Error importing Jira project".to_string(),
        };

        let result = EmailImportNotifier::failure_message(&failure);
        assert!(matches!(result, Err(NotificationError::InvalidRecipient(_))));
    }
}
