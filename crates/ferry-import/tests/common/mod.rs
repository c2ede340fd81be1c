//! Test doubles shared by the import integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use ferry_core::notifications::NotificationError;
use ferry_core::{AccessToken, ImportOptions, ImportSource, UserRef};
use ferry_import::{
    AuthContext, ImportError, ImportFailure, ImportNotifier, ImportResult, ImportSuccess,
    ImportedProject, ImporterProvider, ProjectImporter, RemoteProject, RemoteUser,
};

pub fn test_user() -> UserRef {
    UserRef::new(1, "alice", "alice@example.com")
}

/// Builds the error an importer call should fail with
pub type ErrorFactory = Arc<dyn Fn() -> ImportError + Send + Sync>;

/// Everything the mock importers saw, shared with the test
#[derive(Default)]
pub struct ImporterCalls {
    pub import_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub imported: Mutex<Vec<(String, ImportOptions)>>,
    pub tokens: Mutex<Vec<String>>,
    pub users: Mutex<Vec<UserRef>>,
}

pub struct MockProvider {
    source: ImportSource,
    pub calls: Arc<ImporterCalls>,
    project: ImportedProject,
    fail_with: Option<ErrorFactory>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new(source: ImportSource) -> Self {
        Self {
            source,
            calls: Arc::new(ImporterCalls::default()),
            project: ImportedProject {
                id: 10,
                slug: "demo-project".to_string(),
                name: "Demo project".to_string(),
            },
            fail_with: None,
            delay: None,
        }
    }

    /// Every import takes `delay` before it returns
    pub fn slow(source: ImportSource, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(source)
        }
    }

    /// Every importer call fails with the error built by `factory`
    pub fn failing<F>(source: ImportSource, factory: F) -> Self
    where
        F: Fn() -> ImportError + Send + Sync + 'static,
    {
        Self {
            fail_with: Some(Arc::new(factory)),
            ..Self::new(source)
        }
    }
}

#[async_trait]
impl ImporterProvider for MockProvider {
    fn source(&self) -> ImportSource {
        self.source
    }

    fn auth_url(&self) -> ImportResult<String> {
        Ok(format!("https://{}.example.com/oauth/authorize", self.source))
    }

    async fn access_token(&self, code: &str) -> ImportResult<AccessToken> {
        if code == "valid-code" {
            Ok(AccessToken::new("token-from-code"))
        } else {
            Err(ImportError::InvalidAuthResult(format!(
                "code {} was rejected",
                code
            )))
        }
    }

    fn importer(&self, user: &UserRef, token: &AccessToken) -> Box<dyn ProjectImporter> {
        self.calls.tokens.lock().unwrap().push(token.expose().to_string());
        self.calls.users.lock().unwrap().push(user.clone());
        Box::new(MockImporter {
            calls: self.calls.clone(),
            project: self.project.clone(),
            fail_with: self.fail_with.clone(),
            delay: self.delay,
        })
    }
}

pub struct MockImporter {
    calls: Arc<ImporterCalls>,
    project: ImportedProject,
    fail_with: Option<ErrorFactory>,
    delay: Option<Duration>,
}

impl MockImporter {
    fn check(&self) -> ImportResult<()> {
        match &self.fail_with {
            Some(factory) => Err(factory()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProjectImporter for MockImporter {
    async fn list_projects(&self) -> ImportResult<Vec<RemoteProject>> {
        self.check()?;
        Ok(vec![RemoteProject {
            id: "42".to_string(),
            name: "Remote project".to_string(),
            description: None,
            url: Some("https://example.com/projects/42".to_string()),
        }])
    }

    async fn list_users(&self, project_id: &str) -> ImportResult<Vec<RemoteUser>> {
        self.check()?;
        Ok(vec![RemoteUser {
            id: format!("{}-owner", project_id),
            username: "remote-alice".to_string(),
            full_name: Some("Alice Remote".to_string()),
            detected_user: Some(test_user()),
        }])
    }

    async fn import_project(
        &self,
        project_id: &str,
        options: &ImportOptions,
    ) -> ImportResult<ImportedProject> {
        self.calls.import_calls.fetch_add(1, Ordering::SeqCst);
        self.calls
            .imported
            .lock()
            .unwrap()
            .push((project_id.to_string(), options.clone()));

        let running = self.calls.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.check()?;
        Ok(self.project.clone())
    }
}

/// Notifier that records what it was asked to send
#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<ImportSuccess>>,
    pub failures: Mutex<Vec<(UserRef, String, String)>>,
    pub attempts: AtomicUsize,
    /// Number of leading attempts that fail
    pub failing_attempts: AtomicUsize,
    pub always_fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing_first(attempts: usize) -> Self {
        let notifier = Self::default();
        notifier.failing_attempts.store(attempts, Ordering::SeqCst);
        notifier
    }

    pub fn broken() -> Self {
        let notifier = Self::default();
        notifier.always_fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn success_count(&self) -> usize {
        self.successes.lock().unwrap().len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.lock().unwrap().len()
    }

    fn attempt(&self) -> Result<(), NotificationError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.always_fail.load(Ordering::SeqCst)
            || attempt < self.failing_attempts.load(Ordering::SeqCst)
        {
            return Err(NotificationError::ServiceUnavailable(
                "smtp relay down".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ImportNotifier for RecordingNotifier {
    async fn notify_success(&self, success: &ImportSuccess) -> Result<(), NotificationError> {
        self.attempt()?;
        self.successes.lock().unwrap().push(success.clone());
        Ok(())
    }

    async fn notify_failure(&self, failure: &ImportFailure) -> Result<(), NotificationError> {
        self.attempt()?;
        self.failures.lock().unwrap().push((
            failure.requesting_user.clone(),
            failure.external_project_id.clone(),
            failure.error.to_string(),
        ));
        Ok(())
    }
}

/// Router that behaves as if upstream middleware authenticated `user`
pub fn authenticated(router: Router, user: UserRef) -> Router {
    router.layer(axum::Extension(AuthContext::new(user)))
}
