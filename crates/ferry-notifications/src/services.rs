use async_trait::async_trait;
use ferry_core::notifications::{EmailMessage, NotificationError, NotificationService};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParametersBuilder},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

pub const ENV_SMTP_HOST: &str = "FERRY_SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "FERRY_SMTP_PORT";
pub const ENV_SMTP_USERNAME: &str = "FERRY_SMTP_USERNAME";
pub const ENV_SMTP_PASSWORD: &str = "FERRY_SMTP_PASSWORD";
pub const ENV_SMTP_FROM_ADDRESS: &str = "FERRY_SMTP_FROM_ADDRESS";
pub const ENV_SMTP_FROM_NAME: &str = "FERRY_SMTP_FROM_NAME";
pub const ENV_SMTP_TLS_MODE: &str = "FERRY_SMTP_TLS_MODE";

#[derive(Error, Debug)]
pub enum SmtpError {
    #[error("Invalid SMTP setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Failed to build SMTP transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl From<SmtpError> for NotificationError {
    fn from(error: SmtpError) -> Self {
        NotificationError::ConfigurationError(error.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    None,     // Plain connection
    #[default]
    Starttls, // Upgrade after connecting
    Tls,      // Direct TLS (SMTPS)
}

impl std::str::FromStr for TlsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(TlsMode::None),
            "starttls" => Ok(TlsMode::Starttls),
            "tls" => Ok(TlsMode::Tls),
            other => Err(format!("expected one of none, starttls, tls (got {})", other)),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_starttls_required() -> bool {
    true
}

/// Outgoing mail server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from_address: String,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub tls_mode: TlsMode,
    #[serde(default = "default_starttls_required")]
    pub starttls_required: bool, // Only used when tls_mode is Starttls
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl SmtpSettings {
    pub fn new(host: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_smtp_port(),
            username: None,
            password: None,
            from_address: from_address.into(),
            from_name: None,
            tls_mode: TlsMode::default(),
            starttls_required: default_starttls_required(),
            accept_invalid_certs: false,
        }
    }

    /// Read `FERRY_SMTP_*` environment variables; `None` when no host is set
    pub fn from_env() -> Result<Option<Self>, SmtpError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, SmtpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(host) = lookup(ENV_SMTP_HOST).filter(|host| !host.trim().is_empty()) else {
            return Ok(None);
        };
        let from_address = lookup(ENV_SMTP_FROM_ADDRESS).ok_or_else(|| SmtpError::InvalidSetting {
            key: ENV_SMTP_FROM_ADDRESS.to_string(),
            reason: "required when FERRY_SMTP_HOST is set".to_string(),
        })?;

        let mut settings = Self::new(host.trim(), from_address.trim());
        if let Some(port) = lookup(ENV_SMTP_PORT) {
            settings.port = port.trim().parse().map_err(|e| SmtpError::InvalidSetting {
                key: ENV_SMTP_PORT.to_string(),
                reason: format!("{}", e),
            })?;
        }
        if let Some(mode) = lookup(ENV_SMTP_TLS_MODE) {
            settings.tls_mode = mode.parse().map_err(|reason| SmtpError::InvalidSetting {
                key: ENV_SMTP_TLS_MODE.to_string(),
                reason,
            })?;
        }
        settings.username = lookup(ENV_SMTP_USERNAME);
        settings.password = lookup(ENV_SMTP_PASSWORD);
        settings.from_name = lookup(ENV_SMTP_FROM_NAME);

        Ok(Some(settings))
    }

    fn is_local(&self) -> bool {
        self.host == "localhost" || self.host == "127.0.0.1"
    }

    fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) if !username.is_empty() => {
                Some(Credentials::new(username.clone(), password.clone()))
            }
            _ => None,
        }
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, SmtpError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host).port(self.port);
        if let Some(credentials) = self.credentials() {
            builder = builder.credentials(credentials);
        }

        if self.tls_mode == TlsMode::None {
            return Ok(builder.build());
        }

        // Self-signed certificates are accepted for local relays
        let lenient = self.accept_invalid_certs || self.is_local();
        let tls = TlsParametersBuilder::new(self.host.clone())
            .dangerous_accept_invalid_certs(lenient)
            .dangerous_accept_invalid_hostnames(lenient)
            .build()?;

        let tls = match self.tls_mode {
            TlsMode::Starttls if self.starttls_required => Tls::Required(tls),
            TlsMode::Starttls => Tls::Opportunistic(tls),
            _ => Tls::Wrapper(tls),
        };
        Ok(builder.tls(tls).build())
    }
}

/// `NotificationService` that delivers email over SMTP
pub struct EmailNotificationService {
    settings: SmtpSettings,
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotificationService {
    pub fn new(settings: SmtpSettings) -> Result<Self, SmtpError> {
        let address = settings
            .from_address
            .parse()
            .map_err(|e| SmtpError::InvalidSetting {
                key: "from_address".to_string(),
                reason: format!("{}", e),
            })?;
        let from = Mailbox::new(settings.from_name.clone(), address);
        let mailer = settings.build_transport()?;

        Ok(Self {
            settings,
            from,
            mailer,
        })
    }

    pub fn settings(&self) -> &SmtpSettings {
        &self.settings
    }

    /// One message per recipient, so addresses are never disclosed to each other
    pub fn build_messages(&self, message: &EmailMessage) -> Result<Vec<Message>, NotificationError> {
        if message.to.is_empty() {
            return Err(NotificationError::InvalidRecipient(
                "message has no recipients".to_string(),
            ));
        }

        let from = match &message.from {
            Some(from) => parse_mailbox(from)?,
            None => self.from.clone(),
        };
        let reply_to = message.reply_to.as_deref().map(parse_mailbox).transpose()?;

        message
            .to
            .iter()
            .map(|recipient| {
                let mut builder = Message::builder()
                    .from(from.clone())
                    .to(parse_mailbox(recipient)?)
                    .subject(message.subject.clone());
                if let Some(reply_to) = &reply_to {
                    builder = builder.reply_to(reply_to.clone());
                }

                let built = match &message.html_body {
                    Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                        message.body.clone(),
                        html.clone(),
                    )),
                    None => builder
                        .header(ContentType::TEXT_PLAIN)
                        .body(message.body.clone()),
                };
                built.map_err(|e| NotificationError::SendError(e.to_string()))
            })
            .collect()
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .trim()
        .parse()
        .map_err(|e| NotificationError::InvalidRecipient(format!("{}: {}", address, e)))
}

#[async_trait]
impl NotificationService for EmailNotificationService {
    async fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError> {
        let emails = self.build_messages(&message)?;
        let total = emails.len();
        let mut failed = 0;

        for email in emails {
            if let Err(e) = self.mailer.send(email).await {
                error!("Failed to send email \"{}\": {}", message.subject, e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(NotificationError::SendError(format!(
                "{} of {} messages could not be delivered",
                failed, total
            )));
        }

        debug!("Sent email \"{}\" to {} recipient(s)", message.subject, total);
        Ok(())
    }

    async fn is_configured(&self) -> Result<bool, NotificationError> {
        self.mailer
            .test_connection()
            .await
            .map_err(|e| NotificationError::ServiceUnavailable(e.to_string()))
    }
}
