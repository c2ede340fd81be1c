//! SMTP delivery for Ferry notifications

pub mod services;

pub use services::{EmailNotificationService, SmtpError, SmtpSettings, TlsMode};
