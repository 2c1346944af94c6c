use std::env;

use super::types::{ConfigError, Environment, LogReaderMode, MailTransport};

pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn parse_u16(field: &'static str, value: String) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(super) fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    match value.map(|raw| raw.to_ascii_lowercase()).as_deref() {
        Some("production" | "prod") => Environment::Production,
        Some("staging") => Environment::Staging,
        Some("test" | "testing") => Environment::Test,
        _ => Environment::Development,
    }
}

pub(super) fn parse_log_reader_mode(value: String) -> Result<LogReaderMode, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "database" | "db" | "sql" => Ok(LogReaderMode::Database),
        "none" | "off" | "disabled" => Ok(LogReaderMode::None),
        _ => Err(ConfigError::InvalidValue { field: "SWEEP_LOG_READER", value }),
    }
}

pub(super) fn parse_mail_transport(value: String) -> Result<MailTransport, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "outbox" => Ok(MailTransport::Outbox),
        "relay" | "http" => Ok(MailTransport::Relay),
        _ => Err(ConfigError::InvalidValue { field: "MAIL_TRANSPORT", value }),
    }
}
