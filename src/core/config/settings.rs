use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_environment, parse_log_reader_mode,
    parse_mail_transport, parse_u16, parse_u64,
};
use super::types::{
    ConfigError, DatabaseSettings, MailSettings, MailTransport, RedisSettings, RuntimeSettings,
    Settings, SweepSettings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment =
            parse_environment(env_optional("SWEEP_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("SWEEP_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();
        let run_migrations =
            env_optional("SWEEP_RUN_MIGRATIONS").map(|value| parse_bool(&value)).unwrap_or(false);

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "platform");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "platform");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = parse_u16(
            "POSTGRES_MAX_CONNECTIONS",
            env_or_default("POSTGRES_MAX_CONNECTIONS", "4"),
        )?;

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");
        let lock_enabled =
            env_optional("SWEEP_LOCK_ENABLED").map(|value| parse_bool(&value)).unwrap_or(true);

        let interval_seconds =
            parse_u64("SWEEP_INTERVAL_SECONDS", env_or_default("SWEEP_INTERVAL_SECONDS", "3600"))?;
        let lookback_seconds =
            parse_u64("SWEEP_LOOKBACK_SECONDS", env_or_default("SWEEP_LOOKBACK_SECONDS", "3600"))?;
        let event_name = env_or_default("SWEEP_EVENT_NAME", "user_enrolment_updated");
        let instructor_role = env_or_default("SWEEP_INSTRUCTOR_ROLE", "instr");
        let log_reader = parse_log_reader_mode(env_or_default("SWEEP_LOG_READER", "database"))?;

        let transport = parse_mail_transport(env_or_default("MAIL_TRANSPORT", "outbox"))?;
        let relay_url = env_or_default("MAIL_RELAY_URL", "");
        let relay_token = env_or_default("MAIL_RELAY_TOKEN", "");
        let relay_timeout_seconds = parse_u64(
            "MAIL_RELAY_TIMEOUT_SECONDS",
            env_or_default("MAIL_RELAY_TIMEOUT_SECONDS", "30"),
        )?;
        let sender_address = env_or_default("MAIL_SENDER_ADDRESS", "noreply@localhost");
        let sender_name = env_or_default("MAIL_SENDER_NAME", "Course administration");

        let log_level = env_or_default("SWEEP_LOG_LEVEL", "info");
        let json = env_optional("SWEEP_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_listen_addr = env_or_default("PROMETHEUS_LISTEN_ADDR", "0.0.0.0:9108");

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config, run_migrations },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections: u32::from(max_connections),
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
                lock_enabled,
            },
            sweep: SweepSettings {
                interval_seconds,
                lookback_seconds,
                event_name,
                instructor_role,
                log_reader,
            },
            mail: MailSettings {
                transport,
                relay_url,
                relay_token,
                relay_timeout_seconds,
                sender_address,
                sender_name,
            },
            telemetry: TelemetrySettings {
                log_level,
                json,
                prometheus_enabled,
                prometheus_listen_addr,
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn sweep(&self) -> &SweepSettings {
        &self.sweep
    }

    pub(crate) fn mail(&self) -> &MailSettings {
        &self.mail
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SWEEP_INTERVAL_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.sweep.lookback_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SWEEP_LOOKBACK_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "POSTGRES_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        if self.sweep.instructor_role.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "SWEEP_INSTRUCTOR_ROLE",
                value: self.sweep.instructor_role.clone(),
            });
        }

        if !self.mail.sender_address.contains('@') {
            return Err(ConfigError::InvalidValue {
                field: "MAIL_SENDER_ADDRESS",
                value: self.mail.sender_address.clone(),
            });
        }

        if self.mail.transport == MailTransport::Relay {
            let url = self.mail.relay_url.as_str();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "MAIL_RELAY_URL",
                    value: self.mail.relay_url.clone(),
                });
            }
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.mail.transport == MailTransport::Relay && self.mail.relay_token.is_empty() {
            return Err(ConfigError::MissingSecret("MAIL_RELAY_TOKEN"));
        }

        Ok(())
    }
}
