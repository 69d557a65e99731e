//! SMB endpoint settings
//!
//! Read from the command line or the environment. Validation happens per
//! request so the service can start (and report itself unhealthy) without a
//! complete configuration.

use std::time::Duration;

use clap::{ArgAction, Args};
use thiserror::Error;

use crate::relay::RetryConfig;
use crate::smb::{AuthMode, ConnectionParameters, DEFAULT_SMB_PORT};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing SMB configuration environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),
}

/// Truthy strings: `1`, `true`, `yes`, `on` (case-insensitive). Everything
/// else is false.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    ))
}

#[derive(Args, Debug, Clone)]
pub struct SmbSettings {
    #[arg(long, env = "SMB_SERVER_NAME", help = "NetBIOS/DNS name of the SMB server")]
    pub server_name: Option<String>,

    #[arg(long, env = "SMB_SERVER_IP", help = "Network address of the SMB server")]
    pub server_ip: Option<String>,

    #[arg(long, env = "SMB_SHARE_NAME", help = "Share to upload into")]
    pub share_name: Option<String>,

    #[arg(long, env = "SMB_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "SMB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "SMB_DOMAIN")]
    pub domain: Option<String>,

    #[arg(long, env = "SMB_PORT", default_value_t = DEFAULT_SMB_PORT)]
    pub port: u16,

    #[arg(
        long,
        env = "SMB_USE_NTLM_V2",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = parse_flag,
        help = "Legacy switch: NTLM when true, negotiate when false"
    )]
    pub use_ntlm_v2: bool,

    #[arg(
        long,
        env = "SMB_AUTH_PROTOCOL",
        help = "ntlm, negotiate or kerberos; overrides --use-ntlm-v2"
    )]
    pub auth_protocol: Option<String>,

    #[arg(long, env = "SMB_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, env = "SMB_TRANSFER_TIMEOUT_SECS", default_value_t = 600)]
    pub transfer_timeout_secs: u64,

    #[arg(
        long,
        env = "SMB_LOG_COMMANDS",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = parse_flag,
        help = "Log every smbclient command (secrets redacted)"
    )]
    pub log_commands: bool,

    #[arg(long, env = "SMB_MAX_RETRIES", default_value_t = 3)]
    pub max_retries: usize,

    #[arg(long, env = "SMB_RETRY_INITIAL_DELAY", default_value_t = 1.0)]
    pub retry_initial_delay: f64,

    #[arg(long, env = "SMB_RETRY_MAX_DELAY", default_value_t = 30.0)]
    pub retry_max_delay: f64,

    #[arg(long, env = "SMB_RETRY_BACKOFF", default_value_t = 2.0)]
    pub retry_backoff: f64,
}

impl Default for SmbSettings {
    fn default() -> Self {
        Self {
            server_name: None,
            server_ip: None,
            share_name: None,
            username: None,
            password: None,
            domain: None,
            port: DEFAULT_SMB_PORT,
            use_ntlm_v2: true,
            auth_protocol: None,
            timeout_secs: 30,
            transfer_timeout_secs: 600,
            log_commands: false,
            max_retries: 3,
            retry_initial_delay: 1.0,
            retry_max_delay: 30.0,
            retry_backoff: 2.0,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl SmbSettings {
    pub fn auth_mode(&self) -> AuthMode {
        AuthMode::resolve(self.auth_protocol.as_deref(), self.use_ntlm_v2)
    }

    /// Names of required variables that are unset or empty, in a fixed order.
    pub fn missing(&self) -> Vec<String> {
        let needs_password = self.auth_mode().requires_password();
        [
            ("SMB_SERVER_NAME", &self.server_name, true),
            ("SMB_SERVER_IP", &self.server_ip, true),
            ("SMB_SHARE_NAME", &self.share_name, true),
            ("SMB_USERNAME", &self.username, needs_password),
            ("SMB_PASSWORD", &self.password, needs_password),
        ]
        .into_iter()
        .filter(|(_, value, required)| *required && present(value).is_none())
        .map(|(name, _, _)| name.to_string())
        .collect()
    }

    /// Build validated connection parameters.
    pub fn connection_parameters(&self) -> Result<ConnectionParameters, ConfigError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let mut params = ConnectionParameters::new(
            present(&self.server_name).unwrap_or_default(),
            present(&self.server_ip).unwrap_or_default(),
            present(&self.share_name).unwrap_or_default(),
        )
        .with_port(self.port)
        .with_auth_mode(self.auth_mode())
        .with_timeout(Duration::from_secs(self.timeout_secs))
        .with_transfer_timeout(Duration::from_secs(self.transfer_timeout_secs))
        .with_command_logging(self.log_commands);

        params.username = present(&self.username).map(str::to_string);
        params.password = self.password.clone().filter(|p| !p.is_empty());
        if let Some(domain) = present(&self.domain) {
            params = params.with_domain(domain);
        }
        Ok(params)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.max_retries).with_backoff(
            self.retry_initial_delay,
            self.retry_backoff,
            self.retry_max_delay,
        )
    }
}
