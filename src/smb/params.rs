//! Connection parameters for one SMB share endpoint

use std::fmt;
use std::time::Duration;

/// Default SMB port (direct TCP)
pub const DEFAULT_SMB_PORT: u16 = 445;

/// Default timeout for connect, list, stat and mkdir commands
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a single file transfer
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(600);

/// Authentication protocol used to prove identity to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Ntlm,
    Negotiate,
    Kerberos,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Ntlm => "ntlm",
            AuthMode::Negotiate => "negotiate",
            AuthMode::Kerberos => "kerberos",
        }
    }

    /// Parse an explicit mode name (case-insensitive). Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ntlm" => Some(AuthMode::Ntlm),
            "negotiate" => Some(AuthMode::Negotiate),
            "kerberos" => Some(AuthMode::Kerberos),
            _ => None,
        }
    }

    /// Legacy mapping from the `ntlmv2` flag.
    pub fn from_legacy(use_ntlm_v2: bool) -> Self {
        if use_ntlm_v2 {
            AuthMode::Ntlm
        } else {
            AuthMode::Negotiate
        }
    }

    /// Effective mode: the explicit value when it is recognized, otherwise the
    /// legacy flag mapping. An invalid explicit value never propagates.
    pub fn resolve(explicit: Option<&str>, use_ntlm_v2: bool) -> Self {
        explicit
            .and_then(Self::parse)
            .unwrap_or_else(|| Self::from_legacy(use_ntlm_v2))
    }

    pub fn requires_password(&self) -> bool {
        !matches!(self, AuthMode::Kerberos)
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to open a session against one share.
///
/// Built once per request or health check and never mutated afterwards.
#[derive(Clone)]
pub struct ConnectionParameters {
    /// NetBIOS / DNS name of the server
    pub server_name: String,
    /// Explicit network address (IP or host); preferred over `server_name`
    pub server_address: String,
    pub share_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub domain: Option<String>,
    pub port: u16,
    pub auth_mode: AuthMode,
    /// Bound applied to every control command
    pub timeout: Duration,
    /// Bound applied to a file transfer
    pub transfer_timeout: Duration,
    /// Log each transport command (secrets redacted)
    pub log_commands: bool,
}

impl ConnectionParameters {
    pub fn new(
        server_name: impl Into<String>,
        server_address: impl Into<String>,
        share_name: impl Into<String>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            server_address: server_address.into(),
            share_name: share_name.into(),
            username: None,
            password: None,
            domain: None,
            port: DEFAULT_SMB_PORT,
            auth_mode: AuthMode::Ntlm,
            timeout: DEFAULT_TIMEOUT,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
            log_commands: false,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_auth_mode(mut self, auth_mode: AuthMode) -> Self {
        self.auth_mode = auth_mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    pub fn with_command_logging(mut self, enabled: bool) -> Self {
        self.log_commands = enabled;
        self
    }

    /// Host to dial: the explicit address when given, else the server name.
    pub fn network_address(&self) -> &str {
        if self.server_address.trim().is_empty() {
            &self.server_name
        } else {
            &self.server_address
        }
    }

    /// Identity presented to the server.
    ///
    /// `domain\username` for password-based modes with a domain, the bare
    /// username otherwise. Kerberos without a username uses the ticket cache.
    pub fn identity(&self) -> Option<String> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        match self.domain.as_deref().filter(|d| !d.is_empty()) {
            Some(domain) if self.auth_mode != AuthMode::Kerberos => {
                Some(format!("{}\\{}", domain, username))
            }
            _ => Some(username.to_string()),
        }
    }

    /// Missing credential fields for the configured mode.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.auth_mode.requires_password() {
            if self.username.as_deref().map_or(true, str::is_empty) {
                missing.push("username");
            }
            if self.password.as_deref().map_or(true, str::is_empty) {
                missing.push("password");
            }
        }
        missing
    }

    /// `//<host>/<share>`
    pub fn service_path(&self) -> String {
        format!("//{}/{}", self.network_address(), self.share_name)
    }

    /// `//<host>/<share>/<relative path>`
    pub fn share_url(&self, remote_path: &str) -> String {
        let relative = remote_path.trim_start_matches('/');
        if relative.is_empty() {
            self.service_path()
        } else {
            format!("{}/{}", self.service_path(), relative)
        }
    }

    /// Human-readable label, e.g. `FILESRV (10.0.0.5:445)`
    pub fn server_label(&self) -> String {
        format!("{} ({}:{})", self.server_name, self.server_address, self.port)
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("server_name", &self.server_name)
            .field("server_address", &self.server_address)
            .field("share_name", &self.share_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("domain", &self.domain)
            .field("port", &self.port)
            .field("auth_mode", &self.auth_mode)
            .field("timeout", &self.timeout)
            .field("transfer_timeout", &self.transfer_timeout)
            .finish()
    }
}
